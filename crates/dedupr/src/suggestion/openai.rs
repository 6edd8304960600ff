//! OpenAI chat completions provider.

use std::time::Duration;

use indexmap::IndexMap;
use reqwest::blocking::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::classifier::DatasetType;
use crate::error::{DeduprError, Result};

use super::prompts::{self, ChatMessage};
use super::provider::{
    ClassificationRequest, ColumnSample, LlmConfig, RawSuggestion, SuggestionProvider,
    TransformationRequest,
};

/// OpenAI API endpoint.
const API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Environment variable holding the API key.
pub const API_KEY_VAR: &str = "OPENAI_API_KEY";

/// OpenAI GPT provider.
pub struct OpenAIProvider {
    client: Client,
    api_key: String,
    config: LlmConfig,
}

impl OpenAIProvider {
    /// Create a new OpenAI provider with the given API key.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(api_key, LlmConfig::default())
    }

    /// Create a new OpenAI provider with custom configuration.
    pub fn with_config(api_key: impl Into<String>, config: LlmConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| DeduprError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            config,
        })
    }

    /// Create from environment variable.
    pub fn from_env(config: LlmConfig) -> Result<Self> {
        let api_key = std::env::var(API_KEY_VAR).map_err(|_| {
            DeduprError::Config(format!("{} environment variable not set", API_KEY_VAR))
        })?;
        Self::with_config(api_key, config)
    }

    /// Build headers for API requests.
    fn build_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.api_key))
                .map_err(|e| DeduprError::Config(format!("Invalid API key: {}", e)))?,
        );
        Ok(headers)
    }

    /// Send messages and return the JSON text of the reply.
    fn send_messages(&self, messages: &[ChatMessage]) -> Result<String> {
        let body = json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
            "response_format": { "type": "json_object" },
            "messages": messages,
        });

        debug!(model = %self.config.model, messages = messages.len(), "Sending chat completion");

        let response = self
            .client
            .post(API_URL)
            .headers(self.build_headers()?)
            .json(&body)
            .send()
            .map_err(|e| DeduprError::Llm(format!("API request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().unwrap_or_default();
            return Err(DeduprError::Llm(format!(
                "OpenAI API error ({}): {}",
                status, error_text
            )));
        }

        let api_response: OpenAIResponse = response
            .json()
            .map_err(|e| DeduprError::Llm(format!("Failed to parse API response: {}", e)))?;

        api_response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| DeduprError::Llm("No response from OpenAI".to_string()))
    }
}

/// Parse JSON from a model reply, tolerating markdown code fences.
pub(crate) fn parse_json_response<T: for<'de> Deserialize<'de>>(response: &str) -> Result<T> {
    let json_str = if response.contains("```json") {
        response
            .split("```json")
            .nth(1)
            .and_then(|s| s.split("```").next())
            .map(|s| s.trim())
            .unwrap_or(response)
    } else if response.contains("```") {
        response
            .split("```")
            .nth(1)
            .map(|s| s.trim())
            .unwrap_or(response)
    } else {
        response.trim()
    };

    serde_json::from_str(json_str)
        .map_err(|e| DeduprError::Llm(format!("Failed to parse LLM JSON response: {}", e)))
}

impl SuggestionProvider for OpenAIProvider {
    fn suggest_classifications(&self, request: &ClassificationRequest) -> Result<Vec<RawSuggestion>> {
        let response = self.send_messages(&prompts::classification_messages(request))?;
        let parsed: ClassificationResponse = parse_json_response(&response)?;
        Ok(parsed.classifications)
    }

    fn generate_transformation(
        &self,
        request: &TransformationRequest,
    ) -> Result<IndexMap<String, String>> {
        let response = self.send_messages(&prompts::transformation_messages(request))?;
        let parsed: TransformationResponse = parse_json_response(&response)?;
        Ok(parsed.transformations)
    }

    fn detect_dataset_type(&self, columns: &[ColumnSample]) -> Result<Option<DatasetType>> {
        let response = self.send_messages(&prompts::dataset_type_messages(columns))?;
        let parsed: DatasetTypeResponse = parse_json_response(&response)?;
        Ok(parsed
            .dataset_type
            .and_then(|value| value.parse::<DatasetType>().ok()))
    }

    fn config(&self) -> &LlmConfig {
        &self.config
    }

    fn name(&self) -> &str {
        "openai"
    }
}

/// OpenAI API response structure.
#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    content: String,
}

#[derive(Debug, Deserialize)]
struct ClassificationResponse {
    #[serde(default)]
    classifications: Vec<RawSuggestion>,
}

#[derive(Debug, Deserialize)]
struct TransformationResponse {
    #[serde(default)]
    transformations: IndexMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct DatasetTypeResponse {
    #[serde(default)]
    dataset_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fenced_json() {
        let reply = "Here you go:\n```json\n{\"classifications\": [{\"column_id\": \"a\", \"classification\": \"person:email\"}]}\n```";
        let parsed: ClassificationResponse = parse_json_response(reply).unwrap();
        assert_eq!(parsed.classifications, vec![RawSuggestion::new("a", "person:email")]);
    }

    #[test]
    fn test_parse_plain_json() {
        let parsed: TransformationResponse =
            parse_json_response(r#" {"transformations": {"nyc": "New York"}} "#).unwrap();
        assert_eq!(parsed.transformations.get("nyc").map(String::as_str), Some("New York"));
    }

    #[test]
    fn test_parse_garbage_is_llm_error() {
        let err = parse_json_response::<DatasetTypeResponse>("not json").unwrap_err();
        assert!(matches!(err, DeduprError::Llm(_)));
    }
}
