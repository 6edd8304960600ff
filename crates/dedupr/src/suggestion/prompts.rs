//! Prompt templates for provider interactions.

use serde::Serialize;

use super::provider::{ClassificationRequest, ColumnSample, TransformationRequest};

/// One chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system",
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user",
            content: content.into(),
        }
    }
}

const CLASSIFIER_SYSTEM_PROMPT: &str = "You are a data classifier that analyzes column contents and determines their type. \
For each column, you must:
1. Look at the sample data
2. Compare against all available classifiers
3. Only classify if there is a strong match
4. Each column should get at most one classification
5. It's okay to leave columns unclassified if unsure
6. Respond with a JSON object of the form {\"classifications\": [{\"column_id\": \"...\", \"classification\": \"...\"}]}";

fn column_context(columns: &[ColumnSample]) -> String {
    columns
        .iter()
        .filter(|c| !c.samples.is_empty())
        .map(|c| {
            format!(
                "Column '{}' (label '{}') Sample Content: {}",
                c.column_id,
                c.label,
                c.samples.join(", ")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Messages asking for column classifications.
pub fn classification_messages(request: &ClassificationRequest) -> Vec<ChatMessage> {
    let classifiers = request
        .classifiers
        .iter()
        .map(|c| format!("- {}: {}", c.id, c.situation))
        .collect::<Vec<_>>()
        .join("\n");

    vec![
        ChatMessage::system(CLASSIFIER_SYSTEM_PROMPT),
        ChatMessage::system(format!(
            "The dataset describes records of type {}.\nAvailable classifiers:\n{}",
            request.dataset_type, classifiers
        )),
        ChatMessage::user(format!(
            "Analyze these columns and provide classifications. Here are the column samples:\n{}",
            column_context(&request.columns)
        )),
    ]
}

/// Messages asking for a value mapping.
pub fn transformation_messages(request: &TransformationRequest) -> Vec<ChatMessage> {
    let values = serde_json::to_string(&request.values).unwrap_or_else(|_| "[]".to_string());

    vec![
        ChatMessage::system(
            "You transform the values of a data column according to the user's instructions. \
             Only include values that need to change. Never invent values that are not in the list. \
             Respond with a JSON object of the form {\"transformations\": {\"original value\": \"new value\"}}",
        ),
        ChatMessage::user(format!(
            "Column '{}' has these distinct values:\n{}\n\nInstructions: {}",
            request.label, values, request.prompt
        )),
    ]
}

/// Messages asking whether a dataset describes people or companies.
pub fn dataset_type_messages(columns: &[ColumnSample]) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(
            "You decide whether a dataset describes people or companies. \
             Respond with a JSON object of the form {\"dataset_type\": \"PERSON\"}, \
             {\"dataset_type\": \"COMPANY\"} or {\"dataset_type\": null} if unsure.",
        ),
        ChatMessage::user(format!(
            "Here are the column samples:\n{}",
            column_context(columns)
        )),
    ]
}
