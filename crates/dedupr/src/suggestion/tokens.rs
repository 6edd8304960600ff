//! Prompt size estimation.

use crate::error::{DeduprError, Result};

use super::prompts::ChatMessage;

/// Rough characters-per-token ratio for English text.
const CHARS_PER_TOKEN: usize = 4;

/// Estimate the token count of a text.
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(CHARS_PER_TOKEN)
}

/// Estimate the token count of a message list.
pub fn estimate_message_tokens(messages: &[ChatMessage]) -> usize {
    messages.iter().map(|m| estimate_tokens(&m.content)).sum()
}

/// Fail with [`DeduprError::TokenLimitExceeded`] if the messages are too large.
pub fn ensure_within_limit(messages: &[ChatMessage], limit: usize) -> Result<usize> {
    let token_count = estimate_message_tokens(messages);
    if token_count > limit {
        return Err(DeduprError::TokenLimitExceeded { token_count, limit });
    }
    Ok(token_count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_tokens() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("abcd"), 1);
        assert_eq!(estimate_tokens("abcde"), 2);
        assert_eq!(estimate_tokens("éééé"), 1);
    }

    #[test]
    fn test_limit() {
        let messages = vec![ChatMessage::user("x".repeat(40))];
        assert_eq!(ensure_within_limit(&messages, 10).unwrap(), 10);
        assert!(matches!(
            ensure_within_limit(&messages, 9),
            Err(DeduprError::TokenLimitExceeded {
                token_count: 10,
                limit: 9
            })
        ));
    }
}
