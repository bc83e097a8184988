//! Error types for Assis
//!
//! This module defines all error types used throughout the crate,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for Assis operations
///
/// Store operations return `anyhow::Result`, so callers that need to tell
/// the kinds apart use `err.downcast_ref::<AssisError>()`.
#[derive(Error, Debug)]
pub enum AssisError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// A mutation referenced a conversation id that does not exist
    #[error("Conversation not found: {0}")]
    ConversationNotFound(i64),

    /// A stored setting could not be decoded
    #[error("Corrupt setting '{key}': {reason}")]
    CorruptSetting {
        /// Settings key whose value failed to decode
        key: String,
        /// Decoder failure message
        reason: String,
    },

    /// Message role outside of `user` / `assistant`
    #[error("Invalid message role: {0}")]
    InvalidRole(String),

    /// Conversation storage errors (database operations, data directory)
    #[error("Storage error: {0}")]
    Storage(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl AssisError {
    /// Wrap a SQLite failure with a short description of what was attempted
    pub(crate) fn storage(context: &str, err: rusqlite::Error) -> Self {
        AssisError::Storage(format!("{}: {}", context, err))
    }
}

/// Result type alias for Assis operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let error = AssisError::Config("invalid format".to_string());
        assert_eq!(error.to_string(), "Configuration error: invalid format");
    }

    #[test]
    fn test_conversation_not_found_display() {
        let error = AssisError::ConversationNotFound(42);
        assert_eq!(error.to_string(), "Conversation not found: 42");
    }

    #[test]
    fn test_corrupt_setting_display() {
        let error = AssisError::CorruptSetting {
            key: "temperature".to_string(),
            reason: "expected value".to_string(),
        };
        let s = error.to_string();
        assert!(s.contains("'temperature'"));
        assert!(s.contains("expected value"));
    }

    #[test]
    fn test_invalid_role_display() {
        let error = AssisError::InvalidRole("system".to_string());
        assert_eq!(error.to_string(), "Invalid message role: system");
    }

    #[test]
    fn test_storage_helper_includes_context() {
        let error = AssisError::storage("Failed to open database", rusqlite::Error::InvalidQuery);
        assert!(matches!(error, AssisError::Storage(_)));
        assert!(error.to_string().starts_with("Storage error: Failed to open database"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: AssisError = io_error.into();
        assert!(matches!(error, AssisError::Io(_)));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_error = serde_json::from_str::<serde_json::Value>("{invalid json}").unwrap_err();
        let error: AssisError = json_error.into();
        assert!(matches!(error, AssisError::Serialization(_)));
    }

    #[test]
    fn test_yaml_error_conversion() {
        let yaml_error = serde_yaml::from_str::<serde_yaml::Value>("invalid: : yaml").unwrap_err();
        let error: AssisError = yaml_error.into();
        assert!(matches!(error, AssisError::Yaml(_)));
    }

    #[test]
    fn test_downcast_through_anyhow() {
        let err: anyhow::Error = AssisError::ConversationNotFound(7).into();
        assert!(matches!(
            err.downcast_ref::<AssisError>(),
            Some(AssisError::ConversationNotFound(7))
        ));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<AssisError>();
    }
}
