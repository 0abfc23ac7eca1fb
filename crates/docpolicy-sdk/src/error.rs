//! SDK error types

use thiserror::Error;

/// SDK error type
#[derive(Error, Debug)]
pub enum SdkError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Evaluation failed
    #[error("Runtime error: {0}")]
    RuntimeError(#[from] docpolicy_runtime::RuntimeError),

    /// Invalid document or snapshot data
    #[error("Core error: {0}")]
    CoreError(#[from] docpolicy_core::CoreError),

    /// Evaluation metadata could not be produced
    #[error("Metadata error: {0}")]
    MetadataError(String),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for SDK operations
pub type Result<T> = std::result::Result<T, SdkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error() {
        let error = SdkError::ConfigError("iterations must be positive".to_string());
        assert!(error.to_string().contains("Configuration error"));
        assert!(error.to_string().contains("iterations must be positive"));
    }

    #[test]
    fn test_runtime_error_conversion() {
        let error: SdkError = docpolicy_runtime::RuntimeError::CollectionNotFound(3).into();
        assert!(matches!(error, SdkError::RuntimeError(_)));
        assert!(error.to_string().contains("Collection not found: 3"));
    }
}
