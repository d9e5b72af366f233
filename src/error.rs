//! RwSplit Error Types

use thiserror::Error;

/// Result type alias for RwSplit operations
pub type Result<T> = std::result::Result<T, Error>;

/// RwSplit error types
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Duplicate data source rule name: {0}")]
    DuplicateDataSourceRule(String),

    // Algorithm errors
    #[error("Unknown load balance algorithm type: {0}")]
    UnknownAlgorithmType(String),

    #[error("Invalid property `{key}` for {algorithm} algorithm: {reason}")]
    InvalidAlgorithmProperty {
        algorithm: String,
        key: String,
        reason: String,
    },

    // Routing errors
    #[error("Data source rule not found: {0}")]
    DataSourceRuleNotFound(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Check if this error was raised while building a rule from configuration
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Error::Config(_)
                | Error::ConfigParse(_)
                | Error::DuplicateDataSourceRule(_)
                | Error::UnknownAlgorithmType(_)
                | Error::InvalidAlgorithmProperty { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_classification() {
        assert!(Error::Config("empty".into()).is_config_error());
        assert!(Error::DuplicateDataSourceRule("pr_ds".into()).is_config_error());
        assert!(Error::UnknownAlgorithmType("FASTEST".into()).is_config_error());
        assert!(!Error::DataSourceRuleNotFound("pr_ds".into()).is_config_error());
    }

    #[test]
    fn test_error_display() {
        let err = Error::InvalidAlgorithmProperty {
            algorithm: "WEIGHT".into(),
            key: "read_ds_0".into(),
            reason: "weight must be positive".into(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid property `read_ds_0` for WEIGHT algorithm: weight must be positive"
        );
    }
}
