//! Error types for the layered configuration store.

use std::path::PathBuf;

use crate::core::SourceId;

/// Result type alias for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur when working with configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A non-optional source's backing file does not exist.
    #[error("Missing required configuration source: {}", .0.display())]
    MissingRequiredSource(PathBuf),

    /// IO error occurred while reading or writing a backing file.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// `set` was called but no source accepts writes.
    #[error("No writable configuration source configured")]
    NoWritableSource,

    /// A write was routed to a source that does not accept writes.
    #[error("Configuration source '{0}' is read-only")]
    ReadOnlySource(String),

    /// The given source id does not belong to this provider.
    #[error("Unknown configuration source: {0}")]
    UnknownSource(SourceId),

    /// Failed to load configuration from a source.
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    /// A value could not be converted to the requested type.
    #[error("Invalid value for '{key}': {reason}")]
    ParseError {
        /// The key whose value failed to parse
        key: String,
        /// Why the conversion failed
        reason: String,
    },

    /// File watching failed to initialize.
    #[error("File watching error: {0}")]
    WatchError(String),

    /// Generic error for other cases.
    #[error("Configuration error: {0}")]
    Other(String),
}

impl ConfigError {
    /// Create a parse error for the given key.
    pub fn parse(key: impl Into<String>, reason: impl ToString) -> Self {
        Self::ParseError {
            key: key.into(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_source_message_names_path() {
        let err = ConfigError::MissingRequiredSource(PathBuf::from("/etc/hl/settings.ini"));
        assert!(err.to_string().contains("/etc/hl/settings.ini"));
    }

    #[test]
    fn test_parse_error_names_key() {
        let err = ConfigError::parse("MaxPlayers", "invalid digit found in string");
        assert_eq!(
            err.to_string(),
            "Invalid value for 'MaxPlayers': invalid digit found in string"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: ConfigError = io.into();
        assert!(matches!(err, ConfigError::IoError(_)));
    }
}
