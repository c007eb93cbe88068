//! Error types for configuration loading and validation.

/// Errors that can occur when loading or validating a `waveline.toml` configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An I/O error occurred while reading the configuration file.
    #[error("failed to read configuration: {0}")]
    IoError(#[from] std::io::Error),

    /// The TOML content could not be parsed.
    #[error("failed to parse configuration: {0}")]
    ParseError(String),

    /// The clock period string could not be parsed.
    #[error("invalid clock period '{0}'")]
    InvalidPeriod(String),

    /// A configuration value failed validation.
    #[error("validation error: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_parse_error() {
        let err = ConfigError::ParseError("expected '=' at line 3".to_string());
        assert_eq!(
            format!("{err}"),
            "failed to parse configuration: expected '=' at line 3"
        );
    }

    #[test]
    fn display_invalid_period() {
        let err = ConfigError::InvalidPeriod("fast".to_string());
        assert_eq!(format!("{err}"), "invalid clock period 'fast'");
    }

    #[test]
    fn display_validation_error() {
        let err = ConfigError::ValidationError("cycles must be at least 1".to_string());
        assert_eq!(format!("{err}"), "validation error: cycles must be at least 1");
    }

    #[test]
    fn display_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = ConfigError::IoError(io_err);
        assert!(format!("{err}").starts_with("failed to read configuration:"));
    }
}
