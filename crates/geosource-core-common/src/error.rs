//! Error type raised by drivers and backends.
//!
//! Backends report failures through [`BackendError`]. The core never lets this
//! type escape its public operations: it is flattened into the caller-facing
//! error with the diagnostic text preserved.

use std::path::PathBuf;
use thiserror::Error;

/// Failure raised by the driver catalog or a backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// No driver is registered under the requested `type`
    #[error("Driver '{name}' not found. Available drivers: {available}")]
    DriverNotFound {
        /// The requested driver name
        name: String,
        /// Comma-separated list of registered drivers
        available: String,
    },

    /// A parameter the backend requires was not supplied
    #[error("Missing required parameter '{parameter}'{}", driver.as_ref().map(|d| format!(" for {d} datasource")).unwrap_or_default())]
    MissingParameter {
        /// The parameter name
        parameter: String,
        /// Driver that requires it, when known
        driver: Option<String>,
    },

    /// A parameter value could not be interpreted
    #[error("Invalid value '{value}' for parameter '{parameter}': {reason}")]
    InvalidParameter {
        /// The parameter name
        parameter: String,
        /// The offending value
        value: String,
        /// Why it was rejected
        reason: String,
    },

    /// Failed to open or read backing storage
    #[error("Failed to read '{path}': {source}")]
    Io {
        /// The file path
        path: PathBuf,
        /// The underlying error
        #[source]
        source: std::io::Error,
    },

    /// The backing data could not be decoded
    #[error("{0}")]
    Read(String),

    /// Query execution failed
    #[error("Query failed: {0}")]
    Query(String),

    /// Any other backend failure
    #[error("{0}")]
    Other(String),
}

impl BackendError {
    /// Convenience constructor for [`BackendError::MissingParameter`].
    #[must_use]
    pub fn missing(parameter: impl Into<String>, driver: &str) -> Self {
        Self::MissingParameter {
            parameter: parameter.into(),
            driver: Some(driver.to_string()),
        }
    }

    /// Convenience constructor for [`BackendError::InvalidParameter`].
    #[must_use]
    pub fn invalid(
        parameter: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Wraps an I/O failure with the path being accessed.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias that uses [`BackendError`].
pub type BackendResult<T> = std::result::Result<T, BackendError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_parameter_message() {
        let err = BackendError::missing("file", "geojson");
        assert_eq!(
            err.to_string(),
            "Missing required parameter 'file' for geojson datasource"
        );

        let err = BackendError::MissingParameter {
            parameter: "type".to_string(),
            driver: None,
        };
        assert_eq!(err.to_string(), "Missing required parameter 'type'");
    }

    #[test]
    fn test_invalid_parameter_message() {
        let err = BackendError::invalid("row_limit", "abc", "expected an integer");
        assert_eq!(
            err.to_string(),
            "Invalid value 'abc' for parameter 'row_limit': expected an integer"
        );
    }

    #[test]
    fn test_io_error_keeps_source() {
        use std::error::Error as _;

        let err = BackendError::io(
            "roads.geojson",
            std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        );
        assert!(err.to_string().contains("roads.geojson"));
        assert!(err.source().is_some());
    }
}
