//! Caller-facing error type for datasource operations.
//!
//! Backends report failures with [`BackendError`]; none of that escapes a
//! [`Datasource`](crate::Datasource). Every failure is flattened into a
//! [`DatasourceError`] carrying a [`ErrorKind`] discriminator and the underlying
//! diagnostic text.

use std::fmt;

use geosource_core_common::BackendError;
use thiserror::Error;

/// Fixed message reported when describing a datasource fails unexpectedly.
pub const INTERNAL_DESCRIBE_MESSAGE: &str =
    "unexpected failure while describing datasource, please file a bug report";

/// Category of a [`DatasourceError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The parameter set could not be resolved to a backend
    Configuration,
    /// The backend failed while serving a request
    Backend,
    /// An unanticipated failure while describing the datasource
    Internal,
}

impl ErrorKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Configuration => "configuration",
            ErrorKind::Backend => "backend",
            ErrorKind::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned by every fallible datasource operation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DatasourceError {
    /// Construction failed; no datasource exists
    #[error("Configuration error: {message}")]
    Configuration {
        /// Diagnostic text from the driver catalog, unmodified
        message: String,
    },

    /// The backend failed computing an envelope, introspecting its schema, or
    /// running a query
    #[error("Backend error: {message}")]
    Backend {
        /// Diagnostic text from the backend, unmodified
        message: String,
    },

    /// Describing the datasource failed in an unanticipated way
    #[error("Internal error: {message}")]
    Internal {
        /// Always [`INTERNAL_DESCRIBE_MESSAGE`]
        message: String,
    },
}

/// Type alias for Results using `DatasourceError`.
pub type Result<T> = std::result::Result<T, DatasourceError>;

impl DatasourceError {
    /// Wraps a catalog failure raised while constructing a datasource.
    #[must_use]
    pub fn configuration(err: &BackendError) -> Self {
        Self::Configuration {
            message: err.to_string(),
        }
    }

    /// Wraps a failure raised by an open backend.
    #[must_use]
    pub fn backend(err: &BackendError) -> Self {
        Self::Backend {
            message: err.to_string(),
        }
    }

    #[must_use]
    pub fn internal() -> Self {
        Self::Internal {
            message: INTERNAL_DESCRIBE_MESSAGE.to_string(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration { .. } => ErrorKind::Configuration,
            Self::Backend { .. } => ErrorKind::Backend,
            Self::Internal { .. } => ErrorKind::Internal,
        }
    }

    /// The diagnostic text without the category prefix.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Configuration { message }
            | Self::Backend { message }
            | Self::Internal { message } => message,
        }
    }

    /// Get a user-friendly error message.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Configuration { message } => {
                format!("Could not open datasource: {message}")
            },
            Self::Backend { message } => format!("Datasource failed: {message}"),
            Self::Internal { message } => message.clone(),
        }
    }

    /// Get recovery suggestions if available.
    #[must_use]
    pub fn recovery_suggestion(&self) -> Option<String> {
        match self {
            Self::Configuration { message } if message.contains("not found. Available drivers") => {
                Some("Run 'geosource drivers' to see all available drivers.".to_string())
            },
            Self::Configuration { message } if message.contains("Missing required parameter") => {
                Some("Pass the missing parameter with '-p key=value'.".to_string())
            },
            Self::Configuration { .. } => {
                Some("Check the datasource parameters and that the data exists.".to_string())
            },
            Self::Backend { .. } => None,
            Self::Internal { .. } => Some(
                "Re-run with --debug and include the output in the report.".to_string(),
            ),
        }
    }

    /// Check if this error is potentially recoverable by changing the parameters.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }
}
