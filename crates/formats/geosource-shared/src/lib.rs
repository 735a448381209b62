//! Helpers shared by the file-backed format crates.
//!
//! Provides the read error used while decoding backing files, parameter
//! accessors with uniform diagnostics, and loading of `file`/`inline` sources.

use std::error::Error as StdError;
use std::fmt;

use geosource_core_common::BackendError;

pub mod params;
pub mod source;

pub use params::ParamReader;
pub use source::SourceData;

/// A position within a source file, such as a CSV record.
///
/// All indices are 1-based where possible to align with human expectations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourcePosition {
    /// Line number in the source (1-based)
    pub line: Option<u64>,
    /// Column (field) number in the source (1-based)
    pub column: Option<u64>,
    /// Logical record number reported by the parser
    pub record: Option<u64>,
}

impl SourcePosition {
    /// Position of a line in a text source.
    #[must_use]
    pub fn line(line: u64) -> Self {
        Self {
            line: Some(line),
            ..Self::default()
        }
    }

    /// Returns true when the position does not contain any location metadata.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.line.is_none() && self.column.is_none() && self.record.is_none()
    }
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();

        if let Some(line) = self.line {
            parts.push(format!("line {line}"));
        }
        if let Some(column) = self.column {
            parts.push(format!("column {column}"));
        }
        if let Some(record) = self.record {
            parts.push(format!("record {record}"));
        }

        if parts.is_empty() {
            write!(f, "unknown position")
        } else {
            write!(f, "{}", parts.join(", "))
        }
    }
}

/// Errors that can occur when decoding spatial data from a backing source.
#[derive(Debug)]
pub enum SpatialFormatReadError {
    /// Parsing failed for the input source.
    Parse {
        /// Human readable description of the failure.
        message: String,
        /// Optional position describing where the failure occurred.
        position: Option<SourcePosition>,
        /// Optional context describing what was being read.
        context: Option<String>,
    },
    /// Schema inference failed for the source.
    SchemaInference {
        /// Human readable description of the failure.
        message: String,
        /// Optional context describing what was being read.
        context: Option<String>,
    },
}

impl SpatialFormatReadError {
    /// Schema inference error, for sources whose layout cannot be worked out.
    #[must_use]
    pub fn schema(message: impl Into<String>, context: impl Into<String>) -> Self {
        SpatialFormatReadError::SchemaInference {
            message: message.into(),
            context: Some(context.into()),
        }
    }

    /// Parse error without position information.
    #[must_use]
    pub fn parse(message: impl Into<String>, context: impl Into<String>) -> Self {
        SpatialFormatReadError::Parse {
            message: message.into(),
            position: None,
            context: Some(context.into()),
        }
    }

    fn fmt_context(context: Option<&str>) -> String {
        context
            .map(|c| format!(" while reading {c}"))
            .unwrap_or_default()
    }

    fn fmt_position(position: Option<&SourcePosition>) -> String {
        position.map(|pos| format!(" at {pos}")).unwrap_or_default()
    }

    /// Attach a position to a parse error, returning the updated error.
    #[must_use]
    pub fn at(mut self, pos: SourcePosition) -> Self {
        if let SpatialFormatReadError::Parse { position, .. } = &mut self {
            *position = Some(pos);
        }
        self
    }
}

impl fmt::Display for SpatialFormatReadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpatialFormatReadError::Parse {
                message,
                position,
                context,
            } => write!(
                f,
                "Parse error{}{}: {message}",
                Self::fmt_context(context.as_deref()),
                Self::fmt_position(position.as_ref())
            ),
            SpatialFormatReadError::SchemaInference { message, context } => write!(
                f,
                "Schema inference error{}: {message}",
                Self::fmt_context(context.as_deref())
            ),
        }
    }
}

impl StdError for SpatialFormatReadError {}

impl From<SpatialFormatReadError> for BackendError {
    fn from(err: SpatialFormatReadError) -> Self {
        BackendError::Read(err.to_string())
    }
}

/// Result type alias that uses [`SpatialFormatReadError`].
pub type SpatialFormatResult<T> = Result<T, SpatialFormatReadError>;
