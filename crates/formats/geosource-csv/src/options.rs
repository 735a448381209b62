//! CSV reader configuration derived from datasource parameters.

use geosource_core_common::{AttributeValue, BackendResult};
use geosource_shared::ParamReader;

/// Separators tried, in order of preference, when none is configured.
pub const CANDIDATE_SEPARATORS: [u8; 4] = [b',', b';', b'\t', b'|'];

/// CSV format configuration options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvOptions {
    /// Field separator; `None` means detect it from the header line
    pub separator: Option<u8>,
    /// Quote character (default: b'"')
    pub quote: u8,
    /// Column names to use instead of the first line
    pub headers: Option<Vec<String>>,
    /// Maximum number of data rows to load
    pub row_limit: Option<usize>,
    /// Fail on malformed rows instead of skipping them
    pub strict: bool,
    /// Character encoding reported in the layer descriptor
    pub encoding: String,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            separator: None,
            quote: b'"',
            headers: None,
            row_limit: None,
            strict: false,
            encoding: "utf-8".to_string(),
        }
    }
}

impl CsvOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads `separator`, `quote`, `headers`, `row_limit`, `strict` and `encoding`.
    ///
    /// # Errors
    ///
    /// Returns an error if any of them holds a malformed value.
    pub fn from_params(reader: &ParamReader<'_>) -> BackendResult<Self> {
        let defaults = Self::default();
        Ok(Self {
            separator: reader.byte("separator")?,
            quote: reader.byte("quote")?.unwrap_or(defaults.quote),
            headers: reader.optional("headers").map(|value| {
                value
                    .split(',')
                    .map(|name| name.trim().to_string())
                    .collect()
            }),
            row_limit: reader.parse("row_limit")?,
            strict: reader.flag("strict", defaults.strict)?,
            encoding: reader
                .optional("encoding")
                .map_or(defaults.encoding, str::to_string),
        })
    }

    #[must_use]
    pub fn with_separator(mut self, separator: u8) -> Self {
        self.separator = Some(separator);
        self
    }

    #[must_use]
    pub fn with_headers(mut self, headers: Vec<String>) -> Self {
        self.headers = Some(headers);
        self
    }

    #[must_use]
    pub fn with_row_limit(mut self, row_limit: usize) -> Self {
        self.row_limit = Some(row_limit);
        self
    }

    #[must_use]
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Defaults merged into the backend's effective parameters.
    #[must_use]
    pub fn defaults() -> Vec<(&'static str, AttributeValue)> {
        let defaults = Self::default();
        vec![
            ("quote", AttributeValue::from("\"")),
            ("strict", AttributeValue::Boolean(defaults.strict)),
            ("encoding", AttributeValue::from(defaults.encoding)),
        ]
    }

    /// The configured separator, or the candidate occurring most often in `header_line`.
    ///
    /// Ties go to the earlier candidate; a line with none of them yields `,`.
    #[must_use]
    pub fn resolve_separator(&self, header_line: &str) -> u8 {
        if let Some(separator) = self.separator {
            return separator;
        }
        let mut best = (CANDIDATE_SEPARATORS[0], 0);
        for candidate in CANDIDATE_SEPARATORS {
            let count = header_line.bytes().filter(|b| *b == candidate).count();
            if count > best.1 {
                best = (candidate, count);
            }
        }
        best.0
    }
}
