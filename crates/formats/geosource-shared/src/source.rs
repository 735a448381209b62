//! Loading of `file` / `inline` data sources.

use std::fmt;
use std::path::{Path, PathBuf};

use encoding_rs::Encoding;
use geosource_core_common::{BackendError, BackendResult};
use log::debug;

use crate::params::ParamReader;

/// Where a text-based backend reads its data from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceData {
    /// A file on disk, already joined with the `base` parameter if one was given.
    File(PathBuf),
    /// Data supplied directly in the `inline` parameter.
    Inline(String),
}

impl SourceData {
    /// Resolves the source from `inline`, or from `file` joined onto `base`.
    ///
    /// `inline` wins when both are present.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::MissingParameter`] for `file` when neither is given.
    pub fn from_params(reader: &ParamReader<'_>) -> BackendResult<Self> {
        if let Some(inline) = reader.raw("inline") {
            return Ok(SourceData::Inline(inline.to_string()));
        }
        let file = reader.required("file")?;
        let path = match reader.optional("base") {
            Some(base) => Path::new(base).join(file),
            None => PathBuf::from(file),
        };
        Ok(SourceData::File(path))
    }

    /// Reads the whole source into memory, decoding files from `encoding`.
    ///
    /// Inline data is already text and is returned as given once the label
    /// has been checked.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::InvalidParameter`] for an unknown encoding
    /// label, [`BackendError::Io`] if the file cannot be read, and
    /// [`BackendError::Read`] if its bytes are not valid in that encoding.
    pub fn load(&self, encoding: &str) -> BackendResult<String> {
        let decoder = resolve_encoding(encoding)?;
        match self {
            SourceData::File(path) => {
                debug!("Loading {} as {}", path.display(), decoder.name());
                let bytes = std::fs::read(path).map_err(|err| BackendError::io(path, err))?;
                let (text, had_errors) = decoder.decode_with_bom_removal(&bytes);
                if had_errors {
                    return Err(BackendError::Read(format!(
                        "{} is not valid {} text; set the 'encoding' parameter",
                        path.display(),
                        decoder.name()
                    )));
                }
                Ok(text.into_owned())
            },
            SourceData::Inline(data) => Ok(data.clone()),
        }
    }
}

/// Looks up a character encoding by label (`utf-8`, `latin1`, `windows-1252`, `shift_jis`, ...).
///
/// # Errors
///
/// Returns [`BackendError::InvalidParameter`] for `encoding` when the label is unknown.
pub fn resolve_encoding(label: &str) -> BackendResult<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| BackendError::invalid("encoding", label, "unknown character encoding"))
}

impl fmt::Display for SourceData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceData::File(path) => write!(f, "{}", path.display()),
            SourceData::Inline(_) => f.write_str("inline data"),
        }
    }
}
