//! Typed access to the string parameters handed to a format factory.

use std::str::FromStr;

use geosource_core_common::{BackendError, BackendParams, BackendResult};

/// Reads parameters for one driver, producing uniform diagnostics.
#[derive(Debug, Clone, Copy)]
pub struct ParamReader<'a> {
    params: &'a BackendParams,
    driver: &'static str,
}

impl<'a> ParamReader<'a> {
    #[must_use]
    pub fn new(params: &'a BackendParams, driver: &'static str) -> Self {
        Self { params, driver }
    }

    #[must_use]
    pub fn driver(&self) -> &'static str {
        self.driver
    }

    /// Trimmed value of `key`; blank values count as absent.
    #[must_use]
    pub fn optional(&self, key: &str) -> Option<&'a str> {
        self.params
            .get(key)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }

    /// Like [`ParamReader::optional`] but without trimming, for values such as
    /// separators where whitespace is meaningful.
    #[must_use]
    pub fn raw(&self, key: &str) -> Option<&'a str> {
        self.params
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    /// # Errors
    ///
    /// Returns [`BackendError::MissingParameter`] if `key` is absent or blank.
    pub fn required(&self, key: &str) -> BackendResult<&'a str> {
        self.optional(key)
            .ok_or_else(|| BackendError::missing(key, self.driver))
    }

    /// Parses `key` with [`FromStr`].
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::InvalidParameter`] if the value does not parse.
    pub fn parse<T>(&self, key: &str) -> BackendResult<Option<T>>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.optional(key)
            .map(|value| {
                value
                    .parse::<T>()
                    .map_err(|err| BackendError::invalid(key, value, err.to_string()))
            })
            .transpose()
    }

    /// Parses a boolean flag, accepting `true/false`, `yes/no`, `on/off` and `1/0`.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::InvalidParameter`] for any other value.
    pub fn flag(&self, key: &str, default: bool) -> BackendResult<bool> {
        let Some(value) = self.optional(key) else {
            return Ok(default);
        };
        match value.to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(true),
            "false" | "no" | "off" | "0" => Ok(false),
            _ => Err(BackendError::invalid(key, value, "expected a boolean")),
        }
    }

    /// Reads a single-byte character parameter such as a separator.
    ///
    /// The escapes `\t` and the word `tab` are accepted for a tab character.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::InvalidParameter`] if the value is not one ASCII character.
    pub fn byte(&self, key: &str) -> BackendResult<Option<u8>> {
        let Some(value) = self.raw(key) else {
            return Ok(None);
        };
        match value {
            "\\t" | "tab" => Ok(Some(b'\t')),
            _ if value.len() == 1 && value.is_ascii() => Ok(Some(value.as_bytes()[0])),
            _ => Err(BackendError::invalid(
                key,
                value,
                "expected a single ASCII character",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> BackendParams {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_required_and_optional() {
        let p = params(&[("file", " roads.csv "), ("blank", "  ")]);
        let reader = ParamReader::new(&p, "csv");

        assert_eq!(reader.required("file").unwrap(), "roads.csv");
        assert!(reader.optional("blank").is_none());

        let err = reader.required("inline").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing required parameter 'inline' for csv datasource"
        );
    }

    #[test]
    fn test_parse_number() {
        let p = params(&[("row_limit", "10"), ("bad", "ten")]);
        let reader = ParamReader::new(&p, "csv");

        assert_eq!(reader.parse::<usize>("row_limit").unwrap(), Some(10));
        assert_eq!(reader.parse::<usize>("missing").unwrap(), None);
        assert!(matches!(
            reader.parse::<usize>("bad"),
            Err(BackendError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_flag_values() {
        let p = params(&[("a", "Yes"), ("b", "0"), ("c", "maybe")]);
        let reader = ParamReader::new(&p, "csv");

        assert!(reader.flag("a", false).unwrap());
        assert!(!reader.flag("b", true).unwrap());
        assert!(reader.flag("missing", true).unwrap());
        assert!(reader.flag("c", false).is_err());
    }

    #[test]
    fn test_byte_values() {
        let p = params(&[("sep", ";"), ("tab", "\\t"), ("space", " "), ("long", ";;")]);
        let reader = ParamReader::new(&p, "csv");

        assert_eq!(reader.byte("sep").unwrap(), Some(b';'));
        assert_eq!(reader.byte("tab").unwrap(), Some(b'\t'));
        assert_eq!(reader.byte("space").unwrap(), Some(b' '));
        assert!(reader.byte("long").is_err());
    }
}
