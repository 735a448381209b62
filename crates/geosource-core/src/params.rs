//! Caller-supplied parameter sets.

use std::fmt::Display;

use geosource_core_common::BackendParams;
use serde_json::Value as JsonValue;

use crate::error::{DatasourceError, Result};

/// Ordered, key-unique parameters used to construct a datasource.
///
/// Values are coerced to strings when they are added; the backend decides how
/// to reinterpret them. Setting an existing key replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterSet {
    entries: Vec<(String, String)>,
}

impl ParameterSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key`, coercing `value` to its string form.
    pub fn set(&mut self, key: impl Into<String>, value: impl Display) {
        let key = key.into();
        let value = value.to_string();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Display) -> Self {
        self.set(key, value);
        self
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Copies every entry from `other`, overriding existing keys.
    pub fn extend_from(&mut self, other: &ParameterSet) {
        for (key, value) in other.iter() {
            self.set(key, value);
        }
    }

    /// Builds a parameter set from a JSON object.
    ///
    /// Strings are taken verbatim, `null` becomes an empty string, and other
    /// values use their compact JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`DatasourceError::Configuration`] if `value` is not an object.
    pub fn from_json(value: &JsonValue) -> Result<Self> {
        let JsonValue::Object(object) = value else {
            return Err(DatasourceError::Configuration {
                message: format!("Parameters must be a JSON object, found {value}"),
            });
        };
        let mut params = Self::new();
        for (key, value) in object {
            match value {
                JsonValue::String(s) => params.set(key.as_str(), s),
                JsonValue::Null => params.set(key.as_str(), ""),
                other => params.set(key.as_str(), other),
            }
        }
        Ok(params)
    }

    /// Parses a `key=value` assignment. The value may contain further `=`.
    ///
    /// # Errors
    ///
    /// Returns [`DatasourceError::Configuration`] if there is no `=` or the key is blank.
    pub fn parse_assignment(assignment: &str) -> Result<(String, String)> {
        match assignment.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => {
                Ok((key.trim().to_string(), value.to_string()))
            },
            _ => Err(DatasourceError::Configuration {
                message: format!("Invalid parameter '{assignment}', expected key=value"),
            }),
        }
    }

    /// Builds a parameter set from `key=value` strings; later keys win.
    ///
    /// # Errors
    ///
    /// Returns [`DatasourceError::Configuration`] for the first malformed assignment.
    pub fn from_assignments<I, S>(assignments: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut params = Self::new();
        for assignment in assignments {
            let (key, value) = Self::parse_assignment(assignment.as_ref())?;
            params.set(key, value);
        }
        Ok(params)
    }

    /// The string map handed to the driver catalog. Nothing is dropped.
    #[must_use]
    pub fn to_backend_params(&self) -> BackendParams {
        self.entries.iter().cloned().collect()
    }
}

impl<K, V> FromIterator<(K, V)> for ParameterSet
where
    K: Into<String>,
    V: Display,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (key, value) in iter {
            params.set(key, value);
        }
        params
    }
}
