//! Features and the backend-side attribute value representation.

use std::collections::BTreeMap;
use std::fmt;

use geo_types::Geometry;
use serde_json::Value as JsonValue;

use crate::envelope::Envelope;

/// Dynamically-typed attribute or parameter value as stored by a backend.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Double(f64),
    String(String),
    Geometry(Geometry<f64>),
    /// Nested JSON array or object.
    Object(JsonValue),
}

impl AttributeValue {
    /// Converts a JSON value, keeping integers distinct from doubles.
    #[must_use]
    pub fn from_json(value: JsonValue) -> Self {
        match value {
            JsonValue::Null => AttributeValue::Null,
            JsonValue::Bool(b) => AttributeValue::Boolean(b),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => AttributeValue::Integer(i),
                None => AttributeValue::Double(n.as_f64().unwrap_or(f64::NAN)),
            },
            JsonValue::String(s) => AttributeValue::String(s),
            nested @ (JsonValue::Array(_) | JsonValue::Object(_)) => AttributeValue::Object(nested),
        }
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, AttributeValue::Null)
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Null => f.write_str("null"),
            AttributeValue::Boolean(b) => write!(f, "{b}"),
            AttributeValue::Integer(i) => write!(f, "{i}"),
            AttributeValue::Double(d) => write!(f, "{d}"),
            AttributeValue::String(s) => f.write_str(s),
            AttributeValue::Geometry(_) => f.write_str("<geometry>"),
            AttributeValue::Object(nested) => write!(f, "{nested}"),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::String(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::String(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::Integer(value)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        AttributeValue::Double(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Boolean(value)
    }
}

/// Grid of cell values covering an envelope, row-major from the top row.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterTile {
    pub width: usize,
    pub height: usize,
    pub envelope: Envelope,
    pub nodata: Option<f64>,
    pub data: Vec<f64>,
}

impl RasterTile {
    /// Cell value at (`col`, `row`), or `None` outside the grid.
    #[must_use]
    pub fn get(&self, col: usize, row: usize) -> Option<f64> {
        if col >= self.width || row >= self.height {
            return None;
        }
        self.data.get(row * self.width + col).copied()
    }
}

/// One record yielded by a feature cursor.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub id: i64,
    pub geometry: Option<Geometry<f64>>,
    pub attributes: BTreeMap<String, AttributeValue>,
    pub raster: Option<RasterTile>,
}

impl Feature {
    #[must_use]
    pub fn new(id: i64) -> Self {
        Self {
            id,
            geometry: None,
            attributes: BTreeMap::new(),
            raster: None,
        }
    }

    #[must_use]
    pub fn with_geometry(mut self, geometry: Geometry<f64>) -> Self {
        self.geometry = Some(geometry);
        self
    }

    #[must_use]
    pub fn with_attribute(
        mut self,
        name: impl Into<String>,
        value: impl Into<AttributeValue>,
    ) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }

    /// Bounds of the feature's geometry, falling back to its raster envelope.
    #[must_use]
    pub fn envelope(&self) -> Option<Envelope> {
        self.geometry
            .as_ref()
            .and_then(Envelope::from_geometry)
            .or_else(|| self.raster.as_ref().map(|tile| tile.envelope))
    }
}
