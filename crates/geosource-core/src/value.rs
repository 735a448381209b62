//! Conversion of backend attribute values and field types into the
//! caller-facing representation.

use std::collections::BTreeMap;
use std::fmt;

use geo_types::Geometry;
use geosource_core_common::{AttributeValue, Feature, FieldType};
use geozero::ToWkt;
use serde::ser::{Error as _, Serialize, Serializer};
use serde_json::Value as JsonValue;

/// Caller-facing classification of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalType {
    Number,
    String,
    Boolean,
    Geometry,
    Object,
    Unknown,
}

impl LogicalType {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            LogicalType::Number => "Number",
            LogicalType::String => "String",
            LogicalType::Boolean => "Boolean",
            LogicalType::Geometry => "Geometry",
            LogicalType::Object => "Object",
            LogicalType::Unknown => "Unknown",
        }
    }
}

impl From<&FieldType> for LogicalType {
    fn from(field_type: &FieldType) -> Self {
        match field_type {
            FieldType::Integer | FieldType::Float | FieldType::Double => LogicalType::Number,
            FieldType::String => LogicalType::String,
            FieldType::Boolean => LogicalType::Boolean,
            FieldType::Geometry => LogicalType::Geometry,
            FieldType::Object => LogicalType::Object,
            FieldType::DateTime | FieldType::Binary | FieldType::Other(_) => LogicalType::Unknown,
        }
    }
}

impl From<FieldType> for LogicalType {
    fn from(field_type: FieldType) -> Self {
        LogicalType::from(&field_type)
    }
}

impl fmt::Display for LogicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for LogicalType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Tagged attribute or parameter value handed to callers.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    String(String),
    Boolean(bool),
    Geometry(Geometry<f64>),
    /// Nested JSON array or object.
    Object(JsonValue),
    Null,
}

impl Value {
    /// Logical type of the value; `Null` maps to [`LogicalType::Unknown`].
    #[must_use]
    pub fn logical_type(&self) -> LogicalType {
        match self {
            Value::Number(_) => LogicalType::Number,
            Value::String(_) => LogicalType::String,
            Value::Boolean(_) => LogicalType::Boolean,
            Value::Geometry(_) => LogicalType::Geometry,
            Value::Object(_) => LogicalType::Object,
            Value::Null => LogicalType::Unknown,
        }
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Converts every attribute of a feature.
    #[must_use]
    pub fn from_attributes(feature: &Feature) -> BTreeMap<String, Value> {
        feature
            .attributes
            .iter()
            .map(|(name, value)| (name.clone(), Value::from(value)))
            .collect()
    }
}

impl From<AttributeValue> for Value {
    fn from(value: AttributeValue) -> Self {
        match value {
            AttributeValue::Null => Value::Null,
            AttributeValue::Boolean(b) => Value::Boolean(b),
            #[allow(clippy::cast_precision_loss)]
            AttributeValue::Integer(i) => Value::Number(i as f64),
            AttributeValue::Double(d) => Value::Number(d),
            AttributeValue::String(s) => Value::String(s),
            AttributeValue::Geometry(g) => Value::Geometry(g),
            AttributeValue::Object(o) => Value::Object(o),
        }
    }
}

impl From<&AttributeValue> for Value {
    fn from(value: &AttributeValue) -> Self {
        Value::from(value.clone())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{n}"),
            Value::String(s) => f.write_str(s),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Geometry(g) => match g.to_wkt() {
                Ok(wkt) => f.write_str(&wkt),
                Err(_) => f.write_str("<geometry>"),
            },
            Value::Object(o) => write!(f, "{o}"),
            Value::Null => f.write_str("null"),
        }
    }
}

/// Geometries serialize as WKT strings.
impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Number(n) => serializer.serialize_f64(*n),
            Value::String(s) => serializer.serialize_str(s),
            Value::Boolean(b) => serializer.serialize_bool(*b),
            Value::Geometry(g) => {
                let wkt = g.to_wkt().map_err(S::Error::custom)?;
                serializer.serialize_str(&wkt)
            },
            Value::Object(o) => o.serialize(serializer),
            Value::Null => serializer.serialize_none(),
        }
    }
}
