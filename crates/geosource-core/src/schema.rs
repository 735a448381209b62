//! Schema descriptor returned by [`Datasource::describe`](crate::Datasource::describe).

use std::fmt;

use geosource_core_common::{DatasourceKind, GeometryType, LayerDescriptor};
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::value::LogicalType;

/// Dominant geometry kind reported in a [`Description`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryKind {
    Point,
    LineString,
    Polygon,
    Collection,
    Raster,
    Unknown,
}

impl GeometryKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            GeometryKind::Point => "point",
            GeometryKind::LineString => "linestring",
            GeometryKind::Polygon => "polygon",
            GeometryKind::Collection => "collection",
            GeometryKind::Raster => "raster",
            GeometryKind::Unknown => "unknown",
        }
    }
}

impl From<Option<GeometryType>> for GeometryKind {
    fn from(tag: Option<GeometryType>) -> Self {
        match tag {
            Some(GeometryType::Point) => GeometryKind::Point,
            Some(GeometryType::LineString) => GeometryKind::LineString,
            Some(GeometryType::Polygon) => GeometryKind::Polygon,
            Some(GeometryType::Collection) => GeometryKind::Collection,
            Some(GeometryType::Unknown) | None => GeometryKind::Unknown,
        }
    }
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One declared field and its logical type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescription {
    pub name: String,
    pub logical_type: LogicalType,
}

/// Schema of a datasource: kind, encoding, fields and geometry kind.
///
/// Serializes to an object with exactly the keys `type`, `encoding`,
/// `fields` (name to logical type, in declaration order) and `geometry_type`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Description {
    pub kind: DatasourceKind,
    pub encoding: String,
    pub fields: Vec<FieldDescription>,
    pub geometry_type: GeometryKind,
}

impl Description {
    /// Builds a description from a backend's layer descriptor.
    #[must_use]
    pub fn from_layer(
        kind: DatasourceKind,
        layer: &LayerDescriptor,
        geometry_type: GeometryKind,
    ) -> Self {
        Self {
            kind,
            encoding: layer.encoding.clone(),
            fields: layer
                .descriptors()
                .iter()
                .map(|d| FieldDescription {
                    name: d.name.clone(),
                    logical_type: LogicalType::from(&d.field_type),
                })
                .collect(),
            geometry_type,
        }
    }

    /// Logical type of the named field.
    #[must_use]
    pub fn field_type(&self, name: &str) -> Option<LogicalType> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.logical_type)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Serializes to a JSON string keeping field order.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_string(&self, pretty: bool) -> serde_json::Result<String> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }
}

struct Fields<'a>(&'a [FieldDescription]);

impl Serialize for Fields<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for field in self.0 {
            map.serialize_entry(&field.name, &field.logical_type)?;
        }
        map.end()
    }
}

impl Serialize for Description {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(4))?;
        map.serialize_entry("type", self.kind.as_str())?;
        map.serialize_entry("encoding", &self.encoding)?;
        map.serialize_entry("fields", &Fields(&self.fields))?;
        map.serialize_entry("geometry_type", self.geometry_type.as_str())?;
        map.end()
    }
}
