//! Backend-side schema types: field descriptors and geometry tags.

use std::fmt;

/// Storage type of an attribute as declared by a backend.
///
/// This is the backend's own vocabulary; callers see the coarser logical
/// types produced by the core's value conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    Integer,
    Float,
    Double,
    String,
    Boolean,
    Geometry,
    Object,
    DateTime,
    Binary,
    /// A backend-specific type with no portable equivalent.
    Other(String),
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Integer => f.write_str("Integer"),
            FieldType::Float => f.write_str("Float"),
            FieldType::Double => f.write_str("Double"),
            FieldType::String => f.write_str("String"),
            FieldType::Boolean => f.write_str("Boolean"),
            FieldType::Geometry => f.write_str("Geometry"),
            FieldType::Object => f.write_str("Object"),
            FieldType::DateTime => f.write_str("DateTime"),
            FieldType::Binary => f.write_str("Binary"),
            FieldType::Other(tag) => write!(f, "Other({tag})"),
        }
    }
}

/// Name and storage type of a single attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeDescriptor {
    pub name: String,
    pub field_type: FieldType,
}

impl AttributeDescriptor {
    #[must_use]
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
        }
    }
}

/// Layer-level schema reported by a backend.
///
/// Descriptors keep the backend's declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerDescriptor {
    /// Layer name, usually the backend's driver name.
    pub name: String,
    /// Character encoding of string attributes (e.g. `"utf-8"`).
    pub encoding: String,
    descriptors: Vec<AttributeDescriptor>,
}

impl LayerDescriptor {
    #[must_use]
    pub fn new(name: impl Into<String>, encoding: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            encoding: encoding.into(),
            descriptors: Vec::new(),
        }
    }

    /// Appends a descriptor. A name that is already declared is replaced in place.
    pub fn add_descriptor(&mut self, descriptor: AttributeDescriptor) {
        match self
            .descriptors
            .iter_mut()
            .find(|existing| existing.name == descriptor.name)
        {
            Some(existing) => *existing = descriptor,
            None => self.descriptors.push(descriptor),
        }
    }

    #[must_use]
    pub fn with_descriptor(mut self, name: impl Into<String>, field_type: FieldType) -> Self {
        self.add_descriptor(AttributeDescriptor::new(name, field_type));
        self
    }

    #[must_use]
    pub fn descriptors(&self) -> &[AttributeDescriptor] {
        &self.descriptors
    }

    /// Field names in declaration order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.descriptors.iter().map(|d| d.name.as_str())
    }
}

/// Dominant geometry type of a vector backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryType {
    Point,
    LineString,
    Polygon,
    Collection,
    /// Geometry present but of no single recognizable type.
    Unknown,
}

impl GeometryType {
    /// Tag of a single geometry; multi-geometries map to their base type.
    #[must_use]
    pub fn of(geometry: &geo_types::Geometry<f64>) -> Self {
        use geo_types::Geometry;

        match geometry {
            Geometry::Point(_) | Geometry::MultiPoint(_) => GeometryType::Point,
            Geometry::Line(_) | Geometry::LineString(_) | Geometry::MultiLineString(_) => {
                GeometryType::LineString
            },
            Geometry::Polygon(_)
            | Geometry::MultiPolygon(_)
            | Geometry::Rect(_)
            | Geometry::Triangle(_) => GeometryType::Polygon,
            Geometry::GeometryCollection(_) => GeometryType::Collection,
        }
    }

    /// Folds a sequence of geometry tags into the dominant one.
    ///
    /// Returns `None` for an empty sequence, the shared tag when all agree, and
    /// [`GeometryType::Collection`] otherwise.
    pub fn infer<I>(tags: I) -> Option<Self>
    where
        I: IntoIterator<Item = GeometryType>,
    {
        tags.into_iter().fold(None, |acc, tag| match acc {
            None => Some(tag),
            Some(current) if current == tag => Some(current),
            Some(_) => Some(GeometryType::Collection),
        })
    }
}
