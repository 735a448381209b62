//! Common types and traits shared across `GeoSource` crates.
//!
//! This crate provides the backend contract that is shared between
//! `geosource-core` and the format implementation crates, preventing circular
//! dependencies. A format crate implements [`Backend`] and [`FormatFactory`];
//! the core resolves parameter sets through a [`DriverRegistry`] and wraps the
//! resulting backend in a `Datasource`.

pub mod backend;
pub mod drivers;
pub mod envelope;
pub mod error;
pub mod factory;
pub mod feature;
pub mod query;
pub mod schema;

// Re-export commonly used types
pub use backend::{Backend, BackendParams, DatasourceKind, FeatureCursor};
pub use drivers::{Driver, DriverCapabilities, SupportStatus};
pub use envelope::Envelope;
pub use error::{BackendError, BackendResult};
pub use factory::{DriverRegistry, FormatFactory};
pub use feature::{AttributeValue, Feature, RasterTile};
pub use query::Query;
pub use schema::{AttributeDescriptor, FieldType, GeometryType, LayerDescriptor};
