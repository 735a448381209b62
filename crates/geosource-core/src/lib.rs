//! `geosource-core` exposes heterogeneous geospatial data sources behind one
//! [`Datasource`] type.
//!
//! This crate includes:
//! - **Datasource**: resolves a [`ParameterSet`] through a driver registry and
//!   reports extent, parameters and schema, and runs the full-extent feature query.
//! - **Value conversion**: maps backend field types and attribute values to the
//!   caller-facing [`LogicalType`] and [`Value`].
//! - **Extent codec**: converts envelopes to and from `[minx, miny, maxx, maxy]`.
//! - **Built-in drivers**: `memory`, `geojson`, `csv` and `raster`.
//!
//! # Examples
//!
//! ```
//! use geosource_core::{Datasource, ParameterSet, drivers::builtin_registry};
//!
//! let params = ParameterSet::new()
//!     .with("type", "geojson")
//!     .with("inline", r#"{"type":"Point","coordinates":[1.0,2.0]}"#);
//! let datasource = Datasource::new(&builtin_registry(), &params).unwrap();
//!
//! let description = datasource.describe().unwrap();
//! assert_eq!(description.geometry_type.as_str(), "point");
//! assert_eq!(datasource.parameters()["encoding"].as_str(), Some("utf-8"));
//! ```

pub mod datasource;
pub mod drivers;
pub mod error;
pub mod extent;
pub mod memory;
pub mod params;
pub mod schema;
pub mod value;

pub use datasource::{Datasource, Featureset};
pub use error::{DatasourceError, ErrorKind, Result};
pub use extent::{array_to_box, box_to_array};
pub use memory::{MemoryBackend, MemoryBackendBuilder};
pub use params::ParameterSet;
pub use schema::{Description, FieldDescription, GeometryKind};
pub use value::{LogicalType, Value};

// Backend-side contract, re-exported so callers can implement drivers
pub use geosource_core_common as common;
