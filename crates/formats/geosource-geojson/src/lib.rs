//! `GeoJSON` backend for `GeoSource`.
//!
//! Opens `FeatureCollection`s, single features, bare geometries and
//! newline-delimited `GeoJSON` sequences, from a `file` or an `inline`
//! parameter. The whole document is parsed when the backend is opened;
//! queries are answered from memory, so repeated queries see the same data.

mod backend;
mod factory;
pub mod parser;

pub use backend::GeoJsonBackend;
pub use factory::GeoJsonFormatFactory;
