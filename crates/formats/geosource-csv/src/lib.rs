//! CSV backend for geosource.
//!
//! Reads delimited text with geometries stored as WKT, as `GeoJSON`, or as a
//! pair of longitude/latitude columns. The whole file is parsed when the
//! backend is opened; queries run against the in-memory rows.

mod backend;
mod factory;
pub mod geospatial;
pub mod options;

pub use backend::CsvBackend;
pub use factory::CsvFormatFactory;
pub use options::CsvOptions;
