//! Raster backend for geosource reading ESRI ASCII grids.

mod backend;
mod factory;
pub mod grid;

pub use backend::RasterBackend;
pub use factory::RasterFormatFactory;
pub use grid::{AsciiGrid, GridHeader};
