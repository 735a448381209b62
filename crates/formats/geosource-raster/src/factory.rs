//! Factory implementation for ASCII grid raster support.

use geosource_core_common::{
    Backend, BackendParams, BackendResult, DatasourceKind, Driver, FormatFactory,
};

use crate::backend::{DRIVER_NAME, RasterBackend};

/// Factory for opening raster backends.
pub struct RasterFormatFactory;

impl FormatFactory for RasterFormatFactory {
    fn driver(&self) -> Driver {
        Driver::new(DRIVER_NAME, "ESRI ASCII Grid", DatasourceKind::Raster)
            .with_aliases(&["aaigrid", "asc"])
    }

    fn open(&self, params: &BackendParams) -> BackendResult<Box<dyn Backend>> {
        Ok(Box::new(RasterBackend::open(params)?))
    }
}
