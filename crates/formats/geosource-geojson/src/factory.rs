//! Factory implementation for `GeoJSON` format support.
//!
//! This module implements the `FormatFactory` trait to integrate `GeoJSON`
//! with the driver registry.

use geosource_core_common::{
    Backend, BackendParams, BackendResult, DatasourceKind, Driver, FormatFactory,
};

use crate::backend::{DRIVER_NAME, GeoJsonBackend};

/// Factory for opening `GeoJSON` backends.
pub struct GeoJsonFormatFactory;

impl FormatFactory for GeoJsonFormatFactory {
    fn driver(&self) -> Driver {
        Driver::new(DRIVER_NAME, "GeoJSON", DatasourceKind::Vector)
            .with_aliases(&["json", "geojsonseq"])
    }

    fn open(&self, params: &BackendParams) -> BackendResult<Box<dyn Backend>> {
        Ok(Box::new(GeoJsonBackend::open(params)?))
    }
}
