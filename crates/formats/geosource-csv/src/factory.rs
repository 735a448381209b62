//! Factory implementation for CSV format support.
//!
//! This module implements the `FormatFactory` trait to integrate CSV
//! with the driver registry.

use geosource_core_common::{
    Backend, BackendParams, BackendResult, DatasourceKind, Driver, FormatFactory,
};

use crate::backend::{CsvBackend, DRIVER_NAME};

/// Factory for opening CSV backends.
pub struct CsvFormatFactory;

impl FormatFactory for CsvFormatFactory {
    fn driver(&self) -> Driver {
        Driver::new(DRIVER_NAME, "Comma Separated Value", DatasourceKind::Vector)
            .with_aliases(&["tsv", "txt"])
    }

    fn open(&self, params: &BackendParams) -> BackendResult<Box<dyn Backend>> {
        Ok(Box::new(CsvBackend::open(params)?))
    }
}
