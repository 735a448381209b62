//! Built-in driver catalog.
//!
//! # Examples
//!
//! ```
//! use geosource_core::drivers::builtin_registry;
//!
//! let registry = builtin_registry();
//! assert!(registry.find("GeoJSON").is_some());
//! assert_eq!(registry.driver_names(), vec!["csv", "geojson", "memory", "raster"]);
//! ```

use std::sync::Arc;

use geosource_core_common::DriverRegistry;
use geosource_csv::CsvFormatFactory;
use geosource_geojson::GeoJsonFormatFactory;
use geosource_raster::RasterFormatFactory;

use crate::memory::MemoryFormatFactory;

/// Registry with every driver shipped in this workspace.
///
/// Callers that add their own drivers start from this value and call
/// [`DriverRegistry::register`].
#[must_use]
pub fn builtin_registry() -> DriverRegistry {
    DriverRegistry::new()
        .with_factory(Arc::new(MemoryFormatFactory))
        .with_factory(Arc::new(GeoJsonFormatFactory))
        .with_factory(Arc::new(CsvFormatFactory))
        .with_factory(Arc::new(RasterFormatFactory))
}

#[cfg(test)]
mod tests {
    use super::*;
    use geosource_core_common::DatasourceKind;

    #[test]
    fn test_builtin_drivers_sorted() {
        let drivers = builtin_registry().drivers();
        let names: Vec<_> = drivers.iter().map(|d| d.short_name).collect();
        assert_eq!(names, vec!["csv", "geojson", "memory", "raster"]);
    }

    #[test]
    fn test_raster_driver_kind() {
        let registry = builtin_registry();
        let raster = registry.find("aaigrid").expect("alias should resolve");
        assert_eq!(raster.driver().kind, DatasourceKind::Raster);
        assert!(registry.find("shapefile").is_none());
    }
}
