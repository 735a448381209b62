use std::fs;
use std::sync::Arc;

use geosource_core_common::{
    Backend, BackendParams, BackendResult, DatasourceKind, DriverRegistry, Envelope, Query,
};
use geosource_raster::RasterFormatFactory;
use tempfile::TempDir;

const ELEVATION: &str = "\
NCOLS 3
NROWS 3
XLLCENTER 500.5
YLLCENTER 1000.5
CELLSIZE 1
NODATA_VALUE -1
10 11 12
20 -1 22
30 31 32
";

fn open(dir: &TempDir, extra: &[(&str, &str)]) -> BackendResult<Box<dyn Backend>> {
    fs::write(dir.path().join("elevation.asc"), ELEVATION).unwrap();
    let mut params = BackendParams::new();
    params.insert("type".to_string(), "raster".to_string());
    params.insert("file".to_string(), "elevation.asc".to_string());
    params.insert("base".to_string(), dir.path().to_string_lossy().into_owned());
    for (key, value) in extra {
        params.insert((*key).to_string(), (*value).to_string());
    }
    DriverRegistry::new()
        .with_factory(Arc::new(RasterFormatFactory))
        .resolve(&params)
}

/// Test reading an elevation grid from disk
#[test]
fn test_elevation_grid() -> BackendResult<()> {
    let dir = TempDir::new().unwrap();
    let backend = open(&dir, &[])?;

    assert_eq!(backend.kind(), DatasourceKind::Raster);
    assert_eq!(backend.envelope()?, Envelope::new(500.0, 1000.0, 503.0, 1003.0));

    let tile = backend
        .features(&Query::new(backend.envelope()?))?
        .expect("full extent query")
        .next()
        .expect("one raster feature")?
        .raster
        .expect("raster tile");
    assert_eq!((tile.width, tile.height), (3, 3));
    assert_eq!(tile.nodata, Some(-1.0));
    assert_eq!(tile.get(1, 1), Some(-1.0));
    assert_eq!(tile.get(0, 2), Some(30.0));
    Ok(())
}

/// Test that a window query returns only the overlapping cells
#[test]
fn test_window_query() -> BackendResult<()> {
    let dir = TempDir::new().unwrap();
    let backend = open(&dir, &[])?;

    let query = Query::new(Envelope::new(502.2, 1002.2, 502.8, 1002.8));
    let feature = backend.features(&query)?.unwrap().next().unwrap()?;
    let tile = feature.raster.unwrap();
    assert_eq!(tile.data, vec![12.0]);
    assert_eq!(tile.envelope, Envelope::new(502.0, 1002.0, 503.0, 1003.0));
    Ok(())
}

/// Test that the `asc` alias and an explicit extent are honoured
#[test]
fn test_extent_override_through_alias() -> BackendResult<()> {
    let dir = TempDir::new().unwrap();
    let backend = open(
        &dir,
        &[
            ("type", "ASC"),
            ("lox", "0"),
            ("loy", "0"),
            ("hix", "300"),
            ("hiy", "300"),
        ],
    )?;
    assert_eq!(backend.envelope()?, Envelope::new(0.0, 0.0, 300.0, 300.0));
    Ok(())
}

/// Test that a corrupt grid fails to open
#[test]
fn test_corrupt_grid() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("broken.asc"), "ncols 2\nnrows 2\n1 2 3 4\n").unwrap();

    let mut params = BackendParams::new();
    params.insert("type".to_string(), "raster".to_string());
    params.insert(
        "file".to_string(),
        dir.path().join("broken.asc").to_string_lossy().into_owned(),
    );
    let err = DriverRegistry::new()
        .with_factory(Arc::new(RasterFormatFactory))
        .resolve(&params)
        .err()
        .unwrap();
    assert!(err.to_string().contains("Missing 'cellsize' header"));
}
