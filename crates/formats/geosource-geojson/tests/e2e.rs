use std::fs::File;
use std::io::Write;
use std::sync::Arc;

use geosource_core_common::{
    AttributeValue, BackendError, BackendParams, DatasourceKind, DriverRegistry, Envelope,
    GeometryType, Query,
};
use geosource_geojson::GeoJsonFormatFactory;
use tempfile::TempDir;

const CITIES: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    {"type":"Feature","geometry":{"type":"Point","coordinates":[12.4533865,41.9032822]},
     "properties":{"name":"Vatican City","pop_max":832}},
    {"type":"Feature","geometry":{"type":"Point","coordinates":[7.4069,43.7396]},
     "properties":{"name":"Monaco","pop_max":36371}},
    {"type":"Feature","geometry":{"type":"Point","coordinates":[-74.006,40.7128]},
     "properties":{"name":"New York","pop_max":19040000}}
  ]
}"#;

fn write_cities(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("cities.geojson");
    let mut file = File::create(&path).unwrap();
    file.write_all(CITIES.as_bytes()).unwrap();
    path
}

fn registry() -> DriverRegistry {
    DriverRegistry::new().with_factory(Arc::new(GeoJsonFormatFactory))
}

fn params(pairs: &[(&str, &str)]) -> BackendParams {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

/// Test opening a `GeoJSON` file through the registry
#[test]
fn test_open_cities_from_file() {
    let dir = TempDir::new().unwrap();
    let path = write_cities(&dir);

    let backend = registry()
        .resolve(&params(&[
            ("type", "geojson"),
            ("file", path.to_str().unwrap()),
        ]))
        .unwrap();

    assert_eq!(backend.kind(), DatasourceKind::Vector);
    assert_eq!(backend.geometry_type().unwrap(), Some(GeometryType::Point));

    let envelope = backend.envelope().unwrap();
    assert!((envelope.minx - -74.006).abs() < 1e-9);
    assert!((envelope.maxx - 12.453_386_5).abs() < 1e-9);
    assert!((envelope.maxy - 43.7396).abs() < 1e-9);
}

/// Test resolving relative file names against `base`
#[test]
fn test_open_with_base_directory() {
    let dir = TempDir::new().unwrap();
    write_cities(&dir);

    let backend = registry()
        .resolve(&params(&[
            ("type", "GeoJSON"),
            ("file", "cities.geojson"),
            ("base", dir.path().to_str().unwrap()),
        ]))
        .unwrap();

    let names: Vec<_> = backend
        .descriptor()
        .unwrap()
        .field_names()
        .map(str::to_string)
        .collect();
    assert_eq!(names, vec!["name", "pop_max"]);
}

/// Test querying the European subset of the cities
#[test]
fn test_query_european_cities() {
    let dir = TempDir::new().unwrap();
    let path = write_cities(&dir);
    let backend = registry()
        .resolve(&params(&[
            ("type", "geojson"),
            ("file", path.to_str().unwrap()),
        ]))
        .unwrap();

    let mut query = Query::new(Envelope::new(0.0, 35.0, 20.0, 50.0));
    query.add_property_name("name");
    query.add_property_name("pop_max");

    let features: Vec<_> = backend
        .features(&query)
        .unwrap()
        .expect("European cities should match")
        .map(Result::unwrap)
        .collect();

    assert_eq!(features.len(), 2);
    assert_eq!(
        features[1].get("name"),
        Some(&AttributeValue::from("Monaco"))
    );
    assert_eq!(features[1].get("pop_max"), Some(&AttributeValue::Integer(36371)));
}

/// Test that a missing file is reported with the path
#[test]
fn test_missing_file() {
    let err = registry()
        .resolve(&params(&[("type", "geojson"), ("file", "/nonexistent/x.geojson")]))
        .err()
        .unwrap();
    assert!(matches!(err, BackendError::Io { .. }));
    assert!(err.to_string().contains("/nonexistent/x.geojson"));
}

/// Test that a missing `file` parameter names the parameter
#[test]
fn test_missing_file_parameter() {
    let err = registry()
        .resolve(&params(&[("type", "geojson")]))
        .err()
        .unwrap();
    assert_eq!(
        err.to_string(),
        "Missing required parameter 'file' for geojson datasource"
    );
}

/// Test that malformed documents fail to open
#[test]
fn test_malformed_document() {
    let err = registry()
        .resolve(&params(&[("type", "geojson"), ("inline", "{ not json")]))
        .err()
        .unwrap();
    assert!(matches!(err, BackendError::Read(_)));
}
