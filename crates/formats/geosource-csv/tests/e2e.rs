use std::fs;
use std::sync::Arc;

use geosource_core_common::{
    AttributeValue, BackendError, BackendParams, BackendResult, DriverRegistry, FieldType,
    GeometryType, Query,
};
use geosource_csv::CsvFormatFactory;
use tempfile::TempDir;

const PARCELS: &str = r#"parcel_id,owner,assessed,WKT
101,"Smith, J.",125000.50,"POLYGON((0 0,10 0,10 10,0 10,0 0))"
102,Garcia,98000,"POLYGON((10 0,20 0,20 10,10 10,10 0))"
103,Chen,,"MULTIPOLYGON(((20 0,30 0,30 10,20 10,20 0)))"
"#;

fn registry() -> DriverRegistry {
    DriverRegistry::new().with_factory(Arc::new(CsvFormatFactory))
}

fn params(pairs: &[(&str, &str)]) -> BackendParams {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

fn write_file(dir: &TempDir, name: &str, content: &str) -> String {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path.to_string_lossy().into_owned()
}

/// Test reading quoted WKT polygons from a CSV file
#[test]
fn test_parcels_wkt_polygons() -> BackendResult<()> {
    let dir = TempDir::new().unwrap();
    let file = write_file(&dir, "parcels.csv", PARCELS);

    let backend = registry().resolve(&params(&[("type", "csv"), ("file", &file)]))?;

    let descriptor = backend.descriptor()?;
    let fields: Vec<_> = descriptor
        .descriptors()
        .iter()
        .map(|d| (d.name.as_str(), d.field_type.clone()))
        .collect();
    assert_eq!(
        fields,
        vec![
            ("parcel_id", FieldType::Integer),
            ("owner", FieldType::String),
            ("assessed", FieldType::Double),
        ]
    );
    assert_eq!(backend.geometry_type()?, Some(GeometryType::Polygon));

    let envelope = backend.envelope()?;
    assert_eq!(
        [envelope.minx, envelope.miny, envelope.maxx, envelope.maxy],
        [0.0, 0.0, 30.0, 10.0]
    );

    let mut query = Query::new(envelope);
    for name in descriptor.field_names() {
        query.add_property_name(name);
    }
    let features = backend
        .features(&query)?
        .expect("all parcels intersect the full extent")
        .collect::<BackendResult<Vec<_>>>()?;

    assert_eq!(features.len(), 3);
    assert_eq!(features[0].get("owner"), Some(&AttributeValue::from("Smith, J.")));
    assert_eq!(features[0].get("assessed"), Some(&AttributeValue::Double(125_000.5)));
    assert_eq!(features[2].get("assessed"), Some(&AttributeValue::Null));
    Ok(())
}

/// Test tab separated input with a coordinate pair and the `tsv` alias
#[test]
fn test_tab_separated_points() -> BackendResult<()> {
    let dir = TempDir::new().unwrap();
    let file = write_file(
        &dir,
        "stations.tsv",
        "station\tlongitude\tlatitude\nA1\t-3.7\t40.4\nB2\t2.17\t41.38\n",
    );

    let backend = registry().resolve(&params(&[("type", "tsv"), ("file", &file)]))?;
    assert_eq!(backend.geometry_type()?, Some(GeometryType::Point));
    assert_eq!(backend.descriptor()?.field_names().collect::<Vec<_>>(), vec!["station"]);
    Ok(())
}

/// Test that effective parameters include the defaults
#[test]
fn test_effective_params() -> BackendResult<()> {
    let backend = registry().resolve(&params(&[
        ("type", "csv"),
        ("inline", "name,x,y\na,1,2\n"),
        ("strict", "yes"),
    ]))?;

    let effective = backend.params();
    assert_eq!(effective["encoding"], AttributeValue::from("utf-8"));
    assert_eq!(effective["quote"], AttributeValue::from("\""));
    assert_eq!(effective["strict"], AttributeValue::from("yes"));
    assert_eq!(effective["type"], AttributeValue::from("csv"));
    Ok(())
}

/// Test that strict mode rejects the file at open time
#[test]
fn test_strict_rejects_bad_geometry() {
    let err = registry()
        .resolve(&params(&[
            ("type", "csv"),
            ("inline", "name,wkt\na,POINT(1 1)\nb,NOT WKT\n"),
            ("strict", "true"),
        ]))
        .err()
        .unwrap();
    assert!(matches!(err, BackendError::Read(_)));
    assert!(err.to_string().contains("line 3"));
}

/// Test that a malformed option is reported against its parameter
#[test]
fn test_invalid_separator() {
    let err = registry()
        .resolve(&params(&[
            ("type", "csv"),
            ("inline", "a,b\n1,2\n"),
            ("separator", "::"),
        ]))
        .err()
        .unwrap();
    assert!(err.to_string().contains("'separator'"));
}

/// Test decoding a Latin-1 file named by the encoding parameter
#[test]
fn test_latin1_file_with_encoding() -> BackendResult<()> {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cafes.csv");
    fs::write(&path, b"name,lon,lat\nCaf\xe9 M\xfcller,13.4,52.5\n").unwrap();
    let file = path.to_string_lossy().into_owned();

    let err = registry()
        .resolve(&params(&[("type", "csv"), ("file", &file)]))
        .err()
        .unwrap();
    assert!(matches!(err, BackendError::Read(_)));

    let backend = registry().resolve(&params(&[
        ("type", "csv"),
        ("file", &file),
        ("encoding", "latin1"),
    ]))?;
    assert_eq!(backend.descriptor()?.encoding, "latin1");

    let mut query = Query::new(backend.envelope()?);
    query.add_property_name("name");
    let feature = backend.features(&query)?.expect("one cafe").next().unwrap()?;
    assert_eq!(feature.get("name"), Some(&AttributeValue::from("Café Müller")));
    Ok(())
}
