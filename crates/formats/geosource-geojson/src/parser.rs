//! `GeoJSON` parsing into in-memory feature records.

use std::convert::TryInto;
use std::fmt;

use geo_types::Geometry;
use geojson::feature::Id;
use geojson::{
    Feature, FeatureCollection, GeoJson, Geometry as GeoJsonGeometry, JsonObject, JsonValue,
};
use geosource_shared::{SourcePosition, SpatialFormatReadError, SpatialFormatResult};

/// Parsed `GeoJSON` feature with materialized properties and geometry.
#[derive(Debug, Clone)]
pub struct FeatureRecord {
    /// Numeric feature id, when the document carries one.
    pub id: Option<i64>,
    pub properties: JsonObject,
    pub geometry: Option<Geometry<f64>>,
}

/// Parse a document into a vector of `FeatureRecord`s.
///
/// A single `GeoJSON` object is tried first; if that fails the input is read
/// as a newline-delimited sequence.
///
/// # Errors
///
/// Returns a parse error describing both attempts when neither succeeds.
pub fn parse_geojson_str(
    data: &str,
    context: impl Into<String>,
) -> SpatialFormatResult<Vec<FeatureRecord>> {
    let context = context.into();

    match data.parse::<GeoJson>() {
        Ok(geojson) => geojson_to_records(geojson, &context),
        Err(primary_err) => {
            let primary_err_message = primary_err.to_string();
            match parse_geojson_sequence(data, &context) {
                Ok(records) => Ok(records),
                Err(sequence_err) => {
                    Err(combine_errors(&primary_err_message, &sequence_err, context))
                },
            }
        },
    }
}

fn geojson_to_records(geojson: GeoJson, context: &str) -> SpatialFormatResult<Vec<FeatureRecord>> {
    match geojson {
        GeoJson::FeatureCollection(collection) => feature_collection_to_records(collection, context),
        GeoJson::Feature(feature) => Ok(vec![feature_to_record(feature, context)?]),
        GeoJson::Geometry(geometry) => Ok(vec![FeatureRecord {
            id: None,
            properties: JsonObject::new(),
            geometry: Some(convert_geometry(geometry, context)?),
        }]),
    }
}

fn feature_collection_to_records(
    collection: FeatureCollection,
    context: &str,
) -> SpatialFormatResult<Vec<FeatureRecord>> {
    collection
        .features
        .into_iter()
        .map(|feature| feature_to_record(feature, context))
        .collect()
}

fn feature_to_record(feature: Feature, context: &str) -> SpatialFormatResult<FeatureRecord> {
    let geometry = match feature.geometry {
        Some(geometry) => Some(convert_geometry(geometry, context)?),
        None => None,
    };

    let id = match feature.id {
        Some(Id::Number(number)) => number.as_i64(),
        Some(Id::String(text)) => text.parse().ok(),
        None => None,
    };

    Ok(FeatureRecord {
        id,
        properties: feature.properties.unwrap_or_default(),
        geometry,
    })
}

fn convert_geometry(
    geometry: GeoJsonGeometry,
    context: &str,
) -> SpatialFormatResult<Geometry<f64>> {
    geometry.try_into().map_err(|err| {
        SpatialFormatReadError::parse(format!("Failed to convert GeoJSON geometry: {err}"), context)
    })
}

fn parse_geojson_sequence(data: &str, context: &str) -> SpatialFormatResult<Vec<FeatureRecord>> {
    let mut records = Vec::new();
    for (line_idx, line) in data.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let geojson = line.parse::<GeoJson>().map_err(|err| {
            SpatialFormatReadError::parse(format!("Failed to parse GeoJSON feature: {err}"), context)
                .at(SourcePosition::line((line_idx + 1) as u64))
        })?;

        records.append(&mut geojson_to_records(geojson, context)?);
    }

    if records.is_empty() {
        Err(SpatialFormatReadError::parse("No GeoJSON features found", context))
    } else {
        Ok(records)
    }
}

fn combine_errors(
    collection_err: &str,
    sequence_err: &SpatialFormatReadError,
    context: String,
) -> SpatialFormatReadError {
    let message = format!(
        "Failed to parse GeoJSON as FeatureCollection ({collection_err}); \
         also failed to parse as GeoJSON sequence: {sequence_err}"
    );
    SpatialFormatReadError::parse(message, context)
}

/// Helper to describe JSON value kinds for log messages.
pub(crate) fn describe_value(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "bool",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

impl fmt::Display for FeatureRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let geom = if self.geometry.is_some() {
            "Some(Geometry)"
        } else {
            "None"
        };
        write!(
            f,
            "FeatureRecord(properties={} keys, geometry={geom})",
            self.properties.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_feature_collection() {
        let data = r#"{
  "type": "FeatureCollection",
  "features": [
    {"type":"Feature","id":7,"geometry":{"type":"Point","coordinates":[1.0,2.0]},"properties":{"name":"A"}},
    {"type":"Feature","geometry":null,"properties":{"value":42}}
  ]
}"#;

        let records = parse_geojson_str(data, "test").expect("parse");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, Some(7));
        assert!(records[0].geometry.is_some());
        assert_eq!(records[0].properties.get("name").unwrap(), "A");
        assert!(records[1].geometry.is_none());
        assert_eq!(records[1].properties.get("value").unwrap(), 42);
    }

    #[test]
    fn parse_single_feature_without_properties() {
        let data = r#"{"type":"Feature","geometry":{"type":"Point","coordinates":[0,0]}}"#;

        let records = parse_geojson_str(data, "test").expect("parse");
        assert_eq!(records.len(), 1);
        assert!(records[0].geometry.is_some());
        assert!(records[0].properties.is_empty());
    }

    #[test]
    fn parse_single_geometry() {
        let data = r#"{"type":"Point","coordinates":[7.0,8.0]}"#;

        let records = parse_geojson_str(data, "test").expect("parse");
        assert_eq!(records.len(), 1);
        assert!(records[0].geometry.is_some());
        assert!(records[0].properties.is_empty());
    }

    #[test]
    fn parse_sequence_with_empty_lines() {
        let data = r#"{"type":"Feature","geometry":{"type":"Point","coordinates":[0,0]},"properties":{"id":1}}

{"type":"Feature","geometry":{"type":"Point","coordinates":[1,1]},"properties":{"id":2}}
"#;

        let records = parse_geojson_str(data, "seq").expect("sequence");
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn parse_empty_sequence_fails() {
        let err = parse_geojson_str("\n\n\n", "empty").unwrap_err();
        assert!(err.to_string().contains("No GeoJSON features found"));
    }

    #[test]
    fn parse_invalid_geojson_sequence_line() {
        let data = r#"{"type":"Feature","geometry":{"type":"Point","coordinates":[0,0]},"properties":{"id":1}}
not valid json"#;

        let err = parse_geojson_str(data, "bad_json").unwrap_err();
        match err {
            SpatialFormatReadError::Parse { message, .. } => {
                assert!(message.contains("Failed to parse GeoJSON feature"));
                assert!(message.contains("line 2"));
            },
            SpatialFormatReadError::SchemaInference { .. } => panic!("Expected Parse error"),
        }
    }

    #[test]
    fn parse_invalid_json_combines_errors() {
        let err = parse_geojson_str("not valid json at all", "invalid").unwrap_err();
        match err {
            SpatialFormatReadError::Parse {
                message, context, ..
            } => {
                assert!(message.contains("Failed to parse GeoJSON as FeatureCollection"));
                assert!(message.contains("also failed to parse as GeoJSON sequence"));
                assert_eq!(context.as_deref(), Some("invalid"));
            },
            SpatialFormatReadError::SchemaInference { .. } => panic!("Expected Parse error"),
        }
    }

    #[test]
    fn describe_value_kinds() {
        assert_eq!(describe_value(&JsonValue::Null), "null");
        assert_eq!(describe_value(&serde_json::json!(42)), "number");
        assert_eq!(describe_value(&serde_json::json!([])), "array");
        assert_eq!(describe_value(&serde_json::json!({})), "object");
    }

    #[test]
    fn feature_record_display() {
        let record = FeatureRecord {
            id: None,
            properties: JsonObject::new(),
            geometry: Some(Geometry::Point(geo_types::Point::new(1.0, 2.0))),
        };

        let display = format!("{record}");
        assert!(display.contains("properties=0 keys"));
        assert!(display.contains("Some(Geometry)"));
    }
}
