//! Geometry detection and parsing for CSV rows
//!
//! A CSV layer takes its geometry from a `wkt` column, a `geojson` column, or
//! a longitude/latitude column pair. Column names are matched
//! case-insensitively and the geometry columns are not exposed as attributes.

use std::convert::TryFrom;

use geo_types::{Geometry, Point};
use geojson::GeoJson;
use geozero::ToGeo;
use geozero::wkt::Wkt;

/// Column pairs recognized as longitude/latitude, checked in order.
const COORDINATE_PAIRS: [(&str, &str); 5] = [
    ("x", "y"),
    ("lon", "lat"),
    ("lng", "lat"),
    ("long", "lat"),
    ("longitude", "latitude"),
];

/// Where a row's geometry comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometrySource {
    /// Well-Known Text in the given column
    Wkt { column: usize },
    /// A `GeoJSON` geometry object in the given column
    GeoJson { column: usize },
    /// A point built from two numeric columns
    Coordinates { x: usize, y: usize },
}

impl GeometrySource {
    /// Picks the geometry columns from a header row.
    ///
    /// A `wkt` column wins over a `geojson` one, which wins over coordinate
    /// pairs. Returns `None` when the layer has no geometry.
    #[must_use]
    pub fn detect(headers: &[String]) -> Option<Self> {
        let find = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));

        if let Some(column) = find("wkt") {
            return Some(GeometrySource::Wkt { column });
        }
        if let Some(column) = find("geojson") {
            return Some(GeometrySource::GeoJson { column });
        }
        COORDINATE_PAIRS.iter().find_map(|(x, y)| {
            Some(GeometrySource::Coordinates {
                x: find(x)?,
                y: find(y)?,
            })
        })
    }

    /// Whether `column` feeds the geometry rather than an attribute.
    #[must_use]
    pub fn uses_column(&self, column: usize) -> bool {
        match *self {
            GeometrySource::Wkt { column: c } | GeometrySource::GeoJson { column: c } => {
                c == column
            },
            GeometrySource::Coordinates { x, y } => x == column || y == column,
        }
    }

    /// Builds the geometry of one row.
    ///
    /// Blank geometry fields yield `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns a description of the problem if the geometry cannot be parsed.
    pub fn parse(&self, record: &csv::StringRecord) -> Result<Option<Geometry<f64>>, String> {
        let field = |idx: usize| record.get(idx).map(str::trim).unwrap_or_default();

        match *self {
            GeometrySource::Wkt { column } => match field(column) {
                "" => Ok(None),
                text => parse_wkt(text).map(Some),
            },
            GeometrySource::GeoJson { column } => match field(column) {
                "" => Ok(None),
                text => parse_geojson(text).map(Some),
            },
            GeometrySource::Coordinates { x, y } => match (field(x), field(y)) {
                ("", "") => Ok(None),
                (x, y) => {
                    let x = parse_coordinate(x)?;
                    let y = parse_coordinate(y)?;
                    Ok(Some(Geometry::Point(Point::new(x, y))))
                },
            },
        }
    }
}

/// Parses Well-Known Text into a geometry.
///
/// # Errors
///
/// Returns the decoder's message when the text is not valid WKT.
pub fn parse_wkt(text: &str) -> Result<Geometry<f64>, String> {
    Wkt(text)
        .to_geo()
        .map_err(|err| format!("Failed to decode WKT geometry '{text}': {err}"))
}

/// Parses a `GeoJSON` geometry object.
///
/// # Errors
///
/// Returns a message when the text is not a `GeoJSON` geometry.
pub fn parse_geojson(text: &str) -> Result<Geometry<f64>, String> {
    let geojson = text
        .parse::<GeoJson>()
        .map_err(|err| format!("Failed to parse GeoJSON geometry: {err}"))?;
    match geojson {
        GeoJson::Geometry(geometry) => Geometry::try_from(geometry)
            .map_err(|err| format!("Failed to convert GeoJSON geometry: {err}")),
        GeoJson::Feature(_) | GeoJson::FeatureCollection(_) => {
            Err("Expected a GeoJSON geometry, found a feature".to_string())
        },
    }
}

fn parse_coordinate(text: &str) -> Result<f64, String> {
    text.parse::<f64>()
        .map_err(|_| format!("Invalid coordinate '{text}'"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use csv::StringRecord;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| (*n).to_string()).collect()
    }

    #[test]
    fn test_detect_wkt_column() {
        let source = GeometrySource::detect(&headers(&["name", "WKT", "x", "y"]));
        assert_eq!(source, Some(GeometrySource::Wkt { column: 1 }));
    }

    #[test]
    fn test_detect_coordinate_pairs() {
        assert_eq!(
            GeometrySource::detect(&headers(&["Lat", "name", "Lon"])),
            Some(GeometrySource::Coordinates { x: 2, y: 0 })
        );
        assert_eq!(
            GeometrySource::detect(&headers(&["longitude", "latitude"])),
            Some(GeometrySource::Coordinates { x: 0, y: 1 })
        );
        assert_eq!(GeometrySource::detect(&headers(&["lon", "name"])), None);
    }

    #[test]
    fn test_uses_column() {
        let source = GeometrySource::Coordinates { x: 2, y: 0 };
        assert!(source.uses_column(0));
        assert!(!source.uses_column(1));
    }

    #[test]
    fn test_parse_wkt_row() {
        let source = GeometrySource::Wkt { column: 0 };
        let record = StringRecord::from(vec!["LINESTRING(0 0, 1 1)", "a"]);
        let geometry = source.parse(&record).unwrap().unwrap();
        assert!(matches!(geometry, Geometry::LineString(_)));

        let blank = StringRecord::from(vec!["  ", "b"]);
        assert!(source.parse(&blank).unwrap().is_none());

        let bad = StringRecord::from(vec!["LINESTRING(0 0,", "c"]);
        assert!(source.parse(&bad).is_err());
    }

    #[test]
    fn test_parse_geojson_row() {
        let source = GeometrySource::GeoJson { column: 1 };
        let record = StringRecord::from(vec![
            "a",
            r#"{"type":"Point","coordinates":[3.0,4.0]}"#,
        ]);
        assert_eq!(
            source.parse(&record).unwrap(),
            Some(Geometry::Point(Point::new(3.0, 4.0)))
        );
    }

    #[test]
    fn test_parse_coordinate_row() {
        let source = GeometrySource::Coordinates { x: 0, y: 1 };
        let record = StringRecord::from(vec!["-122.5", "37.25"]);
        assert_eq!(
            source.parse(&record).unwrap(),
            Some(Geometry::Point(Point::new(-122.5, 37.25)))
        );

        let bad = StringRecord::from(vec!["east", "37.25"]);
        assert_eq!(
            source.parse(&bad).unwrap_err(),
            "Invalid coordinate 'east'"
        );
    }
}
