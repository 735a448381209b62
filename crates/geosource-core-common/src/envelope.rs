//! Axis-aligned bounding boxes.

use std::fmt;

use geo_types::{Coord, Geometry, LineString, Polygon};

/// Axis-aligned bounding box reported by a backend.
///
/// No ordering invariant is enforced: a backend may report a degenerate or
/// inverted envelope and it is carried through unchanged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Envelope {
    pub minx: f64,
    pub miny: f64,
    pub maxx: f64,
    pub maxy: f64,
}

impl Envelope {
    #[must_use]
    pub const fn new(minx: f64, miny: f64, maxx: f64, maxy: f64) -> Self {
        Self {
            minx,
            miny,
            maxx,
            maxy,
        }
    }

    /// Inverted box that intersects nothing and is the identity for [`Envelope::union`].
    #[must_use]
    pub const fn empty() -> Self {
        Self::new(f64::MAX, f64::MAX, -f64::MAX, -f64::MAX)
    }

    /// Envelope of a single coordinate.
    #[must_use]
    pub const fn from_coord(coord: Coord<f64>) -> Self {
        Self::new(coord.x, coord.y, coord.x, coord.y)
    }

    /// Computes the bounds of a geometry, or `None` if it has no coordinates.
    #[must_use]
    pub fn from_geometry(geometry: &Geometry<f64>) -> Option<Self> {
        let mut bounds: Option<Self> = None;
        visit_coords(geometry, &mut |coord| match bounds.as_mut() {
            Some(envelope) => envelope.expand_to_include(coord),
            None => bounds = Some(Self::from_coord(coord)),
        });
        bounds
    }

    /// Returns `true` when `minx <= maxx` and `miny <= maxy`.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.minx <= self.maxx && self.miny <= self.maxy
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.maxx - self.minx
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.maxy - self.miny
    }

    pub fn expand_to_include(&mut self, coord: Coord<f64>) {
        self.minx = self.minx.min(coord.x);
        self.miny = self.miny.min(coord.y);
        self.maxx = self.maxx.max(coord.x);
        self.maxy = self.maxy.max(coord.y);
    }

    /// Smallest envelope covering both `self` and `other`.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self::new(
            self.minx.min(other.minx),
            self.miny.min(other.miny),
            self.maxx.max(other.maxx),
            self.maxy.max(other.maxy),
        )
    }

    /// Returns `true` if the boxes overlap or touch.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.minx <= other.maxx
            && other.minx <= self.maxx
            && self.miny <= other.maxy
            && other.miny <= self.maxy
    }

    /// Returns `true` if `other` lies entirely inside this box.
    ///
    /// An empty envelope is contained in every box.
    #[must_use]
    pub fn contains(&self, other: &Self) -> bool {
        self.minx <= other.minx
            && self.miny <= other.miny
            && self.maxx >= other.maxx
            && self.maxy >= other.maxy
    }
}

impl fmt::Display for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.minx, self.miny, self.maxx, self.maxy)
    }
}

fn visit_coords(geometry: &Geometry<f64>, visit: &mut impl FnMut(Coord<f64>)) {
    match geometry {
        Geometry::Point(point) => visit(point.0),
        Geometry::Line(line) => {
            visit(line.start);
            visit(line.end);
        },
        Geometry::LineString(line_string) => visit_line_string(line_string, visit),
        Geometry::Polygon(polygon) => visit_polygon(polygon, visit),
        Geometry::MultiPoint(points) => points.iter().for_each(|point| visit(point.0)),
        Geometry::MultiLineString(lines) => {
            lines.iter().for_each(|line| visit_line_string(line, visit));
        },
        Geometry::MultiPolygon(polygons) => {
            polygons.iter().for_each(|polygon| visit_polygon(polygon, visit));
        },
        Geometry::GeometryCollection(collection) => {
            collection.iter().for_each(|inner| visit_coords(inner, visit));
        },
        Geometry::Rect(rect) => {
            visit(rect.min());
            visit(rect.max());
        },
        Geometry::Triangle(triangle) => {
            visit(triangle.0);
            visit(triangle.1);
            visit(triangle.2);
        },
    }
}

fn visit_line_string(line_string: &LineString<f64>, visit: &mut impl FnMut(Coord<f64>)) {
    line_string.0.iter().for_each(|coord| visit(*coord));
}

fn visit_polygon(polygon: &Polygon<f64>, visit: &mut impl FnMut(Coord<f64>)) {
    // Interior rings lie inside the exterior one.
    visit_line_string(polygon.exterior(), visit);
}
