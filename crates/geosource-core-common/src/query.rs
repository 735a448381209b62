//! Feature query issued to a backend.

use crate::envelope::Envelope;

/// Spatial and attribute scope of a feature request.
///
/// Backends return features whose bounds intersect `bbox` and populate only
/// the attributes listed in `property_names`. Features without a geometry
/// have no bounds; they belong to a query only when `bbox` covers the whole
/// datasource extent (see [`Query::selects`]).
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub bbox: Envelope,
    property_names: Vec<String>,
}

impl Query {
    #[must_use]
    pub fn new(bbox: Envelope) -> Self {
        Self {
            bbox,
            property_names: Vec::new(),
        }
    }

    /// Requests an attribute. Duplicates are ignored.
    pub fn add_property_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !self.property_names.contains(&name) {
            self.property_names.push(name);
        }
    }

    #[must_use]
    pub fn property_names(&self) -> &[String] {
        &self.property_names
    }

    /// Whether a feature with `bounds` falls in this query against a
    /// datasource whose envelope is `extent`.
    #[must_use]
    pub fn selects(&self, bounds: Option<&Envelope>, extent: &Envelope) -> bool {
        match bounds {
            Some(bounds) => bounds.intersects(&self.bbox),
            None => self.bbox.contains(extent),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_names_deduplicated() {
        let mut query = Query::new(Envelope::new(0.0, 0.0, 1.0, 1.0));
        query.add_property_name("name");
        query.add_property_name("length_km");
        query.add_property_name("name");
        assert_eq!(query.property_names(), ["name", "length_km"]);
    }

    #[test]
    fn test_selects_features_without_geometry_on_full_extent() {
        let extent = Envelope::new(0.0, 0.0, 10.0, 10.0);
        let full = Query::new(extent);
        let window = Query::new(Envelope::new(0.0, 0.0, 1.0, 1.0));

        assert!(full.selects(None, &extent));
        assert!(!window.selects(None, &extent));

        let point = Envelope::new(0.5, 0.5, 0.5, 0.5);
        assert!(window.selects(Some(&point), &extent));
        assert!(!Query::new(Envelope::new(5.0, 5.0, 6.0, 6.0)).selects(Some(&point), &extent));
    }

    #[test]
    fn test_selects_rows_of_datasource_without_geometry() {
        let extent = Envelope::empty();
        assert!(Query::new(extent).selects(None, &extent));
    }
}
