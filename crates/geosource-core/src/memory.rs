//! In-memory backend.
//!
//! Holds a fixed list of features and serves them through the regular backend
//! contract. Useful for wrapping data produced elsewhere with
//! [`Datasource::from_backend`](crate::Datasource::from_backend), and as the
//! `memory` driver, which opens an empty store.

use std::collections::BTreeMap;

use geosource_core_common::backend::merge_params;
use geosource_core_common::{
    AttributeValue, Backend, BackendError, BackendParams, BackendResult, DatasourceKind, Driver,
    DriverCapabilities, Envelope, Feature, FeatureCursor, FieldType, FormatFactory, GeometryType,
    LayerDescriptor, Query, SupportStatus,
};
use log::debug;

pub const DRIVER_NAME: &str = "memory";

/// Backend over a vector of features owned in memory.
///
/// Queries return the features whose bounds intersect the query box, with
/// only the requested attributes populated. Re-running a query yields the
/// same features again.
#[derive(Debug, Clone)]
pub struct MemoryBackend {
    kind: DatasourceKind,
    descriptor: LayerDescriptor,
    features: Vec<Feature>,
    extent: Option<Envelope>,
    geometry_type: Option<GeometryType>,
    params: BTreeMap<String, AttributeValue>,
}

impl MemoryBackend {
    #[must_use]
    pub fn builder() -> MemoryBackendBuilder {
        MemoryBackendBuilder::default()
    }

    /// Opens an empty store from driver parameters.
    ///
    /// `extent=minx,miny,maxx,maxy` sets a fixed envelope and `encoding`
    /// the reported encoding.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::InvalidParameter`] for a malformed `extent`.
    pub fn open(params: &BackendParams) -> BackendResult<Self> {
        let mut builder = Self::builder().with_params(params);
        if let Some(encoding) = params.get("encoding") {
            builder = builder.with_encoding(encoding.trim());
        }
        if let Some(extent) = params.get("extent").filter(|v| !v.trim().is_empty()) {
            builder = builder.with_extent(parse_extent(extent)?);
        }
        Ok(builder.build())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

fn parse_extent(value: &str) -> BackendResult<Envelope> {
    let parts = value
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| BackendError::invalid("extent", value, err.to_string()))?;
    match parts.as_slice() {
        [minx, miny, maxx, maxy] => Ok(Envelope::new(*minx, *miny, *maxx, *maxy)),
        _ => Err(BackendError::invalid(
            "extent",
            value,
            "expected minx,miny,maxx,maxy",
        )),
    }
}

/// Builder for [`MemoryBackend`].
#[derive(Debug, Clone)]
pub struct MemoryBackendBuilder {
    kind: DatasourceKind,
    name: String,
    encoding: String,
    fields: Vec<(String, FieldType)>,
    features: Vec<Feature>,
    extent: Option<Envelope>,
    geometry_type: Option<GeometryType>,
    params: BackendParams,
}

impl Default for MemoryBackendBuilder {
    fn default() -> Self {
        Self {
            kind: DatasourceKind::Vector,
            name: DRIVER_NAME.to_string(),
            encoding: "utf-8".to_string(),
            fields: Vec::new(),
            features: Vec::new(),
            extent: None,
            geometry_type: None,
            params: BackendParams::new(),
        }
    }
}

impl MemoryBackendBuilder {
    #[must_use]
    pub fn with_kind(mut self, kind: DatasourceKind) -> Self {
        self.kind = kind;
        self
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = encoding.into();
        self
    }

    /// Declares a field. Fields keep declaration order.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, field_type: FieldType) -> Self {
        self.fields.push((name.into(), field_type));
        self
    }

    #[must_use]
    pub fn with_feature(mut self, feature: Feature) -> Self {
        self.features.push(feature);
        self
    }

    #[must_use]
    pub fn with_features(mut self, features: impl IntoIterator<Item = Feature>) -> Self {
        self.features.extend(features);
        self
    }

    /// Fixes the envelope instead of deriving it from the features.
    #[must_use]
    pub fn with_extent(mut self, extent: Envelope) -> Self {
        self.extent = Some(extent);
        self
    }

    /// Fixes the geometry type instead of inferring it from the features.
    #[must_use]
    pub fn with_geometry_type(mut self, geometry_type: GeometryType) -> Self {
        self.geometry_type = Some(geometry_type);
        self
    }

    /// Parameters reported by [`Backend::params`].
    #[must_use]
    pub fn with_params(mut self, params: &BackendParams) -> Self {
        self.params.clone_from(params);
        self
    }

    #[must_use]
    pub fn build(self) -> MemoryBackend {
        let mut descriptor = LayerDescriptor::new(self.name, self.encoding.as_str());
        for (name, field_type) in self.fields {
            descriptor = descriptor.with_descriptor(name, field_type);
        }
        let geometry_type = self.geometry_type.or_else(|| {
            GeometryType::infer(
                self.features
                    .iter()
                    .filter_map(|f| f.geometry.as_ref())
                    .map(GeometryType::of),
            )
        });
        let params = merge_params(
            &self.params,
            &[
                ("type", AttributeValue::from(DRIVER_NAME)),
                ("encoding", AttributeValue::from(self.encoding)),
            ],
        );

        MemoryBackend {
            kind: self.kind,
            descriptor,
            features: self.features,
            extent: self.extent,
            geometry_type,
            params,
        }
    }
}

impl Backend for MemoryBackend {
    fn kind(&self) -> DatasourceKind {
        self.kind
    }

    fn envelope(&self) -> BackendResult<Envelope> {
        if let Some(extent) = self.extent {
            return Ok(extent);
        }
        Ok(self
            .features
            .iter()
            .filter_map(Feature::envelope)
            .fold(Envelope::empty(), |acc, e| acc.union(&e)))
    }

    fn descriptor(&self) -> BackendResult<LayerDescriptor> {
        Ok(self.descriptor.clone())
    }

    fn geometry_type(&self) -> BackendResult<Option<GeometryType>> {
        Ok(self.geometry_type)
    }

    fn params(&self) -> &BTreeMap<String, AttributeValue> {
        &self.params
    }

    fn features(&self, query: &Query) -> BackendResult<Option<FeatureCursor<'_>>> {
        let extent = self.envelope()?;
        let selector = query.clone();
        let matches = move |f: &&Feature| selector.selects(f.envelope().as_ref(), &extent);
        if !self.features.iter().any(|f| matches(&f)) {
            debug!(
                "Memory query {} matched none of {} feature(s)",
                query.bbox,
                self.len()
            );
            return Ok(None);
        }

        let names = query.property_names().to_vec();
        let cursor = self.features.iter().filter(matches).map(move |f| -> BackendResult<Feature> {
            let mut feature = Feature::new(f.id);
            feature.geometry.clone_from(&f.geometry);
            feature.raster.clone_from(&f.raster);
            for name in &names {
                let value = f.get(name).cloned().unwrap_or(AttributeValue::Null);
                feature.attributes.insert(name.clone(), value);
            }
            Ok(feature)
        });
        Ok(Some(Box::new(cursor)))
    }
}

/// Factory for the `memory` driver.
pub struct MemoryFormatFactory;

impl FormatFactory for MemoryFormatFactory {
    fn driver(&self) -> Driver {
        Driver::new(DRIVER_NAME, "In-memory features", DatasourceKind::Vector).with_capabilities(
            DriverCapabilities {
                file: SupportStatus::NotSupported,
                inline: SupportStatus::NotSupported,
                attributes: SupportStatus::Supported,
            },
        )
    }

    fn open(&self, params: &BackendParams) -> BackendResult<Box<dyn Backend>> {
        Ok(Box::new(MemoryBackend::open(params)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::{Geometry, Point};

    fn point(id: i64, x: f64, y: f64) -> Feature {
        Feature::new(id)
            .with_geometry(Geometry::Point(Point::new(x, y)))
            .with_attribute("name", format!("p{id}"))
    }

    #[test]
    fn test_envelope_and_geometry_type_from_features() {
        let backend = MemoryBackend::builder()
            .with_field("name", FieldType::String)
            .with_features([point(1, 0.0, 0.0), point(2, 5.0, -3.0)])
            .build();
        assert_eq!(backend.envelope().unwrap(), Envelope::new(0.0, -3.0, 5.0, 0.0));
        assert_eq!(backend.geometry_type().unwrap(), Some(GeometryType::Point));
        assert_eq!(backend.descriptor().unwrap().name, "memory");
    }

    #[test]
    fn test_query_filters_and_projects() {
        let backend = MemoryBackend::builder()
            .with_features([point(1, 0.0, 0.0), point(2, 50.0, 50.0)])
            .build();
        let mut query = Query::new(Envelope::new(-1.0, -1.0, 1.0, 1.0));
        query.add_property_name("name");
        query.add_property_name("absent");

        let features: Vec<_> = backend
            .features(&query)
            .unwrap()
            .unwrap()
            .collect::<BackendResult<_>>()
            .unwrap();
        assert_eq!(features.len(), 1);
        assert_eq!(features[0].get("name"), Some(&AttributeValue::from("p1")));
        assert_eq!(features[0].get("absent"), Some(&AttributeValue::Null));
    }

    #[test]
    fn test_empty_store_returns_none() {
        let backend = MemoryBackend::builder().build();
        let query = Query::new(Envelope::new(-180.0, -90.0, 180.0, 90.0));
        assert!(backend.features(&query).unwrap().is_none());
        assert!(backend.is_empty());
    }

    #[test]
    fn test_features_without_geometry_on_full_extent() {
        let backend = MemoryBackend::builder()
            .with_field("name", FieldType::String)
            .with_features([
                point(1, 0.0, 0.0),
                Feature::new(2).with_attribute("name", "unplaced"),
                point(3, 4.0, 4.0),
            ])
            .build();

        let full = Query::new(backend.envelope().unwrap());
        let ids: Vec<i64> = backend
            .features(&full)
            .unwrap()
            .unwrap()
            .map(|f| f.unwrap().id)
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);

        let corner = Query::new(Envelope::new(3.0, 3.0, 5.0, 5.0));
        let ids: Vec<i64> = backend
            .features(&corner)
            .unwrap()
            .unwrap()
            .map(|f| f.unwrap().id)
            .collect();
        assert_eq!(ids, vec![3]);
    }

    #[test]
    fn test_open_with_extent_param() {
        let mut params = BackendParams::new();
        params.insert("type".to_string(), "memory".to_string());
        params.insert("extent".to_string(), "-10, -20, 10, 20".to_string());
        params.insert("layer".to_string(), "scratch".to_string());

        let backend = MemoryBackend::open(&params).unwrap();
        assert_eq!(
            backend.envelope().unwrap(),
            Envelope::new(-10.0, -20.0, 10.0, 20.0)
        );
        assert_eq!(backend.params()["layer"], AttributeValue::from("scratch"));
        assert_eq!(backend.params()["encoding"], AttributeValue::from("utf-8"));
    }

    #[test]
    fn test_open_with_bad_extent() {
        let mut params = BackendParams::new();
        params.insert("extent".to_string(), "1,2,3".to_string());
        let err = MemoryBackend::open(&params).unwrap_err();
        assert!(err.to_string().contains("expected minx,miny,maxx,maxy"));

        params.insert("extent".to_string(), "a,b,c,d".to_string());
        assert!(MemoryBackend::open(&params).is_err());
    }
}
