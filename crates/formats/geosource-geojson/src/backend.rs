use std::collections::{BTreeMap, HashSet};

use geojson::JsonValue;
use geosource_core_common::backend::merge_params;
use geosource_core_common::{
    AttributeValue, Backend, BackendParams, BackendResult, DatasourceKind, Envelope, Feature,
    FeatureCursor, FieldType, GeometryType, LayerDescriptor, Query,
};
use geosource_shared::{ParamReader, SourceData};
use log::{debug, info};

use crate::parser::{FeatureRecord, describe_value, parse_geojson_str};

pub(crate) const DRIVER_NAME: &str = "geojson";
const DEFAULT_ENCODING: &str = "utf-8";

struct IndexedFeature {
    id: i64,
    record: FeatureRecord,
    envelope: Option<Envelope>,
}

/// In-memory `GeoJSON` backend.
pub struct GeoJsonBackend {
    features: Vec<IndexedFeature>,
    descriptor: LayerDescriptor,
    envelope: Envelope,
    geometry_type: Option<GeometryType>,
    params: BTreeMap<String, AttributeValue>,
}

impl GeoJsonBackend {
    /// Opens and parses the source named by `file` or `inline`.
    ///
    /// # Errors
    ///
    /// Returns an error if neither parameter is present, the file cannot be
    /// read, or the document is not valid `GeoJSON`.
    pub fn open(params: &BackendParams) -> BackendResult<Self> {
        let reader = ParamReader::new(params, DRIVER_NAME);
        let source = SourceData::from_params(&reader)?;
        let encoding = reader.optional("encoding").unwrap_or(DEFAULT_ENCODING);

        let text = source.load(encoding)?;
        let records = parse_geojson_str(&text, source.to_string())?;
        info!("Loaded {} GeoJSON feature(s) from {source}", records.len());

        Ok(Self::from_records(
            records,
            encoding,
            merge_params(
                params,
                &[("encoding", AttributeValue::from(DEFAULT_ENCODING))],
            ),
        ))
    }

    fn from_records(
        records: Vec<FeatureRecord>,
        encoding: &str,
        params: BTreeMap<String, AttributeValue>,
    ) -> Self {
        let descriptor = infer_descriptor(&records, encoding);
        let geometry_type = GeometryType::infer(
            records
                .iter()
                .filter_map(|r| r.geometry.as_ref())
                .map(GeometryType::of),
        );

        let mut ids = FeatureIds::new(records.iter().filter_map(|r| r.id));
        let features: Vec<IndexedFeature> = records
            .into_iter()
            .map(|record| IndexedFeature {
                id: record.id.unwrap_or_else(|| ids.next_free()),
                envelope: record.geometry.as_ref().and_then(Envelope::from_geometry),
                record,
            })
            .collect();

        let envelope = features
            .iter()
            .filter_map(|f| f.envelope)
            .fold(Envelope::empty(), |acc, e| acc.union(&e));

        Self {
            features,
            descriptor,
            envelope,
            geometry_type,
            params,
        }
    }

    /// Number of features held by the backend.
    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

impl Backend for GeoJsonBackend {
    fn kind(&self) -> DatasourceKind {
        DatasourceKind::Vector
    }

    fn envelope(&self) -> BackendResult<Envelope> {
        Ok(self.envelope)
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
        let extent = self.envelope;
        let selector = query.clone();
        let matches = move |f: &&IndexedFeature| selector.selects(f.envelope.as_ref(), &extent);

        if !self.features.iter().any(|f| matches(&f)) {
            debug!("GeoJSON query {} matched no features", query.bbox);
            return Ok(None);
        }

        let names = query.property_names().to_vec();
        let cursor = self
            .features
            .iter()
            .filter(matches)
            .map(move |f| -> BackendResult<Feature> { Ok(to_feature(f, &names)) });
        Ok(Some(Box::new(cursor)))
    }
}

/// Hands out ids for features the document left unnumbered, skipping every
/// id the document assigns itself.
struct FeatureIds {
    taken: HashSet<i64>,
    last: i64,
}

impl FeatureIds {
    fn new(explicit: impl IntoIterator<Item = i64>) -> Self {
        Self {
            taken: explicit.into_iter().collect(),
            last: 0,
        }
    }

    fn next_free(&mut self) -> i64 {
        loop {
            self.last += 1;
            if self.taken.insert(self.last) {
                return self.last;
            }
        }
    }
}

fn to_feature(indexed: &IndexedFeature, names: &[String]) -> Feature {
    let mut feature = Feature::new(indexed.id);
    feature.geometry = indexed.record.geometry.clone();
    for name in names {
        let value = indexed
            .record
            .properties
            .get(name)
            .cloned()
            .map_or(AttributeValue::Null, AttributeValue::from_json);
        feature.attributes.insert(name.clone(), value);
    }
    feature
}

fn json_field_type(value: &JsonValue) -> Option<FieldType> {
    match value {
        JsonValue::Null => None,
        JsonValue::Bool(_) => Some(FieldType::Boolean),
        JsonValue::Number(n) if n.is_i64() || n.is_u64() => Some(FieldType::Integer),
        JsonValue::Number(_) => Some(FieldType::Double),
        JsonValue::String(_) => Some(FieldType::String),
        JsonValue::Array(_) | JsonValue::Object(_) => Some(FieldType::Object),
    }
}

fn widen(current: &FieldType, next: FieldType) -> FieldType {
    match (current, next) {
        (a, b) if *a == b => b,
        (FieldType::Integer, FieldType::Double) | (FieldType::Double, FieldType::Integer) => {
            FieldType::Double
        },
        _ => FieldType::String,
    }
}

/// Field types from property values in first-seen order. Fields only ever
/// seen as `null` are declared as strings.
fn infer_descriptor(records: &[FeatureRecord], encoding: &str) -> LayerDescriptor {
    let mut order: Vec<String> = Vec::new();
    let mut types: BTreeMap<String, Option<FieldType>> = BTreeMap::new();

    for record in records {
        for (name, value) in &record.properties {
            let observed = json_field_type(value);
            match types.get_mut(name) {
                None => {
                    order.push(name.clone());
                    types.insert(name.clone(), observed);
                },
                Some(slot) => {
                    if let Some(next) = observed {
                        let widened = match slot.as_ref() {
                            Some(current) => widen(current, next),
                            None => next,
                        };
                        if slot.as_ref().is_some_and(|c| *c != widened) {
                            debug!(
                                "Widening GeoJSON property '{name}' to {widened} after {} value",
                                describe_value(value)
                            );
                        }
                        *slot = Some(widened);
                    }
                },
            }
        }
    }

    let mut descriptor = LayerDescriptor::new(DRIVER_NAME, encoding);
    for name in order {
        let field_type = types
            .remove(&name)
            .flatten()
            .unwrap_or(FieldType::String);
        descriptor = descriptor.with_descriptor(name, field_type);
    }
    descriptor
}
