use std::collections::BTreeMap;

use geo_types::Geometry;
use geosource_core_common::backend::merge_params;
use geosource_core_common::{
    AttributeValue, Backend, BackendError, BackendParams, BackendResult, DatasourceKind, Envelope,
    Feature, FeatureCursor, FieldType, GeometryType, LayerDescriptor, Query,
};
use geosource_shared::{ParamReader, SourceData, SourcePosition, SpatialFormatReadError};
use log::{debug, info, warn};

use crate::geospatial::GeometrySource;
use crate::options::CsvOptions;

pub(crate) const DRIVER_NAME: &str = "csv";

struct CsvRow {
    id: i64,
    geometry: Option<Geometry<f64>>,
    envelope: Option<Envelope>,
    values: Vec<String>,
}

/// A column exposed as an attribute.
struct Column {
    name: String,
    index: usize,
    field_type: FieldType,
}

/// In-memory CSV backend.
pub struct CsvBackend {
    rows: Vec<CsvRow>,
    columns: Vec<Column>,
    descriptor: LayerDescriptor,
    envelope: Envelope,
    geometry_type: Option<GeometryType>,
    params: BTreeMap<String, AttributeValue>,
}

impl CsvBackend {
    /// Opens and parses the source named by `file` or `inline`.
    ///
    /// # Errors
    ///
    /// Returns an error if the source is missing or unreadable, if an option
    /// is malformed, or if a row is malformed while `strict` is set.
    pub fn open(params: &BackendParams) -> BackendResult<Self> {
        let reader = ParamReader::new(params, DRIVER_NAME);
        let source = SourceData::from_params(&reader)?;
        let options = CsvOptions::from_params(&reader)?;
        let text = source.load(&options.encoding)?;

        let defaults = CsvOptions::defaults();
        let backend = Self::parse(&text, &options, &source.to_string())?
            .with_params(merge_params(params, &defaults));
        info!(
            "Loaded {} CSV row(s) with {} attribute(s) from {source}",
            backend.rows.len(),
            backend.columns.len()
        );
        Ok(backend)
    }

    /// Parses CSV text with the given options.
    ///
    /// # Errors
    ///
    /// Returns an error if the header cannot be read, or if a row is
    /// malformed while `options.strict` is set.
    pub fn parse(text: &str, options: &CsvOptions, context: &str) -> BackendResult<Self> {
        let first_line = text.lines().next().unwrap_or_default();
        let separator = options.resolve_separator(first_line);
        debug!(
            "Reading CSV from {context} with separator {:?}",
            char::from(separator)
        );

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(separator)
            .quote(options.quote)
            .has_headers(options.headers.is_none())
            .flexible(true)
            .from_reader(text.as_bytes());

        let headers: Vec<String> = match &options.headers {
            Some(headers) => headers.clone(),
            None => reader
                .headers()
                .map_err(|err| {
                    SpatialFormatReadError::parse(format!("Failed to read CSV header: {err}"), context)
                })?
                .iter()
                .map(|h| h.trim().to_string())
                .collect(),
        };
        if headers.iter().all(String::is_empty) {
            return Err(SpatialFormatReadError::schema("CSV header is empty", context).into());
        }

        let geometry_source = GeometrySource::detect(&headers);
        if geometry_source.is_none() {
            warn!("No geometry column found in CSV from {context}");
        }

        let mut rows = Vec::new();
        for (idx, result) in reader.records().enumerate() {
            if options.row_limit.is_some_and(|limit| rows.len() >= limit) {
                debug!("Reached CSV row limit after {} row(s)", rows.len());
                break;
            }
            let line = result
                .as_ref()
                .ok()
                .and_then(|record| record.position())
                .map_or(idx as u64 + 2, csv::Position::line);

            let parsed = result
                .map_err(|err| format!("Failed to read CSV record: {err}"))
                .and_then(|record| read_row(&record, &headers, geometry_source));

            match parsed {
                Ok(Some((geometry, values))) => rows.push(CsvRow {
                    id: rows.len() as i64 + 1,
                    envelope: geometry.as_ref().and_then(Envelope::from_geometry),
                    geometry,
                    values,
                }),
                Ok(None) => {},
                Err(message) if options.strict => {
                    return Err(SpatialFormatReadError::parse(message, context)
                        .at(SourcePosition::line(line))
                        .into());
                },
                Err(message) => warn!("Skipping CSV line {line}: {message}"),
            }
        }

        let columns: Vec<Column> = headers
            .iter()
            .enumerate()
            .filter(|(index, name)| {
                !name.is_empty() && !geometry_source.is_some_and(|g| g.uses_column(*index))
            })
            .map(|(index, name)| Column {
                name: name.clone(),
                index,
                field_type: infer_column_type(&rows, index),
            })
            .collect();

        let mut descriptor = LayerDescriptor::new(DRIVER_NAME, options.encoding.as_str());
        for column in &columns {
            descriptor = descriptor.with_descriptor(column.name.clone(), column.field_type.clone());
        }

        let geometry_type = GeometryType::infer(
            rows.iter()
                .filter_map(|row| row.geometry.as_ref())
                .map(GeometryType::of),
        );
        let envelope = rows
            .iter()
            .filter_map(|row| row.envelope)
            .fold(Envelope::empty(), |acc, e| acc.union(&e));

        Ok(Self {
            rows,
            columns,
            descriptor,
            envelope,
            geometry_type,
            params: BTreeMap::new(),
        })
    }

    fn with_params(mut self, params: BTreeMap<String, AttributeValue>) -> Self {
        self.params = params;
        self
    }

    /// Number of rows loaded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn to_feature(&self, row: &CsvRow, names: &[String]) -> BackendResult<Feature> {
        let mut feature = Feature::new(row.id);
        feature.geometry = row.geometry.clone();
        for name in names {
            let value = match self.columns.iter().find(|c| &c.name == name) {
                Some(column) => convert(
                    row.values.get(column.index).map_or("", String::as_str),
                    &column.field_type,
                )
                .map_err(|reason| {
                    BackendError::Query(format!("column '{name}' in row {}: {reason}", row.id))
                })?,
                None => AttributeValue::Null,
            };
            feature.attributes.insert(name.clone(), value);
        }
        Ok(feature)
    }
}

/// Splits a record into geometry and raw values. Fully blank lines yield `None`.
#[allow(clippy::type_complexity)]
fn read_row(
    record: &csv::StringRecord,
    headers: &[String],
    geometry_source: Option<GeometrySource>,
) -> Result<Option<(Option<Geometry<f64>>, Vec<String>)>, String> {
    if record.iter().all(|field| field.trim().is_empty()) {
        return Ok(None);
    }
    if record.len() != headers.len() {
        return Err(format!(
            "expected {} field(s), found {}",
            headers.len(),
            record.len()
        ));
    }
    let geometry = match geometry_source {
        Some(source) => source.parse(record)?,
        None => None,
    };
    let values = record.iter().map(str::to_string).collect();
    Ok(Some((geometry, values)))
}

/// Integer if every non-blank value is an integer, Double if every one is
/// numeric, Boolean if every one is `true`/`false`, String otherwise.
fn infer_column_type(rows: &[CsvRow], index: usize) -> FieldType {
    let mut all_integer = true;
    let mut all_numeric = true;
    let mut all_boolean = true;
    let mut seen = false;

    for value in rows
        .iter()
        .filter_map(|row| row.values.get(index))
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
    {
        seen = true;
        all_integer &= value.parse::<i64>().is_ok();
        all_numeric &= value.parse::<f64>().is_ok();
        all_boolean &= parse_bool(value).is_some();
        if !all_numeric && !all_boolean {
            return FieldType::String;
        }
    }

    match (seen, all_integer, all_numeric, all_boolean) {
        (false, ..) => FieldType::String,
        (true, true, ..) => FieldType::Integer,
        (true, false, true, _) => FieldType::Double,
        (true, false, false, true) => FieldType::Boolean,
        _ => FieldType::String,
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    if value.eq_ignore_ascii_case("true") {
        Some(true)
    } else if value.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

fn convert(raw: &str, field_type: &FieldType) -> Result<AttributeValue, String> {
    let value = raw.trim();
    if value.is_empty() && *field_type != FieldType::String {
        return Ok(AttributeValue::Null);
    }
    match field_type {
        FieldType::Integer => value
            .parse::<i64>()
            .map(AttributeValue::Integer)
            .map_err(|err| err.to_string()),
        FieldType::Double => value
            .parse::<f64>()
            .map(AttributeValue::Double)
            .map_err(|err| err.to_string()),
        FieldType::Boolean => parse_bool(value)
            .map(AttributeValue::Boolean)
            .ok_or_else(|| format!("'{value}' is not a boolean")),
        _ => Ok(AttributeValue::String(raw.to_string())),
    }
}

impl Backend for CsvBackend {
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
        let matches = move |row: &&CsvRow| selector.selects(row.envelope.as_ref(), &extent);

        if !self.rows.iter().any(|row| matches(&row)) {
            debug!("CSV query {} matched no rows", query.bbox);
            return Ok(None);
        }

        let names = query.property_names().to_vec();
        let cursor = self
            .rows
            .iter()
            .filter(matches)
            .map(move |row| self.to_feature(row, &names));
        Ok(Some(Box::new(cursor)))
    }
}
