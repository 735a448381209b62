use std::collections::BTreeMap;

use geosource_core_common::backend::merge_params;
use geosource_core_common::{
    AttributeValue, Backend, BackendError, BackendParams, BackendResult, DatasourceKind, Envelope,
    Feature, FeatureCursor, GeometryType, LayerDescriptor, Query,
};
use geosource_shared::{ParamReader, SourceData};
use log::{debug, info};

use crate::grid::AsciiGrid;

pub(crate) const DRIVER_NAME: &str = "raster";
const DEFAULT_ENCODING: &str = "utf-8";
const EXTENT_PARAMS: [&str; 4] = ["lox", "loy", "hix", "hiy"];

/// Backend serving one ASCII grid as a single raster feature.
pub struct RasterBackend {
    grid: AsciiGrid,
    envelope: Envelope,
    encoding: String,
    params: BTreeMap<String, AttributeValue>,
}

impl RasterBackend {
    /// Opens the grid named by `file` (or `inline`).
    ///
    /// # Errors
    ///
    /// Returns an error if the grid cannot be read or parsed, or if only some
    /// of `lox`, `loy`, `hix`, `hiy` are given.
    pub fn open(params: &BackendParams) -> BackendResult<Self> {
        let reader = ParamReader::new(params, DRIVER_NAME);
        let source = SourceData::from_params(&reader)?;
        let override_envelope = read_extent(&reader)?;
        let encoding = reader.optional("encoding").unwrap_or(DEFAULT_ENCODING);

        let grid = AsciiGrid::parse(&source.load(encoding)?, &source.to_string())?;
        let envelope = override_envelope.unwrap_or_else(|| grid.header.envelope());
        info!(
            "Loaded {}x{} ASCII grid from {source} covering {envelope}",
            grid.header.ncols, grid.header.nrows
        );

        Ok(Self {
            grid,
            envelope,
            encoding: encoding.to_string(),
            params: merge_params(
                params,
                &[("encoding", AttributeValue::from(DEFAULT_ENCODING))],
            ),
        })
    }

    #[must_use]
    pub fn grid(&self) -> &AsciiGrid {
        &self.grid
    }
}

/// The `lox`/`loy`/`hix`/`hiy` override, which must be given in full or not at all.
fn read_extent(reader: &ParamReader<'_>) -> BackendResult<Option<Envelope>> {
    let values = EXTENT_PARAMS
        .iter()
        .map(|key| reader.parse::<f64>(key))
        .collect::<BackendResult<Vec<_>>>()?;

    match values.as_slice() {
        [Some(lox), Some(loy), Some(hix), Some(hiy)] => {
            if !(lox < hix && loy < hiy) {
                return Err(BackendError::invalid(
                    "lox",
                    format!("{lox},{loy},{hix},{hiy}"),
                    "the grid must be placed on a box with lox < hix and loy < hiy",
                ));
            }
            Ok(Some(Envelope::new(*lox, *loy, *hix, *hiy)))
        },
        [None, None, None, None] => Ok(None),
        _ => {
            let missing = EXTENT_PARAMS
                .iter()
                .zip(&values)
                .find(|(_, value)| value.is_none())
                .map_or("lox", |(key, _)| *key);
            Err(BackendError::MissingParameter {
                parameter: missing.to_string(),
                driver: Some(format!(
                    "{DRIVER_NAME} (lox, loy, hix and hiy must be given together)"
                )),
            })
        },
    }
}

impl Backend for RasterBackend {
    fn kind(&self) -> DatasourceKind {
        DatasourceKind::Raster
    }

    fn envelope(&self) -> BackendResult<Envelope> {
        Ok(self.envelope)
    }

    fn descriptor(&self) -> BackendResult<LayerDescriptor> {
        Ok(LayerDescriptor::new(DRIVER_NAME, self.encoding.as_str()))
    }

    fn geometry_type(&self) -> BackendResult<Option<GeometryType>> {
        Ok(None)
    }

    fn params(&self) -> &BTreeMap<String, AttributeValue> {
        &self.params
    }

    fn features(&self, query: &Query) -> BackendResult<Option<FeatureCursor<'_>>> {
        let Some(tile) = self.grid.window(&self.envelope, &query.bbox) else {
            debug!("Raster query {} misses grid at {}", query.bbox, self.envelope);
            return Ok(None);
        };
        debug!(
            "Raster query {} selected a {}x{} window",
            query.bbox, tile.width, tile.height
        );

        let mut feature = Feature::new(1);
        feature.raster = Some(tile);
        Ok(Some(Box::new(std::iter::once(Ok::<_, BackendError>(feature)))))
    }
}
