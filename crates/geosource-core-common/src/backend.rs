//! The contract every storage backend implements.
//!
//! A backend is opened by a [`FormatFactory`](crate::FormatFactory) from a set
//! of string parameters and is then owned by exactly one datasource. All
//! methods are blocking; a backend that performs I/O lazily does so on the
//! calling thread.

use std::collections::BTreeMap;
use std::fmt;

use crate::envelope::Envelope;
use crate::error::BackendResult;
use crate::feature::{AttributeValue, Feature};
use crate::query::Query;
use crate::schema::{GeometryType, LayerDescriptor};

/// String parameters handed to the driver catalog.
pub type BackendParams = BTreeMap<String, String>;

/// Lazy, single-pass sequence of features produced by [`Backend::features`].
///
/// The cursor may borrow from the backend, so it cannot outlive it. To iterate
/// again, issue the query again.
pub type FeatureCursor<'a> = Box<dyn Iterator<Item = BackendResult<Feature>> + 'a>;

/// Whether a datasource serves gridded raster data or vector features.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasourceKind {
    Raster,
    Vector,
}

impl DatasourceKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            DatasourceKind::Raster => "raster",
            DatasourceKind::Vector => "vector",
        }
    }
}

impl fmt::Display for DatasourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A concrete data store behind a datasource.
///
/// Implementations are `Send` so a datasource can move between threads, but
/// they are not required to be `Sync`: concurrent use of one backend needs
/// external synchronization.
pub trait Backend: Send {
    /// Raster or vector; must not change over the backend's lifetime.
    fn kind(&self) -> DatasourceKind;

    /// Bounding envelope of all data. May scan the whole store.
    ///
    /// # Errors
    ///
    /// Returns an error if the envelope cannot be computed.
    fn envelope(&self) -> BackendResult<Envelope>;

    /// Layer schema: name, encoding, and field descriptors.
    ///
    /// # Errors
    ///
    /// Returns an error if the schema cannot be introspected.
    fn descriptor(&self) -> BackendResult<LayerDescriptor>;

    /// Dominant geometry type, if the backend can tell.
    ///
    /// # Errors
    ///
    /// Returns an error if introspecting geometries fails.
    fn geometry_type(&self) -> BackendResult<Option<GeometryType>>;

    /// Effective parameters, including defaults the backend applied.
    fn params(&self) -> &BTreeMap<String, AttributeValue>;

    /// Runs a query. `Ok(None)` means no feature matched.
    ///
    /// # Errors
    ///
    /// Returns an error if the query cannot be executed.
    fn features(&self, query: &Query) -> BackendResult<Option<FeatureCursor<'_>>>;
}

/// Builds the effective parameter map from the caller's parameters plus defaults.
///
/// Supplied values win over defaults; nothing supplied is dropped.
#[must_use]
pub fn merge_params(
    params: &BackendParams,
    defaults: &[(&str, AttributeValue)],
) -> BTreeMap<String, AttributeValue> {
    let mut merged: BTreeMap<String, AttributeValue> = defaults
        .iter()
        .map(|(key, value)| ((*key).to_string(), value.clone()))
        .collect();
    for (key, value) in params {
        merged.insert(key.clone(), AttributeValue::String(value.clone()));
    }
    merged
}
