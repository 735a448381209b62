//! The datasource: one owned backend behind a uniform interface.

use std::collections::BTreeMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use geosource_core_common::{
    Backend, DatasourceKind, DriverRegistry, Envelope, Feature, FeatureCursor, Query,
};
use log::{debug, error, warn};

use crate::error::{DatasourceError, Result};
use crate::extent::box_to_array;
use crate::params::ParameterSet;
use crate::schema::{Description, GeometryKind};
use crate::value::Value;

/// A resolved data source.
///
/// Owns exactly one backend for its whole lifetime. The kind is taken from the
/// backend at construction and never changes.
///
/// A `Datasource` is `Send` but not `Sync`; share it between threads only
/// behind a lock.
pub struct Datasource {
    kind: DatasourceKind,
    backend: Box<dyn Backend>,
}

impl Datasource {
    /// Resolves `params` through `registry` and opens the backend.
    ///
    /// Every parameter is forwarded to the registry unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`DatasourceError::Configuration`] carrying the registry's
    /// diagnostic if no backend could be opened.
    ///
    /// # Examples
    ///
    /// ```
    /// use geosource_core::{Datasource, ParameterSet, drivers::builtin_registry};
    ///
    /// let params = ParameterSet::new()
    ///     .with("type", "csv")
    ///     .with("inline", "name,x,y\nA,1,2\n");
    /// let datasource = Datasource::new(&builtin_registry(), &params).unwrap();
    /// assert_eq!(datasource.type_name(), "vector");
    /// assert_eq!(datasource.extent().unwrap(), [1.0, 2.0, 1.0, 2.0]);
    /// ```
    pub fn new(registry: &DriverRegistry, params: &ParameterSet) -> Result<Self> {
        debug!(
            "Constructing datasource from {} parameter(s): {}",
            params.len(),
            params.keys().collect::<Vec<_>>().join(", ")
        );
        let backend = registry.resolve(&params.to_backend_params()).map_err(|err| {
            warn!("Failed to resolve datasource: {err}");
            DatasourceError::configuration(&err)
        })?;
        Ok(Self::from_backend(backend))
    }

    /// Wraps an already opened backend.
    #[must_use]
    pub fn from_backend(backend: Box<dyn Backend>) -> Self {
        let kind = backend.kind();
        debug!("Datasource ready ({kind})");
        Self { kind, backend }
    }

    /// Whether the datasource is raster or vector, as reported by its backend.
    #[must_use]
    pub fn kind(&self) -> DatasourceKind {
        self.kind
    }

    /// `"raster"` or `"vector"`.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.kind.as_str()
    }

    /// The owned backend.
    #[must_use]
    pub fn backend(&self) -> &dyn Backend {
        self.backend.as_ref()
    }

    /// The backend's effective parameters, including any defaults it applied.
    #[must_use]
    pub fn parameters(&self) -> BTreeMap<String, Value> {
        self.backend
            .params()
            .iter()
            .map(|(key, value)| (key.clone(), Value::from(value)))
            .collect()
    }

    /// The envelope reported by the backend. Not cached.
    ///
    /// # Errors
    ///
    /// Returns [`DatasourceError::Backend`] if the backend fails.
    pub fn envelope(&self) -> Result<Envelope> {
        self.backend.envelope().map_err(|err| {
            warn!("Backend failed to compute envelope: {err}");
            DatasourceError::backend(&err)
        })
    }

    /// The envelope as `[minx, miny, maxx, maxy]`.
    ///
    /// # Errors
    ///
    /// Returns [`DatasourceError::Backend`] if the backend fails.
    pub fn extent(&self) -> Result<[f64; 4]> {
        self.envelope().map(|envelope| box_to_array(&envelope))
    }

    /// Describes the schema: type, encoding, fields and geometry kind.
    ///
    /// Raster datasources always report the `raster` geometry kind. A panic
    /// inside the backend is caught and reported as
    /// [`DatasourceError::Internal`].
    ///
    /// # Errors
    ///
    /// Returns [`DatasourceError::Backend`] if the backend reports a failure.
    pub fn describe(&self) -> Result<Description> {
        debug!("Describing {} datasource", self.kind);
        match panic::catch_unwind(AssertUnwindSafe(|| self.describe_backend())) {
            Ok(result) => result,
            Err(payload) => {
                let reason = payload
                    .downcast_ref::<&str>()
                    .map(|s| (*s).to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                error!("Backend panicked while describing datasource: {reason}");
                Err(DatasourceError::internal())
            },
        }
    }

    fn describe_backend(&self) -> Result<Description> {
        let layer = self.backend.descriptor().map_err(|err| {
            warn!("Backend failed to report its schema: {err}");
            DatasourceError::backend(&err)
        })?;
        let geometry_type = match self.kind {
            DatasourceKind::Raster => GeometryKind::Raster,
            DatasourceKind::Vector => {
                let tag = self.backend.geometry_type().map_err(|err| {
                    warn!("Backend failed to report its geometry type: {err}");
                    DatasourceError::backend(&err)
                })?;
                GeometryKind::from(tag)
            },
        };
        Ok(Description::from_layer(self.kind, &layer, geometry_type))
    }

    /// Queries every feature over the full extent with every declared field.
    ///
    /// Returns `Ok(None)` when the backend has no matching features. The
    /// returned [`Featureset`] borrows the datasource and is single-pass; call
    /// this again to iterate again.
    ///
    /// # Errors
    ///
    /// Returns [`DatasourceError::Backend`] if computing the extent, reading
    /// the schema, or running the query fails.
    pub fn featureset(&self) -> Result<Option<Featureset<'_>>> {
        let mut query = Query::new(self.envelope()?);
        let layer = self.backend.descriptor().map_err(|err| {
            warn!("Backend failed to report its schema: {err}");
            DatasourceError::backend(&err)
        })?;
        for name in layer.field_names() {
            query.add_property_name(name);
        }
        debug!(
            "Querying {} with {} attribute(s)",
            query.bbox,
            query.property_names().len()
        );

        match self.backend.features(&query) {
            Ok(Some(cursor)) => Ok(Some(Featureset { cursor })),
            Ok(None) => {
                debug!("Query returned no features");
                Ok(None)
            },
            Err(err) => {
                warn!("Backend query failed: {err}");
                Err(DatasourceError::backend(&err))
            },
        }
    }
}

impl fmt::Debug for Datasource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Datasource")
            .field("kind", &self.kind)
            .field("parameters", &self.backend.params().len())
            .finish_non_exhaustive()
    }
}

/// Lazy sequence of features produced by [`Datasource::featureset`].
pub struct Featureset<'a> {
    cursor: FeatureCursor<'a>,
}

impl fmt::Debug for Featureset<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Featureset").finish_non_exhaustive()
    }
}

impl Iterator for Featureset<'_> {
    type Item = Result<Feature>;

    fn next(&mut self) -> Option<Self::Item> {
        self.cursor
            .next()
            .map(|item| item.map_err(|err| DatasourceError::backend(&err)))
    }
}
