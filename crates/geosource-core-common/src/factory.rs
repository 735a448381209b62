//! Driver catalog mapping parameter sets to concrete backends.
//!
//! Format crates implement [`FormatFactory`] and are registered into a
//! [`DriverRegistry`] at startup. The registry is an ordinary value that is
//! passed to whoever resolves parameters; there is no process-wide instance.

use std::collections::BTreeMap;
use std::sync::Arc;

use log::debug;

use crate::backend::{Backend, BackendParams};
use crate::drivers::Driver;
use crate::error::{BackendError, BackendResult};

/// Parameter naming the driver that should open a parameter set.
pub const TYPE_PARAM: &str = "type";

/// Factory for opening backends of one driver.
pub trait FormatFactory: Send + Sync {
    /// Metadata describing this driver.
    fn driver(&self) -> Driver;

    /// Opens a backend from the full parameter set, `type` included.
    ///
    /// # Errors
    ///
    /// Returns an error if a required parameter is missing or malformed, or
    /// if the backing store cannot be opened.
    fn open(&self, params: &BackendParams) -> BackendResult<Box<dyn Backend>>;
}

/// Registry of format factories keyed by driver short name.
#[derive(Default, Clone)]
pub struct DriverRegistry {
    factories: BTreeMap<String, Arc<dyn FormatFactory>>,
}

impl DriverRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a factory, replacing any previous one with the same short name.
    pub fn register(&mut self, factory: Arc<dyn FormatFactory>) {
        let name = factory.driver().short_name.to_ascii_lowercase();
        debug!("Registering driver '{name}'");
        self.factories.insert(name, factory);
    }

    /// Builder-style variant of [`DriverRegistry::register`].
    #[must_use]
    pub fn with_factory(mut self, factory: Arc<dyn FormatFactory>) -> Self {
        self.register(factory);
        self
    }

    /// Finds a factory by short name or alias (case-insensitive).
    #[must_use]
    pub fn find(&self, name: &str) -> Option<Arc<dyn FormatFactory>> {
        if let Some(factory) = self.factories.get(&name.to_ascii_lowercase()) {
            return Some(Arc::clone(factory));
        }
        self.factories
            .values()
            .find(|factory| factory.driver().matches(name))
            .cloned()
    }

    /// All registered drivers, sorted by short name.
    #[must_use]
    pub fn drivers(&self) -> Vec<Driver> {
        self.factories.values().map(|f| f.driver()).collect()
    }

    /// Registered short names in sorted order.
    #[must_use]
    pub fn driver_names(&self) -> Vec<&'static str> {
        self.factories.values().map(|f| f.driver().short_name).collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Opens the backend selected by the `type` parameter.
    ///
    /// Every parameter, including `type`, is forwarded to the factory untouched.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::MissingParameter`] if `type` is absent,
    /// [`BackendError::DriverNotFound`] if no driver matches it, or whatever
    /// the factory reports while opening the backend.
    pub fn resolve(&self, params: &BackendParams) -> BackendResult<Box<dyn Backend>> {
        let name = params
            .get(TYPE_PARAM)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
            .ok_or_else(|| BackendError::MissingParameter {
                parameter: TYPE_PARAM.to_string(),
                driver: None,
            })?;

        let factory = self.find(name).ok_or_else(|| BackendError::DriverNotFound {
            name: name.to_string(),
            available: self.driver_names().join(", "),
        })?;

        debug!(
            "Resolving datasource with driver '{}' ({} parameters)",
            factory.driver().short_name,
            params.len()
        );
        factory.open(params)
    }
}

impl std::fmt::Debug for DriverRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriverRegistry")
            .field("drivers", &self.driver_names())
            .finish()
    }
}
