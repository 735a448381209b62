//! Driver metadata for geospatial backends and their capabilities.
//!
//! A [`Driver`] describes one backend implementation registered in the
//! [`DriverRegistry`](crate::DriverRegistry): the name used in the `type`
//! parameter, any aliases it answers to, whether it produces raster or vector
//! datasources, and where its backends read their data from.

use crate::backend::DatasourceKind;

/// Support status for a driver capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupportStatus {
    /// The driver provides the capability.
    Supported,
    /// The driver does not provide the capability.
    NotSupported,
}

impl SupportStatus {
    /// Returns `true` if the capability is provided.
    #[must_use]
    pub fn is_supported(&self) -> bool {
        matches!(self, SupportStatus::Supported)
    }

    /// Returns the string representation of this support status.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            SupportStatus::Supported => "Supported",
            SupportStatus::NotSupported => "Not Supported",
        }
    }
}

/// What a driver's backends can read and serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverCapabilities {
    /// Reads data from the `file` parameter (joined onto `base`).
    pub file: SupportStatus,
    /// Reads data given directly in the `inline` parameter.
    pub inline: SupportStatus,
    /// Serves attribute fields alongside geometries.
    pub attributes: SupportStatus,
}

impl DriverCapabilities {
    /// Default capabilities for a driver producing datasources of `kind`.
    ///
    /// Raster datasources carry no attribute fields.
    #[must_use]
    pub const fn for_kind(kind: DatasourceKind) -> Self {
        Self {
            file: SupportStatus::Supported,
            inline: SupportStatus::Supported,
            attributes: match kind {
                DatasourceKind::Vector => SupportStatus::Supported,
                DatasourceKind::Raster => SupportStatus::NotSupported,
            },
        }
    }
}

/// Geospatial backend driver definition.
///
/// The short name is what callers put in the `type` parameter (e.g. `"geojson"`);
/// aliases are matched the same way. Matching is case-insensitive.
#[derive(Debug, Clone)]
pub struct Driver {
    /// Short name used in the `type` parameter and the CLI (e.g., `"geojson"`).
    pub short_name: &'static str,
    /// Long descriptive name for display purposes (e.g., `"GeoJSON"`).
    pub long_name: &'static str,
    /// Additional names accepted in the `type` parameter.
    pub aliases: &'static [&'static str],
    /// Kind of datasource produced by this driver's backends.
    pub kind: DatasourceKind,
    /// What this driver's backends can read and serve.
    pub capabilities: DriverCapabilities,
}

impl Driver {
    /// Creates a new driver definition with the default capabilities for `kind`.
    ///
    /// # Examples
    ///
    /// ```
    /// use geosource_core_common::{DatasourceKind, Driver};
    ///
    /// let driver = Driver::new("geojson", "GeoJSON", DatasourceKind::Vector);
    /// assert!(driver.capabilities.attributes.is_supported());
    /// assert!(driver.matches("GeoJSON"));
    /// ```
    #[must_use]
    pub const fn new(
        short_name: &'static str,
        long_name: &'static str,
        kind: DatasourceKind,
    ) -> Self {
        Self {
            short_name,
            long_name,
            aliases: &[],
            kind,
            capabilities: DriverCapabilities::for_kind(kind),
        }
    }

    /// Sets the aliases this driver answers to.
    #[must_use]
    pub const fn with_aliases(mut self, aliases: &'static [&'static str]) -> Self {
        self.aliases = aliases;
        self
    }

    /// Overrides the driver capabilities.
    #[must_use]
    pub const fn with_capabilities(mut self, capabilities: DriverCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Returns `true` if `name` is this driver's short name or one of its aliases.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        self.short_name.eq_ignore_ascii_case(name)
            || self.aliases.iter().any(|alias| alias.eq_ignore_ascii_case(name))
    }
}
