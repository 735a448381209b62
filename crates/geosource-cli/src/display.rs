//! Display utilities for formatting CLI output.
//!
//! This module provides table row structures and formatting functions
//! for presenting datasource information in a human-readable format.

use std::collections::BTreeMap;

use geosource_core::common::Driver;
use geosource_core::{Description, Value};
use tabled::{Table, Tabled};

/// Table row representation for displaying field information.
#[derive(Tabled)]
pub struct FieldRow {
    /// Name of the field.
    #[tabled(rename = "Field")]
    pub name: String,
    /// Logical type of the field.
    #[tabled(rename = "Type")]
    pub logical_type: String,
}

/// Table row representation for one effective parameter.
#[derive(Tabled)]
pub struct ParamRow {
    #[tabled(rename = "Parameter")]
    pub key: String,
    #[tabled(rename = "Value")]
    pub value: String,
    #[tabled(rename = "Type")]
    pub logical_type: String,
}

/// Table row representation for displaying driver information.
#[derive(Tabled)]
pub struct DriverRow {
    /// Name used in the `type` parameter (e.g., `geojson`).
    #[tabled(rename = "Short Name")]
    pub short_name: String,
    /// Full descriptive name of the driver.
    #[tabled(rename = "Long Name")]
    pub long_name: String,
    /// `raster` or `vector`.
    #[tabled(rename = "Kind")]
    pub kind: String,
    /// Other accepted `type` values.
    #[tabled(rename = "Aliases")]
    pub aliases: String,
    #[tabled(rename = "File")]
    pub file: String,
    #[tabled(rename = "Inline")]
    pub inline: String,
    #[tabled(rename = "Attributes")]
    pub attributes: String,
}

impl From<&Driver> for DriverRow {
    fn from(driver: &Driver) -> Self {
        Self {
            short_name: driver.short_name.to_string(),
            long_name: driver.long_name.to_string(),
            kind: driver.kind.as_str().to_string(),
            aliases: if driver.aliases.is_empty() {
                "-".to_string()
            } else {
                driver.aliases.join(", ")
            },
            file: driver.capabilities.file.as_str().to_string(),
            inline: driver.capabilities.inline.as_str().to_string(),
            attributes: driver.capabilities.attributes.as_str().to_string(),
        }
    }
}

/// Display a datasource description.
///
/// Prints the datasource type, encoding and geometry kind, followed by a
/// table of declared fields when there are any.
pub fn display_description(description: &Description) {
    println!("\nType: {}", description.kind);
    println!("Encoding: {}", description.encoding);
    println!("Geometry: {}", description.geometry_type);

    if !description.fields.is_empty() {
        println!("\n=== Fields ===");

        let field_rows: Vec<FieldRow> = description
            .fields
            .iter()
            .map(|f| FieldRow {
                name: f.name.clone(),
                logical_type: f.logical_type.to_string(),
            })
            .collect();

        let field_table = Table::new(field_rows).to_string();
        println!("{field_table}");
    }
}

/// Display effective datasource parameters in key order.
pub fn display_parameters(parameters: &BTreeMap<String, Value>) {
    println!("\n=== Parameters ===");

    let rows: Vec<ParamRow> = parameters
        .iter()
        .map(|(key, value)| ParamRow {
            key: key.clone(),
            value: value.to_string(),
            logical_type: value.logical_type().to_string(),
        })
        .collect();

    println!("{}", Table::new(rows));
}

/// Display the registered drivers.
pub fn display_drivers(drivers: &[Driver]) {
    println!("\nAvailable Drivers ({} total):\n", drivers.len());

    let rows: Vec<DriverRow> = drivers.iter().map(DriverRow::from).collect();
    println!("{}", Table::new(rows));
}

#[cfg(test)]
mod tests {
    use super::*;
    use geosource_core::common::{DatasourceKind, FieldType, GeometryType, LayerDescriptor};
    use geosource_core::{GeometryKind, LogicalType};

    #[test]
    fn test_field_row_creation() {
        let row = FieldRow {
            name: "name".to_string(),
            logical_type: LogicalType::String.to_string(),
        };
        assert_eq!(row.name, "name");
        assert_eq!(row.logical_type, "String");
    }

    #[test]
    fn test_driver_row_from_driver() {
        let driver = Driver::new("csv", "Comma Separated Value", DatasourceKind::Vector)
            .with_aliases(&["tsv", "txt"]);
        let row = DriverRow::from(&driver);
        assert_eq!(row.short_name, "csv");
        assert_eq!(row.kind, "vector");
        assert_eq!(row.aliases, "tsv, txt");
        assert_eq!(row.file, "Supported");
        assert_eq!(row.attributes, "Supported");

        let bare = DriverRow::from(&Driver::new("raster", "ESRI ASCII Grid", DatasourceKind::Raster));
        assert_eq!(bare.aliases, "-");
        assert_eq!(bare.attributes, "Not Supported");
    }

    #[test]
    fn test_param_table_renders() {
        let mut parameters = BTreeMap::new();
        parameters.insert("type".to_string(), Value::String("csv".to_string()));
        parameters.insert("strict".to_string(), Value::Boolean(false));
        let rows: Vec<ParamRow> = parameters
            .iter()
            .map(|(key, value)| ParamRow {
                key: key.clone(),
                value: value.to_string(),
                logical_type: value.logical_type().to_string(),
            })
            .collect();

        let table = Table::new(rows).to_string();
        assert!(table.contains("Parameter"));
        assert!(table.contains("strict"));
        assert!(table.contains("Boolean"));
    }

    #[test]
    fn test_display_description() {
        let layer = LayerDescriptor::new("roads", "utf-8")
            .with_descriptor("name", FieldType::String)
            .with_descriptor("lanes", FieldType::Integer);
        let description = Description::from_layer(
            DatasourceKind::Vector,
            &layer,
            GeometryKind::from(Some(GeometryType::LineString)),
        );

        // This test just ensures the function runs without panicking
        display_description(&description);
    }
}
