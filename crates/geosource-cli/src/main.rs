//! Command-line interface for `GeoSource`, a uniform front end over geospatial
//! data sources.
//!
//! This binary opens a datasource from `key=value` parameters through the
//! [`geosource_core`] driver registry and reports on it.
//!
//! # Architecture
//!
//! The CLI is built using [`clap`] for argument parsing and [`tracing`] for structured logging.
//! Library crates log through the `log` facade, which is bridged into `tracing` at startup.
//!
//! # Available Commands
//!
//! - `describe` - Show the datasource type, encoding, fields and geometry kind
//! - `extent` - Print the datasource envelope as `[minx, miny, maxx, maxy]`
//! - `params` - List the effective parameters after backend defaults
//! - `features` - Stream features as one JSON object per line
//! - `drivers` - List all available drivers and their capabilities

mod display;

use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use serde_json::{Value as JsonValue, json};
use tracing::{Level, debug, info};
use tracing_log::LogTracer;
use tracing_subscriber::FmtSubscriber;

use geosource_core::common::Feature;
use geosource_core::drivers::builtin_registry;
use geosource_core::{Datasource, DatasourceError, ParameterSet, Value, box_to_array};

#[derive(Parser)]
#[command(
    name = "geosource",
    version,
    about = "Uniform access to geospatial data sources",
    long_about = "GeoSource opens vector and raster data through pluggable drivers.\n\
                  Datasources are selected with a 'type' parameter and configured with key=value pairs."
)]
/// Command-line arguments and options for the `GeoSource` CLI.
///
/// Logging flags and datasource parameters are global so they can be given
/// before or after the subcommand.
struct Cli {
    /// Enable verbose (INFO level) logging output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug (DEBUG level) logging output with detailed diagnostics.
    #[arg(short, long, global = true)]
    debug: bool,

    /// Datasource parameter as key=value (e.g. -p type=csv -p file=points.csv).
    #[arg(short, long = "param", value_name = "KEY=VALUE", global = true)]
    params: Vec<String>,

    /// JSON object of datasource parameters. `-p` values override it.
    #[arg(long, value_name = "FILE", global = true)]
    params_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands for the `GeoSource` CLI.
#[derive(Subcommand)]
enum Commands {
    /// Describes the schema of a datasource.
    Describe {
        /// Print the description as JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Prints the datasource extent as [minx, miny, maxx, maxy].
    Extent,

    /// Lists the effective datasource parameters.
    Params,

    /// Streams every feature over the full extent as JSON lines.
    Features {
        /// Stop after this many features.
        #[arg(short, long, value_name = "N")]
        limit: Option<usize>,
    },

    /// Lists all available drivers and their capabilities.
    Drivers,
}

/// Entry point for the `GeoSource` command-line interface.
///
/// # Errors
///
/// Returns an error if the datasource cannot be opened, a datasource operation
/// fails, or the logging system cannot be initialized.
fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity flags
    let log_level = if cli.debug {
        Level::DEBUG
    } else if cli.verbose {
        Level::INFO
    } else {
        Level::WARN
    };

    // Bridge logs from the `log` crate to the `tracing` ecosystem.
    LogTracer::init()?;

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(true)
        .with_writer(io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Describe { json } => {
            let datasource = open_datasource(&cli.params, cli.params_file.as_deref())?;
            handle_describe(&datasource, json)?;
        },
        Commands::Extent => {
            let datasource = open_datasource(&cli.params, cli.params_file.as_deref())?;
            let [minx, miny, maxx, maxy] = datasource.extent().map_err(report)?;
            println!("[{minx}, {miny}, {maxx}, {maxy}]");
        },
        Commands::Params => {
            let datasource = open_datasource(&cli.params, cli.params_file.as_deref())?;
            display::display_parameters(&datasource.parameters());
        },
        Commands::Features { limit } => {
            let datasource = open_datasource(&cli.params, cli.params_file.as_deref())?;
            let written = handle_features(&datasource, limit, &mut io::stdout().lock())?;
            info!("Wrote {written} feature(s)");
        },
        Commands::Drivers => {
            display::display_drivers(&builtin_registry().drivers());
        },
    }

    Ok(())
}

/// Collects parameters from the optional JSON file, then the `-p` assignments.
fn collect_params(assignments: &[String], params_file: Option<&Path>) -> Result<ParameterSet> {
    let mut params = ParameterSet::new();
    if let Some(path) = params_file {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read parameter file {}", path.display()))?;
        let json: JsonValue = serde_json::from_str(&text)
            .with_context(|| format!("Parameter file {} is not valid JSON", path.display()))?;
        params = ParameterSet::from_json(&json).map_err(report)?;
    }
    params.extend_from(&ParameterSet::from_assignments(assignments).map_err(report)?);
    Ok(params)
}

fn open_datasource(assignments: &[String], params_file: Option<&Path>) -> Result<Datasource> {
    let params = collect_params(assignments, params_file)?;
    if params.is_empty() {
        return Err(anyhow!(
            "No datasource parameters given\n\nHint: Pass at least '-p type=<driver>'."
        ));
    }
    info!("Opening datasource with {} parameter(s)", params.len());
    Datasource::new(&builtin_registry(), &params).map_err(report)
}

/// Turns a datasource error into a CLI error with its recovery hint.
fn report(err: DatasourceError) -> anyhow::Error {
    match err.recovery_suggestion() {
        Some(hint) => anyhow!("{}\n\nHint: {hint}", err.user_message()),
        None => anyhow!("{}", err.user_message()),
    }
}

fn handle_describe(datasource: &Datasource, as_json: bool) -> Result<()> {
    let description = datasource.describe().map_err(report)?;
    if as_json {
        println!("{}", description.to_json_string(true)?);
    } else {
        display::display_description(&description);
    }
    Ok(())
}

/// Writes up to `limit` features as JSON lines and returns how many were written.
fn handle_features<W: Write>(
    datasource: &Datasource,
    limit: Option<usize>,
    out: W,
) -> Result<usize> {
    let Some(featureset) = datasource.featureset().map_err(report)? else {
        debug!("Datasource returned no features");
        return Ok(0);
    };

    let mut out = BufWriter::new(out);
    let mut written = 0;
    for feature in featureset.take(limit.unwrap_or(usize::MAX)) {
        let feature = feature.map_err(report)?;
        serde_json::to_writer(&mut out, &feature_to_json(&feature))?;
        out.write_all(b"\n")?;
        written += 1;
    }
    out.flush()?;
    Ok(written)
}

/// JSON form of one feature: id, WKT geometry, converted properties, and the
/// raster window when present.
fn feature_to_json(feature: &Feature) -> JsonValue {
    let mut object = json!({
        "id": feature.id,
        "geometry": feature
            .geometry
            .clone()
            .map(|geometry| Value::Geometry(geometry).to_string()),
        "properties": Value::from_attributes(feature),
    });
    if let (Some(tile), Some(map)) = (&feature.raster, object.as_object_mut()) {
        map.insert(
            "raster".to_string(),
            json!({
                "width": tile.width,
                "height": tile.height,
                "extent": box_to_array(&tile.envelope),
                "nodata": tile.nodata,
            }),
        );
    }
    object
}
