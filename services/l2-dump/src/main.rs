//! Level-2 product dump tool.
//!
//! Decodes one CryoSat-2 Level-2 product (binary `.DBL` for baselines A to
//! C, netCDF `.nc` for baseline D) and prints a JSON summary of the
//! selected fields to stdout. Logs go to stderr as JSON.

mod config;
mod summary;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use config::{load_config, DumpConfig};
use l2_parser::{read_dbl, DecodeOptions, FieldSelection, L2Product};
use summary::ProductSummary;

#[derive(Parser, Debug)]
#[command(name = "l2-dump")]
#[command(about = "Decode a CryoSat-2 Level-2 product and print a JSON summary")]
struct Args {
    /// Product file (.DBL or .nc)
    file: PathBuf,

    /// Configuration file path
    #[arg(short, long, env = "L2_DUMP_CONFIG")]
    config: Option<PathBuf>,

    /// Convert packed integers to physical units
    #[arg(long)]
    unpack: bool,

    /// Fields to extract as GROUP=FIELD,FIELD (repeatable)
    #[arg(short, long = "field", value_name = "GROUP=FIELDS")]
    fields: Vec<String>,

    /// Valid samples listed per column
    #[arg(long)]
    preview: Option<usize>,

    /// Include MPH, SPH and DSD in the summary
    #[arg(long)]
    headers: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: Level,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level)
        .with_writer(std::io::stderr)
        .json()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => DumpConfig::default(),
    };
    let config = apply_overrides(config, &args)?;
    info!(
        file = %args.file.display(),
        unpack = config.options.unpack,
        "Decoding product"
    );

    let mut product = decode(&args.file, &config.options)?;
    let selection = config.options.selection(product.identity.baseline);
    let table = product
        .to_table(&selection)
        .with_context(|| format!("Failed to extract fields from {}", args.file.display()))?;

    if !args.headers {
        product.headers = None;
    }
    let summary = ProductSummary::build(&product, &table, config.preview);
    println!("{}", serde_json::to_string_pretty(&summary)?);

    info!(
        records = summary.records,
        columns = summary.columns.len(),
        "Done"
    );
    Ok(())
}

/// Command-line flags take precedence over the config file.
fn apply_overrides(mut config: DumpConfig, args: &Args) -> Result<DumpConfig> {
    if args.unpack {
        config.options.unpack = true;
    }
    if let Some(preview) = args.preview {
        config.preview = preview;
    }
    if !args.fields.is_empty() {
        config.options.fields = Some(parse_fields(&args.fields)?);
    }
    Ok(config)
}

/// Parse `GROUP=FIELD,FIELD` arguments into a selection.
fn parse_fields(specs: &[String]) -> Result<FieldSelection> {
    specs.iter().try_fold(FieldSelection::new(), |selection, spec| {
        let (group, fields) = spec
            .split_once('=')
            .with_context(|| format!("Expected GROUP=FIELDS, got {:?}", spec))?;
        let fields: Vec<&str> = fields
            .split(',')
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .collect();
        anyhow::ensure!(!fields.is_empty(), "No fields listed for group {}", group);
        Ok(selection.with_group(group.trim(), fields))
    })
}

fn decode(path: &Path, options: &DecodeOptions) -> Result<L2Product> {
    let is_netcdf = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("nc"));

    if is_netcdf {
        netcdf_parser::silence_hdf5_errors();
        Ok(netcdf_parser::read_nc(path, options)?)
    } else {
        Ok(read_dbl(path, options)?)
    }
}
