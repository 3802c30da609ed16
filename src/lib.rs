pub mod cli;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod frequency;
pub mod insights;
pub mod io_utils;
pub mod profile;
pub mod report;
pub mod stats;
pub mod store;
pub mod table;

use std::{env, io::Write, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, debug, info};
use serde::Serialize;

use crate::{
    cli::{Cli, Commands, InputArgs, OutputFormat},
    config::EngineSettings,
    dashboard::{DashboardConfiguration, DashboardStyle},
    error::DashboardError,
    profile::FileProfile,
    store::DirectoryStore,
    table::{ReadOptions, Table},
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("csv_dashboard", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

/// Builds the dashboard for `bytes` in `style` with default settings.
pub fn generate_dashboard(
    bytes: &[u8],
    style: DashboardStyle,
) -> Result<DashboardConfiguration, DashboardError> {
    generate_dashboard_with(bytes, style, &EngineSettings::default())
}

pub fn generate_dashboard_with(
    bytes: &[u8],
    style: DashboardStyle,
    settings: &EngineSettings,
) -> Result<DashboardConfiguration, DashboardError> {
    generate_dashboard_from(bytes, style, settings, &ReadOptions::from_settings(settings))
}

pub fn generate_dashboard_from(
    bytes: &[u8],
    style: DashboardStyle,
    settings: &EngineSettings,
    options: &ReadOptions,
) -> Result<DashboardConfiguration, DashboardError> {
    let table = Table::from_csv_bytes(bytes, options)?;
    let mut config = dashboard::generate(&table, style, settings);
    config.source_digest = Some(io_utils::source_digest(bytes));
    Ok(config)
}

pub fn profile_bytes(
    bytes: &[u8],
    settings: &EngineSettings,
    options: &ReadOptions,
) -> Result<FileProfile, DashboardError> {
    let table = Table::from_csv_bytes(bytes, options)?;
    Ok(profile::profile_table(&table, settings))
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Generate(args) => handle_generate(&args),
        Commands::Profile(args) => handle_profile(&args),
        Commands::Stats(args) => handle_stats(&args.input),
    }
}

fn handle_generate(args: &cli::GenerateArgs) -> Result<()> {
    let (bytes, settings, options) = load_input(&args.input)?;
    info!(
        "Generating {} dashboard for '{}' with delimiter '{}'",
        args.style,
        args.input.input.display(),
        printable_delimiter(options.delimiter)
    );
    let config = match &args.cache_dir {
        Some(dir) => {
            let store = DirectoryStore::new(dir);
            store::generate_cached(&store, &bytes, args.style, &settings, &options)
                .with_context(|| format!("Generating dashboard with cache {dir:?}"))?
        }
        None => generate_dashboard_from(&bytes, args.style, &settings, &options)
            .with_context(|| format!("Generating dashboard for {:?}", args.input.input))?,
    };
    write_document(&config, args.format, args.pretty, args.output.as_deref())
}

fn handle_profile(args: &cli::ProfileArgs) -> Result<()> {
    let (bytes, mut settings, options) = load_input(&args.input)?;
    if let Some(rows) = args.preview_rows {
        settings.preview_rows = rows;
    }
    let profile = profile_bytes(&bytes, &settings, &options)
        .with_context(|| format!("Profiling {:?}", args.input.input))?;
    write_document(&profile, args.format, args.pretty, args.output.as_deref())
}

fn handle_stats(args: &InputArgs) -> Result<()> {
    let (bytes, _settings, options) = load_input(args)?;
    let table = Table::from_csv_bytes(&bytes, &options)
        .with_context(|| format!("Reading {:?}", args.input))?;
    let summaries = stats::summarize(&table);
    print!("{}", report::render_summary_table(&summaries));
    info!(
        "Computed summary statistics for {} column(s) over {} row(s)",
        summaries.len(),
        table.row_count()
    );
    Ok(())
}

fn load_input(args: &InputArgs) -> Result<(Vec<u8>, EngineSettings, ReadOptions)> {
    let settings = match &args.config {
        Some(path) => EngineSettings::load(path)?,
        None => EngineSettings::default(),
    };
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let delimiter = io_utils::resolve_input_delimiter(&args.input, args.delimiter);
    let options = ReadOptions::from_settings(&settings)
        .with_delimiter(delimiter)
        .with_encoding(encoding);

    let bytes = io_utils::read_input(&args.input)?;
    if bytes.len() > settings.max_input_bytes {
        let err = DashboardError::InputTooLarge {
            size: bytes.len(),
            limit: settings.max_input_bytes,
        };
        return Err(anyhow::Error::new(err).context(format!("Reading {:?}", args.input)));
    }
    debug!("Read {} byte(s) from {:?}", bytes.len(), args.input);
    Ok((bytes, settings, options))
}

fn write_document<T: Serialize>(
    document: &T,
    format: OutputFormat,
    pretty: bool,
    output: Option<&std::path::Path>,
) -> Result<()> {
    let mut rendered = match format {
        OutputFormat::Json if pretty => serde_json::to_string_pretty(document)?,
        OutputFormat::Json => serde_json::to_string(document)?,
        OutputFormat::Yaml => serde_yaml::to_string(document)?,
    };
    if !rendered.ends_with('\n') {
        rendered.push('\n');
    }
    let mut writer = io_utils::open_output(output)?;
    writer
        .write_all(rendered.as_bytes())
        .context("Writing output document")?;
    writer.flush().context("Flushing output document")?;
    if let Some(path) = output {
        info!("Wrote document to {path:?}");
    }
    Ok(())
}

pub(crate) fn printable_delimiter(delimiter: u8) -> String {
    match delimiter {
        b',' => ",".to_string(),
        b'\t' => "\\t".to_string(),
        b'\n' => "\\n".to_string(),
        other => (other as char).to_string(),
    }
}
