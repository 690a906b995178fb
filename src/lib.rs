pub mod analytics;
pub mod browse;
pub mod classify;
pub mod cli;
pub mod config;
pub mod data;
pub mod dates;
pub mod fields;
pub mod filter;
pub mod identity;
pub mod io_utils;
pub mod normalize;
pub mod paginate;
pub mod profile;
pub mod record;
pub mod table;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, info};

use crate::{
    cli::{Cli, Commands, InputArgs},
    config::EngineConfig,
    normalize::{OrderingPolicy, derive_columns},
    record::Record,
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("donor_ledger", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    let config = EngineConfig::load_or_default(cli.config.as_deref())
        .context("Loading engine configuration")?;
    match cli.command {
        Commands::Columns(args) => handle_columns(&args.input, &config),
        Commands::Browse(args) => browse::execute(&args, &config),
        Commands::Profile(args) => profile::execute(&args, &config),
        Commands::Config => handle_config(&config),
    }
}

pub(crate) fn load_input(args: &InputArgs) -> Result<Vec<Record>> {
    let format = io_utils::resolve_format(&args.input, args.delimiter)?;
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    info!(
        "Loading records from '{}' ({})",
        args.input.display(),
        encoding.name()
    );
    io_utils::load_records(&args.input, format, encoding)
}

fn handle_columns(args: &InputArgs, config: &EngineConfig) -> Result<()> {
    let records = load_input(args)?;
    let columns = derive_columns(&records, &OrderingPolicy::from_fields(&config.fields));
    if columns.is_empty() {
        info!("No columns found in {:?}", args.input);
        return Ok(());
    }
    let rows = columns
        .iter()
        .enumerate()
        .map(|(idx, column)| {
            vec![
                (idx + 1).to_string(),
                column.name.clone(),
                if column.populated { "yes" } else { "no" }.to_string(),
            ]
        })
        .collect::<Vec<_>>();
    let headers = vec!["#".to_string(), "column".to_string(), "populated".to_string()];
    table::print_table(&headers, &rows);
    info!(
        "Derived {} column(s) ({} empty) from {} record(s)",
        columns.len(),
        columns.empty().count(),
        records.len()
    );
    Ok(())
}

fn handle_config(config: &EngineConfig) -> Result<()> {
    let yaml = config.to_yaml().context("Serializing configuration")?;
    print!("{yaml}");
    Ok(())
}
