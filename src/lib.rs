pub mod cli;
pub mod data;
pub mod io_utils;
pub mod normalize;
pub mod process;
pub mod rfc1036;
pub mod sink;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, info};

use crate::{
    cli::{CleanArgs, Cli, Commands, InputArgs, LoadArgs},
    data::Record,
    sink::{JsonLinesSink, MongoSink},
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("cdr_loader", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Load(args) => handle_load(&args),
        Commands::Clean(args) => handle_clean(&args),
    }
}

fn load_input(args: &InputArgs) -> Result<Vec<Record>> {
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    info!("Loading json from: {}", args.input.display());
    let records = io_utils::load_records(&args.input, &args.records_field, encoding)?;
    info!(
        "Loaded {} record(s) from '{}'",
        records.len(),
        args.records_field
    );
    Ok(records)
}

fn handle_load(args: &LoadArgs) -> Result<()> {
    let records = load_input(&args.input)?;
    let mut sink = MongoSink::connect(&args.connection_string, &args.database, &args.collection)
        .with_context(|| format!("Opening collection {}.{}", args.database, args.collection))?;
    let stored = process::process_records(records, &mut sink)?;
    info!(
        "Inserted {} record(s) into {}.{}",
        stored, args.database, args.collection
    );
    Ok(())
}

fn handle_clean(args: &CleanArgs) -> Result<()> {
    let records = load_input(&args.input)?;
    let mut sink = JsonLinesSink::create(args.output.as_deref())?;
    let stored = process::process_records(records, &mut sink)?;
    info!(
        "Wrote {} record(s) -> {}",
        stored,
        io_utils::describe_path(args.output.as_deref())
    );
    Ok(())
}
