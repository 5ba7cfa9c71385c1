use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::io_utils::DEFAULT_RECORDS_FIELD;

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Normalize call-detail-record exports and load them into MongoDB",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Normalize CDR fields and insert every record into a MongoDB collection
    Load(LoadArgs),
    /// Normalize CDR fields and write the records as JSON lines
    Clean(CleanArgs),
}

#[derive(Debug, Args)]
pub struct InputArgs {
    /// Input JSON export to read ('-' for stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Name of the top-level array holding the records
    #[arg(long = "records-field", default_value = DEFAULT_RECORDS_FIELD)]
    pub records_field: String,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct LoadArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// MongoDB connection string, e.g. mongodb://localhost:27017
    #[arg(short = 'c', long = "connection-string", env = "CDR_LOADER_MONGODB_URI")]
    pub connection_string: String,
    /// Target database name
    #[arg(short = 'd', long = "database")]
    pub database: String,
    /// Target collection name
    #[arg(short = 'C', long = "collection")]
    pub collection: String,
}

#[derive(Debug, Args)]
pub struct CleanArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Output JSON lines file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
}
