use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use utils::version;

#[derive(Parser)]
#[command(about, long_about, version = &**version::VERSION)]
pub struct Cli {
    #[arg(
        long,
        env = "SCALER_LOAD_LOG",
        default_value = "warn",
        help = "Log filter directive, e.g. info or scaler_plugin=debug"
    )]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Calculate the scaler load of a request
    Calc(CalcArgs),
    /// Print the parsed request model
    Parse(RequestArgs),
    /// Print plugin identifiers and build version
    Info,
}

#[derive(Parser)]
pub struct RequestArgs {
    #[arg(
        long,
        short,
        value_hint = clap::ValueHint::FilePath,
        help = "Path of the JSON request, read from stdin when omitted"
    )]
    pub request: Option<PathBuf>,
}

#[derive(Parser)]
pub struct CalcArgs {
    #[command(flatten)]
    pub request: RequestArgs,

    #[arg(long, help = "Print the per-session pricing before the result")]
    pub breakdown: bool,

    #[arg(
        long,
        conflicts_with = "breakdown",
        help = "Print the full calculation result as JSON"
    )]
    pub json: bool,
}
