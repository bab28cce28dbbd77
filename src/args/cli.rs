use clap::{Args, Parser, Subcommand};

use super::parsers::parse_bool_env;

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Play a page script against an in-memory document
    Run(RunArgs),
    /// Print the configured speed ladder
    Ladder(LadderArgs),
}

#[derive(Debug, Args, Clone)]
pub struct RunArgs {
    /// Page script (.toml or .json)
    #[arg(value_name = "SCRIPT")]
    pub script: String,

    /// Persist speeds in this JSON file instead of in memory
    #[arg(long = "store", env = "LOOPER_STORE")]
    pub store: Option<String>,

    /// Config file path (defaults to ./looper.toml or ./looper.json)
    #[arg(long = "config", short = 'c')]
    pub config: Option<String>,
}

#[derive(Debug, Args, Clone)]
pub struct LadderArgs {
    /// Config file path (defaults to ./looper.toml or ./looper.json)
    #[arg(long = "config", short = 'c')]
    pub config: Option<String>,
}

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Per-site video playback-speed controller, driven headlessly from page scripts."
)]
pub struct LooperArgs {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging (sets log level to debug unless overridden by LOOPER_LOG/RUST_LOG)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Disable color output
    #[arg(long = "no-color", env = "NO_COLOR", global = true, value_parser = parse_bool_env)]
    pub no_color: bool,
}
