use std::path::Path;
use std::rc::Rc;

use clap::Parser;
use tokio::task::LocalSet;

use crate::args::{Command, LadderArgs, LooperArgs, RunArgs};
use crate::config::{apply_config, load_config};
use crate::error::AppResult;
use crate::script::{PageSnapshot, load_script, run_script};
use crate::session::SessionSettings;
use crate::speed::format_speed;
use crate::storage::{FileStore, FlakyStore, MemoryStore};

/// Parses the command line and runs the selected subcommand to completion.
///
/// # Errors
///
/// Returns an error when the selected command cannot complete.
pub fn run() -> AppResult<()> {
    let args = LooperArgs::parse();

    crate::system::logger::init_logging(args.verbose, args.no_color);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    LocalSet::new().block_on(&runtime, run_command(args.command))
}

async fn run_command(command: Command) -> AppResult<()> {
    match command {
        Command::Run(run) => run_page(run).await,
        Command::Ladder(ladder) => print_ladder(&ladder),
    }
}

fn load_settings(path: Option<&str>) -> AppResult<SessionSettings> {
    match load_config(path)? {
        Some(config) => Ok(apply_config(&config)?),
        None => Ok(SessionSettings::default()),
    }
}

async fn run_page(args: RunArgs) -> AppResult<()> {
    let settings = load_settings(args.config.as_deref())?;
    let script = load_script(Path::new(&args.script))?;

    let snapshots = match args.store {
        Some(path) => {
            tracing::debug!("Persisting speeds in {}", path);
            let store = Rc::new(FlakyStore::new(FileStore::new(path)));
            run_script(&script, &store, &settings).await?
        }
        None => {
            let store = Rc::new(FlakyStore::new(MemoryStore::new()));
            run_script(&script, &store, &settings).await?
        }
    };

    print_snapshots(&snapshots)
}

fn print_snapshots(snapshots: &[PageSnapshot]) -> AppResult<()> {
    for snapshot in snapshots {
        println!("{}", serde_json::to_string(snapshot)?);
    }
    Ok(())
}

fn print_ladder(args: &LadderArgs) -> AppResult<()> {
    let settings = load_settings(args.config.as_deref())?;
    for speed in settings.ladder.speeds() {
        println!("{}", format_speed(*speed));
    }
    Ok(())
}
