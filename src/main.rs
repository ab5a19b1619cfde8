use clap::error::ErrorKind;
use clap::{ArgAction, Parser};
use log::{LevelFilter, error, info};
use signal_hook::consts::{SIGINT, SIGTERM};
use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use typetrace::daemon::event_handler::EventHandler;
use typetrace::error::{BackendError, Result};
use typetrace::storage::sqlite3::KeystrokeStore;
use typetrace::util::config::AppConfig;
use typetrace::util::paths;

/// The backend of TypeTrace. It is started by the frontend and is not
/// designed to be run by users directly.
#[derive(Parser)]
#[command(
    name = "typetrace_backend",
    version,
    disable_version_flag = true,
    about = "The backend of TypeTrace",
    after_help = "Warning: This is the backend and is not designed to run by users.\n\
                  You should run the frontend of TypeTrace which will run this."
)]
struct Cli {
    /// Display version then exit.
    #[arg(short = 'v', long = "version", action = ArgAction::Version)]
    version: Option<bool>,

    /// Enable debug logging.
    #[arg(short, long)]
    debug: bool,
}

fn main() {
    let cli = parse_arguments();
    init_logging(cli.debug);

    if let Err(err) = run() {
        error!("{err}");
        process::exit(err.exit_code());
    }
}

/// Help and version exit 0; anything malformed prints usage and exits with
/// the wrong-argument code. Positional arguments are rejected.
fn parse_arguments() -> Cli {
    match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => process::exit(0),
                _ => process::exit(
                    BackendError::WrongArgument(err.to_string()).exit_code(),
                ),
            }
        }
    }
}

fn init_logging(debug: bool) {
    let level = if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();
}

fn run() -> Result<()> {
    let config = AppConfig::load()?;

    // The handler performs the permission and accessibility checks; it comes
    // up before the store so a refused user leaves no database file behind.
    let mut handler = EventHandler::new(&config)?;

    let db_path = match &config.database_path {
        Some(path) => path.clone(),
        None => paths::resolve_database_path()?,
    };
    info!("database path: {}", db_path.display());

    let mut store = KeystrokeStore::open(&db_path)?;
    handler.set_flush_callback(Box::new(move |batch| {
        store.write_batch(batch).map_err(anyhow::Error::from)
    }));

    let shutdown = install_signal_flags()?;

    info!("TypeTrace backend started; capturing key presses");
    while !shutdown.load(Ordering::SeqCst) {
        // Runtime failures must not bring the daemon down; a chronic store
        // failure drops batches but keeps the input path live.
        if let Err(err) = handler.tick() {
            error!("event loop iteration failed: {err}");
        }
    }

    info!("received termination signal; draining pending keystrokes");
    if let Err(err) = handler.flush() {
        error!("final flush failed: {err}");
    }
    Ok(())
}

/// SIGINT and SIGTERM only set the flag; the drain happens on the main
/// thread once the loop observes it. A second signal is absorbed.
fn install_signal_flags() -> Result<Arc<AtomicBool>> {
    let shutdown = Arc::new(AtomicBool::new(false));
    for signal in [SIGINT, SIGTERM] {
        signal_hook::flag::register(signal, Arc::clone(&shutdown))?;
    }
    Ok(shutdown)
}
