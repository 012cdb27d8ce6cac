//! callgrid command-line entry point.
//!
//! # Responsibility
//! - Provide `ping`/`version` probes to verify `callgrid_core` linkage.
//! - Print stored entities from a SQLite database as JSON.

use callgrid_core::{
    default_log_level, init_logging, CallgridConfig, Catalog, Kind, OpContext,
    SqliteDocumentStore,
};
use clap::{Parser, Subcommand};
use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;

type CliResult = Result<(), Box<dyn Error>>;

#[derive(Parser)]
#[command(name = "callgrid")]
#[command(about = "Inspect callgrid notification data")]
struct Cli {
    /// JSON config file (defaults apply when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Absolute directory for rolling log files (logging is off when omitted)
    #[arg(long, global = true)]
    log_dir: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check core linkage
    Ping,
    /// Print the core version
    Version,
    /// Print every record of one kind as a JSON array
    Export {
        /// Path to the SQLite database
        db: PathBuf,
        /// Kind name, e.g. Callpoints or events
        kind: String,
    },
    /// Print the events of every notification spawned by an action
    EventsForAction {
        /// Path to the SQLite database
        db: PathBuf,
        /// Action natural key (acID)
        ac_id: String,
    },
    /// Print the enriched assignments of one callpoint
    Assignments {
        /// Path to the SQLite database
        db: PathBuf,
        /// Callpoint natural key (cpID)
        cp_id: String,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = run(cli);
    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> CliResult {
    let config = match &cli.config {
        Some(path) => CallgridConfig::from_json_file(path)?,
        None => CallgridConfig::default(),
    };
    if let Some(log_dir) = &cli.log_dir {
        init_logging(&config.log_level, log_dir)?;
    }

    match cli.command {
        Commands::Ping => {
            println!("callgrid_core ping={}", callgrid_core::ping());
            Ok(())
        }
        Commands::Version => {
            println!("callgrid_core version={}", callgrid_core::core_version());
            println!("default_log_level={}", default_log_level());
            Ok(())
        }
        Commands::Export { db, kind } => {
            let kind = Kind::parse(&kind).ok_or_else(|| {
                format!(
                    "unknown kind `{kind}`; expected one of {}",
                    Kind::ALL.map(|kind| kind.as_str()).join(", ")
                )
            })?;
            let catalog = open_catalog(&db, &config)?;
            println!("{}", catalog.export_kind(&context(), kind)?);
            Ok(())
        }
        Commands::EventsForAction { db, ac_id } => {
            let catalog = open_catalog(&db, &config)?;
            let events = catalog
                .resolver()
                .list_events_by_action_id(&context(), &ac_id)?;
            println!("{}", callgrid_core::export_json(&events)?);
            Ok(())
        }
        Commands::Assignments { db, cp_id } => {
            let catalog = open_catalog(&db, &config)?;
            let assignments = catalog
                .resolver()
                .list_assignments_by_callpoint(&context(), &cp_id)?;
            println!("{}", callgrid_core::export_json(&assignments)?);
            Ok(())
        }
    }
}

fn open_catalog(db: &Path, config: &CallgridConfig) -> Result<Catalog, Box<dyn Error>> {
    let store = SqliteDocumentStore::open_existing(db)
        .map_err(|err| format!("cannot open database `{}`: {err}", db.display()))?;
    log::info!(
        "event=cli_open module=cli status=ok db={} uniqueness={:?}",
        db.display(),
        config.uniqueness
    );
    Ok(Catalog::new(Arc::new(store), config))
}

fn context() -> OpContext {
    OpContext::logged()
}
