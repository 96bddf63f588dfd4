use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};

use auditlog::cli::{handle_log_command, LogCommands};
use auditlog::config::{paths::AuditPaths, settings::Settings};
use auditlog::storage::JsonlStore;
use auditlog::{AuditLog, Caller};

#[derive(Parser)]
#[command(
    name = "auditlog",
    author = "Kaylee Beyene",
    version,
    about = "Inspect the audit trail of monitored collections",
    long_about = "auditlog reads the append-only audit log written by monitored \
                  collections. It lists, counts and shows captured insert, update \
                  and remove records, subject to the same access rules as the \
                  library queries."
)]
struct Cli {
    /// User the queries run as
    #[arg(long, env = "AUDITLOG_USER", global = true)]
    user: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(flatten)]
    Log(LogCommands),

    /// Show current configuration and paths
    Config {
        /// Write the current settings to the settings file
        #[arg(long)]
        init: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize paths and settings
    let paths = AuditPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;

    init_tracing(cli.quiet, cli.verbose, &settings.log_level)?;

    match cli.command {
        Some(Commands::Log(cmd)) => {
            let store = Arc::new(JsonlStore::open(paths.audit_log())?);
            let log = AuditLog::new(store, &settings)?;
            let caller = Caller::from_user(cli.user.as_deref());
            handle_log_command(&log, &caller, cmd)?;
        }
        Some(Commands::Config { init }) => {
            if init {
                settings.save(&paths)?;
                println!("Wrote settings to {}", paths.settings_file().display());
                println!();
            }

            println!("auditlog Configuration");
            println!("======================");
            println!("Base directory: {}", paths.base_dir().display());
            println!("Settings file:  {}", paths.settings_file().display());
            println!("Audit log:      {}", paths.audit_log().display());
            println!();
            println!("Settings:");
            println!("  Default page size: {}", settings.default_page_size);
            println!("  Max page size:     {}", settings.max_page_size);
            println!("  Log level:         {}", settings.log_level);
        }
        None => {
            println!("auditlog - audit trail for document collections");
            println!();
            println!("Run 'auditlog --help' for usage information.");
            println!("Run 'auditlog list' to see the latest records.");
        }
    }

    Ok(())
}

fn init_tracing(quiet: bool, verbose: bool, default_level: &str) -> Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        default_level
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("AUDITLOG_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}
