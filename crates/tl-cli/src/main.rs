use std::io;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tl_core::{ManualKind, SystemClock};
use tracing_subscriber::EnvFilter;

use tl_cli::commands::{
    entry, export, history, import, list, manual, month, report, status, task, track, watch,
};
use tl_cli::{Cli, Commands, Config, EntryAction, ManualAction};

/// Load config and open database, ensuring the parent directory exists.
fn open_database(config_path: Option<&Path>) -> Result<(tl_db::Database, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let db = tl_db::Database::open(&config.database_path).context("failed to open database")?;
    Ok((db, config))
}

fn run_watch(
    db: &tl_db::Database,
    config: &Config,
    clock: &SystemClock,
    args: &watch::WatchArgs,
) -> Result<()> {
    let date = args.day.resolve(clock)?;
    let period = Duration::from_millis(args.interval_ms.unwrap_or(config.refresh_interval_ms));
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start runtime")?;

    let mut stdout = io::stdout().lock();
    runtime.block_on(async {
        let shutdown = async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::warn!(error = %err, "failed to listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
        };
        watch::run(&mut stdout, db, clock, date, period, true, shutdown).await
    })?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let Some(command) = &cli.command else {
        // No subcommand, show help
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let clock = SystemClock;
    let (mut db, config) = open_database(cli.config.as_deref())?;
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut out = io::stdout();

    match command {
        Commands::List(args) => list::run(&mut out, &db, &clock, args)?,
        Commands::Add(args) => task::add(&mut out, &mut db, &clock, args)?,
        Commands::Delete(args) => task::delete(&mut input, &mut out, &mut db, &clock, args)?,
        Commands::Rename(args) => task::rename(&mut out, &mut db, &clock, args)?,
        Commands::Notes(args) => task::notes(&mut out, &mut db, &clock, args)?,
        Commands::Start(args) => track::start(
            &mut input,
            &mut out,
            &mut db,
            &clock,
            config.running_policy,
            args,
        )?,
        Commands::Stop(args) => track::stop(&mut out, &mut db, &clock, args)?,
        Commands::Running => track::running(&mut out, &db, &clock)?,
        Commands::Manual(action) => match action {
            ManualAction::Add(args) => {
                manual::adjust(&mut out, &mut db, &clock, ManualKind::Added, args)?;
            }
            ManualAction::Remove(args) => {
                manual::adjust(&mut out, &mut db, &clock, ManualKind::Removed, args)?;
            }
            ManualAction::Reset(args) => manual::reset(&mut out, &mut db, &clock, args)?,
        },
        Commands::History(args) => history::run(&mut out, &db, &clock, args)?,
        Commands::Entry(action) => match action {
            EntryAction::Edit(args) => entry::edit(&mut out, &mut db, &clock, args)?,
            EntryAction::Delete(args) => {
                entry::delete(&mut input, &mut out, &mut db, &clock, args)?;
            }
        },
        Commands::Report(args) => report::run(&mut out, &db, &clock, args)?,
        Commands::Month(args) => month::run(&mut out, &db, &clock, args)?,
        Commands::Watch(args) => run_watch(&db, &config, &clock, args)?,
        Commands::Export(args) => export::run(&mut out, &db, args)?,
        Commands::Import(args) => import::run(&mut input, &mut out, &mut db, args)?,
        Commands::Status => status::run(&mut out, &db, &config.database_path, &clock)?,
    }

    Ok(())
}
