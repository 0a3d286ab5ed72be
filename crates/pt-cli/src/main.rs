use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use pt_data::{DataSource, FixtureSource, JsonFileSource, Snapshot};
use tracing_subscriber::EnvFilter;

use pt_cli::commands::{demo, permissions, playback, report, users};
use pt_cli::{Cli, Commands, Config};

/// Load config and read the snapshot from the configured data source.
fn load_snapshot(
    config_path: Option<&Path>,
    data_path: Option<&Path>,
) -> Result<(Snapshot, Config)> {
    let mut config = Config::load_from(config_path).context("failed to load configuration")?;
    if let Some(path) = data_path {
        config.data_path = Some(path.to_path_buf());
    }
    tracing::debug!(?config, "loaded configuration");

    let source: Box<dyn DataSource> = match &config.data_path {
        Some(path) => Box::new(JsonFileSource::new(path)),
        None => Box::new(FixtureSource),
    };
    let snapshot = source.data().context("failed to read snapshot")?;
    Ok((snapshot, config))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Logs go to stderr so command output stays machine-readable
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let Some(command) = &cli.command else {
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let (snapshot, config) = load_snapshot(cli.config.as_deref(), cli.data.as_deref())?;
    let mut stdout = io::stdout().lock();

    match command {
        Commands::Demo => demo::run(&mut stdout, &snapshot, config.ordering)?,
        Commands::Users {
            action,
            start,
            stop,
            json,
        } => users::run(&mut stdout, &snapshot.actions, action, *start, *stop, *json)?,
        Commands::Playback {
            user,
            sessions,
            json,
        } => playback::run(
            &mut stdout,
            &snapshot.actions,
            *user,
            config.ordering,
            *sessions,
            *json,
        )?,
        Commands::Report { json } => {
            report::run(&mut stdout, &snapshot.actions, config.ordering, *json)?;
        }
        Commands::Permissions { user } => permissions::run(&mut stdout, &snapshot, *user)?,
    }

    Ok(())
}
