use std::sync::Arc;

use clap::Parser;
use log::{debug, info};

use quicknote::{App, Cli, Config, NoteStore, Result};

fn initialize_logger(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp_secs()
        .format_module_path(true)
        .init();

    info!("Logger initialized");
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    initialize_logger(cli.verbose);
    info!("Application starting up");

    if let Err(e) = run(cli).await {
        eprintln!("{} {}", console::style("error:").red().bold(), e);
        std::process::exit(1);
    }

    info!("Application shutting down");
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    if let Some(storage) = cli.storage {
        config.storage_path = storage;
    }

    debug!("Using note storage at {}", config.storage_path.display());

    let store = Arc::new(NoteStore::new(config.storage_path.clone())?);
    let app = App::new(store, config, cli.verbose);

    app.run(cli.command).await
}
