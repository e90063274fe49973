mod walkthrough;

use anyhow::Result;
use std::fs::{self, OpenOptions};

use biblio_core::{
    config::{self, AppConfig},
    LibraryService,
};
use tracing::info;
use tracing_subscriber::{prelude::*, EnvFilter};

fn main() -> Result<()> {
    init_logging()?;

    let config_path = config::ensure_default_config()?;
    let config = AppConfig::load()?;
    info!(path = %config_path.display(), library = %config.library_name, "Configuration loaded");

    let store = config.snapshot_store();
    let mut library = match store.latest()? {
        Some(entry) => {
            info!(path = %entry.path.display(), saved_at = %entry.saved_at, "Restoring snapshot");
            LibraryService::restore(store.load(&entry)?)?
        }
        None => LibraryService::new(config.library_name.clone()),
    };

    if library.items().next().is_none() && library.members().next().is_none() {
        walkthrough::run(&mut library);
    } else {
        info!("Library already populated; skipping walkthrough");
    }
    walkthrough::print_state(&library);

    if config.autosave {
        let entry = store.save(&library.snapshot(), config.snapshot_label.as_deref())?;
        println!("Snapshot saved to {}", entry.path.display());
    }

    Ok(())
}

fn init_logging() -> Result<()> {
    let log_dir = std::env::current_dir()?.join("logs");
    fs::create_dir_all(&log_dir)?;
    let log_path = log_dir.join("biblio.log");

    let env_filter = EnvFilter::from_default_env();

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .compact()
        .with_writer(std::io::stdout);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .compact()
        .with_ansi(false)
        .with_writer(move || {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(&log_path)
                .expect("failed to open log file")
        });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    Ok(())
}
