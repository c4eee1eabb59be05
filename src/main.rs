mod categorize;
mod config;
mod currency;
mod db;
mod interpret;
mod ledger;
mod logging;
mod models;
mod run;
mod summary;
mod ui;

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::{info, warn};

use crate::categorize::Categorizer;
use crate::config::Settings;
use crate::currency::CurrencyConverter;
use crate::interpret::Interpreter;
use crate::run::Services;

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();

    let proj_dirs = directories::ProjectDirs::from("com", "voicebudget", "VoiceBudget")
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
    let settings = Settings::load(&proj_dirs.config_dir().join("config.toml"))?;

    let data_dir = proj_dirs.data_dir();
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

    let log_dir = settings
        .log
        .directory
        .clone()
        .unwrap_or_else(|| data_dir.join("logs"));
    // Console logging would scribble over the alternate screen.
    let _guard = logging::init(&settings.log, &log_dir, args.len() > 1)?;

    let db_path = db_path(&settings, data_dir);
    info!(db = %db_path.display(), "opening database");
    let mut db = db::Database::open(&db_path)?;

    let services = build_services(&settings)?;

    match args.len() {
        1 => run::as_tui(&mut db, services),
        2.. => run::as_cli(&args, &mut db, &services),
        _ => {
            eprintln!("Usage: voicebudget [command]");
            Ok(())
        }
    }
}

fn db_path(settings: &Settings, data_dir: &std::path::Path) -> PathBuf {
    match &settings.database {
        Some(path) => PathBuf::from(run::shellexpand(&path.to_string_lossy())),
        None => data_dir.join("voicebudget.db"),
    }
}

fn build_services(settings: &Settings) -> Result<Services> {
    let (categorizer, unknown) = Categorizer::with_extra_keywords(&settings.keywords);
    for name in &unknown {
        warn!(category = %name, "ignoring keywords for unknown category");
    }
    let interpreter =
        Interpreter::with_categorizer(categorizer).context("Failed to build command rules")?;

    Ok(Services {
        interpreter,
        converter: CurrencyConverter::offline(),
        currency: settings.currency,
        base_currency: settings.base_currency,
    })
}
