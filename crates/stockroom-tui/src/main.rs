//! `stockroom-tui`: terminal UI for a stockroom product catalog.
//!
//! Built on [ratatui](https://ratatui.rs) with reactive data from
//! `stockroom-core`'s `watch` channels. Signed-in users browse products,
//! search by name or SKU, open a product, toggle favorites and delete
//! products. Signed-out users get the login/register form.
//!
//! Logs go to a file (default under the stockroom data directory) so they
//! never corrupt the terminal.

mod action;
mod app;
mod component;
mod data_bridge;
mod event;
mod screen;
mod screens;
mod theme;
mod tui;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

use stockroom_core::{Catalog, FileStore};

use crate::app::App;

/// Terminal UI for browsing and curating a stockroom product catalog.
#[derive(Parser, Debug)]
#[command(name = "stockroom-tui", version, about)]
struct Cli {
    /// Config profile to use
    #[arg(short, long, env = "STOCKROOM_PROFILE")]
    profile: Option<String>,

    /// Catalog API base URL (overrides the profile)
    #[arg(short = 'u', long, env = "STOCKROOM_API_URL")]
    api_url: Option<Url>,

    /// Key-value store file (overrides the profile)
    #[arg(long, env = "STOCKROOM_STORE")]
    store: Option<PathBuf>,

    /// Log file path (defaults to stockroom-tui.log in the data directory)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// File-based tracing. Nothing may be written to stdout/stderr while the
/// TUI owns the terminal. The returned guard flushes on drop.
fn setup_tracing(cli: &Cli) -> Result<WorkerGuard> {
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "stockroom_tui={log_level},stockroom_core={log_level},stockroom_api={log_level}"
        ))
    });

    let log_file = cli
        .log_file
        .clone()
        .unwrap_or_else(|| stockroom_config::data_dir().join("stockroom-tui.log"));
    let log_dir = log_file
        .parent()
        .map_or_else(std::env::temp_dir, std::path::Path::to_path_buf);
    let log_filename = log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("stockroom-tui.log"));

    std::fs::create_dir_all(&log_dir)
        .wrap_err_with(|| format!("cannot create log directory {}", log_dir.display()))?;

    let file_appender = tracing_appender::rolling::never(&log_dir, log_filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true),
        )
        .init();

    Ok(guard)
}

/// Build a [`Catalog`] from the config file, active profile and flags.
fn build_catalog(cli: &Cli) -> Result<Catalog> {
    let cfg = stockroom_config::load_config_or_default();
    let profile_name = cfg.active_profile_name(cli.profile.as_deref());
    let mut profile = cfg
        .profile(&profile_name)
        .wrap_err_with(|| format!("cannot load profile '{profile_name}'"))?;

    if let Some(url) = &cli.api_url {
        profile.api_url = url.to_string();
    }

    let config = stockroom_config::profile_to_catalog_config(&profile, &cfg.defaults)?;
    let store_path = cli
        .store
        .clone()
        .unwrap_or_else(|| stockroom_config::resolve_store_path(&profile, &profile_name));

    info!(
        profile = %profile_name,
        api_url = %config.api_url,
        store = %store_path.display(),
        "opening catalog"
    );

    let store = Arc::new(FileStore::new(store_path));
    Catalog::new(config, store).wrap_err("cannot open catalog")
}

#[tokio::main]
async fn main() -> Result<()> {
    tui::install_hooks()?;

    let cli = Cli::parse();
    let _guard = setup_tracing(&cli)?;

    info!(version = env!("CARGO_PKG_VERSION"), "starting stockroom-tui");

    let catalog = build_catalog(&cli)?;
    // Favorites are shown from the cache until the first sync lands
    let favorites = catalog.load_cached_favorites();
    info!(cached = favorites.len(), "loaded cached favorites");

    let mut app = App::new(catalog);
    app.run().await?;

    info!("stockroom-tui exited cleanly");
    Ok(())
}
