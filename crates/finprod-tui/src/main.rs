//! `finprod-tui`: terminal console for the financial products catalogue.
//!
//! Built on [ratatui](https://ratatui.rs) with the product list fed by
//! `finprod-core`'s [`ProductStream`](finprod_core::ProductStream). Three
//! screens replace the browser pages: the product list, the add form and
//! the edit form.
//!
//! Logs are written to a file (default `/tmp/finprod-tui.log`) so they
//! never corrupt the terminal. A background data bridge forwards every
//! list refresh from the controller into the TUI action loop.

mod action;
mod app;
mod component;
mod data_bridge;
mod event;
mod screen;
mod screens;
mod theme;
mod tui;
mod widgets;

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::Result;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use finprod_core::{Controller, ControllerConfig};

use crate::app::App;

/// Terminal console for managing financial products.
#[derive(Parser, Debug)]
#[command(name = "finprod-tui", version, about)]
struct Cli {
    /// Configuration profile to use
    #[arg(short = 'p', long, env = "FINPROD_PROFILE")]
    profile: Option<String>,

    /// Products API base URL (overrides profile)
    #[arg(short = 'u', long, env = "FINPROD_BASE_URL")]
    base_url: Option<String>,

    /// Log file path
    #[arg(long, default_value = "/tmp/finprod-tui.log")]
    log_file: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// File-only tracing. The returned guard flushes pending lines on drop and
/// must live as long as the app.
fn setup_tracing(cli: &Cli) -> WorkerGuard {
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "finprod_tui={log_level},finprod_core={log_level},finprod_api={log_level}"
        ))
    });

    let log_dir = cli
        .log_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(std::path::Path::new("/tmp"));
    let log_filename = cli
        .log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("finprod-tui.log"));

    let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
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

    guard
}

/// Controller settings and page size from the shared config file, with
/// command-line overrides applied.
fn resolve_settings(cli: &Cli) -> Result<(ControllerConfig, usize)> {
    let cfg = finprod_config::load_config_or_default();
    let profile = cfg.resolve_profile(cli.profile.as_deref())?;

    let page_size = finprod_config::page_size_for(profile, &cfg.defaults)?;
    let mut config = finprod_config::profile_to_controller_config(profile, &cfg.defaults)?;
    if let Some(ref raw) = cli.base_url {
        config.base_url = finprod_config::parse_base_url(raw)?;
    }
    Ok((config, page_size))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Hooks first, so a panic during startup still restores the terminal
    tui::install_hooks()?;

    let _log_guard = setup_tracing(&cli);

    let (config, page_size) = resolve_settings(&cli)?;
    info!(
        base_url = %config.base_url,
        page_size,
        refresh_secs = config.refresh_interval_secs,
        "starting finprod-tui"
    );

    let mut app = App::new(Controller::new(config), page_size);
    app.run().await?;

    Ok(())
}
