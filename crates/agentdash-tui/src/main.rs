//! `agentdash`: live terminal dashboard for a fleet of agents.
//!
//! Built on [ratatui](https://ratatui.rs). A background data bridge streams
//! feed snapshots from `agentdash-core`'s
//! [`DashboardController`](agentdash_core::DashboardController) into the TUI
//! action loop; control and settings requests go out over REST.
//!
//! Logs are written to a file (default `/tmp/agentdash.log`) to avoid
//! corrupting the terminal UI.
//!
//! Entry point: CLI argument parsing, config layering, tracing setup, panic
//! hooks, and app launch.

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
use color_eyre::eyre::{Result, WrapErr};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use agentdash_config::{AgentEntry, Config, FileThemeStore};
use agentdash_core::{Dashboard, DashboardController, ThemePreference};

use crate::app::App;

/// Live dashboard for monitoring and controlling agents.
#[derive(Parser, Debug)]
#[command(name = "agentdash", version, about)]
struct Cli {
    /// Config file (defaults to the platform config dir)
    #[arg(short = 'c', long, env = "AGENTDASH_CONFIG")]
    config: Option<PathBuf>,

    /// Live feed URL (e.g., ws://localhost:8080/monitoring)
    #[arg(short = 'f', long, env = "AGENTDASH_FEED_URL")]
    feed_url: Option<String>,

    /// REST base URL for control and settings requests
    #[arg(short = 'a', long, env = "AGENTDASH_API_URL")]
    api_url: Option<String>,

    /// Agent to show (repeatable; replaces the configured roster)
    #[arg(long = "agent", value_name = "NAME")]
    agents: Vec<String>,

    /// Accept self-signed TLS certificates
    #[arg(short = 'k', long)]
    insecure: bool,

    /// Log file path (defaults to /tmp/agentdash.log)
    #[arg(long, default_value = "/tmp/agentdash.log")]
    log_file: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,

    /// Write the effective configuration to the config file and exit
    #[arg(long, conflicts_with = "print_config")]
    save_config: bool,
}

impl Cli {
    /// CLI flags win over file and environment.
    fn apply_overrides(&self, cfg: &mut Config) {
        if let Some(url) = &self.feed_url {
            cfg.feed_url.clone_from(url);
        }
        if let Some(url) = &self.api_url {
            cfg.api_url.clone_from(url);
        }
        if self.insecure {
            cfg.insecure = true;
        }
        if !self.agents.is_empty() {
            cfg.agents = self
                .agents
                .iter()
                .map(|name| AgentEntry {
                    name: name.clone(),
                    settings: Vec::new(),
                })
                .collect();
        }
    }
}

/// Set up file-based tracing. We MUST NOT log to stdout/stderr; that would
/// corrupt the TUI output. The returned guard flushes logs on drop.
fn setup_tracing(cli: &Cli) -> WorkerGuard {
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "agentdash={log_level},agentdash_core={log_level},agentdash_api={log_level},agentdash_config={log_level}"
        ))
    });

    let log_dir = cli
        .log_file
        .parent()
        .unwrap_or(std::path::Path::new("/tmp"));
    let log_filename = cli
        .log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("agentdash.log"));

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

fn load_config(cli: &Cli) -> Result<Config> {
    let mut cfg = match &cli.config {
        Some(path) => agentdash_config::load_config_from(path),
        None => agentdash_config::load_config(),
    }
    .wrap_err("failed to load configuration")?;
    cli.apply_overrides(&mut cfg);
    Ok(cfg)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let cfg = load_config(&cli)?;
    if cli.print_config {
        print!("{}", toml::to_string_pretty(&cfg)?);
        return Ok(());
    }
    if cli.save_config {
        let path = cli.config.clone().unwrap_or_else(agentdash_config::config_path);
        match &cli.config {
            Some(path) => agentdash_config::save_config_to(&cfg, path),
            None => agentdash_config::save_config(&cfg),
        }
        .wrap_err("failed to save configuration")?;
        println!("Configuration written to {}", path.display());
        return Ok(());
    }
    let dashboard_config =
        agentdash_config::to_dashboard_config(&cfg).wrap_err("invalid configuration")?;

    // Install panic/error hooks BEFORE entering the terminal
    tui::install_hooks()?;

    // Tracing to file; hold the guard so logs flush on exit
    let _log_guard = setup_tracing(&cli);

    info!(
        feed = %dashboard_config.feed_url,
        api = %dashboard_config.api_url,
        agents = dashboard_config.agents.len(),
        "starting agentdash"
    );

    let theme = ThemePreference::load(Box::new(FileThemeStore::default_location()));
    let dashboard = Dashboard::new(&dashboard_config, theme);
    let controller =
        DashboardController::new(dashboard_config).wrap_err("failed to build control client")?;

    let mut app = App::new(controller, dashboard);
    app.run().await?;

    Ok(())
}
