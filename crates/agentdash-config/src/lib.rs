//! Shared configuration for the agentdash binary.
//!
//! TOML config (defaults → file → `AGENTDASH_` env), the agent roster, and
//! translation to `agentdash_core::DashboardConfig`. Also home of the
//! file-backed theme store, since it shares the platform directory logic.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use agentdash_core::config::{
    DEFAULT_API_URL, DEFAULT_CHART_WINDOW, DEFAULT_FEED_URL, DEFAULT_LOG_CAPACITY,
    DEFAULT_REFRESH_INTERVAL_SECS,
};
use agentdash_core::{
    AgentProfile, DashboardConfig, PreferenceStore, ReconnectConfig, SettingSpec, TlsVerification,
};

const QUALIFIER: &str = "dev";
const ORGANIZATION: &str = "agentdash";
const APPLICATION: &str = "agentdash";
const ENV_PREFIX: &str = "AGENTDASH_";
const THEME_FILE: &str = "theme";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Live feed WebSocket endpoint.
    #[serde(default = "default_feed_url")]
    pub feed_url: String,

    /// REST base URL for control and settings requests.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// REST request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Accept invalid TLS certificates.
    #[serde(default)]
    pub insecure: bool,

    /// Path to a custom CA certificate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,

    #[serde(default)]
    pub reconnect: ReconnectSettings,

    #[serde(default)]
    pub dashboard: DashboardSettings,

    /// Agents with a status card, in display order.
    #[serde(default = "default_agents")]
    pub agents: Vec<AgentEntry>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            feed_url: default_feed_url(),
            api_url: default_api_url(),
            timeout: default_timeout(),
            insecure: false,
            ca_cert: None,
            reconnect: ReconnectSettings::default(),
            dashboard: DashboardSettings::default(),
            agents: default_agents(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ReconnectSettings {
    /// Delay before the first retry, in milliseconds.
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    /// Backoff ceiling, in seconds.
    #[serde(default = "default_max_delay_secs")]
    pub max_delay_secs: u64,

    /// Give up after this many consecutive failures. Absent = never.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<u32>,
}

impl Default for ReconnectSettings {
    fn default() -> Self {
        Self {
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_secs: default_max_delay_secs(),
            max_retries: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DashboardSettings {
    #[serde(default = "default_log_capacity")]
    pub log_capacity: usize,

    #[serde(default = "default_chart_window")]
    pub chart_window: usize,

    /// Staleness check interval in seconds. 0 disables it.
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval: u64,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            log_capacity: default_log_capacity(),
            chart_window: default_chart_window(),
            refresh_interval: default_refresh_interval(),
        }
    }
}

/// One `[[agents]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AgentEntry {
    pub name: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub settings: Vec<SettingEntry>,
}

/// One `[[agents.settings]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SettingEntry {
    pub name: String,
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

fn default_feed_url() -> String {
    DEFAULT_FEED_URL.into()
}
fn default_api_url() -> String {
    DEFAULT_API_URL.into()
}
fn default_timeout() -> u64 {
    30
}
fn default_initial_delay_ms() -> u64 {
    1_000
}
fn default_max_delay_secs() -> u64 {
    30
}
fn default_log_capacity() -> usize {
    DEFAULT_LOG_CAPACITY
}
fn default_chart_window() -> usize {
    DEFAULT_CHART_WINDOW
}
fn default_refresh_interval() -> u64 {
    DEFAULT_REFRESH_INTERVAL_SECS
}
fn default_agents() -> Vec<AgentEntry> {
    ["Business Analyst", "Developer"]
        .into_iter()
        .map(|name| AgentEntry {
            name: name.into(),
            settings: Vec::new(),
        })
        .collect()
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
}

fn home_fallback(kind: &str) -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(kind);
    p.push(APPLICATION);
    p
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || home_fallback(".config").join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Where the persisted theme flag lives.
pub fn theme_path() -> PathBuf {
    project_dirs().map_or_else(
        || home_fallback(".local/share").join(THEME_FILE),
        |dirs| dirs.data_dir().join(THEME_FILE),
    )
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file path + environment. A missing file is not
/// an error; defaults apply.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading config");

    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

/// Serialize config to TOML at `path`, creating parent directories.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Translation ─────────────────────────────────────────────────────

fn parse_url(field: &str, raw: &str) -> Result<url::Url, ConfigError> {
    raw.parse().map_err(|e| ConfigError::Validation {
        field: field.into(),
        reason: format!("invalid URL '{raw}': {e}"),
    })
}

fn non_zero(field: &str, value: usize) -> Result<usize, ConfigError> {
    if value == 0 {
        return Err(ConfigError::Validation {
            field: field.into(),
            reason: "must be at least 1".into(),
        });
    }
    Ok(value)
}

/// Build a validated `DashboardConfig`.
pub fn to_dashboard_config(cfg: &Config) -> Result<DashboardConfig, ConfigError> {
    let feed_url = parse_url("feed_url", &cfg.feed_url)?;
    if !matches!(feed_url.scheme(), "ws" | "wss") {
        return Err(ConfigError::Validation {
            field: "feed_url".into(),
            reason: format!("expected ws:// or wss://, got {}://", feed_url.scheme()),
        });
    }
    let api_url = parse_url("api_url", &cfg.api_url)?;

    let tls = if cfg.insecure {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = cfg.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    let mut agents = Vec::with_capacity(cfg.agents.len());
    for entry in &cfg.agents {
        if entry.name.trim().is_empty() {
            return Err(ConfigError::Validation {
                field: "agents.name".into(),
                reason: "agent name must not be empty".into(),
            });
        }
        for setting in &entry.settings {
            if setting.options.is_empty() {
                return Err(ConfigError::Validation {
                    field: format!("agents.settings.{}", setting.name),
                    reason: format!("setting for agent '{}' has no options", entry.name),
                });
            }
        }
        agents.push(AgentProfile {
            name: entry.name.clone(),
            settings: entry
                .settings
                .iter()
                .map(|s| SettingSpec {
                    name: s.name.clone(),
                    options: s.options.clone(),
                    value: s.value.clone(),
                })
                .collect(),
        });
    }

    Ok(DashboardConfig {
        feed_url,
        api_url,
        tls,
        timeout: Duration::from_secs(cfg.timeout),
        reconnect: ReconnectConfig {
            initial_delay: Duration::from_millis(cfg.reconnect.initial_delay_ms),
            max_delay: Duration::from_secs(cfg.reconnect.max_delay_secs),
            max_retries: cfg.reconnect.max_retries,
        },
        log_capacity: non_zero("dashboard.log_capacity", cfg.dashboard.log_capacity)?,
        chart_window: non_zero("dashboard.chart_window", cfg.dashboard.chart_window)?,
        refresh_interval_secs: cfg.dashboard.refresh_interval,
        agents,
    })
}

// ── Theme persistence ───────────────────────────────────────────────

/// Theme flag stored as a one-line file.
#[derive(Debug, Clone)]
pub struct FileThemeStore {
    path: PathBuf,
}

impl FileThemeStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at [`theme_path()`].
    pub fn default_location() -> Self {
        Self::new(theme_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PreferenceStore for FileThemeStore {
    fn load(&self) -> io::Result<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => Ok(Some(raw.trim().to_owned())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn save(&mut self, value: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, value)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_config_translates() {
        let dash = to_dashboard_config(&Config::default()).unwrap();
        assert_eq!(dash.feed_url.as_str(), "ws://localhost:8080/monitoring");
        assert_eq!(dash.log_capacity, 500);
        assert_eq!(dash.chart_window, 20);
        assert_eq!(dash.refresh_interval_secs, 30);
        assert_eq!(dash.tls, TlsVerification::SystemDefaults);
        let names: Vec<&str> = dash.agents.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["Business Analyst", "Developer"]);
    }

    #[test]
    fn insecure_wins_over_ca_cert() {
        let cfg = Config {
            insecure: true,
            ca_cert: Some("/etc/ca.pem".into()),
            ..Config::default()
        };
        assert_eq!(
            to_dashboard_config(&cfg).unwrap().tls,
            TlsVerification::DangerAcceptInvalid
        );
    }

    #[test]
    fn http_feed_url_is_rejected() {
        let cfg = Config {
            feed_url: "http://localhost:8080/monitoring".into(),
            ..Config::default()
        };
        let err = to_dashboard_config(&cfg).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "feed_url"));
    }

    #[test]
    fn zero_window_is_rejected() {
        let mut cfg = Config::default();
        cfg.dashboard.chart_window = 0;
        assert!(to_dashboard_config(&cfg).is_err());
    }

    #[test]
    fn setting_without_options_is_rejected() {
        let mut cfg = Config::default();
        cfg.agents[0].settings.push(SettingEntry {
            name: "Priority".into(),
            options: Vec::new(),
            value: None,
        });
        assert!(to_dashboard_config(&cfg).is_err());
    }

    #[test]
    fn theme_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileThemeStore::new(dir.path().join("nested").join("theme"));

        assert_eq!(store.load().unwrap(), None);
        store.save("dark-mode").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("dark-mode"));
    }
}
