// ── Runtime dashboard configuration ──
//
// These types describe *where* the backend lives and how the dashboard is
// provisioned. They never touch disk: agentdash-config (or a test) builds a
// `DashboardConfig` and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use agentdash_api::ReconnectConfig;
use url::Url;

pub const DEFAULT_FEED_URL: &str = "ws://localhost:8080/monitoring";
pub const DEFAULT_API_URL: &str = "http://localhost:8080";
pub const DEFAULT_LOG_CAPACITY: usize = 500;
pub const DEFAULT_CHART_WINDOW: usize = 20;
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 30;

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-signed certs).
    DangerAcceptInvalid,
}

/// One adjustable setting on an agent's control card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingSpec {
    pub name: String,
    /// Values the user can cycle through.
    pub options: Vec<String>,
    /// Initially selected value, if known.
    pub value: Option<String>,
}

/// A provisioned agent. The status board only ever shows these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentProfile {
    pub name: String,
    pub settings: Vec<SettingSpec>,
}

impl AgentProfile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            settings: Vec::new(),
        }
    }
}

/// Configuration for one dashboard session.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Live feed endpoint (`ws://` or `wss://`).
    pub feed_url: Url,
    /// REST base URL for control and settings requests.
    pub api_url: Url,
    /// TLS verification strategy for REST calls.
    pub tls: TlsVerification,
    /// REST request timeout.
    pub timeout: Duration,
    /// Feed reconnection policy.
    pub reconnect: ReconnectConfig,
    /// Maximum number of activity log entries kept in memory.
    pub log_capacity: usize,
    /// Samples kept per chart series.
    pub chart_window: usize,
    /// Staleness check interval (seconds). 0 = never.
    pub refresh_interval_secs: u64,
    /// Agents with a status card, in display order.
    pub agents: Vec<AgentProfile>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            feed_url: Url::parse(DEFAULT_FEED_URL).expect("default feed URL is valid"),
            api_url: Url::parse(DEFAULT_API_URL).expect("default API URL is valid"),
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            reconnect: ReconnectConfig::default(),
            log_capacity: DEFAULT_LOG_CAPACITY,
            chart_window: DEFAULT_CHART_WINDOW,
            refresh_interval_secs: DEFAULT_REFRESH_INTERVAL_SECS,
            agents: Vec::new(),
        }
    }
}
