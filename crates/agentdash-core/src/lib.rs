// agentdash-core: Dashboard state pipeline between agentdash-api and the TUI.

pub mod command;
pub mod components;
pub mod config;
pub mod controller;
pub mod convert;
pub mod dashboard;
pub mod error;
pub mod model;

// ── Primary re-exports ──────────────────────────────────────────────
pub use command::{CommandOutcome, ControlPanel};
pub use components::{
    AgentCard, AgentStatusBoard, CategoryFilter, LogFeed, LogFilter, MetricSeries, MetricsChart,
    MemoryStore, PreferenceStore, SeriesId, SettingState, TaskQueue, ThemePreference, action_label,
};
pub use config::{AgentProfile, DashboardConfig, SettingSpec, TlsVerification};
pub use controller::{DashboardController, DashboardEvent};
pub use dashboard::{Dashboard, SYSTEM_AGENT};
pub use error::CoreError;
pub use model::{Agent, AgentAction, AgentStatus, LogEntry, LogKind, MetricSample, QueueTask, ThemeMode};

// Feed plumbing types consumers need without depending on agentdash-api.
pub use agentdash_api::{FeedEvent, FeedSnapshot, FeedState, ReconnectConfig};
