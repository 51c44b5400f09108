// ── Domain model ──
//
// Dashboard-side types. Wire payloads from agentdash-api are converted into
// these in `convert.rs`; the two enums that are identical on the wire and in
// the UI are re-exported as-is.

use std::fmt;

pub use agentdash_api::{AgentAction, LogKind};

/// Wall-clock label used when an entry or sample carries no timestamp.
pub(crate) fn local_time_label() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}

// ── Agent ────────────────────────────────────────────────────────────

/// Agent lifecycle status. The backend sends free-form strings; the known
/// ones get variants, everything else is kept lowercased.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AgentStatus {
    Active,
    Paused,
    Error,
    Idle,
    Other(String),
}

impl AgentStatus {
    pub fn parse(raw: &str) -> Self {
        let lower = raw.trim().to_lowercase();
        match lower.as_str() {
            "active" => Self::Active,
            "paused" => Self::Paused,
            "error" => Self::Error,
            "idle" => Self::Idle,
            _ => Self::Other(lower),
        }
    }

    /// Status an agent is assumed to be in after `action` succeeded.
    pub fn after(action: AgentAction) -> Self {
        match action {
            AgentAction::Pause => Self::Paused,
            AgentAction::Resume | AgentAction::Restart => Self::Active,
        }
    }

    /// Lowercased state tag shown by the status indicator.
    pub fn tag(&self) -> &str {
        match self {
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Error => "error",
            Self::Idle => "idle",
            Self::Other(s) => s,
        }
    }
}

impl fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// One agent as reported by a feed snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Agent {
    pub name: String,
    pub status: AgentStatus,
    /// (metric name, display value), in feed order.
    pub metrics: Vec<(String, String)>,
}

// ── Log ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub timestamp: String,
    pub agent: String,
    pub kind: LogKind,
    pub message: String,
}

// ── Metrics ──────────────────────────────────────────────────────────

/// One chart point. Label and value travel together so a window can
/// never misalign them.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSample {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueTask {
    pub name: String,
}

// ── Theme ────────────────────────────────────────────────────────────

/// Display mode. Persisted as `light-mode` / `dark-mode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

impl ThemeMode {
    pub fn storage_key(self) -> &'static str {
        match self {
            Self::Light => "light-mode",
            Self::Dark => "dark-mode",
        }
    }

    /// Parse a persisted value. Unknown values yield `None`.
    pub fn from_storage(raw: &str) -> Option<Self> {
        match raw.trim() {
            "light-mode" => Some(Self::Light),
            "dark-mode" => Some(Self::Dark),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Light => "Light Mode",
            Self::Dark => "Dark Mode",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Self::Light => "☀",
            Self::Dark => "☾",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parse_lowercases() {
        assert_eq!(AgentStatus::parse("Active"), AgentStatus::Active);
        assert_eq!(AgentStatus::parse(" PAUSED "), AgentStatus::Paused);
        let other = AgentStatus::parse("Warming-Up");
        assert_eq!(other.tag(), "warming-up");
    }

    #[test]
    fn status_after_action() {
        assert_eq!(AgentStatus::after(AgentAction::Pause), AgentStatus::Paused);
        assert_eq!(AgentStatus::after(AgentAction::Resume), AgentStatus::Active);
        assert_eq!(AgentStatus::after(AgentAction::Restart), AgentStatus::Active);
    }

    #[test]
    fn theme_storage_round_trip() {
        for mode in [ThemeMode::Light, ThemeMode::Dark] {
            assert_eq!(ThemeMode::from_storage(mode.storage_key()), Some(mode));
        }
        assert_eq!(ThemeMode::from_storage("solarized"), None);
        assert_eq!(ThemeMode::Light.toggled().toggled(), ThemeMode::Light);
    }
}
