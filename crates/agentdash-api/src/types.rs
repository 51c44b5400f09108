//! Wire types for the live feed and the REST control endpoints.
//!
//! Feed messages carry no sequencing or acknowledgement fields. Every
//! top-level field is optional, so one message may be a full or a partial
//! snapshot; absent fields mean "no news" for that component.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

// ── Feed snapshot ────────────────────────────────────────────────────

/// One inbound feed message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedSnapshot {
    #[serde(default)]
    pub agents: Option<Vec<AgentPayload>>,
    #[serde(default)]
    pub logs: Option<Vec<LogPayload>>,
    #[serde(default)]
    pub metrics: Option<MetricsPayload>,
}

/// Per-agent status and metrics as sent by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentPayload {
    pub name: String,
    pub status: String,
    /// Metric name to displayable value, in the order the backend sent them.
    #[serde(default)]
    pub metrics: IndexMap<String, serde_json::Value>,
}

/// Log category. Unknown categories deserialize to [`LogKind::Other`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LogKind {
    Info,
    Warning,
    Error,
    #[serde(other)]
    Other,
}

impl LogKind {
    /// Every concrete category, in filter-bar order.
    pub const ALL: [LogKind; 3] = [Self::Info, Self::Warning, Self::Error];
}

/// One log record from the feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogPayload {
    #[serde(rename = "type")]
    pub kind: LogKind,
    pub agent: String,
    pub message: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// System-wide performance sample plus the pending task queue.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsPayload {
    /// CPU usage in percent.
    #[serde(default)]
    pub cpu: Option<f64>,
    /// Memory usage in MB.
    #[serde(default)]
    pub memory: Option<f64>,
    #[serde(default)]
    pub queue: Option<Vec<QueueTaskPayload>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueTaskPayload {
    pub name: String,
}

// ── Control requests ─────────────────────────────────────────────────

/// Lifecycle command for a single agent.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AgentAction {
    Pause,
    Resume,
    Restart,
}

impl AgentAction {
    pub const ALL: [AgentAction; 3] = [Self::Pause, Self::Resume, Self::Restart];
}

/// Body of `POST /api/agents/control`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlRequest {
    pub agent: String,
    pub action: AgentAction,
}

/// Body of `POST /api/agents/settings`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingRequest {
    pub agent: String,
    pub setting: String,
    pub value: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_full_snapshot() {
        let json = r#"{
            "agents": [
                {"name": "Developer", "status": "Active",
                 "metrics": {"tasks": 12, "uptime": "3h", "load": 0.5}}
            ],
            "logs": [
                {"type": "warning", "agent": "Developer",
                 "message": "slow response", "timestamp": "12:00:01"}
            ],
            "metrics": {"cpu": 41.5, "memory": 812, "queue": [{"name": "build"}]}
        }"#;

        let snap: FeedSnapshot = serde_json::from_str(json).unwrap();
        let agents = snap.agents.unwrap();
        assert_eq!(agents[0].name, "Developer");
        let keys: Vec<&str> = agents[0].metrics.keys().map(String::as_str).collect();
        assert_eq!(keys, ["tasks", "uptime", "load"]);

        let logs = snap.logs.unwrap();
        assert_eq!(logs[0].kind, LogKind::Warning);
        assert_eq!(logs[0].timestamp.as_deref(), Some("12:00:01"));

        let metrics = snap.metrics.unwrap();
        assert_eq!(metrics.cpu, Some(41.5));
        assert_eq!(metrics.memory, Some(812.0));
        assert_eq!(metrics.queue.unwrap()[0].name, "build");
    }

    #[test]
    fn partial_snapshot_leaves_fields_empty() {
        let snap: FeedSnapshot = serde_json::from_str(r#"{"metrics": {"cpu": 3}}"#).unwrap();
        assert!(snap.agents.is_none());
        assert!(snap.logs.is_none());
        let metrics = snap.metrics.unwrap();
        assert!(metrics.memory.is_none());
        assert!(metrics.queue.is_none());
    }

    #[test]
    fn unknown_log_kind_maps_to_other() {
        let log: LogPayload =
            serde_json::from_str(r#"{"type": "debug", "agent": "a", "message": "m"}"#).unwrap();
        assert_eq!(log.kind, LogKind::Other);
        assert!(log.timestamp.is_none());
    }

    #[test]
    fn control_request_wire_shape() {
        let req = ControlRequest {
            agent: "Developer".into(),
            action: AgentAction::Restart,
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            serde_json::json!({"agent": "Developer", "action": "restart"})
        );
        assert_eq!(AgentAction::Pause.to_string(), "pause");
        assert_eq!("resume".parse::<AgentAction>().unwrap(), AgentAction::Resume);
    }
}
