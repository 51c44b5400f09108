// ── Wire → domain conversions ──

use agentdash_api::{AgentPayload, LogPayload, QueueTaskPayload};

use crate::model::{Agent, AgentStatus, LogEntry, QueueTask, local_time_label};

/// Render a metric value the way a card shows it: strings verbatim,
/// everything else as its JSON text.
pub(crate) fn display_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => "-".into(),
        other => other.to_string(),
    }
}

impl From<&AgentPayload> for Agent {
    fn from(p: &AgentPayload) -> Self {
        Self {
            name: p.name.clone(),
            status: AgentStatus::parse(&p.status),
            metrics: p
                .metrics
                .iter()
                .map(|(k, v)| (k.clone(), display_value(v)))
                .collect(),
        }
    }
}

impl From<&LogPayload> for LogEntry {
    fn from(p: &LogPayload) -> Self {
        Self {
            timestamp: p.timestamp.clone().unwrap_or_else(local_time_label),
            agent: p.agent.clone(),
            kind: p.kind,
            message: p.message.clone(),
        }
    }
}

impl From<&QueueTaskPayload> for QueueTask {
    fn from(p: &QueueTaskPayload) -> Self {
        Self {
            name: p.name.clone(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::LogKind;

    #[test]
    fn agent_metrics_keep_order_and_render_values() {
        let payload: AgentPayload = serde_json::from_value(serde_json::json!({
            "name": "Developer",
            "status": "Error",
            "metrics": {"tasks": 4, "model": "deepseek-chat", "healthy": false, "eta": null}
        }))
        .unwrap();

        let agent = Agent::from(&payload);
        assert_eq!(agent.status, AgentStatus::Error);
        assert_eq!(
            agent.metrics,
            vec![
                ("tasks".to_string(), "4".to_string()),
                ("model".to_string(), "deepseek-chat".to_string()),
                ("healthy".to_string(), "false".to_string()),
                ("eta".to_string(), "-".to_string()),
            ]
        );
    }

    #[test]
    fn log_without_timestamp_gets_local_time() {
        let payload = LogPayload {
            kind: LogKind::Info,
            agent: "Analyst".into(),
            message: "done".into(),
            timestamp: None,
        };
        let entry = LogEntry::from(&payload);
        // HH:MM:SS
        assert_eq!(entry.timestamp.len(), 8);
        assert_eq!(entry.timestamp.matches(':').count(), 2);
    }
}
