// ── Control panel ──
//
// Write operations against the backend. Each call resolves to a
// `CommandOutcome`; applying it to the dashboard (status change or log
// entry) happens on the event loop, never here.

use std::fmt;
use std::sync::Arc;

use agentdash_api::{ControlClient, ControlRequest, SettingRequest};
use tracing::{info, warn};

use crate::error::CoreError;
use crate::model::AgentAction;

/// Result of one control or settings request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    ControlApplied {
        agent: String,
        action: AgentAction,
    },
    ControlFailed {
        agent: String,
        action: AgentAction,
        reason: String,
    },
    SettingApplied {
        agent: String,
        setting: String,
        value: String,
    },
    SettingFailed {
        agent: String,
        setting: String,
        value: String,
        reason: String,
    },
}

impl CommandOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::ControlFailed { .. } | Self::SettingFailed { .. })
    }

    pub fn agent(&self) -> &str {
        match self {
            Self::ControlApplied { agent, .. }
            | Self::ControlFailed { agent, .. }
            | Self::SettingApplied { agent, .. }
            | Self::SettingFailed { agent, .. } => agent,
        }
    }
}

impl fmt::Display for CommandOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ControlApplied { agent, action } => write!(f, "{action} {agent}: ok"),
            Self::ControlFailed {
                agent,
                action,
                reason,
            } => write!(f, "Failed to {action} {agent}: {reason}"),
            Self::SettingApplied {
                agent,
                setting,
                value,
            } => write!(f, "Updated {setting} for {agent} to {value}"),
            Self::SettingFailed {
                agent,
                setting,
                reason,
                ..
            } => write!(f, "Failed to update {setting} for {agent}: {reason}"),
        }
    }
}

/// Issues pause/resume/restart and settings requests. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ControlPanel {
    client: Arc<ControlClient>,
}

impl ControlPanel {
    pub fn new(client: ControlClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }

    /// `POST /api/agents/control`. Never retried.
    pub async fn send_control(&self, agent: &str, action: AgentAction) -> CommandOutcome {
        let request = ControlRequest {
            agent: agent.to_owned(),
            action,
        };

        match self.client.send_control(&request).await {
            Ok(()) => {
                info!(agent, %action, "control request accepted");
                CommandOutcome::ControlApplied {
                    agent: request.agent,
                    action,
                }
            }
            Err(e) => {
                let reason = CoreError::from(e).to_string();
                warn!(agent, %action, %reason, "control request failed");
                CommandOutcome::ControlFailed {
                    agent: request.agent,
                    action,
                    reason,
                }
            }
        }
    }

    /// `POST /api/agents/settings`. Never retried.
    pub async fn send_setting_change(
        &self,
        agent: &str,
        setting: &str,
        value: &str,
    ) -> CommandOutcome {
        let request = SettingRequest {
            agent: agent.to_owned(),
            setting: setting.to_owned(),
            value: value.to_owned(),
        };

        match self.client.send_setting(&request).await {
            Ok(()) => {
                info!(agent, setting, value, "setting change accepted");
                CommandOutcome::SettingApplied {
                    agent: request.agent,
                    setting: request.setting,
                    value: request.value,
                }
            }
            Err(e) => {
                let reason = CoreError::from(e).to_string();
                warn!(agent, setting, value, %reason, "setting change failed");
                CommandOutcome::SettingFailed {
                    agent: request.agent,
                    setting: request.setting,
                    value: request.value,
                    reason,
                }
            }
        }
    }
}
