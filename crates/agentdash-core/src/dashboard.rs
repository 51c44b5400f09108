// ── Dashboard state aggregate ──
//
// Owns every component and is the single place feed events and command
// outcomes are applied. Lives on the UI event loop; nothing here is shared
// across tasks.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use agentdash_api::{FeedEvent, FeedSnapshot, FeedState};

use crate::command::CommandOutcome;
use crate::components::{
    AgentStatusBoard, LogFeed, MetricsChart, SeriesId, TaskQueue, ThemePreference,
};
use crate::config::DashboardConfig;
use crate::controller::DashboardEvent;
use crate::model::{Agent, LogEntry, LogKind, QueueTask, ThemeMode};

/// Agent name attached to entries the dashboard itself produces.
pub const SYSTEM_AGENT: &str = "System";

pub struct Dashboard {
    pub board: AgentStatusBoard,
    pub logs: LogFeed,
    pub chart: MetricsChart,
    pub queue: TaskQueue,
    theme: ThemePreference,
    feed_state: FeedState,
    /// Set by a snapshot, cleared by each refresh tick.
    received_since_refresh: bool,
    stale: bool,
    last_snapshot: Option<DateTime<Utc>>,
    snapshot_count: u64,
}

impl Dashboard {
    pub fn new(config: &DashboardConfig, theme: ThemePreference) -> Self {
        Self {
            board: AgentStatusBoard::new(&config.agents),
            logs: LogFeed::new(config.log_capacity),
            chart: MetricsChart::new(config.chart_window),
            queue: TaskQueue::default(),
            theme,
            feed_state: FeedState::default(),
            received_since_refresh: false,
            stale: false,
            last_snapshot: None,
            snapshot_count: 0,
        }
    }

    // ── Inbound ──────────────────────────────────────────────────────

    pub fn apply_event(&mut self, event: &DashboardEvent) {
        match event {
            DashboardEvent::Feed(feed) => self.apply_feed(feed),
            DashboardEvent::RefreshDue => self.refresh_due(),
        }
    }

    pub fn apply_feed(&mut self, event: &FeedEvent) {
        match event {
            FeedEvent::Snapshot(snapshot) => self.apply_snapshot(snapshot),
            FeedEvent::Malformed { error } => {
                warn!(%error, "dropping malformed feed message");
                self.logs.add_local_entry(
                    LogKind::Error,
                    SYSTEM_AGENT,
                    format!("Malformed feed message: {error}"),
                    None,
                );
            }
        }
    }

    /// Dispatch each present field to its component. Absent fields leave
    /// that component untouched.
    pub fn apply_snapshot(&mut self, snapshot: &FeedSnapshot) {
        if let Some(agents) = &snapshot.agents {
            let agents: Vec<Agent> = agents.iter().map(Agent::from).collect();
            let updated = self.board.apply_snapshot(&agents);
            debug!(received = agents.len(), updated, "applied agent snapshot");
        }

        if let Some(logs) = &snapshot.logs {
            self.logs.append_entries(logs.iter().map(LogEntry::from));
        }

        if let Some(metrics) = &snapshot.metrics {
            if let Some(cpu) = metrics.cpu {
                self.chart.push_sample(SeriesId::Cpu, cpu, None);
            }
            if let Some(memory) = metrics.memory {
                self.chart.push_sample(SeriesId::Memory, memory, None);
            }
            if let Some(queue) = &metrics.queue {
                self.queue.replace(queue.iter().map(QueueTask::from).collect());
            }
        }

        self.received_since_refresh = true;
        self.stale = false;
        self.last_snapshot = Some(Utc::now());
        self.snapshot_count += 1;
    }

    /// Apply the result of a control or settings request.
    pub fn apply_outcome(&mut self, outcome: &CommandOutcome) {
        match outcome {
            CommandOutcome::ControlApplied { agent, action } => {
                if !self.board.apply_control_result(agent, *action) {
                    debug!(agent, "control result for agent without a card");
                }
            }
            CommandOutcome::SettingApplied {
                agent,
                setting,
                value,
            } => {
                self.board.set_setting(agent, setting, value);
                self.logs
                    .add_local_entry(LogKind::Info, SYSTEM_AGENT, outcome.to_string(), None);
            }
            CommandOutcome::ControlFailed { .. } | CommandOutcome::SettingFailed { .. } => {
                self.logs
                    .add_local_entry(LogKind::Error, SYSTEM_AGENT, outcome.to_string(), None);
            }
        }
    }

    pub fn set_feed_state(&mut self, state: FeedState) {
        if state == self.feed_state {
            return;
        }
        info!(from = ?self.feed_state, to = ?state, "feed state changed");
        if state == FeedState::Failed {
            self.logs.add_local_entry(
                LogKind::Error,
                SYSTEM_AGENT,
                "Live feed unavailable: reconnect attempts exhausted",
                None,
            );
        }
        self.feed_state = state;
    }

    fn refresh_due(&mut self) {
        if self.received_since_refresh {
            self.received_since_refresh = false;
        } else if self.feed_state == FeedState::Connected && !self.stale {
            debug!("no snapshot during the last refresh interval");
            self.stale = true;
        }
    }

    // ── Theme ────────────────────────────────────────────────────────

    pub fn toggle_theme(&mut self) -> ThemeMode {
        self.theme.toggle()
    }

    pub fn theme(&self) -> &ThemePreference {
        &self.theme
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn feed_state(&self) -> &FeedState {
        &self.feed_state
    }

    /// Connected, but no snapshot arrived during the last refresh interval.
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    pub fn last_snapshot(&self) -> Option<DateTime<Utc>> {
        self.last_snapshot
    }

    pub fn snapshot_count(&self) -> u64 {
        self.snapshot_count
    }
}
