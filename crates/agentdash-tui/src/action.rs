//! All possible UI actions. Actions are the sole mechanism for state mutation.

use agentdash_core::{
    AgentAction, CategoryFilter, CommandOutcome, DashboardEvent, FeedState,
};

use crate::screen::ScreenId;

/// Every state transition in the TUI is expressed as an Action.
#[derive(Debug, Clone)]
pub enum Action {
    // ── Lifecycle ──────────────────────────────────────────────────
    Quit,
    Tick,
    Render,
    Resize(u16, u16),

    // ── Navigation ────────────────────────────────────────────────
    SwitchScreen(ScreenId),
    ToggleHelp,

    // ── Preferences ───────────────────────────────────────────────
    ToggleTheme,
    /// Clear the unseen-error badge.
    AcknowledgeErrors,

    // ── Data events (from the data bridge) ────────────────────────
    Feed(DashboardEvent),
    FeedStateChanged(FeedState),
    /// The live feed could not be started at all.
    SystemError(String),

    // ── Commands ──────────────────────────────────────────────────
    SendControl {
        agent: String,
        action: AgentAction,
    },
    SendSetting {
        agent: String,
        setting: String,
        value: String,
    },
    CommandFinished(CommandOutcome),

    // ── Activity log ──────────────────────────────────────────────
    FilterCategory(CategoryFilter),
    SearchChanged(String),
}
