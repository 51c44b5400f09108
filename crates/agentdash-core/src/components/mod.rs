// ── Dashboard components ──
//
// Each component owns its own render state. The TUI draws from these;
// nothing here knows about terminals.

mod board;
mod chart;
mod log_feed;
mod queue;
mod theme;

pub use board::{AgentCard, AgentStatusBoard, SettingState};
pub use chart::{MetricSeries, MetricsChart, SeriesId};
pub use log_feed::{CategoryFilter, LogFeed, LogFilter, action_label};
pub use queue::TaskQueue;
pub use theme::{MemoryStore, PreferenceStore, ThemePreference};
