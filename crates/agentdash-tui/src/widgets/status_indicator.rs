//! Agent and feed status indicators: ●/○/◐/◉ with color mapping.

use chrono::{DateTime, Local, Utc};
use ratatui::style::{Color, Style};
use ratatui::text::Span;

use agentdash_core::{AgentStatus, FeedState};

use crate::theme::Palette;

fn agent_symbol(status: Option<&AgentStatus>, p: &Palette) -> (&'static str, Color) {
    match status {
        Some(AgentStatus::Active) => ("●", p.success),
        Some(AgentStatus::Paused) => ("◐", p.warning),
        Some(AgentStatus::Error) => ("○", p.error),
        Some(AgentStatus::Idle) => ("◉", p.heading),
        Some(AgentStatus::Other(_)) | None => ("?", p.muted),
    }
}

/// Styled dot plus the lowercased status tag, e.g. `● active`.
pub fn agent_status_span(status: Option<&AgentStatus>, palette: &Palette) -> Span<'static> {
    let (symbol, color) = agent_symbol(status, palette);
    let tag = status.map_or("unknown", AgentStatus::tag);
    Span::styled(format!("{symbol} {tag}"), Style::default().fg(color))
}

/// Connection indicator for the status bar.
pub fn feed_state_span(state: &FeedState, stale: bool, palette: &Palette) -> Span<'static> {
    match state {
        FeedState::Connected if stale => {
            Span::styled("◐ stale", Style::default().fg(palette.warning))
        }
        FeedState::Connected => Span::styled("● live", Style::default().fg(palette.success)),
        FeedState::Connecting => {
            Span::styled("◐ connecting", Style::default().fg(palette.warning))
        }
        FeedState::Reconnecting { attempt } => Span::styled(
            format!("◐ reconnecting (attempt {})", attempt + 1),
            Style::default().fg(palette.warning),
        ),
        FeedState::Disconnected => {
            Span::styled("○ disconnected", Style::default().fg(palette.error))
        }
        FeedState::Failed => Span::styled("○ feed failed", Style::default().fg(palette.error)),
    }
}

/// Wall-clock `HH:MM:SS` in the local zone, or `never`.
pub fn local_clock(at: Option<DateTime<Utc>>) -> String {
    at.map_or_else(
        || "never".to_string(),
        |t| t.with_timezone(&Local).format("%H:%M:%S").to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agent_span_shows_tag() {
        let p = Palette::DARK;
        let span = agent_status_span(Some(&AgentStatus::Paused), &p);
        assert_eq!(span.content, "◐ paused");
        assert_eq!(span.style.fg, Some(p.warning));
        assert_eq!(agent_status_span(None, &p).content, "? unknown");
    }

    #[test]
    fn stale_feed_is_flagged() {
        let p = Palette::LIGHT;
        assert_eq!(feed_state_span(&FeedState::Connected, true, &p).content, "◐ stale");
        assert_eq!(
            feed_state_span(&FeedState::Reconnecting { attempt: 0 }, false, &p).content,
            "◐ reconnecting (attempt 1)"
        );
    }

    #[test]
    fn clock_is_local_time() {
        assert_eq!(local_clock(None), "never");

        let at = DateTime::parse_from_rfc3339("2026-03-01T12:34:56Z")
            .map(|t| t.with_timezone(&Utc))
            .ok();
        let expected = at.map(|t| t.with_timezone(&Local).format("%H:%M:%S").to_string());
        assert_eq!(Some(local_clock(at)), expected);
    }
}
