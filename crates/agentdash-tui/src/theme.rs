//! Light and dark palettes plus semantic styling for the TUI.

use ratatui::style::{Color, Modifier, Style};

use agentdash_core::{LogKind, ThemeMode};

// ── Dark palette ──────────────────────────────────────────────────────

const DARK_ACCENT: Color = Color::Rgb(225, 53, 255); // #e135ff
const DARK_HEADING: Color = Color::Rgb(128, 255, 234); // #80ffea
const DARK_TEXT: Color = Color::Rgb(189, 193, 207); // #bdc1cf
const DARK_MUTED: Color = Color::Rgb(98, 114, 164); // #6272a4
const DARK_BG: Color = Color::Rgb(30, 31, 41); // #1e1f29
const DARK_BG_HIGHLIGHT: Color = Color::Rgb(40, 42, 54); // #282a36

// ── Light palette ─────────────────────────────────────────────────────

const LIGHT_ACCENT: Color = Color::Rgb(124, 58, 237); // #7c3aed
const LIGHT_HEADING: Color = Color::Rgb(14, 116, 144); // #0e7490
const LIGHT_TEXT: Color = Color::Rgb(31, 41, 55); // #1f2937
const LIGHT_MUTED: Color = Color::Rgb(107, 114, 128); // #6b7280
const LIGHT_BG: Color = Color::Rgb(249, 250, 251); // #f9fafb
const LIGHT_BG_HIGHLIGHT: Color = Color::Rgb(229, 231, 235); // #e5e7eb

// ── Status colors (shared, tuned per mode) ───────────────────────────

const DARK_SUCCESS: Color = Color::Rgb(80, 250, 123); // #50fa7b
const DARK_WARNING: Color = Color::Rgb(241, 250, 140); // #f1fa8c
const DARK_ERROR: Color = Color::Rgb(255, 99, 99); // #ff6363
const LIGHT_SUCCESS: Color = Color::Rgb(22, 163, 74); // #16a34a
const LIGHT_WARNING: Color = Color::Rgb(202, 138, 4); // #ca8a04
const LIGHT_ERROR: Color = Color::Rgb(220, 38, 38); // #dc2626

/// Resolved colors for one display mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub accent: Color,
    pub heading: Color,
    pub text: Color,
    pub muted: Color,
    pub bg: Color,
    pub bg_highlight: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
}

impl Palette {
    pub const DARK: Self = Self {
        accent: DARK_ACCENT,
        heading: DARK_HEADING,
        text: DARK_TEXT,
        muted: DARK_MUTED,
        bg: DARK_BG,
        bg_highlight: DARK_BG_HIGHLIGHT,
        success: DARK_SUCCESS,
        warning: DARK_WARNING,
        error: DARK_ERROR,
    };

    pub const LIGHT: Self = Self {
        accent: LIGHT_ACCENT,
        heading: LIGHT_HEADING,
        text: LIGHT_TEXT,
        muted: LIGHT_MUTED,
        bg: LIGHT_BG,
        bg_highlight: LIGHT_BG_HIGHLIGHT,
        success: LIGHT_SUCCESS,
        warning: LIGHT_WARNING,
        error: LIGHT_ERROR,
    };

    pub fn for_mode(mode: ThemeMode) -> Self {
        match mode {
            ThemeMode::Light => Self::LIGHT,
            ThemeMode::Dark => Self::DARK,
        }
    }

    /// Chart series colors, CPU first.
    pub fn series(&self) -> [Color; 2] {
        [self.heading, self.accent]
    }

    // ── Semantic styles ──────────────────────────────────────────────

    /// Base style painted under every frame.
    pub fn base(&self) -> Style {
        Style::default().fg(self.text).bg(self.bg)
    }

    /// Title text for blocks/panels.
    pub fn title(&self) -> Style {
        Style::default()
            .fg(self.heading)
            .add_modifier(Modifier::BOLD)
    }

    pub fn border_focused(&self) -> Style {
        Style::default().fg(self.accent)
    }

    pub fn border_default(&self) -> Style {
        Style::default().fg(self.muted)
    }

    pub fn border(&self, focused: bool) -> Style {
        if focused {
            self.border_focused()
        } else {
            self.border_default()
        }
    }

    pub fn table_header(&self) -> Style {
        Style::default()
            .fg(self.heading)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
    }

    pub fn row(&self) -> Style {
        Style::default().fg(self.text)
    }

    pub fn selected(&self) -> Style {
        Style::default()
            .fg(self.accent)
            .bg(self.bg_highlight)
            .add_modifier(Modifier::BOLD)
    }

    pub fn tab_active(&self) -> Style {
        Style::default()
            .fg(self.accent)
            .add_modifier(Modifier::BOLD)
    }

    pub fn tab_inactive(&self) -> Style {
        Style::default().fg(self.text)
    }

    /// Key hint text (e.g., "q quit  ? help").
    pub fn key_hint(&self) -> Style {
        Style::default().fg(self.muted)
    }

    /// Key hint key character.
    pub fn key_hint_key(&self) -> Style {
        Style::default()
            .fg(self.heading)
            .add_modifier(Modifier::BOLD)
    }

    /// Color for a log category.
    pub fn log_kind(&self, kind: LogKind) -> Color {
        match kind {
            LogKind::Error => self.error,
            LogKind::Warning => self.warning,
            LogKind::Info => self.heading,
            LogKind::Other => self.text,
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::for_mode(ThemeMode::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modes_resolve_to_distinct_palettes() {
        assert_eq!(Palette::for_mode(ThemeMode::Dark), Palette::DARK);
        assert_eq!(Palette::default(), Palette::LIGHT);
        assert_ne!(Palette::LIGHT.bg, Palette::DARK.bg);
    }

    #[test]
    fn error_logs_use_error_color() {
        let p = Palette::DARK;
        assert_eq!(p.log_kind(LogKind::Error), p.error);
        assert_eq!(p.log_kind(LogKind::Warning), p.warning);
    }
}
