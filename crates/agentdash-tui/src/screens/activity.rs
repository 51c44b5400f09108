//! Activity screen: newest-first agent log with category and text filters.

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

use agentdash_core::{CategoryFilter, LogKind, action_label};

use crate::action::Action;
use crate::component::{Component, ViewContext};

/// Filter-bar order; `h`/`l` cycle through it.
const CATEGORIES: [CategoryFilter; 4] = [
    CategoryFilter::All,
    CategoryFilter::Only(LogKind::Info),
    CategoryFilter::Only(LogKind::Warning),
    CategoryFilter::Only(LogKind::Error),
];

pub struct ActivityScreen {
    focused: bool,
    /// Rows skipped from the top (newest) of the visible list.
    scroll_offset: usize,
    search_input: String,
    search_active: bool,
}

impl ActivityScreen {
    pub fn new() -> Self {
        Self {
            focused: false,
            scroll_offset: 0,
            search_input: String::new(),
            search_active: false,
        }
    }

    fn cycle_category(current: CategoryFilter, delta: isize) -> CategoryFilter {
        let idx = CATEGORIES.iter().position(|c| *c == current).unwrap_or(0);
        let len = CATEGORIES.len();
        let next = if delta >= 0 {
            (idx + 1) % len
        } else {
            (idx + len - 1) % len
        };
        CATEGORIES[next]
    }

    fn scroll(&mut self, delta: isize, visible: usize) {
        let max = visible.saturating_sub(1);
        self.scroll_offset = self
            .scroll_offset
            .saturating_add_signed(delta)
            .min(max);
    }

    fn handle_search_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Esc | KeyCode::Enter => {
                self.search_active = false;
                None
            }
            KeyCode::Backspace => {
                self.search_input.pop();
                self.scroll_offset = 0;
                Some(Action::SearchChanged(self.search_input.clone()))
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.search_input.push(c);
                self.scroll_offset = 0;
                Some(Action::SearchChanged(self.search_input.clone()))
            }
            _ => None,
        }
    }

    fn render_filter_bar(&self, frame: &mut Frame, area: Rect, ctx: &ViewContext) {
        let p = &ctx.palette;
        let current = ctx.dashboard.logs.filter().category;

        let mut spans = vec![Span::styled("  Category: ", Style::default().fg(p.muted))];
        for category in CATEGORIES {
            let label = format!("[{}]", category.label());
            let style = if category == current {
                p.tab_active()
            } else {
                p.tab_inactive()
            };
            spans.push(Span::styled(label, style));
            spans.push(Span::raw(" "));
        }

        spans.push(Span::styled("  Search: ", Style::default().fg(p.muted)));
        if self.search_active {
            spans.push(Span::styled(
                format!("{}▏", self.search_input),
                Style::default().fg(p.accent),
            ));
        } else if self.search_input.is_empty() {
            spans.push(Span::styled("none", p.key_hint()));
        } else {
            spans.push(Span::styled(
                format!("\"{}\"", self.search_input),
                Style::default().fg(p.heading),
            ));
        }

        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}

impl Component for ActivityScreen {
    fn handle_key_event(&mut self, key: KeyEvent, ctx: &ViewContext) -> Result<Option<Action>> {
        if self.search_active {
            return Ok(self.handle_search_key(key));
        }

        let logs = &ctx.dashboard.logs;
        let visible = logs.visible_count();
        let current = logs.filter().category;

        let action = match key.code {
            KeyCode::Char('/') => {
                self.search_active = true;
                None
            }
            KeyCode::Char('c') => {
                self.search_input.clear();
                self.scroll_offset = 0;
                Some(Action::SearchChanged(String::new()))
            }
            KeyCode::Char('x') => Some(Action::AcknowledgeErrors),
            KeyCode::Char('a') => Some(Action::FilterCategory(CategoryFilter::All)),
            KeyCode::Char('i') => Some(Action::FilterCategory(CategoryFilter::Only(LogKind::Info))),
            KeyCode::Char('w') => Some(Action::FilterCategory(CategoryFilter::Only(
                LogKind::Warning,
            ))),
            KeyCode::Char('e') => Some(Action::FilterCategory(CategoryFilter::Only(LogKind::Error))),
            KeyCode::Char('l') | KeyCode::Right => {
                Some(Action::FilterCategory(Self::cycle_category(current, 1)))
            }
            KeyCode::Char('h') | KeyCode::Left => {
                Some(Action::FilterCategory(Self::cycle_category(current, -1)))
            }
            KeyCode::Char('j') | KeyCode::Down => {
                self.scroll(1, visible);
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.scroll(-1, visible);
                None
            }
            KeyCode::Char('g') => {
                self.scroll_offset = 0;
                None
            }
            KeyCode::Char('G') => {
                self.scroll_offset = visible.saturating_sub(1);
                None
            }
            KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.scroll(10, visible);
                None
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.scroll(-10, visible);
                None
            }
            _ => None,
        };
        Ok(action)
    }

    fn update(&mut self, action: &Action, _ctx: &ViewContext) -> Result<Option<Action>> {
        match action {
            Action::FilterCategory(_) => self.scroll_offset = 0,
            Action::SwitchScreen(_) => self.search_active = false,
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect, ctx: &ViewContext) {
        let p = &ctx.palette;
        let logs = &ctx.dashboard.logs;
        let shown = logs.visible_count();

        let badge = match logs.unseen_errors() {
            0 => String::new(),
            n => format!(" {n} new error(s) "),
        };
        let block = Block::default()
            .title(format!(" Activity ({shown}/{}) ", logs.len()))
            .title_style(p.title())
            .title_bottom(Line::from(Span::styled(badge, Style::default().fg(p.error))))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(p.border(self.focused));

        let inner = block.inner(area);
        frame.render_widget(block, area);

        let layout = Layout::vertical([
            Constraint::Length(1), // filter bar
            Constraint::Length(1), // header
            Constraint::Min(1),    // entries
            Constraint::Length(1), // hints
        ])
        .split(inner);

        self.render_filter_bar(frame, layout[0], ctx);

        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled("  Time      ", p.table_header()),
                Span::styled("Kind     ", p.table_header()),
                Span::styled("Agent               ", p.table_header()),
                Span::styled("Message", p.table_header()),
            ])),
            layout[1],
        );

        let height = usize::from(layout[2].height);
        let offset = self.scroll_offset.min(shown.saturating_sub(1));
        let msg_width = usize::from(layout[2].width.saturating_sub(50).max(10));

        let mut lines: Vec<Line> = logs
            .visible()
            .skip(offset)
            .take(height)
            .map(|entry| {
                let color = p.log_kind(entry.kind);
                let msg: String = entry.message.chars().take(msg_width).collect();
                Line::from(vec![
                    Span::styled(
                        format!("  {:<10}", entry.timestamp),
                        Style::default().fg(p.muted),
                    ),
                    Span::styled(
                        format!("{:<9}", entry.kind.to_string()),
                        Style::default().fg(color).add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(format!("{:<20}", entry.agent), p.row()),
                    Span::styled(msg, Style::default().fg(color)),
                    Span::styled(
                        format!("  [{}]", action_label(entry.kind)),
                        Style::default().fg(p.accent),
                    ),
                ])
            })
            .collect();

        if lines.is_empty() {
            let hint = if logs.is_empty() {
                "  Waiting for activity..."
            } else {
                "  No entries match the current filter"
            };
            lines.push(Line::from(Span::styled(hint, p.key_hint())));
        }

        frame.render_widget(Paragraph::new(lines), layout[2]);

        let hints = Line::from(vec![
            Span::styled("  a/i/w/e ", p.key_hint_key()),
            Span::styled("category  ", p.key_hint()),
            Span::styled("h/l ", p.key_hint_key()),
            Span::styled("cycle  ", p.key_hint()),
            Span::styled("/ ", p.key_hint_key()),
            Span::styled("search  ", p.key_hint()),
            Span::styled("c ", p.key_hint_key()),
            Span::styled("clear  ", p.key_hint()),
            Span::styled("j/k ", p.key_hint_key()),
            Span::styled("scroll  ", p.key_hint()),
            Span::styled("x ", p.key_hint_key()),
            Span::styled("ack errors", p.key_hint()),
        ]);
        frame.render_widget(Paragraph::new(hints), layout[3]);
    }

    fn captures_input(&self) -> bool {
        self.search_active
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn id(&self) -> &str {
        "Activity"
    }
}
