//! Controls screen: pause/resume/restart agents and cycle their settings.

use std::collections::HashMap;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};
use throbber_widgets_tui::{Throbber, ThrobberState};

use agentdash_core::{AgentAction, AgentCard, AgentStatusBoard};

use crate::action::Action;
use crate::component::{Component, ViewContext};
use crate::theme::Palette;
use crate::widgets::status_indicator::{agent_status_span, local_clock};

pub struct ControlsScreen {
    focused: bool,
    selected_agent: usize,
    selected_setting: usize,
    /// Agent name → label of the request still in flight.
    pending: HashMap<String, String>,
    throbber_state: ThrobberState,
}

impl ControlsScreen {
    pub fn new() -> Self {
        Self {
            focused: false,
            selected_agent: 0,
            selected_setting: 0,
            pending: HashMap::new(),
            throbber_state: ThrobberState::default(),
        }
    }

    fn selected_card<'a>(&self, board: &'a AgentStatusBoard) -> Option<&'a AgentCard> {
        board.card_at(self.selected_agent.min(board.len().saturating_sub(1)))
    }

    fn move_agent(&mut self, delta: isize, len: usize) {
        if len == 0 {
            return;
        }
        let next = self
            .selected_agent
            .saturating_add_signed(delta)
            .min(len - 1);
        if next != self.selected_agent {
            self.selected_agent = next;
            self.selected_setting = 0;
        }
    }

    fn move_setting(&mut self, delta: isize, len: usize) {
        if len == 0 {
            return;
        }
        self.selected_setting = self
            .selected_setting
            .saturating_add_signed(delta)
            .min(len - 1);
    }

    fn control(card: &AgentCard, action: AgentAction) -> Action {
        Action::SendControl {
            agent: card.name.clone(),
            action,
        }
    }

    fn render_agent_list(&self, frame: &mut Frame, area: Rect, ctx: &ViewContext) {
        let p = &ctx.palette;
        let board = &ctx.dashboard.board;
        let block = Block::default()
            .title(format!(" Agents ({}) ", board.len()))
            .title_style(p.title())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(p.border(self.focused));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if board.is_empty() {
            frame.render_widget(
                Paragraph::new(Span::styled("  No agents configured", p.key_hint())),
                inner,
            );
            return;
        }

        let selected = self.selected_agent.min(board.len() - 1);
        let lines: Vec<Line> = board
            .cards()
            .enumerate()
            .map(|(idx, card)| {
                let marker = if idx == selected { "▸ " } else { "  " };
                let name_style = if idx == selected { p.selected() } else { p.row() };
                let mut spans = vec![
                    Span::styled(marker, Style::default().fg(p.accent)),
                    Span::styled(format!("{:<20}", card.name), name_style),
                    agent_status_span(card.status.as_ref(), p),
                ];
                if self.pending.contains_key(&card.name) {
                    spans.push(Span::styled("  …", Style::default().fg(p.warning)));
                }
                Line::from(spans)
            })
            .collect();
        frame.render_widget(Paragraph::new(lines), inner);
    }

    fn render_detail(&self, frame: &mut Frame, area: Rect, card: &AgentCard, p: &Palette) {
        let block = Block::default()
            .title(format!(" {} ", card.name))
            .title_style(p.title())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(p.border_default());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let layout = Layout::vertical([
            Constraint::Length(1), // status
            Constraint::Length(1), // pending
            Constraint::Length(2), // buttons
            Constraint::Min(1),    // settings
        ])
        .split(inner);

        let updated = local_clock(card.updated_at);
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled("  Status: ", Style::default().fg(p.muted)),
                agent_status_span(card.status.as_ref(), p),
                Span::styled(format!("   updated {updated}"), p.key_hint()),
            ])),
            layout[0],
        );

        if let Some(label) = self.pending.get(&card.name) {
            let throbber = Throbber::default()
                .label(format!("  {label}"))
                .style(Style::default().fg(p.heading))
                .throbber_style(Style::default().fg(p.accent));
            frame.render_stateful_widget(throbber, layout[1], &mut self.throbber_state.clone());
        }

        let buttons = Line::from(vec![
            Span::styled("  p ", p.key_hint_key()),
            Span::styled("Pause   ", p.row()),
            Span::styled("r ", p.key_hint_key()),
            Span::styled("Resume   ", p.row()),
            Span::styled("R ", p.key_hint_key()),
            Span::styled("Restart", p.row()),
        ]);
        frame.render_widget(Paragraph::new(buttons), layout[2]);

        let mut lines = vec![Line::from(Span::styled("  Settings", p.table_header()))];
        if card.settings.is_empty() {
            lines.push(Line::from(Span::styled("  No adjustable settings", p.key_hint())));
        }
        let selected = self.selected_setting.min(card.settings.len().saturating_sub(1));
        for (idx, setting) in card.settings.iter().enumerate() {
            let is_selected = idx == selected;
            let value = setting.value.as_deref().unwrap_or("unset");
            let options = setting.options.join(" / ");
            lines.push(Line::from(vec![
                Span::styled(
                    if is_selected { "  ▸ " } else { "    " },
                    Style::default().fg(p.accent),
                ),
                Span::styled(
                    format!("{:<18}", setting.name),
                    if is_selected { p.selected() } else { p.row() },
                ),
                Span::styled(format!("{value:<12}"), Style::default().fg(p.heading)),
                Span::styled(options, p.key_hint()),
            ]));
        }
        frame.render_widget(Paragraph::new(lines), layout[3]);
    }
}

impl Component for ControlsScreen {
    fn handle_key_event(&mut self, key: KeyEvent, ctx: &ViewContext) -> Result<Option<Action>> {
        let board = &ctx.dashboard.board;
        let settings_len = self.selected_card(board).map_or(0, |c| c.settings.len());

        let action = match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                self.move_agent(1, board.len());
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.move_agent(-1, board.len());
                None
            }
            KeyCode::Char('l' | ']') | KeyCode::Right => {
                self.move_setting(1, settings_len);
                None
            }
            KeyCode::Char('h' | '[') | KeyCode::Left => {
                self.move_setting(-1, settings_len);
                None
            }
            KeyCode::Char('p') => self
                .selected_card(board)
                .map(|c| Self::control(c, AgentAction::Pause)),
            KeyCode::Char('r') => self
                .selected_card(board)
                .map(|c| Self::control(c, AgentAction::Resume)),
            KeyCode::Char('R') => self
                .selected_card(board)
                .map(|c| Self::control(c, AgentAction::Restart)),
            KeyCode::Enter | KeyCode::Char(' ') => self.selected_card(board).and_then(|card| {
                let setting = card.settings.get(self.selected_setting)?;
                let value = setting.next_option()?;
                Some(Action::SendSetting {
                    agent: card.name.clone(),
                    setting: setting.name.clone(),
                    value: value.to_string(),
                })
            }),
            _ => None,
        };
        Ok(action)
    }

    fn update(&mut self, action: &Action, _ctx: &ViewContext) -> Result<Option<Action>> {
        match action {
            Action::Tick if !self.pending.is_empty() => self.throbber_state.calc_next(),
            Action::SendControl { agent, action } => {
                self.pending
                    .insert(agent.clone(), format!("Sending {action} to {agent}..."));
            }
            Action::SendSetting {
                agent,
                setting,
                value,
            } => {
                self.pending
                    .insert(agent.clone(), format!("Setting {setting} to {value}..."));
            }
            Action::CommandFinished(outcome) => {
                self.pending.remove(outcome.agent());
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect, ctx: &ViewContext) {
        let layout =
            Layout::horizontal([Constraint::Percentage(40), Constraint::Percentage(60)]).split(area);

        self.render_agent_list(frame, layout[0], ctx);

        if let Some(card) = self.selected_card(&ctx.dashboard.board) {
            self.render_detail(frame, layout[1], card, &ctx.palette);
        }
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn id(&self) -> &str {
        "Controls"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::screens::test_support::{ctx, dashboard, key};
    use agentdash_core::CommandOutcome;

    #[test]
    fn control_keys_target_selected_agent() {
        let dash = dashboard();
        let mut screen = ControlsScreen::new();

        screen.handle_key_event(key('j'), &ctx(&dash)).unwrap();
        let action = screen.handle_key_event(key('p'), &ctx(&dash)).unwrap();
        match action {
            Some(Action::SendControl { agent, action }) => {
                assert_eq!(agent, "Developer");
                assert_eq!(action, AgentAction::Pause);
            }
            other => panic!("unexpected action: {other:?}"),
        }

        // Selection clamps at the end of the roster.
        screen.handle_key_event(key('j'), &ctx(&dash)).unwrap();
        let action = screen.handle_key_event(key('R'), &ctx(&dash)).unwrap();
        assert!(matches!(
            action,
            Some(Action::SendControl { ref agent, action: AgentAction::Restart }) if agent == "Developer"
        ));
    }

    #[test]
    fn enter_cycles_to_next_setting_option() {
        let dash = dashboard();
        let mut screen = ControlsScreen::new();
        let enter = KeyEvent::new(KeyCode::Enter, crossterm::event::KeyModifiers::NONE);

        let action = screen.handle_key_event(enter, &ctx(&dash)).unwrap();
        match action {
            Some(Action::SendSetting {
                agent,
                setting,
                value,
            }) => {
                assert_eq!(agent, "Business Analyst");
                assert_eq!(setting, "Model");
                assert_eq!(value, "large");
            }
            other => panic!("unexpected action: {other:?}"),
        }
    }

    #[test]
    fn pending_marker_clears_when_command_finishes() {
        let dash = dashboard();
        let mut screen = ControlsScreen::new();
        let send = Action::SendControl {
            agent: "Developer".into(),
            action: AgentAction::Resume,
        };
        screen.update(&send, &ctx(&dash)).unwrap();
        assert!(screen.pending.contains_key("Developer"));

        let done = Action::CommandFinished(CommandOutcome::ControlApplied {
            agent: "Developer".into(),
            action: AgentAction::Resume,
        });
        screen.update(&done, &ctx(&dash)).unwrap();
        assert!(screen.pending.is_empty());
    }

    #[test]
    fn detail_shows_update_time_in_local_zone() {
        use ratatui::{Terminal, backend::TestBackend};

        let mut dash = dashboard();
        dash.board
            .apply_control_result("Business Analyst", AgentAction::Pause);
        let updated = dash.board.card("Business Analyst").unwrap().updated_at;
        let screen = ControlsScreen::new();

        let mut terminal = Terminal::new(TestBackend::new(120, 20)).unwrap();
        terminal
            .draw(|frame| screen.render(frame, frame.area(), &ctx(&dash)))
            .unwrap();
        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(ratatui::buffer::Cell::symbol)
            .collect();

        assert!(text.contains(&format!("updated {}", local_clock(updated))));
    }
}
