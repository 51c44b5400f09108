//! Application core: event loop, screen management, action dispatch.

use std::collections::HashMap;
use std::time::Duration;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Tabs},
};
use throbber_widgets_tui::{Throbber, ThrobberState};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use agentdash_core::{
    ControlPanel, Dashboard, DashboardController, FeedState, LogKind, SYSTEM_AGENT,
};

use crate::action::Action;
use crate::component::{Component, ViewContext};
use crate::event::{Cadence, TermEvent, TermEvents};
use crate::screen::ScreenId;
use crate::screens::create_screens;
use crate::theme::Palette;
use crate::tui::TerminalGuard;
use crate::widgets::status_indicator::{feed_state_span, local_clock};

/// How long shutdown waits for the feed to close before giving up.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Top-level application state and event loop.
pub struct App {
    active_screen: ScreenId,
    screens: HashMap<ScreenId, Box<dyn Component>>,
    running: bool,
    help_visible: bool,
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,
    controller: DashboardController,
    panel: ControlPanel,
    /// All dashboard state. Only this loop mutates it.
    dashboard: Dashboard,
    data_cancel: CancellationToken,
    throbber_state: ThrobberState,
}

impl App {
    pub fn new(controller: DashboardController, dashboard: Dashboard) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let mut screens: HashMap<ScreenId, Box<dyn Component>> =
            create_screens().into_iter().collect();
        if let Some(screen) = screens.get_mut(&ScreenId::default()) {
            screen.set_focused(true);
        }

        Self {
            active_screen: ScreenId::default(),
            screens,
            running: true,
            help_visible: false,
            action_tx,
            action_rx,
            panel: controller.control_panel(),
            controller,
            dashboard,
            data_cancel: CancellationToken::new(),
            throbber_state: ThrobberState::default(),
        }
    }

    fn palette(&self) -> Palette {
        Palette::for_mode(self.dashboard.theme().mode())
    }

    /// Run the main event loop until the user quits.
    pub async fn run(&mut self) -> Result<()> {
        let mut terminal = TerminalGuard::enter()?;

        let bridge = tokio::spawn(crate::data_bridge::spawn_data_bridge(
            self.controller.clone(),
            self.action_tx.clone(),
            self.data_cancel.clone(),
        ));

        let mut events = TermEvents::spawn(Cadence::DASHBOARD);

        info!("TUI event loop started");

        while self.running {
            let Some(event) = events.next().await else {
                break;
            };

            match event {
                TermEvent::Key(key) => {
                    if let Some(action) = self.handle_key_event(key)? {
                        self.action_tx.send(action)?;
                    }
                }
                TermEvent::Resize(w, h) => self.action_tx.send(Action::Resize(w, h))?,
                TermEvent::Tick => self.action_tx.send(Action::Tick)?,
                TermEvent::Render => self.action_tx.send(Action::Render)?,
            }

            while let Ok(action) = self.action_rx.try_recv() {
                self.process_action(&action)?;

                if let Action::Render = action {
                    terminal.draw(|frame| self.render(frame))?;
                }
            }
        }

        self.data_cancel.cancel();
        drop(events);
        if tokio::time::timeout(SHUTDOWN_GRACE, bridge).await.is_err() {
            debug!("data bridge did not stop in time");
        }
        info!("TUI event loop ended");
        Ok(())
    }

    /// Map a key event to an action. Global keys are handled here;
    /// screen-specific keys are delegated to the active screen component.
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.help_visible {
            return match key.code {
                KeyCode::Esc | KeyCode::Char('?') => Ok(Some(Action::ToggleHelp)),
                _ => Ok(None),
            };
        }

        let ctx = ViewContext {
            dashboard: &self.dashboard,
            palette: Palette::for_mode(self.dashboard.theme().mode()),
        };

        // Text entry gets every key except Ctrl+C.
        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            if screen.captures_input() {
                if key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('c') {
                    return Ok(Some(Action::Quit));
                }
                return screen.handle_key_event(key, &ctx);
            }
        }

        match (key.modifiers, key.code) {
            (KeyModifiers::CONTROL, KeyCode::Char('c'))
            | (KeyModifiers::NONE, KeyCode::Char('q')) => return Ok(Some(Action::Quit)),

            (KeyModifiers::NONE, KeyCode::Char('?')) => return Ok(Some(Action::ToggleHelp)),

            (KeyModifiers::NONE, KeyCode::Char('t')) => return Ok(Some(Action::ToggleTheme)),

            (KeyModifiers::NONE, KeyCode::Char(c @ '1'..='3')) => {
                let n = u8::try_from(c).unwrap_or(b'0').saturating_sub(b'0');
                if let Some(screen) = ScreenId::from_number(n) {
                    return Ok(Some(Action::SwitchScreen(screen)));
                }
            }

            (KeyModifiers::NONE, KeyCode::Tab) => {
                return Ok(Some(Action::SwitchScreen(self.active_screen.next())));
            }
            (KeyModifiers::SHIFT, KeyCode::BackTab) => {
                return Ok(Some(Action::SwitchScreen(self.active_screen.prev())));
            }

            _ => {}
        }

        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            return screen.handle_key_event(key, &ctx);
        }

        Ok(None)
    }

    /// Apply one action to app state, then let every screen see it.
    fn process_action(&mut self, action: &Action) -> Result<()> {
        match action {
            Action::Quit => self.running = false,

            Action::Resize(w, h) => debug!(width = *w, height = *h, "terminal resized"),

            Action::SwitchScreen(target) => {
                if *target != self.active_screen {
                    debug!("switching screen: {} → {}", self.active_screen, target);
                    if let Some(screen) = self.screens.get_mut(&self.active_screen) {
                        screen.set_focused(false);
                    }
                    self.active_screen = *target;
                    if let Some(screen) = self.screens.get_mut(&self.active_screen) {
                        screen.set_focused(true);
                    }
                }
            }

            Action::ToggleHelp => self.help_visible = !self.help_visible,

            Action::ToggleTheme => {
                let mode = self.dashboard.toggle_theme();
                info!(mode = mode.storage_key(), "theme toggled");
            }

            Action::AcknowledgeErrors => self.dashboard.logs.acknowledge(),

            Action::Tick => {
                if matches!(
                    self.dashboard.feed_state(),
                    FeedState::Connecting | FeedState::Reconnecting { .. }
                ) {
                    self.throbber_state.calc_next();
                }
            }

            Action::Render => return Ok(()),

            Action::Feed(event) => self.dashboard.apply_event(event),

            Action::FeedStateChanged(state) => self.dashboard.set_feed_state(state.clone()),

            Action::SystemError(message) => {
                self.dashboard
                    .logs
                    .add_local_entry(LogKind::Error, SYSTEM_AGENT, message.clone(), None);
            }

            Action::SendControl { agent, action } => {
                debug!(%agent, %action, "sending control command");
                let panel = self.panel.clone();
                let tx = self.action_tx.clone();
                let (agent, action) = (agent.clone(), *action);
                tokio::spawn(async move {
                    let outcome = panel.send_control(&agent, action).await;
                    let _ = tx.send(Action::CommandFinished(outcome));
                });
            }

            Action::SendSetting {
                agent,
                setting,
                value,
            } => {
                debug!(%agent, %setting, %value, "sending setting change");
                let panel = self.panel.clone();
                let tx = self.action_tx.clone();
                let (agent, setting, value) = (agent.clone(), setting.clone(), value.clone());
                tokio::spawn(async move {
                    let outcome = panel.send_setting_change(&agent, &setting, &value).await;
                    let _ = tx.send(Action::CommandFinished(outcome));
                });
            }

            Action::CommandFinished(outcome) => self.dashboard.apply_outcome(outcome),

            Action::FilterCategory(category) => self.dashboard.logs.filter_by_category(*category),

            Action::SearchChanged(query) => self.dashboard.logs.filter_by_text(query),
        }

        let ctx = ViewContext {
            dashboard: &self.dashboard,
            palette: Palette::for_mode(self.dashboard.theme().mode()),
        };
        for screen in self.screens.values_mut() {
            if let Some(follow_up) = screen.update(action, &ctx)? {
                self.action_tx.send(follow_up)?;
            }
        }
        Ok(())
    }

    // ── Rendering ────────────────────────────────────────────────────

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();
        let palette = self.palette();
        frame.render_widget(Block::default().style(palette.base()), area);

        let layout = Layout::vertical([
            Constraint::Min(1),    // screen content
            Constraint::Length(1), // tab bar
            Constraint::Length(1), // status bar
        ])
        .split(area);

        let ctx = ViewContext {
            dashboard: &self.dashboard,
            palette,
        };
        if let Some(screen) = self.screens.get(&self.active_screen) {
            screen.render(frame, layout[0], &ctx);
        }

        self.render_tab_bar(frame, layout[1], &palette);
        self.render_status_bar(frame, layout[2], &palette);

        if self.help_visible {
            Self::render_help_overlay(frame, area, &palette);
        }
    }

    fn render_tab_bar(&self, frame: &mut Frame, area: Rect, p: &Palette) {
        let titles: Vec<Line> = ScreenId::ALL
            .iter()
            .map(|&id| {
                let style = if id == self.active_screen {
                    p.tab_active()
                } else {
                    p.tab_inactive()
                };
                let badge = match (id, self.dashboard.logs.unseen_errors()) {
                    (ScreenId::Activity, n) if n > 0 => format!(" ({n}!)"),
                    _ => String::new(),
                };
                Line::from(Span::styled(
                    format!(" {} {}{badge} ", id.number(), id.label()),
                    style,
                ))
            })
            .collect();

        let tabs = Tabs::new(titles)
            .divider(Span::styled(" ", p.key_hint()))
            .select(
                ScreenId::ALL
                    .iter()
                    .position(|&s| s == self.active_screen)
                    .unwrap_or(0),
            );

        frame.render_widget(tabs, area);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect, p: &Palette) {
        let state = self.dashboard.feed_state();
        let connecting = matches!(
            state,
            FeedState::Connecting | FeedState::Reconnecting { .. }
        );

        let layout = Layout::horizontal([Constraint::Length(3), Constraint::Min(1)]).split(area);
        if connecting {
            let throbber = Throbber::default()
                .style(Style::default().fg(p.warning))
                .throbber_style(Style::default().fg(p.accent));
            frame.render_stateful_widget(throbber, layout[0], &mut self.throbber_state.clone());
        }

        let last = local_clock(self.dashboard.last_snapshot());
        let theme = self.dashboard.theme();

        let mut spans = vec![
            feed_state_span(state, self.dashboard.is_stale(), p),
            Span::styled(
                format!(" │ updates {} · last {last}", self.dashboard.snapshot_count()),
                p.key_hint(),
            ),
            Span::styled(
                format!(" │ {} {}", theme.icon(), theme.label()),
                Style::default().fg(p.heading),
            ),
        ];
        let errors = self.dashboard.logs.unseen_errors();
        if errors > 0 {
            spans.push(Span::styled(
                format!(" │ {errors} error(s)"),
                Style::default().fg(p.error),
            ));
        }
        spans.push(Span::styled(" │ ? help  t theme  q quit", p.key_hint()));

        frame.render_widget(Paragraph::new(Line::from(spans)), layout[1]);
    }

    fn render_help_overlay(frame: &mut Frame, area: Rect, p: &Palette) {
        let help_width = 56u16.min(area.width.saturating_sub(4));
        let help_height = 22u16.min(area.height.saturating_sub(4));

        let x = (area.width.saturating_sub(help_width)) / 2;
        let y = (area.height.saturating_sub(help_height)) / 2;
        let help_area = Rect::new(area.x + x, area.y + y, help_width, help_height);

        frame.render_widget(Clear, help_area);
        frame.render_widget(Block::default().style(p.base()), help_area);

        let block = Block::default()
            .title(" Keyboard Shortcuts ")
            .title_style(p.title())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(p.border_focused());
        let inner = block.inner(help_area);
        frame.render_widget(block, help_area);

        let section = |name: &'static str| {
            Line::from(Span::styled(
                format!("  {name}"),
                Style::default().fg(p.heading),
            ))
        };
        let row = |keys: &'static str, what: &'static str| {
            Line::from(vec![
                Span::styled(format!("  {keys:<10}"), p.key_hint_key()),
                Span::styled(what, p.key_hint()),
            ])
        };

        let help_text = vec![
            Line::from(""),
            section("Global"),
            row("1-3 Tab", "Switch screen"),
            row("t", "Toggle light/dark theme"),
            row("?", "This help"),
            row("q", "Quit"),
            Line::from(""),
            section("Activity"),
            row("a/i/w/e", "All / info / warning / error"),
            row("h/l", "Cycle category"),
            row("/", "Search (Enter/Esc to finish)"),
            row("c", "Clear search"),
            row("x", "Acknowledge errors"),
            Line::from(""),
            section("Controls"),
            row("j/k", "Select agent"),
            row("p r R", "Pause / resume / restart"),
            row("h/l", "Select setting"),
            row("Enter", "Apply next option"),
            Line::from(""),
            Line::from(Span::styled("  Esc or ? to close", p.key_hint())),
        ];

        frame.render_widget(Paragraph::new(help_text), inner);
    }
}
