//! Dashboard screen: agent status cards, CPU and memory charts, task queue.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::symbols::Marker;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Axis, Block, BorderType, Borders, Chart, Dataset, GraphType, Paragraph};

use agentdash_core::{AgentCard, AgentStatus, MetricSeries, SeriesId, TaskQueue};

use crate::component::{Component, ViewContext};
use crate::theme::Palette;
use crate::widgets::status_indicator::agent_status_span;

/// Cards per row before wrapping.
const CARDS_PER_ROW: usize = 3;
const CARD_HEIGHT: u16 = 7;

pub struct DashboardScreen {
    focused: bool,
}

impl DashboardScreen {
    pub fn new() -> Self {
        Self { focused: false }
    }

    fn render_card(frame: &mut Frame, area: Rect, card: &AgentCard, p: &Palette) {
        let block = Block::default()
            .title(format!(" {} ", card.name))
            .title_style(p.title())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(p.border_default());

        let inner = block.inner(area);
        frame.render_widget(block, area);

        let mut lines = vec![Line::from(vec![
            Span::raw(" "),
            agent_status_span(card.status.as_ref(), p),
        ])];

        if card.metrics.is_empty() {
            lines.push(Line::from(Span::styled(" no metrics yet", p.key_hint())));
        }
        for (name, value) in &card.metrics {
            lines.push(Line::from(vec![
                Span::styled(format!(" {name}: "), Style::default().fg(p.muted)),
                Span::styled(value.clone(), p.row()),
            ]));
        }

        frame.render_widget(Paragraph::new(lines), inner);
    }

    fn render_cards(&self, frame: &mut Frame, area: Rect, ctx: &ViewContext) {
        let p = &ctx.palette;
        let board = &ctx.dashboard.board;

        let summary = format!(
            " Agents ({})  active {}  paused {}  error {} ",
            board.len(),
            board.count_with(&AgentStatus::Active),
            board.count_with(&AgentStatus::Paused),
            board.count_with(&AgentStatus::Error),
        );
        let block = Block::default()
            .title(summary)
            .title_style(p.title())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(p.border(self.focused));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if board.is_empty() {
            frame.render_widget(
                Paragraph::new(Span::styled(
                    "  No agents configured. Add [[agents]] to config.toml or pass --agent.",
                    p.key_hint(),
                )),
                inner,
            );
            return;
        }

        let cards: Vec<&AgentCard> = board.cards().collect();
        let rows: Vec<&[&AgentCard]> = cards.chunks(CARDS_PER_ROW).collect();
        let row_areas = Layout::vertical(
            rows.iter()
                .map(|_| Constraint::Length(CARD_HEIGHT))
                .collect::<Vec<_>>(),
        )
        .split(inner);

        for (row, row_area) in rows.iter().zip(row_areas.iter()) {
            let cols = Layout::horizontal(
                (0..CARDS_PER_ROW)
                    .map(|_| Constraint::Ratio(1, 3))
                    .collect::<Vec<_>>(),
            )
            .split(*row_area);
            for (card, col) in row.iter().zip(cols.iter()) {
                Self::render_card(frame, *col, card, p);
            }
        }
    }

    fn render_chart(frame: &mut Frame, area: Rect, series: &MetricSeries, color_idx: usize, p: &Palette) {
        let latest = series
            .latest()
            .map_or_else(|| "-".to_string(), |s| format!("{:.1}{}", s.value, series.id().unit()));
        let block = Block::default()
            .title(format!(" {} {latest} ", series.id()))
            .title_style(p.title())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(p.border_default());

        if series.is_empty() {
            let inner = block.inner(area);
            frame.render_widget(block, area);
            frame.render_widget(
                Paragraph::new(Span::styled("  Waiting for samples...", p.key_hint())),
                inner,
            );
            return;
        }

        let points = series.points();
        let color = p.series()[color_idx % 2];
        let dataset = Dataset::default()
            .name(series.id().unit())
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(color))
            .data(&points);

        #[allow(clippy::cast_precision_loss, clippy::as_conversions)]
        let x_max = (series.window().saturating_sub(1)).max(1) as f64;
        let first = series.samples().next().map(|s| s.label.clone()).unwrap_or_default();
        let last = series.latest().map(|s| s.label.clone()).unwrap_or_default();
        let [y_min, y_max] = series.y_bounds();

        let chart = Chart::new(vec![dataset])
            .block(block)
            .x_axis(
                Axis::default()
                    .style(Style::default().fg(p.muted))
                    .bounds([0.0, x_max])
                    .labels([first, last]),
            )
            .y_axis(
                Axis::default()
                    .style(Style::default().fg(p.muted))
                    .bounds([y_min, y_max])
                    .labels([format!("{y_min:.0}"), format!("{y_max:.0}")]),
            );

        frame.render_widget(chart, area);
    }

    fn render_queue(frame: &mut Frame, area: Rect, queue: &TaskQueue, p: &Palette) {
        let block = Block::default()
            .title(format!(" Task Queue ({}) ", queue.len()))
            .title_style(p.title())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(p.border_default());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let lines: Vec<Line> = if queue.is_empty() {
            vec![Line::from(Span::styled(" Queue is empty", p.key_hint()))]
        } else {
            queue
                .positioned()
                .map(|(pos, task)| {
                    Line::from(vec![
                        Span::styled(format!(" {pos:>2}. "), Style::default().fg(p.accent)),
                        Span::styled(task.name.clone(), p.row()),
                    ])
                })
                .collect()
        };
        frame.render_widget(Paragraph::new(lines), inner);
    }
}

impl Component for DashboardScreen {
    fn render(&self, frame: &mut Frame, area: Rect, ctx: &ViewContext) {
        let rows = ctx.dashboard.board.len().div_ceil(CARDS_PER_ROW).max(1);
        let cards_height = u16::try_from(rows)
            .unwrap_or(u16::MAX)
            .saturating_mul(CARD_HEIGHT)
            .saturating_add(2);

        let layout = Layout::vertical([
            Constraint::Length(cards_height.min(area.height / 2)),
            Constraint::Min(8),
        ])
        .split(area);

        self.render_cards(frame, layout[0], ctx);

        let bottom = Layout::horizontal([
            Constraint::Percentage(38),
            Constraint::Percentage(38),
            Constraint::Percentage(24),
        ])
        .split(layout[1]);

        let p = &ctx.palette;
        let chart = &ctx.dashboard.chart;
        Self::render_chart(frame, bottom[0], chart.series(SeriesId::Cpu), 0, p);
        Self::render_chart(frame, bottom[1], chart.series(SeriesId::Memory), 1, p);
        Self::render_queue(frame, bottom[2], &ctx.dashboard.queue, p);
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn id(&self) -> &str {
        "Dashboard"
    }
}
