//! Terminal input and frame pacing.
//!
//! A background task merges crossterm input with the dashboard's two clocks:
//! a slow tick that advances throbbers and a frame clock that triggers
//! redraws. Input forces the next frame out immediately so keystrokes never
//! wait for the frame clock.

use std::time::Duration;

use crossterm::event::{Event as CrosstermEvent, EventStream, KeyEvent, KeyEventKind};
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Interval, MissedTickBehavior};

/// What the event loop reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TermEvent {
    Key(KeyEvent),
    /// Terminal was resized to (cols, rows).
    Resize(u16, u16),
    /// Animation step for spinners.
    Tick,
    /// Time to draw a frame.
    Render,
}

/// Tick and frame periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cadence {
    pub tick: Duration,
    pub frame: Duration,
}

impl Cadence {
    /// 4 Hz spinner steps, ~30 FPS redraws. Feed snapshots arrive far
    /// slower than either.
    pub const DASHBOARD: Self = Self {
        tick: Duration::from_millis(250),
        frame: Duration::from_millis(33),
    };

    fn intervals(self) -> (Interval, Interval) {
        let mut tick = tokio::time::interval(self.tick);
        let mut frame = tokio::time::interval(self.frame);
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
        frame.set_missed_tick_behavior(MissedTickBehavior::Skip);
        (tick, frame)
    }
}

/// Key presses and resizes pass through; releases, repeats, mouse, focus
/// and paste events are of no interest to the dashboard.
fn translate(event: CrosstermEvent) -> Option<TermEvent> {
    match event {
        CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Some(TermEvent::Key(key)),
        CrosstermEvent::Resize(w, h) => Some(TermEvent::Resize(w, h)),
        _ => None,
    }
}

/// Handle to the reader task. Dropping it stops the task.
pub struct TermEvents {
    rx: mpsc::UnboundedReceiver<TermEvent>,
    task: JoinHandle<()>,
}

impl TermEvents {
    pub fn spawn(cadence: Cadence) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(read_loop(cadence, tx));
        Self { rx, task }
    }

    /// Next event, or `None` once the reader has stopped.
    pub async fn next(&mut self) -> Option<TermEvent> {
        self.rx.recv().await
    }
}

impl Drop for TermEvents {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn read_loop(cadence: Cadence, tx: mpsc::UnboundedSender<TermEvent>) {
    let mut input = EventStream::new();
    let (mut tick, mut frame) = cadence.intervals();

    loop {
        let event = tokio::select! {
            _ = tick.tick() => TermEvent::Tick,
            _ = frame.tick() => TermEvent::Render,
            raw = input.next() => match raw {
                Some(Ok(raw)) => {
                    let Some(event) = translate(raw) else { continue };
                    frame.reset_immediately();
                    event
                }
                Some(Err(e)) => {
                    tracing::warn!(error = %e, "terminal input error");
                    continue;
                }
                None => break,
            },
        };

        if tx.send(event).is_err() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyModifiers, MouseEvent, MouseEventKind};

    use super::*;

    #[test]
    fn only_key_presses_and_resizes_pass() {
        let press = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
        assert_eq!(
            translate(CrosstermEvent::Key(press)),
            Some(TermEvent::Key(press))
        );

        let mut release = press;
        release.kind = KeyEventKind::Release;
        assert_eq!(translate(CrosstermEvent::Key(release)), None);

        assert_eq!(
            translate(CrosstermEvent::Resize(120, 40)),
            Some(TermEvent::Resize(120, 40))
        );

        let click = MouseEvent {
            kind: MouseEventKind::Moved,
            column: 0,
            row: 0,
            modifiers: KeyModifiers::NONE,
        };
        assert_eq!(translate(CrosstermEvent::Mouse(click)), None);
        assert_eq!(translate(CrosstermEvent::FocusGained), None);
    }

    #[tokio::test(start_paused = true)]
    async fn frames_outpace_ticks() {
        let (mut tick, mut frame) = Cadence::DASHBOARD.intervals();
        // Both fire immediately once.
        tick.tick().await;
        frame.tick().await;

        let mut frames = 0;
        let deadline = tokio::time::Instant::now() + Cadence::DASHBOARD.tick;
        loop {
            tokio::select! {
                biased;
                _ = tick.tick() => break,
                _ = frame.tick() => frames += 1,
            }
        }
        assert!(tokio::time::Instant::now() >= deadline);
        assert_eq!(frames, 7);
    }
}
