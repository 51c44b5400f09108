//! Component trait: the building block for every screen.

use color_eyre::eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::{Frame, layout::Rect};

use agentdash_core::Dashboard;

use crate::action::Action;
use crate::theme::Palette;

/// Read-only view of app state handed to components.
///
/// Components keep only their own UI state (selection, input buffers);
/// everything the dashboard knows is read from here.
pub struct ViewContext<'a> {
    pub dashboard: &'a Dashboard,
    pub palette: Palette,
}

/// Every screen implements Component.
///
/// Lifecycle: (`handle_key_event` | `update` | `render`)*
pub trait Component: Send {
    /// Handle a keyboard event. Return an Action to dispatch, or None.
    fn handle_key_event(&mut self, _key: KeyEvent, _ctx: &ViewContext) -> Result<Option<Action>> {
        Ok(None)
    }

    /// Process a dispatched action. May return a follow-up action.
    fn update(&mut self, _action: &Action, _ctx: &ViewContext) -> Result<Option<Action>> {
        Ok(None)
    }

    /// Render into the provided frame area.
    fn render(&self, frame: &mut Frame, area: Rect, ctx: &ViewContext);

    /// While true, the app forwards every key here instead of applying
    /// global bindings (text entry).
    fn captures_input(&self) -> bool {
        false
    }

    /// Set focus state.
    fn set_focused(&mut self, _focused: bool) {}

    /// Unique identifier for this component.
    fn id(&self) -> &str;
}
