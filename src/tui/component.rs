//! Traits shared by the checklist, prompt and progress widgets.
//!
//! Rendering and input are split: anything drawable implements [`Component`],
//! anything that reacts to keys implements [`EventHandler`]. The checklist
//! uses both halves on different types:
//!
//! ```text
//! InterfaceListState ── EventHandler<Event = ListEvent>   (lives for the session)
//!        │ &mut
//!        ▼
//! InterfaceList<'a>  ── Component                         (built per frame)
//! ```

use ratatui::Frame;
use ratatui::layout::Rect;

use crate::tui::event::TuiEvent;

/// Something that draws itself into a region of the frame.
///
/// Takes `&mut self` because the checklist writes its scroll offset back
/// into `ListState` while rendering.
pub trait Component {
    fn render(&mut self, frame: &mut Frame, area: Rect);
}

/// Input side of a widget.
///
/// Returns `Some` only when the widget has something to tell its run loop:
/// a submitted prompt, a confirmed or aborted checklist. Pure cursor moves
/// and edits return `None` (or a change notice) and stay inside the widget.
pub trait EventHandler {
    type Event;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event>;
}
