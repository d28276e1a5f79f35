//! # Interface List Component
//!
//! Checklist of discovered interfaces. The operator marks any number of rows
//! and then confirms, quits, or aborts.
//!
//! Follows the persistent state + transient wrapper pattern:
//! - `InterfaceListState` owns the `SelectionItem`s and the cursor
//! - `InterfaceList` is created each frame with borrowed state
//!
//! ## Keys
//!
//! | Key               | Effect                                     |
//! |-------------------|--------------------------------------------|
//! | Up/Down, k/j      | Move cursor                                |
//! | PgUp/PgDn         | Move one viewport                          |
//! | Home/End          | First / last row                           |
//! | Space             | Toggle row under cursor                    |
//! | Enter             | Confirm                                    |
//! | q, Esc            | Quit, keeping what is toggled              |
//! | Ctrl+C            | Abort: nothing is generated                |

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Padding, Paragraph};

use crate::core::model::{InterfaceRef, SelectionItem, SelectionOutcome};
use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

/// Rows taken by the header, the list borders and the footer.
pub const CHROME_HEIGHT: u16 = 6;
/// The viewport never shrinks below this many rows.
pub const MIN_VIEWPORT_HEIGHT: u16 = 3;
/// Each item renders as a name line and a path line.
const ROWS_PER_ITEM: u16 = 2;

const CHECKED: &str = "[x]";
const UNCHECKED: &str = "[ ]";

/// How the interaction ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListEvent {
    Confirm,
    Quit,
    Abort,
}

pub struct InterfaceListState {
    pub items: Vec<SelectionItem>,
    pub destination_root: PathBuf,
    pub list_state: ListState,
    /// Item viewport height, recomputed on resize.
    pub viewport_height: u16,
}

impl InterfaceListState {
    pub fn new(interfaces: &[InterfaceRef], destination_root: &Path) -> Self {
        let items: Vec<SelectionItem> = interfaces.iter().cloned().map(SelectionItem::new).collect();
        let mut list_state = ListState::default();
        if !items.is_empty() {
            list_state.select(Some(0));
        }
        Self {
            items,
            destination_root: destination_root.to_path_buf(),
            list_state,
            viewport_height: MIN_VIEWPORT_HEIGHT,
        }
    }

    pub fn cursor(&self) -> Option<usize> {
        self.list_state.selected()
    }

    /// Reflow for a new terminal size.
    pub fn resize(&mut self, _width: u16, height: u16) {
        self.viewport_height = height
            .saturating_sub(CHROME_HEIGHT)
            .max(MIN_VIEWPORT_HEIGHT);
    }

    /// Flip the row at `index`. Out-of-range indices are ignored.
    pub fn toggle_at(&mut self, index: usize) {
        if let Some(item) = self.items.get_mut(index) {
            item.toggle();
        }
    }

    pub fn toggle_under_cursor(&mut self) {
        if let Some(index) = self.cursor() {
            self.toggle_at(index);
        }
    }

    pub fn selected_count(&self) -> usize {
        self.items.iter().filter(|item| item.selected).count()
    }

    /// Turn the ending event into the result handed back to the caller.
    pub fn outcome(&self, event: ListEvent) -> SelectionOutcome {
        if event == ListEvent::Abort {
            return SelectionOutcome::Aborted;
        }
        let selected: BTreeMap<String, PathBuf> = self
            .items
            .iter()
            .filter(|item| item.selected)
            .map(|item| (item.interface.name.clone(), self.destination_root.clone()))
            .collect();
        SelectionOutcome::Selected(selected)
    }

    fn page_size(&self) -> usize {
        usize::from((self.viewport_height / ROWS_PER_ITEM).max(1))
    }

    fn move_cursor(&mut self, delta: isize) {
        if self.items.is_empty() {
            return;
        }
        let last = self.items.len() - 1;
        let current = self.cursor().unwrap_or(0);
        let next = current.saturating_add_signed(delta).min(last);
        self.list_state.select(Some(next));
    }

    fn move_to(&mut self, index: usize) {
        if !self.items.is_empty() {
            self.list_state.select(Some(index.min(self.items.len() - 1)));
        }
    }
}

impl EventHandler for InterfaceListState {
    type Event = ListEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<ListEvent> {
        match event {
            TuiEvent::Submit => Some(ListEvent::Confirm),
            TuiEvent::Interrupt => Some(ListEvent::Abort),
            TuiEvent::Escape | TuiEvent::InputChar('q') | TuiEvent::InputChar('Q') => {
                Some(ListEvent::Quit)
            }
            TuiEvent::InputChar(' ') => {
                self.toggle_under_cursor();
                None
            }
            TuiEvent::CursorUp | TuiEvent::InputChar('k') => {
                self.move_cursor(-1);
                None
            }
            TuiEvent::CursorDown | TuiEvent::InputChar('j') => {
                self.move_cursor(1);
                None
            }
            TuiEvent::PageUp => {
                self.move_cursor(-(self.page_size() as isize));
                None
            }
            TuiEvent::PageDown => {
                self.move_cursor(self.page_size() as isize);
                None
            }
            TuiEvent::CursorHome => {
                self.move_to(0);
                None
            }
            TuiEvent::CursorEnd => {
                self.move_to(usize::MAX);
                None
            }
            TuiEvent::Resize(width, height) => {
                self.resize(*width, *height);
                None
            }
            _ => None,
        }
    }
}

/// Transient render wrapper for the interface checklist.
pub struct InterfaceList<'a> {
    state: &'a mut InterfaceListState,
}

impl<'a> InterfaceList<'a> {
    pub fn new(state: &'a mut InterfaceListState) -> Self {
        Self { state }
    }
}

impl Component for InterfaceList<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        use Constraint::{Length, Min};
        let [header_area, list_area, footer_area, _] = Layout::vertical([
            Length(2),
            Length(self.state.viewport_height + 2),
            Length(2),
            Min(0),
        ])
        .areas(area);

        frame.render_widget(
            Paragraph::new("Select interfaces to generate mocks for:")
                .style(Style::default().add_modifier(Modifier::BOLD)),
            header_area,
        );

        let title = format!(
            " Interfaces ({}/{} selected) ",
            self.state.selected_count(),
            self.state.items.len()
        );
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(title)
            .padding(Padding::horizontal(1));

        let items: Vec<ListItem> = self
            .state
            .items
            .iter()
            .map(|item| {
                let (marker, marker_style) = if item.selected {
                    (CHECKED, Style::default().fg(Color::Green))
                } else {
                    (UNCHECKED, Style::default().fg(Color::Gray))
                };
                ListItem::new(vec![
                    Line::from(vec![
                        Span::styled(marker, marker_style),
                        Span::raw(" "),
                        Span::styled(
                            item.interface.name.clone(),
                            Style::default().add_modifier(Modifier::BOLD),
                        ),
                    ]),
                    Line::from(Span::styled(
                        format!("    {}", item.description.display()),
                        Style::default().fg(Color::DarkGray),
                    )),
                ])
            })
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        frame.render_stateful_widget(list, list_area, &mut self.state.list_state);

        frame.render_widget(
            Paragraph::new(Line::from(vec![Span::styled(
                "[Space] toggle | [Enter] confirm selection | [Q] quit | [Ctrl+C] abort",
                Style::default().fg(Color::DarkGray),
            )])),
            Rect {
                y: footer_area.y + footer_area.height.saturating_sub(1),
                height: footer_area.height.min(1),
                ..footer_area
            },
        );
    }
}
