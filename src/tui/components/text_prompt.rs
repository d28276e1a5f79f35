//! # TextPrompt Component
//!
//! Single-line input used for directory and destination prompts.
//!
//! ## Responsibilities
//!
//! - Start pre-filled with the default value (literally, not as a
//!   placeholder) with the cursor at the end
//! - Handle editing (characters, paste, backspace, delete, cursor movement)
//! - Confirm on Enter, yielding the trimmed value or the default when empty
//!
//! There is no cancel outcome: Ctrl+C is reported as `Interrupted` so the
//! caller can treat it as a failed prompt.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, BorderType, Paragraph};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

/// High-level events emitted by the TextPrompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptEvent {
    /// Enter pressed; carries the final value.
    Submit(String),
    /// Ctrl+C pressed.
    Interrupted,
    ContentChanged,
}

/// # Props
///
/// - `label`: Question shown above the field
/// - `default`: Returned when the trimmed buffer is empty
///
/// # State
///
/// - `buffer`: Current text
/// - `cursor`: Byte offset into `buffer`
pub struct TextPrompt {
    pub label: String,
    pub default: String,
    pub buffer: String,
    cursor: usize,
}

impl TextPrompt {
    pub fn new(label: impl Into<String>, default: impl Into<String>) -> Self {
        let default = default.into();
        Self {
            label: label.into(),
            buffer: default.clone(),
            cursor: default.len(),
            default,
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Trimmed input, or the default if nothing is left after trimming.
    pub fn value(&self) -> String {
        let trimmed = self.buffer.trim();
        if trimmed.is_empty() {
            self.default.clone()
        } else {
            trimmed.to_string()
        }
    }

    fn insert_str(&mut self, text: &str) {
        self.buffer.insert_str(self.cursor, text);
        self.cursor += text.len();
    }

    /// First char index to display so the cursor stays inside `width` columns.
    fn scroll_start(&self, width: usize) -> usize {
        let before = &self.buffer[..self.cursor];
        if width == 0 || before.width() < width {
            return 0;
        }
        // Walk back from the cursor until the slice no longer fits.
        let mut used = 1; // room for the cursor cell
        let mut start = self.cursor;
        for (idx, c) in before.char_indices().rev() {
            let w = c.width().unwrap_or(0);
            if used + w > width {
                break;
            }
            used += w;
            start = idx;
        }
        start
    }
}

impl Component for TextPrompt {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        use Constraint::{Length, Min};
        let [label_area, _, field_area, _, hint_area, _] =
            Layout::vertical([Length(1), Length(1), Length(3), Length(1), Length(1), Min(0)])
                .areas(area);

        frame.render_widget(
            Paragraph::new(Line::from(self.label.as_str()))
                .style(Style::default().add_modifier(Modifier::BOLD)),
            label_area,
        );

        let inner_width = field_area.width.saturating_sub(2) as usize;
        let start = self.scroll_start(inner_width);
        let visible = &self.buffer[start..];

        let field = Paragraph::new(visible)
            .block(Block::bordered().border_type(BorderType::Rounded))
            .style(Style::default().fg(Color::Green));
        frame.render_widget(field, field_area);

        frame.render_widget(
            Paragraph::new("(Enter to confirm)").style(Style::default().fg(Color::DarkGray)),
            hint_area,
        );

        let cursor_col = self.buffer[start..self.cursor].width() as u16;
        frame.set_cursor_position((
            field_area.x + 1 + cursor_col.min(field_area.width.saturating_sub(2)),
            field_area.y + 1,
        ));
    }
}

impl EventHandler for TextPrompt {
    type Event = PromptEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::Submit => Some(PromptEvent::Submit(self.value())),
            TuiEvent::Interrupt => Some(PromptEvent::Interrupted),
            TuiEvent::InputChar(c) => {
                let mut tmp = [0u8; 4];
                self.insert_str(c.encode_utf8(&mut tmp));
                Some(PromptEvent::ContentChanged)
            }
            TuiEvent::Paste(text) => {
                let single_line: String = text.chars().filter(|c| !c.is_control()).collect();
                if single_line.is_empty() {
                    return None;
                }
                self.insert_str(&single_line);
                Some(PromptEvent::ContentChanged)
            }
            TuiEvent::Backspace => {
                if self.cursor == 0 {
                    return None;
                }
                let prev = prev_char_boundary(&self.buffer, self.cursor);
                self.buffer.drain(prev..self.cursor);
                self.cursor = prev;
                Some(PromptEvent::ContentChanged)
            }
            TuiEvent::Delete => {
                if self.cursor >= self.buffer.len() {
                    return None;
                }
                let next = next_char_boundary(&self.buffer, self.cursor);
                self.buffer.drain(self.cursor..next);
                Some(PromptEvent::ContentChanged)
            }
            TuiEvent::CursorLeft => (self.cursor > 0).then(|| {
                self.cursor = prev_char_boundary(&self.buffer, self.cursor);
                PromptEvent::ContentChanged
            }),
            TuiEvent::CursorRight => (self.cursor < self.buffer.len()).then(|| {
                self.cursor = next_char_boundary(&self.buffer, self.cursor);
                PromptEvent::ContentChanged
            }),
            TuiEvent::CursorHome => (self.cursor != 0).then(|| {
                self.cursor = 0;
                PromptEvent::ContentChanged
            }),
            TuiEvent::CursorEnd => (self.cursor != self.buffer.len()).then(|| {
                self.cursor = self.buffer.len();
                PromptEvent::ContentChanged
            }),
            _ => None,
        }
    }
}

fn prev_char_boundary(s: &str, pos: usize) -> usize {
    s[..pos].char_indices().next_back().map_or(0, |(i, _)| i)
}

fn next_char_boundary(s: &str, pos: usize) -> usize {
    s[pos..].chars().next().map_or(pos, |c| pos + c.len_utf8())
}
