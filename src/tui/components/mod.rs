//! # TUI Components
//!
//! ## Stateless Components (Props-Based Rendering)
//!
//! - `ProgressView`: gauge, current item and failure log for a
//!   `ProgressReporter` it borrows
//!
//! ## Stateful Components (Event-Driven)
//!
//! - `TextPrompt`: single-line input with a prefilled default
//! - `InterfaceListState` / `InterfaceList`: the interface checklist
//!
//! Each stateful component owns its state exclusively and changes it only in
//! `EventHandler::handle_event`. Nothing is shared between components; the
//! run loops in the parent module pass values in and read results out.
//!
//! ```text
//! components/
//! ├── mod.rs              (this file)
//! ├── text_prompt.rs      (directory / destination prompts)
//! ├── interface_list.rs   (multi-select checklist)
//! └── progress_view.rs    (generation progress)
//! ```

pub mod interface_list;
pub mod progress_view;
pub mod text_prompt;

pub use interface_list::{InterfaceList, InterfaceListState, ListEvent};
pub use progress_view::ProgressView;
pub use text_prompt::{PromptEvent, TextPrompt};
