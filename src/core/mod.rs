//! # Core
//!
//! Data types and state machines shared by the generator, the coordinator
//! and the TUI. No terminal code lives here; `config` is the only module
//! that touches the filesystem.
//!
//! ```text
//!   config ──► RunSettings (coordinator)
//!
//!   model:    InterfaceRef ─► SelectionItem ─► GenerationTask ─► WorkerMessage
//!                                                                   │
//!   progress:                         ProgressReporter ◄────────────┘
//!                                     (Listening → Draining → Done | Incomplete)
//! ```
//!
//! - [`model`]: interfaces, checklist rows, tasks and worker messages
//! - [`progress`]: the reporter's state machine and bar easing
//! - [`config`]: `~/.deepmock/config.toml`, env vars and CLI flags

pub mod config;
pub mod model;
pub mod progress;
