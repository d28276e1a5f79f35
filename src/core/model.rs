//! # Domain Model
//!
//! Plain data passed between the pipeline stages. Nothing in here does I/O.
//!
//! ```text
//! Scanner ──► InterfaceRef ──► SelectionItem (list-owned)
//!                                   │ confirm
//!                                   ▼
//!                            SelectionOutcome ──► GenerationTask ──► worker
//!                                                                      │
//!                              ProgressState ◄── WorkerMessage ◄───────┘
//! ```

use std::collections::BTreeMap;
use std::path::PathBuf;

/// An interface found by the scanner. Unique by `name` within a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceRef {
    pub name: String,
    pub source_path: PathBuf,
}

impl InterfaceRef {
    pub fn new(name: impl Into<String>, source_path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            source_path: source_path.into(),
        }
    }
}

/// Build the ordered interface list from a scanner mapping.
pub fn interfaces_from_map(found: &BTreeMap<String, PathBuf>) -> Vec<InterfaceRef> {
    found
        .iter()
        .map(|(name, path)| InterfaceRef::new(name.clone(), path.clone()))
        .collect()
}

/// One checklist row. Owned by the interface list while it is on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionItem {
    pub interface: InterfaceRef,
    pub selected: bool,
    /// Secondary text shown under the name (the source path).
    pub description: PathBuf,
}

impl SelectionItem {
    pub fn new(interface: InterfaceRef) -> Self {
        let description = interface.source_path.clone();
        Self {
            interface,
            selected: false,
            description,
        }
    }

    pub fn toggle(&mut self) {
        self.selected = !self.selected;
    }
}

/// How the checklist ended.
///
/// `Selected` may be empty (operator confirmed nothing); `Aborted` means the
/// operator deliberately cancelled and nothing downstream may run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionOutcome {
    /// Interface name -> destination root.
    Selected(BTreeMap<String, PathBuf>),
    Aborted,
}

/// The unit of work handed to the worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationTask {
    pub name: String,
    pub source_path: PathBuf,
    pub destination_path: PathBuf,
}

/// Result of one finished task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    pub name: String,
    /// Failure reason, surfaced verbatim.
    pub error: Option<String>,
}

impl ProgressEvent {
    pub fn succeeded(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            error: None,
        }
    }

    pub fn failed(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            error: Some(error.into()),
        }
    }

    /// `<name>: failed (<error>)`, or `None` for a success.
    pub fn failure_line(&self) -> Option<String> {
        self.error
            .as_ref()
            .map(|err| format!("{}: failed ({})", self.name, err))
    }
}

/// What travels over the worker -> reporter channel.
///
/// `Exhausted` is sent exactly once, after the last `Finished`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerMessage {
    Finished(ProgressEvent),
    Exhausted,
}
