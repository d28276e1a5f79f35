//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::mpsc::Receiver;
use std::thread;
use std::time::Duration;

use crate::coordinator::{Operator, drain_headless};
use crate::core::model::{GenerationTask, InterfaceRef, SelectionOutcome, WorkerMessage};
use crate::core::progress::ProgressReporter;
use crate::generator::mockgen::{EmitError, Emitter};
use crate::generator::scanner::{ScanError, Scanner};
use crate::tui::TuiError;
use crate::tui::component::EventHandler;
use crate::tui::components::InterfaceListState;
use crate::tui::event::{EventSource, TuiEvent};

/// The error every failing fake emit returns.
pub fn fake_failure() -> EmitError {
    EmitError::Failed {
        binary: "mockgen".to_string(),
        status: "exit status 1".to_string(),
        stderr: "boom".to_string(),
    }
}

pub fn task(name: &str) -> GenerationTask {
    GenerationTask {
        name: name.to_string(),
        source_path: PathBuf::from(format!("src/{}.go", name.to_lowercase())),
        destination_path: PathBuf::from(format!("mocks/mock_{}.go", name.to_lowercase())),
    }
}

/// Emitter that records every call and fails for the configured names.
#[derive(Default)]
pub struct RecordingEmitter {
    failing: Vec<String>,
    calls: Mutex<Vec<String>>,
}

impl RecordingEmitter {
    pub fn failing_on(names: &[&str]) -> Self {
        Self {
            failing: names.iter().map(|n| n.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Emitter for RecordingEmitter {
    fn emit(&self, name: &str, _source: &Path, _destination: &Path) -> Result<(), EmitError> {
        self.calls.lock().unwrap().push(name.to_string());
        if self.failing.iter().any(|n| n == name) {
            return Err(fake_failure());
        }
        Ok(())
    }
}

/// Scanner returning a fixed mapping.
pub struct StaticScanner {
    found: Option<BTreeMap<String, PathBuf>>,
    roots: Mutex<Vec<PathBuf>>,
}

impl StaticScanner {
    pub fn new(found: &[(&str, &str)]) -> Self {
        Self {
            found: Some(
                found
                    .iter()
                    .map(|(name, path)| (name.to_string(), PathBuf::from(path)))
                    .collect(),
            ),
            roots: Mutex::new(Vec::new()),
        }
    }

    pub fn from_map(found: BTreeMap<String, PathBuf>) -> Self {
        Self {
            found: Some(found),
            roots: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            found: None,
            roots: Mutex::new(Vec::new()),
        }
    }

    pub fn scanned_roots(&self) -> Vec<PathBuf> {
        self.roots.lock().unwrap().clone()
    }
}

impl Scanner for StaticScanner {
    fn scan(&self, root: &Path) -> Result<BTreeMap<String, PathBuf>, ScanError> {
        self.roots.lock().unwrap().push(root.to_path_buf());
        self.found.clone().ok_or_else(|| ScanError::Missing {
            path: root.to_path_buf(),
        })
    }
}

/// Event source replaying a fixed script, then idling.
///
/// Idle polls sleep for the requested timeout. A loop that never finishes
/// gets an input error after `IDLE_LIMIT` idle polls instead of hanging.
pub struct ScriptedEvents {
    queue: VecDeque<TuiEvent>,
    idle_polls: usize,
    fail: bool,
}

const IDLE_LIMIT: usize = 2_000;

impl ScriptedEvents {
    pub fn new(events: Vec<TuiEvent>) -> Self {
        Self {
            queue: events.into(),
            idle_polls: 0,
            fail: false,
        }
    }

    /// Every read fails, like a terminal that went away.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(Vec::new())
        }
    }
}

impl EventSource for ScriptedEvents {
    fn next_event(&mut self, timeout: Duration) -> Result<Option<TuiEvent>, TuiError> {
        if self.fail {
            return Err(TuiError::Input(io::Error::other("terminal went away")));
        }
        if let Some(event) = self.queue.pop_front() {
            return Ok(Some(event));
        }
        self.idle_polls += 1;
        if self.idle_polls > IDLE_LIMIT {
            return Err(TuiError::Input(io::Error::other("script exhausted")));
        }
        thread::sleep(timeout);
        Ok(None)
    }
}

/// Operator that answers without a terminal.
///
/// Selection keys drive a real `InterfaceListState`; prompts answer from
/// `answers` or accept the default; progress drains headlessly.
#[derive(Default)]
pub struct ScriptedOperator {
    pub selection_keys: Vec<TuiEvent>,
    pub answers: HashMap<String, String>,
    pub fail_prompts: bool,
    pub fail_progress: bool,
    /// `(label, default)` for every prompt shown.
    pub prompts: Vec<(String, String)>,
    pub selections: usize,
    pub notes: Vec<String>,
    pub warnings: Vec<String>,
}

impl ScriptedOperator {
    pub fn with_selection_keys(keys: Vec<TuiEvent>) -> Self {
        Self {
            selection_keys: keys,
            ..Default::default()
        }
    }
}

impl Operator for ScriptedOperator {
    fn prompt(&mut self, label: &str, default: &str) -> Result<String, TuiError> {
        self.prompts.push((label.to_string(), default.to_string()));
        if self.fail_prompts {
            return Err(TuiError::Interrupted);
        }
        Ok(self
            .answers
            .get(label)
            .cloned()
            .unwrap_or_else(|| default.to_string()))
    }

    fn select(
        &mut self,
        interfaces: &[InterfaceRef],
        destination_root: &Path,
    ) -> Result<SelectionOutcome, TuiError> {
        self.selections += 1;
        let mut state = InterfaceListState::new(interfaces, destination_root);
        for key in &self.selection_keys {
            if let Some(end) = state.handle_event(key) {
                return Ok(state.outcome(end));
            }
        }
        Err(TuiError::Input(io::Error::other("selection script ended early")))
    }

    fn watch_progress(
        &mut self,
        reporter: &mut ProgressReporter,
        updates: &Receiver<WorkerMessage>,
    ) -> Result<(), TuiError> {
        if self.fail_progress {
            return Err(TuiError::Session(io::Error::other("no terminal")));
        }
        drain_headless(reporter, updates);
        Ok(())
    }

    fn notify(&mut self, message: &str) {
        self.notes.push(message.to_string());
    }

    fn warn(&mut self, message: &str) {
        self.warnings.push(message.to_string());
    }
}
