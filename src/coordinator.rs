//! # Generation Coordinator
//!
//! Composition root for one run:
//!
//! ```text
//! resolve roots ─► scan ─► select ─► confirm destinations ─► spawn worker
//!   (prompt)                 │                                   │
//!                            │ Aborted / nothing selected        ▼
//!                            └────────────► stop          drive reporter ─► summary
//! ```
//!
//! Everything the operator sees goes through the [`Operator`] trait, so the
//! pipeline runs the same against the terminal or a scripted stand-in.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::Receiver;

use log::{info, warn};
use thiserror::Error;

use crate::core::config::ResolvedConfig;
use crate::core::model::{
    GenerationTask, InterfaceRef, SelectionOutcome, WorkerMessage, interfaces_from_map,
};
use crate::core::progress::{Effect, Phase, ProgressReporter, ProgressState, ReporterMsg};
use crate::generator::mockgen::Emitter;
use crate::generator::paths::resolve_destination;
use crate::generator::scanner::{ScanError, Scanner};
use crate::generator::worker::spawn_worker;
use crate::tui::TuiError;

/// The interactive surface the pipeline drives.
pub trait Operator {
    /// Ask for a single line of text. Returns the trimmed answer or `default`.
    fn prompt(&mut self, label: &str, default: &str) -> Result<String, TuiError>;

    /// Let the operator pick interfaces. Every selected name maps to
    /// `destination_root`.
    fn select(
        &mut self,
        interfaces: &[InterfaceRef],
        destination_root: &Path,
    ) -> Result<SelectionOutcome, TuiError>;

    /// Drive `reporter` from `updates` until it finishes.
    ///
    /// On error the reporter keeps whatever it consumed so far and the caller
    /// drains the rest.
    fn watch_progress(
        &mut self,
        reporter: &mut ProgressReporter,
        updates: &Receiver<WorkerMessage>,
    ) -> Result<(), TuiError>;

    /// Informational output shown outside any interactive session.
    fn notify(&mut self, message: &str);

    /// Like `notify`, for problems that did not stop the run.
    fn warn(&mut self, message: &str);
}

/// Inputs for one run, already resolved from CLI / env / config.
#[derive(Debug, Clone, Default)]
pub struct RunSettings {
    pub search_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub search_dir_default: String,
    pub output_dir_default: String,
    pub accept_all: bool,
    pub skip_path_prompt: bool,
}

impl From<&ResolvedConfig> for RunSettings {
    fn from(config: &ResolvedConfig) -> Self {
        Self {
            search_dir: config.search_dir.clone(),
            output_dir: config.output_dir.clone(),
            search_dir_default: config.search_dir_default.clone(),
            output_dir_default: config.output_dir_default.clone(),
            accept_all: config.accept_all,
            skip_path_prompt: config.skip_path_prompt,
        }
    }
}

/// Setup failures. Any of these stops the run before generation starts.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("failed to read the {what}: {source}")]
    Prompt {
        what: String,
        #[source]
        source: TuiError,
    },
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error("interface selection failed: {0}")]
    Select(#[source] TuiError),
}

#[derive(Debug)]
pub enum RunOutcome {
    NoInterfaces,
    /// Operator aborted the selection; nothing was generated.
    Aborted,
    /// Operator confirmed an empty selection.
    NothingSelected,
    Generated(GenerationSummary),
}

#[derive(Debug)]
pub struct GenerationSummary {
    pub tasks: Vec<GenerationTask>,
    pub progress: ProgressState,
    pub phase: Phase,
    /// Set when the progress display could not run.
    pub ui_warning: Option<String>,
}

pub async fn run(
    settings: &RunSettings,
    scanner: &dyn Scanner,
    emitter: Arc<dyn Emitter>,
    operator: &mut dyn Operator,
) -> Result<RunOutcome, RunError> {
    let search_dir = resolve_root(
        operator,
        settings.search_dir.as_deref(),
        "Enter the search directory:",
        &settings.search_dir_default,
        "search directory",
    )?;
    let output_dir = resolve_root(
        operator,
        settings.output_dir.as_deref(),
        "Enter the output directory:",
        &settings.output_dir_default,
        "output directory",
    )?;
    info!(
        "Searching {} for interfaces, writing mocks under {}",
        search_dir.display(),
        output_dir.display()
    );

    let found = scanner.scan(&search_dir)?;
    if found.is_empty() {
        info!("No interfaces found under {}", search_dir.display());
        operator.notify("No interfaces found");
        return Ok(RunOutcome::NoInterfaces);
    }
    let interfaces = interfaces_from_map(&found);

    let outcome = if settings.accept_all {
        info!("Accept-all mode: selecting all {} interfaces", interfaces.len());
        SelectionOutcome::Selected(
            interfaces
                .iter()
                .map(|iface| (iface.name.clone(), output_dir.clone()))
                .collect(),
        )
    } else {
        operator
            .select(&interfaces, &output_dir)
            .map_err(RunError::Select)?
    };

    let selected = match outcome {
        SelectionOutcome::Aborted => {
            info!("Selection aborted by operator");
            operator.notify("Aborted, no mocks generated");
            return Ok(RunOutcome::Aborted);
        }
        SelectionOutcome::Selected(selected) if selected.is_empty() => {
            info!("Selection confirmed with nothing selected");
            operator.notify("No interfaces selected");
            return Ok(RunOutcome::NothingSelected);
        }
        SelectionOutcome::Selected(selected) => selected,
    };
    info!("{} interfaces selected", selected.len());

    let mut tasks = Vec::with_capacity(selected.len());
    for (name, destination_root) in &selected {
        let Some(source_path) = found.get(name) else {
            warn!("Selected interface {} is not in the scan result", name);
            continue;
        };
        let mut destination_path =
            resolve_destination(&search_dir, destination_root, source_path, name);

        if !settings.skip_path_prompt {
            let default = destination_path.to_string_lossy().into_owned();
            let answer = operator
                .prompt(&format!("Mock path for {name}:"), &default)
                .map_err(|source| RunError::Prompt {
                    what: format!("mock path for {name}"),
                    source,
                })?;
            // An accepted default keeps the exact path, even if not UTF-8.
            if answer != default {
                destination_path = PathBuf::from(answer);
            }
        }

        tasks.push(GenerationTask {
            name: name.clone(),
            source_path: source_path.clone(),
            destination_path,
        });
    }

    Ok(RunOutcome::Generated(
        generate(tasks, emitter, operator).await,
    ))
}

/// Spawn the worker and report its progress until it is drained.
pub async fn generate(
    tasks: Vec<GenerationTask>,
    emitter: Arc<dyn Emitter>,
    operator: &mut dyn Operator,
) -> GenerationSummary {
    let mut reporter = ProgressReporter::new(tasks.len());
    let (updates, worker) = spawn_worker(tasks.clone(), emitter);

    let ui_warning = match operator.watch_progress(&mut reporter, &updates) {
        Ok(()) => None,
        Err(e) => {
            let message = format!("progress display unavailable: {e}");
            warn!("{message}");
            operator.warn(&message);
            drain_headless(&mut reporter, &updates);
            Some(message)
        }
    };
    drop(updates);

    if let Err(e) = worker.await {
        warn!("Generation worker did not finish cleanly: {}", e);
    }

    let summary = GenerationSummary {
        tasks,
        progress: reporter.state().clone(),
        phase: reporter.phase(),
        ui_warning,
    };
    report_summary(&summary, operator);
    summary
}

/// Consume the remaining worker messages without rendering anything.
pub fn drain_headless(reporter: &mut ProgressReporter, updates: &Receiver<WorkerMessage>) {
    while reporter.phase() == Phase::Listening {
        let msg = match updates.recv() {
            Ok(msg) => ReporterMsg::Worker(msg),
            Err(_) => ReporterMsg::Disconnected,
        };
        reporter.update(msg);
    }
    if !reporter.is_finished() && reporter.settle() != Effect::Quit {
        warn!("Reporter did not finish after settling");
    }
}

fn report_summary(summary: &GenerationSummary, operator: &mut dyn Operator) {
    let progress = &summary.progress;
    operator.notify(&format!(
        "Generated {} of {} mocks",
        progress.succeeded(),
        progress.total
    ));
    if summary.phase == Phase::Incomplete {
        operator.warn(&format!(
            "worker stopped after {} of {} tasks",
            progress.completed, progress.total
        ));
    }
    for line in &progress.failure_log {
        operator.notify(line);
    }
}

fn resolve_root(
    operator: &mut dyn Operator,
    supplied: Option<&Path>,
    label: &str,
    default: &str,
    what: &str,
) -> Result<PathBuf, RunError> {
    if let Some(path) = supplied {
        return Ok(path.to_path_buf());
    }
    operator
        .prompt(label, default)
        .map(PathBuf::from)
        .map_err(|source| RunError::Prompt {
            what: what.to_string(),
            source,
        })
}
