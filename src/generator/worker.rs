//! Background generation worker.
//!
//! One worker per run. It processes tasks sequentially and sends exactly one
//! `Finished` per task followed by a single `Exhausted`. The channel has zero
//! capacity: each send blocks until the reporter takes the message, so the
//! worker never runs more than one event ahead of the UI.

use std::sync::Arc;
use std::sync::mpsc::{Receiver, SyncSender, sync_channel};

use log::{info, warn};
use tokio::task::JoinHandle;

use crate::core::model::{GenerationTask, ProgressEvent, WorkerMessage};
use crate::generator::mockgen::Emitter;

/// Spawn the worker on tokio's blocking pool.
///
/// The handle resolves to the number of messages the reporter accepted.
pub fn spawn_worker(
    tasks: Vec<GenerationTask>,
    emitter: Arc<dyn Emitter>,
) -> (Receiver<WorkerMessage>, JoinHandle<usize>) {
    let (tx, rx) = sync_channel(0);
    info!("Spawning generation worker for {} tasks", tasks.len());
    let handle = tokio::task::spawn_blocking(move || run_tasks(tasks, emitter.as_ref(), tx));
    (rx, handle)
}

/// Run every task in order, reporting each one. Returns how many messages
/// were delivered.
pub fn run_tasks(
    tasks: Vec<GenerationTask>,
    emitter: &dyn Emitter,
    tx: SyncSender<WorkerMessage>,
) -> usize {
    let mut delivered = 0;

    for task in tasks {
        info!(
            "Generating {} -> {}",
            task.name,
            task.destination_path.display()
        );
        let event = match emitter.emit(&task.name, &task.source_path, &task.destination_path) {
            Ok(()) => ProgressEvent::succeeded(task.name),
            Err(e) => {
                warn!("Generation failed for {}: {}", task.name, e);
                ProgressEvent::failed(task.name, e.to_string())
            }
        };

        if tx.send(WorkerMessage::Finished(event)).is_err() {
            warn!("Reporter dropped the progress channel, stopping worker");
            return delivered;
        }
        delivered += 1;
    }

    if tx.send(WorkerMessage::Exhausted).is_err() {
        warn!("Reporter dropped the progress channel before exhaustion");
        return delivered;
    }
    delivered + 1
}
