//! # Progress Reporter
//!
//! The reporter's state machine. The TUI feeds it messages and redraws when
//! asked; the same machine runs headless when no terminal is available.
//!
//! ```text
//!              Finished(ev)            Frame (still animating)
//!             ┌──────────┐            ┌──────────┐
//!             ▼          │            ▼          │
//!        ┌───────────┐───┘  Exhausted ┌──────────┐───┘
//!  ────► │ Listening │ ─────────────► │ Draining │
//!        └───────────┘                └──────────┘
//!                                          │ animation settled
//!                                          ▼
//!                               Done (completed == total)
//!                               Incomplete (completed < total)
//! ```
//!
//! The reporter never quits just because `completed == total`: the worker
//! must also have said it is finished and the bar must have caught up.

use std::time::Duration;

use log::{debug, info, warn};

use crate::core::model::{ProgressEvent, WorkerMessage};

/// Distance below which the animated ratio snaps to its target.
pub const SETTLE_EPSILON: f64 = 0.001;

/// Exponential easing rate, in 1/seconds.
const EASE_RATE: f64 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Listening,
    /// Source exhausted, waiting for the bar to settle.
    Draining,
    Done,
    /// Source exhausted before every task reported back.
    Incomplete,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Done | Phase::Incomplete)
    }
}

/// Everything the reporter reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum ReporterMsg {
    Worker(WorkerMessage),
    /// The channel hung up without an `Exhausted` sentinel.
    Disconnected,
    /// An animation frame; carries the time since the previous one.
    Frame(Duration),
    Resize,
}

/// What the driving loop should do after an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    None,
    Redraw,
    Quit,
}

/// Counters and log owned by the reporter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressState {
    pub total: usize,
    pub completed: usize,
    pub current_name: String,
    /// Append-only; every line is kept for the final render.
    pub failure_log: Vec<String>,
}

impl ProgressState {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Default::default()
        }
    }

    pub fn target_ratio(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        self.completed as f64 / self.total as f64
    }

    pub fn succeeded(&self) -> usize {
        self.completed.saturating_sub(self.failure_log.len())
    }
}

/// Smoothed ratio shown by the progress bar.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EasedRatio {
    shown: f64,
    target: f64,
}

impl EasedRatio {
    pub fn shown(&self) -> f64 {
        self.shown
    }

    pub fn set_target(&mut self, target: f64) {
        self.target = target.clamp(0.0, 1.0);
    }

    pub fn is_animating(&self) -> bool {
        self.shown != self.target
    }

    pub fn advance(&mut self, dt: Duration) {
        if !self.is_animating() {
            return;
        }
        let step = 1.0 - (-EASE_RATE * dt.as_secs_f64()).exp();
        self.shown += (self.target - self.shown) * step;
        if (self.target - self.shown).abs() < SETTLE_EPSILON {
            self.shown = self.target;
        }
    }

    pub fn snap(&mut self) {
        self.shown = self.target;
    }
}

pub struct ProgressReporter {
    state: ProgressState,
    bar: EasedRatio,
    phase: Phase,
}

impl ProgressReporter {
    pub fn new(total: usize) -> Self {
        Self {
            state: ProgressState::new(total),
            bar: EasedRatio::default(),
            phase: Phase::Listening,
        }
    }

    pub fn state(&self) -> &ProgressState {
        &self.state
    }

    pub fn bar(&self) -> EasedRatio {
        self.bar
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_finished(&self) -> bool {
        self.phase.is_terminal()
    }

    /// Apply one message. Events must be fed strictly one at a time, in
    /// arrival order.
    pub fn update(&mut self, msg: ReporterMsg) -> Effect {
        if self.phase.is_terminal() {
            debug!("Reporter already finished, ignoring {:?}", msg);
            return Effect::None;
        }

        match msg {
            ReporterMsg::Worker(WorkerMessage::Finished(event)) => self.record(event),
            ReporterMsg::Worker(WorkerMessage::Exhausted) => self.exhausted(),
            ReporterMsg::Disconnected => {
                warn!("Worker channel closed without an exhaustion signal");
                self.exhausted()
            }
            ReporterMsg::Frame(dt) => {
                let was_animating = self.bar.is_animating();
                self.bar.advance(dt);
                if self.phase == Phase::Draining {
                    self.try_finish()
                } else if was_animating {
                    Effect::Redraw
                } else {
                    Effect::None
                }
            }
            ReporterMsg::Resize => Effect::Redraw,
        }
    }

    /// Jump the bar to its target. Used when nothing is rendering.
    pub fn settle(&mut self) -> Effect {
        self.bar.snap();
        if self.phase == Phase::Draining {
            return self.try_finish();
        }
        Effect::None
    }

    fn record(&mut self, event: ProgressEvent) -> Effect {
        if self.phase == Phase::Draining {
            warn!("Event for {} arrived after exhaustion, ignoring", event.name);
            return Effect::None;
        }
        if self.state.completed >= self.state.total {
            warn!(
                "Event for {} exceeds the {} expected tasks, ignoring",
                event.name, self.state.total
            );
            return Effect::None;
        }

        self.state.completed += 1;
        if let Some(line) = event.failure_line() {
            self.state.failure_log.push(line);
        }
        debug!(
            "Progress {}/{} ({})",
            self.state.completed, self.state.total, event.name
        );
        self.state.current_name = event.name;
        self.bar.set_target(self.state.target_ratio());
        Effect::Redraw
    }

    fn exhausted(&mut self) -> Effect {
        info!(
            "Worker exhausted after {}/{} tasks",
            self.state.completed, self.state.total
        );
        self.phase = Phase::Draining;
        self.try_finish()
    }

    fn try_finish(&mut self) -> Effect {
        if self.bar.is_animating() {
            return Effect::Redraw;
        }
        self.phase = if self.state.completed == self.state.total {
            Phase::Done
        } else {
            Phase::Incomplete
        };
        info!("Reporter finished: {:?}", self.phase);
        Effect::Quit
    }
}
