//! # TUI Adapter
//!
//! The ratatui-specific layer. Owns the terminal sessions, renders the
//! components, and translates keyboard events into the closed `TuiEvent` set.
//!
//! This is the only module that knows about ratatui and crossterm. The
//! coordinator talks to it through the `Operator` trait, so a scripted
//! operator can stand in for it.
//!
//! ## Sessions
//!
//! Each interactive step (a prompt, the checklist, the progress view) runs in
//! its own short-lived session: the terminal is initialised when the step
//! starts and restored when its [`Session`] guard drops, even on error. A
//! single panic hook, installed by the first session, restores it on panic.
//!
//! ## Redraw Strategy
//!
//! - **Prompt / checklist**: draw only after an input event. ratatui diffs
//!   against the previous buffer, so toggling one row only rewrites that row.
//! - **Progress**: poll input for at most one frame interval, take at most one
//!   worker message, then tick the easing animation. Draws happen when the
//!   reporter asks for one.

pub mod component;
pub mod components;
pub mod event;

use std::io::{self, stdout};
use std::panic;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::{Duration, Instant};

use crossterm::event::{DisableBracketedPaste, EnableBracketedPaste};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use log::{debug, info, warn};
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::{DefaultTerminal, Terminal};
use thiserror::Error;

use crate::coordinator::Operator;
use crate::core::model::{InterfaceRef, SelectionOutcome, WorkerMessage};
use crate::core::progress::{Effect, Phase, ProgressReporter, ReporterMsg};
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::{InterfaceList, InterfaceListState, ProgressView, PromptEvent, TextPrompt};
use crate::tui::event::{EventSource, TuiEvent};

/// Upper bound on how long the progress loop blocks waiting for input.
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Input wait for the prompt and checklist loops, which only redraw on input.
const INPUT_POLL: Duration = Duration::from_millis(250);

#[derive(Debug, Error)]
pub enum TuiError {
    #[error("cannot start terminal session: {0}")]
    Session(#[source] io::Error),
    #[error("cannot read terminal input: {0}")]
    Input(#[source] io::Error),
    #[error("cannot draw to the terminal: {0}")]
    Render(String),
    #[error("interrupted")]
    Interrupted,
}

fn render_error(e: impl std::fmt::Display) -> TuiError {
    TuiError::Render(e.to_string())
}

static PANIC_HOOK_INSTALLED: AtomicBool = AtomicBool::new(false);

/// Chain a terminal-restoring hook in front of the existing panic hook.
/// Only the first call installs it; returns whether this call did.
fn install_panic_hook() -> bool {
    if PANIC_HOOK_INSTALLED.swap(true, Ordering::SeqCst) {
        return false;
    }
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        restore_terminal();
        previous(info);
    }));
    true
}

fn restore_terminal() {
    let _ = execute!(stdout(), DisableBracketedPaste, LeaveAlternateScreen);
    let _ = disable_raw_mode();
}

/// Run `setup`; on failure call `undo` so a half-initialised terminal is
/// not left behind.
fn setup_or_undo<T>(
    setup: impl FnOnce() -> io::Result<T>,
    undo: impl FnOnce(),
) -> Result<T, TuiError> {
    setup().map_err(|e| {
        undo();
        TuiError::Session(e)
    })
}

fn enter_terminal() -> io::Result<DefaultTerminal> {
    enable_raw_mode()?;
    execute!(stdout(), EnterAlternateScreen)?;
    if let Err(e) = execute!(stdout(), EnableBracketedPaste) {
        // Paste still arrives, just as individual keys.
        warn!("Bracketed paste unavailable: {}", e);
    }
    Terminal::new(CrosstermBackend::new(stdout()))
}

/// One interactive terminal session. Restores the terminal on drop.
pub struct Session {
    terminal: DefaultTerminal,
}

impl Session {
    pub fn start() -> Result<Self, TuiError> {
        install_panic_hook();
        let terminal = setup_or_undo(enter_terminal, restore_terminal)?;
        debug!("Terminal session started");
        Ok(Self { terminal })
    }

    pub fn terminal(&mut self) -> &mut DefaultTerminal {
        &mut self.terminal
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        let _ = self.terminal.show_cursor();
        restore_terminal();
        debug!("Terminal session restored");
    }
}

/// Show a single-line prompt until Enter. Ctrl+C is `TuiError::Interrupted`.
pub fn run_prompt<B: Backend>(
    terminal: &mut Terminal<B>,
    events: &mut dyn EventSource,
    label: &str,
    default: &str,
) -> Result<String, TuiError> {
    let mut prompt = TextPrompt::new(label, default);
    let mut needs_redraw = true;

    loop {
        if needs_redraw {
            terminal
                .draw(|f| prompt.render(f, f.area()))
                .map_err(render_error)?;
            needs_redraw = false;
        }

        let Some(event) = events.next_event(INPUT_POLL)? else {
            continue;
        };
        needs_redraw = true;
        match prompt.handle_event(&event) {
            Some(PromptEvent::Submit(value)) => {
                info!("Prompt {:?} answered with {:?}", label, value);
                return Ok(value);
            }
            Some(PromptEvent::Interrupted) => {
                info!("Prompt {:?} interrupted", label);
                return Err(TuiError::Interrupted);
            }
            Some(PromptEvent::ContentChanged) | None => {}
        }
    }
}

/// Run the interface checklist until it is confirmed, quit or aborted.
pub fn run_selector<B: Backend>(
    terminal: &mut Terminal<B>,
    events: &mut dyn EventSource,
    interfaces: &[InterfaceRef],
    destination_root: &Path,
) -> Result<SelectionOutcome, TuiError> {
    let mut state = InterfaceListState::new(interfaces, destination_root);
    let size = terminal.size().map_err(render_error)?;
    state.resize(size.width, size.height);
    let mut needs_redraw = true;

    loop {
        if needs_redraw {
            terminal
                .draw(|f| InterfaceList::new(&mut state).render(f, f.area()))
                .map_err(render_error)?;
            needs_redraw = false;
        }

        let Some(event) = events.next_event(INPUT_POLL)? else {
            continue;
        };
        needs_redraw = true;
        if let Some(end) = state.handle_event(&event) {
            info!(
                "Selection ended with {:?} ({} of {} toggled)",
                end,
                state.selected_count(),
                interfaces.len()
            );
            return Ok(state.outcome(end));
        }
    }
}

/// Feed worker messages into `reporter` and render it until it finishes.
pub fn run_progress<B: Backend>(
    terminal: &mut Terminal<B>,
    events: &mut dyn EventSource,
    reporter: &mut ProgressReporter,
    updates: &Receiver<WorkerMessage>,
) -> Result<(), TuiError> {
    let mut last_frame = Instant::now();
    let mut needs_redraw = true;

    loop {
        if needs_redraw || reporter.is_finished() {
            terminal
                .draw(|f| ProgressView::new(reporter).render(f, f.area()))
                .map_err(render_error)?;
            needs_redraw = false;
        }
        if reporter.is_finished() {
            return Ok(());
        }

        // Input is drained but has no meaning here; generation cannot be
        // cancelled once started.
        match events.next_event(FRAME_INTERVAL)? {
            Some(TuiEvent::Resize(..)) => {
                needs_redraw |= reporter.update(ReporterMsg::Resize) == Effect::Redraw;
            }
            Some(event) => debug!("Ignoring {:?} during generation", event),
            None => {}
        }

        let mut effect = Effect::None;
        if reporter.phase() == Phase::Listening {
            match updates.try_recv() {
                Ok(msg) => effect = reporter.update(ReporterMsg::Worker(msg)),
                Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Disconnected) => {
                    effect = reporter.update(ReporterMsg::Disconnected);
                }
            }
        }

        let elapsed = last_frame.elapsed();
        if elapsed >= FRAME_INTERVAL {
            last_frame = Instant::now();
            let frame_effect = reporter.update(ReporterMsg::Frame(elapsed));
            if frame_effect != Effect::None {
                effect = frame_effect;
            }
        }

        // `Quit` leaves the reporter finished; the top of the loop does the
        // final draw.
        needs_redraw |= effect == Effect::Redraw;
    }
}

/// The real operator: every interaction gets its own terminal session.
pub struct TerminalOperator<E: EventSource> {
    events: E,
}

impl<E: EventSource> TerminalOperator<E> {
    pub fn new(events: E) -> Self {
        Self { events }
    }
}

impl<E: EventSource> Operator for TerminalOperator<E> {
    fn prompt(&mut self, label: &str, default: &str) -> Result<String, TuiError> {
        let mut session = Session::start()?;
        run_prompt(session.terminal(), &mut self.events, label, default)
    }

    fn select(
        &mut self,
        interfaces: &[InterfaceRef],
        destination_root: &Path,
    ) -> Result<SelectionOutcome, TuiError> {
        let mut session = Session::start()?;
        run_selector(session.terminal(), &mut self.events, interfaces, destination_root)
    }

    fn watch_progress(
        &mut self,
        reporter: &mut ProgressReporter,
        updates: &Receiver<WorkerMessage>,
    ) -> Result<(), TuiError> {
        let mut session = Session::start()?;
        run_progress(session.terminal(), &mut self.events, reporter, updates)
    }

    fn notify(&mut self, message: &str) {
        println!("{message}");
    }

    fn warn(&mut self, message: &str) {
        eprintln!("warning: {message}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::ProgressEvent;
    use crate::test_support::ScriptedEvents;
    use ratatui::backend::TestBackend;
    use std::collections::BTreeMap;
    use std::path::PathBuf;
    use std::sync::mpsc::sync_channel;
    use std::thread;

    fn terminal(width: u16, height: u16) -> Terminal<TestBackend> {
        Terminal::new(TestBackend::new(width, height)).unwrap()
    }

    fn screen(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    fn chars(text: &str) -> Vec<TuiEvent> {
        text.chars().map(TuiEvent::InputChar).collect()
    }

    #[test]
    fn test_panic_hook_is_installed_once() {
        install_panic_hook();
        assert!(!install_panic_hook());
        assert!(!install_panic_hook());
    }

    #[test]
    fn test_failed_session_setup_is_undone() {
        let mut undone = false;
        let result: Result<(), TuiError> = setup_or_undo(
            || Err(io::Error::other("not a tty")),
            || undone = true,
        );
        assert!(matches!(result, Err(TuiError::Session(_))));
        assert!(undone);

        let mut undone = false;
        let value = setup_or_undo(|| Ok(7), || undone = true).unwrap();
        assert_eq!(value, 7);
        assert!(!undone);
    }

    #[test]
    fn test_prompt_accepts_prefilled_default() {
        let mut terminal = terminal(60, 8);
        let mut events = ScriptedEvents::new(vec![TuiEvent::Submit]);
        let value = run_prompt(&mut terminal, &mut events, "Enter the search directory:", ".")
            .unwrap();
        assert_eq!(value, ".");
        assert!(screen(&terminal).contains("Enter the search directory:"));
    }

    #[test]
    fn test_prompt_returns_edited_value_trimmed() {
        let mut terminal = terminal(60, 8);
        let mut script = vec![TuiEvent::Backspace];
        script.extend(chars("./pkg  "));
        script.push(TuiEvent::Submit);
        let mut events = ScriptedEvents::new(script);
        let value = run_prompt(&mut terminal, &mut events, "Enter the search directory:", ".")
            .unwrap();
        assert_eq!(value, "./pkg");
    }

    #[test]
    fn test_prompt_blank_input_falls_back_to_default() {
        let mut terminal = terminal(60, 8);
        let mut script = vec![TuiEvent::Backspace; 5];
        script.extend(chars("   "));
        script.push(TuiEvent::Submit);
        let mut events = ScriptedEvents::new(script);
        let value = run_prompt(&mut terminal, &mut events, "Enter the output directory:", "mocks")
            .unwrap();
        assert_eq!(value, "mocks");
    }

    #[test]
    fn test_prompt_interrupt_is_an_error() {
        let mut terminal = terminal(60, 8);
        let mut events = ScriptedEvents::new(vec![TuiEvent::InputChar('x'), TuiEvent::Interrupt]);
        let err = run_prompt(&mut terminal, &mut events, "Mock path for A:", "a.go").unwrap_err();
        assert!(matches!(err, TuiError::Interrupted));
    }

    fn interfaces() -> Vec<InterfaceRef> {
        vec![
            InterfaceRef::new("Reader", "io/reader.go"),
            InterfaceRef::new("Writer", "io/writer.go"),
        ]
    }

    #[test]
    fn test_selector_confirm_maps_toggled_to_destination() {
        let mut terminal = terminal(60, 14);
        let mut events = ScriptedEvents::new(vec![
            TuiEvent::CursorDown,
            TuiEvent::InputChar(' '),
            TuiEvent::Submit,
        ]);
        let outcome =
            run_selector(&mut terminal, &mut events, &interfaces(), Path::new("mocks")).unwrap();

        let mut expected = BTreeMap::new();
        expected.insert("Writer".to_string(), PathBuf::from("mocks"));
        assert_eq!(outcome, SelectionOutcome::Selected(expected));

        let text = screen(&terminal);
        assert!(text.contains("[x] Writer"));
        assert!(text.contains("[ ] Reader"));
    }

    #[test]
    fn test_selector_quit_keeps_toggles_and_abort_discards() {
        let mut terminal = terminal(60, 14);
        let mut events = ScriptedEvents::new(vec![TuiEvent::InputChar(' '), TuiEvent::Escape]);
        let quit =
            run_selector(&mut terminal, &mut events, &interfaces(), Path::new("out")).unwrap();
        let SelectionOutcome::Selected(selected) = quit else {
            panic!("quit must not abort");
        };
        assert_eq!(selected.keys().collect::<Vec<_>>(), vec!["Reader"]);

        let mut events = ScriptedEvents::new(vec![TuiEvent::InputChar(' '), TuiEvent::Interrupt]);
        let aborted =
            run_selector(&mut terminal, &mut events, &interfaces(), Path::new("out")).unwrap();
        assert_eq!(aborted, SelectionOutcome::Aborted);
    }

    #[test]
    fn test_selector_reflows_on_resize() {
        let mut terminal = terminal(60, 20);
        terminal.backend_mut().resize(60, 10);
        let mut events = ScriptedEvents::new(vec![
            TuiEvent::Resize(60, 10),
            TuiEvent::CursorEnd,
            TuiEvent::Submit,
        ]);
        run_selector(&mut terminal, &mut events, &interfaces(), Path::new("out")).unwrap();
        let text = screen(&terminal);
        assert!(text.contains("[Enter] confirm selection"));
        assert!(text.contains("Writer"));
    }

    #[test]
    fn test_progress_runs_until_done() {
        let mut terminal = terminal(60, 12);
        let mut events = ScriptedEvents::new(Vec::new());
        let mut reporter = ProgressReporter::new(2);
        let (tx, rx) = sync_channel(0);
        let worker = thread::spawn(move || {
            tx.send(WorkerMessage::Finished(ProgressEvent::succeeded("A")))
                .unwrap();
            tx.send(WorkerMessage::Finished(ProgressEvent::failed("B", "boom")))
                .unwrap();
            tx.send(WorkerMessage::Exhausted).unwrap();
        });

        run_progress(&mut terminal, &mut events, &mut reporter, &rx).unwrap();
        worker.join().unwrap();

        assert_eq!(reporter.phase(), Phase::Done);
        assert_eq!(reporter.state().completed, 2);
        let text = screen(&terminal);
        assert!(text.contains("Generation finished"));
        assert!(text.contains("B: failed (boom)"));
        assert!(text.contains("100%"));
    }

    #[test]
    fn test_progress_ends_incomplete_when_worker_vanishes() {
        let mut terminal = terminal(60, 12);
        let mut events = ScriptedEvents::new(vec![TuiEvent::InputChar('q')]);
        let mut reporter = ProgressReporter::new(3);
        let (tx, rx) = sync_channel(0);
        let worker = thread::spawn(move || {
            tx.send(WorkerMessage::Finished(ProgressEvent::succeeded("A")))
                .unwrap();
        });

        run_progress(&mut terminal, &mut events, &mut reporter, &rx).unwrap();
        worker.join().unwrap();

        assert_eq!(reporter.phase(), Phase::Incomplete);
        assert_eq!(reporter.state().completed, 1);
        assert!(screen(&terminal).contains("Generation stopped early"));
    }

    #[test]
    fn test_progress_input_error_leaves_reporter_usable() {
        let mut terminal = terminal(60, 12);
        let mut events = ScriptedEvents::failing();
        let mut reporter = ProgressReporter::new(1);
        let (_tx, rx) = sync_channel::<WorkerMessage>(0);

        let err = run_progress(&mut terminal, &mut events, &mut reporter, &rx).unwrap_err();
        assert!(matches!(err, TuiError::Input(_)));
        assert_eq!(reporter.phase(), Phase::Listening);
    }
}
