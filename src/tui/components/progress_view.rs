//! # Progress View Component
//!
//! Stateless renderer for the progress reporter: animated gauge, the name of
//! the last finished interface, and the failure log (newest lines kept in
//! view when the log outgrows the screen).

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Gauge, Paragraph};

use crate::core::progress::{Phase, ProgressReporter};
use crate::tui::component::Component;

pub struct ProgressView<'a> {
    reporter: &'a ProgressReporter,
}

impl<'a> ProgressView<'a> {
    pub fn new(reporter: &'a ProgressReporter) -> Self {
        Self { reporter }
    }

    fn gauge_label(&self) -> String {
        let state = self.reporter.state();
        format!(
            "{:>3.0}%  {}/{}",
            self.reporter.bar().shown() * 100.0,
            state.completed,
            state.total
        )
    }
}

impl Component for ProgressView<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        use Constraint::{Length, Min};
        let [title_area, gauge_area, current_area, log_area] =
            Layout::vertical([Length(2), Length(3), Length(2), Min(0)]).areas(area);

        let title = match self.reporter.phase() {
            Phase::Done => "Generation finished",
            Phase::Incomplete => "Generation stopped early",
            Phase::Listening | Phase::Draining => "Generating mocks...",
        };
        frame.render_widget(
            Paragraph::new(title).style(Style::default().add_modifier(Modifier::BOLD)),
            title_area,
        );

        let gauge = Gauge::default()
            .block(Block::bordered().border_style(Style::default().fg(Color::DarkGray)))
            .gauge_style(Style::default().fg(Color::Magenta).bg(Color::Black))
            .ratio(self.reporter.bar().shown().clamp(0.0, 1.0))
            .label(self.gauge_label());
        frame.render_widget(gauge, gauge_area);

        let state = self.reporter.state();
        if !state.current_name.is_empty() {
            frame.render_widget(
                Paragraph::new(format!("Current: {}", state.current_name)),
                current_area,
            );
        }

        if state.failure_log.is_empty() {
            return;
        }
        let block = Block::default()
            .borders(Borders::TOP)
            .border_style(Style::default().fg(Color::Red))
            .title(format!(" Failures ({}) ", state.failure_log.len()));
        let visible_rows = usize::from(log_area.height.saturating_sub(1));
        let skip = state.failure_log.len().saturating_sub(visible_rows);
        let lines: Vec<Line> = state
            .failure_log
            .iter()
            .skip(skip)
            .map(|line| Line::styled(line.as_str(), Style::default().fg(Color::Red)))
            .collect();
        frame.render_widget(Paragraph::new(lines).block(block), log_area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{ProgressEvent, WorkerMessage};
    use crate::core::progress::ReporterMsg;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn draw(reporter: &ProgressReporter, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal
            .draw(|f| ProgressView::new(reporter).render(f, f.area()))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    fn event(reporter: &mut ProgressReporter, event: ProgressEvent) {
        reporter.update(ReporterMsg::Worker(WorkerMessage::Finished(event)));
    }

    #[test]
    fn test_render_initial_state() {
        let reporter = ProgressReporter::new(3);
        let text = draw(&reporter, 60, 12);
        assert!(text.contains("Generating mocks..."));
        assert!(text.contains("0/3"));
        assert!(!text.contains("Current:"));
        assert!(!text.contains("Failures"));
    }

    #[test]
    fn test_render_current_and_failures() {
        let mut reporter = ProgressReporter::new(3);
        event(&mut reporter, ProgressEvent::failed("Store", "boom"));
        event(&mut reporter, ProgressEvent::succeeded("Clock"));

        let text = draw(&reporter, 60, 12);
        assert!(text.contains("Current: Clock"));
        assert!(text.contains("2/3"));
        assert!(text.contains("Failures (1)"));
        assert!(text.contains("Store: failed (boom)"));
    }

    #[test]
    fn test_render_keeps_newest_failures_in_view() {
        let mut reporter = ProgressReporter::new(10);
        for i in 0..10 {
            event(&mut reporter, ProgressEvent::failed(format!("I{i}"), "x"));
        }
        let text = draw(&reporter, 40, 10);
        assert!(text.contains("I9: failed (x)"));
        assert!(!text.contains("I0: failed (x)"));
        assert_eq!(reporter.state().failure_log.len(), 10);
    }

    #[test]
    fn test_render_finished_title() {
        let mut reporter = ProgressReporter::new(1);
        event(&mut reporter, ProgressEvent::succeeded("A"));
        reporter.update(ReporterMsg::Worker(WorkerMessage::Exhausted));
        reporter.settle();
        let text = draw(&reporter, 40, 10);
        assert!(text.contains("Generation finished"));
        assert!(text.contains("100%"));
    }
}
