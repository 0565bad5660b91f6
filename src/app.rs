use crate::feed::FeedUpdate;
use crate::sample::parse_sample;
use crate::scale::TickStyle;
use crate::ui::{Geometry, StreamChart};
use crate::window::RollingWindow;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Why reading stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Finish {
    EndOfStream,
    Interrupted,
}

/// Where the chart loop is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Consuming input lines.
    Reading,
    /// Input is over; the last frame stays up until a key press.
    Holding(Finish),
    /// Ready to release the terminal.
    Done(Finish),
}

/// What the driver should do after an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Render,
    Idle,
    Exit,
}

/// Chart state: the sample window plus the loop's phase.
pub struct App {
    /// Samples currently on screen.
    pub window: RollingWindow,
    /// Most recent sample, kept even when the window has no room.
    pub last: Option<f64>,
    /// Terminal size the window is fitted to.
    pub geometry: Geometry,
    pub tick_style: TickStyle,
    /// Whether to hold the final frame until a key press.
    pub keep: bool,
    pub phase: Phase,
    /// Parsed samples so far.
    pub accepted: u64,
    /// Lines that did not parse.
    pub rejected: u64,
}

impl App {
    pub fn new(geometry: Geometry, tick_style: TickStyle, keep: bool) -> Self {
        Self {
            window: RollingWindow::new(geometry.capacity()),
            last: None,
            geometry,
            tick_style,
            keep,
            phase: Phase::Reading,
            accepted: 0,
            rejected: 0,
        }
    }

    /// Advances the state machine by one update.
    pub fn apply(&mut self, update: FeedUpdate) -> Step {
        match (self.phase, update) {
            (Phase::Reading, FeedUpdate::Line(line)) => {
                if self.ingest(&line) {
                    Step::Render
                } else {
                    Step::Idle
                }
            }
            (Phase::Reading, FeedUpdate::EndOfStream) => self.finish(Finish::EndOfStream),
            (Phase::Reading, FeedUpdate::Interrupted) => self.finish(Finish::Interrupted),
            (Phase::Reading, FeedUpdate::Key(key)) if is_interrupt(&key) => {
                self.finish(Finish::Interrupted)
            }
            (Phase::Holding(finish), FeedUpdate::Key(_) | FeedUpdate::Interrupted) => {
                self.phase = Phase::Done(finish);
                Step::Exit
            }
            (Phase::Reading | Phase::Holding(_), FeedUpdate::Resize(width, height)) => {
                self.resize(Geometry::new(width, height));
                Step::Render
            }
            (Phase::Done(_), _) => Step::Exit,
            _ => Step::Idle,
        }
    }

    /// Parses a line and pushes the sample. Returns whether it was accepted.
    pub fn ingest(&mut self, line: &str) -> bool {
        match parse_sample(line) {
            Ok(value) => {
                self.window.push(value);
                self.last = Some(value);
                self.accepted += 1;
                true
            }
            Err(e) => {
                tracing::debug!(error = %e, line, "ignoring input line");
                self.rejected += 1;
                false
            }
        }
    }

    /// Refits the window to a new terminal size.
    pub fn resize(&mut self, geometry: Geometry) {
        self.window.resize(geometry.capacity());
        tracing::debug!(
            from = ?self.geometry,
            to = ?geometry,
            samples = self.window.len(),
            capacity = self.window.capacity(),
            "resize"
        );
        self.geometry = geometry;
    }

    fn finish(&mut self, finish: Finish) -> Step {
        tracing::info!(
            ?finish,
            accepted = self.accepted,
            rejected = self.rejected,
            "input finished"
        );
        if self.keep {
            self.phase = Phase::Holding(finish);
            Step::Idle
        } else {
            self.phase = Phase::Done(finish);
            Step::Exit
        }
    }

    /// Why reading stopped, once it has.
    pub fn finish_reason(&self) -> Option<Finish> {
        match self.phase {
            Phase::Reading => None,
            Phase::Holding(finish) | Phase::Done(finish) => Some(finish),
        }
    }

    /// The widget for the current frame.
    pub fn chart(&self) -> StreamChart<'_> {
        StreamChart::new(&self.window, self.last, self.tick_style)
    }
}

/// Ctrl-C arrives as a key press while the terminal is in raw mode.
fn is_interrupt(key: &KeyEvent) -> bool {
    key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)
}
