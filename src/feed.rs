use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::thread;
use tokio::sync::mpsc::{Sender, UnboundedSender};

/// Lines read ahead of the chart loop. A full queue stalls the reader, and
/// with it the producer on the other end of the pipe.
pub const LINE_QUEUE: usize = 64;

/// Everything the chart loop reacts to.
///
/// Lines and `EndOfStream` travel on the bounded line channel; interrupts,
/// keys and resizes on the control channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedUpdate {
    /// One input line, without its terminator.
    Line(String),
    /// The line source is exhausted.
    EndOfStream,
    /// SIGINT or Ctrl-C.
    Interrupted,
    /// The terminal was resized to `(width, height)`.
    Resize(u16, u16),
    /// A key was pressed.
    Key(KeyEvent),
}

/// A line-oriented input that can be moved to a reader thread.
pub type LineSource = Box<dyn BufRead + Send>;

/// Opens the file at `path`, or standard input when no path is given.
pub fn open_source(path: Option<&Path>) -> Result<LineSource> {
    match path {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("failed to open input {}", path.display()))?;
            Ok(Box::new(BufReader::new(file)))
        }
        None => Ok(Box::new(BufReader::new(io::stdin()))),
    }
}

/// Spawns a thread forwarding every line of `source`, then `EndOfStream`.
///
/// A plain thread rather than a runtime task: a read blocked on a silent pipe
/// must not hold up process exit.
pub fn spawn_line_reader(source: LineSource, tx: Sender<FeedUpdate>) -> Result<()> {
    thread::Builder::new()
        .name("line-reader".into())
        .spawn(move || read_lines(source, &tx))
        .context("failed to spawn line reader")?;
    Ok(())
}

/// Forwards lines until end of input, a read error, or a closed channel.
///
/// Blocks while the line queue is full.
fn read_lines(mut source: impl BufRead, tx: &Sender<FeedUpdate>) {
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match source.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {
                // Invalid UTF-8 survives as replacement characters and fails to parse.
                let line = String::from_utf8_lossy(&buf);
                let line = line.trim_end_matches(['\n', '\r']).to_string();
                if tx.blocking_send(FeedUpdate::Line(line)).is_err() {
                    return;
                }
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                tracing::warn!(error = %e, "read failed, treating as end of stream");
                break;
            }
        }
    }
    tracing::debug!("line source exhausted");
    let _ = tx.blocking_send(FeedUpdate::EndOfStream);
}

/// Spawns a thread forwarding key presses and resizes from the terminal.
pub fn spawn_event_reader(tx: UnboundedSender<FeedUpdate>) -> Result<()> {
    thread::Builder::new()
        .name("terminal-events".into())
        .spawn(move || {
            loop {
                let update = match event::read() {
                    Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => FeedUpdate::Key(key),
                    Ok(Event::Resize(width, height)) => FeedUpdate::Resize(width, height),
                    Ok(_) => continue,
                    Err(e) => {
                        tracing::warn!(error = %e, "terminal event read failed");
                        return;
                    }
                };
                if tx.send(update).is_err() {
                    return;
                }
            }
        })
        .context("failed to spawn terminal event reader")?;
    Ok(())
}

/// Forwards SIGINT as `Interrupted`.
pub fn spawn_interrupt_listener(tx: UnboundedSender<FeedUpdate>) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                let _ = tx.send(FeedUpdate::Interrupted);
            }
            Err(e) => tracing::warn!(error = %e, "cannot listen for interrupts"),
        }
    });
}
