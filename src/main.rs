mod app;
mod config;
mod feed;
mod format;
mod logging;
mod sample;
mod scale;
mod ui;
mod window;

use anyhow::{Context, Result, bail};
use app::{App, Finish, Step};
use clap::Parser;
use config::Args;
use crossterm::{
    cursor::{Hide, Show},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use feed::FeedUpdate;
use ratatui::prelude::*;
use std::io::{self, IsTerminal};
use tokio::sync::mpsc::{self, Receiver, UnboundedReceiver};
use ui::Geometry;

/// Raw mode and the alternate screen, released on drop.
struct ScreenGuard;

impl ScreenGuard {
    fn acquire() -> Result<Self> {
        enable_raw_mode().context("failed to enable raw mode")?;
        // From here on, drop undoes whatever part of the setup succeeded.
        let guard = Self;
        execute!(io::stdout(), EnterAlternateScreen, Hide)
            .context("failed to enter alternate screen")?;
        Ok(guard)
    }
}

impl Drop for ScreenGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, Show);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Args::parse();
    logging::init(args.log_file.as_deref())?;

    if args.input.is_none() && io::stdin().is_terminal() {
        bail!("no input: pipe numbers into termchart or pass --input <PATH>");
    }

    let source = feed::open_source(args.input.as_deref())?;
    let (line_tx, mut lines) = mpsc::channel(feed::LINE_QUEUE);
    let (control_tx, mut control) = mpsc::unbounded_channel();
    feed::spawn_line_reader(source, line_tx)?;
    feed::spawn_interrupt_listener(control_tx.clone());

    let finish = {
        let _screen = ScreenGuard::acquire()?;
        let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
        feed::spawn_event_reader(control_tx)?;

        let (width, height) = crossterm::terminal::size().context("failed to query terminal size")?;
        let mut app = App::new(Geometry::new(width, height), args.tick_style(), args.keep());
        tracing::info!(width, height, keep = app.keep, tick_style = ?app.tick_style, "chart started");

        run_chart(&mut terminal, &mut app, &mut lines, &mut control).await?
    };

    tracing::info!(?finish, "terminal released");
    Ok(())
}

/// Main chart loop: one update at a time, one full frame per accepted sample.
///
/// Control updates are taken before queued lines, so an interrupt never
/// waits behind input. The loop ends once both channels are closed.
async fn run_chart<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    lines: &mut Receiver<FeedUpdate>,
    control: &mut UnboundedReceiver<FeedUpdate>,
) -> Result<Finish> {
    terminal.draw(|f| ui::render(f, app))?;

    loop {
        let update = tokio::select! {
            biased;
            Some(update) = control.recv() => update,
            Some(update) = lines.recv() => update,
            else => break,
        };

        match app.apply(update) {
            Step::Render => {
                terminal.draw(|f| ui::render(f, app))?;
            }
            Step::Idle => {}
            Step::Exit => break,
        }
    }

    Ok(app.finish_reason().unwrap_or(Finish::EndOfStream))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scale::TickStyle;
    use ratatui::backend::TestBackend;

    fn line(s: &str) -> FeedUpdate {
        FeedUpdate::Line(s.to_string())
    }

    fn chart(keep: bool) -> (Terminal<TestBackend>, App) {
        let terminal = Terminal::new(TestBackend::new(40, 12)).unwrap();
        let app = App::new(Geometry::new(40, 12), TickStyle::Even, keep);
        (terminal, app)
    }

    #[tokio::test]
    async fn test_run_chart_draws_until_end_of_stream() {
        let (mut terminal, mut app) = chart(false);
        let (line_tx, mut lines) = mpsc::channel(8);
        let (_control_tx, mut control) = mpsc::unbounded_channel();
        for update in [line("1"), line("abc"), line("3"), FeedUpdate::EndOfStream] {
            line_tx.send(update).await.unwrap();
        }

        let finish = run_chart(&mut terminal, &mut app, &mut lines, &mut control)
            .await
            .unwrap();

        assert_eq!(finish, Finish::EndOfStream);
        assert_eq!(app.window.values(), vec![1.0, 3.0]);
        let buf = terminal.backend().buffer();
        let status: String = (9..30).map(|x| buf[(x, 0)].symbol()).collect();
        assert_eq!(status, format!("Last value: {:>9}", "3"));
    }

    #[tokio::test]
    async fn test_interrupt_skips_queued_lines() {
        let (mut terminal, mut app) = chart(false);
        let (line_tx, mut lines) = mpsc::channel(8);
        let (control_tx, mut control) = mpsc::unbounded_channel();
        line_tx.send(line("2")).await.unwrap();
        line_tx.send(line("4")).await.unwrap();
        control_tx.send(FeedUpdate::Interrupted).unwrap();

        let finish = run_chart(&mut terminal, &mut app, &mut lines, &mut control)
            .await
            .unwrap();

        assert_eq!(finish, Finish::Interrupted);
        assert!(app.window.is_empty());
    }

    #[tokio::test]
    async fn test_keep_waits_for_key_after_lines_close() {
        let (mut terminal, mut app) = chart(true);
        let (line_tx, mut lines) = mpsc::channel(8);
        let (control_tx, mut control) = mpsc::unbounded_channel();
        line_tx.send(line("2")).await.unwrap();
        line_tx.send(FeedUpdate::EndOfStream).await.unwrap();
        drop(line_tx);

        let key = tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            let key = crossterm::event::KeyEvent::from(crossterm::event::KeyCode::Enter);
            control_tx.send(FeedUpdate::Key(key)).unwrap();
        });

        let finish = run_chart(&mut terminal, &mut app, &mut lines, &mut control)
            .await
            .unwrap();
        key.await.unwrap();

        assert_eq!(finish, Finish::EndOfStream);
        assert_eq!(app.phase, crate::app::Phase::Done(Finish::EndOfStream));
        assert_eq!(app.window.values(), vec![2.0]);
    }

    #[tokio::test]
    async fn test_run_chart_channels_closed() {
        let (mut terminal, mut app) = chart(true);
        let (line_tx, mut lines) = mpsc::channel(8);
        let (control_tx, mut control) = mpsc::unbounded_channel::<FeedUpdate>();
        line_tx.send(line("2")).await.unwrap();
        drop(line_tx);
        drop(control_tx);

        let finish = run_chart(&mut terminal, &mut app, &mut lines, &mut control)
            .await
            .unwrap();
        assert_eq!(finish, Finish::EndOfStream);
        assert_eq!(app.window.values(), vec![2.0]);
    }
}
