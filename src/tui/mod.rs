//! Terminal UI for timed tic-tac-toe

mod app;
mod input;
mod ui;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{self, Stdout};
use timed_tictactoe::{Command, GameConfig, SessionEvent, spawn_session};
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::time::Duration;
use tracing::{error, info, instrument};

use app::App;

/// How long to wait for a key before redrawing.
const INPUT_POLL: Duration = Duration::from_millis(50);

/// Runs the TUI until the user quits.
#[instrument(skip_all)]
pub async fn run_tui(setup: GameConfig) -> Result<()> {
    info!("Starting terminal UI");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let (events_tx, mut events) = mpsc::unbounded_channel();
    let (commands, driver) = spawn_session(events_tx);
    let mut app = App::new(setup, commands.clone());

    let res = run_app(&mut terminal, &mut app, &mut events).await;

    let _ = commands.send(Command::Shutdown);
    if let Err(e) = driver.await {
        error!(error = %e, "Session driver task failed");
    }

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = &res {
        error!(error = ?err, "UI loop error");
    }
    res
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
    events: &mut UnboundedReceiver<SessionEvent>,
) -> Result<()> {
    loop {
        while let Ok(event) = events.try_recv() {
            app.handle_event(event);
        }

        terminal.draw(|f| ui::draw(f, app))?;

        if app.should_quit() {
            info!("User quit");
            return Ok(());
        }

        if event::poll(INPUT_POLL)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            app.handle_key(key.code);
        }
    }
}
