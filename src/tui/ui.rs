//! Stateless UI rendering for the timed game.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};
use timed_tictactoe::Mark;

use super::app::{App, Screen};

/// Renders the whole screen.
pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Min(9),    // Body
            Constraint::Length(3), // Timers
            Constraint::Length(3), // Status
        ])
        .split(frame.area());

    let title = Paragraph::new("Timed Tic Tac Toe")
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center);
    frame.render_widget(title, chunks[0]);

    match app.screen() {
        Screen::Setup => draw_setup(frame, chunks[1], app),
        Screen::Playing | Screen::GameOver => draw_board(frame, chunks[1], app),
    }

    draw_timers(frame, chunks[2], app);

    let status = Paragraph::new(app.status())
        .style(Style::default().fg(Color::Yellow))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, chunks[3]);

    if app.screen() == Screen::GameOver {
        draw_game_over(frame, chunks[1], app);
    }
}

fn draw_setup(frame: &mut Frame, area: Rect, app: &App) {
    let setup = app.setup();
    let text = vec![
        Line::from(format!("Board size:  ◀ {0}x{0} ▶", setup.board_size())),
        Line::from(format!("Timer:       ▲ {} seconds ▼", setup.turn_seconds())),
        Line::from(""),
        Line::from("←/→ size   ↑/↓ timer   Enter start   q quit"),
    ];

    let panel = Paragraph::new(text)
        .alignment(Alignment::Center)
        .block(Block::default().title("Game Setup").borders(Borders::ALL));
    frame.render_widget(panel, center_rect(area, 50, 8));
}

fn draw_board(frame: &mut Frame, area: Rect, app: &App) {
    let size = app.size();
    let separator = vec!["───"; size].join("┼");
    let mut lines = Vec::with_capacity(size * 2);

    for row in 0..size {
        if row > 0 {
            lines.push(Line::from(Span::styled(
                separator.clone(),
                Style::default().fg(Color::DarkGray),
            )));
        }

        let mut spans = Vec::with_capacity(size * 2);
        for col in 0..size {
            if col > 0 {
                spans.push(Span::styled("│", Style::default().fg(Color::DarkGray)));
            }
            spans.push(cell_span(app, row, col));
        }
        lines.push(Line::from(spans));
    }
    lines.push(Line::from(""));
    lines.push(Line::from("Arrows move   Enter place   r reset   q quit"));

    let height = u16::try_from(lines.len()).unwrap_or(u16::MAX);
    let board = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(board, center_rect(area, area.width, height));
}

fn cell_span(app: &App, row: usize, col: usize) -> Span<'static> {
    let (symbol, base_style) = match app.cell(row, col) {
        None => ("   ", Style::default().fg(Color::DarkGray)),
        Some(Mark::X) => (" X ", mark_style(Mark::X)),
        Some(Mark::O) => (" O ", mark_style(Mark::O)),
    };

    let style = if app.screen() == Screen::Playing && app.cursor() == (row, col) {
        base_style.bg(Color::White).fg(Color::Black)
    } else {
        base_style
    };

    Span::styled(symbol, style)
}

fn mark_style(mark: Mark) -> Style {
    let color = match mark {
        Mark::X => Color::Blue,
        Mark::O => Color::Red,
    };
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

fn draw_timers(frame: &mut Frame, area: Rect, app: &App) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    for (mark, col) in [(Mark::X, cols[0]), (Mark::O, cols[1])] {
        let readout = Paragraph::new(format!(
            "Player {}'s Timer: {} seconds",
            mark,
            app.remaining(mark)
        ))
        .style(mark_style(mark))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
        frame.render_widget(readout, col);
    }
}

fn draw_game_over(frame: &mut Frame, area: Rect, app: &App) {
    let message = app
        .outcome()
        .map(|outcome| outcome.to_string())
        .unwrap_or_default();
    let text = vec![
        Line::from(Span::styled(
            message,
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("r restart   q quit"),
    ];

    let popup = center_rect(area, 36, 5);
    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(text)
            .alignment(Alignment::Center)
            .block(Block::default().title("Game Over").borders(Borders::ALL)),
        popup,
    );
}

fn center_rect(area: Rect, width: u16, height: u16) -> Rect {
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length((area.height.saturating_sub(height)) / 2),
            Constraint::Length(height),
            Constraint::Length((area.height.saturating_sub(height)) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length((area.width.saturating_sub(width)) / 2),
            Constraint::Length(width),
            Constraint::Length((area.width.saturating_sub(width)) / 2),
        ])
        .split(vert[1])[1]
}
