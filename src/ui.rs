use chrono::Utc;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::theme::*;

/// Renders the header, key bar, output pane and status line
pub fn render(frame: &mut Frame, app: &App) {
    // Main container with dark background
    let main_block = Block::default().style(Style::default().bg(DARK_BG));
    frame.render_widget(main_block, frame.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(1), // Key bar
            Constraint::Min(3),    // Output
            Constraint::Length(3), // Status
        ])
        .split(frame.area());

    render_header(frame, chunks[0], app);
    render_keys(frame, chunks[1], app);
    render_output(frame, chunks[2], app);
    render_status(frame, chunks[3], app);
}

fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    let now = Utc::now();
    let spinner = if app.is_busy() && app.frame_count % 10 < 5 {
        "█"
    } else {
        " "
    };

    let last_run = match (app.last_run, app.last_duration) {
        (Some(at), Some(took)) => format!(
            "LAST RUN: {} ({}s)",
            at.format("%H:%M:%S"),
            took.num_seconds()
        ),
        (Some(at), None) => format!("LAST RUN: {}", at.format("%H:%M:%S")),
        _ => "LAST RUN: --:--:--".to_string(),
    };

    let header_text = vec![Line::from(vec![
        Span::styled(spinner, Style::default().fg(NEON_MAGENTA)),
        Span::styled(
            " GPU P2P CHECK ",
            Style::default().fg(NEON_GREEN).add_modifier(Modifier::BOLD),
        ),
        Span::styled("│ ", Style::default().fg(NEON_GREEN)),
        Span::styled(
            format!("{}", now.format("%H:%M:%S")),
            Style::default().fg(NEON_YELLOW),
        ),
        Span::styled(" │ ", Style::default().fg(NEON_GREEN)),
        Span::styled(last_run, Style::default().fg(NEON_CYAN)),
    ])];

    let header = Paragraph::new(header_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Double)
                .border_style(Style::default().fg(NEON_GREEN)),
        )
        .style(Style::default().bg(DARK_BG))
        .alignment(Alignment::Left);
    frame.render_widget(header, area);
}

fn render_keys(frame: &mut Frame, area: Rect, app: &App) {
    let key = |k: &'static str| {
        Span::styled(
            k,
            Style::default()
                .fg(NEON_YELLOW)
                .add_modifier(Modifier::BOLD),
        )
    };
    let label = |text: &'static str, busy: bool| {
        let style = if busy {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default().fg(CYBER_BLUE)
        };
        Span::styled(text, style)
    };

    let mut spans = vec![
        key(" [r] "),
        label("Run GPU Test", app.benchmark_running),
        key("  [u] "),
        label("Check GPU UUIDs", app.uuid_running),
        key("  [↑↓ PgUp PgDn] "),
        label("Scroll", false),
        key("  [q] "),
        label("Quit", false),
    ];
    if app.uuid_running {
        spans.push(Span::styled(
            "  querying nvidia-smi...",
            Style::default().fg(NEON_CYAN),
        ));
    }

    frame.render_widget(
        Paragraph::new(Line::from(spans)).style(Style::default().bg(DARK_BG)),
        area,
    );
}

fn render_output(frame: &mut Frame, area: Rect, app: &App) {
    let lines: Vec<Line> = app
        .output
        .iter()
        .map(|line| Line::from(Span::styled(line.as_str(), Style::default().fg(line_color(line)))))
        .collect();

    let title = format!(" ◇ OUTPUT ({} lines) ", app.output.len());
    let output = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(MATRIX_GREEN))
                .title(Span::styled(title, Style::default().fg(NEON_GREEN)))
                .style(Style::default().bg(DARK_BG)),
        )
        .scroll((app.scroll, 0));
    frame.render_widget(output, area);
}

fn render_status(frame: &mut Frame, area: Rect, app: &App) {
    let color = status_color(&app.status);
    let mut spans = vec![
        Span::styled(" ◆ ", Style::default().fg(color)),
        Span::styled(
            app.status.to_string(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
    ];
    if let Some(notice) = &app.notice {
        spans.push(Span::styled(" │ ", Style::default().fg(MATRIX_GREEN)));
        spans.push(Span::styled(notice.as_str(), Style::default().fg(NEON_YELLOW)));
    }
    let status = Paragraph::new(Line::from(spans))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(color)),
    )
    .style(Style::default().bg(DARK_BG));
    frame.render_widget(status, area);
}
