use ratatui::style::Color;

use crate::models::Status;

pub const NEON_GREEN: Color = Color::Rgb(0, 160, 50);
pub const NEON_CYAN: Color = Color::Rgb(0, 150, 160);
pub const NEON_MAGENTA: Color = Color::Rgb(160, 60, 160);
pub const NEON_YELLOW: Color = Color::Rgb(180, 160, 60);
pub const NEON_RED: Color = Color::Rgb(180, 60, 60);
pub const DARK_BG: Color = Color::Rgb(15, 15, 25);
pub const MATRIX_GREEN: Color = Color::Rgb(30, 130, 30);
pub const CYBER_BLUE: Color = Color::Rgb(60, 130, 180);

pub fn status_color(status: &Status) -> Color {
    match status {
        Status::NotChecked => Color::DarkGray,
        Status::Running => NEON_CYAN,
        Status::AllOk => NEON_GREEN,
        Status::IssuesDetected => NEON_YELLOW,
        Status::MatrixNotFound | Status::Failed(_) => NEON_RED,
    }
}

/// Highlight colour for a line in the output pane
pub fn line_color(line: &str) -> Color {
    if line.starts_with("Warning:") {
        NEON_YELLOW
    } else if line.starts_with("Error") {
        NEON_RED
    } else if line.starts_with("Skipping line") {
        NEON_MAGENTA
    } else {
        MATRIX_GREEN
    }
}
