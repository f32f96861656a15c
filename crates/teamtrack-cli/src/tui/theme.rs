//! Color palette and shared styles for the console.

use ratatui::style::{Color, Modifier, Style};

pub const ACCENT: Color = Color::Rgb(255, 92, 0);
pub const BG_CARD: Color = Color::Rgb(30, 30, 36);
pub const TEXT: Color = Color::Rgb(230, 230, 235);
pub const TEXT_SECONDARY: Color = Color::Rgb(160, 160, 170);
pub const TEXT_TERTIARY: Color = Color::Rgb(110, 110, 120);
pub const CYAN: Color = Color::Rgb(80, 200, 220);
pub const BLUE: Color = Color::Rgb(90, 140, 255);
pub const GREEN: Color = Color::Rgb(80, 200, 120);
pub const YELLOW: Color = Color::Rgb(240, 200, 80);
pub const ORANGE: Color = Color::Rgb(245, 140, 60);
pub const RED: Color = Color::Rgb(240, 80, 80);
pub const PURPLE: Color = Color::Rgb(170, 120, 240);

pub const SPINNER_FRAMES: &[&str] = &[
    "\u{280b}", "\u{2819}", "\u{2839}", "\u{2838}", "\u{283c}", "\u{2834}", "\u{2826}", "\u{2827}",
    "\u{2807}", "\u{280f}",
];

pub fn title_style() -> Style {
    Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
}

pub fn dim_style() -> Style {
    Style::default().fg(TEXT_TERTIARY)
}

pub fn hint_style() -> Style {
    Style::default().fg(TEXT_SECONDARY)
}

pub fn selected_style() -> Style {
    Style::default().bg(Color::Rgb(50, 50, 60)).add_modifier(Modifier::BOLD)
}

pub fn input_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(CYAN).add_modifier(Modifier::BOLD)
    } else {
        dim_style()
    }
}

/// Swatch for a task status token.
pub fn status_style(status: &str) -> Style {
    match status {
        "in_progress" => Style::default().fg(BLUE),
        "backlog" => Style::default().fg(PURPLE),
        _ => Style::default().fg(TEXT_SECONDARY),
    }
}

/// Swatch for a priority token.
pub fn priority_style(priority: &str) -> Style {
    match priority {
        "critical" => Style::default().fg(RED).add_modifier(Modifier::BOLD),
        "high" => Style::default().fg(ORANGE),
        "medium" => Style::default().fg(YELLOW),
        "low" => Style::default().fg(GREEN),
        _ => dim_style(),
    }
}
