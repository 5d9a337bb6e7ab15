//! Palette and semantic styles for the TUI.

use ratatui::style::{Color, Modifier, Style};

// ── Core Palette ──────────────────────────────────────────────────────

pub const BANK_YELLOW: Color = Color::Rgb(255, 221, 0); // #ffdd00
pub const NAVY: Color = Color::Rgb(22, 38, 88); // #162658
pub const SKY_BLUE: Color = Color::Rgb(98, 170, 255); // #62aaff
pub const SUCCESS_GREEN: Color = Color::Rgb(80, 250, 123); // #50fa7b
pub const ERROR_RED: Color = Color::Rgb(255, 99, 99); // #ff6363
pub const WARN_ORANGE: Color = Color::Rgb(255, 170, 85); // #ffaa55

// ── Extended Palette ──────────────────────────────────────────────────

pub const DIM_WHITE: Color = Color::Rgb(189, 193, 207); // #bdc1cf
pub const BORDER_GRAY: Color = Color::Rgb(98, 114, 164); // #6272a4
pub const BG_HIGHLIGHT: Color = Color::Rgb(40, 42, 54); // #282a36
pub const BG_DARK: Color = Color::Rgb(30, 31, 41); // #1e1f29
pub const AVATAR_BG: Color = Color::Rgb(52, 64, 110); // #34406e

// ── Semantic Styles ───────────────────────────────────────────────────

/// Title text for blocks/panels.
pub fn title_style() -> Style {
    Style::default().fg(BANK_YELLOW).add_modifier(Modifier::BOLD)
}

pub fn border_focused() -> Style {
    Style::default().fg(BANK_YELLOW)
}

pub fn border_default() -> Style {
    Style::default().fg(BORDER_GRAY)
}

pub fn border_error() -> Style {
    Style::default().fg(ERROR_RED)
}

pub fn table_header() -> Style {
    Style::default()
        .fg(SKY_BLUE)
        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
}

pub fn table_row() -> Style {
    Style::default().fg(DIM_WHITE)
}

pub fn table_selected() -> Style {
    Style::default()
        .fg(BANK_YELLOW)
        .bg(BG_HIGHLIGHT)
        .add_modifier(Modifier::BOLD)
}

/// Initials badge standing in for the logo image.
pub fn avatar() -> Style {
    Style::default()
        .fg(Color::White)
        .bg(AVATAR_BG)
        .add_modifier(Modifier::BOLD)
}

pub fn field_error() -> Style {
    Style::default().fg(ERROR_RED)
}

pub fn disabled() -> Style {
    Style::default().fg(BORDER_GRAY).add_modifier(Modifier::DIM)
}

/// Primary button (submit, confirm).
pub fn button_primary(active: bool) -> Style {
    if active {
        Style::default()
            .fg(NAVY)
            .bg(BANK_YELLOW)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(BANK_YELLOW)
    }
}

/// Secondary button (reset, cancel).
pub fn button_secondary(active: bool) -> Style {
    if active {
        Style::default()
            .fg(NAVY)
            .bg(DIM_WHITE)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DIM_WHITE)
    }
}

/// Key hint text (e.g., "q salir  ? ayuda").
pub fn key_hint() -> Style {
    Style::default().fg(BORDER_GRAY)
}

pub fn key_hint_key() -> Style {
    Style::default().fg(SKY_BLUE).add_modifier(Modifier::BOLD)
}
