use ratatui::style::{Color, Modifier, Style};

use librarian_core::{BookStatus, NoticeKind};

/// Color theme for the TUI.
pub struct Theme {
    pub available: Color,
    pub borrowed: Color,
    pub reserved: Color,
    pub maintenance: Color,

    pub success: Color,
    pub error: Color,
    pub info: Color,

    pub header_fg: Color,
    pub header_bg: Color,
    pub border: Color,
    pub focus_border: Color,
    pub text: Color,
    pub dim: Color,
    pub highlight_bg: Color,
    pub active: Color,
    pub spinner: Color,
    pub footer_fg: Color,
    pub footer_bg: Color,
}

impl Theme {
    /// Hacker-green terminal theme.
    pub fn hacker() -> Self {
        Self {
            available: Color::Rgb(0, 210, 0),
            borrowed: Color::Yellow,
            reserved: Color::Cyan,
            maintenance: Color::Red,

            success: Color::Rgb(0, 210, 0),
            error: Color::Red,
            info: Color::Cyan,

            header_fg: Color::Black,
            header_bg: Color::Rgb(0, 210, 0),
            border: Color::DarkGray,
            focus_border: Color::Rgb(0, 210, 0),
            text: Color::White,
            dim: Color::DarkGray,
            highlight_bg: Color::Rgb(30, 50, 30),
            active: Color::Cyan,
            spinner: Color::Cyan,
            footer_fg: Color::DarkGray,
            footer_bg: Color::Reset,
        }
    }

    /// Modern theme: white text, electric blue accents, dark blue header.
    pub fn modern() -> Self {
        Self {
            available: Color::Rgb(0, 200, 80),
            borrowed: Color::Rgb(255, 200, 0),
            reserved: Color::Rgb(60, 140, 255),
            maintenance: Color::Rgb(255, 80, 80),

            success: Color::Rgb(0, 200, 80),
            error: Color::Rgb(255, 80, 80),
            info: Color::Rgb(60, 140, 255),

            header_fg: Color::White,
            header_bg: Color::Rgb(30, 60, 120),
            border: Color::Rgb(60, 60, 80),
            focus_border: Color::Rgb(60, 140, 255),
            text: Color::White,
            dim: Color::Rgb(120, 120, 140),
            highlight_bg: Color::Rgb(30, 40, 80),
            active: Color::Rgb(60, 140, 255),
            spinner: Color::Rgb(60, 140, 255),
            footer_fg: Color::Rgb(120, 120, 140),
            footer_bg: Color::Reset,
        }
    }

    /// Theme by name; anything other than "modern" gets the hacker theme.
    pub fn named(name: &str) -> Self {
        match name {
            "modern" => Self::modern(),
            _ => Self::hacker(),
        }
    }

    pub fn status_color(&self, status: BookStatus) -> Color {
        match status {
            BookStatus::Available | BookStatus::Other => self.available,
            BookStatus::Borrowed => self.borrowed,
            BookStatus::Reserved => self.reserved,
            BookStatus::Maintenance => self.maintenance,
        }
    }

    pub fn notice_color(&self, kind: NoticeKind) -> Color {
        match kind {
            NoticeKind::Success => self.success,
            NoticeKind::Error => self.error,
            NoticeKind::Info => self.info,
        }
    }

    pub fn header_style(&self) -> Style {
        Style::default()
            .fg(self.header_fg)
            .bg(self.header_bg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn highlight_style(&self) -> Style {
        Style::default()
            .bg(self.highlight_bg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn border_style(&self, focused: bool) -> Style {
        if focused {
            Style::default().fg(self.focus_border)
        } else {
            Style::default().fg(self.border)
        }
    }

    pub fn footer_style(&self) -> Style {
        Style::default().fg(self.footer_fg).bg(self.footer_bg)
    }
}
