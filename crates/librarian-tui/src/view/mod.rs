pub mod confirm;
pub mod filters;
pub mod form;
pub mod help;
pub mod inspector;
pub mod list;

use ratatui::Frame;
use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::app::{App, Focus, InputMode};

/// Spinner frames for animated progress indication.
const SPINNER_FRAMES: &[char] = &[
    '\u{280B}', '\u{2819}', '\u{2839}', '\u{2838}', '\u{283C}', '\u{2834}', '\u{2826}', '\u{2827}',
    '\u{2807}', '\u{280F}',
];

/// Get the current spinner character based on a tick counter.
pub fn spinner_char(tick: usize) -> char {
    SPINNER_FRAMES[tick % SPINNER_FRAMES.len()]
}

/// Truncate a string to fit in `max_width` columns, appending "\u{2026}" if truncated.
pub fn truncate(s: &str, max_width: usize) -> String {
    if max_width == 0 {
        return String::new();
    }
    if s.chars().count() <= max_width {
        return s.to_string();
    }
    let mut truncated: String = s.chars().take(max_width.saturating_sub(1)).collect();
    truncated.push('\u{2026}');
    truncated
}

/// Create a centered rectangle of the given width (columns) and height (rows).
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let vertical = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .split(area);
    Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .split(vertical[0])[0]
}

/// Draw the whole dashboard, then any open overlay.
pub fn render(f: &mut Frame, app: &mut App) {
    let rows = Layout::vertical([
        Constraint::Length(1), // header
        Constraint::Length(3), // filter bar
        Constraint::Length(1), // stats strip
        Constraint::Min(8),    // list + side panels
        Constraint::Length(1), // footer
    ])
    .split(f.area());

    render_header(f, rows[0], app);
    filters::render(f, rows[1], app);
    filters::render_stats(f, rows[2], app);

    let columns =
        Layout::horizontal([Constraint::Percentage(55), Constraint::Percentage(45)]).split(rows[3]);
    list::render(f, columns[0], app);

    let side = Layout::vertical([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(columns[1]);
    inspector::render(f, side[0], app);
    form::render(f, side[1], app);

    render_footer(f, rows[4], app);

    if app.confirm_delete {
        confirm::render(f, &app.theme);
    }
    if app.show_help {
        help::render(f, &app.theme);
    }
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let mut spans = vec![
        Span::styled(" LIBRARIAN ", theme.header_style()),
        Span::styled(format!(" {}", app.api_root), Style::default().fg(theme.dim)),
    ];
    if app.dashboard.loading {
        spans.push(Span::styled(
            format!("  {} Loading", spinner_char(app.tick)),
            Style::default()
                .fg(theme.spinner)
                .add_modifier(Modifier::BOLD),
        ));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_footer(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;

    // A live toast replaces the key hints.
    if let Some(toast) = app.dashboard.toasts.current() {
        let mut spans = vec![Span::styled(
            format!(" {}", toast.notice.message),
            Style::default()
                .fg(theme.notice_color(toast.notice.kind))
                .add_modifier(Modifier::BOLD),
        )];
        let queued = app.dashboard.toasts.len();
        if queued > 1 {
            spans.push(Span::styled(
                format!("  (+{})", queued - 1),
                theme.footer_style(),
            ));
        }
        f.render_widget(Paragraph::new(Line::from(spans)), area);
        return;
    }

    let hints = match (app.input_mode == InputMode::Editing, app.focus) {
        (true, _) => " Esc/Enter:done  Tab:next field  Ctrl+s:save  Ctrl+l:lookup",
        (false, Focus::List) => {
            " Enter:select  n:new  e:edit  d:delete  /:search  s:sort  o:order  l:limit  ?:help  q:quit"
        }
        (false, Focus::Filters) => " Enter:type  j/k:field  c:clear  r:refresh  Tab:pane  ?:help",
        (false, Focus::Form) => {
            " Enter:type  j/k:field  Ctrl+s:save  Ctrl+l:lookup  Esc:cancel  ?:help"
        }
    };
    f.render_widget(
        Paragraph::new(Line::from(Span::styled(hints, theme.footer_style()))),
        area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_counts_characters() {
        assert_eq!(truncate("Clean Code", 20), "Clean Code");
        assert_eq!(truncate("Clean Code", 6), "Clean\u{2026}");
        assert_eq!(truncate("Überraschung", 4), "Übe\u{2026}");
        assert_eq!(truncate("abc", 0), "");
    }
}
