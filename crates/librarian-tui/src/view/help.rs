use ratatui::Frame;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::theme::Theme;
use crate::view::centered_rect;

/// Render the help overlay as a centered popup.
pub fn render(f: &mut Frame, theme: &Theme) {
    let popup = centered_rect(64, 34, f.area());

    let lines = vec![
        Line::from(Span::styled(" Keyboard Shortcuts ", theme.header_style())),
        Line::from(""),
        section_header("Navigation", theme),
        key_line("Tab / Shift+Tab", "Next / previous pane", theme),
        key_line("j / \u{2193}", "Move down (row or field)", theme),
        key_line("k / \u{2191}", "Move up (row or field)", theme),
        key_line("g / G", "First / last row", theme),
        key_line("Enter", "Select row, type in field", theme),
        key_line("Esc", "Stop typing / cancel edit", theme),
        Line::from(""),
        section_header("Filtering", theme),
        key_line("/", "Type a search", theme),
        key_line("s / o", "Cycle sort key / flip order", theme),
        key_line("l", "Cycle page size", theme),
        key_line("c", "Clear filters", theme),
        key_line("r", "Refresh now", theme),
        Line::from(""),
        section_header("Records", theme),
        key_line("n", "New record", theme),
        key_line("e", "Edit selected record", theme),
        key_line("d / Del", "Delete selected record", theme),
        key_line("Ctrl+s", "Save form", theme),
        key_line("Ctrl+l", "Fill form from ISBN", theme),
        key_line("S", "Create sample books", theme),
        Line::from(""),
        section_header("Global", theme),
        key_line("?", "Toggle this help", theme),
        key_line("q", "Quit", theme),
        key_line("Ctrl+c", "Force quit", theme),
    ];

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.active))
                .title(" Help "),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(Clear, popup);
    f.render_widget(paragraph, popup);
}

fn section_header<'a>(title: &'a str, theme: &Theme) -> Line<'a> {
    Line::from(Span::styled(
        format!("  {title}"),
        Style::default()
            .fg(theme.active)
            .add_modifier(Modifier::BOLD),
    ))
}

fn key_line<'a>(key: &'a str, desc: &'a str, theme: &Theme) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("    {key:<18}"), Style::default().fg(theme.text)),
        Span::styled(desc, Style::default().fg(theme.dim)),
    ])
}
