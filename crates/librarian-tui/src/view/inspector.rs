use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use librarian_core::render::{Cover, Inspector};

use crate::app::App;
use crate::theme::Theme;

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border_style(false))
        .title(" Inspector ");

    let Inspector::Populated(detail) = &app.dashboard.inspector else {
        let empty = Paragraph::new(" Select a book to see its details.")
            .style(Style::default().fg(theme.dim))
            .block(block);
        f.render_widget(empty, area);
        return;
    };

    let mut lines = vec![
        Line::from(vec![
            Span::styled(
                format!(" {}", detail.title),
                Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("  {}", detail.id), Style::default().fg(theme.dim)),
        ]),
        field_line("Author", &detail.author, theme),
        field_line("Year", &detail.year, theme),
        field_line("ISBN", &detail.isbn, theme),
        Line::from(vec![
            Span::styled(format!(" {:<8}", "Status"), Style::default().fg(theme.dim)),
            Span::styled(
                detail.status.label(),
                Style::default().fg(theme.status_color(detail.status)),
            ),
        ]),
    ];
    if let Cover::Image(url) = &detail.cover {
        lines.push(field_line("Cover", url, theme));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!(" {}", detail.description),
        Style::default().fg(theme.text),
    )));

    f.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        area,
    );
}

fn field_line<'a>(label: &'a str, value: &'a str, theme: &Theme) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!(" {label:<8}"), Style::default().fg(theme.dim)),
        Span::styled(value, Style::default().fg(theme.text)),
    ])
}
