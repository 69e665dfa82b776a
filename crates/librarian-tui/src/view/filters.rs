use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use librarian_core::{ListStatus, SortOrder};

use crate::app::{App, FilterField, Focus, InputMode};

/// Filter inputs plus the sort/order/limit selectors.
pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let focused = app.focus == Focus::Filters;
    let mut spans: Vec<Span> = Vec::new();

    for field in FilterField::ALL {
        let current = focused && app.filter_field == field;
        let label_style = if current {
            Style::default()
                .fg(theme.active)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.dim)
        };
        spans.push(Span::styled(format!(" {}: ", field.label()), label_style));
        spans.push(Span::styled(
            app.filter_text(field).to_string(),
            Style::default().fg(theme.text),
        ));
        if current && app.input_mode == InputMode::Editing {
            spans.push(Span::styled("\u{2588}", Style::default().fg(theme.active)));
        }
        spans.push(Span::raw(" "));
    }

    let filters = app.controller.filters();
    let arrow = match filters.order {
        SortOrder::Asc => "\u{2191}",
        SortOrder::Desc => "\u{2193}",
    };
    spans.push(Span::styled(
        format!(
            "\u{2502} {} {} (s/o)  {} per page (l)",
            filters.sort.label(),
            arrow,
            filters.limit
        ),
        Style::default().fg(theme.dim),
    ));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border_style(focused))
        .title(" Filters ");
    f.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

/// One-line summary: result count, stats cards and the list status.
pub fn render_stats(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let d = &app.dashboard;
    let mut spans = vec![
        Span::styled(
            format!(" {}", d.result_label),
            Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
        ),
        Span::styled("  Total ", Style::default().fg(theme.dim)),
        Span::styled(d.stats.total.to_string(), Style::default().fg(theme.text)),
        Span::styled("  Latest year ", Style::default().fg(theme.dim)),
        Span::styled(d.stats.latest_year_label(), Style::default().fg(theme.text)),
        Span::styled("  With ISBN ", Style::default().fg(theme.dim)),
        Span::styled(d.stats.with_isbn.to_string(), Style::default().fg(theme.text)),
    ];
    if let ListStatus::Failed(message) = &d.list_status {
        spans.push(Span::styled(
            format!("  {}", message),
            Style::default().fg(theme.error),
        ));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}
