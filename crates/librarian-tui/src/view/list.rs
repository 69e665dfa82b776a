use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState};

use librarian_core::render::Badge;

use crate::app::{App, Focus};
use crate::view::truncate;

/// Render the result list and remember where it was drawn for mouse hits.
pub fn render(f: &mut Frame, area: Rect, app: &mut App) {
    let theme = &app.theme;
    let focused = app.focus == Focus::List;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border_style(focused))
        .title(" Books ");

    if app.dashboard.rows.is_empty() {
        let msg = if app.dashboard.loading {
            " Loading..."
        } else {
            " No books match. Press n to add one or S to load samples."
        };
        f.render_widget(
            Paragraph::new(msg)
                .style(Style::default().fg(theme.dim))
                .block(block),
            area,
        );
        app.last_list_area = Some(area);
        app.list_offset = 0;
        return;
    }

    let title_width = (area.width as usize).saturating_sub(42).max(10);
    let rows: Vec<Row> = app
        .dashboard
        .rows
        .iter()
        .map(|row| {
            let (badge, badge_style) = match &row.badge {
                Badge::Status(s) => (s.label().to_string(), Style::default().fg(theme.status_color(*s))),
                Badge::Isbn(isbn) => (format!("ISBN {isbn}"), Style::default().fg(theme.dim)),
                Badge::None => (String::new(), Style::default()),
            };
            let title_style = if row.active {
                Style::default()
                    .fg(theme.active)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme.text)
            };
            Row::new(vec![
                Cell::from(truncate(&row.title, title_width)).style(title_style),
                Cell::from(truncate(&row.author, 18)).style(Style::default().fg(theme.dim)),
                Cell::from(row.year.clone()),
                Cell::from(badge).style(badge_style),
            ])
        })
        .collect();

    let widths = [
        Constraint::Min(10),
        Constraint::Length(18),
        Constraint::Length(5),
        Constraint::Length(18),
    ];
    let table = Table::new(rows, widths)
        .block(block)
        .row_highlight_style(theme.highlight_style());

    let mut state = TableState::default();
    state.select(Some(app.dashboard.cursor));
    f.render_stateful_widget(table, area, &mut state);

    app.last_list_area = Some(area);
    app.list_offset = state.offset();
}
