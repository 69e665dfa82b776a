use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::app::{App, Focus, FormField, InputMode};
use crate::view::{spinner_char, truncate};

/// The create/edit form. Heading and submit label follow the form mode.
pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let focused = app.focus == Focus::Form;
    let form = &app.dashboard.form;
    let value_width = (area.width as usize).saturating_sub(17);

    let mut lines: Vec<Line> = Vec::new();
    for field in FormField::ALL {
        let current = focused && app.form_field == field;
        let label_style = if current {
            Style::default()
                .fg(theme.active)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.dim)
        };
        let marker = if current { ">" } else { " " };
        let mut spans = vec![Span::styled(
            format!("{marker}{:<13}", field.label()),
            label_style,
        )];

        let text = app.form_text(field);
        if field == FormField::Status && text.is_empty() {
            spans.push(Span::styled("(unset, Enter cycles)", Style::default().fg(theme.dim)));
        } else {
            spans.push(Span::styled(
                truncate(text, value_width),
                Style::default().fg(theme.text),
            ));
        }
        if current && app.input_mode == InputMode::Editing {
            spans.push(Span::styled("\u{2588}", Style::default().fg(theme.active)));
        }
        if field == FormField::Isbn && app.dashboard.lookup_busy {
            spans.push(Span::styled(
                format!(" {} Looking up", spinner_char(app.tick)),
                Style::default().fg(theme.spinner),
            ));
        }
        lines.push(Line::from(spans));
    }

    lines.push(Line::from(""));
    let mut actions = vec![Span::styled(
        format!(" [Ctrl+s] {} ", form.mode.submit_label()),
        Style::default()
            .fg(theme.header_fg)
            .bg(theme.active)
            .add_modifier(Modifier::BOLD),
    )];
    if form.mode.cancel_visible() {
        actions.push(Span::styled("  Esc: cancel", Style::default().fg(theme.dim)));
    }
    lines.push(Line::from(actions));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border_style(focused))
        .title(format!(" {} ", form.mode.heading()));
    f.render_widget(Paragraph::new(lines).block(block), area);
}
