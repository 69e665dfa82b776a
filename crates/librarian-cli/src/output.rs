use std::io::{self, Write};

use librarian_core::render::{Badge, Cover, Detail, Inspector, ListRow};
use librarian_core::stats::CatalogStats;
use librarian_core::{BookStatus, CatalogView, FormState, ListStatus, Notice, NoticeKind};
use owo_colors::OwoColorize;

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

/// Which view-models a command wants printed.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sections {
    pub list: bool,
    pub stats: bool,
    pub inspector: bool,
    pub form: bool,
}

/// [`CatalogView`] that prints to a writer. Records go to `out`, notices to
/// `err`. Error notices are left to the caller, which reports the returned
/// error once.
pub struct TextView<W: Write, E: Write> {
    out: W,
    err: E,
    color: ColorMode,
    sections: Sections,
    io_error: Option<io::Error>,
}

impl TextView<io::Stdout, io::Stderr> {
    pub fn stdio(color: ColorMode, sections: Sections) -> Self {
        Self::new(io::stdout(), io::stderr(), color, sections)
    }
}

impl<W: Write, E: Write> TextView<W, E> {
    pub fn new(out: W, err: E, color: ColorMode, sections: Sections) -> Self {
        Self {
            out,
            err,
            color,
            sections,
            io_error: None,
        }
    }

    /// First write error, if any happened while rendering.
    pub fn finish(self) -> io::Result<()> {
        match self.io_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn record(&mut self, result: io::Result<()>) {
        if let Err(e) = result
            && self.io_error.is_none()
        {
            self.io_error = Some(e);
        }
    }
}

fn status_label(status: BookStatus, color: ColorMode) -> String {
    if !color.enabled() {
        return status.label().to_string();
    }
    match status {
        BookStatus::Available | BookStatus::Other => status.label().green().to_string(),
        BookStatus::Borrowed => status.label().yellow().to_string(),
        BookStatus::Reserved => status.label().cyan().to_string(),
        BookStatus::Maintenance => status.label().red().to_string(),
    }
}

pub fn print_rows(
    w: &mut dyn Write,
    rows: &[ListRow],
    result_label: &str,
    color: ColorMode,
) -> io::Result<()> {
    if color.enabled() {
        writeln!(w, "{}", result_label.bold())?;
    } else {
        writeln!(w, "{}", result_label)?;
    }
    for row in rows {
        let marker = if row.active { ">" } else { " " };
        let badge = match &row.badge {
            Badge::Status(s) => status_label(*s, color),
            Badge::Isbn(isbn) => format!("ISBN {isbn}"),
            Badge::None => String::new(),
        };
        if color.enabled() {
            writeln!(
                w,
                "{} {}  {}  {}  {}",
                marker,
                row.title.bold(),
                row.author.dimmed(),
                row.year,
                badge
            )?;
        } else {
            writeln!(
                w,
                "{} {}  {}  {}  {}",
                marker, row.title, row.author, row.year, badge
            )?;
        }
    }
    Ok(())
}

pub fn print_stats(w: &mut dyn Write, stats: &CatalogStats, color: ColorMode) -> io::Result<()> {
    let line = format!(
        "Total: {}  Latest year: {}  With ISBN: {}",
        stats.total,
        stats.latest_year_label(),
        stats.with_isbn
    );
    if color.enabled() {
        writeln!(w, "{}", line.dimmed())
    } else {
        writeln!(w, "{}", line)
    }
}

pub fn print_detail(w: &mut dyn Write, detail: &Detail, color: ColorMode) -> io::Result<()> {
    if color.enabled() {
        writeln!(w, "{} {}", detail.title.bold(), detail.id.dimmed())?;
    } else {
        writeln!(w, "{} {}", detail.title, detail.id)?;
    }
    writeln!(w, "  Author: {}", detail.author)?;
    writeln!(w, "  Year:   {}", detail.year)?;
    writeln!(w, "  ISBN:   {}", detail.isbn)?;
    writeln!(w, "  Status: {}", status_label(detail.status, color))?;
    if let Cover::Image(url) = &detail.cover {
        writeln!(w, "  Cover:  {}", url)?;
    }
    writeln!(w)?;
    writeln!(w, "  {}", detail.description)?;
    Ok(())
}

pub fn print_form(w: &mut dyn Write, form: &FormState, color: ColorMode) -> io::Result<()> {
    let heading = form.mode.heading();
    if color.enabled() {
        writeln!(w, "{}", heading.bold())?;
    } else {
        writeln!(w, "{}", heading)?;
    }
    let f = &form.fields;
    for (label, value) in [
        ("ISBN", &f.isbn),
        ("Title", &f.title),
        ("Author", &f.author),
        ("Year", &f.year),
        ("Description", &f.description),
    ] {
        if !value.is_empty() {
            writeln!(w, "  {label}: {value}")?;
        }
    }
    Ok(())
}

pub fn print_notice(w: &mut dyn Write, notice: &Notice, color: ColorMode) -> io::Result<()> {
    match (notice.kind, color.enabled()) {
        (NoticeKind::Success, true) => writeln!(w, "{}", notice.message.green()),
        (NoticeKind::Error, true) => writeln!(w, "{}", notice.message.red()),
        (NoticeKind::Info, true) => writeln!(w, "{}", notice.message.cyan()),
        (_, false) => writeln!(w, "{}", notice.message),
    }
}

impl<W: Write, E: Write> CatalogView for TextView<W, E> {
    fn set_loading(&mut self, _loading: bool) {}

    fn render_list(&mut self, rows: &[ListRow], result_label: &str) {
        if self.sections.list {
            let r = print_rows(&mut self.out, rows, result_label, self.color);
            self.record(r);
        }
    }

    fn render_stats(&mut self, stats: &CatalogStats) {
        if self.sections.stats {
            let r = print_stats(&mut self.out, stats, self.color);
            self.record(r);
        }
    }

    fn render_list_status(&mut self, _status: &ListStatus) {}

    fn render_inspector(&mut self, inspector: &Inspector) {
        if !self.sections.inspector {
            return;
        }
        if let Inspector::Populated(detail) = inspector {
            let r = print_detail(&mut self.out, detail, self.color);
            self.record(r);
        }
    }

    fn render_form(&mut self, form: &FormState) {
        if self.sections.form && !form.fields.is_blank() {
            let r = print_form(&mut self.out, form, self.color);
            self.record(r);
        }
    }

    fn set_lookup_busy(&mut self, busy: bool) {
        if busy {
            let r = writeln!(self.err, "Looking up ISBN...");
            self.record(r);
        }
    }

    fn notify(&mut self, notice: Notice) {
        if notice.kind != NoticeKind::Error {
            let r = print_notice(&mut self.err, &notice, self.color);
            self.record(r);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use librarian_core::render;
    use librarian_core::{Book, BookId, ClientState};

    fn book(id: u64, title: &str, status: Option<BookStatus>) -> Book {
        Book {
            id: BookId::from(id),
            title: title.into(),
            author: "Author".into(),
            year: Some(2008),
            isbn: Some("0132350882".into()),
            status,
            description: None,
            cover_url: None,
        }
    }

    fn plain(sections: Sections) -> TextView<Vec<u8>, Vec<u8>> {
        TextView::new(Vec::new(), Vec::new(), ColorMode(false), sections)
    }

    #[test]
    fn list_prints_label_and_marks_selection() {
        let state = ClientState {
            books: vec![book(1, "Clean Code", None), book(2, "Refactoring", Some(BookStatus::Borrowed))],
            total: 12,
            selected_id: Some(BookId::from(2)),
            ..ClientState::default()
        };
        let mut view = plain(Sections {
            list: true,
            ..Sections::default()
        });
        view.render_list(&render::list_rows(&state), &render::result_label(state.total));

        let out = String::from_utf8(view.out.clone()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "12 results");
        assert!(lines[1].starts_with("  Clean Code"));
        assert!(lines[1].ends_with("ISBN 0132350882"));
        assert!(lines[2].starts_with("> Refactoring"));
        assert!(lines[2].ends_with("Borrowed"));
        view.finish().unwrap();
    }

    #[test]
    fn detail_uses_placeholders() {
        let mut b = book(3, "Dune", None);
        b.isbn = None;
        let mut out = Vec::new();
        print_detail(&mut out, &render::detail(&b), ColorMode(false)).unwrap();
        let out = String::from_utf8(out).unwrap();

        assert!(out.starts_with("Dune #3"));
        assert!(out.contains("ISBN:   -"));
        assert!(out.contains("Status: Available"));
        assert!(out.contains(render::NO_DESCRIPTION));
    }

    #[test]
    fn disabled_sections_print_nothing() {
        let mut view = plain(Sections::default());
        view.render_stats(&CatalogStats::default());
        view.render_inspector(&Inspector::Empty);
        assert!(view.out.is_empty());
    }

    #[test]
    fn error_notices_are_left_to_the_caller() {
        let mut view = plain(Sections::default());
        view.notify(Notice::error("boom"));
        view.notify(Notice::success("Book added!"));
        assert_eq!(String::from_utf8(view.err.clone()).unwrap(), "Book added!\n");
    }
}
