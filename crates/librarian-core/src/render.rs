//! View-models for the result list and the inspector.
//!
//! Everything here is a pure function of [`ClientState`]; front ends only
//! decide how to draw the returned values.

use crate::state::ClientState;
use crate::stats::PLACEHOLDER;
use crate::{Book, BookStatus};

pub const NO_DESCRIPTION: &str = "No description available for this volume.";

/// Trailing marker of a list row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Badge {
    Status(BookStatus),
    Isbn(String),
    None,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRow {
    pub title: String,
    pub author: String,
    pub year: String,
    pub badge: Badge,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cover {
    Image(String),
    Fallback,
}

/// Inspector contents for a selected book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detail {
    pub title: String,
    pub author: String,
    pub year: String,
    pub isbn: String,
    pub id: String,
    pub description: String,
    pub status: BookStatus,
    pub cover: Cover,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inspector {
    Empty,
    Populated(Box<Detail>),
}

impl Inspector {
    pub fn is_populated(&self) -> bool {
        matches!(self, Inspector::Populated(_))
    }
}

fn year_label(book: &Book) -> String {
    book.year
        .filter(|y| *y != 0)
        .map(|y| y.to_string())
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}

fn badge(book: &Book) -> Badge {
    match (book.status, book.isbn()) {
        (Some(status), _) => Badge::Status(status),
        (None, Some(isbn)) => Badge::Isbn(isbn.to_string()),
        (None, None) => Badge::None,
    }
}

pub fn result_label(total: u64) -> String {
    format!("{} results", total)
}

pub fn list_rows(state: &ClientState) -> Vec<ListRow> {
    state
        .books
        .iter()
        .map(|book| ListRow {
            title: book.title.clone(),
            author: book.author.clone(),
            year: year_label(book),
            badge: badge(book),
            active: state.selected_id.as_ref() == Some(&book.id),
        })
        .collect()
}

pub fn detail(book: &Book) -> Detail {
    Detail {
        title: book.title.clone(),
        author: book.author.clone(),
        year: year_label(book),
        isbn: book.isbn().unwrap_or(PLACEHOLDER).to_string(),
        id: format!("#{}", book.id),
        description: book
            .description
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or(NO_DESCRIPTION)
            .to_string(),
        status: book.status.unwrap_or(BookStatus::Available),
        cover: match book.cover_url.as_deref().filter(|u| !u.trim().is_empty()) {
            Some(url) => Cover::Image(url.to_string()),
            None => Cover::Fallback,
        },
    }
}

pub fn inspector(state: &ClientState) -> Inspector {
    match state.selected_book() {
        Some(book) => Inspector::Populated(Box::new(detail(book))),
        None => Inspector::Empty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BookId;

    fn book(id: u64) -> Book {
        Book {
            id: BookId::from(id),
            title: format!("Book {id}"),
            author: "Author".into(),
            year: None,
            isbn: None,
            status: None,
            description: None,
            cover_url: None,
        }
    }

    #[test]
    fn one_row_per_book_with_active_marker() {
        let state = ClientState {
            books: vec![book(1), book(2), book(3)],
            selected_id: Some(BookId::from(2)),
            ..ClientState::default()
        };
        let rows = list_rows(&state);
        assert_eq!(rows.len(), 3);
        assert_eq!(
            rows.iter().map(|r| r.active).collect::<Vec<_>>(),
            [false, true, false]
        );
        assert_eq!(rows[0].year, "-");
    }

    #[test]
    fn status_wins_over_isbn_badge() {
        let mut with_both = book(1);
        with_both.status = Some(BookStatus::Borrowed);
        with_both.isbn = Some("123".into());
        let mut isbn_only = book(2);
        isbn_only.isbn = Some("456".into());

        let state = ClientState {
            books: vec![with_both, isbn_only, book(3)],
            ..ClientState::default()
        };
        let rows = list_rows(&state);
        assert_eq!(rows[0].badge, Badge::Status(BookStatus::Borrowed));
        assert_eq!(rows[1].badge, Badge::Isbn("456".into()));
        assert_eq!(rows[2].badge, Badge::None);
    }

    #[test]
    fn inspector_fills_placeholders() {
        let state = ClientState {
            books: vec![book(5)],
            selected_id: Some(BookId::from(5)),
            ..ClientState::default()
        };
        let Inspector::Populated(d) = inspector(&state) else {
            panic!("expected populated inspector");
        };
        assert_eq!(d.id, "#5");
        assert_eq!(d.year, "-");
        assert_eq!(d.isbn, "-");
        assert_eq!(d.description, NO_DESCRIPTION);
        assert_eq!(d.status, BookStatus::Available);
        assert_eq!(d.cover, Cover::Fallback);
    }

    #[test]
    fn inspector_shows_cover_image_when_present() {
        let mut b = book(5);
        b.cover_url = Some("https://covers.example/5.jpg".into());
        assert_eq!(
            detail(&b).cover,
            Cover::Image("https://covers.example/5.jpg".into())
        );
    }

    #[test]
    fn no_selection_means_empty_inspector() {
        let state = ClientState {
            books: vec![book(1)],
            ..ClientState::default()
        };
        assert_eq!(inspector(&state), Inspector::Empty);
    }

    #[test]
    fn result_label_uses_total() {
        assert_eq!(result_label(42), "42 results");
    }
}
