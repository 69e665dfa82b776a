use crate::state::ClientState;

/// Placeholder shown where a value is missing.
pub const PLACEHOLDER: &str = "-";

/// Summary figures for the stats strip.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CatalogStats {
    /// Server-reported total, not the number of loaded rows.
    pub total: u64,
    /// Most recent positive year among loaded books.
    pub latest_year: Option<i32>,
    /// Loaded books carrying a non-empty ISBN.
    pub with_isbn: usize,
}

impl CatalogStats {
    pub fn from_state(state: &ClientState) -> Self {
        Self {
            total: state.total,
            latest_year: state.books.iter().filter_map(|b| b.known_year()).max(),
            with_isbn: state.books.iter().filter(|b| b.isbn().is_some()).count(),
        }
    }

    pub fn latest_year_label(&self) -> String {
        self.latest_year
            .map(|y| y.to_string())
            .unwrap_or_else(|| PLACEHOLDER.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Book, BookId};

    fn book(year: Option<i32>, isbn: Option<&str>) -> Book {
        Book {
            id: BookId::from(1),
            title: "T".into(),
            author: "A".into(),
            year,
            isbn: isbn.map(String::from),
            status: None,
            description: None,
            cover_url: None,
        }
    }

    #[test]
    fn latest_year_ignores_missing_and_non_positive() {
        let state = ClientState {
            books: vec![
                book(Some(1999), None),
                book(None, None),
                book(Some(0), None),
                book(Some(2008), None),
                book(Some(-50), None),
            ],
            total: 40,
            ..ClientState::default()
        };
        let stats = CatalogStats::from_state(&state);
        assert_eq!(stats.latest_year, Some(2008));
        assert_eq!(stats.total, 40);
    }

    #[test]
    fn placeholder_when_no_year_qualifies() {
        let state = ClientState {
            books: vec![book(None, None), book(Some(0), None)],
            ..ClientState::default()
        };
        assert_eq!(CatalogStats::from_state(&state).latest_year_label(), "-");
    }

    #[test]
    fn isbn_count_skips_blank_values() {
        let state = ClientState {
            books: vec![
                book(None, Some("0132350882")),
                book(None, Some("")),
                book(None, None),
                book(None, Some("020161622X")),
            ],
            ..ClientState::default()
        };
        assert_eq!(CatalogStats::from_state(&state).with_isbn, 2);
    }
}
