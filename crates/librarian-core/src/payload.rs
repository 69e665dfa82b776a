//! Create/edit form fields and the JSON bodies built from them.

use serde::{Deserialize, Serialize};

use crate::{Book, BookStatus, ClientError};

/// Raw text of the create/edit form, exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookForm {
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub year: String,
    pub status: String,
    pub description: String,
}

/// Body of POST/PUT requests. Empty optionals are left out of the JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookPayload {
    pub title: String,
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<BookStatus>,
}

/// Metadata returned by the ISBN lookup endpoint. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct IsbnLookup {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub description: Option<String>,
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

impl BookForm {
    /// Populate the form from an existing record (entering edit mode).
    pub fn from_book(book: &Book) -> Self {
        Self {
            isbn: book.isbn.clone().unwrap_or_default(),
            title: book.title.clone(),
            author: book.author.clone(),
            year: book.year.map(|y| y.to_string()).unwrap_or_default(),
            // An unrecognized status stays blank so an edit does not overwrite it.
            status: book
                .status
                .filter(|s| *s != BookStatus::Other)
                .map(|s| s.as_str().to_string())
                .unwrap_or_default(),
            description: book.description.clone().unwrap_or_default(),
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_blank(&self) -> bool {
        *self == Self::default()
    }

    pub fn to_payload(&self) -> Result<BookPayload, ClientError> {
        let title = non_empty(&self.title).ok_or(ClientError::MissingField("title"))?;
        let author = non_empty(&self.author).ok_or(ClientError::MissingField("author"))?;
        let year = match non_empty(&self.year) {
            Some(y) => match y.parse::<i32>() {
                Ok(n) if n > 0 => Some(n),
                _ => return Err(ClientError::InvalidYear(y)),
            },
            None => None,
        };

        Ok(BookPayload {
            title,
            author,
            year,
            isbn: non_empty(&self.isbn),
            description: non_empty(&self.description),
            status: non_empty(&self.status).and_then(|s| BookStatus::parse(&s)),
        })
    }

    /// Fill in what the lookup returned; fields it did not return are kept.
    pub fn apply_lookup(&mut self, found: &IsbnLookup) {
        if let Some(title) = found.title.as_deref().and_then(non_empty) {
            self.title = title;
        }
        if let Some(author) = found.author.as_deref().and_then(non_empty) {
            self.author = author;
        }
        if let Some(year) = found.year.filter(|y| *y != 0) {
            self.year = year.to_string();
        }
        if let Some(description) = found.description.as_deref().and_then(non_empty) {
            self.description = description;
        }
    }
}

/// Records created by the "seed" action.
pub fn sample_books() -> Vec<BookPayload> {
    vec![
        BookPayload {
            title: "Clean Code".into(),
            author: "Robert C. Martin".into(),
            year: Some(2008),
            isbn: Some("0132350882".into()),
            description: None,
            status: Some(BookStatus::Available),
        },
        BookPayload {
            title: "The Pragmatic Programmer".into(),
            author: "Andrew Hunt".into(),
            year: Some(1999),
            isbn: Some("020161622X".into()),
            description: None,
            status: Some(BookStatus::Available),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BookId;

    fn form(title: &str, author: &str, year: &str) -> BookForm {
        BookForm {
            title: title.into(),
            author: author.into(),
            year: year.into(),
            ..BookForm::default()
        }
    }

    #[test]
    fn empty_optionals_are_omitted_from_json() {
        let payload = form("T", "A", "").to_payload().unwrap();
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json, serde_json::json!({"title": "T", "author": "A"}));
    }

    #[test]
    fn year_is_sent_as_a_number() {
        let payload = form("T", "A", " 2020 ").to_payload().unwrap();
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["year"], serde_json::json!(2020));
    }

    #[test]
    fn non_numeric_year_is_rejected() {
        assert_eq!(
            form("T", "A", "MMXX").to_payload(),
            Err(ClientError::InvalidYear("MMXX".into()))
        );
    }

    #[test]
    fn zero_and_negative_years_are_rejected() {
        assert_eq!(
            form("T", "A", "0").to_payload(),
            Err(ClientError::InvalidYear("0".into()))
        );
        assert_eq!(
            form("T", "A", "-44").to_payload(),
            Err(ClientError::InvalidYear("-44".into()))
        );
    }

    #[test]
    fn title_and_author_are_required() {
        assert_eq!(
            form(" ", "A", "").to_payload(),
            Err(ClientError::MissingField("title"))
        );
        assert_eq!(
            form("T", "", "").to_payload(),
            Err(ClientError::MissingField("author"))
        );
    }

    #[test]
    fn status_is_parsed_from_its_wire_name() {
        let mut f = form("T", "A", "");
        f.status = "Borrowed".into();
        assert_eq!(f.to_payload().unwrap().status, Some(BookStatus::Borrowed));
    }

    #[test]
    fn lookup_overwrites_only_returned_fields() {
        let mut f = BookForm {
            isbn: "0132350882".into(),
            title: "draft".into(),
            author: "someone".into(),
            year: "".into(),
            status: "".into(),
            description: "keep me".into(),
        };
        f.apply_lookup(&IsbnLookup {
            title: Some("Clean Code".into()),
            author: None,
            year: Some(2008),
            description: None,
        });
        assert_eq!(f.title, "Clean Code");
        assert_eq!(f.author, "someone");
        assert_eq!(f.year, "2008");
        assert_eq!(f.description, "keep me");
    }

    #[test]
    fn from_book_round_trips_through_payload() {
        let book = Book {
            id: BookId::from(3),
            title: "Dune".into(),
            author: "Frank Herbert".into(),
            year: Some(1965),
            isbn: None,
            status: Some(BookStatus::Reserved),
            description: None,
            cover_url: None,
        };
        let payload = BookForm::from_book(&book).to_payload().unwrap();
        assert_eq!(payload.title, "Dune");
        assert_eq!(payload.year, Some(1965));
        assert_eq!(payload.status, Some(BookStatus::Reserved));
        assert_eq!(payload.isbn, None);
    }

    #[test]
    fn unknown_status_is_not_sent_back_on_edit() {
        let book: Book = serde_json::from_value(serde_json::json!({
            "id": 4,
            "title": "Dune",
            "author": "Frank Herbert",
            "status": "lost"
        }))
        .unwrap();
        assert_eq!(book.status, Some(BookStatus::Other));

        let form = BookForm::from_book(&book);
        assert_eq!(form.status, "");
        let payload = form.to_payload().unwrap();
        assert_eq!(payload.status, None);
        let json = serde_json::to_value(&payload).unwrap();
        assert!(json.get("status").is_none());
    }
}
