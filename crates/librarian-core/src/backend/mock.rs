//! In-memory backend for tests and offline demos.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use super::{BackendError, BackendFuture, CatalogBackend};
use crate::payload::{BookPayload, IsbnLookup};
use crate::{Book, BookId, BookPage};

/// A hand-rolled [`CatalogBackend`] that behaves like the REST API.
///
/// Supports:
/// - the collection filters (`q`, `author`, `year_min`, `year_max`, `sort`,
///   `order`, `limit`) with the server-side total,
/// - a canned ISBN lookup table,
/// - per-call latency, either fixed or a sequence consumed by `list` calls,
/// - one-shot failure injection,
/// - call counting via [`call_count()`](MockCatalog::call_count).
pub struct MockCatalog {
    books: Mutex<Vec<Book>>,
    lookups: Mutex<HashMap<String, IsbnLookup>>,
    next_id: AtomicU64,
    delay: Option<Duration>,
    /// Popped from the back, one per `list` call; falls back to `delay`.
    list_delays: Mutex<Vec<Duration>>,
    fail_next: Mutex<Option<BackendError>>,
    list_calls: AtomicUsize,
    call_count: AtomicUsize,
}

impl Default for MockCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl MockCatalog {
    pub fn new() -> Self {
        Self {
            books: Mutex::new(Vec::new()),
            lookups: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            delay: None,
            list_delays: Mutex::new(Vec::new()),
            fail_next: Mutex::new(None),
            list_calls: AtomicUsize::new(0),
            call_count: AtomicUsize::new(0),
        }
    }

    /// Pre-populate the store; ids are assigned in order.
    pub fn with_books(self, payloads: Vec<BookPayload>) -> Self {
        for p in payloads {
            self.insert(&p);
        }
        self
    }

    pub fn with_lookup(self, isbn: &str, found: IsbnLookup) -> Self {
        self.lookups
            .lock()
            .unwrap()
            .insert(isbn.to_string(), found);
        self
    }

    /// Simulated latency for every call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Latencies for successive `list` calls, in call order.
    pub fn with_list_delays(self, mut delays: Vec<Duration>) -> Self {
        delays.reverse();
        *self.list_delays.lock().unwrap() = delays;
        self
    }

    /// Make the next call of any kind fail with `err`.
    pub fn fail_next(&self, err: BackendError) {
        *self.fail_next.lock().unwrap() = Some(err);
    }

    /// How many backend calls were made, of any kind.
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn books(&self) -> Vec<Book> {
        self.books.lock().unwrap().clone()
    }

    fn insert(&self, payload: &BookPayload) -> Book {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let book = Book {
            id: BookId::from(id),
            title: payload.title.clone(),
            author: payload.author.clone(),
            year: payload.year,
            isbn: payload.isbn.clone(),
            status: payload.status,
            description: payload.description.clone(),
            cover_url: None,
        };
        self.books.lock().unwrap().push(book.clone());
        book
    }

    /// Common prologue: count, take injected failure, pick the latency.
    fn begin(&self, is_list: bool) -> (Option<BackendError>, Option<Duration>) {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        let delay = if is_list {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            self.list_delays.lock().unwrap().pop().or(self.delay)
        } else {
            self.delay
        };
        (self.fail_next.lock().unwrap().take(), delay)
    }

    fn not_found() -> BackendError {
        BackendError::Status {
            code: 404,
            detail: Some("Book not found".into()),
        }
    }

    fn search(&self, query: &str) -> BookPage {
        let params: HashMap<String, String> = query
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .map(|(k, v)| {
                let v = urlencoding::decode(v)
                    .map(|c| c.into_owned())
                    .unwrap_or_else(|_| v.to_string());
                (k.to_string(), v)
            })
            .collect();

        let contains = |hay: &str, needle: &str| hay.to_lowercase().contains(&needle.to_lowercase());
        let year_min = params.get("year_min").and_then(|v| v.parse::<i32>().ok());
        let year_max = params.get("year_max").and_then(|v| v.parse::<i32>().ok());

        let books = self.books.lock().unwrap();
        let mut matched: Vec<(usize, Book)> = books
            .iter()
            .enumerate()
            .filter(|(_, b)| match params.get("q") {
                Some(q) => contains(&b.title, q) || contains(&b.author, q),
                None => true,
            })
            .filter(|(_, b)| match params.get("author") {
                Some(a) => contains(&b.author, a),
                None => true,
            })
            .filter(|(_, b)| match (year_min, b.year) {
                (Some(min), Some(y)) => y >= min,
                (Some(_), None) => false,
                (None, _) => true,
            })
            .filter(|(_, b)| match (year_max, b.year) {
                (Some(max), Some(y)) => y <= max,
                (Some(_), None) => false,
                (None, _) => true,
            })
            .map(|(i, b)| (i, b.clone()))
            .collect();

        // Insertion index stands in for created_at.
        match params.get("sort").map(String::as_str) {
            Some("title") => matched.sort_by(|a, b| a.1.title.cmp(&b.1.title)),
            Some("author") => matched.sort_by(|a, b| a.1.author.cmp(&b.1.author)),
            Some("year") => matched.sort_by_key(|(_, b)| b.year),
            _ => matched.sort_by_key(|(i, _)| *i),
        }
        if params.get("order").map(String::as_str) != Some("asc") {
            matched.reverse();
        }

        let total = matched.len() as u64;
        let limit = params
            .get("limit")
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(100);

        BookPage {
            books: matched.into_iter().take(limit).map(|(_, b)| b).collect(),
            total,
        }
    }
}

impl CatalogBackend for MockCatalog {
    fn name(&self) -> &str {
        "mock"
    }

    fn list<'a>(&'a self, query: &'a str) -> BackendFuture<'a, BookPage> {
        let (fail, delay) = self.begin(true);
        Box::pin(async move {
            if let Some(d) = delay {
                tokio::time::sleep(d).await;
            }
            match fail {
                Some(err) => Err(err),
                None => Ok(self.search(query)),
            }
        })
    }

    fn get<'a>(&'a self, id: &'a BookId) -> BackendFuture<'a, Book> {
        let (fail, delay) = self.begin(false);
        Box::pin(async move {
            if let Some(d) = delay {
                tokio::time::sleep(d).await;
            }
            if let Some(err) = fail {
                return Err(err);
            }
            let books = self.books.lock().unwrap();
            books
                .iter()
                .find(|b| &b.id == id)
                .cloned()
                .ok_or_else(Self::not_found)
        })
    }

    fn create<'a>(&'a self, payload: &'a BookPayload) -> BackendFuture<'a, Book> {
        let (fail, delay) = self.begin(false);
        Box::pin(async move {
            if let Some(d) = delay {
                tokio::time::sleep(d).await;
            }
            if let Some(err) = fail {
                return Err(err);
            }
            let duplicate = payload.isbn.as_ref().is_some_and(|isbn| {
                self.books
                    .lock()
                    .unwrap()
                    .iter()
                    .any(|b| b.isbn.as_ref() == Some(isbn))
            });
            if duplicate {
                return Err(BackendError::Status {
                    code: 400,
                    detail: Some("ISBN already exists".into()),
                });
            }
            Ok(self.insert(payload))
        })
    }

    fn update<'a>(&'a self, id: &'a BookId, payload: &'a BookPayload) -> BackendFuture<'a, Book> {
        let (fail, delay) = self.begin(false);
        Box::pin(async move {
            if let Some(d) = delay {
                tokio::time::sleep(d).await;
            }
            if let Some(err) = fail {
                return Err(err);
            }
            let mut books = self.books.lock().unwrap();
            let book = books
                .iter_mut()
                .find(|b| &b.id == id)
                .ok_or_else(Self::not_found)?;
            book.title = payload.title.clone();
            book.author = payload.author.clone();
            book.year = payload.year;
            book.isbn = payload.isbn.clone();
            book.status = payload.status;
            book.description = payload.description.clone();
            Ok(book.clone())
        })
    }

    fn delete<'a>(&'a self, id: &'a BookId) -> BackendFuture<'a, ()> {
        let (fail, delay) = self.begin(false);
        Box::pin(async move {
            if let Some(d) = delay {
                tokio::time::sleep(d).await;
            }
            if let Some(err) = fail {
                return Err(err);
            }
            let mut books = self.books.lock().unwrap();
            let before = books.len();
            books.retain(|b| &b.id != id);
            if books.len() == before {
                return Err(Self::not_found());
            }
            Ok(())
        })
    }

    fn lookup<'a>(&'a self, isbn: &'a str) -> BackendFuture<'a, IsbnLookup> {
        let (fail, delay) = self.begin(false);
        Box::pin(async move {
            if let Some(d) = delay {
                tokio::time::sleep(d).await;
            }
            if let Some(err) = fail {
                return Err(err);
            }
            self.lookups
                .lock()
                .unwrap()
                .get(isbn)
                .cloned()
                .ok_or(BackendError::Status {
                    code: 404,
                    detail: None,
                })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{FilterState, QueryPolicy, SortField, SortOrder, query_string};

    fn payload(title: &str, author: &str, year: Option<i32>) -> BookPayload {
        BookPayload {
            title: title.into(),
            author: author.into(),
            year,
            isbn: None,
            description: None,
            status: None,
        }
    }

    fn seeded() -> MockCatalog {
        MockCatalog::new().with_books(vec![
            payload("Dune", "Frank Herbert", Some(1965)),
            payload("Emma", "Jane Austen", Some(1815)),
            payload("Neuromancer", "William Gibson", Some(1984)),
        ])
    }

    #[tokio::test]
    async fn search_filters_and_reports_total() {
        let mock = seeded();
        let filters = FilterState {
            year_min: Some(1900),
            limit: 1,
            sort: SortField::Year,
            order: SortOrder::Asc,
            ..FilterState::default()
        };
        let page = mock
            .list(&query_string(&filters, &QueryPolicy::default()))
            .await
            .unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.books.len(), 1);
        assert_eq!(page.books[0].title, "Dune");
    }

    #[tokio::test]
    async fn query_matches_title_or_author_case_insensitively() {
        let mock = seeded();
        let page = mock.list("q=AUSTEN&limit=20").await.unwrap();
        assert_eq!(page.books.len(), 1);
        assert_eq!(page.books[0].title, "Emma");
    }

    #[tokio::test]
    async fn default_order_is_newest_first() {
        let page = seeded().list("").await.unwrap();
        assert_eq!(page.books[0].title, "Neuromancer");
    }

    #[tokio::test]
    async fn injected_failure_is_one_shot() {
        let mock = seeded();
        mock.fail_next(BackendError::Transport("boom".into()));
        assert!(mock.list("").await.is_err());
        assert!(mock.list("").await.is_ok());
        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test]
    async fn duplicate_isbn_is_rejected_with_detail() {
        let mock = MockCatalog::new();
        let mut p = payload("A", "B", None);
        p.isbn = Some("1".into());
        mock.create(&p).await.unwrap();
        let err = mock.create(&p).await.unwrap_err();
        assert_eq!(err.detail(), Some("ISBN already exists"));
    }

    #[tokio::test]
    async fn missing_items_are_404() {
        let mock = MockCatalog::new();
        let id = BookId::from(99);
        assert!(mock.get(&id).await.unwrap_err().is_not_found());
        assert!(mock.delete(&id).await.unwrap_err().is_not_found());
        assert!(mock.lookup("nope").await.unwrap_err().is_not_found());
    }
}
