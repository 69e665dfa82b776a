use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

pub mod backend;
pub mod config_file;
pub mod controller;
pub mod debounce;
pub mod filter;
pub mod payload;
pub mod render;
pub mod session;
pub mod state;
pub mod stats;
pub mod view;

// Re-export for convenience
pub use backend::{BackendError, CatalogBackend, HttpCatalog};
pub use controller::{Command, Controller, Outcome};
pub use debounce::Debouncer;
pub use filter::{FilterState, QueryPolicy, SortField, SortOrder};
pub use payload::{BookForm, BookPayload, IsbnLookup};
pub use session::Session;
pub use state::{ClientState, FormMode, FormState, ListStatus};
pub use stats::CatalogStats;
pub use view::{CatalogView, Confirm, Notice, NoticeKind};

/// How long a transient notice stays on screen.
pub const NOTICE_TTL: Duration = Duration::from_secs(4);

/// Backend-assigned identifier. The backend may send it as a number or a
/// string; the client only ever compares and displays it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct BookId(String);

impl BookId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<u64> for BookId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl<'de> Deserialize<'de> for BookId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Int(i64),
            Str(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Int(n) => BookId(n.to_string()),
            RawId::Str(s) => BookId(s),
        })
    }
}

/// Lifecycle status of a catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookStatus {
    Available,
    Borrowed,
    Reserved,
    Maintenance,
    /// Anything the client does not know about; rendered like `Available`.
    #[serde(other)]
    Other,
}

impl BookStatus {
    pub const ALL: [BookStatus; 4] = [
        BookStatus::Available,
        BookStatus::Borrowed,
        BookStatus::Reserved,
        BookStatus::Maintenance,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            BookStatus::Available | BookStatus::Other => "Available",
            BookStatus::Borrowed => "Borrowed",
            BookStatus::Reserved => "Reserved",
            BookStatus::Maintenance => "Maintenance",
        }
    }

    /// Wire name, as accepted by the backend.
    pub fn as_str(&self) -> &'static str {
        match self {
            BookStatus::Available | BookStatus::Other => "available",
            BookStatus::Borrowed => "borrowed",
            BookStatus::Reserved => "reserved",
            BookStatus::Maintenance => "maintenance",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL.into_iter().find(|st| st.as_str().eq_ignore_ascii_case(s))
    }
}

/// A catalog record as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub isbn: Option<String>,
    #[serde(default)]
    pub status: Option<BookStatus>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub cover_url: Option<String>,
}

impl Book {
    /// ISBN if present and non-blank.
    pub fn isbn(&self) -> Option<&str> {
        self.isbn.as_deref().filter(|s| !s.trim().is_empty())
    }

    /// Year if present and positive.
    pub fn known_year(&self) -> Option<i32> {
        self.year.filter(|y| *y > 0)
    }
}

/// One page of search results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookPage {
    pub books: Vec<Book>,
    /// Total matches reported by the backend, irrespective of the page limit.
    pub total: u64,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClientError {
    #[error("year range is inverted: {min} is after {max}")]
    InvertedYearRange { min: i32, max: i32 },
    #[error("select a book first")]
    NoSelection,
    #[error("enter an ISBN first")]
    MissingIsbn,
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("year must be a positive whole number, got \"{0}\"")]
    InvalidYear(String),
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl ClientError {
    /// True for errors caught locally before any network call.
    pub fn is_local(&self) -> bool {
        !matches!(self, ClientError::Backend(_))
    }
}

/// Resolved client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Scheme and authority of the backend, e.g. `http://127.0.0.1:8000`.
    pub server_url: String,
    /// Path prefix of the versioned API.
    pub api_base: String,
    pub timeout_secs: u64,
    pub policy: QueryPolicy,
    pub default_sort: SortField,
    pub default_order: SortOrder,
    pub default_limit: u32,
    pub debounce_ms: u64,
}

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_API_BASE: &str = "/api/v1";
pub const ENV_SERVER: &str = "LIBRARIAN_SERVER";
pub const ENV_API_BASE: &str = "LIBRARIAN_API_BASE";

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            timeout_secs: 10,
            policy: QueryPolicy::default(),
            default_sort: SortField::default(),
            default_order: SortOrder::default(),
            default_limit: filter::DEFAULT_LIMIT,
            debounce_ms: debounce::DEFAULT_DEBOUNCE.as_millis() as u64,
        }
    }
}

impl ClientConfig {
    /// Full API root, e.g. `http://127.0.0.1:8000/api/v1`.
    pub fn api_root(&self) -> String {
        let server = self.server_url.trim_end_matches('/');
        let base = self.api_base.trim_matches('/');
        if base.is_empty() {
            server.to_string()
        } else {
            format!("{}/{}", server, base)
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Initial filter state honouring the configured defaults.
    pub fn initial_filters(&self) -> FilterState {
        FilterState {
            sort: self.default_sort,
            order: self.default_order,
            limit: self.default_limit,
            ..FilterState::default()
        }
    }

    /// Overlay `LIBRARIAN_SERVER` and `LIBRARIAN_API_BASE` from the environment.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    pub fn apply_env_from(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(url) = var(ENV_SERVER).filter(|v| !v.trim().is_empty()) {
            self.server_url = url;
        }
        if let Some(base) = var(ENV_API_BASE) {
            self.api_base = base;
        }
    }

    /// Defaults, then config files, then environment.
    pub fn load() -> Self {
        let mut config = Self::default();
        config.apply_file(&config_file::load_config());
        config.apply_env();
        config
    }

    /// Overlay values from an on-disk config file.
    pub fn apply_file(&mut self, file: &config_file::ConfigFile) {
        if let Some(api) = &file.api {
            if let Some(url) = &api.server_url {
                self.server_url = url.clone();
            }
            if let Some(base) = &api.api_base {
                self.api_base = base.clone();
            }
            if let Some(t) = api.timeout_secs {
                self.timeout_secs = t;
            }
        }
        if let Some(f) = &file.filters {
            if let Some(n) = f.min_query_chars {
                self.policy.min_query_chars = n;
            }
            if let Some(v) = f.validate_year_range {
                self.policy.validate_year_range = v;
            }
            if let Some(sort) = f.sort.as_deref().and_then(SortField::parse) {
                self.default_sort = sort;
            }
            if let Some(order) = f.order.as_deref().and_then(SortOrder::parse) {
                self.default_order = order;
            }
            if let Some(limit) = f.limit {
                self.default_limit = limit.max(1);
            }
            if let Some(ms) = f.debounce_ms {
                self.debounce_ms = ms;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn book_id_accepts_numbers_and_strings() {
        let a: Book = serde_json::from_str(r#"{"id": 7, "title": "T", "author": "A"}"#).unwrap();
        let b: Book =
            serde_json::from_str(r#"{"id": "b-7", "title": "T", "author": "A"}"#).unwrap();
        assert_eq!(a.id, BookId::new("7"));
        assert_eq!(b.id.as_str(), "b-7");
    }

    #[test]
    fn book_ignores_unknown_fields_and_defaults_optionals() {
        let book: Book = serde_json::from_str(
            r#"{"id": 1, "title": "T", "author": "A", "created_at": "2024-01-01T00:00:00"}"#,
        )
        .unwrap();
        assert_eq!(book.year, None);
        assert_eq!(book.status, None);
        assert_eq!(book.cover_url, None);
    }

    #[test]
    fn unknown_status_decodes_as_other() {
        let book: Book = serde_json::from_str(
            r#"{"id": 1, "title": "T", "author": "A", "status": "lost"}"#,
        )
        .unwrap();
        assert_eq!(book.status, Some(BookStatus::Other));
        assert_eq!(BookStatus::Other.label(), "Available");
    }

    #[test]
    fn blank_isbn_is_not_an_isbn() {
        let book = Book {
            id: BookId::from(1),
            title: "T".into(),
            author: "A".into(),
            year: Some(0),
            isbn: Some("  ".into()),
            status: None,
            description: None,
            cover_url: None,
        };
        assert_eq!(book.isbn(), None);
        assert_eq!(book.known_year(), None);
    }

    #[test]
    fn api_root_joins_server_and_base() {
        let mut config = ClientConfig::default();
        assert_eq!(config.api_root(), "http://127.0.0.1:8000/api/v1");

        config.server_url = "https://library.example/".into();
        config.api_base = "api/v2/".into();
        assert_eq!(config.api_root(), "https://library.example/api/v2");

        config.api_base = String::new();
        assert_eq!(config.api_root(), "https://library.example");
    }

    #[test]
    fn environment_overrides_server_and_base() {
        let mut config = ClientConfig::default();
        config.apply_env_from(|key| match key {
            ENV_SERVER => Some("http://env:1234".into()),
            ENV_API_BASE => Some("".into()),
            _ => None,
        });
        assert_eq!(config.api_root(), "http://env:1234");

        let mut config = ClientConfig::default();
        config.apply_env_from(|key| (key == ENV_SERVER).then(|| "  ".to_string()));
        assert_eq!(config.server_url, DEFAULT_SERVER_URL);
    }

    #[test]
    fn config_file_overrides_defaults() {
        let file: config_file::ConfigFile = toml::from_str(
            "[api]\nserver_url = \"http://books:9000\"\n\n[filters]\nmin_query_chars = 2\nvalidate_year_range = false\nsort = \"title\"\norder = \"asc\"\nlimit = 50\n",
        )
        .unwrap();
        let mut config = ClientConfig::default();
        config.apply_file(&file);

        assert_eq!(config.server_url, "http://books:9000");
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert_eq!(config.policy.min_query_chars, 2);
        assert!(!config.policy.validate_year_range);

        let filters = config.initial_filters();
        assert_eq!(filters.sort, SortField::Title);
        assert_eq!(filters.order, SortOrder::Asc);
        assert_eq!(filters.limit, 50);
    }
}
