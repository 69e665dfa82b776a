//! Filter state and its translation into collection query parameters.

use crate::ClientError;

pub const DEFAULT_LIMIT: u32 = 20;

/// Page sizes offered by the limit selector.
pub const LIMIT_CHOICES: [u32; 4] = [10, 20, 50, 100];

/// Column the backend sorts by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    CreatedAt,
    Title,
    Author,
    Year,
}

impl SortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::CreatedAt => "created_at",
            SortField::Title => "title",
            SortField::Author => "author",
            SortField::Year => "year",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortField::CreatedAt => "Added",
            SortField::Title => "Title",
            SortField::Author => "Author",
            SortField::Year => "Year",
        }
    }

    pub fn next(self) -> Self {
        match self {
            SortField::CreatedAt => SortField::Title,
            SortField::Title => SortField::Author,
            SortField::Author => SortField::Year,
            SortField::Year => SortField::CreatedAt,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "created_at" | "created" | "added" => Some(SortField::CreatedAt),
            "title" => Some(SortField::Title),
            "author" => Some(SortField::Author),
            "year" => Some(SortField::Year),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Some(SortOrder::Asc),
            "desc" => Some(SortOrder::Desc),
            _ => None,
        }
    }
}

/// User-chosen search, sort and pagination parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    pub query: String,
    pub author: String,
    pub year_min: Option<i32>,
    pub year_max: Option<i32>,
    pub sort: SortField,
    pub order: SortOrder,
    pub limit: u32,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            query: String::new(),
            author: String::new(),
            year_min: None,
            year_max: None,
            sort: SortField::default(),
            order: SortOrder::default(),
            limit: DEFAULT_LIMIT,
        }
    }
}

impl FilterState {
    /// Reset the search criteria, keeping sort, order and limit.
    pub fn clear_criteria(&mut self) {
        self.query.clear();
        self.author.clear();
        self.year_min = None;
        self.year_max = None;
    }

    /// Both bounds set and minimum after maximum.
    pub fn inverted_year_range(&self) -> Option<(i32, i32)> {
        match (self.year_min, self.year_max) {
            (Some(min), Some(max)) if min > max => Some((min, max)),
            _ => None,
        }
    }

    pub fn apply(&mut self, change: FilterChange) {
        match change {
            FilterChange::Query(q) => self.query = q,
            FilterChange::Author(a) => self.author = a,
            FilterChange::YearMin(y) => self.year_min = y,
            FilterChange::YearMax(y) => self.year_max = y,
            FilterChange::Sort(s) => self.sort = s,
            FilterChange::Order(o) => self.order = o,
            FilterChange::Limit(l) => self.limit = l.max(1),
        }
    }
}

/// A single edit to the filter state, as produced by one input control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterChange {
    Query(String),
    Author(String),
    YearMin(Option<i32>),
    YearMax(Option<i32>),
    Sort(SortField),
    Order(SortOrder),
    Limit(u32),
}

impl FilterChange {
    /// Free-text inputs are debounced; selects apply immediately.
    pub fn is_text(&self) -> bool {
        matches!(self, FilterChange::Query(_) | FilterChange::Author(_))
    }
}

/// Knobs that differ between dashboard variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryPolicy {
    /// Minimum trimmed length before the free-text query is sent.
    pub min_query_chars: usize,
    /// Refuse to fetch when `year_min > year_max`.
    pub validate_year_range: bool,
}

impl Default for QueryPolicy {
    fn default() -> Self {
        Self {
            min_query_chars: 1,
            validate_year_range: true,
        }
    }
}

impl QueryPolicy {
    pub fn check(&self, filters: &FilterState) -> Result<(), ClientError> {
        if self.validate_year_range
            && let Some((min, max)) = filters.inverted_year_range()
        {
            return Err(ClientError::InvertedYearRange { min, max });
        }
        Ok(())
    }
}

/// Next entry of [`LIMIT_CHOICES`] after `current`, wrapping around.
pub fn next_limit(current: u32) -> u32 {
    LIMIT_CHOICES
        .iter()
        .copied()
        .find(|l| *l > current)
        .unwrap_or(LIMIT_CHOICES[0])
}

/// Query parameters for the collection endpoint, in wire order.
pub fn build_query(filters: &FilterState, policy: &QueryPolicy) -> Vec<(&'static str, String)> {
    let mut params = Vec::with_capacity(7);

    let q = filters.query.trim();
    if !q.is_empty() && q.chars().count() >= policy.min_query_chars {
        params.push(("q", q.to_string()));
    }
    let author = filters.author.trim();
    if !author.is_empty() {
        params.push(("author", author.to_string()));
    }
    if let Some(y) = filters.year_min.filter(|y| *y != 0) {
        params.push(("year_min", y.to_string()));
    }
    if let Some(y) = filters.year_max.filter(|y| *y != 0) {
        params.push(("year_max", y.to_string()));
    }
    params.push(("limit", filters.limit.to_string()));
    params.push(("sort", filters.sort.as_str().to_string()));
    params.push(("order", filters.order.as_str().to_string()));

    params
}

/// Percent-encoded query string (without the leading `?`).
pub fn query_string(filters: &FilterState, policy: &QueryPolicy) -> String {
    build_query(filters, policy)
        .iter()
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}
