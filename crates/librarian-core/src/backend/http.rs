use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use super::{
    BackendError, BackendFuture, CatalogBackend, TOTAL_COUNT_HEADER, error_detail, parse_total,
};
use crate::payload::{BookPayload, IsbnLookup};
use crate::{Book, BookId, BookPage, ClientConfig};

/// [`CatalogBackend`] talking to the REST API over HTTP.
pub struct HttpCatalog {
    client: reqwest::Client,
    /// API root without trailing slash, e.g. `http://host/api/v1`.
    root: String,
    timeout: Duration,
}

impl HttpCatalog {
    pub fn new(root: impl Into<String>, timeout: Duration) -> Self {
        Self::with_client(reqwest::Client::new(), root, timeout)
    }

    pub fn with_client(client: reqwest::Client, root: impl Into<String>, timeout: Duration) -> Self {
        let root = root.into().trim_end_matches('/').to_string();
        Self {
            client,
            root,
            timeout,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.api_root(), config.timeout())
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    fn collection_url(&self) -> String {
        format!("{}/books/", self.root)
    }

    fn item_url(&self, id: &BookId) -> String {
        format!("{}/books/{}", self.root, urlencoding::encode(id.as_str()))
    }

    fn lookup_url(&self, isbn: &str) -> String {
        format!("{}/books/lookup/{}", self.root, urlencoding::encode(isbn))
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client
            .request(method, url)
            .header("Accept", "application/json")
            .timeout(self.timeout)
    }

    async fn send(&self, req: RequestBuilder) -> Result<Response, BackendError> {
        let resp = req
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let body = resp.text().await.unwrap_or_default();
        Err(BackendError::Status {
            code: status.as_u16(),
            detail: error_detail(&body),
        })
    }

    async fn json<T: DeserializeOwned>(resp: Response) -> Result<T, BackendError> {
        resp.json::<T>()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))
    }
}

impl CatalogBackend for HttpCatalog {
    fn name(&self) -> &str {
        "http"
    }

    fn list<'a>(&'a self, query: &'a str) -> BackendFuture<'a, BookPage> {
        Box::pin(async move {
            let url = if query.is_empty() {
                self.collection_url()
            } else {
                format!("{}?{}", self.collection_url(), query)
            };
            let resp = self.send(self.request(Method::GET, &url)).await?;

            let header = resp
                .headers()
                .get(TOTAL_COUNT_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(String::from);
            let books: Vec<Book> = Self::json(resp).await?;
            let total = parse_total(header.as_deref(), books.len());

            Ok(BookPage { books, total })
        })
    }

    fn get<'a>(&'a self, id: &'a BookId) -> BackendFuture<'a, Book> {
        Box::pin(async move {
            let resp = self
                .send(self.request(Method::GET, &self.item_url(id)))
                .await?;
            Self::json(resp).await
        })
    }

    fn create<'a>(&'a self, payload: &'a BookPayload) -> BackendFuture<'a, Book> {
        Box::pin(async move {
            let req = self
                .request(Method::POST, &self.collection_url())
                .json(payload);
            Self::json(self.send(req).await?).await
        })
    }

    fn update<'a>(&'a self, id: &'a BookId, payload: &'a BookPayload) -> BackendFuture<'a, Book> {
        Box::pin(async move {
            let req = self.request(Method::PUT, &self.item_url(id)).json(payload);
            Self::json(self.send(req).await?).await
        })
    }

    fn delete<'a>(&'a self, id: &'a BookId) -> BackendFuture<'a, ()> {
        Box::pin(async move {
            self.send(self.request(Method::DELETE, &self.item_url(id)))
                .await?;
            Ok(())
        })
    }

    fn lookup<'a>(&'a self, isbn: &'a str) -> BackendFuture<'a, IsbnLookup> {
        Box::pin(async move {
            let resp = self
                .send(self.request(Method::GET, &self.lookup_url(isbn)))
                .await?;
            Self::json(resp).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_are_built_from_root() {
        let http = HttpCatalog::new("http://localhost:8000/api/v1/", Duration::from_secs(1));
        assert_eq!(http.root(), "http://localhost:8000/api/v1");
        assert_eq!(http.collection_url(), "http://localhost:8000/api/v1/books/");
        assert_eq!(
            http.item_url(&BookId::from(12)),
            "http://localhost:8000/api/v1/books/12"
        );
        assert_eq!(
            http.lookup_url("978 0"),
            "http://localhost:8000/api/v1/books/lookup/978%200"
        );
    }

    #[test]
    fn from_config_uses_api_root() {
        let config = ClientConfig {
            server_url: "http://books.local".into(),
            ..ClientConfig::default()
        };
        assert_eq!(
            HttpCatalog::from_config(&config).root(),
            "http://books.local/api/v1"
        );
    }
}
