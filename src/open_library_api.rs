use async_trait::async_trait;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    book::{AuthorDetail, BookSummary, SearchResponse},
    query_string,
};

pub const OPEN_LIBRARY_URL: &str = "https://openlibrary.org";
const USER_AGENT: &str = concat!("book_dashboard/", env!("CARGO_PKG_VERSION"));

/// Every upstream failure collapses into one kind: transport errors,
/// non-success statuses and undecodable bodies alike.
#[derive(Debug, Clone, Error)]
pub enum CatalogError {
    #[error("request to {url} failed: {reason}")]
    Network { url: String, reason: String },
}

impl CatalogError {
    fn network(url: &str, err: reqwest::Error) -> Self {
        CatalogError::Network {
            url: url.to_string(),
            reason: err.to_string(),
        }
    }
}

#[async_trait]
pub trait Catalog: Send + Sync {
    async fn search_books(&self, query: &str) -> Result<Vec<BookSummary>, CatalogError>;
    async fn get_author(&self, author_key: &str) -> Result<AuthorDetail, CatalogError>;
}

pub struct OpenLibraryClient {
    http: reqwest::Client,
    base_url: String,
}

impl OpenLibraryClient {
    pub fn new(base_url: &str) -> Result<Self, CatalogError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| CatalogError::network(base_url, e))?;

        Ok(OpenLibraryClient {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        request_url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, CatalogError> {
        debug!(url = %request_url, ?query, "requesting catalog");

        let result: Result<T, reqwest::Error> = async {
            let response = self
                .http
                .get(request_url)
                .query(query)
                .send()
                .await?
                .error_for_status()?;
            response.json::<T>().await
        }
        .await;

        result.map_err(|e| {
            warn!(url = %request_url, error = %e, "catalog request failed");
            CatalogError::network(request_url, e)
        })
    }
}

/// Author keys come bare from search docs (`OL26320A`) but in path form
/// from other endpoints (`/authors/OL26320A`).
fn bare_author_key(author_key: &str) -> &str {
    author_key
        .trim_start_matches('/')
        .trim_start_matches("authors/")
}

#[async_trait]
impl Catalog for OpenLibraryClient {
    async fn search_books(&self, query: &str) -> Result<Vec<BookSummary>, CatalogError> {
        let request_url = format!("{base}/search.json", base = self.base_url);
        let term = query_string(query);

        let response: SearchResponse = self.get_json(&request_url, &[("q", &term)]).await?;
        debug!(
            num_found = response.num_found,
            returned = response.docs.len(),
            "search results"
        );
        Ok(response.docs)
    }

    async fn get_author(&self, author_key: &str) -> Result<AuthorDetail, CatalogError> {
        let request_url = format!(
            "{base}/authors/{key}.json",
            base = self.base_url,
            key = bare_author_key(author_key)
        );
        self.get_json(&request_url, &[]).await
    }
}
