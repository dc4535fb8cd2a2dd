use std::path::PathBuf;

use clap::Parser;

use crate::enrich::AuthorFailurePolicy;
use crate::error::{Error, Result};
use crate::open_library_api::OPEN_LIBRARY_URL;
use crate::table::EXPORT_FILE;
use crate::view::PageSize;

pub const DEFAULT_QUERY: &str = "the+lord+of+the+rings";

/// Terminal dashboard over the Open Library catalog
#[derive(Parser, Debug, Clone)]
#[command(name = "book-dashboard")]
#[command(version)]
pub struct Config {
    /// Catalog base URL
    #[arg(long, default_value = OPEN_LIBRARY_URL, env = "BOOK_DASHBOARD_BASE_URL")]
    pub base_url: String,

    /// Search term loaded when the dashboard first opens
    #[arg(short, long, default_value = DEFAULT_QUERY, env = "BOOK_DASHBOARD_QUERY")]
    pub query: String,

    /// Rows per page: 10, 20, 50 or 100
    #[arg(long, default_value_t = 10, value_parser = parse_page_size)]
    pub page_size: usize,

    /// File written by the `export` command
    #[arg(long, value_name = "FILE", default_value = EXPORT_FILE)]
    pub export_file: PathBuf,

    /// Show "Unknown" for an author whose lookup failed instead of failing the search
    #[arg(long)]
    pub tolerate_author_errors: bool,
}

fn parse_page_size(value: &str) -> std::result::Result<usize, String> {
    value
        .parse::<PageSize>()
        .map(PageSize::get)
        .map_err(|e| e.to_string())
}

impl Default for Config {
    fn default() -> Self {
        Config {
            base_url: OPEN_LIBRARY_URL.to_string(),
            query: DEFAULT_QUERY.to_string(),
            page_size: PageSize::default().get(),
            export_file: PathBuf::from(EXPORT_FILE),
            tolerate_author_errors: false,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        let url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| Error::Config(format!("invalid base url {}: {}", self.base_url, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "base url must be http or https, got {}",
                self.base_url
            )));
        }
        PageSize::new(self.page_size).map_err(|e| Error::Config(e.to_string()))?;
        Ok(())
    }

    pub fn page_size(&self) -> PageSize {
        PageSize::new(self.page_size).unwrap_or_default()
    }

    pub fn author_failure_policy(&self) -> AuthorFailurePolicy {
        if self.tolerate_author_errors {
            AuthorFailurePolicy::Placeholder
        } else {
            AuthorFailurePolicy::Abort
        }
    }
}
