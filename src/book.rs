
use serde::Deserialize;
use serde::Serialize;

pub const UNKNOWN: &str = "Unknown";

/// One entry of the `docs` array returned by `search.json`.
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
pub struct BookSummary {
    #[serde(default)]
    pub title: String,
    pub first_publish_year: Option<i64>,
    pub subject: Option<Vec<String>>,
    pub ratings_average: Option<f64>,
    #[serde(default)]
    pub author_key: Vec<String>,
}

impl BookSummary {
    pub fn primary_author_key(&self) -> Option<&str> {
        self.author_key
            .first()
            .map(String::as_str)
            .filter(|key| !key.is_empty())
    }
}

#[derive(Deserialize, Debug)]
pub struct SearchResponse {
    #[serde(rename = "numFound", default)]
    pub num_found: u64,
    #[serde(default)]
    pub docs: Vec<BookSummary>,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
pub struct AuthorDetail {
    pub name: Option<String>,
    pub birth_date: Option<String>,
    pub top_work: Option<String>,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct DisplayRow {
    pub book: BookSummary,
    pub author_name: String,
    pub author_birth_date: String,
    pub author_top_work: String,
}

impl DisplayRow {
    pub fn without_author(book: BookSummary) -> Self {
        DisplayRow {
            book,
            author_name: UNKNOWN.to_string(),
            author_birth_date: UNKNOWN.to_string(),
            author_top_work: UNKNOWN.to_string(),
        }
    }

    pub fn with_author(book: BookSummary, author: AuthorDetail) -> Self {
        let or_unknown = |value: Option<String>| value.unwrap_or_else(|| UNKNOWN.to_string());
        DisplayRow {
            book,
            author_name: or_unknown(author.name),
            author_birth_date: or_unknown(author.birth_date),
            author_top_work: or_unknown(author.top_work),
        }
    }
}
