//! Joins search results with their primary author's details.

use futures::future::try_join_all;
use tracing::{debug, info, warn};

use crate::book::{BookSummary, DisplayRow};
use crate::open_library_api::{Catalog, CatalogError};

/// What a failed author lookup does to the batch it belongs to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AuthorFailurePolicy {
    /// One failed lookup fails the whole search.
    #[default]
    Abort,
    /// The affected row keeps "Unknown" author fields.
    Placeholder,
}

async fn resolve_row<C: Catalog + ?Sized>(
    catalog: &C,
    book: BookSummary,
    policy: AuthorFailurePolicy,
) -> Result<DisplayRow, CatalogError> {
    let author_key = match book.primary_author_key() {
        Some(key) => key.to_string(),
        None => {
            debug!(title = %book.title, "no author reference, skipping lookup");
            return Ok(DisplayRow::without_author(book));
        }
    };

    match catalog.get_author(&author_key).await {
        Ok(author) => Ok(DisplayRow::with_author(book, author)),
        Err(err) if policy == AuthorFailurePolicy::Placeholder => {
            warn!(
                author_key = %author_key,
                error = %err,
                "author lookup failed, using placeholder"
            );
            Ok(DisplayRow::without_author(book))
        }
        Err(err) => Err(err),
    }
}

/// Runs one search and resolves every result's author concurrently.
///
/// Rows come back in search-response order. Under
/// [`AuthorFailurePolicy::Abort`] the first failed lookup fails the call and
/// the remaining lookups are dropped.
pub async fn fetch_rows<C: Catalog + ?Sized>(
    catalog: &C,
    term: &str,
    policy: AuthorFailurePolicy,
) -> Result<Vec<DisplayRow>, CatalogError> {
    let books = catalog.search_books(term).await?;
    info!(term = %term, books = books.len(), "resolving authors");

    let rows = try_join_all(
        books
            .into_iter()
            .map(|book| resolve_row(catalog, book, policy)),
    )
    .await?;

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::book::UNKNOWN;
    use crate::open_library_api::fake::{book, FakeCatalog};

    fn trilogy() -> FakeCatalog {
        FakeCatalog::with_books(vec![
            book("The Fellowship of the Ring", Some("OL26320A")),
            book("Untitled Companion", None),
            book("The Lord of the Rings Sketchbook", Some("OL1394865A")),
        ])
        .author("OL26320A", "J.R.R. Tolkien", "3 January 1892", "The Hobbit")
        .author("OL1394865A", "Alan Lee", "20 August 1947", "Faeries")
    }

    #[tokio::test]
    async fn rows_follow_search_order_and_skip_missing_authors() {
        let catalog = trilogy();
        let rows = fetch_rows(&catalog, "the+lord+of+the+rings", AuthorFailurePolicy::Abort)
            .await
            .unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].book.title, "The Fellowship of the Ring");
        assert_eq!(rows[0].author_name, "J.R.R. Tolkien");
        assert_eq!(rows[0].author_birth_date, "3 January 1892");
        assert_eq!(rows[0].author_top_work, "The Hobbit");

        assert_eq!(rows[1].author_name, UNKNOWN);
        assert_eq!(rows[1].author_birth_date, UNKNOWN);
        assert_eq!(rows[1].author_top_work, UNKNOWN);

        assert_eq!(rows[2].author_name, "Alan Lee");
        assert_eq!(rows[2].author_top_work, "Faeries");

        let mut calls = catalog.author_calls();
        calls.sort();
        assert_eq!(calls, vec!["OL1394865A", "OL26320A"]);
    }

    #[tokio::test]
    async fn order_holds_when_lookups_finish_out_of_order() {
        let mut catalog = trilogy();
        catalog
            .delays
            .insert("OL26320A".to_string(), Duration::from_millis(50));

        let rows = fetch_rows(&catalog, "rings", AuthorFailurePolicy::Abort)
            .await
            .unwrap();

        let titles: Vec<_> = rows.iter().map(|r| r.book.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "The Fellowship of the Ring",
                "Untitled Companion",
                "The Lord of the Rings Sketchbook"
            ]
        );
    }

    #[tokio::test]
    async fn lookups_run_concurrently() {
        let mut catalog = trilogy();
        for key in ["OL26320A", "OL1394865A"] {
            catalog
                .delays
                .insert(key.to_string(), Duration::from_millis(200));
        }

        let start = tokio::time::Instant::now();
        fetch_rows(&catalog, "rings", AuthorFailurePolicy::Abort)
            .await
            .unwrap();

        assert!(start.elapsed() < Duration::from_millis(390));
    }

    #[tokio::test]
    async fn failed_search_fails_the_pipeline() {
        let mut catalog = trilogy();
        catalog.search_fails = true;

        let result = fetch_rows(&catalog, "rings", AuthorFailurePolicy::Placeholder).await;

        assert!(result.is_err());
        assert!(catalog.author_calls().is_empty());
    }

    #[tokio::test]
    async fn one_failed_author_aborts_the_batch() {
        let mut catalog = trilogy();
        catalog.failing_authors.insert("OL1394865A".to_string());

        let result = fetch_rows(&catalog, "rings", AuthorFailurePolicy::Abort).await;

        assert!(matches!(result, Err(CatalogError::Network { .. })));
    }

    #[tokio::test]
    async fn placeholder_policy_isolates_the_failed_row() {
        let mut catalog = trilogy();
        catalog.failing_authors.insert("OL1394865A".to_string());

        let rows = fetch_rows(&catalog, "rings", AuthorFailurePolicy::Placeholder)
            .await
            .unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].author_name, "J.R.R. Tolkien");
        assert_eq!(rows[2].author_name, UNKNOWN);
        assert_eq!(rows[2].book.title, "The Lord of the Rings Sketchbook");
    }

    #[tokio::test]
    async fn empty_search_makes_no_author_calls() {
        let catalog = FakeCatalog::default();

        let rows = fetch_rows(&catalog, "zzzz", AuthorFailurePolicy::Abort)
            .await
            .unwrap();

        assert!(rows.is_empty());
        assert!(catalog.author_calls().is_empty());
    }
}
