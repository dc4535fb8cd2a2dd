use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::book::{DisplayRow, UNKNOWN};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ColumnKey {
    Title,
    AuthorName,
    FirstPublishYear,
    Subject,
    RatingsAverage,
    AuthorBirthDate,
    AuthorTopWork,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Integer,
    Decimal,
    List,
}

pub struct Column {
    pub key: ColumnKey,
    pub label: &'static str,
    pub sortable: bool,
    pub kind: ColumnKind,
}

/// Display columns, in display and export order.
pub static COLUMNS: [Column; 7] = [
    Column {
        key: ColumnKey::Title,
        label: "Title",
        sortable: true,
        kind: ColumnKind::Text,
    },
    Column {
        key: ColumnKey::AuthorName,
        label: "Author",
        sortable: true,
        kind: ColumnKind::Text,
    },
    Column {
        key: ColumnKey::FirstPublishYear,
        label: "First Publish Year",
        sortable: true,
        kind: ColumnKind::Integer,
    },
    Column {
        key: ColumnKey::Subject,
        label: "Subject",
        sortable: true,
        kind: ColumnKind::List,
    },
    Column {
        key: ColumnKey::RatingsAverage,
        label: "Ratings Average",
        sortable: true,
        kind: ColumnKind::Decimal,
    },
    Column {
        key: ColumnKey::AuthorBirthDate,
        label: "Author Birth Date",
        sortable: true,
        kind: ColumnKind::Text,
    },
    Column {
        key: ColumnKey::AuthorTopWork,
        label: "Author Top Work",
        sortable: true,
        kind: ColumnKind::Text,
    },
];

impl ColumnKey {
    pub fn name(self) -> &'static str {
        match self {
            ColumnKey::Title => "title",
            ColumnKey::AuthorName => "author_name",
            ColumnKey::FirstPublishYear => "first_publish_year",
            ColumnKey::Subject => "subject",
            ColumnKey::RatingsAverage => "ratings_average",
            ColumnKey::AuthorBirthDate => "author_birth_date",
            ColumnKey::AuthorTopWork => "author_top_work",
        }
    }

    pub fn column(self) -> &'static Column {
        // COLUMNS lists every key exactly once, in declaration order
        &COLUMNS[self as usize]
    }

    /// The cell text for this column, before any local edit.
    pub fn format(self, row: &DisplayRow) -> String {
        let book = &row.book;
        match self {
            ColumnKey::Title => book.title.clone(),
            ColumnKey::AuthorName => row.author_name.clone(),
            ColumnKey::FirstPublishYear => book
                .first_publish_year
                .map(|year| year.to_string())
                .unwrap_or_default(),
            ColumnKey::Subject => book
                .subject
                .as_ref()
                .map(|subjects| subjects.join(", "))
                .unwrap_or_default(),
            ColumnKey::RatingsAverage => book
                .ratings_average
                .map(|rating| format!("{:.2}", rating))
                .unwrap_or_default(),
            ColumnKey::AuthorBirthDate => row.author_birth_date.clone(),
            ColumnKey::AuthorTopWork => row.author_top_work.clone(),
        }
    }

    pub fn sort_key(self, row: &DisplayRow) -> SortKey {
        match self {
            ColumnKey::FirstPublishYear => row
                .book
                .first_publish_year
                .map(|year| SortKey::Number(year as f64))
                .unwrap_or(SortKey::Missing),
            ColumnKey::RatingsAverage => row
                .book
                .ratings_average
                .map(SortKey::Number)
                .unwrap_or(SortKey::Missing),
            ColumnKey::AuthorName | ColumnKey::AuthorBirthDate | ColumnKey::AuthorTopWork => {
                let value = self.format(row);
                if value == UNKNOWN {
                    SortKey::Missing
                } else {
                    self.sort_key_from_text(&value)
                }
            }
            _ => self.sort_key_from_text(&self.format(row)),
        }
    }

    /// Sort key for an edited cell, interpreted the way the column would be.
    pub fn sort_key_from_text(self, text: &str) -> SortKey {
        let text = text.trim();
        if text.is_empty() {
            return SortKey::Missing;
        }
        match self.column().kind {
            ColumnKind::Integer | ColumnKind::Decimal => match text.parse::<f64>() {
                Ok(number) if number.is_finite() => SortKey::Number(number),
                _ => SortKey::Text(text.to_lowercase()),
            },
            ColumnKind::Text | ColumnKind::List => SortKey::Text(text.to_lowercase()),
        }
    }
}

impl fmt::Display for ColumnKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ColumnKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        COLUMNS
            .iter()
            .map(|column| column.key)
            .find(|key| key.name() == s)
            .ok_or_else(|| format!("unknown column `{}`", s))
    }
}

/// Comparable value of one cell. Numbers order before text; `Missing` is
/// handled by the caller so it can stay last in either direction.
#[derive(Clone, Debug, PartialEq)]
pub enum SortKey {
    Number(f64),
    Text(String),
    Missing,
}

impl SortKey {
    pub fn is_missing(&self) -> bool {
        matches!(self, SortKey::Missing)
    }

    pub fn compare(&self, other: &SortKey) -> Ordering {
        match (self, other) {
            (SortKey::Number(a), SortKey::Number(b)) => a.total_cmp(b),
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            (SortKey::Number(_), SortKey::Text(_)) => Ordering::Less,
            (SortKey::Text(_), SortKey::Number(_)) => Ordering::Greater,
            (SortKey::Missing, SortKey::Missing) => Ordering::Equal,
            (SortKey::Missing, _) => Ordering::Greater,
            (_, SortKey::Missing) => Ordering::Less,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::{BookSummary, DisplayRow};

    #[test]
    fn columns_are_declared_in_key_order() {
        for (position, column) in COLUMNS.iter().enumerate() {
            assert_eq!(column.key as usize, position);
            assert_eq!(column.key.name().parse::<ColumnKey>(), Ok(column.key));
        }
        assert!("isbn".parse::<ColumnKey>().is_err());
    }

    #[test]
    fn cells_are_formatted_per_column() {
        let row = DisplayRow::without_author(BookSummary {
            title: "The Two Towers".to_string(),
            first_publish_year: Some(1954),
            subject: Some(vec!["Fiction".to_string(), "Middle Earth".to_string()]),
            ratings_average: Some(4.4567),
            author_key: vec![],
        });

        assert_eq!(ColumnKey::Title.format(&row), "The Two Towers");
        assert_eq!(ColumnKey::FirstPublishYear.format(&row), "1954");
        assert_eq!(ColumnKey::Subject.format(&row), "Fiction, Middle Earth");
        assert_eq!(ColumnKey::RatingsAverage.format(&row), "4.46");
        assert_eq!(ColumnKey::AuthorName.format(&row), "Unknown");

        let bare = DisplayRow::without_author(BookSummary::default());
        assert_eq!(ColumnKey::FirstPublishYear.format(&bare), "");
        assert_eq!(ColumnKey::FirstPublishYear.sort_key(&bare), SortKey::Missing);
        assert_eq!(ColumnKey::AuthorName.sort_key(&bare), SortKey::Missing);
        assert_eq!(ColumnKey::AuthorTopWork.sort_key(&bare), SortKey::Missing);
    }

    #[test]
    fn edited_numeric_cells_sort_as_numbers() {
        assert_eq!(
            ColumnKey::FirstPublishYear.sort_key_from_text(" 1937 "),
            SortKey::Number(1937.0)
        );
        assert_eq!(
            ColumnKey::RatingsAverage.sort_key_from_text("n/a"),
            SortKey::Text("n/a".to_string())
        );
        assert_eq!(ColumnKey::Title.sort_key_from_text(""), SortKey::Missing);
        assert_eq!(
            SortKey::Number(2.0).compare(&SortKey::Text("a".to_string())),
            Ordering::Less
        );
    }
}
