//! Table state: the fetched rows plus paging, sorting and local edits.
//!
//! Rows are kept in search-response order and addressed by their position
//! in that order (the row id). Sorting only permutes `order`; edits live in
//! an override map keyed by (row id, column) so fetched records stay as the
//! catalog returned them.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use tracing::{info, warn};

use crate::book::DisplayRow;
use crate::columns::{ColumnKey, SortKey};
use crate::error::{Error, Result};
use crate::open_library_api::CatalogError;

pub const PAGE_SIZES: [usize; 4] = [10, 20, 50, 100];
pub const FETCH_ERROR: &str = "Failed to fetch books. Please try again later.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageSize(usize);

impl PageSize {
    pub fn new(size: usize) -> Result<Self> {
        if PAGE_SIZES.contains(&size) {
            Ok(PageSize(size))
        } else {
            Err(Error::Command(format!(
                "page size must be one of {:?}, got {}",
                PAGE_SIZES, size
            )))
        }
    }

    pub fn get(self) -> usize {
        self.0
    }
}

impl Default for PageSize {
    fn default() -> Self {
        PageSize(PAGE_SIZES[0])
    }
}

impl FromStr for PageSize {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let size = s
            .parse::<usize>()
            .map_err(|_| Error::Command(format!("`{}` is not a page size", s)))?;
        PageSize::new(size)
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SortState {
    pub column: ColumnKey,
    pub direction: SortDirection,
}

#[derive(Debug, Default)]
pub struct ViewState {
    search_term: String,
    loading: bool,
    error: Option<String>,
    rows: Vec<DisplayRow>,
    order: Vec<usize>,
    page_index: usize,
    page_size: PageSize,
    sort: Option<SortState>,
    editing: Option<usize>,
    overrides: HashMap<(usize, ColumnKey), String>,
}

impl ViewState {
    pub fn new(search_term: &str, page_size: PageSize) -> Self {
        ViewState {
            search_term: search_term.to_string(),
            page_size,
            ..Default::default()
        }
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn page_index(&self) -> usize {
        self.page_index
    }

    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    pub fn sort(&self) -> Option<SortState> {
        self.sort
    }

    pub fn editing(&self) -> Option<usize> {
        self.editing
    }

    pub fn row(&self, row_id: usize) -> Option<&DisplayRow> {
        self.rows.get(row_id)
    }

    pub fn begin_search(&mut self, term: &str) {
        self.search_term = term.to_string();
        self.loading = true;
        self.error = None;
    }

    /// Applies the outcome of a search. A failure keeps the previous rows.
    pub fn finish_search(&mut self, result: std::result::Result<Vec<DisplayRow>, CatalogError>) {
        self.loading = false;
        match result {
            Ok(rows) => {
                info!(term = %self.search_term, rows = rows.len(), "row set replaced");
                self.rows = rows;
                self.overrides.clear();
                self.editing = None;
                self.page_index = 0;
                self.apply_sort();
            }
            Err(err) => {
                warn!(term = %self.search_term, error = %err, "failed to fetch books");
                self.error = Some(FETCH_ERROR.to_string());
            }
        }
    }

    /// Cell text as displayed: the local edit if there is one, else the
    /// fetched value.
    pub fn cell(&self, row_id: usize, column: ColumnKey) -> String {
        match self.overrides.get(&(row_id, column)) {
            Some(value) => value.clone(),
            None => self
                .rows
                .get(row_id)
                .map(|row| column.format(row))
                .unwrap_or_default(),
        }
    }

    fn sort_key(&self, row_id: usize, column: ColumnKey) -> SortKey {
        match self.overrides.get(&(row_id, column)) {
            Some(value) => column.sort_key_from_text(value),
            None => column.sort_key(&self.rows[row_id]),
        }
    }

    /// Row ids of the full row set in display order.
    pub fn ordered_rows(&self) -> &[usize] {
        &self.order
    }

    /// Cycles ascending, descending, unsorted on one column.
    pub fn toggle_sort(&mut self, column: ColumnKey) -> Result<Option<SortState>> {
        if !column.column().sortable {
            return Err(Error::Unsortable(column));
        }

        self.sort = match self.sort {
            Some(SortState {
                column: current,
                direction,
            }) if current == column => match direction {
                SortDirection::Ascending => Some(SortState {
                    column,
                    direction: SortDirection::Descending,
                }),
                SortDirection::Descending => None,
            },
            _ => Some(SortState {
                column,
                direction: SortDirection::Ascending,
            }),
        };
        self.apply_sort();
        Ok(self.sort)
    }

    fn apply_sort(&mut self) {
        self.order = (0..self.rows.len()).collect();

        if let Some(sort) = self.sort {
            let keys: Vec<SortKey> = (0..self.rows.len())
                .map(|row_id| self.sort_key(row_id, sort.column))
                .collect();

            // sort_by is stable, so equal keys keep response order
            self.order.sort_by(|&a, &b| {
                let (a, b) = (&keys[a], &keys[b]);
                match (a.is_missing(), b.is_missing()) {
                    (true, true) => Ordering::Equal,
                    (true, false) => Ordering::Greater,
                    (false, true) => Ordering::Less,
                    (false, false) => match sort.direction {
                        SortDirection::Ascending => a.compare(b),
                        SortDirection::Descending => b.compare(a),
                    },
                }
            });
        }

        self.page_index = self.clamp_page(self.page_index);
    }

    pub fn page_count(&self) -> usize {
        let size = self.page_size.get();
        (self.rows.len() + size - 1) / size
    }

    fn clamp_page(&self, page_index: usize) -> usize {
        page_index.min(self.page_count().saturating_sub(1))
    }

    /// Row ids on the visible page.
    pub fn page_rows(&self) -> &[usize] {
        let size = self.page_size.get();
        let start = (self.page_index * size).min(self.order.len());
        let end = (start + size).min(self.order.len());
        &self.order[start..end]
    }

    pub fn can_previous_page(&self) -> bool {
        self.page_index > 0
    }

    pub fn can_next_page(&self) -> bool {
        self.page_index + 1 < self.page_count()
    }

    pub fn next_page(&mut self) {
        if self.can_next_page() {
            self.page_index += 1;
        }
    }

    pub fn previous_page(&mut self) {
        if self.can_previous_page() {
            self.page_index -= 1;
        }
    }

    pub fn goto_page(&mut self, page_index: usize) {
        self.page_index = self.clamp_page(page_index);
    }

    pub fn set_page_size(&mut self, page_size: PageSize) {
        self.page_size = page_size;
        self.page_index = 0;
    }

    /// Puts the row at `position` (zero based) of the visible page into
    /// edit mode and returns its row id.
    pub fn begin_edit(&mut self, position: usize) -> Result<usize> {
        let row_id = *self
            .page_rows()
            .get(position)
            .ok_or(Error::NoSuchRow(position + 1))?;
        self.editing = Some(row_id);
        Ok(row_id)
    }

    pub fn commit_cell(&mut self, column: ColumnKey, value: &str) -> Result<()> {
        let row_id = self.editing.ok_or(Error::NotEditing)?;
        self.overrides.insert((row_id, column), value.to_string());
        Ok(())
    }

    /// Leaves edit mode. The row set is re-sorted only now, so a row being
    /// edited never moves off the visible page.
    pub fn save_edit(&mut self) -> Option<usize> {
        let row_id = self.editing.take();
        if row_id.is_some() && self.sort.is_some() {
            self.apply_sort();
        }
        row_id
    }
}
