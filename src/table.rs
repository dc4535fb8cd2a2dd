use std::fmt::Write as _;
use std::io;
use std::path::Path;

use csv::Writer;
use tracing::info;

use crate::columns::COLUMNS;
use crate::error::Result;
use crate::view::{SortDirection, ViewState, PAGE_SIZES};

pub const EXPORT_FILE: &str = "books.csv";
const MAX_CELL_WIDTH: usize = 32;

fn fit(cell: &str, width: usize) -> String {
    let length = cell.chars().count();
    if length <= width {
        format!("{}{}", cell, " ".repeat(width - length))
    } else {
        let mut clipped: String = cell.chars().take(width.saturating_sub(1)).collect();
        clipped.push('…');
        clipped
    }
}

fn header_label(view: &ViewState, position: usize) -> String {
    let column = &COLUMNS[position];
    match view.sort() {
        Some(sort) if sort.column == column.key => match sort.direction {
            SortDirection::Ascending => format!("{} ▲", column.label),
            SortDirection::Descending => format!("{} ▼", column.label),
        },
        _ => column.label.to_string(),
    }
}

fn pagination_bar(view: &ViewState) -> String {
    let previous = if view.can_previous_page() {
        "[Previous]"
    } else {
        " Previous "
    };
    let next = if view.can_next_page() {
        "[Next]"
    } else {
        " Next "
    };
    let page_count = view.page_count();
    let current = if page_count == 0 {
        0
    } else {
        view.page_index() + 1
    };
    let sizes = PAGE_SIZES
        .iter()
        .map(|&size| {
            if size == view.page_size().get() {
                format!("[Show {}]", size)
            } else {
                format!("Show {}", size)
            }
        })
        .collect::<Vec<_>>()
        .join(" ");

    format!(
        "{} Page {} of {} {}  {}",
        previous, current, page_count, next, sizes
    )
}

/// Renders the search bar, status, the visible page and the pagination bar.
pub fn render(view: &ViewState) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Search: {}", view.search_term());

    if view.is_loading() {
        out.push_str("Loading...\n");
        return out;
    }
    if let Some(error) = view.error() {
        let _ = writeln!(out, "{}", error);
    }

    let page = view.page_rows();
    let headers: Vec<String> = (0..COLUMNS.len()).map(|i| header_label(view, i)).collect();
    let cells: Vec<Vec<String>> = page
        .iter()
        .map(|&row_id| {
            COLUMNS
                .iter()
                .map(|column| view.cell(row_id, column.key))
                .collect()
        })
        .collect();

    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, header)| {
            cells
                .iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(header.chars().count()))
                .max()
                .unwrap_or(0)
                .min(MAX_CELL_WIDTH)
        })
        .collect();
    let number_width = page.len().to_string().len().max(1);

    let line = |first: &str, row: &[String]| -> String {
        let body = row
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| fit(cell, width))
            .collect::<Vec<_>>()
            .join(" | ");
        format!("{} | {}", fit(first, number_width + 1), body.trim_end())
    };

    let _ = writeln!(out, "{}", line("#", &headers[..]));
    let _ = writeln!(
        out,
        "{}",
        "-".repeat(number_width + 4 + widths.iter().map(|w| w + 3).sum::<usize>())
    );
    for (position, (&row_id, row)) in page.iter().zip(&cells).enumerate() {
        let marker = if view.editing() == Some(row_id) {
            "*"
        } else {
            ""
        };
        let number = format!("{}{}", position + 1, marker);
        let _ = writeln!(out, "{}", line(number.as_str(), &row[..]));
    }
    if page.is_empty() {
        out.push_str("(no books)\n");
    }

    let _ = writeln!(out, "{}", pagination_bar(view));
    out
}

/// Writes every row in display order, not only the visible page.
pub fn export_csv<W: io::Write>(view: &ViewState, writer: W) -> Result<usize> {
    let mut wtr = Writer::from_writer(writer);
    wtr.write_record(COLUMNS.iter().map(|column| column.label))?;
    for &row_id in view.ordered_rows() {
        wtr.write_record(COLUMNS.iter().map(|column| view.cell(row_id, column.key)))?;
    }
    wtr.flush()?;
    Ok(view.ordered_rows().len())
}

pub fn export_file<P: AsRef<Path>>(view: &ViewState, path: P) -> Result<usize> {
    let file = std::fs::File::create(path.as_ref())?;
    let written = export_csv(view, file)?;
    info!(path = %path.as_ref().display(), rows = written, "exported csv");
    Ok(written)
}
