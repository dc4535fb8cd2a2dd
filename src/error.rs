use thiserror::Error;

use crate::columns::ColumnKey;
use crate::open_library_api::CatalogError;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("csv export failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Input line that does not parse as a command
    #[error("invalid command: {0}")]
    Command(String),

    #[error("no row in edit mode, use `edit <row>` first")]
    NotEditing,

    #[error("row {0} is not on the current page")]
    NoSuchRow(usize),

    #[error("column `{0}` cannot be sorted")]
    Unsortable(ColumnKey),

    #[error("not logged in, redirected to {0}")]
    Unauthorized(String),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
