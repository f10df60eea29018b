/// Data layer: core types, loading, and filtering.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Vec<RawRecord>
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ Dataset   │  coerce, dedupe, derive → Vec<GameRecord>
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  sidebar predicates → FilteredView
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;

use thiserror::Error;

use model::REQUIRED_COLUMNS;

/// Structural problems with a source file. Cell-level problems never end up
/// here: they are coerced to null instead.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),
    #[error("source is missing required column '{0}'")]
    MissingColumn(&'static str),
    #[error("expected a top-level JSON array of records")]
    NotAnArray,
    #[error("row {0} is not a JSON object")]
    NotAnObject(usize),
}

/// Verify that every required column is present among `columns`.
pub fn check_columns<'a>(columns: impl IntoIterator<Item = &'a str>) -> Result<(), DataError> {
    let present: Vec<&str> = columns.into_iter().collect();
    match REQUIRED_COLUMNS.iter().copied().find(|c| !present.contains(c)) {
        Some(missing) => Err(DataError::MissingColumn(missing)),
        None => Ok(()),
    }
}
