use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use arrow::array::Array;
use arrow::util::display::array_value_to_string;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{Dataset, RawRecord};
use super::{check_columns, DataError};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load and clean a game dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row plus one game per line (the Steam export)
/// * `.json`    – `[{ "game_name": ..., "developer": ..., ... }, ...]`
/// * `.parquet` – one column per field, any scalar Arrow type
pub fn load_file(path: &Path) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => Err(DataError::UnsupportedFormat(other.to_string()).into()),
    }
    .with_context(|| format!("loading {}", path.display()))?;

    if dataset.is_empty() {
        log::warn!("{} contains no games", path.display());
    }
    if dataset.duplicates_dropped() > 0 {
        log::warn!(
            "{}: dropped {} duplicate rows",
            path.display(),
            dataset.duplicates_dropped()
        );
    }
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<Dataset> {
    let file = File::open(path).context("opening CSV")?;
    Dataset::from_csv_reader(BufReader::new(file))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "game_name": "Portal 2", "developer": "Valve", "price": 9.99, ... },
///   ...
/// ]
/// ```
///
/// Numbers and strings are both accepted for any cell; the shared cleaning
/// step coerces them.
fn load_json(path: &Path) -> Result<Dataset> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root.as_array().ok_or(DataError::NotAnArray)?;
    if let Some(first) = records.first() {
        let obj = first.as_object().ok_or(DataError::NotAnObject(0))?;
        check_columns(obj.keys().map(String::as_str))?;
    }

    let mut rows = Vec::with_capacity(records.len());
    for (i, rec) in records.iter().enumerate() {
        let obj = rec.as_object().ok_or(DataError::NotAnObject(i))?;
        rows.push(RawRecord::from_cells(|col| obj.get(col).and_then(json_cell)));
    }

    Ok(Dataset::from_raw(rows))
}

fn json_cell(val: &JsonValue) -> Option<String> {
    match val {
        JsonValue::Null => None,
        JsonValue::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file written by Pandas (`df.to_parquet()`) or Polars
/// (`df.write_parquet()`). Every required field must be a column; cells are
/// rendered to text and go through the same coercion as CSV cells.
fn load_parquet(path: &Path) -> Result<Dataset> {
    let file = File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;

    let schema = builder.schema().clone();
    check_columns(schema.fields().iter().map(|f| f.name().as_str()))?;

    let reader = builder.build().context("building parquet reader")?;
    let mut rows = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let batch_schema = batch.schema();

        for row in 0..batch.num_rows() {
            let raw = RawRecord::from_cells(|col| {
                let idx = batch_schema.index_of(col).ok()?;
                parquet_cell(batch.column(idx).as_ref(), row)
            });
            rows.push(raw);
        }
    }

    Ok(Dataset::from_raw(rows))
}

/// Render a single Arrow cell as text, `None` for nulls.
fn parquet_cell(col: &dyn Array, row: usize) -> Option<String> {
    if col.is_null(row) {
        return None;
    }
    match array_value_to_string(col, row) {
        Ok(text) => Some(text),
        Err(e) => {
            log::warn!("Unreadable {:?} cell at row {row}: {e}", col.data_type());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc;

    use arrow::array::{Float64Array, StringArray};
    use arrow::datatypes::{DataType, Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;
    use tempfile::NamedTempFile;

    use super::*;
    use crate::data::model::tests::HEADER;
    use crate::data::model::REQUIRED_COLUMNS;

    /// Helper to create a temp file with the given suffix and content
    fn create_temp(suffix: &str, content: &str) -> NamedTempFile {
        let mut temp_file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        write!(temp_file, "{}", content).unwrap();
        temp_file
    }

    #[test]
    fn loads_csv_file() {
        let content = format!(
            "{HEADER}\nPortal 2,Valve,9.99,98,4.9,5000000,2011-04-18,\"Puzzle,Co-op\",\"Windows, macOS, Linux\",0,9,2,300000\n"
        );
        let file = create_temp(".csv", &content);
        let ds = load_file(file.path()).unwrap();
        assert_eq!(ds.len(), 1);
        let g = &ds.records()[0];
        assert_eq!(g.game_name, "Portal 2");
        assert_eq!(g.release_year, Some(2011));
        assert!(!g.is_free);
    }

    #[test]
    fn missing_file_is_fatal() {
        let err = load_file(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(format!("{err:#}").contains("opening CSV"));
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let file = create_temp(".xlsx", "whatever");
        let err = load_file(file.path()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DataError>(),
            Some(DataError::UnsupportedFormat(ext)) if ext == "xlsx"
        ));
    }

    #[test]
    fn loads_json_records_with_mixed_cell_types() {
        let mut obj = serde_json::Map::new();
        for col in REQUIRED_COLUMNS {
            obj.insert(col.to_string(), JsonValue::Null);
        }
        obj.insert("game_name".into(), "Dota 2".into());
        obj.insert("developer".into(), "Valve".into());
        obj.insert("price".into(), 0.into());
        obj.insert("estimated_downloads".into(), "1000000".into());
        obj.insert("rating".into(), 4.2.into());
        let json = JsonValue::Array(vec![JsonValue::Object(obj)]).to_string();

        let file = create_temp(".json", &json);
        let ds = load_file(file.path()).unwrap();
        let g = &ds.records()[0];
        assert_eq!(g.price, Some(0.0));
        assert!(g.is_free);
        assert_eq!(g.estimated_downloads, Some(1_000_000.0));
        assert_eq!(g.rating, Some(4.2));
        assert_eq!(g.user_defined_tags, "");
        assert_eq!(g.release_year, None);
    }

    #[test]
    fn json_must_be_an_array() {
        let file = create_temp(".json", "{\"game_name\": \"x\"}");
        let err = load_file(file.path()).unwrap_err();
        assert!(matches!(err.downcast_ref::<DataError>(), Some(DataError::NotAnArray)));
    }

    #[test]
    fn loads_parquet_columns() {
        let fields: Vec<Field> = REQUIRED_COLUMNS
            .iter()
            .map(|c| match *c {
                "price" | "rating" | "estimated_downloads" => {
                    Field::new(*c, DataType::Float64, true)
                }
                _ => Field::new(*c, DataType::Utf8, true),
            })
            .collect();
        let schema = Arc::new(Schema::new(fields));
        let columns: Vec<Arc<dyn Array>> = REQUIRED_COLUMNS
            .iter()
            .map(|c| -> Arc<dyn Array> {
                match *c {
                    "game_name" => Arc::new(StringArray::from(vec![Some("A"), Some("B")])),
                    "developer" => Arc::new(StringArray::from(vec![Some("S"), Some("S")])),
                    "release_date" => {
                        Arc::new(StringArray::from(vec![Some("2019-05-01"), None]))
                    }
                    "price" => Arc::new(Float64Array::from(vec![Some(0.0), Some(19.99)])),
                    "rating" => Arc::new(Float64Array::from(vec![Some(4.0), None])),
                    "estimated_downloads" => {
                        Arc::new(Float64Array::from(vec![Some(100.0), Some(200.0)]))
                    }
                    _ => Arc::new(StringArray::from(vec![None::<&str>, None])),
                }
            })
            .collect();
        let batch = RecordBatch::try_new(schema.clone(), columns).unwrap();

        let file = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
        let mut writer = ArrowWriter::try_new(file.reopen().unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let ds = load_file(file.path()).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records()[0].release_year, Some(2019));
        assert!(ds.records()[0].is_free);
        assert_eq!(ds.records()[1].price, Some(19.99));
        assert_eq!(ds.records()[1].rating, None);
    }
}
