use crate::constants::MISSING_VALUE_MARKERS;
use crate::error::Result;
use crate::types::{ColumnType, Table, Value};
use csv::ReaderBuilder;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Provenance for one input file, reported in the run summary
#[derive(Debug, Clone, Serialize)]
pub struct InputFingerprint {
    pub path: PathBuf,
    pub sha256: String,
    pub bytes: u64,
    pub rows: usize,
}

/// A parsed input file together with its fingerprint
#[derive(Debug, Clone)]
pub struct LoadedInput {
    pub table: Table,
    pub fingerprint: InputFingerprint,
}

/// Read a CSV file, hashing its bytes on the way
pub fn read_input(path: &Path) -> Result<LoadedInput> {
    let bytes = std::fs::read(path)?;
    let sha256 = hex::encode(Sha256::digest(&bytes));
    let table = read_csv_from(bytes.as_slice())?;
    debug!(
        path = %path.display(),
        rows = table.len(),
        columns = table.headers().len(),
        "Read input file"
    );
    let fingerprint = InputFingerprint {
        path: path.to_path_buf(),
        sha256,
        bytes: bytes.len() as u64,
        rows: table.len(),
    };
    Ok(LoadedInput { table, fingerprint })
}

/// Read a CSV file with a header row into a typed table
pub fn read_csv(path: &Path) -> Result<Table> {
    let file = std::fs::File::open(path)?;
    read_csv_from(file)
}

/// Parse CSV text with a header row.
///
/// Records must have as many fields as the header. Missing-value markers
/// become `Null`, and each column is typed as a whole: `Integer` if every
/// non-null cell is an integer, else `Real` if every non-null cell is a finite
/// number, else `Text`.
pub fn read_csv_from<R: Read>(reader: R) -> Result<Table> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(reader);
    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();

    let mut columns: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];
    for record in rdr.records() {
        let record = record?;
        for (column, field) in columns.iter_mut().zip(record.iter()) {
            column.push(if MISSING_VALUE_MARKERS.contains(&field) {
                None
            } else {
                Some(field.to_string())
            });
        }
    }

    let row_count = columns.first().map_or(0, Vec::len);
    let typed: Vec<Vec<Value>> = columns.into_iter().map(type_column).collect();

    let mut rows: Vec<Vec<Value>> = (0..row_count)
        .map(|_| Vec::with_capacity(headers.len()))
        .collect();
    for column in typed {
        for (row, cell) in rows.iter_mut().zip(column) {
            row.push(cell);
        }
    }

    Table::from_rows(headers, rows)
}

fn infer_column_type(cells: &[Option<String>]) -> ColumnType {
    let present = || cells.iter().flatten().map(|s| s.trim());
    if present().all(|s| s.parse::<i64>().is_ok()) {
        ColumnType::Integer
    } else if present().all(|s| s.parse::<f64>().is_ok_and(f64::is_finite)) {
        ColumnType::Real
    } else {
        ColumnType::Text
    }
}

fn type_column(cells: Vec<Option<String>>) -> Vec<Value> {
    let ty = infer_column_type(&cells);
    cells
        .into_iter()
        .map(|cell| match cell {
            None => Value::Null,
            Some(s) => match ty {
                // Parses were checked by infer_column_type
                ColumnType::Integer => s
                    .trim()
                    .parse()
                    .map_or_else(|_| Value::Text(s.clone()), Value::Integer),
                ColumnType::Real => s
                    .trim()
                    .parse()
                    .map_or_else(|_| Value::Text(s.clone()), Value::Real),
                ColumnType::Text => Value::Text(s),
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EtlError;

    #[test]
    fn test_columns_are_typed_as_a_whole() {
        let table = read_csv_from(
            "id,message,score,genre\n\
             1,hello,0.5,direct\n\
             2,42,1,news\n"
                .as_bytes(),
        )
        .unwrap();

        assert_eq!(table.headers(), &["id", "message", "score", "genre"]);
        assert_eq!(table.get(0, "id"), Some(&Value::Integer(1)));
        assert_eq!(table.get(1, "message"), Some(&Value::from("42")));
        assert_eq!(table.get(0, "score"), Some(&Value::Real(0.5)));
        assert_eq!(table.get(1, "score"), Some(&Value::Real(1.0)));
        assert_eq!(table.get(1, "genre"), Some(&Value::from("news")));
    }

    #[test]
    fn test_missing_markers_become_null() {
        let table = read_csv_from("id,original\n1,\n2,NaN\n3,bonjour\n".as_bytes()).unwrap();
        assert_eq!(table.get(0, "original"), Some(&Value::Null));
        assert_eq!(table.get(1, "original"), Some(&Value::Null));
        assert_eq!(table.get(2, "original"), Some(&Value::from("bonjour")));
    }

    #[test]
    fn test_quoted_fields_keep_delimiters() {
        let table =
            read_csv_from("id,message\n7,\"water, food; shelter\"\n".as_bytes()).unwrap();
        assert_eq!(
            table.get(0, "message"),
            Some(&Value::from("water, food; shelter"))
        );
    }

    #[test]
    fn test_ragged_record_is_an_error() {
        let err = read_csv_from("id,message\n1,a,extra\n".as_bytes()).unwrap_err();
        assert!(matches!(err, EtlError::Csv(_)));
    }

    #[test]
    fn test_header_only_file_is_empty_table() {
        let table = read_csv_from("id,categories\n".as_bytes()).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.headers(), &["id", "categories"]);
    }

    #[test]
    fn test_read_input_fingerprints_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("messages.csv");
        std::fs::write(&path, "id,message\n1,flood\n").unwrap();

        let loaded = read_input(&path).unwrap();

        assert_eq!(loaded.fingerprint.rows, 1);
        assert_eq!(loaded.fingerprint.bytes, 19);
        assert_eq!(loaded.fingerprint.sha256.len(), 64);
        assert_eq!(loaded.table.get(0, "message"), Some(&Value::from("flood")));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_csv(&dir.path().join("nope.csv")).unwrap_err();
        assert!(matches!(err, EtlError::Io(_)));
    }
}
