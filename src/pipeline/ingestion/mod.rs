// Pipeline ingestion: reading the input files and joining them on the id column

pub mod csv_reader;

pub use csv_reader::{read_csv, read_csv_from, read_input, InputFingerprint, LoadedInput};

use crate::constants::{ID_COLUMN, LEFT_SUFFIX, RIGHT_SUFFIX};
use crate::error::{EtlError, Result};
use crate::metrics::IngestionMetrics;
use crate::types::{ColumnType, Table, Value};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::{info, instrument};

/// Joined table plus provenance of both inputs
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    pub table: Table,
    pub messages: InputFingerprint,
    pub categories: InputFingerprint,
}

/// Read the messages and categories files and inner-join them on `id`
pub fn load_data(messages_path: &Path, categories_path: &Path) -> Result<Table> {
    Ok(load_and_join(messages_path, categories_path, ID_COLUMN)?.table)
}

/// Read both inputs, record their sizes, and inner-join them on `id_column`
#[instrument(skip_all, fields(
    messages = %messages_path.display(),
    categories = %categories_path.display()
))]
pub fn load_and_join(
    messages_path: &Path,
    categories_path: &Path,
    id_column: &str,
) -> Result<LoadOutcome> {
    let messages = read_input(messages_path)?;
    IngestionMetrics::record_rows_read("messages", messages.table.len());
    IngestionMetrics::record_bytes_read("messages", messages.fingerprint.bytes);

    let categories = read_input(categories_path)?;
    IngestionMetrics::record_rows_read("categories", categories.table.len());
    IngestionMetrics::record_bytes_read("categories", categories.fingerprint.bytes);

    let table = inner_join(&messages.table, &categories.table, id_column)?;
    Ok(LoadOutcome {
        table,
        messages: messages.fingerprint,
        categories: categories.fingerprint,
    })
}

/// Inner join on `key`.
///
/// Emits one row per (left row, right row) pair with equal keys, in left
/// order and then right order. The key column appears once; other columns
/// present on both sides get `_x` / `_y` suffixes. Null keys never match, and a
/// key column with no non-null cells simply joins nothing.
pub fn inner_join(left: &Table, right: &Table, key: &str) -> Result<Table> {
    let lk = left.require_column(key)?;
    let rk = right.require_column(key)?;

    let widen = match (left.non_null_type(lk), right.non_null_type(rk)) {
        (None, _) | (_, None) => false,
        (Some(a), Some(b)) if a == b => false,
        (Some(ColumnType::Integer), Some(ColumnType::Real))
        | (Some(ColumnType::Real), Some(ColumnType::Integer)) => true,
        (Some(a), Some(b)) => {
            return Err(EtlError::KeyTypeMismatch {
                key: key.to_string(),
                left: type_label(a),
                right: type_label(b),
            })
        }
    };

    let headers = joined_headers(left.headers(), right.headers(), lk, rk);

    let mut right_index: HashMap<Value, Vec<usize>> = HashMap::new();
    for (i, row) in right.rows().iter().enumerate() {
        let k = join_key(&row[rk], widen);
        if !k.is_null() {
            right_index.entry(k).or_default().push(i);
        }
    }

    let mut rows = Vec::new();
    let mut unmatched_left = 0usize;
    let mut matched_right: HashSet<usize> = HashSet::new();
    for left_row in left.rows() {
        let matches = right_index.get(&join_key(&left_row[lk], widen));
        let Some(matches) = matches else {
            unmatched_left += 1;
            continue;
        };
        for &ri in matches {
            matched_right.insert(ri);
            let right_row = &right.rows()[ri];
            let mut row = Vec::with_capacity(headers.len());
            row.extend(left_row.iter().cloned());
            row.extend(
                right_row
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| *i != rk)
                    .map(|(_, v)| v.clone()),
            );
            rows.push(row);
        }
    }

    let unmatched = unmatched_left + (right.len() - matched_right.len());
    IngestionMetrics::record_join(rows.len(), unmatched);
    info!(
        left_rows = left.len(),
        right_rows = right.len(),
        joined_rows = rows.len(),
        unmatched_rows = unmatched,
        "Joined inputs on '{}'",
        key
    );

    Table::from_rows(headers, rows)
}

fn joined_headers(left: &[String], right: &[String], lk: usize, rk: usize) -> Vec<String> {
    let left_names: HashSet<&str> = left
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != lk)
        .map(|(_, h)| h.as_str())
        .collect();
    let right_names: HashSet<&str> = right
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != rk)
        .map(|(_, h)| h.as_str())
        .collect();

    let mut headers = Vec::with_capacity(left.len() + right.len() - 1);
    for (i, h) in left.iter().enumerate() {
        if i != lk && right_names.contains(h.as_str()) {
            headers.push(format!("{h}{LEFT_SUFFIX}"));
        } else {
            headers.push(h.clone());
        }
    }
    for (i, h) in right.iter().enumerate() {
        if i == rk {
            continue;
        }
        if left_names.contains(h.as_str()) {
            headers.push(format!("{h}{RIGHT_SUFFIX}"));
        } else {
            headers.push(h.clone());
        }
    }
    headers
}

fn join_key(value: &Value, widen: bool) -> Value {
    match value {
        Value::Integer(i) if widen => Value::Real(*i as f64),
        other => other.clone(),
    }
}

fn type_label(ty: ColumnType) -> &'static str {
    match ty {
        ColumnType::Integer => "integer",
        ColumnType::Real => "real",
        ColumnType::Text => "text",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(csv: &str) -> Table {
        read_csv_from(csv.as_bytes()).unwrap()
    }

    #[test]
    fn test_inner_join_keeps_only_shared_ids() {
        let messages = table("id,message\n1,flood\n2,fire\n3,quake\n");
        let categories = table("id,categories\n3,related-1\n1,related-0\n4,related-1\n");

        let joined = inner_join(&messages, &categories, "id").unwrap();

        assert_eq!(joined.headers(), &["id", "message", "categories"]);
        assert_eq!(joined.len(), 2);
        assert_eq!(joined.get(0, "id"), Some(&Value::Integer(1)));
        assert_eq!(joined.get(0, "categories"), Some(&Value::from("related-0")));
        assert_eq!(joined.get(1, "id"), Some(&Value::Integer(3)));
        assert_eq!(joined.get(1, "message"), Some(&Value::from("quake")));
    }

    #[test]
    fn test_repeated_ids_produce_every_pair() {
        let messages = table("id,message\n1,a\n1,b\n");
        let categories = table("id,categories\n1,related-1\n1,related-0\n");

        let joined = inner_join(&messages, &categories, "id").unwrap();

        let pairs: Vec<(String, String)> = joined
            .rows()
            .iter()
            .map(|r| (r[1].to_string(), r[2].to_string()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("a".to_string(), "related-1".to_string()),
                ("a".to_string(), "related-0".to_string()),
                ("b".to_string(), "related-1".to_string()),
                ("b".to_string(), "related-0".to_string()),
            ]
        );
    }

    #[test]
    fn test_overlapping_columns_get_suffixes() {
        let messages = table("id,note,message\n1,m,flood\n");
        let categories = table("id,note,categories\n1,c,related-1\n");

        let joined = inner_join(&messages, &categories, "id").unwrap();

        assert_eq!(
            joined.headers(),
            &["id", "note_x", "message", "note_y", "categories"]
        );
        assert_eq!(joined.get(0, "note_y"), Some(&Value::from("c")));
    }

    #[test]
    fn test_missing_key_column_is_an_error() {
        let messages = table("message\nflood\n");
        let categories = table("id,categories\n1,related-1\n");
        let err = inner_join(&messages, &categories, "id").unwrap_err();
        assert!(matches!(err, EtlError::MissingColumn(c) if c == "id"));
    }

    #[test]
    fn test_text_and_integer_keys_do_not_join() {
        let messages = table("id,message\nx1,flood\n");
        let categories = table("id,categories\n1,related-1\n");
        let err = inner_join(&messages, &categories, "id").unwrap_err();
        assert!(matches!(err, EtlError::KeyTypeMismatch { .. }));
    }

    #[test]
    fn test_integer_and_real_keys_join_numerically() {
        let messages = table("id,message\n1,flood\n");
        let categories = table("id,categories\n1.0,related-1\n");
        let joined = inner_join(&messages, &categories, "id").unwrap();
        assert_eq!(joined.len(), 1);
    }

    #[test]
    fn test_null_keys_never_match() {
        let messages = table("id,message\n,flood\n2,fire\n");
        let categories = table("id,categories\n,related-1\n2,related-0\n");
        let joined = inner_join(&messages, &categories, "id").unwrap();
        assert_eq!(joined.len(), 1);
        assert_eq!(joined.get(0, "message"), Some(&Value::from("fire")));
    }

    #[test]
    fn test_all_null_key_column_joins_nothing() {
        let messages = table("id,message\n,flood\n");
        let categories = table("id,categories\n1,related-1\n");

        let joined = inner_join(&messages, &categories, "id").unwrap();

        assert!(joined.is_empty());
        assert_eq!(joined.headers(), &["id", "message", "categories"]);
    }

    #[test]
    fn test_signed_zero_keys_match() {
        let messages = table("id,message\n-0.0,flood\n");
        let categories = table("id,categories\n0.0,related-1\n");
        assert_eq!(inner_join(&messages, &categories, "id").unwrap().len(), 1);
    }

    #[test]
    fn test_load_data_reads_and_joins_files() {
        let dir = tempfile::tempdir().unwrap();
        let messages = dir.path().join("messages.csv");
        let categories = dir.path().join("categories.csv");
        std::fs::write(&messages, "id,message\n1,flood\n2,fire\n").unwrap();
        std::fs::write(&categories, "id,categories\n2,related-1;request-0\n").unwrap();

        let joined = load_data(&messages, &categories).unwrap();

        assert_eq!(joined.len(), 1);
        assert_eq!(joined.get(0, "message"), Some(&Value::from("fire")));
    }

    #[test]
    fn test_load_and_join_uses_configured_key() {
        let dir = tempfile::tempdir().unwrap();
        let messages = dir.path().join("messages.csv");
        let categories = dir.path().join("categories.csv");
        std::fs::write(&messages, "msg_id,message\n1,flood\n2,fire\n").unwrap();
        std::fs::write(&categories, "msg_id,categories\n1,related-1\n").unwrap();

        let loaded = load_and_join(&messages, &categories, "msg_id").unwrap();

        assert_eq!(loaded.table.len(), 1);
        assert_eq!(loaded.messages.rows, 2);
        assert_eq!(loaded.categories.rows, 1);
    }
}
