use super::categories::CategorySchema;
use crate::config::CategoryOptions;
use crate::error::{EtlError, Result};
use crate::metrics::CleaningMetrics;
use crate::types::{Table, Value};
use tracing::{info, instrument, warn};

/// Result of cleaning a joined table
#[derive(Debug, Clone)]
pub struct CleanOutcome {
    pub table: Table,
    /// Category columns appended to the table, in order
    pub categories: Vec<String>,
    pub values_remapped: usize,
    pub duplicates_dropped: usize,
}

/// Replace the packed categories column with one integer column per category,
/// then drop exact duplicate rows.
///
/// Category names come from the first row. The new columns are appended after
/// the remaining columns and row order is preserved. Fails with
/// `MissingColumn` when the table has no categories column, so cleaning an
/// already-cleaned table is an error rather than a no-op.
#[instrument(skip_all, fields(rows = table.len(), column = %options.column))]
pub fn clean_data(mut table: Table, options: &CategoryOptions) -> Result<CleanOutcome> {
    let idx = table.require_column(&options.column)?;
    let (_, packed) = table.remove_column(idx);

    let Some(first) = packed.first() else {
        warn!("No rows to derive categories from; dropping the column only");
        return Ok(CleanOutcome {
            table,
            categories: Vec::new(),
            values_remapped: 0,
            duplicates_dropped: 0,
        });
    };

    let schema = CategorySchema::from_packed(&packed_text(first, 0)?, options)?;
    for name in schema.names() {
        if table.column_index(name).is_some() {
            return Err(EtlError::DuplicateColumn(name.clone()));
        }
    }

    let mut columns: Vec<Vec<Value>> = (0..schema.len())
        .map(|_| Vec::with_capacity(packed.len()))
        .collect();
    let mut values_remapped = 0;
    let mut warned_positional = false;
    for (row, cell) in packed.iter().enumerate() {
        let decoded = packed_text(cell, row)
            .and_then(|text| schema.decode(&text, row, options))
            .inspect_err(|e| {
                if matches!(e, EtlError::SchemaMismatch { .. }) {
                    CleaningMetrics::record_schema_error();
                }
            })?;
        if !decoded.names_match && !warned_positional {
            warn!(
                row,
                "Category names differ from the first row; values kept by position"
            );
            warned_positional = true;
        }
        values_remapped += decoded.remapped;
        for (column, value) in columns.iter_mut().zip(decoded.values) {
            column.push(Value::Integer(value));
        }
    }

    for (name, cells) in schema.names().iter().zip(columns) {
        table.append_column(name.clone(), cells)?;
    }

    let duplicates_dropped = table.drop_duplicates();
    CleaningMetrics::record_clean(schema.len(), values_remapped, duplicates_dropped);
    info!(
        categories = schema.len(),
        values_remapped,
        duplicates_dropped,
        rows = table.len(),
        "Cleaned categories"
    );

    Ok(CleanOutcome {
        table,
        categories: schema.names().to_vec(),
        values_remapped,
        duplicates_dropped,
    })
}

fn packed_text(value: &Value, row: usize) -> Result<String> {
    match value {
        Value::Text(s) => Ok(s.clone()),
        Value::Null => Err(EtlError::SchemaMismatch {
            row,
            message: "categories value is missing".to_string(),
        }),
        other => Ok(other.to_string()),
    }
}
