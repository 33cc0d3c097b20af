use crate::error::{EtlError, Result};
use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A single cell in a table
///
/// Equality and hashing are total: `Null == Null`, and reals compare by bit
/// pattern (with both zeros equal), so rows can be used as join keys and
/// deduplicated.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Integer(_) => "integer",
            Value::Real(_) => "real",
            Value::Text(_) => "text",
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Real(a), Value::Real(b)) => real_bits(*a) == real_bits(*b),
            (Value::Text(a), Value::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Null => {}
            Value::Integer(v) => v.hash(state),
            Value::Real(v) => real_bits(*v).hash(state),
            Value::Text(s) => s.hash(state),
        }
    }
}

/// Bit pattern used for real equality; `-0.0` folds into `0.0`
fn real_bits(v: f64) -> u64 {
    if v == 0.0 {
        0.0f64.to_bits()
    } else {
        v.to_bits()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Integer(v) => write!(f, "{v}"),
            Value::Real(v) => write!(f, "{v}"),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

/// Storage class of a whole column, derived from its non-null cells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Real,
    Text,
}

impl ColumnType {
    pub fn sql_name(self) -> &'static str {
        match self {
            ColumnType::Integer => "INTEGER",
            ColumnType::Real => "REAL",
            ColumnType::Text => "TEXT",
        }
    }
}

/// In-memory table: ordered headers plus rows with one cell per header
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Result<Self> {
        let mut seen = HashSet::new();
        for header in &headers {
            if !seen.insert(header.as_str()) {
                return Err(EtlError::DuplicateColumn(header.clone()));
            }
        }
        Ok(Self {
            headers,
            rows: Vec::new(),
        })
    }

    /// Build a table from headers and rows, checking every row's width
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Self> {
        let mut table = Self::new(headers)?;
        for row in rows {
            table.push_row(row)?;
        }
        Ok(table)
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| EtlError::MissingColumn(name.to_string()))
    }

    /// Cell lookup by row index and column name
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row).map(|r| &r[idx])
    }

    pub fn push_row(&mut self, row: Vec<Value>) -> Result<()> {
        if row.len() != self.headers.len() {
            return Err(EtlError::SchemaMismatch {
                row: self.rows.len(),
                message: format!(
                    "expected {} cells, found {}",
                    self.headers.len(),
                    row.len()
                ),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    /// Remove a column, returning its cells in row order
    pub fn remove_column(&mut self, idx: usize) -> (String, Vec<Value>) {
        let name = self.headers.remove(idx);
        let cells = self.rows.iter_mut().map(|row| row.remove(idx)).collect();
        (name, cells)
    }

    /// Append a column; `cells` must hold one value per row
    pub fn append_column(&mut self, name: String, cells: Vec<Value>) -> Result<()> {
        if self.headers.iter().any(|h| *h == name) {
            return Err(EtlError::DuplicateColumn(name));
        }
        if cells.len() != self.rows.len() {
            return Err(EtlError::SchemaMismatch {
                row: cells.len().min(self.rows.len()),
                message: format!(
                    "column '{}' has {} cells for {} rows",
                    name,
                    cells.len(),
                    self.rows.len()
                ),
            });
        }
        self.headers.push(name);
        for (row, cell) in self.rows.iter_mut().zip(cells) {
            row.push(cell);
        }
        Ok(())
    }

    /// Drop rows equal in every column to an earlier row.
    ///
    /// Keeps first occurrences in their original order and returns the
    /// number of rows removed.
    pub fn drop_duplicates(&mut self) -> usize {
        let before = self.rows.len();
        let mut seen: HashSet<Vec<Value>> = HashSet::with_capacity(before);
        self.rows.retain(|row| seen.insert(row.clone()));
        before - self.rows.len()
    }

    /// Storage class for a column. All-null columns are `Text`.
    pub fn column_type(&self, idx: usize) -> ColumnType {
        self.non_null_type(idx).unwrap_or(ColumnType::Text)
    }

    /// Storage class of a column's non-null cells, `None` when every cell is null
    pub fn non_null_type(&self, idx: usize) -> Option<ColumnType> {
        let mut ty: Option<ColumnType> = None;
        for row in &self.rows {
            let cell_ty = match &row[idx] {
                Value::Null => continue,
                Value::Integer(_) => ColumnType::Integer,
                Value::Real(_) => ColumnType::Real,
                Value::Text(_) => ColumnType::Text,
            };
            ty = Some(match (ty, cell_ty) {
                (None, t) => t,
                (Some(a), b) if a == b => a,
                (Some(ColumnType::Integer), ColumnType::Real)
                | (Some(ColumnType::Real), ColumnType::Integer) => ColumnType::Real,
                _ => return Some(ColumnType::Text),
            });
        }
        ty
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_drop_duplicates_keeps_first_occurrence_in_order() {
        let mut table = Table::from_rows(
            headers(&["id", "message"]),
            vec![
                vec![Value::Integer(2), "b".into()],
                vec![Value::Integer(1), "a".into()],
                vec![Value::Integer(2), "b".into()],
                vec![Value::Integer(1), "c".into()],
            ],
        )
        .unwrap();

        let removed = table.drop_duplicates();

        assert_eq!(removed, 1);
        assert_eq!(
            table.rows(),
            &[
                vec![Value::Integer(2), Value::from("b")],
                vec![Value::Integer(1), Value::from("a")],
                vec![Value::Integer(1), Value::from("c")],
            ]
        );
    }

    #[test]
    fn test_nulls_compare_equal_for_dedup() {
        let mut table = Table::from_rows(
            headers(&["id", "original"]),
            vec![
                vec![Value::Integer(1), Value::Null],
                vec![Value::Integer(1), Value::Null],
            ],
        )
        .unwrap();
        assert_eq!(table.drop_duplicates(), 1);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_rejects_duplicate_headers() {
        let err = Table::new(headers(&["id", "id"])).unwrap_err();
        assert!(matches!(err, EtlError::DuplicateColumn(name) if name == "id"));
    }

    #[test]
    fn test_push_row_rejects_wrong_width() {
        let mut table = Table::new(headers(&["id", "message"])).unwrap();
        assert!(table.push_row(vec![Value::Integer(1)]).is_err());
    }

    #[test]
    fn test_remove_and_append_column() {
        let mut table = Table::from_rows(
            headers(&["id", "categories", "genre"]),
            vec![vec![Value::Integer(1), "related-1".into(), "news".into()]],
        )
        .unwrap();

        let (name, cells) = table.remove_column(1);
        assert_eq!(name, "categories");
        assert_eq!(cells, vec![Value::from("related-1")]);

        table
            .append_column("related".to_string(), vec![Value::Integer(1)])
            .unwrap();
        assert_eq!(table.headers(), &headers(&["id", "genre", "related"]));
        assert_eq!(table.get(0, "related"), Some(&Value::Integer(1)));

        let err = table
            .append_column("genre".to_string(), vec![Value::Null])
            .unwrap_err();
        assert!(matches!(err, EtlError::DuplicateColumn(_)));
    }

    #[test]
    fn test_column_type_widens_integer_to_real() {
        let table = Table::from_rows(
            headers(&["a", "b", "c", "d"]),
            vec![
                vec![
                    Value::Integer(1),
                    Value::Integer(1),
                    Value::Integer(1),
                    Value::Null,
                ],
                vec![Value::Integer(2), Value::Real(2.5), "x".into(), Value::Null],
                vec![Value::Null, Value::Integer(3), Value::Integer(3), Value::Null],
            ],
        )
        .unwrap();

        assert_eq!(table.column_type(0), ColumnType::Integer);
        assert_eq!(table.column_type(1), ColumnType::Real);
        assert_eq!(table.column_type(2), ColumnType::Text);
        assert_eq!(table.column_type(3), ColumnType::Text);
        assert_eq!(table.non_null_type(3), None);
    }

    #[test]
    fn test_signed_zeros_are_duplicates() {
        let mut table = Table::from_rows(
            headers(&["score"]),
            vec![vec![Value::Real(0.0)], vec![Value::Real(-0.0)]],
        )
        .unwrap();

        assert_eq!(table.drop_duplicates(), 1);
        assert_eq!(table.rows(), &[vec![Value::Real(0.0)]]);
    }
}
