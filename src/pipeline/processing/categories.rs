//! Decoding of the packed `name-value;name-value` categories string

use crate::config::{CategoryOptions, SchemaCheck};
use crate::error::{EtlError, Result};
use std::collections::HashSet;

/// Ordered category names, taken from the first row's packed string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySchema {
    names: Vec<String>,
}

/// One row's decoded category values, in schema order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedRow {
    pub values: Vec<i64>,
    /// Values normalized from 2 to 1
    pub remapped: usize,
    /// False when a positional check saw names that differ from the schema
    pub names_match: bool,
}

impl CategorySchema {
    /// Derive the schema from the first row's packed string
    pub fn from_packed(packed: &str, options: &CategoryOptions) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut names = Vec::new();
        for (position, token) in split_tokens(packed, &options.token_delimiter)
            .into_iter()
            .enumerate()
        {
            let name = category_name(token, &options.name_separator);
            if name.is_empty() {
                return Err(EtlError::SchemaMismatch {
                    row: 0,
                    message: format!("empty category name at position {position} ('{token}')"),
                });
            }
            if !seen.insert(name) {
                return Err(EtlError::DuplicateColumn(name.to_string()));
            }
            names.push(name.to_string());
        }
        Ok(Self { names })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Decode one row against this schema, normalizing 2 to 1.
    ///
    /// The token count must always match. Under `SchemaCheck::Strict` each
    /// token's name must also equal the schema name at its position.
    pub fn decode(
        &self,
        packed: &str,
        row: usize,
        options: &CategoryOptions,
    ) -> Result<DecodedRow> {
        let tokens = split_tokens(packed, &options.token_delimiter);
        if tokens.len() != self.names.len() {
            return Err(EtlError::SchemaMismatch {
                row,
                message: format!(
                    "expected {} categories, found {}",
                    self.names.len(),
                    tokens.len()
                ),
            });
        }

        let mut values = Vec::with_capacity(tokens.len());
        let mut remapped = 0;
        let mut names_match = true;
        for (expected, token) in self.names.iter().zip(tokens) {
            let name = category_name(token, &options.name_separator);
            if name != expected.as_str() {
                match options.schema_check {
                    SchemaCheck::Strict => {
                        return Err(EtlError::SchemaMismatch {
                            row,
                            message: format!("expected category '{expected}', found '{name}'"),
                        })
                    }
                    SchemaCheck::Positional => names_match = false,
                }
            }
            let raw = category_value(token, row)?;
            let value = normalize_value(raw);
            if value != raw {
                remapped += 1;
            }
            values.push(value);
        }

        Ok(DecodedRow {
            values,
            remapped,
            names_match,
        })
    }
}

pub fn split_tokens<'a>(packed: &'a str, delimiter: &str) -> Vec<&'a str> {
    packed.split(delimiter).collect()
}

/// The part of a token before the first separator (`related-1` -> `related`)
pub fn category_name<'a>(token: &'a str, separator: &str) -> &'a str {
    token.split(separator).next().unwrap_or(token)
}

/// The token's last character as an integer (`related-1` -> `1`)
pub fn category_value(token: &str, row: usize) -> Result<i64> {
    token
        .chars()
        .last()
        .and_then(|c| c.to_digit(10))
        .map(i64::from)
        .ok_or_else(|| EtlError::InvalidCategoryValue {
            row,
            token: token.to_string(),
        })
}

/// Fold the stray `2` seen in some categories into `1`; other values pass through
pub fn normalize_value(value: i64) -> i64 {
    if value == 2 {
        1
    } else {
        value
    }
}
