//! Building binding scopes from TOML data
//!
//! ```toml
//! title = "Inventory"
//!
//! [[items]]              # an array of tables becomes a loop
//! name = "apple"
//!
//! [[items]]
//! name = "pear"
//!
//! [owner]                # a nested table becomes a loop with one row
//! name = "Amy"
//! ```

use std::path::Path;

use thiserror::Error;
use toml::{Table, Value};

use crate::bindings::{Loop, Scope};

#[derive(Error, Debug)]
pub enum DataError {
    #[error("Failed to read data file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse data TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

impl Scope {
    /// Build a scope from a TOML table
    ///
    /// Strings, numbers, booleans and dates become variables, arrays of
    /// tables become loops and nested tables become loops with a single row.
    /// Array elements that are not tables are skipped with a warning.
    pub fn from_toml(table: &Table) -> Self {
        let mut scope = Scope::new();
        for (key, value) in table {
            match value {
                Value::String(s) => {
                    scope.add_var(key, s.as_str());
                }
                Value::Integer(_) | Value::Float(_) | Value::Boolean(_) | Value::Datetime(_) => {
                    scope.add_var(key, value.to_string());
                }
                Value::Table(row) => {
                    scope.add_loop(key, Loop::new().with_row(Scope::from_toml(row)));
                }
                Value::Array(items) => {
                    let rows = items
                        .iter()
                        .filter_map(|item| match item {
                            Value::Table(row) => Some(Scope::from_toml(row)),
                            other => {
                                tracing::warn!(
                                    key = %key,
                                    kind = other.type_str(),
                                    "skipping array element that is not a table"
                                );
                                None
                            }
                        })
                        .collect();
                    scope.add_loop(key, rows);
                }
            }
        }
        scope
    }

    /// Parse TOML text into a scope
    pub fn from_toml_str(content: &str) -> Result<Self, DataError> {
        let table: Table = toml::from_str(content)?;
        Ok(Self::from_toml(&table))
    }

    /// Load a scope from a TOML file
    pub fn from_toml_file(path: &Path) -> Result<Self, DataError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}
