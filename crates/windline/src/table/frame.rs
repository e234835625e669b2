//! In-memory tabular data.

use indexmap::{IndexMap, IndexSet};
use serde::ser::{Serialize, SerializeSeq, Serializer};

use crate::error::{Result, WindlineError};

use super::value::Value;

/// An ordered sequence of rows sharing one column schema.
///
/// Rows are stored positionally; every row holds exactly one value per
/// column. Columns are addressed by name.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Create an empty table with the given columns.
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Create a table from columns and row-major values.
    ///
    /// Fails with [`WindlineError::RowShapeMismatch`] if a row does not hold
    /// one value per column.
    pub fn with_rows(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Self> {
        let expected = columns.len();
        if let Some((row, values)) = rows.iter().enumerate().find(|(_, r)| r.len() != expected) {
            return Err(WindlineError::RowShapeMismatch {
                row,
                found: values.len(),
                expected,
            });
        }
        Ok(Self { columns, rows })
    }

    /// Create a table from name → value maps.
    ///
    /// The first map fixes the column order; columns first seen in later
    /// maps are appended. Keys missing from a map become `Null`.
    pub fn from_records<I, K>(records: I) -> Self
    where
        I: IntoIterator<Item = IndexMap<K, Value>>,
        K: Into<String>,
    {
        let mut columns: IndexSet<String> = IndexSet::new();
        let mut maps: Vec<IndexMap<String, Value>> = Vec::new();

        for record in records {
            let record: IndexMap<String, Value> =
                record.into_iter().map(|(k, v)| (k.into(), v)).collect();
            for key in record.keys() {
                columns.insert(key.clone());
            }
            maps.push(record);
        }

        let columns: Vec<String> = columns.into_iter().collect();
        let rows = maps
            .into_iter()
            .map(|mut map| {
                columns
                    .iter()
                    .map(|c| map.swap_remove(c).unwrap_or_default())
                    .collect()
            })
            .collect();

        Self { columns, rows }
    }

    /// Column names in order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Get the number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Get the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Returns true when the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Returns true if the table has a column with this name.
    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Position of a column, or a [`WindlineError::MissingColumn`].
    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| WindlineError::missing_column(name))
    }

    /// All values of a column by name.
    pub fn column<'a>(&'a self, name: &str) -> Option<impl Iterator<Item = &'a Value> + use<'a>> {
        let index = self.column_index(name)?;
        Some(self.rows.iter().map(move |row| &row[index]))
    }

    /// Row values by position.
    pub fn row(&self, index: usize) -> Option<&[Value]> {
        self.rows.get(index).map(|r| r.as_slice())
    }

    /// Iterate over rows as value slices.
    pub fn rows(&self) -> impl Iterator<Item = &[Value]> {
        self.rows.iter().map(|r| r.as_slice())
    }

    /// A row as an ordered name → value map.
    pub fn record(&self, index: usize) -> Option<IndexMap<&str, &Value>> {
        let row = self.rows.get(index)?;
        Some(
            self.columns
                .iter()
                .map(String::as_str)
                .zip(row.iter())
                .collect(),
        )
    }

    /// Iterate over rows as ordered name → value maps.
    pub fn records(&self) -> impl Iterator<Item = IndexMap<&str, &Value>> {
        (0..self.rows.len()).filter_map(move |i| self.record(i))
    }

    /// Get a specific cell by row index and column name.
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let index = self.column_index(column)?;
        self.rows.get(row).map(|r| &r[index])
    }

    /// Append a row.
    pub fn push_row(&mut self, row: Vec<Value>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(WindlineError::RowShapeMismatch {
                row: self.rows.len(),
                found: row.len(),
                expected: self.columns.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    /// Set a column to per-row values, appending it if absent.
    ///
    /// `values` must yield one value per row.
    pub(crate) fn set_column(&mut self, name: &str, values: Vec<Value>) {
        debug_assert_eq!(values.len(), self.rows.len());
        match self.column_index(name) {
            Some(index) => {
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row[index] = value;
                }
            }
            None => {
                self.columns.push(name.to_string());
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }
    }
}

/// Serializes as a sequence of row objects, keeping column order.
impl Serialize for Table {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.rows.len()))?;
        for record in self.records() {
            seq.serialize_element(&record)?;
        }
        seq.end()
    }
}
