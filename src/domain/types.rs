//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - passed by reference through fitting, sampling and estimation
//! - exported to JSON for downstream tooling
//! - rebuilt from JSON in tests and fixtures

use std::borrow::Borrow;
use std::fmt;

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::error::{CausalError, Result};

/// A named scalar variable (graph node / table column).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Variable(String);

impl Variable {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Variable {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Variable {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&Variable> for Variable {
    fn from(value: &Variable) -> Self {
        value.clone()
    }
}

impl Borrow<str> for Variable {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Variable {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// One named column of a [`DataTable`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: Variable,
    pub values: Vec<f64>,
}

/// In-memory table of named `f64` columns with equal length.
///
/// Column order is preserved. Lookups are linear; tables in this crate carry a
/// handful of columns, so an index map would not pay for itself.
///
/// Deserialization goes through [`DataTable::from_columns`], so a table read
/// from JSON upholds the same shape invariants as one built in code.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTable")]
pub struct DataTable {
    columns: Vec<Column>,
}

/// Unchecked wire form of [`DataTable`].
#[derive(Deserialize)]
struct RawTable {
    columns: Vec<Column>,
}

impl TryFrom<RawTable> for DataTable {
    type Error = CausalError;

    fn try_from(raw: RawTable) -> Result<Self> {
        DataTable::from_columns(raw.columns.into_iter().map(|c| (c.name, c.values)))
    }
}

impl DataTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from `(name, values)` pairs.
    ///
    /// Fails on duplicate names or columns of differing length.
    pub fn from_columns<I, V>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (V, Vec<f64>)>,
        V: Into<Variable>,
    {
        let mut table = Self::new();
        for (name, values) in columns {
            table.push_column(name, values)?;
        }
        Ok(table)
    }

    /// Append a column.
    pub fn push_column(&mut self, name: impl Into<Variable>, values: Vec<f64>) -> Result<()> {
        let name = name.into();
        if self.column(name.as_str()).is_some() {
            return Err(CausalError::invalid(format!("Duplicate column '{name}'.")));
        }
        if let Some(first) = self.columns.first() {
            if first.values.len() != values.len() {
                return Err(CausalError::invalid(format!(
                    "Column '{name}' has {} rows, expected {}.",
                    values.len(),
                    first.values.len()
                )));
            }
        }
        self.columns.push(Column { name, values });
        Ok(())
    }

    pub fn n_rows(&self) -> usize {
        self.columns.first().map(|c| c.values.len()).unwrap_or(0)
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows() == 0
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &Variable> {
        self.columns.iter().map(|c| &c.name)
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|c| c.name.as_str() == name)
            .map(|c| c.values.as_slice())
    }

    /// Like [`DataTable::column`], but a missing column is an error.
    pub fn require_column(&self, name: &str) -> Result<&[f64]> {
        self.column(name)
            .ok_or_else(|| CausalError::MissingColumn(name.to_string()))
    }

    /// Column as an `nalgebra` vector.
    pub fn vector(&self, name: &str) -> Result<DVector<f64>> {
        Ok(DVector::from_column_slice(self.require_column(name)?))
    }

    /// Stack the named columns into an `n_rows x names.len()` matrix.
    pub fn matrix(&self, names: &[Variable]) -> Result<DMatrix<f64>> {
        let mut cols = Vec::with_capacity(names.len());
        for name in names {
            cols.push(self.require_column(name.as_str())?);
        }
        let n = self.n_rows();
        Ok(DMatrix::from_fn(n, cols.len(), |i, j| cols[j][i]))
    }

    /// A new table containing the given rows (repeats allowed), in order.
    pub fn select_rows(&self, rows: &[usize]) -> Result<Self> {
        let n = self.n_rows();
        if let Some(&bad) = rows.iter().find(|&&r| r >= n) {
            return Err(CausalError::invalid(format!(
                "Row index {bad} out of bounds for table with {n} rows."
            )));
        }
        let columns = self
            .columns
            .iter()
            .map(|c| Column {
                name: c.name.clone(),
                values: rows.iter().map(|&r| c.values[r]).collect(),
            })
            .collect();
        Ok(Self { columns })
    }

    /// Arithmetic mean of a column.
    pub fn mean(&self, name: &str) -> Result<f64> {
        let values = self.require_column(name)?;
        if values.is_empty() {
            return Err(CausalError::invalid(format!("Column '{name}' is empty.")));
        }
        Ok(values.iter().sum::<f64>() / values.len() as f64)
    }
}
