//! In-memory response table
//!
//! Rows are participants, columns are addressed by header name. Cells are
//! kept as trimmed strings; typed interpretation happens in the pipeline so
//! that validation errors can name the participant and column.

use crate::error::{Error, Result};
use std::collections::HashSet;

/// Column-name-addressed table of string cells
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseTable {
    /// Table role used in error messages ("primary", "side-choice")
    name: String,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl ResponseTable {
    /// Build a table, checking that headers are unique and rows are rectangular
    pub fn new(name: impl Into<String>, headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        let name = name.into();

        let mut seen = HashSet::new();
        for header in &headers {
            if !seen.insert(header.as_str()) {
                return Err(Error::SchemaMismatch(format!(
                    "{} table has duplicate column '{}'",
                    name, header
                )));
            }
        }

        for (i, row) in rows.iter().enumerate() {
            if row.len() != headers.len() {
                return Err(Error::SchemaMismatch(format!(
                    "{} table row {} has {} cells, expected {}",
                    name,
                    i + 1,
                    row.len(),
                    headers.len()
                )));
            }
        }

        Ok(Self { name, headers, rows })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of data rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == column)
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.column_index(column).is_some()
    }

    /// Index of a column that must exist
    pub fn require_column(&self, column: &str) -> Result<usize> {
        self.column_index(column).ok_or_else(|| {
            Error::SchemaMismatch(format!(
                "{} table is missing required column '{}'",
                self.name, column
            ))
        })
    }

    /// Copy of the table without the columns matching `drop`
    pub fn without_columns<F>(&self, drop: F) -> Self
    where
        F: Fn(&str) -> bool,
    {
        let keep: Vec<usize> = self
            .headers
            .iter()
            .enumerate()
            .filter(|(_, h)| !drop(h))
            .map(|(i, _)| i)
            .collect();

        Self {
            name: self.name.clone(),
            headers: keep.iter().map(|&i| self.headers[i].clone()).collect(),
            rows: self
                .rows
                .iter()
                .map(|row| keep.iter().map(|&i| row[i].clone()).collect())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_duplicate_header_rejected() {
        let result = ResponseTable::new("primary", strings(&["Participant", "Participant"]), vec![]);
        assert!(matches!(result, Err(Error::SchemaMismatch(_))));
    }

    #[test]
    fn test_ragged_row_rejected() {
        let result = ResponseTable::new(
            "primary",
            strings(&["Participant", "Group"]),
            vec![strings(&["P1"])],
        );
        assert!(matches!(result, Err(Error::SchemaMismatch(_))));
    }

    #[test]
    fn test_require_column_names_table() {
        let table = ResponseTable::new("side-choice", strings(&["Participant"]), vec![]).unwrap();
        let err = table.require_column("Group").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("side-choice"));
        assert!(message.contains("Group"));
    }

    #[test]
    fn test_without_columns() {
        let table = ResponseTable::new(
            "primary",
            strings(&["", "Participant", "Group"]),
            vec![strings(&["0", "P1", "A"]), strings(&["1", "P2", "B"])],
        )
        .unwrap();

        let trimmed = table.without_columns(|h| h.is_empty());
        assert_eq!(trimmed.headers(), &strings(&["Participant", "Group"])[..]);
        assert_eq!(trimmed.rows()[1], strings(&["P2", "B"]));
        assert_eq!(trimmed.len(), 2);
    }
}
