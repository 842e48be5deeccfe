//! Tabular input port.

use crate::domain::error::StockdashError;

/// Raw header names and string cells, before any parsing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    /// Index of the header equal to `name` after trimming whitespace.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.trim() == name)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

pub trait TableSource {
    fn read_table(&self) -> Result<RawTable, StockdashError>;
}
