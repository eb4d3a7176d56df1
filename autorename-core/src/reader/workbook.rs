//! Worksheet data structures

use super::cell_ref::CellReference;
use std::collections::HashMap;

/// Represents a loaded worksheet
#[derive(Debug, Clone, Default)]
pub struct Sheet {
    pub name: String,
    pub cells: HashMap<(u32, u32), Cell>,
}

impl Sheet {
    /// Create an empty sheet
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cells: HashMap::new(),
        }
    }

    /// Get a cell at the given position
    pub fn get_cell(&self, row: u32, col: u32) -> Option<&Cell> {
        self.cells.get(&(row, col))
    }

    /// Get the value at a reference, `Empty` when the cell does not exist
    pub fn value_at(&self, reference: CellReference) -> &CellValue {
        self.get_cell(reference.row, reference.col)
            .map(|c| &c.value)
            .unwrap_or(&CellValue::Empty)
    }

    /// Insert or replace a cell value
    pub fn set_value(&mut self, row: u32, col: u32, value: CellValue) {
        self.cells.insert((row, col), Cell { row, col, value });
    }
}

/// Represents a single cell
#[derive(Debug, Clone)]
pub struct Cell {
    pub row: u32,
    pub col: u32,
    pub value: CellValue,
}

/// Cell value types
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Number(f64),
    Text(String),
    Boolean(bool),
    Error(String),
}

impl CellValue {
    /// Check if the cell is empty
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(t) => t.trim().is_empty(),
            _ => false,
        }
    }

    /// Text as a user would read it in the sheet.
    ///
    /// Integral numbers drop their fractional part so an identifier stored
    /// as `1234567.0` reads back as `1234567`.
    pub fn display_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                format!("{}", *n as i64)
            }
            CellValue::Number(n) => n.to_string(),
            CellValue::Text(t) => t.trim().to_string(),
            CellValue::Boolean(b) => b.to_string(),
            CellValue::Error(e) => e.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_text() {
        assert_eq!(CellValue::Number(1234567.0).display_text(), "1234567");
        assert_eq!(CellValue::Number(2.5).display_text(), "2.5");
        assert_eq!(CellValue::Text("  1000A ".into()).display_text(), "1000A");
        assert_eq!(CellValue::Empty.display_text(), "");
    }

    #[test]
    fn test_missing_cell_reads_empty() {
        let mut sheet = Sheet::new("S");
        sheet.set_value(0, 0, CellValue::Text("x".into()));
        assert_eq!(sheet.value_at(CellReference::new(0, 0)).display_text(), "x");
        assert!(sheet.value_at(CellReference::new(5, 5)).is_empty());
        assert!(CellValue::Text("   ".into()).is_empty());
    }
}
