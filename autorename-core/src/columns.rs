//! Locating the old and new identifier columns by their header labels

use crate::error::{Error, Result};
use crate::reader::{CellRange, CellReference, Sheet, col_to_letter};
use serde::Serialize;

/// Columns holding old identifiers and new identifiers (0-based)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnLabelMap {
    pub old: u32,
    /// One column per equipment, in sheet order
    pub new: Vec<u32>,
}

impl ColumnLabelMap {
    pub fn old_letter(&self) -> String {
        col_to_letter(self.old)
    }

    pub fn new_letters(&self) -> Vec<String> {
        self.new.iter().map(|c| col_to_letter(*c)).collect()
    }
}

fn has_label(sheet: &Sheet, cell: CellReference, label: &str) -> bool {
    sheet.value_at(cell).display_text() == label.trim()
}

/// Column of the first cell, row by row, whose text equals `label`
pub fn find_old_column(sheet: &Sheet, range: &CellRange, label: &str) -> Result<u32> {
    range
        .cells_row_major()
        .find(|cell| has_label(sheet, *cell, label))
        .map(|cell| {
            tracing::debug!("Found '{}' at {}", label, cell);
            cell.col
        })
        .ok_or_else(|| Error::LabelNotFound {
            label: label.to_string(),
            range: range.to_string(),
        })
}

/// Columns of every cell whose text equals `label`, in scan order, each once
pub fn find_new_columns(sheet: &Sheet, range: &CellRange, label: &str) -> Result<Vec<u32>> {
    let mut columns = Vec::new();
    for cell in range.cells_row_major() {
        if has_label(sheet, cell, label) && !columns.contains(&cell.col) {
            tracing::debug!("Found '{}' at {}", label, cell);
            columns.push(cell.col);
        }
    }
    if columns.is_empty() {
        return Err(Error::LabelNotFound {
            label: label.to_string(),
            range: range.to_string(),
        });
    }
    Ok(columns)
}

/// Locate both kinds of column
pub fn map_columns(
    sheet: &Sheet,
    old_range: &CellRange,
    old_label: &str,
    new_range: &CellRange,
    new_label: &str,
) -> Result<ColumnLabelMap> {
    let old = find_old_column(sheet, old_range, old_label)?;
    let new = find_new_columns(sheet, new_range, new_label)?;
    if new.contains(&old) {
        return Err(Error::DataCoherence(format!(
            "column {} is labelled both '{}' and '{}'",
            col_to_letter(old),
            old_label,
            new_label
        )));
    }
    let map = ColumnLabelMap { old, new };
    tracing::info!(
        "Old identifiers in column {}, new identifiers in columns {}",
        map.old_letter(),
        map.new_letters().join(", ")
    );
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::CellValue;

    fn text(sheet: &mut Sheet, reference: &str, value: &str) {
        let cell: CellReference = reference.parse().unwrap();
        sheet.set_value(cell.row, cell.col, CellValue::Text(value.to_string()));
    }

    fn range(s: &str) -> CellRange {
        s.parse().unwrap()
    }

    #[test]
    fn test_old_column_first_in_row_major_order() {
        let mut sheet = Sheet::new("S");
        text(&mut sheet, "D18", "ancienne");
        text(&mut sheet, "B19", "ancienne");
        text(&mut sheet, "A18", "other");

        let col = find_old_column(&sheet, &range("A17:G24"), "ancienne").unwrap();
        assert_eq!(col_to_letter(col), "D");
    }

    #[test]
    fn test_label_outside_range_is_not_found() {
        let mut sheet = Sheet::new("S");
        text(&mut sheet, "H18", "ancienne");

        let err = find_old_column(&sheet, &range("A17:G24"), "ancienne").unwrap_err();
        match err {
            Error::LabelNotFound { label, range } => {
                assert_eq!(label, "ancienne");
                assert_eq!(range, "A17:G24");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_new_columns_in_scan_order_without_duplicates() {
        let mut sheet = Sheet::new("S");
        text(&mut sheet, "E17", "nouvelle");
        text(&mut sheet, "C18", "nouvelle");
        text(&mut sheet, "E18", "nouvelle");
        text(&mut sheet, "BK24", " nouvelle ");

        let cols = find_new_columns(&sheet, &range("A17:BK24"), "nouvelle").unwrap();
        let letters: Vec<String> = cols.iter().map(|c| col_to_letter(*c)).collect();
        assert_eq!(letters, vec!["E", "C", "BK"]);
    }

    #[test]
    fn test_no_new_column() {
        let sheet = Sheet::new("S");
        assert!(matches!(
            find_new_columns(&sheet, &range("A17:BK24"), "nouvelle"),
            Err(Error::LabelNotFound { .. })
        ));
    }

    #[test]
    fn test_map_columns() {
        let mut sheet = Sheet::new("S");
        text(&mut sheet, "A17", "ancienne");
        text(&mut sheet, "C17", "nouvelle");
        text(&mut sheet, "E17", "nouvelle");

        let map = map_columns(
            &sheet,
            &range("A17:G24"),
            "ancienne",
            &range("A17:BK24"),
            "nouvelle",
        )
        .unwrap();
        assert_eq!(map.old_letter(), "A");
        assert_eq!(map.new_letters(), vec!["C", "E"]);
    }
}
