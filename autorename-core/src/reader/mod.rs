//! Spreadsheet reader using calamine

use crate::error::{Error, Result};
use calamine::{Data, Range, Reader, Sheets, open_workbook_auto};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

pub mod cell_ref;
pub mod workbook;

pub use cell_ref::{CellRange, CellReference, col_to_letter};
pub use workbook::{Cell, CellValue, Sheet};

/// An opened workbook from which single sheets are loaded on demand.
///
/// Renumbering workbooks may carry many sheets; only the selected one is
/// materialised.
pub struct WorkbookFile {
    path: PathBuf,
    sheets: Sheets<BufReader<File>>,
}

impl WorkbookFile {
    /// Open a workbook (xlsx, xlsm, xlsb, xls or ods)
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let sheets = open_workbook_auto(path).map_err(|e| Error::Workbook {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        tracing::debug!("Opened workbook {}", path.display());
        Ok(Self {
            path: path.to_path_buf(),
            sheets,
        })
    }

    /// Get all sheet names in workbook order
    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.sheet_names()
    }

    /// Load a single sheet's values
    pub fn read_sheet(&mut self, name: &str) -> Result<Sheet> {
        if !self.sheet_names().iter().any(|n| n == name) {
            return Err(Error::SheetNotFound(name.to_string()));
        }
        let range = self
            .sheets
            .worksheet_range(name)
            .map_err(|e| Error::Workbook {
                path: self.path.clone(),
                message: format!("sheet '{}': {}", name, e),
            })?;
        Ok(parse_sheet(name, &range))
    }
}

fn parse_sheet(name: &str, range: &Range<Data>) -> Sheet {
    let mut sheet = Sheet::new(name);

    // Cells of a range are relative to its top-left corner
    let (start_row, start_col) = match range.start() {
        Some(start) => start,
        None => return sheet,
    };

    for (rel_row, rel_col, data) in range.used_cells() {
        let value = parse_cell_value(data);
        if value.is_empty() {
            continue;
        }
        sheet.set_value(start_row + rel_row as u32, start_col + rel_col as u32, value);
    }

    sheet
}

fn parse_cell_value(data: &Data) -> CellValue {
    match data {
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Bool(b) => CellValue::Boolean(*b),
        Data::Error(e) => CellValue::Error(format!("{:?}", e)),
        Data::Empty => CellValue::Empty,
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) => CellValue::Text(s.clone()),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sheet_offsets() {
        let mut range: Range<Data> = Range::new((16, 0), (17, 2));
        range.set_value((16, 0), Data::String("ancienne".to_string()));
        range.set_value((17, 0), Data::Float(1234567.0));
        range.set_value((17, 2), Data::String("1000A".to_string()));

        let sheet = parse_sheet("M-101-C200", &range);

        assert_eq!(sheet.name, "M-101-C200");
        assert_eq!(sheet.cells.len(), 3);
        assert_eq!(
            sheet.value_at(CellReference::new(16, 0)),
            &CellValue::Text("ancienne".into())
        );
        assert_eq!(sheet.value_at(CellReference::new(17, 0)).display_text(), "1234567");
        assert!(sheet.get_cell(17, 1).is_none());
    }

    #[test]
    fn test_open_missing_workbook() {
        let err = WorkbookFile::open("does/not/exist.xlsm").err().unwrap();
        assert!(matches!(err, Error::Workbook { .. }));
    }
}
