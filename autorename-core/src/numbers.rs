//! Building the old-to-new identifier table

use crate::columns::ColumnLabelMap;
use crate::error::{Error, Result};
use crate::reader::{CellReference, Sheet};
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

/// One renumbering line of the sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NumberTuple {
    /// Worksheet row (1-based) the identifiers were read from
    pub row: u32,
    /// 7-digit identifier currently used in file names
    pub old: u32,
    /// Replacement identifier per equipment, in column order
    pub new: Vec<String>,
}

impl NumberTuple {
    /// New identifier for an equipment index
    pub fn new_for(&self, equipment: usize) -> Option<&str> {
        self.new.get(equipment).map(String::as_str)
    }
}

fn old_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[0-9]{7}$").unwrap())
}

/// Parse an old identifier cell: exactly seven digits
pub fn parse_old_id(text: &str) -> Option<u32> {
    let text = text.trim();
    if old_id_pattern().is_match(text) {
        text.parse().ok()
    } else {
        None
    }
}

/// Build one tuple per row of `first_row..=last_row` (1-based) whose old
/// column holds a 7-digit identifier. New identifiers are read on the same row.
pub fn build_number_table(
    sheet: &Sheet,
    columns: &ColumnLabelMap,
    first_row: u32,
    last_row: u32,
) -> Result<Vec<NumberTuple>> {
    let mut table = Vec::new();

    for row in first_row.max(1)..=last_row {
        let old_cell = CellReference::new(row - 1, columns.old);
        let Some(old) = parse_old_id(&sheet.value_at(old_cell).display_text()) else {
            continue;
        };

        let mut new = Vec::with_capacity(columns.new.len());
        for &col in &columns.new {
            let cell = CellReference::new(row - 1, col);
            let value = sheet.value_at(cell);
            if value.is_empty() {
                return Err(Error::DataCoherence(format!(
                    "old identifier {} at {} has no new identifier in {}",
                    old, old_cell, cell
                )));
            }
            new.push(value.display_text());
        }

        tracing::debug!("Row {}: {} -> {}", row, old, new.join(" / "));
        table.push(NumberTuple { row, old, new });
    }

    if table.is_empty() {
        return Err(Error::DataCoherence(format!(
            "no 7-digit identifier in column {} between rows {} and {}",
            columns.old_letter(),
            first_row,
            last_row
        )));
    }

    tracing::info!("Read {} identifier line(s) from '{}'", table.len(), sheet.name);
    Ok(table)
}
