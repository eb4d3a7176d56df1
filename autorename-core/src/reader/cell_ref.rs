//! A1-style cell references and rectangular ranges

use std::fmt;
use std::str::FromStr;

/// Cell reference (e.g., A1, BK24), 0-based internally
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellReference {
    pub row: u32,
    pub col: u32,
}

impl CellReference {
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Convert to Excel-style reference (e.g., "A1")
    pub fn to_excel_ref(&self) -> String {
        format!("{}{}", col_to_letter(self.col), self.row + 1)
    }
}

impl fmt::Display for CellReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_excel_ref())
    }
}

impl FromStr for CellReference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_cell_ref(s)
            .map(|(row, col)| CellReference::new(row, col))
            .ok_or_else(|| format!("invalid cell reference '{s}'"))
    }
}

/// Convert column number to letter (0 -> A, 1 -> B, 26 -> AA)
pub fn col_to_letter(mut col: u32) -> String {
    let mut result = String::new();
    loop {
        result.insert(0, (b'A' + (col % 26) as u8) as char);
        if col < 26 {
            break;
        }
        col = col / 26 - 1;
    }
    result
}

/// Convert column letters to a 0-based column number (A -> 0, BK -> 62)
pub fn letter_to_col(letters: &str) -> Option<u32> {
    if letters.is_empty() {
        return None;
    }
    let mut col = 0u32;
    for ch in letters.chars() {
        if !ch.is_ascii_alphabetic() {
            return None;
        }
        col = col
            .checked_mul(26)?
            .checked_add(ch.to_ascii_uppercase() as u32 - 'A' as u32 + 1)?;
    }
    Some(col - 1)
}

/// Parse a cell reference like "A1" into (row, col) as 0-based indices
pub fn parse_cell_ref(cell_ref: &str) -> Option<(u32, u32)> {
    let cell_ref = cell_ref.trim().trim_start_matches('$');
    let split = cell_ref.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = cell_ref.split_at(split);
    let letters = letters.trim_end_matches('$');

    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let col = letter_to_col(letters)?;
    let row = digits.parse::<u32>().ok()?;
    if row == 0 {
        return None;
    }

    Some((row - 1, col))
}

/// A rectangular block of cells such as "A17:G24"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRange {
    pub start: CellReference,
    pub end: CellReference,
}

impl CellRange {
    /// Every cell of the range, row by row, left to right
    pub fn cells_row_major(&self) -> impl Iterator<Item = CellReference> + '_ {
        (self.start.row..=self.end.row).flat_map(move |row| {
            (self.start.col..=self.end.col).map(move |col| CellReference::new(row, col))
        })
    }
}

impl FromStr for CellRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (start, end) = s
            .split_once(':')
            .ok_or_else(|| format!("invalid cell range '{s}', expected e.g. A17:G24"))?;
        let a: CellReference = start.parse()?;
        let b: CellReference = end.parse()?;

        // Normalise so that start is the top-left corner
        Ok(CellRange {
            start: CellReference::new(a.row.min(b.row), a.col.min(b.col)),
            end: CellReference::new(a.row.max(b.row), a.col.max(b.col)),
        })
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_col_letters() {
        assert_eq!(col_to_letter(0), "A");
        assert_eq!(col_to_letter(25), "Z");
        assert_eq!(col_to_letter(26), "AA");
        assert_eq!(col_to_letter(62), "BK");
        assert_eq!(letter_to_col("A"), Some(0));
        assert_eq!(letter_to_col("bk"), Some(62));
        assert_eq!(letter_to_col(""), None);
        assert_eq!(letter_to_col("A1"), None);
    }

    #[test]
    fn test_parse_cell_ref() {
        assert_eq!(parse_cell_ref("A1"), Some((0, 0)));
        assert_eq!(parse_cell_ref("G24"), Some((23, 6)));
        assert_eq!(parse_cell_ref("$C$15"), Some((14, 2)));
        assert_eq!(parse_cell_ref("A0"), None);
        assert_eq!(parse_cell_ref("17"), None);
        assert_eq!(parse_cell_ref("1A"), None);
    }

    #[test]
    fn test_range_row_major_order() {
        let range: CellRange = "B2:A1".parse().unwrap();
        assert_eq!(range.to_string(), "A1:B2");

        let cells: Vec<String> = range.cells_row_major().map(|c| c.to_string()).collect();
        assert_eq!(cells, vec!["A1", "B1", "A2", "B2"]);
    }

    #[test]
    fn test_invalid_range() {
        assert!("A17".parse::<CellRange>().is_err());
        assert!("A17:".parse::<CellRange>().is_err());
    }
}
