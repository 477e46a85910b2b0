use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Zero-based grid coordinate. Printed and parsed in A1 notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CellRef {
    pub row: u32,
    pub col: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CellRefError {
    #[error("empty cell reference")]
    Empty,
    #[error("invalid cell reference: {0}")]
    Invalid(String),
}

pub const MAX_ROWS: u32 = 1_048_576;
pub const MAX_COLS: u16 = 16_384;

impl CellRef {
    pub const fn new(row: u32, col: u16) -> Self {
        Self { row, col }
    }

    pub const fn offset(self, rows: u32, cols: u16) -> Self {
        Self {
            row: self.row + rows,
            col: self.col + cols,
        }
    }

    pub fn parse_a1(s: &str) -> Result<Self, CellRefError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(CellRefError::Empty);
        }
        let bytes = s.as_bytes();
        let split = bytes
            .iter()
            .position(|b| b.is_ascii_digit())
            .ok_or_else(|| CellRefError::Invalid(s.to_string()))?;
        let (letters, digits) = s.split_at(split);
        if letters.is_empty()
            || !letters.bytes().all(|b| b.is_ascii_alphabetic())
            || !digits.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(CellRefError::Invalid(s.to_string()));
        }

        let mut col: u32 = 0;
        for b in letters.bytes() {
            col = col * 26 + (b.to_ascii_uppercase() - b'A' + 1) as u32;
            if col > MAX_COLS as u32 {
                return Err(CellRefError::Invalid(s.to_string()));
            }
        }
        let row: u32 = digits
            .parse()
            .map_err(|_| CellRefError::Invalid(s.to_string()))?;
        if row == 0 || row > MAX_ROWS {
            return Err(CellRefError::Invalid(s.to_string()));
        }

        Ok(Self {
            row: row - 1,
            col: (col - 1) as u16,
        })
    }

    pub fn to_a1(self) -> String {
        format!("{}{}", column_name(self.col), self.row + 1)
    }
}

pub fn column_name(col: u16) -> String {
    let mut n = col as u32 + 1;
    let mut out = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        out.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", column_name(self.col), self.row + 1)
    }
}

impl FromStr for CellRef {
    type Err = CellRefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_a1(s)
    }
}

impl TryFrom<String> for CellRef {
    type Error = CellRefError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse_a1(&value)
    }
}

impl From<CellRef> for String {
    fn from(value: CellRef) -> Self {
        value.to_a1()
    }
}

/// Builds a `CellRef` from A1 parts at compile time; `a1('B', 3)` is `B3`.
pub const fn a1(col: char, row: u32) -> CellRef {
    CellRef {
        row: row - 1,
        col: (col as u8 - b'A') as u16,
    }
}

/// Cross-sheet reference as a spreadsheet application expects it, quoting
/// sheet names that are not plain identifiers.
pub fn sheet_ref(sheet: &str, cell: CellRef) -> String {
    let plain = !sheet.is_empty()
        && sheet
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !sheet.starts_with(|c: char| c.is_ascii_digit());
    if plain {
        format!("{}!{}", sheet, cell)
    } else {
        format!("'{}'!{}", sheet.replace('\'', "''"), cell)
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/model/coord.rs"]
mod tests;
