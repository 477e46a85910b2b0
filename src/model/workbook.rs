use std::collections::BTreeMap;

use crate::model::cell::{CellFormat, CellValue};
use crate::model::coord::CellRef;

#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedImage {
    pub anchor: CellRef,
    pub png: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sheet {
    pub name: String,
    cells: BTreeMap<CellRef, CellValue>,
    formats: BTreeMap<CellRef, CellFormat>,
    pub column_widths: BTreeMap<u16, f64>,
    pub images: Vec<EmbeddedImage>,
    /// Quadrant slots this plate defines; `None` for sheets not built by the
    /// assembler in this run.
    pub slot_count: Option<usize>,
}

static BLANK: CellValue = CellValue::Empty;

impl Sheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Missing cells read as blank.
    pub fn get(&self, at: CellRef) -> &CellValue {
        self.cells.get(&at).unwrap_or(&BLANK)
    }

    pub fn set(&mut self, at: CellRef, value: CellValue) {
        if value == CellValue::Empty {
            self.cells.remove(&at);
        } else {
            self.cells.insert(at, value);
        }
    }

    pub fn set_text(&mut self, at: CellRef, value: &str) {
        self.set(at, CellValue::text(value));
    }

    pub fn format(&self, at: CellRef) -> Option<&CellFormat> {
        self.formats.get(&at)
    }

    pub fn format_mut(&mut self, at: CellRef) -> &mut CellFormat {
        self.formats.entry(at).or_default()
    }

    pub fn cells(&self) -> impl Iterator<Item = (CellRef, &CellValue)> {
        self.cells.iter().map(|(k, v)| (*k, v))
    }

    pub fn formats(&self) -> impl Iterator<Item = (CellRef, &CellFormat)> {
        self.formats.iter().map(|(k, v)| (*k, v))
    }

    /// One past the last row holding a value or a format.
    pub fn row_count(&self) -> u32 {
        let cells = self.cells.keys().map(|c| c.row + 1).max().unwrap_or(0);
        let formats = self.formats.keys().map(|c| c.row + 1).max().unwrap_or(0);
        cells.max(formats)
    }

    pub fn append_row(&mut self, values: Vec<CellValue>) -> u32 {
        let row = self.row_count();
        for (col, value) in values.into_iter().enumerate() {
            self.set(CellRef::new(row, col as u16), value);
        }
        row
    }

    /// Copy of this sheet under a new name with formula caches dropped.
    pub fn instantiate(&self, name: impl Into<String>) -> Sheet {
        Sheet {
            name: name.into(),
            cells: self
                .cells
                .iter()
                .map(|(k, v)| (*k, v.without_cache()))
                .collect(),
            formats: self.formats.clone(),
            column_widths: self.column_widths.clone(),
            images: Vec::new(),
            slot_count: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    pub fn sheet_mut(&mut self, name: &str) -> Option<&mut Sheet> {
        self.sheets.iter_mut().find(|s| s.name == name)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.sheets.iter().position(|s| s.name == name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Sheet> {
        let idx = self.position(name)?;
        Some(self.sheets.remove(idx))
    }

    pub fn push(&mut self, sheet: Sheet) {
        self.sheets.push(sheet);
    }

    pub fn insert(&mut self, index: usize, sheet: Sheet) {
        let index = index.min(self.sheets.len());
        self.sheets.insert(index, sheet);
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/model/workbook.rs"]
mod tests;
