use std::collections::BTreeMap;
use std::fs;
use std::io::{Cursor, Read, Seek};
use std::path::Path;

use calamine::{Data, Range, Reader, Xlsx};

use crate::input::InputError;
use crate::model::{CellRef, CellValue, Sheet, Workbook};

pub fn read_workbook(path: &Path) -> Result<Workbook, InputError> {
    let bytes = fs::read(path)?;
    read_workbook_bytes(&bytes)
}

pub fn read_workbook_bytes(bytes: &[u8]) -> Result<Workbook, InputError> {
    let mut xlsx = Xlsx::new(Cursor::new(bytes))?;
    read_all_sheets(&mut xlsx)
}

fn read_all_sheets<RS: Read + Seek>(xlsx: &mut Xlsx<RS>) -> Result<Workbook, InputError> {
    let mut workbook = Workbook::new();
    for name in xlsx.sheet_names() {
        let values = xlsx.worksheet_range(&name)?;
        let formulas = xlsx.worksheet_formula(&name)?;
        workbook.push(build_sheet(&name, &values, &formulas));
    }
    Ok(workbook)
}

fn build_sheet(name: &str, values: &Range<Data>, formulas: &Range<String>) -> Sheet {
    let mut sheet = Sheet::new(name);

    let mut cells: BTreeMap<CellRef, CellValue> = BTreeMap::new();
    if let Some((row0, col0)) = values.start() {
        for (r, c, data) in values.used_cells() {
            let at = CellRef::new(row0 + r as u32, (col0 as usize + c) as u16);
            let value = convert(data);
            if value != CellValue::Empty {
                cells.insert(at, value);
            }
        }
    }

    if let Some((row0, col0)) = formulas.start() {
        for (r, c, expr) in formulas.used_cells() {
            if expr.trim().is_empty() {
                continue;
            }
            let at = CellRef::new(row0 + r as u32, (col0 as usize + c) as u16);
            let cached = cells.remove(&at).unwrap_or_default();
            cells.insert(at, CellValue::formula_with_cached(expr.as_str(), cached));
        }
    }

    for (at, value) in cells {
        sheet.set(at, value);
    }
    sheet
}

fn convert(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::Int(v) => CellValue::Number(*v as f64),
        Data::Float(v) => CellValue::Number(*v),
        Data::String(s) => CellValue::text(s.as_str()),
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        other => CellValue::text(other.to_string()),
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/xlsx.rs"]
mod tests;
