use std::path::Path;

use rust_xlsxwriter::{Format, FormatAlign, Formula, Image, Workbook as XlsxWorkbook, Worksheet, XlsxError};

use crate::model::cell::format_number;
use crate::model::{CellFormat, CellValue, Sheet, Workbook};

fn to_format(format: &CellFormat) -> Format {
    let mut out = Format::new();
    if let Some(num_format) = &format.num_format {
        out = out.set_num_format(num_format);
    }
    if format.centered {
        out = out
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter);
    }
    out
}

fn cached_result(value: &CellValue) -> String {
    match value.resolved() {
        CellValue::Number(v) => format_number(*v),
        CellValue::Text(s) => s.clone(),
        _ => String::new(),
    }
}

fn write_sheet(sheet: &Sheet, worksheet: &mut Worksheet) -> Result<(), XlsxError> {
    worksheet.set_name(&sheet.name)?;
    // Uncomputed formulas must not read back as a cached 0.
    worksheet.set_formula_result_default("");

    for (col, width) in &sheet.column_widths {
        worksheet.set_column_width(*col, *width)?;
    }

    for (at, value) in sheet.cells() {
        let format = sheet.format(at).filter(|f| !f.is_default()).map(to_format);
        let (row, col) = (at.row, at.col);
        match (value, &format) {
            (CellValue::Empty, _) => {}
            (CellValue::Number(v), Some(f)) => {
                worksheet.write_number_with_format(row, col, *v, f)?;
            }
            (CellValue::Number(v), None) => {
                worksheet.write_number(row, col, *v)?;
            }
            (CellValue::Text(s), Some(f)) => {
                worksheet.write_string_with_format(row, col, s, f)?;
            }
            (CellValue::Text(s), None) => {
                worksheet.write_string(row, col, s)?;
            }
            (CellValue::Formula { expr, .. }, _) => {
                let formula = Formula::new(format!("={expr}")).set_result(cached_result(value));
                match &format {
                    Some(f) => worksheet.write_formula_with_format(row, col, formula, f)?,
                    None => worksheet.write_formula(row, col, formula)?,
                };
            }
        }
    }

    // Formatted cells without a value still carry their alignment.
    for (at, format) in sheet.formats() {
        if *sheet.get(at) == CellValue::Empty && !format.is_default() {
            worksheet.write_blank(at.row, at.col, &to_format(format))?;
        }
    }

    for image in &sheet.images {
        let picture = Image::new_from_buffer(&image.png)?;
        worksheet.insert_image(image.anchor.row, image.anchor.col, &picture)?;
    }
    Ok(())
}

fn build(workbook: &Workbook) -> Result<XlsxWorkbook, XlsxError> {
    let mut out = XlsxWorkbook::new();
    for sheet in &workbook.sheets {
        let worksheet = out.add_worksheet();
        write_sheet(sheet, worksheet)?;
    }
    Ok(out)
}

pub fn run_stage5(workbook: &Workbook, path: &Path) -> Result<(), XlsxError> {
    let mut out = build(workbook)?;
    out.save(path)?;
    crate::info!(
        "wrote {} sheet(s) to {}",
        workbook.sheets.len(),
        path.display()
    );
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage5_export.rs"]
mod tests;
