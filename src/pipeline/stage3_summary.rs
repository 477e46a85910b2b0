use crate::model::coord::sheet_ref;
use crate::model::layout::{QUADRANTS, TitreSlot};
use crate::model::settings::{LabelLink, SUMMARY_SHEET, SummaryPlacement, UNLABELLED};
use crate::model::{CellRef, CellValue, RunSettings, Sheet, Workbook};

pub const SUMMARY_HEADER: [&str; 11] = [
    "Plate",
    "Pseudotype",
    "Sample ID",
    "NT90 Rep1",
    "NT90 Rep2",
    "NT90 Rep3",
    "NT90",
    "NT50 Rep1",
    "NT50 Rep2",
    "NT50 Rep3",
    "NT50",
];

/// Zero-based summary columns holding replicate or aggregate titres.
pub const NUMERIC_COLUMNS: std::ops::RangeInclusive<u16> = 3..=10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stage3Output {
    pub plates: usize,
    pub rows: usize,
}

fn label_cell(plate: &Sheet, at: CellRef, link: LabelLink) -> CellValue {
    let value = plate.get(at);
    let shown = if value.is_blank() {
        UNLABELLED.to_string()
    } else {
        value.display_text().trim().to_string()
    };
    match link {
        LabelLink::Static => CellValue::text(shown),
        LabelLink::Live => {
            let r = sheet_ref(&plate.name, at);
            CellValue::formula_with_cached(
                format!("IF(TRIM({r})=\"\",\"{UNLABELLED}\",{r})"),
                CellValue::text(shown),
            )
        }
    }
}

/// Known values are copied; results the template has not computed yet stay
/// as a reference so the spreadsheet application fills them in.
fn result_cell(plate: &Sheet, at: CellRef) -> CellValue {
    let value = plate.get(at);
    if value.is_pending() {
        CellValue::formula(sheet_ref(&plate.name, at))
    } else {
        value.resolved().clone()
    }
}

fn titre_cells(plate: &Sheet, slot: &TitreSlot) -> impl Iterator<Item = CellValue> {
    slot.cells().into_iter().map(|at| result_cell(plate, at))
}

pub fn summary_row(plate: &Sheet, quadrant: usize, settings: &RunSettings) -> Vec<CellValue> {
    let layout = &settings.layout;
    let mut row = Vec::with_capacity(SUMMARY_HEADER.len());
    row.push(CellValue::text(plate.name.as_str()));
    row.push(label_cell(
        plate,
        layout.pseudotype_labels[quadrant],
        settings.label_link,
    ));
    row.push(label_cell(
        plate,
        layout.sample_labels[quadrant],
        settings.label_link,
    ));
    row.extend(titre_cells(plate, &layout.nt90[quadrant]));
    row.extend(titre_cells(plate, &layout.nt50[quadrant]));
    row
}

/// Rebuilds the Summary sheet from scratch. `slots_override` applies to
/// plates that carry no slot count of their own.
pub fn run_stage3(
    workbook: &mut Workbook,
    settings: &RunSettings,
    slots_override: Option<usize>,
) -> Stage3Output {
    if workbook.remove(SUMMARY_SHEET).is_some() {
        crate::debug!("discarded previous {} sheet", SUMMARY_SHEET);
    }

    let mut summary = Sheet::new(SUMMARY_SHEET);
    summary.append_row(
        SUMMARY_HEADER
            .iter()
            .map(|h| CellValue::text(*h))
            .collect(),
    );

    let mut plates = 0usize;
    let mut rows = 0usize;
    for plate in &workbook.sheets {
        if settings.plate_naming.ordinal(&plate.name).is_none() {
            continue;
        }
        plates += 1;
        let slots = plate
            .slot_count
            .or(slots_override)
            .unwrap_or(QUADRANTS)
            .min(QUADRANTS);
        for quadrant in 0..slots {
            let row = summary.append_row(summary_row(plate, quadrant, settings));
            for col in NUMERIC_COLUMNS {
                summary.format_mut(CellRef::new(row, col)).num_format =
                    Some(settings.integer_format.clone());
            }
            rows += 1;
        }
    }

    match settings.summary_placement {
        SummaryPlacement::First => workbook.insert(0, summary),
        SummaryPlacement::Last => workbook.push(summary),
    }
    crate::info!(
        "summary built: {} row(s) from {} plate(s)",
        rows,
        plates
    );
    Stage3Output { plates, rows }
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage3_summary.rs"]
mod tests;
