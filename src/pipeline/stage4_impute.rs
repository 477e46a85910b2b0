use crate::model::cell::round_half_away;
use crate::model::settings::{CensorGlyphs, SUMMARY_SHEET};
use crate::model::{CellRef, CellValue, RunSettings, Sheet, Workbook};
use crate::pipeline::stage3_summary::{NUMERIC_COLUMNS, SUMMARY_HEADER};

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ImputeError {
    #[error("workbook has no plate sheet to read detection limits from")]
    MissingFirstPlate,
    #[error("workbook has no Summary sheet")]
    MissingSummary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DetectionLimits {
    pub lower: Option<i64>,
    pub upper: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Stage4Output {
    pub limits: DetectionLimits,
    pub lower_substituted: usize,
    pub upper_substituted: usize,
    pub rounded: usize,
    pub linked: usize,
}

fn read_limit(plate: &Sheet, at: CellRef, which: &str) -> Option<i64> {
    let value = plate.get(at);
    match value.parse_number() {
        Some(v) => Some(round_half_away(v) as i64),
        None => {
            crate::warn!(
                "{} detection limit at {}!{} is not numeric ({:?}); {} substitution disabled",
                which,
                plate.name,
                at,
                value.display_text(),
                which
            );
            None
        }
    }
}

/// Limits come from the first plate sheet in workbook order.
pub fn read_limits(workbook: &Workbook, settings: &RunSettings) -> Result<DetectionLimits, ImputeError> {
    let plate = workbook
        .sheets
        .iter()
        .find(|s| settings.plate_naming.ordinal(&s.name).is_some())
        .ok_or(ImputeError::MissingFirstPlate)?;
    let layout = &settings.layout;
    // A zero lower limit means none was entered.
    let mut lower = read_limit(plate, layout.lower_limit, "lower");
    if lower == Some(0) {
        crate::warn!(
            "lower detection limit on {} is 0; lower substitution disabled",
            plate.name
        );
        lower = None;
    }
    Ok(DetectionLimits {
        lower,
        upper: layout
            .upper_limit
            .and_then(|at| read_limit(plate, at, "upper")),
    })
}

#[derive(Debug, Clone, PartialEq)]
pub enum Imputed {
    Unchanged,
    Lower(CellValue),
    Upper(CellValue),
    Rounded(CellValue),
    Linked(CellValue),
}

/// Censoring rule for one summary cell. Text is never touched, so a second
/// pass over imputed output changes nothing.
pub fn impute_value(value: &CellValue, limits: DetectionLimits, glyphs: &CensorGlyphs) -> Imputed {
    if let CellValue::Formula { expr, cached: None } = value {
        return match plain_reference(expr) {
            Some(target) => Imputed::Linked(CellValue::formula(censor_formula(
                target, limits, glyphs,
            ))),
            None => Imputed::Unchanged,
        };
    }

    let resolved = value.resolved();
    if value.is_blank() {
        return match limits.lower {
            Some(lower) => Imputed::Lower(CellValue::Text(format!("{}{}", glyphs.lower, lower))),
            None => Imputed::Unchanged,
        };
    }
    match resolved {
        CellValue::Number(v) => {
            if let Some(upper) = limits.upper {
                if *v > upper as f64 {
                    return Imputed::Upper(CellValue::Text(format!("{}{}", glyphs.upper, upper)));
                }
            }
            let rounded = round_half_away(*v);
            if rounded == *v && !value.is_formula() {
                Imputed::Unchanged
            } else {
                Imputed::Rounded(CellValue::Number(rounded))
            }
        }
        _ => Imputed::Unchanged,
    }
}

/// `Sheet!A1` or `'Sheet name'!A1` with nothing else around it.
fn plain_reference(expr: &str) -> Option<&str> {
    let expr = expr.trim();
    let (sheet, cell) = expr.rsplit_once('!')?;
    CellRef::parse_a1(cell).ok()?;
    let quoted = sheet.len() >= 2 && sheet.starts_with('\'') && sheet.ends_with('\'');
    let plain = !sheet.is_empty()
        && sheet
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if quoted || plain { Some(expr) } else { None }
}

/// Spreadsheet-side version of [`impute_value`] for results not computed yet.
pub fn censor_formula(target: &str, limits: DetectionLimits, glyphs: &CensorGlyphs) -> String {
    let mut numeric = format!("ROUND({target},0)");
    if let Some(upper) = limits.upper {
        numeric = format!("IF({target}>{upper},\"{}{upper}\",{numeric})", glyphs.upper);
    }
    let blank = match limits.lower {
        Some(lower) => format!("\"{}{}\"", glyphs.lower, lower),
        None => "\"\"".to_string(),
    };
    format!("IF({target}=\"\",{blank},IF(ISNUMBER({target}),{numeric},{target}))")
}

/// Integer format on the titre columns, every data cell centered, uniform
/// column widths. Loaded workbooks carry no styles, so anything that
/// re-exports one calls this again.
pub fn format_summary(summary: &mut Sheet, settings: &RunSettings) {
    for row in 1..summary.row_count() {
        for col in 0..SUMMARY_HEADER.len() as u16 {
            let format = summary.format_mut(CellRef::new(row, col));
            format.centered = true;
            if NUMERIC_COLUMNS.contains(&col) {
                format.num_format = Some(settings.integer_format.clone());
            }
        }
    }
    for col in 0..SUMMARY_HEADER.len() as u16 {
        summary
            .column_widths
            .insert(col, settings.summary_column_width);
    }
}

/// Applies the censoring rule to every titre column of the Summary sheet,
/// then formats it with [`format_summary`].
pub fn run_stage4(workbook: &mut Workbook, settings: &RunSettings) -> Result<Stage4Output, ImputeError> {
    let limits = read_limits(workbook, settings)?;
    let summary = workbook
        .sheet_mut(SUMMARY_SHEET)
        .ok_or(ImputeError::MissingSummary)?;

    let mut out = Stage4Output {
        limits,
        ..Stage4Output::default()
    };
    let n_rows = summary.row_count();
    for row in 1..n_rows {
        for col in NUMERIC_COLUMNS {
            let at = CellRef::new(row, col);
            match impute_value(summary.get(at), limits, &settings.glyphs) {
                Imputed::Unchanged => {}
                Imputed::Lower(v) => {
                    summary.set(at, v);
                    out.lower_substituted += 1;
                }
                Imputed::Upper(v) => {
                    summary.set(at, v);
                    out.upper_substituted += 1;
                }
                Imputed::Rounded(v) => {
                    summary.set(at, v);
                    out.rounded += 1;
                }
                Imputed::Linked(v) => {
                    summary.set(at, v);
                    out.linked += 1;
                }
            }
        }
    }
    format_summary(summary, settings);

    crate::info!(
        "imputed summary: lower={:?} upper={:?}, {} below-limit, {} above-limit, {} rounded, {} linked",
        limits.lower,
        limits.upper,
        out.lower_substituted,
        out.upper_substituted,
        out.rounded,
        out.linked
    );
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage4_impute.rs"]
mod tests;
