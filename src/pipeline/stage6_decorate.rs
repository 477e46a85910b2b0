use crate::model::coord::a1;
use crate::model::settings::SUMMARY_SHEET;
use crate::model::workbook::EmbeddedImage;
use crate::model::{CellRef, RunSettings, Sheet, Workbook};
use crate::pipeline::stage4_impute::format_summary;
use crate::plot::RenderedPlots;

pub const PLOTS_SHEET: &str = "Summary Plots";
pub const SUMMARY_PLOT_ANCHOR: CellRef = a1('A', 1);
pub const PLATE_PLOT_ANCHOR: CellRef = a1('B', 33);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Stage6Output {
    pub plate_images: usize,
    pub unmatched: usize,
}

/// Embeds rendered plots: the summary image on its own sheet (replacing a
/// previous one), plate images below each plate's results. The Summary
/// formatting is re-applied since workbooks read from disk carry none.
pub fn run_stage6(workbook: &mut Workbook, plots: &RenderedPlots, settings: &RunSettings) -> Stage6Output {
    match workbook.sheet_mut(SUMMARY_SHEET) {
        Some(summary) => format_summary(summary, settings),
        None => crate::warn!("workbook has no Summary sheet to format"),
    }
    workbook.remove(PLOTS_SHEET);
    let mut plots_sheet = Sheet::new(PLOTS_SHEET);
    plots_sheet.images.push(EmbeddedImage {
        anchor: SUMMARY_PLOT_ANCHOR,
        png: plots.summary_png.clone(),
    });
    workbook.push(plots_sheet);

    let mut out = Stage6Output::default();
    for (name, png) in &plots.plate_pngs {
        let is_plate = settings.plate_naming.ordinal(name).is_some();
        match workbook.sheet_mut(name).filter(|_| is_plate) {
            Some(plate) => {
                plate.images.retain(|img| img.anchor != PLATE_PLOT_ANCHOR);
                plate.images.push(EmbeddedImage {
                    anchor: PLATE_PLOT_ANCHOR,
                    png: png.clone(),
                });
                out.plate_images += 1;
            }
            None => {
                crate::warn!("plot image for '{}' has no matching plate sheet", name);
                out.unmatched += 1;
            }
        }
    }
    crate::info!(
        "embedded summary plot and {} plate plot(s)",
        out.plate_images
    );
    out
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage6_decorate.rs"]
mod tests;
