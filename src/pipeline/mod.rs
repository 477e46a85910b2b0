pub mod stage1_blocks;
pub mod stage2_layout;
pub mod stage3_summary;
pub mod stage4_impute;
pub mod stage5_export;
pub mod stage6_decorate;

use std::io::Read;

use crate::input::{InputError, TemplateGrid};
use crate::model::{PseudotypeCount, RunSettings, Workbook, parse_label_list};
use crate::plot::PlotError;
use stage2_layout::{Stage2Inputs, run_stage2};
use stage3_summary::{Stage3Output, run_stage3};
use stage4_impute::{ImputeError, Stage4Output, run_stage4};

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error("invalid pseudotype count {0} (expected 1-4)")]
    InvalidPseudotypeCount(i64),
    #[error(transparent)]
    Impute(#[from] ImputeError),
    #[error("export error: {0}")]
    Export(#[from] rust_xlsxwriter::XlsxError),
    #[error(transparent)]
    Plot(#[from] PlotError),
}

/// Per-run inputs as the user typed them.
#[derive(Debug, Clone, Copy)]
pub struct RunInputs<'a> {
    pub assay_title: &'a str,
    pub pseudotypes: &'a str,
    pub sample_ids: &'a str,
    pub pseudotype_count: i64,
}

#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub workbook: Workbook,
    pub blocks: usize,
    pub summary: Stage3Output,
    pub imputation: Stage4Output,
}

pub fn validate_count(n: i64) -> Result<PseudotypeCount, PipelineError> {
    PseudotypeCount::new(n).ok_or(PipelineError::InvalidPseudotypeCount(n))
}

/// CSV bytes to finished workbook: blocks, plates, summary, imputation.
/// The count is checked before any input is read.
pub fn run_pipeline<R: Read>(
    csv: R,
    template: &TemplateGrid,
    inputs: &RunInputs<'_>,
    settings: &RunSettings,
) -> Result<PipelineOutput, PipelineError> {
    let count = validate_count(inputs.pseudotype_count)?;
    let pseudotypes = parse_label_list(inputs.pseudotypes);
    let sample_ids = parse_label_list(inputs.sample_ids);
    crate::debug!(
        "run '{}': count={} pseudotypes={:?} samples={}",
        inputs.assay_title,
        count.get(),
        pseudotypes,
        sample_ids.len()
    );

    let stage1 = stage1_blocks::run_stage1(csv)?;
    let mut workbook = run_stage2(&Stage2Inputs {
        blocks: &stage1.blocks,
        template,
        assay_title: inputs.assay_title,
        pseudotypes: &pseudotypes,
        sample_ids: &sample_ids,
        count,
        settings,
    });
    let summary = run_stage3(&mut workbook, settings, None);
    let imputation = run_stage4(&mut workbook, settings)?;

    Ok(PipelineOutput {
        workbook,
        blocks: stage1.blocks.len(),
        summary,
        imputation,
    })
}

/// Rebuilds and re-imputes the Summary of an existing workbook.
pub fn summarize_workbook(
    workbook: &mut Workbook,
    settings: &RunSettings,
    pseudotype_count: Option<i64>,
) -> Result<(Stage3Output, Stage4Output), PipelineError> {
    let slots = pseudotype_count
        .map(validate_count)
        .transpose()?
        .map(PseudotypeCount::slot_count);
    let summary = run_stage3(workbook, settings, slots);
    let imputation = run_stage4(workbook, settings)?;
    Ok((summary, imputation))
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/mod.rs"]
mod tests;
