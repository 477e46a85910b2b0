use crate::input::TemplateGrid;
use crate::model::layout::{DATA_COLS, DATA_ROWS, QUADRANTS};
use crate::model::{CellValue, PlateLayout, PseudotypeCount, RunSettings, Sheet, Workbook};
use crate::pipeline::stage1_blocks::Block;

#[derive(Debug, Clone)]
pub struct Stage2Inputs<'a> {
    pub blocks: &'a [Block],
    pub template: &'a TemplateGrid,
    pub assay_title: &'a str,
    pub pseudotypes: &'a [String],
    pub sample_ids: &'a [String],
    pub count: PseudotypeCount,
    pub settings: &'a RunSettings,
}

/// Label text per quadrant, Q1..Q4.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuadrantLabels {
    pub pseudotypes: [String; QUADRANTS],
    pub samples: [String; QUADRANTS],
}

/// Hands out sample IDs in order across every plate of a run.
#[derive(Debug, Clone)]
pub struct SampleCursor<'a> {
    ids: &'a [String],
    next: usize,
}

impl<'a> SampleCursor<'a> {
    pub fn new(ids: &'a [String]) -> Self {
        Self { ids, next: 0 }
    }

    /// Next ID, or blank once exhausted.
    pub fn take(&mut self) -> String {
        match self.ids.get(self.next) {
            Some(id) => {
                self.next += 1;
                id.clone()
            }
            None => String::new(),
        }
    }

    pub fn consumed(&self) -> usize {
        self.next
    }
}

fn name_at(names: &[String], idx: usize) -> String {
    names.get(idx).cloned().unwrap_or_default()
}

/// Quadrant placement for one plate. Adjacent quadrants share a pseudotype
/// or a sample depending on which physical protocol the count selects.
pub fn place_labels(
    count: PseudotypeCount,
    pseudotypes: &[String],
    samples: &mut SampleCursor<'_>,
) -> QuadrantLabels {
    match count {
        PseudotypeCount::One => {
            let name = name_at(pseudotypes, 0);
            QuadrantLabels {
                pseudotypes: std::array::from_fn(|_| name.clone()),
                samples: std::array::from_fn(|_| samples.take()),
            }
        }
        PseudotypeCount::Two => {
            let first = name_at(pseudotypes, 0);
            let second = name_at(pseudotypes, 1);
            let s1 = samples.take();
            let s2 = samples.take();
            QuadrantLabels {
                pseudotypes: [first.clone(), first, second.clone(), second],
                samples: [s1.clone(), s2.clone(), s1, s2],
            }
        }
        PseudotypeCount::Three => {
            let sample = samples.take();
            QuadrantLabels {
                pseudotypes: [
                    name_at(pseudotypes, 0),
                    name_at(pseudotypes, 1),
                    name_at(pseudotypes, 2),
                    String::new(),
                ],
                samples: [sample.clone(), sample.clone(), sample, String::new()],
            }
        }
        PseudotypeCount::Four => {
            let sample = samples.take();
            QuadrantLabels {
                pseudotypes: std::array::from_fn(|i| name_at(pseudotypes, i)),
                samples: std::array::from_fn(|_| sample.clone()),
            }
        }
    }
}

pub fn write_block(sheet: &mut Sheet, layout: &PlateLayout, block: &Block) {
    for row in 0..DATA_ROWS {
        for col in 0..DATA_COLS {
            sheet.set(layout.data_cell(row, col), CellValue::coerce(block.cell(row, col)));
        }
    }
}

pub fn write_labels(sheet: &mut Sheet, layout: &PlateLayout, labels: &QuadrantLabels) {
    for q in 0..QUADRANTS {
        sheet.set_text(layout.pseudotype_labels[q], &labels.pseudotypes[q]);
        sheet.set_text(layout.sample_labels[q], &labels.samples[q]);
    }
}

fn check_block_shape(ordinal: usize, block: &Block) {
    if block.n_rows() != DATA_ROWS || block.rows.iter().any(|r| r.len() < DATA_COLS) {
        crate::warn!(
            "block {} is {} row(s) by up to {} column(s), expected {}x{}; missing cells left blank",
            ordinal,
            block.n_rows(),
            block.max_cols(),
            DATA_ROWS,
            DATA_COLS
        );
    }
}

/// One plate sheet per block, in block order. The template itself never
/// lands in the output.
pub fn run_stage2(inputs: &Stage2Inputs<'_>) -> Workbook {
    let layout = &inputs.settings.layout;
    let naming = inputs.settings.plate_naming;
    let mut samples = SampleCursor::new(inputs.sample_ids);
    let mut workbook = Workbook::new();

    for (idx, block) in inputs.blocks.iter().enumerate() {
        let ordinal = idx + 1;
        check_block_shape(ordinal, block);

        let mut plate = inputs.template.sheet.instantiate(naming.sheet_name(ordinal));
        write_block(&mut plate, layout, block);
        plate.set_text(layout.title, inputs.assay_title);
        let labels = place_labels(inputs.count, inputs.pseudotypes, &mut samples);
        write_labels(&mut plate, layout, &labels);
        plate.slot_count = Some(inputs.count.slot_count());

        crate::debug!(
            "{}: pseudotypes [{}], samples [{}]",
            plate.name,
            labels.pseudotypes.join(", "),
            labels.samples.join(", ")
        );
        workbook.push(plate);
    }

    if samples.consumed() < inputs.sample_ids.len() {
        crate::warn!(
            "{} of {} sample ID(s) were not placed on any plate",
            inputs.sample_ids.len() - samples.consumed(),
            inputs.sample_ids.len()
        );
    }
    crate::info!(
        "assembled {} plate(s) from template '{}'",
        workbook.sheets.len(),
        inputs.template.sheet.name
    );
    workbook
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage2_layout.rs"]
mod tests;
