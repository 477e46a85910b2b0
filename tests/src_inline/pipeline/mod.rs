use std::io;

use super::*;
use crate::input::settings::parse_settings;
use crate::model::coord::a1;
use crate::model::settings::SUMMARY_SHEET;
use crate::model::{CellRef, CellValue, Sheet};

fn template() -> TemplateGrid {
    let mut sheet = Sheet::new("Template");
    sheet.set(a1('A', 5), CellValue::Number(20.0));
    sheet.set(a1('A', 11), CellValue::Number(1000.0));
    for slot in crate::model::layout::STANDARD_LAYOUT.nt90 {
        sheet.set(slot.aggregate, CellValue::formula("AVERAGE(B5:D5)"));
    }
    TemplateGrid::from_sheet("template.xlsx", sheet)
}

fn block(seed: usize) -> String {
    (0..8)
        .map(|r| {
            (0..12)
                .map(|c| format!("{}", seed * 100 + r * 12 + c))
                .collect::<Vec<_>>()
                .join(",")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn two_blocks() -> String {
    format!("{}\n\n{}\n", block(1), block(2))
}

fn inputs(count: i64) -> RunInputs<'static> {
    RunInputs {
        assay_title: "Run 7",
        pseudotypes: "Flu, RSV",
        sample_ids: "S1\nS2\nS3\nS4",
        pseudotype_count: count,
    }
}

fn column(wb: &Workbook, col: u16) -> Vec<String> {
    let summary = wb.sheet(SUMMARY_SHEET).unwrap();
    (1..summary.row_count())
        .map(|r| summary.get(CellRef::new(r, col)).display_text())
        .collect()
}

struct Unreadable;

impl io::Read for Unreadable {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        panic!("input read before the pseudotype count was checked");
    }
}

#[test]
fn test_invalid_count_rejected_before_parsing() {
    for n in [0, 5, -1] {
        let err = run_pipeline(Unreadable, &template(), &inputs(n), &RunSettings::default())
            .unwrap_err();
        assert!(matches!(err, PipelineError::InvalidPseudotypeCount(v) if v == n));
    }
}

#[test]
fn test_two_block_count_two_scenario() {
    let out = run_pipeline(
        two_blocks().as_bytes(),
        &template(),
        &inputs(2),
        &RunSettings::default(),
    )
    .unwrap();
    assert_eq!(out.blocks, 2);
    assert_eq!(out.workbook.sheet_names(), vec!["Plate1", "Plate2", "Summary"]);
    assert_eq!(out.summary.rows, 8);
    assert_eq!(
        column(&out.workbook, 0),
        vec!["Plate1", "Plate1", "Plate1", "Plate1", "Plate2", "Plate2", "Plate2", "Plate2"]
    );
    assert_eq!(
        column(&out.workbook, 1),
        vec!["Flu", "Flu", "RSV", "RSV", "Flu", "Flu", "RSV", "RSV"]
    );
    assert_eq!(
        column(&out.workbook, 2),
        vec!["S1", "S2", "S1", "S2", "S3", "S4", "S3", "S4"]
    );
    // empty replicate cells are censored at the lower limit
    assert_eq!(column(&out.workbook, 3), vec!["<20"; 8]);
    // D14 is both the third replicate and the aggregate
    assert_eq!(out.imputation.linked, 16);
}

#[test]
fn test_count_three_emits_three_rows_per_plate() {
    let out = run_pipeline(
        two_blocks().as_bytes(),
        &template(),
        &RunInputs {
            pseudotypes: "A,B,C",
            ..inputs(3)
        },
        &RunSettings::default(),
    )
    .unwrap();
    assert_eq!(out.summary.rows, 6);
    assert_eq!(column(&out.workbook, 1), vec!["A", "B", "C", "A", "B", "C"]);
    assert_eq!(column(&out.workbook, 2), vec!["S1", "S1", "S1", "S2", "S2", "S2"]);
}

#[test]
fn test_count_one_and_four_rows() {
    let settings = RunSettings::default();
    let one = run_pipeline(two_blocks().as_bytes(), &template(), &inputs(1), &settings).unwrap();
    assert_eq!(one.summary.rows, 8);
    assert_eq!(column(&one.workbook, 1), vec!["Flu"; 8]);
    let four = run_pipeline(two_blocks().as_bytes(), &template(), &inputs(4), &settings).unwrap();
    assert_eq!(four.summary.rows, 8);
    assert_eq!(
        column(&four.workbook, 1),
        vec!["Flu", "RSV", "Unlabelled", "Unlabelled", "Flu", "RSV", "Unlabelled", "Unlabelled"]
    );
}

#[test]
fn test_empty_csv_has_no_plate_for_limits() {
    let err = run_pipeline(&b""[..], &template(), &inputs(1), &RunSettings::default())
        .unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Impute(stage4_impute::ImputeError::MissingFirstPlate)
    ));
}

#[test]
fn test_settings_override_layout_and_labels() {
    let settings = parse_settings(
        r#"{"layout":{"title":"C2"},"label_link":"static","summary_placement":"first"}"#,
    )
    .unwrap();
    let out = run_pipeline(two_blocks().as_bytes(), &template(), &inputs(2), &settings).unwrap();
    assert_eq!(out.workbook.sheet_names()[0], "Summary");
    let plate = out.workbook.sheet("Plate1").unwrap();
    assert_eq!(plate.get(a1('C', 2)), &CellValue::text("Run 7"));
    assert_eq!(plate.get(a1('B', 2)), &CellValue::Empty);
    let summary = out.workbook.sheet(SUMMARY_SHEET).unwrap();
    assert_eq!(summary.get(CellRef::new(1, 1)), &CellValue::text("Flu"));
}

#[test]
fn test_concurrent_runs_share_template() {
    let template = template();
    let settings = RunSettings::default();
    let csv = two_blocks();
    let expected = run_pipeline(csv.as_bytes(), &template, &inputs(2), &settings)
        .unwrap()
        .workbook;

    let (csv_ref, template_ref, settings_ref) = (&csv, &template, &settings);
    let results: Vec<Workbook> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(move |_| {
                scope.spawn(move || {
                    run_pipeline(csv_ref.as_bytes(), template_ref, &inputs(2), settings_ref)
                        .unwrap()
                        .workbook
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert!(results.iter().all(|wb| *wb == expected));
    assert_eq!(template, self::template());
}

#[test]
fn test_summarize_workbook_with_count_override() {
    let mut out = run_pipeline(
        two_blocks().as_bytes(),
        &template(),
        &inputs(4),
        &RunSettings::default(),
    )
    .unwrap();
    for plate in &mut out.workbook.sheets {
        plate.slot_count = None;
    }
    let (summary, _) =
        summarize_workbook(&mut out.workbook, &RunSettings::default(), Some(3)).unwrap();
    assert_eq!(summary.rows, 6);
    let (summary, _) =
        summarize_workbook(&mut out.workbook, &RunSettings::default(), None).unwrap();
    assert_eq!(summary.rows, 8);
    assert!(matches!(
        summarize_workbook(&mut out.workbook, &RunSettings::default(), Some(9)),
        Err(PipelineError::InvalidPseudotypeCount(9))
    ));
}

#[test]
fn test_summarize_is_stable_on_finished_workbook() {
    let out = run_pipeline(
        two_blocks().as_bytes(),
        &template(),
        &inputs(2),
        &RunSettings::default(),
    )
    .unwrap();
    let mut again = out.workbook.clone();
    summarize_workbook(&mut again, &RunSettings::default(), None).unwrap();
    assert_eq!(again, out.workbook);
}
