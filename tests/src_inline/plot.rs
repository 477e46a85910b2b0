use std::path::Path;

use super::*;

struct FixedRenderer(Vec<u8>);

impl PlotRenderer for FixedRenderer {
    fn render(&self, _workbook_path: &Path, request: &PlotRequest) -> Result<RenderedPlots, PlotError> {
        request.validate()?;
        Ok(RenderedPlots {
            summary_png: self.0.clone(),
            plate_pngs: BTreeMap::new(),
        })
    }
}

#[test]
fn test_request_defaults() {
    let r = PlotRequest::new("Run 7");
    assert_eq!(r.title, "Run 7");
    assert!(r.include_timestamp);
    assert_eq!(r.colours, ["#ff7e79", "#ffd479", "#009193", "#d783ff"].map(String::from));
    assert_eq!(r.quadrants, [true; 4]);
    assert!(r.validate().is_ok());
}

#[test]
fn test_validate_rejects_bad_colour() {
    let mut r = PlotRequest::new("t");
    r.colours[2] = "teal".to_string();
    assert!(matches!(r.validate(), Err(PlotError::InvalidColour(ref c)) if c == "teal"));
    r.colours[2] = "#12345g".to_string();
    assert!(r.validate().is_err());
}

#[test]
fn test_build_args_order() {
    let renderer = RscriptRenderer::new("plot.R");
    assert_eq!(renderer.program, "Rscript");
    let mut request = PlotRequest::new("My assay");
    request.include_timestamp = false;
    request.quadrants = [true, false, true, false];
    let args = renderer.build_args(Path::new("in.xlsx"), Path::new("out.png"), &request);
    assert_eq!(
        args,
        vec![
            "plot.R", "in.xlsx", "out.png", "false", "#ff7e79", "#ffd479", "#009193", "#d783ff",
            "My assay", "true", "false", "true", "false",
        ]
    );
}

#[test]
fn test_collect_plate_pngs() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("Plate1.png"), b"p1").unwrap();
    fs::write(dir.path().join("Plate 2.png"), b"p2").unwrap();
    fs::write(dir.path().join("summary_plot.png"), b"s").unwrap();
    fs::write(dir.path().join("Plate3.txt"), b"x").unwrap();
    let found = collect_plate_pngs(dir.path()).unwrap();
    assert_eq!(found.keys().collect::<Vec<_>>(), vec!["Plate 2", "Plate1"]);
    assert_eq!(found["Plate1"], b"p1".to_vec());
}

#[test]
fn test_renderer_seam() {
    let renderer = FixedRenderer(vec![1, 2, 3]);
    let plots = renderer
        .render(Path::new("x.xlsx"), &PlotRequest::new("t"))
        .unwrap();
    assert_eq!(plots.summary_png, vec![1, 2, 3]);
    let mut bad = PlotRequest::new("t");
    bad.colours[0] = "red".to_string();
    assert!(renderer.render(Path::new("x.xlsx"), &bad).is_err());
}

#[test]
fn test_missing_program_is_io_error() {
    let renderer = RscriptRenderer {
        program: "nta-workbook-no-such-program".to_string(),
        script: "plot.R".into(),
    };
    let err = renderer
        .render(Path::new("in.xlsx"), &PlotRequest::new("t"))
        .unwrap_err();
    assert!(matches!(err, PlotError::Io(_)));
}

#[cfg(unix)]
#[test]
fn test_failing_script_reports_status() {
    let renderer = RscriptRenderer {
        program: "false".to_string(),
        script: "plot.R".into(),
    };
    let err = renderer
        .render(Path::new("in.xlsx"), &PlotRequest::new("t"))
        .unwrap_err();
    assert!(matches!(err, PlotError::ScriptFailed { .. }));
}

#[cfg(unix)]
#[test]
fn test_script_without_output_image() {
    let renderer = RscriptRenderer {
        program: "true".to_string(),
        script: "plot.R".into(),
    };
    let err = renderer
        .render(Path::new("in.xlsx"), &PlotRequest::new("t"))
        .unwrap_err();
    assert!(matches!(err, PlotError::MissingImage(_)));
}
