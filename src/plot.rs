use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::model::layout::QUADRANTS;

pub const DEFAULT_COLOURS: [&str; QUADRANTS] = ["#ff7e79", "#ffd479", "#009193", "#d783ff"];

#[derive(Debug, thiserror::Error)]
pub enum PlotError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("plot script {} failed ({status}): {stderr}", .script.display())]
    ScriptFailed {
        script: PathBuf,
        status: String,
        stderr: String,
    },
    #[error("plot script produced no image at {}", .0.display())]
    MissingImage(PathBuf),
    #[error("invalid colour '{0}' (expected #rrggbb)")]
    InvalidColour(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlotRequest {
    pub title: String,
    pub include_timestamp: bool,
    pub colours: [String; QUADRANTS],
    pub quadrants: [bool; QUADRANTS],
}

impl PlotRequest {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            include_timestamp: true,
            colours: DEFAULT_COLOURS.map(str::to_string),
            quadrants: [true; QUADRANTS],
        }
    }

    pub fn validate(&self) -> Result<(), PlotError> {
        for colour in &self.colours {
            let hex = colour.strip_prefix('#').unwrap_or("");
            if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(PlotError::InvalidColour(colour.clone()));
            }
        }
        Ok(())
    }
}

/// Images handed back by a plotting collaborator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedPlots {
    pub summary_png: Vec<u8>,
    /// Keyed by plate sheet name.
    pub plate_pngs: BTreeMap<String, Vec<u8>>,
}

pub trait PlotRenderer {
    fn render(&self, workbook_path: &Path, request: &PlotRequest) -> Result<RenderedPlots, PlotError>;
}

/// Runs the R plotting script as a subprocess.
#[derive(Debug, Clone)]
pub struct RscriptRenderer {
    pub program: String,
    pub script: PathBuf,
}

impl RscriptRenderer {
    pub fn new(script: impl Into<PathBuf>) -> Self {
        Self {
            program: "Rscript".to_string(),
            script: script.into(),
        }
    }

    /// `<script> <xlsx> <png> <timestamp> <c1..c4> <title> <q1..q4>`
    pub fn build_args(&self, workbook_path: &Path, output_png: &Path, request: &PlotRequest) -> Vec<String> {
        let mut args = vec![
            self.script.display().to_string(),
            workbook_path.display().to_string(),
            output_png.display().to_string(),
            request.include_timestamp.to_string(),
        ];
        args.extend(request.colours.iter().cloned());
        args.push(request.title.clone());
        args.extend(request.quadrants.iter().map(|q| q.to_string()));
        args
    }
}

impl PlotRenderer for RscriptRenderer {
    fn render(&self, workbook_path: &Path, request: &PlotRequest) -> Result<RenderedPlots, PlotError> {
        request.validate()?;
        let scratch = tempfile::tempdir()?;
        let output_png = scratch.path().join("summary_plot.png");
        let args = self.build_args(workbook_path, &output_png, request);

        crate::info!("running {} {}", self.program, args.join(" "));
        let output = Command::new(&self.program).args(&args).output()?;
        if !output.status.success() {
            return Err(PlotError::ScriptFailed {
                script: self.script.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        if !output_png.is_file() {
            return Err(PlotError::MissingImage(output_png));
        }

        let summary_png = fs::read(&output_png)?;
        let plate_pngs = collect_plate_pngs(scratch.path())?;
        crate::info!(
            "plot script returned summary image ({} bytes) and {} plate image(s)",
            summary_png.len(),
            plate_pngs.len()
        );
        Ok(RenderedPlots {
            summary_png,
            plate_pngs,
        })
    }
}

/// `PlateN.png` files the script left beside the summary image.
pub fn collect_plate_pngs(dir: &Path) -> Result<BTreeMap<String, Vec<u8>>, PlotError> {
    let mut out = BTreeMap::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("png") {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        if stem.starts_with("Plate") {
            out.insert(stem.to_string(), fs::read(&path)?);
        }
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../tests/src_inline/plot.rs"]
mod tests;
