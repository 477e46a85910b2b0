use std::path::{Path, PathBuf};

pub mod settings;
pub mod xlsx;

use crate::model::{Sheet, Workbook};

#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("template not found or unreadable: {}", .0.display())]
    TemplateNotFound(PathBuf),
    #[error("template {} has no sheet named {1}", .0.display())]
    TemplateSheetMissing(PathBuf, String),
    #[error("template {} has no sheets", .0.display())]
    TemplateEmpty(PathBuf),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("workbook error: {0}")]
    Workbook(#[from] calamine::XlsxError),
    #[error("settings error: {0}")]
    Settings(#[from] serde_json::Error),
    #[error("missing input: {0}")]
    MissingInput(String),
}

/// Read-only grid every plate is cloned from.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateGrid {
    pub source: PathBuf,
    pub sheet: Sheet,
}

impl TemplateGrid {
    pub fn from_sheet(source: impl Into<PathBuf>, sheet: Sheet) -> Self {
        Self {
            source: source.into(),
            sheet,
        }
    }
}

/// Loads the template sheet (`sheet_name`, or the first sheet).
pub fn load_template(path: &Path, sheet_name: Option<&str>) -> Result<TemplateGrid, InputError> {
    if !path.is_file() {
        return Err(InputError::TemplateNotFound(path.to_path_buf()));
    }
    let mut workbook = xlsx::read_workbook(path).map_err(|e| match e {
        InputError::Io(_) | InputError::Workbook(_) => {
            crate::warn!("cannot read template {}: {}", path.display(), e);
            InputError::TemplateNotFound(path.to_path_buf())
        }
        other => other,
    })?;

    let sheet = match sheet_name {
        Some(name) => {
            let idx = workbook.position(name).ok_or_else(|| {
                InputError::TemplateSheetMissing(path.to_path_buf(), name.to_string())
            })?;
            workbook.sheets.swap_remove(idx)
        }
        None => {
            if workbook.sheets.is_empty() {
                return Err(InputError::TemplateEmpty(path.to_path_buf()));
            }
            workbook.sheets.remove(0)
        }
    };

    crate::info!(
        "loaded template sheet '{}' from {} ({} cells)",
        sheet.name,
        path.display(),
        sheet.cells().count()
    );
    Ok(TemplateGrid::from_sheet(path, sheet))
}

pub fn load_workbook(path: &Path) -> Result<Workbook, InputError> {
    if !path.is_file() {
        return Err(InputError::MissingInput(format!(
            "workbook {} does not exist",
            path.display()
        )));
    }
    let workbook = xlsx::read_workbook(path)?;
    crate::info!(
        "loaded workbook {} with sheets [{}]",
        path.display(),
        workbook.sheet_names().join(", ")
    );
    Ok(workbook)
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/tests.rs"]
mod tests;
