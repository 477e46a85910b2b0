use serde::{Deserialize, Serialize};

use crate::model::layout::PlateLayout;

pub const SUMMARY_SHEET: &str = "Summary";
pub const UNLABELLED: &str = "Unlabelled";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlateNaming {
    /// `Plate1`, `Plate2`, ...
    #[default]
    Compact,
    /// `Plate 1`, `Plate 2`, ...
    Spaced,
}

impl PlateNaming {
    pub fn sheet_name(self, ordinal: usize) -> String {
        match self {
            PlateNaming::Compact => format!("Plate{}", ordinal),
            PlateNaming::Spaced => format!("Plate {}", ordinal),
        }
    }

    /// 1-based ordinal when `name` is a plate sheet under this convention.
    pub fn ordinal(self, name: &str) -> Option<usize> {
        let rest = name.strip_prefix("Plate")?;
        let digits = match self {
            PlateNaming::Compact => rest,
            PlateNaming::Spaced => rest.strip_prefix(' ')?,
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok().filter(|&n: &usize| n > 0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelLink {
    /// Cross-sheet formula so edits on the plate show up in the summary.
    #[default]
    Live,
    Static,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryPlacement {
    First,
    #[default]
    Last,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CensorGlyphs {
    pub lower: String,
    pub upper: String,
}

impl Default for CensorGlyphs {
    fn default() -> Self {
        Self {
            lower: "<".to_string(),
            upper: "≥".to_string(),
        }
    }
}

/// Per-run conventions. Nothing here is read from global state; callers pass
/// a profile into every stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunSettings {
    pub layout: PlateLayout,
    pub plate_naming: PlateNaming,
    pub label_link: LabelLink,
    pub summary_placement: SummaryPlacement,
    pub glyphs: CensorGlyphs,
    pub summary_column_width: f64,
    pub integer_format: String,
    /// Template sheet to clone; first sheet when unset.
    pub template_sheet: Option<String>,
    /// Append `_YYYY-MM-DD` to the default output file name.
    pub timestamp_in_filename: bool,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self::standard_v1()
    }
}

impl RunSettings {
    pub fn standard_v1() -> Self {
        Self {
            layout: PlateLayout::default(),
            plate_naming: PlateNaming::Compact,
            label_link: LabelLink::Live,
            summary_placement: SummaryPlacement::Last,
            glyphs: CensorGlyphs::default(),
            summary_column_width: 15.0,
            integer_format: "0".to_string(),
            template_sheet: None,
            timestamp_in_filename: false,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/model/settings.rs"]
mod tests;
