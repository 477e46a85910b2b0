pub mod cell;
pub mod coord;
pub mod layout;
pub mod settings;
pub mod workbook;

pub use cell::{CellFormat, CellValue};
pub use coord::CellRef;
pub use layout::PlateLayout;
pub use settings::RunSettings;
pub use workbook::{Sheet, Workbook};

/// Number of pseudotype variants sharing one plate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PseudotypeCount {
    One,
    Two,
    Three,
    Four,
}

impl PseudotypeCount {
    pub fn new(n: i64) -> Option<Self> {
        match n {
            1 => Some(Self::One),
            2 => Some(Self::Two),
            3 => Some(Self::Three),
            4 => Some(Self::Four),
            _ => None,
        }
    }

    pub fn get(self) -> usize {
        match self {
            Self::One => 1,
            Self::Two => 2,
            Self::Three => 3,
            Self::Four => 4,
        }
    }

    /// Quadrant slots a plate carries results for.
    pub fn slot_count(self) -> usize {
        match self {
            Self::Three => 3,
            _ => layout::QUADRANTS,
        }
    }
}

/// Splits free text on line breaks and commas, trimming and dropping blanks.
pub fn parse_label_list(text: &str) -> Vec<String> {
    text.lines()
        .flat_map(|line| line.split(','))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
#[path = "../../tests/src_inline/model/mod.rs"]
mod tests;
