use serde::{Deserialize, Serialize};

use crate::model::coord::{CellRef, a1};

pub const QUADRANTS: usize = 4;
pub const DATA_ROWS: usize = 8;
pub const DATA_COLS: usize = 12;

/// Result cells of one quadrant slot: three replicates plus the aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitreSlot {
    pub replicates: [CellRef; 3],
    pub aggregate: CellRef,
}

impl TitreSlot {
    /// Summary column order: replicates then aggregate.
    pub fn cells(&self) -> [CellRef; 4] {
        [
            self.replicates[0],
            self.replicates[1],
            self.replicates[2],
            self.aggregate,
        ]
    }
}

/// Cell contract between the template and every pipeline stage. Stages never
/// spell a coordinate themselves; they read it from here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlateLayout {
    pub title: CellRef,
    pub pseudotype_labels: [CellRef; QUADRANTS],
    pub sample_labels: [CellRef; QUADRANTS],
    /// Top-left of the 8×12 data region.
    pub data_origin: CellRef,
    pub nt90: [TitreSlot; QUADRANTS],
    pub nt50: [TitreSlot; QUADRANTS],
    pub lower_limit: CellRef,
    pub upper_limit: Option<CellRef>,
}

const fn slot(col: char, row: u32, aggregate: CellRef) -> TitreSlot {
    let first = a1(col, row);
    TitreSlot {
        replicates: [first, first.offset(0, 1), first.offset(0, 2)],
        aggregate,
    }
}

pub const STANDARD_LAYOUT: PlateLayout = PlateLayout {
    title: a1('B', 2),
    pseudotype_labels: [a1('B', 3), a1('E', 3), a1('H', 3), a1('K', 3)],
    sample_labels: [a1('B', 4), a1('E', 4), a1('H', 4), a1('K', 4)],
    data_origin: a1('B', 5),
    nt90: [
        slot('B', 14, a1('D', 14)),
        slot('E', 14, a1('G', 14)),
        slot('H', 14, a1('J', 14)),
        slot('K', 14, a1('M', 14)),
    ],
    nt50: [
        slot('B', 16, a1('D', 16)),
        slot('E', 16, a1('G', 16)),
        slot('H', 16, a1('J', 16)),
        slot('K', 16, a1('M', 16)),
    ],
    lower_limit: a1('A', 5),
    upper_limit: Some(a1('A', 11)),
};

impl Default for PlateLayout {
    fn default() -> Self {
        STANDARD_LAYOUT
    }
}

impl PlateLayout {
    pub fn data_cell(&self, row: usize, col: usize) -> CellRef {
        self.data_origin.offset(row as u32, col as u16)
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/model/layout.rs"]
mod tests;
