use std::io::Read;

use crate::input::InputError;
use crate::model::layout::DATA_COLS;

/// One plate's raw readings, rows truncated to the data-region width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub rows: Vec<Vec<String>>,
}

impl Block {
    /// Missing cells read as blank.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn max_cols(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }
}

#[derive(Debug, Clone)]
pub struct Stage1Output {
    pub blocks: Vec<Block>,
    /// CSV records read; empty lines are not records.
    pub rows_read: usize,
}

/// Splits CSV text into blocks on empty lines and on records with no
/// non-blank cell. Row lengths are not validated; a trailing unterminated
/// block is kept.
pub fn run_stage1<R: Read>(mut reader: R) -> Result<Stage1Output, InputError> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(&text);

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut blocks = Vec::new();
    let mut current: Vec<Vec<String>> = Vec::new();
    let mut rows_read = 0usize;
    let mut record = csv::StringRecord::new();
    let mut prev_end = 0usize;

    // csv skips empty lines, so they are recovered from the terminator run
    // between the end of one record and the start of the next.
    while rdr.read_record(&mut record)? {
        rows_read += 1;
        let start = record.position().map_or(prev_end, |p| p.byte() as usize);
        let end = rdr.position().byte() as usize;
        let (content_start, content_end) = content_span(text, start, end);
        let gap = text.get(prev_end.min(content_start)..content_start).unwrap_or("");
        if line_breaks(gap) > 1 {
            flush(&mut blocks, &mut current);
        }
        prev_end = content_end;

        if record.iter().all(|cell| cell.trim().is_empty()) {
            flush(&mut blocks, &mut current);
            continue;
        }
        current.push(record.iter().take(DATA_COLS).map(str::to_string).collect());
    }
    flush(&mut blocks, &mut current);

    crate::info!(
        "parsed {} CSV rows into {} block(s)",
        rows_read,
        blocks.len()
    );
    Ok(Stage1Output { blocks, rows_read })
}

fn flush(blocks: &mut Vec<Block>, current: &mut Vec<Vec<String>>) {
    if !current.is_empty() {
        blocks.push(Block {
            rows: std::mem::take(current),
        });
    }
}

fn is_terminator(b: u8) -> bool {
    b == b'\r' || b == b'\n'
}

/// Byte range of a record without the line terminators around it.
fn content_span(text: &str, start: usize, end: usize) -> (usize, usize) {
    let bytes = text.as_bytes();
    let end = end.min(bytes.len());
    let mut lo = start.min(end);
    while lo < end && is_terminator(bytes[lo]) {
        lo += 1;
    }
    let mut hi = end;
    while hi > lo && is_terminator(bytes[hi - 1]) {
        hi -= 1;
    }
    (lo, hi)
}

/// `\r\n`, `\n` and a lone `\r` each end one line.
fn line_breaks(gap: &str) -> usize {
    gap.replace("\r\n", "\n")
        .bytes()
        .filter(|&b| is_terminator(b))
        .count()
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage1_blocks.rs"]
mod tests;
