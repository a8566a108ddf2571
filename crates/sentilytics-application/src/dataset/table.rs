//! Tabular preview parsing.

use sentilytics_core::dataset::PREVIEW_ROW_LIMIT;

/// Row count and bounded preview of an uploaded text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTable {
    pub row_count: usize,
    pub preview: Vec<Vec<String>>,
}

/// Splits `text` into rows on `'\n'` and each row into fields on `','`.
///
/// This is a plain split: quoted fields containing commas or newlines are
/// not recognised, and `'\r'` is left in place. A trailing newline produces
/// a final empty row, which is counted.
pub fn parse_table(text: &str) -> ParsedTable {
    let mut row_count = 0;
    let mut preview = Vec::with_capacity(PREVIEW_ROW_LIMIT);

    for line in text.split('\n') {
        if preview.len() < PREVIEW_ROW_LIMIT {
            preview.push(line.split(',').map(str::to_string).collect());
        }
        row_count += 1;
    }

    ParsedTable { row_count, preview }
}
