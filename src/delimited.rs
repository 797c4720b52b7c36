//! CSV reader.
//!
//! Every record becomes one row, header line included, with fields kept
//! verbatim apart from quote handling. A blank line becomes a row holding a
//! single empty cell.

use crate::error::Result;
use crate::model::Table;
use csv::{ByteRecord, ReaderBuilder};

/// Read comma-separated records into a table.
///
/// Quoted fields may contain commas, doubled quotes and line breaks. Records
/// may differ in length. Bytes that are not valid UTF-8 are replaced with
/// U+FFFD rather than rejected.
///
/// # Example
///
/// ```
/// let table = upconvert::delimited::read_csv(b"name,note\nann,\"a, b\"\n")?;
/// assert_eq!(table.rows()[1], vec!["ann", "a, b"]);
/// # Ok::<(), upconvert::Error>(())
/// ```
pub fn read_csv(data: &[u8]) -> Result<Table> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(data);

    let mut table = Table::new();
    let mut record = ByteRecord::new();
    while reader.read_byte_record(&mut record)? {
        // The position is taken before the reader skips blank lines.
        let start = record.position().map_or(0, |pos| pos.byte());
        add_blank_rows(&mut table, blank_lines(data, start));
        table.add_row(
            record
                .iter()
                .map(|field| String::from_utf8_lossy(field).into_owned())
                .collect(),
        );
    }
    // The last, failed read still records where it started.
    let end = record.position().map_or(0, |pos| pos.byte());
    add_blank_rows(&mut table, blank_lines(data, end));

    Ok(table)
}

fn add_blank_rows(table: &mut Table, count: usize) {
    for _ in 0..count {
        table.add_row(vec![String::new()]);
    }
}

/// Count the empty lines in the run of line breaks starting at `offset`.
///
/// The terminator of the record that ends at `offset` may not have been
/// consumed yet; it is not counted.
fn blank_lines(data: &[u8], offset: u64) -> usize {
    let offset = usize::try_from(offset).map_or(data.len(), |offset| offset.min(data.len()));
    let rest = &data[offset..];
    let run_len = rest
        .iter()
        .position(|byte| !matches!(byte, b'\r' | b'\n'))
        .unwrap_or(rest.len());
    let run = &rest[..run_len];

    let (run, terminated) = match offset.checked_sub(1).map(|i| data[i]) {
        None | Some(b'\n') => (run, true),
        Some(b'\r') => (run.strip_prefix(b"\n").unwrap_or(run), true),
        Some(_) => (run, false),
    };

    let mut breaks = 0;
    let mut i = 0;
    while i < run.len() {
        i += if run[i..].starts_with(b"\r\n") { 2 } else { 1 };
        breaks += 1;
    }

    if terminated {
        breaks
    } else {
        breaks.saturating_sub(1)
    }
}
