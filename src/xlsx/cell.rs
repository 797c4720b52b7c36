//! Cell references and cell-to-string coercion.

use chrono::NaiveDateTime;
use std::fmt;

/// Largest row index (0-based) a worksheet can address.
pub const MAX_ROW: u32 = 1_048_575;

/// Largest column index (0-based) a worksheet can address (`XFD`).
pub const MAX_COL: u32 = 16_383;

/// A typed cell value read from a worksheet.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Shared, inline, or plain string cell.
    Text(String),
    /// Numeric cell without a date format.
    Number(f64),
    /// Numeric cell whose number format is a date or time format.
    Date(NaiveDateTime),
    /// Boolean cell.
    Boolean(bool),
    /// Formula cell; holds the formula text without the leading `=`.
    Formula(String),
    /// Error cell such as `#DIV/0!`.
    Error(String),
    /// Cell with no value.
    Blank,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(text) => f.write_str(text),
            CellValue::Number(value) => f.write_str(&format_number(*value)),
            CellValue::Date(date) => write!(f, "{}", date.format("%a %b %d %H:%M:%S UTC %Y")),
            CellValue::Boolean(value) => write!(f, "{}", value),
            CellValue::Formula(formula) => write!(f, "={}", formula),
            CellValue::Error(_) | CellValue::Blank => Ok(()),
        }
    }
}

/// Render a number the way a default `double` string conversion does.
///
/// Magnitudes in `[1e-3, 1e7)` use plain decimal notation with at least one
/// fraction digit; everything else uses scientific notation with an `E`.
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }

    let magnitude = value.abs();
    if magnitude == 0.0 || (1e-3..1e7).contains(&magnitude) {
        let plain = value.to_string();
        if plain.contains('.') {
            plain
        } else {
            format!("{}.0", plain)
        }
    } else {
        let scientific = format!("{:e}", value);
        let (mantissa, exponent) = scientific
            .split_once('e')
            .unwrap_or((scientific.as_str(), "0"));
        if mantissa.contains('.') {
            format!("{}E{}", mantissa, exponent)
        } else {
            format!("{}.0E{}", mantissa, exponent)
        }
    }
}

/// A 0-based cell position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct CellRef {
    pub row: u32,
    pub col: u32,
}

impl CellRef {
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Parse an A1-style reference such as `B12` or `$AA$3`.
    pub fn parse(reference: &str) -> Option<Self> {
        let reference = reference.trim();
        let letters_end = reference
            .char_indices()
            .find(|(_, c)| !c.is_ascii_alphabetic() && *c != '$')
            .map(|(i, _)| i)?;
        let (letters, digits) = reference.split_at(letters_end);
        let col = column_index(letters.trim_matches('$'))?;
        let row: u32 = digits.trim_start_matches('$').parse().ok()?;
        if row == 0 || row - 1 > MAX_ROW {
            return None;
        }
        Some(Self { row: row - 1, col })
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", column_name(self.col), self.row + 1)
    }
}

/// Convert column letters (`A`, `Z`, `AA`) to a 0-based index.
pub fn column_index(letters: &str) -> Option<u32> {
    if letters.is_empty() || letters.len() > 3 {
        return None;
    }
    let mut index: u32 = 0;
    for c in letters.chars() {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        index = index * 26 + (c.to_ascii_uppercase() as u32 - 'A' as u32 + 1);
    }
    let index = index - 1;
    (index <= MAX_COL).then_some(index)
}

/// Convert a 0-based column index to letters.
pub fn column_name(mut index: u32) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push((b'A' + (index % 26) as u8) as char);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    letters.iter().rev().collect()
}
