//! Shared formula expansion.
//!
//! A shared formula is stored once on its anchor cell; the other cells of the
//! range carry only `<f t="shared" si=".."/>`. Their formula is the anchor's
//! with every relative A1 reference moved by the distance to the anchor.

use super::cell::{column_index, column_name, CellRef, MAX_COL, MAX_ROW};

/// Anchor formula of a shared formula group.
#[derive(Debug, Clone)]
pub struct SharedFormula {
    pub anchor: CellRef,
    pub text: String,
}

impl SharedFormula {
    /// Formula text as seen from `target`.
    pub fn expand_at(&self, target: CellRef) -> String {
        let row_delta = i64::from(target.row) - i64::from(self.anchor.row);
        let col_delta = i64::from(target.col) - i64::from(self.anchor.col);
        shift_references(&self.text, row_delta, col_delta)
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '.'
}

/// Move every relative A1 reference in `formula` by the given offsets.
///
/// String literals and quoted sheet names are copied untouched. A reference
/// pushed outside the sheet becomes `#REF!`.
pub fn shift_references(formula: &str, row_delta: i64, col_delta: i64) -> String {
    if row_delta == 0 && col_delta == 0 {
        return formula.to_string();
    }

    let chars: Vec<char> = formula.chars().collect();
    let mut out = String::with_capacity(formula.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c == '"' || c == '\'' {
            // copy through the closing quote; doubled quotes are escapes
            out.push(c);
            i += 1;
            while i < chars.len() {
                out.push(chars[i]);
                if chars[i] == c {
                    if chars.get(i + 1) == Some(&c) {
                        out.push(c);
                        i += 2;
                        continue;
                    }
                    i += 1;
                    break;
                }
                i += 1;
            }
            continue;
        }

        let starts_token = c == '$' || c.is_ascii_alphabetic();
        let after_name = i > 0 && (is_name_char(chars[i - 1]) || chars[i - 1] == '$');
        if starts_token && !after_name {
            if let Some((len, shifted)) = match_reference(&chars[i..], row_delta, col_delta) {
                out.push_str(&shifted);
                i += len;
                continue;
            }
            // not a reference: copy the whole name so its tail is not re-scanned
            while i < chars.len() && (is_name_char(chars[i]) || chars[i] == '$') {
                out.push(chars[i]);
                i += 1;
            }
            continue;
        }

        out.push(c);
        i += 1;
    }

    out
}

/// Match `[$]letters[$]digits` at the start of `chars` and return its length
/// and shifted text.
fn match_reference(chars: &[char], row_delta: i64, col_delta: i64) -> Option<(usize, String)> {
    let mut i = 0;

    let col_absolute = chars.first() == Some(&'$');
    if col_absolute {
        i += 1;
    }
    let letters_start = i;
    while i < chars.len() && chars[i].is_ascii_alphabetic() {
        i += 1;
    }
    let letters: String = chars[letters_start..i].iter().collect();

    let row_absolute = chars.get(i) == Some(&'$');
    if row_absolute {
        i += 1;
    }
    let digits_start = i;
    while i < chars.len() && chars[i].is_ascii_digit() {
        i += 1;
    }
    let digits: String = chars[digits_start..i].iter().collect();

    // function calls, sheet prefixes and longer names are not references
    if let Some(next) = chars.get(i) {
        if is_name_char(*next) || matches!(next, '(' | '!' | '$') {
            return None;
        }
    }

    let col = column_index(&letters)?;
    let row: u32 = digits.parse().ok()?;
    if row == 0 {
        return None;
    }
    let row = row - 1;

    let new_col = if col_absolute {
        i64::from(col)
    } else {
        i64::from(col) + col_delta
    };
    let new_row = if row_absolute {
        i64::from(row)
    } else {
        i64::from(row) + row_delta
    };

    if !(0..=i64::from(MAX_COL)).contains(&new_col) || !(0..=i64::from(MAX_ROW)).contains(&new_row)
    {
        return Some((i, "#REF!".to_string()));
    }

    let mut shifted = String::new();
    if col_absolute {
        shifted.push('$');
    }
    shifted.push_str(&column_name(new_col as u32));
    if row_absolute {
        shifted.push('$');
    }
    shifted.push_str(&(new_row + 1).to_string());

    Some((i, shifted))
}
