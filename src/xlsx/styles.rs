//! Cell number formats from `xl/styles.xml`, used to tell dates from numbers.

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use quick_xml::events::{BytesStart, Event};
use std::collections::HashMap;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Number format of every cell style.
#[derive(Debug, Default)]
pub struct Styles {
    /// Custom formats declared in `<numFmts>`, by id.
    num_fmts: HashMap<u32, String>,
    /// `numFmtId` of each `<cellXfs>` entry; a cell's `s` indexes this.
    cell_xfs: Vec<u32>,
}

fn num_fmt_id(e: &BytesStart<'_>) -> u32 {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == b"numFmtId")
        .and_then(|attr| String::from_utf8_lossy(&attr.value).parse().ok())
        .unwrap_or(0)
}

impl Styles {
    /// Parse the style sheet.
    ///
    /// Unreadable styles only lose date detection, so parse errors end the
    /// scan instead of failing the workbook.
    pub fn parse(xml: &str) -> Self {
        let mut styles = Self::default();
        let mut reader = quick_xml::Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();
        let mut in_num_fmts = false;
        let mut in_cell_xfs = false;

        loop {
            buf.clear();
            let (e, is_empty) = match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => (e, false),
                Ok(Event::Empty(e)) => (e, true),
                Ok(Event::End(e)) => {
                    match e.local_name().as_ref() {
                        b"numFmts" => in_num_fmts = false,
                        b"cellXfs" => in_cell_xfs = false,
                        _ => {}
                    }
                    continue;
                }
                Ok(Event::Eof) | Err(_) => break,
                _ => continue,
            };

            match e.local_name().as_ref() {
                b"numFmts" => in_num_fmts = !is_empty,
                b"cellXfs" => in_cell_xfs = !is_empty,
                b"numFmt" if in_num_fmts => {
                    let mut id: Option<u32> = None;
                    let mut format_code = String::new();
                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"numFmtId" => {
                                id = String::from_utf8_lossy(&attr.value).parse().ok();
                            }
                            b"formatCode" => {
                                format_code = attr
                                    .unescape_value()
                                    .map(|v| v.into_owned())
                                    .unwrap_or_else(|_| {
                                        String::from_utf8_lossy(&attr.value).into_owned()
                                    });
                            }
                            _ => {}
                        }
                    }
                    if let Some(id) = id {
                        styles.num_fmts.insert(id, format_code);
                    }
                }
                b"xf" if in_cell_xfs => styles.cell_xfs.push(num_fmt_id(&e)),
                _ => {}
            }
        }

        styles
    }

    /// Number format id of a cell style.
    pub fn number_format_id(&self, style_index: usize) -> Option<u32> {
        self.cell_xfs.get(style_index).copied()
    }

    /// Check whether a cell style formats numbers as dates or times.
    pub fn is_date_style(&self, style_index: usize) -> bool {
        self.number_format_id(style_index)
            .is_some_and(|id| self.is_date_format_id(id))
    }

    /// Whether a number format id, built-in or custom, formats dates or times.
    pub fn is_date_format_id(&self, num_fmt_id: u32) -> bool {
        // Built-in formats 14-22 are dates, 45-47 are times
        if (14..=22).contains(&num_fmt_id) || (45..=47).contains(&num_fmt_id) {
            return true;
        }

        match self.num_fmts.get(&num_fmt_id) {
            Some(format_code) => is_date_format_code(format_code),
            None => false,
        }
    }
}

/// Check if a format code string represents a date or time format.
///
/// Date tokens (`d`, `m`, `y`, `h`, `s`) count only outside quoted text,
/// escaped characters, and bracketed modifiers. Elapsed-time brackets such
/// as `[h]` count as time.
pub fn is_date_format_code(format_code: &str) -> bool {
    // only the positive section decides
    let section = format_code.split(';').next().unwrap_or("");
    if section.to_ascii_lowercase().contains("general") {
        return false;
    }

    let mut chars = section.chars();
    while let Some(c) = chars.next() {
        match c {
            '"' => {
                for q in chars.by_ref() {
                    if q == '"' {
                        break;
                    }
                }
            }
            '\\' | '_' | '*' => {
                chars.next();
            }
            '[' => {
                let inner: String = chars.by_ref().take_while(|&b| b != ']').collect();
                let inner = inner.to_ascii_lowercase();
                if !inner.is_empty() && inner.chars().all(|b| matches!(b, 'h' | 'm' | 's')) {
                    return true;
                }
            }
            _ => {
                if matches!(c.to_ascii_lowercase(), 'd' | 'm' | 'y' | 'h' | 's') {
                    return true;
                }
            }
        }
    }

    false
}

/// Convert an Excel serial number to a calendar date-time.
///
/// The 1900 date system keeps Excel's fictitious 1900-02-29 (serial 60),
/// which maps to 1900-03-01 like serial 61. Negative serials are not dates.
pub fn serial_to_datetime(serial: f64, date1904: bool) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }

    let whole_days = serial.floor() as i64;
    let millis_in_day = ((serial - whole_days as f64) * MILLIS_PER_DAY + 0.5) as i64;

    let (epoch, adjust) = if date1904 {
        (NaiveDate::from_ymd_opt(1904, 1, 1)?, 0)
    } else if whole_days < 61 {
        (NaiveDate::from_ymd_opt(1899, 12, 31)?, 0)
    } else {
        (NaiveDate::from_ymd_opt(1899, 12, 31)?, -1)
    };

    let date = epoch.checked_add_signed(TimeDelta::try_days(whole_days + adjust)?)?;
    date.and_hms_opt(0, 0, 0)?
        .checked_add_signed(TimeDelta::try_milliseconds(millis_in_day)?)
}
