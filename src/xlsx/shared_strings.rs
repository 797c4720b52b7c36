//! Shared string table (`xl/sharedStrings.xml`).

use crate::error::Result;
use quick_xml::events::Event;
use quick_xml::Reader;

/// Strings referenced by index from `t="s"` cells.
#[derive(Debug, Clone, Default)]
pub struct SharedStrings {
    strings: Vec<String>,
}

impl SharedStrings {
    /// Parse the table. Rich text runs are concatenated and phonetic guides
    /// (`rPh`) are left out. Whitespace inside `<t>` is kept as written.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        let mut strings = Vec::new();

        // Text of the `<si>` being read.
        let mut item: Option<String> = None;
        let mut in_text = false;
        let mut in_phonetic = false;
        let mut buf = Vec::new();

        loop {
            buf.clear();
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"si" => item = Some(String::new()),
                    b"rPh" => in_phonetic = true,
                    b"t" => in_text = item.is_some() && !in_phonetic,
                    _ => {}
                },
                Event::Empty(e) if e.local_name().as_ref() == b"si" => strings.push(String::new()),
                Event::Text(e) if in_text => {
                    if let Some(text) = item.as_mut() {
                        text.push_str(&e.unescape()?);
                    }
                }
                Event::CData(e) if in_text => {
                    if let Some(text) = item.as_mut() {
                        text.push_str(&String::from_utf8_lossy(&e));
                    }
                }
                Event::End(e) => match e.local_name().as_ref() {
                    b"si" => strings.extend(item.take()),
                    b"rPh" => in_phonetic = false,
                    b"t" => in_text = false,
                    _ => {}
                },
                Event::Eof => break,
                _ => {}
            }
        }

        Ok(Self { strings })
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.strings.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }
}
