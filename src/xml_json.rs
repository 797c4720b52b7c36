//! XML to JSON conversion.
//!
//! The document is read into a generic object tree and written back out as
//! compact JSON:
//!
//! - the root element's name is dropped; its content is the output object
//! - attributes and child elements become fields named by their local name
//! - an element with neither attributes nor children becomes its text
//! - text mixed with attributes or children is stored under the key `""`
//! - repeated names fold into an array at the first occurrence's position
//!
//! All values are strings. Keys keep document order.

use crate::error::{Error, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use serde_json::{Map, Value};
use tracing::error;

/// Output of [`generate_json`] when conversion fails.
pub const FALLBACK_JSON: &str = "{}";

/// Key under which mixed-in element text is stored.
pub const TEXT_KEY: &str = "";

/// Convert an XML document to a JSON object string.
///
/// The bytes are decoded as UTF-8, replacing invalid sequences.
///
/// # Example
///
/// ```
/// let json = upconvert::xml_to_json(b"<root><a>1</a></root>")?;
/// assert_eq!(json, r#"{"a":"1"}"#);
/// # Ok::<(), upconvert::Error>(())
/// ```
pub fn xml_to_json(data: &[u8]) -> Result<String> {
    let xml = String::from_utf8_lossy(data);
    let object = parse_document(&xml)?;
    Ok(serde_json::to_string(&Value::Object(object))?)
}

/// Convert an XML document to JSON, falling back to `"{}"`.
///
/// Failures are logged and are indistinguishable from an empty document in
/// the return value. Use [`xml_to_json`] to observe them.
pub fn generate_json(data: &[u8]) -> String {
    xml_to_json(data).unwrap_or_else(|err| {
        error!(error = %err, "XML to JSON conversion failed, returning fallback");
        FALLBACK_JSON.to_string()
    })
}

/// Element being built.
#[derive(Debug)]
struct Frame {
    name: String,
    fields: Map<String, Value>,
    text: String,
}

impl Frame {
    fn into_value(self) -> Value {
        if self.fields.is_empty() {
            return Value::String(self.text);
        }

        let mut fields = self.fields;
        let text = self.text.trim();
        if !text.is_empty() {
            insert_field(&mut fields, TEXT_KEY.to_string(), Value::String(text.to_string()));
        }
        Value::Object(fields)
    }
}

/// Insert a field, folding a repeated key into an array.
fn insert_field(fields: &mut Map<String, Value>, key: String, value: Value) {
    match fields.get_mut(&key) {
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        None => {
            fields.insert(key, value);
        }
    }
}

fn root_object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(fields) => fields,
        Value::String(text) if !text.trim().is_empty() => {
            let mut fields = Map::new();
            fields.insert(TEXT_KEY.to_string(), Value::String(text));
            fields
        }
        _ => Map::new(),
    }
}

/// Parse an XML document into the object tree of its root element.
///
/// Anything after the root element closes is not read.
pub fn parse_document(xml: &str) -> Result<Map<String, Value>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().expand_empty_elements = true;

    let mut stack: Vec<Frame> = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let mut frame = Frame {
                    name: String::from_utf8_lossy(e.local_name().as_ref()).into_owned(),
                    fields: Map::new(),
                    text: String::new(),
                };

                for attr in e.attributes() {
                    let attr = attr?;
                    if attr.key.as_namespace_binding().is_some() {
                        continue;
                    }
                    let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
                    let value = attr.unescape_value()?.into_owned();
                    insert_field(&mut frame.fields, key, Value::String(value));
                }

                stack.push(frame);
            }
            Event::Text(e) => {
                let text = e.unescape()?;
                match stack.last_mut() {
                    Some(frame) => frame.text.push_str(&text),
                    None if text.trim().is_empty() => {}
                    None => {
                        return Err(Error::XmlParse(
                            "text outside of the root element".to_string(),
                        ))
                    }
                }
            }
            Event::CData(e) => {
                let text = String::from_utf8_lossy(&e).into_owned();
                match stack.last_mut() {
                    Some(frame) => frame.text.push_str(&text),
                    None => {
                        return Err(Error::XmlParse(
                            "CDATA outside of the root element".to_string(),
                        ))
                    }
                }
            }
            Event::End(_) => {
                let frame = stack
                    .pop()
                    .ok_or_else(|| Error::XmlParse("unexpected end tag".to_string()))?;
                let name = frame.name.clone();
                let value = frame.into_value();

                match stack.last_mut() {
                    Some(parent) => insert_field(&mut parent.fields, name, value),
                    None => return Ok(root_object(value)),
                }
            }
            Event::Eof => {
                return Err(match stack.last() {
                    Some(frame) => Error::XmlParse(format!("unclosed element <{}>", frame.name)),
                    None => Error::XmlParse("no root element".to_string()),
                });
            }
            _ => {}
        }
    }
}
