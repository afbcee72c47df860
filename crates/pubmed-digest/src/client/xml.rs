//! XML to value-tree conversion for E-utilities responses.
//!
//! Builds a [`serde_json::Value`] with the following conventions:
//! - attributes become `"@name"` keys, element text becomes `"#text"`
//! - an element with neither attributes nor children collapses to its text
//!   (or `null` when empty)
//! - a child element that occurs once is stored as-is; repeated siblings
//!   become a list
//!
//! The last rule means the same field can arrive as a string, a mapping, or a
//! list depending on the record. [`crate::normalize`] turns those shapes back
//! into sequences.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use serde_json::{Map, Value};

use crate::error::XmlError;

/// Key under which element text is stored when the element also has attributes or children.
pub const TEXT_KEY: &str = "#text";

/// Prefix for attribute keys.
pub const ATTR_PREFIX: char = '@';

/// Inline formatting elements whose text is folded into the parent's text.
const INLINE_TAGS: &[&[u8]] = &[b"i", b"b", b"u", b"sup", b"sub", b"em", b"strong"];

/// Namespace prefix of embedded MathML; its descendants are folded like inline tags.
const MATHML_PREFIX: &[u8] = b"mml:";

fn is_inline(name: &[u8]) -> bool {
    INLINE_TAGS.contains(&name) || name.starts_with(MATHML_PREFIX)
}

/// Decode entity and character references one at a time.
///
/// A reference that cannot be resolved (such as an HTML-only named entity) is
/// kept as written; the references around it still decode.
fn decode_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let Some(end) = tail.find(';') else {
            out.push_str(tail);
            return out;
        };

        let reference = &tail[..=end];
        match quick_xml::escape::unescape(reference) {
            Ok(decoded) => out.push_str(&decoded),
            Err(_) => out.push_str(reference),
        }
        rest = &tail[end + 1..];
    }

    out.push_str(rest);
    out
}

struct Frame {
    name: String,
    inline: bool,
    fields: Map<String, Value>,
    text: String,
}

impl Frame {
    fn open(start: &BytesStart<'_>) -> Self {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let inline = is_inline(start.name().as_ref());

        let mut fields = Map::new();
        if !inline {
            for attr in start.attributes().flatten() {
                let key = format!("{ATTR_PREFIX}{}", String::from_utf8_lossy(attr.key.as_ref()));
                let value = decode_text(&String::from_utf8_lossy(&attr.value));
                fields.insert(key, Value::String(value));
            }
        }

        Self {
            name,
            inline,
            fields,
            text: String::new(),
        }
    }

    fn into_value(self) -> Value {
        let text = self.text.trim();
        if self.fields.is_empty() {
            return if text.is_empty() {
                Value::Null
            } else {
                Value::String(text.to_string())
            };
        }

        let mut fields = self.fields;
        if !text.is_empty() {
            fields.insert(TEXT_KEY.to_string(), Value::String(text.to_string()));
        }
        Value::Object(fields)
    }
}

/// Insert a child under `name`, turning a repeated key into a list.
fn insert_child(fields: &mut Map<String, Value>, name: String, value: Value) {
    match fields.get_mut(&name) {
        None => {
            fields.insert(name, value);
        }
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
    }
}

fn close(stack: &mut Vec<Frame>, root: &mut Option<Value>) {
    let Some(frame) = stack.pop() else {
        return;
    };

    match stack.last_mut() {
        Some(parent) if frame.inline => parent.text.push_str(&frame.text),
        Some(parent) => {
            let name = frame.name.clone();
            insert_child(&mut parent.fields, name, frame.into_value());
        }
        None => {
            let mut top = Map::new();
            let name = frame.name.clone();
            top.insert(name, frame.into_value());
            *root = Some(Value::Object(top));
        }
    }
}

/// Parse an XML document into a value tree keyed by the root element's name.
///
/// Declarations, doctypes, comments and processing instructions are ignored.
pub fn parse(xml: &str) -> Result<Value, XmlError> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Frame> = Vec::new();
    let mut root: Option<Value> = None;

    loop {
        let event = reader.read_event().map_err(|e| XmlError::Malformed {
            position: reader.error_position() as u64,
            message: e.to_string(),
        })?;

        match event {
            Event::Start(start) => stack.push(Frame::open(&start)),
            Event::Empty(start) => {
                stack.push(Frame::open(&start));
                close(&mut stack, &mut root);
            }
            Event::End(_) => close(&mut stack, &mut root),
            Event::Text(text) => {
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&decode_text(&String::from_utf8_lossy(&text)));
                }
            }
            Event::CData(data) => {
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&String::from_utf8_lossy(&data));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.pop() {
        return Err(XmlError::Unclosed(open.name));
    }

    root.ok_or(XmlError::Empty)
}
