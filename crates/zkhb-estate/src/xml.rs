//! Tolerant XML to ordered-map conversion.
//!
//! Elements convert the way the service's DataSet consumers expect:
//!
//! - no attributes, children or text → [`XmlValue::Null`]
//! - text only → [`XmlValue::Text`]
//! - otherwise an [`XmlMap`] with attributes under `@name`, child elements
//!   under their qualified name and text under `#text`
//!
//! Sibling elements sharing a name collapse into one [`XmlValue::List`] at the
//! position of the first occurrence. A single child therefore stays a bare
//! value; callers that expect rows must normalize (see [`crate::dataset`]).

use std::borrow::Cow;

use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::Reader;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use tracing::debug;

/// A converted XML element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlValue {
    Null,
    Text(String),
    Map(XmlMap),
    List(Vec<XmlValue>),
}

impl XmlValue {
    pub fn is_null(&self) -> bool {
        matches!(self, XmlValue::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            XmlValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&XmlMap> {
        match self {
            XmlValue::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[XmlValue]> {
        match self {
            XmlValue::List(items) => Some(items),
            _ => None,
        }
    }
}

/// Insertion-ordered map of element content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlMap {
    entries: Vec<(String, XmlValue)>,
}

impl XmlMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&XmlValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, value)| value)
    }

    /// The text of `key` when it is a text-only element.
    pub fn get_text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(XmlValue::as_text)
    }

    /// Remove and return the value under `key`.
    pub fn take(&mut self, key: &str) -> Option<XmlValue> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &XmlValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert a value; a repeated key turns the existing entry into a list.
    pub fn insert(&mut self, key: impl Into<String>, value: XmlValue) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, XmlValue::List(items))) => items.push(value),
            Some((_, existing)) => {
                let first = std::mem::replace(existing, XmlValue::Null);
                *existing = XmlValue::List(vec![first, value]);
            }
            None => self.entries.push((key, value)),
        }
    }
}

impl Serialize for XmlValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            XmlValue::Null => serializer.serialize_none(),
            XmlValue::Text(text) => serializer.serialize_str(text),
            XmlValue::Map(map) => map.serialize(serializer),
            XmlValue::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
        }
    }
}

impl Serialize for XmlMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// An element still being read.
struct Frame {
    name: String,
    attributes: Vec<(String, String)>,
    children: XmlMap,
    text: String,
}

impl Frame {
    fn open(start: &BytesStart<'_>) -> Self {
        let mut attributes = Vec::new();
        let mut attrs = start.attributes();
        attrs.with_checks(false);
        for attr in attrs.flatten() {
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = match attr.unescape_value() {
                Ok(value) => value.into_owned(),
                Err(_) => String::from_utf8_lossy(&attr.value).into_owned(),
            };
            attributes.push((key, value));
        }

        Self {
            name: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
            attributes,
            children: XmlMap::new(),
            text: String::new(),
        }
    }

    fn close(self) -> (String, XmlValue) {
        let text = self.text.trim();

        if self.attributes.is_empty() && self.children.is_empty() {
            let value = if text.is_empty() {
                XmlValue::Null
            } else {
                XmlValue::Text(text.to_string())
            };
            return (self.name, value);
        }

        let mut map = XmlMap::new();
        for (key, value) in self.attributes {
            map.insert(format!("@{key}"), XmlValue::Text(value));
        }
        map.entries.extend(self.children.entries);
        if !text.is_empty() {
            map.insert("#text", XmlValue::Text(text.to_string()));
        }
        (self.name, XmlValue::Map(map))
    }
}

fn unescape_lossy(text: &BytesText<'_>) -> String {
    match text.unescape() {
        Ok(Cow::Borrowed(s)) => s.to_string(),
        Ok(Cow::Owned(s)) => s,
        Err(_) => unescape_each(&String::from_utf8_lossy(text)),
    }
}

/// Resolve entity references one at a time. Unknown entities such as
/// `&nbsp;` are kept as written; the others are still resolved.
fn unescape_each(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let end = tail[1..]
            .find(|c: char| c == ';' || c == '&' || c.is_whitespace())
            .map(|i| i + 1);
        match end {
            Some(end) if tail[end..].starts_with(';') => {
                let entity = &tail[..=end];
                match unescape(entity) {
                    Ok(resolved) => out.push_str(&resolved),
                    Err(_) => out.push_str(entity),
                }
                rest = &tail[end + 1..];
            }
            _ => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Find the first element whose local name is `local_name` and convert it.
///
/// End-tag names are not checked and undeclared entities are kept raw, so
/// loosely formed markup still converts. Syntax errors or input that ends
/// before the element closes give `None`.
pub fn find_element(text: &str, local_name: &str) -> Option<XmlValue> {
    let mut reader = Reader::from_str(text);
    let config = reader.config_mut();
    config.trim_text(true);
    config.check_end_names = false;

    let mut stack: Vec<Frame> = Vec::new();

    loop {
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(err) => {
                debug!(
                    error = %err,
                    position = reader.buffer_position(),
                    "Unparseable XML while looking for {local_name}"
                );
                return None;
            }
        };

        match event {
            Event::Start(start) => {
                if stack.is_empty() && start.local_name().as_ref() != local_name.as_bytes() {
                    continue;
                }
                stack.push(Frame::open(&start));
            }
            Event::Empty(start) => match stack.last_mut() {
                Some(parent) => {
                    let (name, value) = Frame::open(&start).close();
                    parent.children.insert(name, value);
                }
                None if start.local_name().as_ref() == local_name.as_bytes() => {
                    return Some(Frame::open(&start).close().1);
                }
                None => {}
            },
            Event::Text(text) => {
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&unescape_lossy(&text));
                }
            }
            Event::CData(data) => {
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&String::from_utf8_lossy(&data));
                }
            }
            Event::End(_) => {
                if let Some(frame) = stack.pop() {
                    let (name, value) = frame.close();
                    match stack.last_mut() {
                        Some(parent) => parent.children.insert(name, value),
                        None => return Some(value),
                    }
                }
            }
            Event::Eof => {
                if !stack.is_empty() {
                    debug!("XML ended before {local_name} was closed");
                }
                return None;
            }
            _ => {}
        }
    }
}
