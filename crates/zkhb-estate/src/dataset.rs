//! `NewDataSet` result extraction.

use serde::Serialize;
use tracing::debug;

use crate::xml::{find_element, XmlMap, XmlValue};

/// Element wrapping the rows of a `GetDataSet` result.
pub const DATA_SET_ELEMENT: &str = "NewDataSet";

/// Element holding one result row.
pub const TABLE_ELEMENT: &str = "Table";

/// One `<Table>` row: column name to value, in document order.
///
/// Row attributes such as `diffgr:id` appear under `@`-prefixed keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Record(XmlMap);

impl Record {
    fn from_table(value: XmlValue) -> Self {
        match value {
            XmlValue::Map(map) => Record(map),
            XmlValue::Text(text) => {
                let mut map = XmlMap::new();
                map.insert("#text", XmlValue::Text(text));
                Record(map)
            }
            XmlValue::Null | XmlValue::List(_) => Record::default(),
        }
    }

    pub fn get(&self, column: &str) -> Option<&XmlValue> {
        self.0.get(column)
    }

    /// Text of a column; `None` when absent, empty or structured.
    pub fn get_text(&self, column: &str) -> Option<&str> {
        self.0.get_text(column)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.0.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &XmlValue)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &XmlMap {
        &self.0
    }

    pub fn into_map(self) -> XmlMap {
        self.0
    }
}

impl From<XmlMap> for Record {
    fn from(map: XmlMap) -> Self {
        Record(map)
    }
}

/// Extract the rows of a `GetDataSet` response.
///
/// Returns one record per `<Table>` child of the first `NewDataSet` element,
/// a single table included. Empty text, unparseable markup, a missing
/// `NewDataSet` or one without tables all give an empty list.
pub fn parse_data_set(text: &str) -> Vec<Record> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let Some(data_set) = find_element(text, DATA_SET_ELEMENT) else {
        debug!("No {DATA_SET_ELEMENT} element in response");
        return Vec::new();
    };

    let tables = match data_set {
        XmlValue::Map(mut map) => map.take(TABLE_ELEMENT),
        _ => None,
    };

    match tables {
        Some(XmlValue::List(items)) => items.into_iter().map(Record::from_table).collect(),
        Some(single) => vec![Record::from_table(single)],
        None => Vec::new(),
    }
}
