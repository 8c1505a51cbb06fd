//! Paginated list results.
//!
//! A list envelope looks like
//! `{"data": [...], "paging": {"previous": url, "next": url}}`. The paging
//! URLs are opaque cursors; their query strings are decoded up front so a
//! caller can render or replay them without re-parsing.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::query::{parse_query, Params};

/// Query options decoded from a paging URL, in the order the URL lists them.
pub type PageOptions = Params;

/// Items of a list envelope plus its forward/backward cursors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collection {
    items: Vec<Value>,
    next_url: Option<String>,
    previous_url: Option<String>,
    next_options: Option<PageOptions>,
    previous_options: Option<PageOptions>,
}

impl Collection {
    /// Build a collection from a decoded list envelope.
    ///
    /// A missing or non-array `data` field yields an empty collection; a
    /// missing `paging` block yields no cursors.
    pub fn from_envelope(envelope: &Value) -> Self {
        let items = envelope
            .get("data")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        let paging = envelope.get("paging");
        let cursor = |name: &str| {
            paging
                .and_then(|paging| paging.get(name))
                .and_then(Value::as_str)
                .map(str::to_string)
        };
        Self::new(items, cursor("next"), cursor("previous"))
    }

    pub fn new(items: Vec<Value>, next_url: Option<String>, previous_url: Option<String>) -> Self {
        let next_options = next_url.as_deref().map(parse_query);
        let previous_options = previous_url.as_deref().map(parse_query);
        Self {
            items,
            next_url,
            previous_url,
            next_options,
            previous_options,
        }
    }

    pub fn items(&self) -> &[Value] {
        &self.items
    }

    pub fn into_items(self) -> Vec<Value> {
        self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Deserialize every item into `T`.
    pub fn deserialize_items<T: DeserializeOwned>(&self) -> Result<Vec<T>, serde_json::Error> {
        self.items.iter().cloned().map(serde_json::from_value).collect()
    }

    pub fn next_url(&self) -> Option<&str> {
        self.next_url.as_deref()
    }

    pub fn previous_url(&self) -> Option<&str> {
        self.previous_url.as_deref()
    }

    pub fn next_options(&self) -> Option<&PageOptions> {
        self.next_options.as_ref()
    }

    pub fn previous_options(&self) -> Option<&PageOptions> {
        self.previous_options.as_ref()
    }

    /// First page: nothing before it, something after it.
    pub fn is_first(&self) -> bool {
        !self.has_previous() && self.has_next()
    }

    pub fn has_next(&self) -> bool {
        !is_blank(self.next_url.as_deref())
    }

    pub fn has_previous(&self) -> bool {
        !is_blank(self.previous_url.as_deref())
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|value| value.trim().is_empty())
}

impl IntoIterator for Collection {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
