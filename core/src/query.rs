//! Query parameters and URL formatting.
//!
//! # Design
//! `Params` is an ordered list rather than a hash map: the formatted URL must
//! be deterministic for a given input, and callers expect parameters to come
//! out in the order they were added. A value may be absent; blank values
//! (absent or empty) are dropped whenever parameters are encoded.

use url::form_urlencoded;

/// Ordered query parameters. Keys are unique; inserting an existing key
/// replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    entries: Vec<(String, Option<String>)>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Params::insert`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Builder form of [`Params::insert_opt`].
    pub fn with_opt(mut self, name: impl Into<String>, value: Option<impl Into<String>>) -> Self {
        self.insert_opt(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.insert_opt(name, Some(value));
    }

    pub fn insert_opt(&mut self, name: impl Into<String>, value: Option<impl Into<String>>) {
        let name = name.into();
        let value = value.map(Into::into);
        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        let idx = self.entries.iter().position(|(key, _)| key == name)?;
        self.entries.remove(idx).1
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .and_then(|(_, value)| value.as_deref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(key, _)| key == name)
    }

    /// Overlay `other` on top of `self`: keys from `other` win, new keys are
    /// appended after the existing ones.
    pub fn merge(mut self, other: Params) -> Self {
        for (name, value) in other.entries {
            self.insert_opt(name, value);
        }
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_deref()))
    }

    /// Entries that survive encoding, in order.
    pub fn present(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().filter_map(|(name, value)| match value.as_deref() {
            Some(value) if !value.is_empty() => Some((name.as_str(), value)),
            _ => None,
        })
    }

    /// `name=value` pairs of the non-blank entries joined with `&`.
    ///
    /// Only values are form-encoded; names go out as given, so array-style
    /// names such as `fields[]` reach the server untouched.
    pub fn to_form(&self) -> String {
        let pairs: Vec<String> = self
            .present()
            .map(|(name, value)| {
                let value: String = form_urlencoded::byte_serialize(value.as_bytes()).collect();
                format!("{name}={value}")
            })
            .collect();
        pairs.join("&")
    }
}

impl<K, V> FromIterator<(K, V)> for Params
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (name, value) in iter {
            params.insert(name, value);
        }
        params
    }
}

/// Build `base + path`, followed by a query string of the non-blank params.
///
/// When every parameter is blank (or there are none) no `?` is emitted.
pub fn format_url(base: &str, path: &str, params: &Params) -> String {
    let mut url = String::with_capacity(base.len() + path.len());
    url.push_str(base);
    url.push_str(path);

    let query = params.to_form();
    if !query.is_empty() {
        url.push('?');
        url.push_str(&query);
    }
    url
}

/// Decode the query string of `url` into parameters, in URL order.
///
/// Pairs are split on `&`, then on the first `=`; values are
/// percent-decoded. A repeated name keeps its first position and its last
/// value. A URL without a query yields no parameters.
pub fn parse_query(url: &str) -> Params {
    let query = match url.split_once('?') {
        Some((_, query)) => query,
        None => return Params::new(),
    };
    let query = query.split_once('#').map_or(query, |(query, _)| query);

    form_urlencoded::parse(query.as_bytes())
        .map(|(name, value)| (name.into_owned(), value.into_owned()))
        .collect()
}
