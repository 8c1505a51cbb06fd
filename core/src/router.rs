//! Mapping of logical Graph operations onto HTTP calls.
//!
//! # Design
//! Every operation reduces to one of four primitives: fetch an object
//! (GET), publish to it (POST), remove it (DELETE), or search (GET
//! `/search`). Edges are plain strings, so callers can address any edge the
//! API grows without changes here; `edges` only collects the common names.
//! [`MethodName`] covers callers that carry operations around as compound
//! names such as `publish_feed` or `search_post`.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::error::{Error, Result};
use crate::http::HttpMethod;
use crate::query::Params;

/// Well-known edge names.
pub mod edges {
    pub const FRIENDS: &str = "friends";
    pub const HOME: &str = "home";
    pub const FEED: &str = "feed";
    pub const LIKES: &str = "likes";
    pub const MOVIES: &str = "movies";
    pub const BOOKS: &str = "books";
    pub const NOTES: &str = "notes";
    pub const PHOTOS: &str = "photos";
    pub const VIDEOS: &str = "videos";
    pub const EVENTS: &str = "events";
    pub const GROUPS: &str = "groups";
    pub const COMMENTS: &str = "comments";
    pub const LINKS: &str = "links";
    pub const ATTENDING: &str = "attending";
    pub const MAYBE: &str = "maybe";
    pub const DECLINED: &str = "declined";
}

/// Object types accepted by `/search`.
pub mod search_types {
    pub const ALBUM: &str = "album";
    pub const EVENT: &str = "event";
    pub const GROUP: &str = "group";
    pub const LINK: &str = "link";
    pub const NOTE: &str = "note";
    pub const PAGE: &str = "page";
    pub const PHOTO: &str = "photo";
    pub const POST: &str = "post";
    pub const STATUS: &str = "status";
    pub const USER: &str = "user";
    pub const VIDEO: &str = "video";
}

/// Something that identifies a graph node: a bare id, or a decoded object
/// carrying an `id` member.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectRef {
    Id(String),
    Object(Value),
}

impl ObjectRef {
    /// The node id, or `None` when the reference does not carry one.
    pub fn id(&self) -> Option<String> {
        let id = match self {
            ObjectRef::Id(id) => Some(id.clone()),
            ObjectRef::Object(value) => id_of(value),
        };
        id.filter(|id| !id.is_empty())
    }
}

fn id_of(value: &Value) -> Option<String> {
    match value {
        Value::String(id) => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        Value::Object(map) => map.get("id").and_then(id_of),
        _ => None,
    }
}

impl From<&str> for ObjectRef {
    fn from(id: &str) -> Self {
        ObjectRef::Id(id.to_string())
    }
}

impl From<String> for ObjectRef {
    fn from(id: String) -> Self {
        ObjectRef::Id(id)
    }
}

impl From<&String> for ObjectRef {
    fn from(id: &String) -> Self {
        ObjectRef::Id(id.clone())
    }
}

impl From<Value> for ObjectRef {
    fn from(value: Value) -> Self {
        ObjectRef::Object(value)
    }
}

impl From<&Value> for ObjectRef {
    fn from(value: &Value) -> Self {
        ObjectRef::Object(value.clone())
    }
}

/// A routed operation: method, path relative to the API base, parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphCall {
    pub method: HttpMethod,
    pub path: String,
    pub params: Params,
}

impl GraphCall {
    pub fn new(method: HttpMethod, path: impl Into<String>, params: Params) -> Self {
        Self {
            method,
            path: path.into(),
            params,
        }
    }
}

fn node_path(target: impl Into<ObjectRef>, edge: Option<&str>) -> Result<String> {
    let target: ObjectRef = target.into();
    let id = target.id().ok_or(Error::MissingId)?;
    let mut path = format!("/{}", id.trim_start_matches('/'));
    if let Some(edge) = edge.filter(|edge| !edge.is_empty()) {
        path.push('/');
        path.push_str(edge.trim_matches('/'));
    }
    Ok(path)
}

/// GET `/<id>`.
pub fn object(target: impl Into<ObjectRef>, params: Params) -> Result<GraphCall> {
    Ok(GraphCall::new(HttpMethod::Get, node_path(target, None)?, params))
}

/// GET `/<id>/<edge>`.
pub fn edge(target: impl Into<ObjectRef>, edge: &str, params: Params) -> Result<GraphCall> {
    Ok(GraphCall::new(HttpMethod::Get, node_path(target, Some(edge))?, params))
}

/// GET `/me`, or `/me/<edge>` when an edge is given.
pub fn me(edge: Option<&str>, params: Params) -> GraphCall {
    let mut path = String::from("/me");
    if let Some(edge) = edge.filter(|edge| !edge.is_empty()) {
        path.push('/');
        path.push_str(edge.trim_matches('/'));
    }
    GraphCall::new(HttpMethod::Get, path, params)
}

/// GET `/?ids=a,b,...`. References without an id are skipped; if none has
/// one the call fails with [`Error::MissingId`].
pub fn objects<I, R>(targets: I, params: Params) -> Result<GraphCall>
where
    I: IntoIterator<Item = R>,
    R: Into<ObjectRef>,
{
    let ids: Vec<String> = targets
        .into_iter()
        .filter_map(|target| Into::<ObjectRef>::into(target).id())
        .collect();
    if ids.is_empty() {
        return Err(Error::MissingId);
    }
    let params = params.with("ids", ids.join(","));
    Ok(GraphCall::new(HttpMethod::Get, "/", params))
}

/// POST `/<id>`.
pub fn publish(target: impl Into<ObjectRef>, params: Params) -> Result<GraphCall> {
    Ok(GraphCall::new(HttpMethod::Post, node_path(target, None)?, params))
}

/// POST `/<id>/<edge>`, e.g. writing to a feed or commenting on a post.
pub fn publish_edge(target: impl Into<ObjectRef>, edge: &str, params: Params) -> Result<GraphCall> {
    Ok(GraphCall::new(HttpMethod::Post, node_path(target, Some(edge))?, params))
}

/// DELETE `/<id>`.
pub fn remove(target: impl Into<ObjectRef>, params: Params) -> Result<GraphCall> {
    Ok(GraphCall::new(HttpMethod::Delete, node_path(target, None)?, params))
}

/// DELETE `/<id>/<edge>`, e.g. unliking a post.
pub fn remove_edge(target: impl Into<ObjectRef>, edge: &str, params: Params) -> Result<GraphCall> {
    Ok(GraphCall::new(HttpMethod::Delete, node_path(target, Some(edge))?, params))
}

/// GET `/search?q=<query>`; `params` follow `q`.
pub fn search(query: &str, params: Params) -> GraphCall {
    let params = Params::new().with("q", query).merge(params);
    GraphCall::new(HttpMethod::Get, "/search", params)
}

/// Search restricted to one object type.
pub fn search_type(query: &str, object_type: &str, params: Params) -> GraphCall {
    search(query, params.with("type", object_type))
}

/// GET `/<client_id>/insights[/<metric_path>]` with the app access token.
pub fn insights(
    client_id: &str,
    app_access_token: &str,
    metric_path: Option<&str>,
    params: Params,
) -> GraphCall {
    let mut path = format!("/{client_id}/insights");
    if let Some(metric_path) = metric_path.filter(|m| !m.is_empty()) {
        path.push('/');
        path.push_str(metric_path.trim_matches('/'));
    }
    let params = Params::new().with("access_token", app_access_token).merge(params);
    GraphCall::new(HttpMethod::Get, path, params)
}

/// Leading word of a compound method name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Object,
    Me,
    Publish,
    Remove,
    Search,
}

impl FromStr for Verb {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "object" => Ok(Verb::Object),
            "me" => Ok(Verb::Me),
            "publish" => Ok(Verb::Publish),
            "remove" => Ok(Verb::Remove),
            "search" => Ok(Verb::Search),
            other => Err(Error::UnknownMethod(other.to_string())),
        }
    }
}

/// A compound operation name: `<verb>_<category>`.
///
/// The category is an edge name for `object`, `me`, `publish` and `remove`,
/// and an object type for `search`. Any category is accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodName {
    pub verb: Verb,
    pub category: String,
}

impl MethodName {
    pub fn parse(name: &str) -> Result<Self> {
        let unknown = || Error::UnknownMethod(name.to_string());
        let (verb, category) = name.split_once('_').ok_or_else(unknown)?;
        if category.is_empty() {
            return Err(unknown());
        }
        Ok(Self {
            verb: verb.parse().map_err(|_| unknown())?,
            category: category.to_string(),
        })
    }

    /// Route this operation. `target` is the node for `object`, `publish`
    /// and `remove`, the query text for `search`, and ignored for `me`.
    pub fn route(&self, target: Option<ObjectRef>, params: Params) -> Result<GraphCall> {
        let category = self.category.as_str();
        let require = |target: Option<ObjectRef>| target.ok_or(Error::MissingId);
        match self.verb {
            Verb::Object => edge(require(target)?, category, params),
            Verb::Me => Ok(me(Some(category), params)),
            Verb::Publish => publish_edge(require(target)?, category, params),
            Verb::Remove => remove_edge(require(target)?, category, params),
            Verb::Search => {
                let query = require(target)?.id().ok_or(Error::MissingId)?;
                Ok(search_type(&query, category, params))
            }
        }
    }
}

impl FromStr for MethodName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        MethodName::parse(s)
    }
}

impl fmt::Display for MethodName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self.verb {
            Verb::Object => "object",
            Verb::Me => "me",
            Verb::Publish => "publish",
            Verb::Remove => "remove",
            Verb::Search => "search",
        };
        write!(f, "{verb}_{}", self.category)
    }
}
