//! In-memory imitation of the Graph API surface used by `graph-core`.
//!
//! Seeded with a couple of users and a page. Lists are paginated with
//! `limit`/`offset` and carry `paging` cursors built from the request's
//! `Host` header, so a client can follow them back to this server. Errors
//! use the `{"error": {"type", "message"}}` envelope with status 400.

use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use axum::{
    extract::{Path, Query, State},
    http::{header::HOST, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Form, Json, Router,
};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};
use url::form_urlencoded;
use uuid::Uuid;

pub const APP_ID: &str = "112157085578818";
pub const APP_SECRET: &str = "41f0e7ee8b6501dca1610de9926477c4";
pub const APP_ACCESS_TOKEN: &str = "112157085578818|app-access-token";
pub const USER_ACCESS_TOKEN: &str = "user-access-token";
pub const AUTH_CODE: &str = "valid-code";
pub const USER_TOKEN_EXPIRES: &str = "4000";
/// Id of the user that `USER_ACCESS_TOKEN` belongs to.
pub const ME_ID: &str = "4";

const DEFAULT_LIMIT: usize = 25;

type Params = HashMap<String, String>;

/// Nodes by id (and alias) plus the lists hanging off them.
#[derive(Debug, Default)]
pub struct Store {
    nodes: HashMap<String, Value>,
    edges: HashMap<(String, String), Vec<Value>>,
}

impl Store {
    pub fn seeded() -> Self {
        let mut store = Store::default();
        store.add_node(
            Some("zuck"),
            json!({"id": ME_ID, "name": "Mark Zuckerberg", "type": "user"}),
        );
        store.add_node(
            Some("btaylor"),
            json!({"id": "220439", "name": "Bret Taylor", "type": "user"}),
        );
        store.add_node(
            Some("cocacola"),
            json!({
                "id": "40796308305",
                "name": "Coca-Cola",
                "category": "Consumer_products",
                "type": "page"
            }),
        );
        let photos = (1..=5)
            .map(|n| json!({"id": format!("photo-{n}"), "name": format!("Bottle #{n}"), "type": "photo"}))
            .collect();
        store.edges.insert(("40796308305".to_string(), "photos".to_string()), photos);
        let likes = vec![json!({"id": "40796308305", "name": "Coca-Cola", "category": "Consumer_products"})];
        store.edges.insert((ME_ID.to_string(), "likes".to_string()), likes);
        store
    }

    fn add_node(&mut self, alias: Option<&str>, node: Value) {
        let id = node["id"].as_str().unwrap_or_default().to_string();
        if let Some(alias) = alias {
            self.nodes.insert(alias.to_string(), node.clone());
        }
        self.nodes.insert(id, node);
    }

    fn node(&self, id: &str) -> Option<&Value> {
        self.nodes.get(id)
    }

    fn canonical_id(&self, id: &str) -> Option<String> {
        self.node(id)
            .and_then(|node| node["id"].as_str())
            .map(str::to_string)
    }

    fn edge(&self, id: &str, edge: &str) -> Vec<Value> {
        self.edges
            .get(&(id.to_string(), edge.to_string()))
            .cloned()
            .unwrap_or_default()
    }
}

pub type Db = Arc<RwLock<Store>>;

/// An error envelope with status 400.
#[derive(Debug)]
pub struct GraphError {
    error_type: &'static str,
    message: String,
}

impl GraphError {
    fn new(error_type: &'static str, message: impl Into<String>) -> Self {
        Self {
            error_type,
            message: message.into(),
        }
    }

    fn unsupported() -> Self {
        Self::new("GraphMethodException", "Unsupported get request.")
    }

    fn no_token() -> Self {
        Self::new("OAuthException", "An active access token must be used to query information about the current user.")
    }
}

impl IntoResponse for GraphError {
    fn into_response(self) -> Response {
        let body = json!({"error": {"type": self.error_type, "message": self.message}});
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}

type GraphResult = Result<Json<Value>, GraphError>;

pub fn app() -> Router {
    app_with(Store::seeded())
}

pub fn app_with(store: Store) -> Router {
    let db: Db = Arc::new(RwLock::new(store));
    Router::new()
        .route("/", get(batch_lookup))
        .route("/search", get(search))
        .route("/oauth/access_token", get(access_token))
        .route("/{id}", get(get_object).post(publish_object).delete(delete_object))
        .route("/{id}/{edge}", get(get_edge).post(publish_edge).delete(delete_edge))
        .route("/{id}/{edge}/{*rest}", get(get_edge_path))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        info!("mock graph api listening on {addr}");
    }
    axum::serve(listener, app()).await
}

/// Resolve `me` to the caller; other ids pass through.
fn resolve_id(id: &str, params: &Params) -> Result<String, GraphError> {
    if id != "me" {
        return Ok(id.to_string());
    }
    match params.get("access_token").map(String::as_str) {
        Some(USER_ACCESS_TOKEN) => Ok(ME_ID.to_string()),
        Some(_) => Err(GraphError::new("OAuthException", "Error validating access token.")),
        None => Err(GraphError::no_token()),
    }
}

fn require_user(params: &Params) -> Result<(), GraphError> {
    match params.get("access_token").map(String::as_str) {
        Some(USER_ACCESS_TOKEN) => Ok(()),
        Some(_) => Err(GraphError::new("OAuthAccessTokenException", "Error validating access token.")),
        None => Err(GraphError::no_token()),
    }
}

/// Keep only `fields` (comma separated) when requested.
fn select_fields(node: &Value, params: &Params) -> Result<Value, GraphError> {
    let Some(fields) = params.get("fields").filter(|f| !f.is_empty()) else {
        return Ok(node.clone());
    };
    let mut selected = serde_json::Map::new();
    for field in fields.split(',').map(str::trim) {
        match node.get(field) {
            Some(value) => {
                selected.insert(field.to_string(), value.clone());
            }
            None => {
                return Err(GraphError::new("QueryParseException", format!("Unknown fields: {field}.")));
            }
        }
    }
    Ok(Value::Object(selected))
}

fn base_url(headers: &HeaderMap) -> String {
    let host = headers
        .get(HOST)
        .and_then(|host| host.to_str().ok())
        .unwrap_or("localhost");
    format!("http://{host}")
}

fn parse_number(params: &Params, name: &str, default: usize) -> Result<usize, GraphError> {
    match params.get(name) {
        Some(value) => value
            .parse()
            .map_err(|_| GraphError::new("QueryParseException", format!("Invalid {name}: {value}"))),
        None => Ok(default),
    }
}

/// Slice `items` per `limit`/`offset` and attach paging cursors that repeat
/// every other query parameter.
fn paginate(items: Vec<Value>, url: &str, params: &Params) -> Result<Value, GraphError> {
    let limit = parse_number(params, "limit", DEFAULT_LIMIT)?.max(1);
    let offset = parse_number(params, "offset", 0)?;
    let total = items.len();
    let page: Vec<Value> = items.into_iter().skip(offset).take(limit).collect();

    let cursor = |offset: usize| {
        let mut query: BTreeMap<&str, String> = params
            .iter()
            .filter(|(name, _)| !matches!(name.as_str(), "limit" | "offset"))
            .map(|(name, value)| (name.as_str(), value.clone()))
            .collect();
        query.insert("limit", limit.to_string());
        query.insert("offset", offset.to_string());
        let query = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(query)
            .finish();
        format!("{url}?{query}")
    };

    let mut paging = serde_json::Map::new();
    if offset > 0 {
        paging.insert("previous".to_string(), json!(cursor(offset.saturating_sub(limit))));
    }
    if offset + limit < total {
        paging.insert("next".to_string(), json!(cursor(offset + limit)));
    }

    let mut body = json!({"data": page});
    if !paging.is_empty() {
        body["paging"] = Value::Object(paging);
    }
    Ok(body)
}

async fn batch_lookup(State(db): State<Db>, Query(params): Query<Params>) -> GraphResult {
    let ids = params.get("ids").filter(|ids| !ids.is_empty()).ok_or_else(GraphError::unsupported)?;
    let store = db.read().await;
    let mut found = serde_json::Map::new();
    for id in ids.split(',') {
        let node = store
            .node(id)
            .ok_or_else(|| GraphError::new("OAuthException", format!("(#803) Some of the aliases you requested do not exist: {id}")))?;
        found.insert(id.to_string(), select_fields(node, &params)?);
    }
    Ok(Json(Value::Object(found)))
}

async fn search(State(db): State<Db>, headers: HeaderMap, Query(params): Query<Params>) -> GraphResult {
    let query = params
        .get("q")
        .filter(|q| !q.is_empty())
        .ok_or_else(|| GraphError::new("QueryParseException", "No query specified."))?
        .to_lowercase();
    let object_type = params.get("type");

    let store = db.read().await;
    let matches: BTreeMap<String, Value> = store
        .nodes
        .values()
        .filter(|node| object_type.is_none_or(|t| node["type"].as_str() == Some(t.as_str())))
        .filter(|node| {
            ["name", "message"].iter().any(|field| {
                node[*field]
                    .as_str()
                    .is_some_and(|text| text.to_lowercase().contains(&query))
            })
        })
        .filter_map(|node| node["id"].as_str().map(|id| (id.to_string(), node.clone())))
        .collect();

    let url = format!("{}/search", base_url(&headers));
    paginate(matches.into_values().collect(), &url, &params).map(Json)
}

/// Token answers are form-encoded, not JSON.
fn token_body(pairs: &[(&str, &str)]) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}

async fn access_token(Query(params): Query<Params>) -> Response {
    let client_ok = params.get("client_id").map(String::as_str) == Some(APP_ID)
        && params.get("client_secret").map(String::as_str) == Some(APP_SECRET);
    if !client_ok {
        return GraphError::new("OAuthException", "Error validating client secret.").into_response();
    }

    if params.get("type").map(String::as_str) == Some("client_cred") {
        return token_body(&[("access_token", APP_ACCESS_TOKEN)]).into_response();
    }

    match (params.get("code"), params.get("redirect_uri")) {
        (Some(code), Some(_)) if code == AUTH_CODE => {
            token_body(&[("access_token", USER_ACCESS_TOKEN), ("expires", USER_TOKEN_EXPIRES)]).into_response()
        }
        (Some(_), Some(_)) => {
            GraphError::new("OAuthException", "Error validating verification code.").into_response()
        }
        _ => GraphError::new("OAuthException", "Missing redirect_uri parameter.").into_response(),
    }
}

async fn get_object(State(db): State<Db>, Path(id): Path<String>, Query(params): Query<Params>) -> GraphResult {
    let id = resolve_id(&id, &params)?;
    let store = db.read().await;
    let node = store.node(&id).ok_or_else(GraphError::unsupported)?;
    select_fields(node, &params).map(Json)
}

async fn get_edge(
    State(db): State<Db>,
    headers: HeaderMap,
    Path((id, edge)): Path<(String, String)>,
    Query(params): Query<Params>,
) -> GraphResult {
    let requested = id.clone();
    let id = resolve_id(&id, &params)?;
    let store = db.read().await;
    let canonical = store.canonical_id(&id).ok_or_else(GraphError::unsupported)?;

    let items = if edge == "insights" {
        require_app(&params)?;
        vec![json!({"id": format!("{canonical}/insights/application_api_call/day"), "name": "application_api_call", "period": "day"})]
    } else {
        store.edge(&canonical, &edge)
    };
    let url = format!("{}/{requested}/{edge}", base_url(&headers));
    paginate(items, &url, &params).map(Json)
}

fn require_app(params: &Params) -> Result<(), GraphError> {
    match params.get("access_token").map(String::as_str) {
        Some(APP_ACCESS_TOKEN) => Ok(()),
        _ => Err(GraphError::new("OAuthException", "An application access token is required.")),
    }
}

/// Deeper paths; only `/<id>/insights/<metric>[/<period>]` exists.
async fn get_edge_path(
    Path((id, edge, metric)): Path<(String, String, String)>,
    Query(params): Query<Params>,
) -> GraphResult {
    if edge != "insights" {
        return Err(GraphError::unsupported());
    }
    require_app(&params)?;
    let (name, period) = metric.split_once('/').unwrap_or((metric.as_str(), "day"));
    Ok(Json(json!({
        "data": [{
            "id": format!("{id}/insights/{metric}"),
            "name": name,
            "period": period,
            "values": [{"value": 42, "end_time": "2010-05-13T07:00:00+0000"}]
        }]
    })))
}

async fn publish_object(State(db): State<Db>, Path(id): Path<String>, Form(params): Form<Params>) -> GraphResult {
    require_user(&params)?;
    let store = db.read().await;
    store.node(&id).ok_or_else(GraphError::unsupported)?;
    Ok(Json(json!(true)))
}

async fn publish_edge(
    State(db): State<Db>,
    Path((id, edge)): Path<(String, String)>,
    Form(params): Form<Params>,
) -> GraphResult {
    require_user(&params)?;
    let id = resolve_id(&id, &params)?;
    let mut store = db.write().await;
    let canonical = store.canonical_id(&id).ok_or_else(GraphError::unsupported)?;

    match edge.as_str() {
        "feed" | "comments" | "notes" | "links" => {
            let message = params
                .get("message")
                .or_else(|| params.get("link"))
                .cloned()
                .unwrap_or_default();
            let post_id = format!("{canonical}_{}", Uuid::new_v4().simple());
            let post = json!({
                "id": post_id,
                "message": message,
                "type": "post",
                "from": {"id": ME_ID, "name": "Mark Zuckerberg"}
            });
            store.nodes.insert(post_id.clone(), post.clone());
            store
                .edges
                .entry((canonical, edge.clone()))
                .or_default()
                .insert(0, post);
            debug!(%post_id, %edge, "published");
            Ok(Json(json!({"id": post_id})))
        }
        "likes" | "attending" | "maybe" | "declined" => {
            let me = json!({"id": ME_ID, "name": "Mark Zuckerberg"});
            let list = store.edges.entry((canonical, edge)).or_default();
            if !list.iter().any(|entry| entry["id"] == ME_ID) {
                list.push(me);
            }
            Ok(Json(json!(true)))
        }
        _ => Err(GraphError::new("GraphMethodException", format!("Unsupported post request: {edge}"))),
    }
}

async fn delete_object(State(db): State<Db>, Path(id): Path<String>, Form(params): Form<Params>) -> GraphResult {
    require_user(&params)?;
    let mut store = db.write().await;
    let node = store.nodes.remove(&id).ok_or_else(GraphError::unsupported)?;
    let node_id = node["id"].clone();
    for list in store.edges.values_mut() {
        list.retain(|entry| entry["id"] != node_id);
    }
    debug!(%id, "deleted");
    Ok(Json(json!(true)))
}

async fn delete_edge(
    State(db): State<Db>,
    Path((id, edge)): Path<(String, String)>,
    Form(params): Form<Params>,
) -> GraphResult {
    require_user(&params)?;
    let id = resolve_id(&id, &params)?;
    let mut store = db.write().await;
    let canonical = store.canonical_id(&id).ok_or_else(GraphError::unsupported)?;
    let list = store.edges.entry((canonical, edge)).or_default();
    list.retain(|entry| entry["id"] != ME_ID);
    Ok(Json(json!(true)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> Params {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn seeded_store_resolves_aliases() {
        let store = Store::seeded();
        assert_eq!(store.canonical_id("cocacola").as_deref(), Some("40796308305"));
        assert_eq!(store.canonical_id("zuck").as_deref(), Some(ME_ID));
        assert!(store.node("nobody").is_none());
    }

    #[test]
    fn me_requires_a_user_token() {
        assert_eq!(resolve_id("me", &params(&[("access_token", USER_ACCESS_TOKEN)])).unwrap(), ME_ID);
        assert_eq!(resolve_id("me", &Params::new()).unwrap_err().error_type, "OAuthException");
        assert_eq!(resolve_id("cocacola", &Params::new()).unwrap(), "cocacola");
    }

    #[test]
    fn field_selection_rejects_unknown_fields() {
        let node = json!({"id": "1", "name": "x"});
        let selected = select_fields(&node, &params(&[("fields", "name")])).unwrap();
        assert_eq!(selected, json!({"name": "x"}));
        let err = select_fields(&node, &params(&[("fields", "nope")])).unwrap_err();
        assert_eq!(err.error_type, "QueryParseException");
    }

    #[test]
    fn pagination_cursors() {
        let items: Vec<Value> = (0..5).map(|n| json!({"id": n.to_string()})).collect();
        let body = paginate(items.clone(), "http://h/x/photos", &params(&[("limit", "2")])).unwrap();
        assert_eq!(body["data"].as_array().unwrap().len(), 2);
        assert_eq!(body["paging"]["next"], "http://h/x/photos?limit=2&offset=2");
        assert!(body["paging"].get("previous").is_none());

        let body = paginate(items.clone(), "http://h/x/photos", &params(&[("limit", "2"), ("offset", "4")])).unwrap();
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
        assert_eq!(body["paging"]["previous"], "http://h/x/photos?limit=2&offset=2");
        assert!(body["paging"].get("next").is_none());

        let body = paginate(items, "http://h/x/photos", &Params::new()).unwrap();
        assert!(body.get("paging").is_none());
    }

    #[test]
    fn pagination_cursor_keeps_other_params() {
        let items: Vec<Value> = (0..3).map(|n| json!({"id": n.to_string()})).collect();
        let body = paginate(
            items,
            "http://h/search",
            &params(&[("limit", "1"), ("q", "coca cola"), ("access_token", "a|b")]),
        )
        .unwrap();
        assert_eq!(
            body["paging"]["next"],
            "http://h/search?access_token=a%7Cb&limit=1&offset=1&q=coca+cola"
        );
    }

    #[test]
    fn token_body_is_form_encoded() {
        assert_eq!(
            token_body(&[("access_token", "a|b c"), ("expires", "4000")]),
            "access_token=a%7Cb+c&expires=4000"
        );
    }

    #[test]
    fn bad_limit_is_a_query_parse_error() {
        let err = paginate(Vec::new(), "http://h/x", &params(&[("limit", "many")])).unwrap_err();
        assert_eq!(err.error_type, "QueryParseException");
    }
}
