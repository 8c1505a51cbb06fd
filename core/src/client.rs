//! Request building, response parsing, and the dispatching facade.
//!
//! # Design
//! `GraphClient` holds only configuration and carries no mutable state
//! between calls. It builds `HttpRequest` values from routed `GraphCall`s and
//! parses `HttpResponse` values, without touching the network. `Graph` pairs
//! a `GraphClient` with a [`Transport`] to run the round-trip and exposes the
//! convenience operations callers use day to day.

use serde_json::Value;
use tracing::{debug, warn};

use crate::collection::Collection;
use crate::config::GraphConfig;
use crate::error::{ConfigError, Error, Result, TransportError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, FORM_CONTENT_TYPE};
use crate::oauth::{self, AccessToken};
use crate::query::{format_url, Params};
use crate::response::{interpret, GraphResponse};
use crate::router::{self, GraphCall, MethodName, ObjectRef, Verb};
use crate::transport::Transport;

/// Synchronous, stateless request builder and response parser.
#[derive(Debug, Clone, Default)]
pub struct GraphClient {
    config: GraphConfig,
}

impl GraphClient {
    pub fn new(config: GraphConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Absolute URL for `path` with `params` as the query string.
    pub fn url(&self, path: &str, params: &Params) -> String {
        format_url(&self.config.base_url, path, params)
    }

    /// Put the configured access token underneath `params`; a token passed
    /// by the caller wins.
    pub fn authorize(&self, params: Params) -> Params {
        Params::new()
            .with_opt("access_token", self.config.access_token.clone())
            .merge(params)
    }

    pub fn build_request(&self, call: &GraphCall) -> HttpRequest {
        if call.method.sends_body() {
            HttpRequest {
                method: call.method,
                url: self.url(&call.path, &Params::new()),
                headers: vec![("content-type".to_string(), FORM_CONTENT_TYPE.to_string())],
                body: Some(call.params.to_form()),
            }
        } else {
            HttpRequest {
                method: call.method,
                url: self.url(&call.path, &call.params),
                headers: Vec::new(),
                body: None,
            }
        }
    }

    /// GET an absolute URL as-is, e.g. a paging cursor.
    pub fn build_url_request(&self, url: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: url.to_string(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Decode a response body as JSON, whatever the status code.
    pub fn parse_json(&self, response: &HttpResponse) -> Result<Value> {
        serde_json::from_str(&response.body)
            .map_err(|e| Error::Transport(TransportError::Decode(e)))
    }

    pub fn parse_response(&self, response: &HttpResponse) -> Result<GraphResponse> {
        let envelope = self.parse_json(response)?;
        interpret(envelope).map_err(|err| {
            warn!(
                status = response.status,
                error_type = %err.error_type,
                kind = %err.kind,
                "graph api returned an error"
            );
            Error::Api(err)
        })
    }

    pub fn parse_access_token(&self, response: &HttpResponse) -> Result<AccessToken> {
        oauth::parse_access_token(&response.body)
    }

    /// Authorization URL for the configured application.
    pub fn authorize_url(&self, redirect_uri: &str, params: Params) -> Result<String> {
        let (client_id, _) = self.app_credentials(false)?;
        Ok(oauth::authorize_url(&self.config.base_url, client_id, redirect_uri, params))
    }

    /// Token exchange for an authorization code.
    pub fn access_token_call(&self, redirect_uri: &str, code: &str) -> Result<GraphCall> {
        let (client_id, client_secret) = self.app_credentials(true)?;
        Ok(oauth::user_access_token_call(client_id, client_secret, redirect_uri, code))
    }

    pub fn app_access_token_call(&self) -> Result<GraphCall> {
        let (client_id, client_secret) = self.app_credentials(true)?;
        Ok(oauth::app_access_token_call(client_id, client_secret))
    }

    fn app_credentials(&self, need_secret: bool) -> Result<(&str, &str), ConfigError> {
        let client_id = self.config.app_id.as_deref().ok_or(ConfigError::Missing("app_id"))?;
        let client_secret = match self.config.app_secret.as_deref() {
            Some(secret) => secret,
            None if need_secret => return Err(ConfigError::Missing("app_secret")),
            None => "",
        };
        Ok((client_id, client_secret))
    }
}

/// A `GraphClient` bound to a transport.
#[derive(Debug, Clone)]
pub struct Graph<T> {
    client: GraphClient,
    transport: T,
}

#[cfg(feature = "ureq-transport")]
impl Graph<crate::transport::UreqTransport> {
    /// Client talking to `config.base_url` over a blocking ureq agent.
    pub fn from_config(config: GraphConfig) -> Self {
        let transport = crate::transport::UreqTransport::new(config.timeout());
        Self::new(GraphClient::new(config), transport)
    }
}

impl<T: Transport> Graph<T> {
    pub fn new(client: GraphClient, transport: T) -> Self {
        Self { client, transport }
    }

    pub fn client(&self) -> &GraphClient {
        &self.client
    }

    fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        debug!(method = %request.method, "dispatching graph request");
        let response = self.transport.execute(request)?;
        debug!(status = response.status, "graph response received");
        Ok(response)
    }

    /// Issue a request and return the decoded body without interpreting it.
    pub fn perform(&self, method: HttpMethod, path: &str, params: Params) -> Result<Value> {
        let request = self.client.build_request(&GraphCall::new(method, path, params));
        let response = self.send(request)?;
        self.client.parse_json(&response)
    }

    pub fn call(&self, call: GraphCall) -> Result<GraphResponse> {
        let response = self.send(self.client.build_request(&call))?;
        self.client.parse_response(&response)
    }

    pub fn object(&self, target: impl Into<ObjectRef>, params: Params) -> Result<GraphResponse> {
        self.call(router::object(target, self.client.authorize(params))?)
    }

    pub fn edge(&self, target: impl Into<ObjectRef>, edge: &str, params: Params) -> Result<GraphResponse> {
        self.call(router::edge(target, edge, self.client.authorize(params))?)
    }

    pub fn me(&self, edge: Option<&str>, params: Params) -> Result<GraphResponse> {
        self.call(router::me(edge, self.client.authorize(params)))
    }

    pub fn objects<I, R>(&self, targets: I, params: Params) -> Result<GraphResponse>
    where
        I: IntoIterator<Item = R>,
        R: Into<ObjectRef>,
    {
        self.call(router::objects(targets, self.client.authorize(params))?)
    }

    pub fn publish(&self, target: impl Into<ObjectRef>, params: Params) -> Result<GraphResponse> {
        self.call(router::publish(target, self.client.authorize(params))?)
    }

    pub fn publish_edge(&self, target: impl Into<ObjectRef>, edge: &str, params: Params) -> Result<GraphResponse> {
        self.call(router::publish_edge(target, edge, self.client.authorize(params))?)
    }

    pub fn remove(&self, target: impl Into<ObjectRef>, params: Params) -> Result<GraphResponse> {
        self.call(router::remove(target, self.client.authorize(params))?)
    }

    pub fn remove_edge(&self, target: impl Into<ObjectRef>, edge: &str, params: Params) -> Result<GraphResponse> {
        self.call(router::remove_edge(target, edge, self.client.authorize(params))?)
    }

    /// Public search; the configured access token is not attached.
    pub fn search(&self, query: &str, params: Params) -> Result<GraphResponse> {
        self.call(router::search(query, params))
    }

    pub fn search_type(&self, query: &str, object_type: &str, params: Params) -> Result<GraphResponse> {
        self.call(router::search_type(query, object_type, params))
    }

    /// Run a compound operation such as `object_photos` or `publish_feed`.
    pub fn call_method(&self, name: &str, target: Option<ObjectRef>, params: Params) -> Result<GraphResponse> {
        let name = MethodName::parse(name)?;
        let params = match name.verb {
            Verb::Search => params,
            _ => self.client.authorize(params),
        };
        self.call(name.route(target, params)?)
    }

    /// Application insights. Without a configured app access token one is
    /// requested first.
    pub fn insights(&self, metric_path: Option<&str>, params: Params) -> Result<GraphResponse> {
        let client_id = self
            .client
            .config()
            .app_id
            .clone()
            .ok_or(ConfigError::Missing("app_id"))?;
        let token = match self.client.config().app_access_token.clone() {
            Some(token) => token,
            None => self.oauth_app_access_token()?.access_token,
        };
        self.call(router::insights(&client_id, &token, metric_path, params))
    }

    /// Exchange an authorization code for a user access token.
    pub fn oauth_access_token(&self, redirect_uri: &str, code: &str) -> Result<AccessToken> {
        let call = self.client.access_token_call(redirect_uri, code)?;
        self.exchange_token(&call)
    }

    pub fn oauth_app_access_token(&self) -> Result<AccessToken> {
        let call = self.client.app_access_token_call()?;
        self.exchange_token(&call)
    }

    fn exchange_token(&self, call: &GraphCall) -> Result<AccessToken> {
        let response = self.send(self.client.build_request(call))?;
        self.client.parse_access_token(&response)
    }

    /// Follow a collection's `next` cursor. `None` when there is no next page.
    pub fn next_page(&self, collection: &Collection) -> Result<Option<GraphResponse>> {
        self.follow(collection.has_next().then(|| collection.next_url()).flatten())
    }

    /// Follow a collection's `previous` cursor.
    pub fn previous_page(&self, collection: &Collection) -> Result<Option<GraphResponse>> {
        self.follow(collection.has_previous().then(|| collection.previous_url()).flatten())
    }

    fn follow(&self, url: Option<&str>) -> Result<Option<GraphResponse>> {
        let Some(url) = url else {
            return Ok(None);
        };
        let response = self.send(self.client.build_url_request(url))?;
        self.client.parse_response(&response).map(Some)
    }
}
