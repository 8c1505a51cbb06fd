//! OAuth authorization URLs and access token exchange.
//!
//! The token endpoint has answered in two formats over time: a JSON object
//! and a form-encoded `access_token=...&expires=...` body. Both are accepted.

use std::collections::BTreeMap;

use serde_json::Value;
use url::form_urlencoded;

use crate::error::{Error, Result};
use crate::http::HttpMethod;
use crate::query::{format_url, Params};
use crate::response::error_of;
use crate::router::GraphCall;

pub const AUTHORIZE_PATH: &str = "/oauth/authorize";
pub const ACCESS_TOKEN_PATH: &str = "/oauth/access_token";

/// URL to send a user to so they can authorize the application.
///
/// `params` carries optional extras such as `scope` or `display`.
pub fn authorize_url(base: &str, client_id: &str, redirect_uri: &str, params: Params) -> String {
    let params = Params::new()
        .with("client_id", client_id)
        .with("redirect_uri", redirect_uri)
        .merge(params);
    format_url(base, AUTHORIZE_PATH, &params)
}

/// GET `/oauth/access_token` with the application credentials followed by
/// `params`.
pub fn access_token_call(client_id: &str, client_secret: &str, params: Params) -> GraphCall {
    let params = Params::new()
        .with("client_id", client_id)
        .with("client_secret", client_secret)
        .merge(params);
    GraphCall::new(HttpMethod::Get, ACCESS_TOKEN_PATH, params)
}

/// Exchange an authorization code for a user access token.
pub fn user_access_token_call(
    client_id: &str,
    client_secret: &str,
    redirect_uri: &str,
    code: &str,
) -> GraphCall {
    let params = Params::new().with("redirect_uri", redirect_uri).with("code", code);
    access_token_call(client_id, client_secret, params)
}

/// Request an application access token (client credentials).
pub fn app_access_token_call(client_id: &str, client_secret: &str) -> GraphCall {
    access_token_call(client_id, client_secret, Params::new().with("type", "client_cred"))
}

/// A token returned by the token endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub access_token: String,
    /// Lifetime in seconds as sent by the server; absent for tokens that do
    /// not expire.
    pub expires: Option<String>,
    /// Any other fields in the response.
    pub extra: BTreeMap<String, String>,
}

impl AccessToken {
    pub fn expires_in_secs(&self) -> Option<u64> {
        self.expires.as_deref().and_then(|expires| expires.parse().ok())
    }
}

/// Parse a token endpoint body, JSON or form-encoded.
///
/// A JSON error envelope becomes [`Error::Api`]; a body with no
/// `access_token` becomes [`Error::InvalidTokenResponse`].
pub fn parse_access_token(body: &str) -> Result<AccessToken> {
    let mut fields = match serde_json::from_str::<Value>(body.trim()) {
        Ok(Value::Object(map)) => {
            let envelope = Value::Object(map);
            if let Some(err) = error_of(&envelope) {
                return Err(err.into());
            }
            json_fields(envelope)
        }
        _ => form_urlencoded::parse(body.trim().as_bytes())
            .map(|(name, value)| (name.into_owned(), value.into_owned()))
            .collect(),
    };

    let access_token = fields
        .remove("access_token")
        .filter(|token| !token.is_empty())
        .ok_or_else(|| Error::InvalidTokenResponse(body.to_string()))?;
    let expires = fields.remove("expires").or_else(|| fields.remove("expires_in"));

    Ok(AccessToken {
        access_token,
        expires,
        extra: fields,
    })
}

fn json_fields(envelope: Value) -> BTreeMap<String, String> {
    let Value::Object(map) = envelope else {
        return BTreeMap::new();
    };
    map.into_iter()
        .filter_map(|(name, value)| {
            let value = match value {
                Value::String(s) => s,
                Value::Null => return None,
                other => other.to_string(),
            };
            Some((name, value))
        })
        .collect()
}
