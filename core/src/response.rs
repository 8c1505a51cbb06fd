//! Interpretation of decoded response envelopes.
//!
//! Every Graph API body is one of three shapes: an error envelope, a list
//! envelope carrying `data`, or anything else. `interpret` resolves the shape
//! once; downstream code matches on `GraphResponse` and never inspects the
//! raw envelope again.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::collection::Collection;
use crate::error::ApiError;

/// A successful Graph API response.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphResponse {
    /// A single node, or any other non-list payload (e.g. `true`).
    Object(Value),
    /// A list envelope with its paging cursors.
    Collection(Collection),
}

impl GraphResponse {
    pub fn as_object(&self) -> Option<&Value> {
        match self {
            GraphResponse::Object(value) => Some(value),
            GraphResponse::Collection(_) => None,
        }
    }

    pub fn as_collection(&self) -> Option<&Collection> {
        match self {
            GraphResponse::Collection(collection) => Some(collection),
            GraphResponse::Object(_) => None,
        }
    }

    pub fn into_object(self) -> Option<Value> {
        match self {
            GraphResponse::Object(value) => Some(value),
            GraphResponse::Collection(_) => None,
        }
    }

    pub fn into_collection(self) -> Option<Collection> {
        match self {
            GraphResponse::Collection(collection) => Some(collection),
            GraphResponse::Object(_) => None,
        }
    }

    /// Deserialize a plain object payload into `T`. Collections yield `None`.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Option<Result<T, serde_json::Error>> {
        self.as_object().map(|value| T::deserialize(value))
    }
}

/// Classify a decoded envelope.
///
/// An `error` member always wins and becomes an [`ApiError`]; its `type`
/// selects the kind, unknown types fall back to generic. Otherwise a `data`
/// array becomes a [`Collection`] and everything else is returned unchanged.
pub fn interpret(envelope: Value) -> Result<GraphResponse, ApiError> {
    if let Some(err) = error_of(&envelope) {
        return Err(err);
    }

    if envelope.get("data").is_some_and(Value::is_array) {
        return Ok(GraphResponse::Collection(Collection::from_envelope(&envelope)));
    }

    Ok(GraphResponse::Object(envelope))
}

/// Extract the error envelope from a decoded body, if it carries one.
pub(crate) fn error_of(envelope: &Value) -> Option<ApiError> {
    envelope
        .get("error")
        .filter(|error| !error.is_null())
        .map(api_error)
}

fn api_error(error: &Value) -> ApiError {
    // Some endpoints answer with a bare string: {"error": "message"}.
    if let Value::String(message) = error {
        return ApiError::new("", message.clone());
    }
    let field = |name: &str| match error.get(name) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    };
    ApiError::new(field("type"), field("message"))
}
