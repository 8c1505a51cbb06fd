//! Error types for the Graph API client.
//!
//! # Design
//! Errors reported by the remote API (`ApiError`) are kept apart from local
//! failures (`TransportError`, `ConfigError`). The API's error taxonomy is
//! open-ended, so an unrecognized `type` string maps to
//! `ApiErrorKind::Generic` instead of failing interpretation.

use std::fmt;

/// Category of an error envelope reported by the Graph API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiErrorKind {
    /// Any `type` string not listed below.
    Generic,
    /// `QueryParseException`
    QueryParse,
    /// `GraphMethodException`
    GraphMethod,
    /// `OAuthException`
    OAuth,
    /// `OAuthAccessTokenException`, a narrower form of `OAuth`.
    OAuthAccessToken,
}

impl ApiErrorKind {
    pub fn from_type(error_type: &str) -> Self {
        match error_type {
            "QueryParseException" => ApiErrorKind::QueryParse,
            "GraphMethodException" => ApiErrorKind::GraphMethod,
            "OAuthException" => ApiErrorKind::OAuth,
            "OAuthAccessTokenException" => ApiErrorKind::OAuthAccessToken,
            _ => ApiErrorKind::Generic,
        }
    }

    /// True for the OAuth family, where re-authenticating may help.
    pub fn is_oauth(self) -> bool {
        matches!(self, ApiErrorKind::OAuth | ApiErrorKind::OAuthAccessToken)
    }
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ApiErrorKind::Generic => "generic",
            ApiErrorKind::QueryParse => "query parse",
            ApiErrorKind::GraphMethod => "graph method",
            ApiErrorKind::OAuth => "oauth",
            ApiErrorKind::OAuthAccessToken => "oauth access token",
        };
        f.write_str(name)
    }
}

/// An `{"error": {"type": .., "message": ..}}` envelope returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("({error_type}) {message}")]
pub struct ApiError {
    pub kind: ApiErrorKind,
    /// The `type` string exactly as the API sent it.
    pub error_type: String,
    pub message: String,
}

impl ApiError {
    pub fn new(error_type: impl Into<String>, message: impl Into<String>) -> Self {
        let error_type = error_type.into();
        Self {
            kind: ApiErrorKind::from_type(&error_type),
            error_type,
            message: message.into(),
        }
    }
}

/// Local failures while exchanging bytes with the API host.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The request never produced a response (DNS, connect, timeout, ...).
    #[error("connection error: {0}")]
    Connect(String),

    /// A response arrived but its body could not be read as text.
    #[error("failed to read response body: {0}")]
    Body(String),

    /// The response body was not valid JSON.
    #[error("failed to decode response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Configuration could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },

    #[error("{0} is not configured")]
    Missing(&'static str),
}

/// Any error surfaced by the client.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("graph api error: {0}")]
    Api(#[from] ApiError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A route was requested for an object reference that has no id.
    #[error("object reference has no id")]
    MissingId,

    /// A compound method name did not name a known verb and a category.
    #[error("unknown method name: {0}")]
    UnknownMethod(String),

    /// The token endpoint answered without an `access_token`.
    #[error("invalid access token response: {0}")]
    InvalidTokenResponse(String),
}

impl Error {
    /// The API error carried by this error, if the API reported one.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Error::Api(err) => Some(err),
            _ => None,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_types_map_to_their_kind() {
        assert_eq!(ApiErrorKind::from_type("QueryParseException"), ApiErrorKind::QueryParse);
        assert_eq!(ApiErrorKind::from_type("GraphMethodException"), ApiErrorKind::GraphMethod);
        assert_eq!(ApiErrorKind::from_type("OAuthException"), ApiErrorKind::OAuth);
        assert_eq!(
            ApiErrorKind::from_type("OAuthAccessTokenException"),
            ApiErrorKind::OAuthAccessToken
        );
    }

    #[test]
    fn unknown_type_is_generic() {
        assert_eq!(ApiErrorKind::from_type("SomethingNewException"), ApiErrorKind::Generic);
        assert_eq!(ApiErrorKind::from_type(""), ApiErrorKind::Generic);
    }

    #[test]
    fn access_token_kind_belongs_to_oauth_family() {
        assert!(ApiErrorKind::OAuth.is_oauth());
        assert!(ApiErrorKind::OAuthAccessToken.is_oauth());
        assert!(!ApiErrorKind::GraphMethod.is_oauth());
        assert!(!ApiErrorKind::Generic.is_oauth());
    }

    #[test]
    fn api_error_display_includes_type_and_message() {
        let err = ApiError::new("OAuthException", "Invalid token");
        assert_eq!(err.to_string(), "(OAuthException) Invalid token");
        assert_eq!(err.kind, ApiErrorKind::OAuth);
    }

    #[test]
    fn api_error_accessor() {
        let err: Error = ApiError::new("GraphMethodException", "nope").into();
        assert_eq!(err.api_error().map(|e| e.kind), Some(ApiErrorKind::GraphMethod));
        assert!(Error::MissingId.api_error().is_none());
    }
}
