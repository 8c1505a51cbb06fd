//! Synchronous client core for the Facebook Graph API.
//!
//! # Overview
//! Routes logical operations (fetch an object or one of its edges, batch
//! lookup, publish, remove, search, insights, OAuth token exchange) onto
//! HTTP requests, and interprets the JSON that comes back as a plain object,
//! a paginated [`Collection`], or a typed [`ApiError`].
//!
//! # Design
//! - `GraphClient` is stateless: it holds a `GraphConfig` and builds
//!   `HttpRequest` / parses `HttpResponse` values without doing I/O.
//! - `Graph<T: Transport>` runs the round-trip. `UreqTransport` (feature
//!   `ureq-transport`, on by default) is the blocking implementation.
//! - No retries, caching, or shared mutable state; every call stands alone.
//!
//! ```no_run
//! use graph_core::{Graph, GraphConfig, Params};
//!
//! # fn main() -> graph_core::Result<()> {
//! let graph = Graph::from_config(GraphConfig::from_env()?);
//! let photos = graph.edge("cocacola", "photos", Params::new().with("limit", "5"))?;
//! if let Some(page) = photos.as_collection() {
//!     for photo in page {
//!         println!("{}", photo["id"]);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod collection;
pub mod config;
pub mod error;
pub mod http;
pub mod oauth;
pub mod query;
pub mod response;
pub mod router;
pub mod transport;

pub use client::{Graph, GraphClient};
pub use collection::{Collection, PageOptions};
pub use config::GraphConfig;
pub use error::{ApiError, ApiErrorKind, ConfigError, Error, Result, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use oauth::AccessToken;
pub use query::{format_url, parse_query, Params};
pub use response::{interpret, GraphResponse};
pub use router::{edges, search_types, GraphCall, MethodName, ObjectRef, Verb};
pub use transport::Transport;
#[cfg(feature = "ureq-transport")]
pub use transport::UreqTransport;
