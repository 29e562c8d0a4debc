//! Synchronous client core for the OVH REST API.
//!
//! # Overview
//! Resolves an endpoint alias to a base URL, signs each request with the
//! API's `$1$` SHA-1 scheme, sends it, and turns the status into either the
//! raw response body or a typed `ApiError`.
//!
//! # Design
//! - `OvhClient` is stateless apart from its `ClientConfig` and transport.
//! - Every call is split into `build_request` (produces a complete,
//!   signed `HttpRequest`) and `parse_response` (classifies an
//!   `HttpResponse`), so the I/O boundary is explicit and a `Transport`
//!   can be swapped out.
//! - Response bodies are opaque text; callers parse JSON themselves.

pub mod client;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod http;
pub mod signature;
pub mod transport;

pub use client::OvhClient;
pub use config::ClientConfig;
pub use error::{ApiError, ConfigError, ErrorKind};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use transport::{Transport, UreqTransport};
