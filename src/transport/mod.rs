//! Transport boundary for the walk engine
//!
//! The engine never speaks HTTP itself. It hands a fully merged
//! [`EffectiveRequest`] to an injectable [`Transport`] and gets back a
//! [`TransportResponse`] with everything the normalizer needs: status, the
//! raw header list (repeated `set-cookie` values included), the final
//! post-redirect URL, and the body as text.
//!
//! [`HttpTransport`] is the default implementation, built on reqwest.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use url::Url;

pub mod http;

pub use http::HttpTransport;

/// The request actually sent for one step, after all merging.
///
/// Cookie and form-data maps never appear here; by this point they have been
/// folded into the `cookie` header and the body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveRequest {
    /// Upper-cased HTTP method
    pub method: String,
    pub url: Url,
    /// Lower-cased header names
    pub headers: HashMap<String, String>,
    pub body: Option<String>,
}

/// Raw result of one HTTP exchange, before normalization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransportResponse {
    pub status: u16,
    /// Headers in wire order; repeated names (notably `set-cookie`) each get
    /// their own entry
    pub headers: Vec<(String, String)>,
    /// URL after the transport followed any redirects
    pub final_url: String,
    pub body: String,
}

impl TransportResponse {
    /// All `set-cookie` values in wire order.
    pub fn set_cookie_lines(&self) -> impl Iterator<Item = &str> {
        self.headers
            .iter()
            .filter(|(name, _)| name.eq_ignore_ascii_case("set-cookie"))
            .map(|(_, value)| value.as_str())
    }
}

/// Errors raised by a transport implementation.
///
/// Note that a non-2xx status is not a transport error; it comes back as an
/// ordinary [`TransportResponse`] for the step's `process` hook to judge.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid HTTP method: {0}")]
    InvalidMethod(String),

    #[error("Invalid header {name}: {message}")]
    InvalidHeader { name: String, message: String },

    /// For custom transport implementations
    #[error("Transport failure: {0}")]
    Failed(String),
}

/// Injectable fetch-like capability performing one HTTP exchange.
///
/// Implementations are expected to follow redirects internally and report the
/// final URL; the engine scopes absorbed cookies to it.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn fetch(&self, request: &EffectiveRequest) -> Result<TransportResponse, TransportError>;
}
