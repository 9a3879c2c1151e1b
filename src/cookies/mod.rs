//! Cookie storage and parsing
//!
//! This module contains:
//! - `CookieStore` - the injectable jar boundary queried before each request
//!   and updated after each response
//! - `MemoryCookieJar` - the default in-memory store, one instance per walk
//! - `parse_set_cookie` - lenient Set-Cookie parsing shared by the jar and
//!   the response normalizer

pub mod jar;

pub use jar::MemoryCookieJar;

use cookie::{Cookie, Expiration};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use url::Url;

/// One Set-Cookie directive with its full attribute set.
///
/// Duplicate names are preserved by keeping these in an ordered list on the
/// step response, unlike the convenience name->value map where the last
/// occurrence wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawCookie {
    pub name: String,
    pub value: String,
    #[serde(with = "time::serde::rfc3339::option")]
    pub expires: Option<OffsetDateTime>,
    /// Max-Age in seconds, which takes priority over `expires` when both are set
    pub max_age: Option<i64>,
    pub domain: Option<String>,
    pub path: Option<String>,
    pub secure: bool,
    pub http_only: bool,
}

/// The jar boundary the walk engine talks to.
///
/// One implementation is exclusively owned by one walk invocation; the engine
/// never shares a store between concurrent walks. Implementations must treat
/// malformed directives as a no-op rather than an error.
pub trait CookieStore: Send {
    /// Serialized `Cookie` header value applicable to `url` given everything
    /// stored so far. Empty string when nothing matches.
    fn cookie_string_for(&self, url: &Url) -> String;

    /// Parse one Set-Cookie directive and store it, scoped by the response's
    /// final post-redirect URL.
    fn absorb(&mut self, set_cookie: &str, url: &Url);
}

/// Parse a single Set-Cookie line into a [`RawCookie`].
///
/// Returns `None` for directives the underlying parser rejects (empty name,
/// no `=`, and so on) - malformed cookies are dropped, never fatal.
pub fn parse_set_cookie(line: &str) -> Option<RawCookie> {
    let parsed = Cookie::parse(line.trim()).ok()?;
    if parsed.name().is_empty() {
        return None;
    }

    let expires = match parsed.expires() {
        Some(Expiration::DateTime(at)) => Some(at),
        _ => None,
    };

    Some(RawCookie {
        name: parsed.name().to_string(),
        value: parsed.value().to_string(),
        expires,
        max_age: parsed.max_age().map(|age| age.whole_seconds()),
        domain: parsed
            .domain()
            .map(|d| d.trim_start_matches('.').to_ascii_lowercase()),
        path: parsed.path().map(str::to_string),
        secure: parsed.secure().unwrap_or(false),
        http_only: parsed.http_only().unwrap_or(false),
    })
}
