//! Response normalization
//!
//! Converts a raw [`TransportResponse`] into the [`StepResponse`] record
//! hooks see: lower-cased headers with `set-cookie` pulled out into dedicated
//! cookie fields, plus the status and body text.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

use crate::cookies::{parse_set_cookie, RawCookie};
use crate::transport::TransportResponse;

/// Normalized result of one step's HTTP exchange.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StepResponse {
    /// HTTP status; 4xx/5xx are data here, never errors
    pub status: u16,

    /// Lower-cased header names, `set-cookie` excluded
    pub headers: HashMap<String, String>,

    /// Convenience cookie map; the last duplicate name wins
    pub cookies: HashMap<String, String>,

    /// Every Set-Cookie directive in wire order, duplicates preserved
    pub raw_cookies: Vec<RawCookie>,

    /// Full response body as text
    pub text: String,

    /// The `process` hook's result, attached after normalization
    pub output: Option<Value>,
}

/// Build a [`StepResponse`] from the transport's raw response.
///
/// Malformed Set-Cookie lines are dropped here and never abort the walk;
/// jar absorption works from the raw header lines separately.
pub fn normalize_response(raw: &TransportResponse) -> StepResponse {
    let mut headers = HashMap::new();
    let mut cookies = HashMap::new();
    let mut raw_cookies = Vec::new();

    for (name, value) in &raw.headers {
        let lower = name.to_ascii_lowercase();
        if lower == "set-cookie" {
            match parse_set_cookie(value) {
                Some(cookie) => {
                    cookies.insert(cookie.name.clone(), cookie.value.clone());
                    raw_cookies.push(cookie);
                }
                None => debug!(line = %value, "dropping malformed set-cookie directive"),
            }
        } else {
            headers.insert(lower, value.clone());
        }
    }

    StepResponse {
        status: raw.status,
        headers,
        cookies,
        raw_cookies,
        text: raw.body.clone(),
        output: None,
    }
}
