//! Request assembly and merge precedence
//!
//! Pure functions combining the partial configuration sources into one
//! effective request. Precedence, low to high, is always:
//! built-in defaults -> session config -> step template -> `prepare` overrides.
//!
//! Cookie overrides are appended AFTER the jar-derived cookie string on the
//! wire. Servers disagree on whether the first or last duplicate name wins;
//! append-after is the documented contract here, not an accident.

use cookie::Cookie;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::collections::HashMap;
use url::Url;

use crate::config::{StepConfig, StepRequest, WalkConfig};
use crate::transport::EffectiveRequest;

pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// Characters escaped by `encodeURIComponent`: everything except
/// alphanumerics and `- _ . ! ~ * ' ( )`. Spaces become `%20`, never `+`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Headers sent on every request unless overridden by a later source.
pub fn default_headers() -> HashMap<String, String> {
    HashMap::from([
        ("accept".to_string(), "*/*".to_string()),
        ("accept-encoding".to_string(), "gzip,deflate,br".to_string()),
        ("connection".to_string(), "close".to_string()),
        (
            "user-agent".to_string(),
            concat!("webwalk/", env!("CARGO_PKG_VERSION")).to_string(),
        ),
    ])
}

/// Flatten header sources into one lower-cased map, later sources winning
/// on key collision (case-insensitively).
pub fn merge_headers<'a, I>(sources: I) -> HashMap<String, String>
where
    I: IntoIterator<Item = &'a HashMap<String, String>>,
{
    let mut merged = HashMap::new();
    for source in sources {
        for (name, value) in source {
            merged.insert(name.to_ascii_lowercase(), value.clone());
        }
    }
    merged
}

/// Flatten name->value sources (cookies, form data), later sources winning.
/// Names are kept verbatim; cookie and form names are case-sensitive.
pub fn merge_pairs<'a, I>(sources: I) -> HashMap<String, String>
where
    I: IntoIterator<Item = &'a HashMap<String, String>>,
{
    let mut merged = HashMap::new();
    for source in sources {
        for (name, value) in source {
            merged.insert(name.clone(), value.clone());
        }
    }
    merged
}

/// Serialize the mandatory overrides and append them after the jar-derived
/// cookie string, joined with `;`. Either side may be empty.
pub fn build_cookie_header(site_cookies: &str, overrides: &HashMap<String, String>) -> String {
    let mut names: Vec<&String> = overrides.keys().collect();
    names.sort();
    let override_string = names
        .iter()
        .map(|name| Cookie::new(name.as_str(), overrides[*name].as_str()).to_string())
        .collect::<Vec<_>>()
        .join(";");

    let mut parts = Vec::new();
    if !site_cookies.is_empty() {
        parts.push(site_cookies.to_string());
    }
    if !override_string.is_empty() {
        parts.push(override_string);
    }
    parts.join(";")
}

/// Fold the computed cookie header into the header map, concatenating with
/// any `cookie` value already present. An empty result leaves the map
/// untouched; no empty `cookie:` header is ever emitted.
pub fn inject_cookie_header(headers: &mut HashMap<String, String>, cookie_header: &str) {
    let existing = headers.get("cookie").map(String::as_str).unwrap_or("");
    let merged = [existing, cookie_header]
        .iter()
        .map(|segment| segment.trim())
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join(";");
    if !merged.is_empty() {
        headers.insert("cookie".to_string(), merged);
    }
}

/// Percent-encode the pairs into an `application/x-www-form-urlencoded`
/// body. `None` when the map is empty - "no form body", not an empty string.
pub fn encode_form_data(pairs: &HashMap<String, String>) -> Option<String> {
    if pairs.is_empty() {
        return None;
    }
    let mut names: Vec<&String> = pairs.keys().collect();
    names.sort();
    Some(
        names
            .iter()
            .map(|name| {
                format!(
                    "{}={}",
                    utf8_percent_encode(name, COMPONENT),
                    utf8_percent_encode(&pairs[*name], COMPONENT)
                )
            })
            .collect::<Vec<_>>()
            .join("&"),
    )
}

/// Materialize the request actually sent for one step.
///
/// `prepared` is the `prepare` hook's override record and `site_cookies` the
/// jar's serialized string for the resolved URL. Cookie and form-data maps
/// are folded into the header/body here and do not survive onto the result.
pub fn assemble_request(
    config: &WalkConfig,
    step: &StepConfig,
    prepared: &StepRequest,
    site_cookies: &str,
    url: Url,
) -> EffectiveRequest {
    let defaults = default_headers();
    let mut headers = merge_headers([
        &defaults,
        &config.headers,
        &step.request.headers,
        &prepared.headers,
    ]);

    let override_cookies = merge_pairs([&config.cookies, &step.request.cookies, &prepared.cookies]);
    let cookie_header = build_cookie_header(site_cookies, &override_cookies);
    inject_cookie_header(&mut headers, &cookie_header);

    let mut body = prepared.body.clone().or_else(|| step.request.body.clone());
    if body.is_none() {
        let form = merge_pairs([&step.request.form_data, &prepared.form_data]);
        if let Some(encoded) = encode_form_data(&form) {
            body = Some(encoded);
            headers
                .entry("content-type".to_string())
                .or_insert_with(|| FORM_URLENCODED.to_string());
        }
    }

    let method = prepared
        .method
        .clone()
        .or_else(|| step.request.method.clone())
        .unwrap_or_else(|| {
            if body.is_some() {
                "POST".to_string()
            } else {
                "GET".to_string()
            }
        })
        .to_ascii_uppercase();

    EffectiveRequest {
        method,
        url,
        headers,
        body,
    }
}
