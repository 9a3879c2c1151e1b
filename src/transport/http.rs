//! Default reqwest-backed transport
//!
//! Follows redirects with reqwest's default policy and reads the full body
//! as text. Cookie handling is deliberately NOT enabled on the client; the
//! walk engine owns the jar and replays cookies through the `cookie` header
//! so that every stored cookie is visible to hooks.
//!
//! Content encoding is negotiated by reqwest itself. A manually supplied
//! `accept-encoding` header turns reqwest's automatic decompression off and
//! would hand compressed bytes to the text-oriented normalizer, so that
//! header is stripped from the wire request here; it stays visible on the
//! [`EffectiveRequest`] that hooks and custom transports see.

use async_trait::async_trait;
use reqwest::header::{HeaderName, HeaderValue};
use reqwest::Method;
use tracing::debug;

use super::{EffectiveRequest, Transport, TransportError, TransportResponse};

/// HTTP transport built on a shared [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::default())
            .build()?;
        Ok(Self { client })
    }

    /// Wrap an existing client, keeping whatever policies it was built with.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

/// Header pairs actually written to the wire. `accept-encoding` is left to
/// the client, which advertises and decodes the codings it was built with.
fn wire_headers(request: &EffectiveRequest) -> impl Iterator<Item = (&str, &str)> {
    request
        .headers
        .iter()
        .filter(|(name, _)| !name.eq_ignore_ascii_case("accept-encoding"))
        .map(|(name, value)| (name.as_str(), value.as_str()))
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(&self, request: &EffectiveRequest) -> Result<TransportResponse, TransportError> {
        let method = Method::from_bytes(request.method.as_bytes())
            .map_err(|_| TransportError::InvalidMethod(request.method.clone()))?;

        let mut builder = self.client.request(method, request.url.clone());

        for (name, value) in wire_headers(request) {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                TransportError::InvalidHeader {
                    name: name.to_string(),
                    message: e.to_string(),
                }
            })?;
            let value =
                HeaderValue::from_str(value).map_err(|e| TransportError::InvalidHeader {
                    name: name.to_string(),
                    message: e.to_string(),
                })?;
            builder = builder.header(name, value);
        }

        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        debug!(method = %request.method, url = %request.url, "executing request");

        let response = builder.send().await?;

        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response.text().await?;

        debug!(status, %final_url, bytes = body.len(), "received response");

        Ok(TransportResponse {
            status,
            headers,
            final_url,
            body,
        })
    }
}
