//! Session walker - drives the per-step state machine
//!
//! One walk runs its steps strictly sequentially:
//! 1. Run the step's `prepare` hook (empty overrides when absent)
//! 2. Resolve the URL (a `prepare` override beats the static URL)
//! 3. Query the jar for that URL's cookie string
//! 4. Assemble the effective request (merge precedence in `merge`)
//! 5. Exchange via the transport (redirects followed inside it)
//! 6. Normalize the response
//! 7. Run the `process` hook (raw body text when absent)
//! 8. Commit: append to history, absorb Set-Cookie lines scoped to the
//!    final post-redirect URL
//!
//! No step begins before the prior step's commit. A hook or transport error
//! aborts the walk; history and the jar then reflect only completed steps.

use serde_json::Value;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::config::{StepConfig, StepRequest, WalkConfig};
use crate::cookies::{CookieStore, MemoryCookieJar};
use crate::engine::error::WalkError;
use crate::engine::merge::assemble_request;
use crate::engine::response::{normalize_response, StepResponse};
use crate::transport::{HttpTransport, Transport, TransportResponse};

/// Executes walks against an owned transport.
///
/// The transport is the only long-lived piece; every `walk` call gets its
/// own fresh jar and history, so independent walks share no mutable state.
pub struct Walker {
    transport: Box<dyn Transport>,
}

impl Walker {
    /// Walker over the default reqwest-backed transport.
    pub fn new() -> Result<Self, WalkError> {
        Ok(Self {
            transport: Box::new(HttpTransport::new()?),
        })
    }

    /// Walker over a custom transport (tests, instrumentation, cancellation
    /// wrappers).
    pub fn with_transport(transport: impl Transport + 'static) -> Self {
        Self {
            transport: Box::new(transport),
        }
    }

    /// Run every configured step in order and return the final step's
    /// output. An empty step list resolves to `None` without any exchange.
    #[instrument(skip_all, fields(steps = config.steps.len()))]
    pub async fn walk(&self, config: &WalkConfig) -> Result<Option<Value>, WalkError> {
        self.walk_with_jar(config, Box::new(MemoryCookieJar::new()))
            .await
    }

    /// Same as [`walk`](Self::walk) with a caller-supplied cookie store,
    /// e.g. a pre-seeded jar. The jar must not be shared with another
    /// in-flight walk.
    pub async fn walk_with_jar(
        &self,
        config: &WalkConfig,
        mut jar: Box<dyn CookieStore>,
    ) -> Result<Option<Value>, WalkError> {
        if config.steps.is_empty() {
            debug!("no steps configured, nothing to do");
            return Ok(None);
        }

        let mut history: Vec<StepResponse> = Vec::with_capacity(config.steps.len());
        let mut final_output = None;

        for (index, step) in config.steps.iter().enumerate() {
            let (response, raw) = self
                .execute_step(index, step, config, jar.as_mut(), &history)
                .await?;

            final_output = response.output.clone();

            // Commit: history first, then the jar, scoped to the URL the
            // transport actually ended up at.
            history.push(response);
            match Url::parse(&raw.final_url) {
                Ok(scope) => {
                    for line in raw.set_cookie_lines() {
                        jar.absorb(line, &scope);
                    }
                }
                Err(e) => {
                    warn!(final_url = %raw.final_url, error = %e, "unparsable final url, skipping cookie absorption");
                }
            }
        }

        info!(steps = history.len(), "walk complete");
        Ok(final_output)
    }

    async fn execute_step(
        &self,
        index: usize,
        step: &StepConfig,
        config: &WalkConfig,
        jar: &mut dyn CookieStore,
        history: &[StepResponse],
    ) -> Result<(StepResponse, TransportResponse), WalkError> {
        let prepared = match &step.prepare {
            Some(hook) => hook
                .prepare(history.last(), history)
                .await
                .map_err(|source| WalkError::PrepareHook {
                    step: index,
                    source,
                })?,
            None => StepRequest::default(),
        };

        let target = prepared.url.as_deref().unwrap_or(&step.url);
        let url = Url::parse(target).map_err(|source| WalkError::InvalidUrl {
            url: target.to_string(),
            source,
        })?;

        let site_cookies = jar.cookie_string_for(&url);
        let request = assemble_request(config, step, &prepared, &site_cookies, url);

        debug!(step = index, method = %request.method, url = %request.url, "executing step");

        let raw = self
            .transport
            .fetch(&request)
            .await
            .map_err(|source| WalkError::Transport {
                step: index,
                source,
            })?;

        debug!(step = index, status = raw.status, final_url = %raw.final_url, "step responded");

        let mut response = normalize_response(&raw);

        let output = match &step.process {
            Some(hook) => hook
                .process(&response, history)
                .await
                .map_err(|source| WalkError::ProcessHook {
                    step: index,
                    source,
                })?,
            None => Value::String(response.text.clone()),
        };
        response.output = Some(output);

        Ok((response, raw))
    }
}

/// Run a walk over the default transport with a fresh jar.
///
/// Convenience wrapper for the common case; use [`Walker`] to inject a
/// transport or a pre-seeded jar.
pub async fn walk(config: &WalkConfig) -> Result<Option<Value>, WalkError> {
    Walker::new()?.walk(config).await
}
