//! Consumer-supplied step hooks
//!
//! A `prepare` hook runs before a step's request is assembled and may return
//! overrides (including a replacement URL) computed from earlier responses.
//! A `process` hook runs after normalization and turns the response into the
//! step's output value. Both are optional; a missing `prepare` means empty
//! overrides and a missing `process` means the raw body text.
//!
//! Hook errors are opaque `anyhow::Error`s and abort the whole walk.

use async_trait::async_trait;
use futures::future::BoxFuture;
use serde_json::Value;

use super::StepRequest;
use crate::engine::response::StepResponse;

/// Computes request overrides for a step before it is assembled.
#[async_trait]
pub trait PrepareHook: Send + Sync {
    /// `last` is the previous step's response (`None` for the first step);
    /// `history` holds every completed step in order.
    async fn prepare(
        &self,
        last: Option<&StepResponse>,
        history: &[StepResponse],
    ) -> anyhow::Result<StepRequest>;
}

/// Interprets a step's normalized response into its output value.
#[async_trait]
pub trait ProcessHook: Send + Sync {
    async fn process(
        &self,
        response: &StepResponse,
        history: &[StepResponse],
    ) -> anyhow::Result<Value>;
}

/// Adapter turning an async closure into a [`PrepareHook`].
///
/// The closure receives owned clones of the last response and the history so
/// its future does not have to borrow from the executor.
pub struct FnPrepare<F>(F);

impl<F> FnPrepare<F>
where
    F: Fn(Option<StepResponse>, Vec<StepResponse>) -> BoxFuture<'static, anyhow::Result<StepRequest>>
        + Send
        + Sync,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

#[async_trait]
impl<F> PrepareHook for FnPrepare<F>
where
    F: Fn(Option<StepResponse>, Vec<StepResponse>) -> BoxFuture<'static, anyhow::Result<StepRequest>>
        + Send
        + Sync,
{
    async fn prepare(
        &self,
        last: Option<&StepResponse>,
        history: &[StepResponse],
    ) -> anyhow::Result<StepRequest> {
        (self.0)(last.cloned(), history.to_vec()).await
    }
}

/// Adapter turning an async closure into a [`ProcessHook`].
pub struct FnProcess<F>(F);

impl<F> FnProcess<F>
where
    F: Fn(StepResponse, Vec<StepResponse>) -> BoxFuture<'static, anyhow::Result<Value>>
        + Send
        + Sync,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

#[async_trait]
impl<F> ProcessHook for FnProcess<F>
where
    F: Fn(StepResponse, Vec<StepResponse>) -> BoxFuture<'static, anyhow::Result<Value>>
        + Send
        + Sync,
{
    async fn process(
        &self,
        response: &StepResponse,
        history: &[StepResponse],
    ) -> anyhow::Result<Value> {
        (self.0)(response.clone(), history.to_vec()).await
    }
}
