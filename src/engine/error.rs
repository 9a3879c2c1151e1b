//! Walk error types

use crate::transport::TransportError;

/// Errors that abort a walk.
///
/// Hook and transport failures carry the zero-based index of the step that
/// raised them; history and the jar reflect only the steps completed before
/// it. HTTP error statuses are never a `WalkError` - they surface as ordinary
/// response data.
#[derive(Debug, thiserror::Error)]
pub enum WalkError {
    #[error("prepare hook failed at step {step}: {source}")]
    PrepareHook {
        step: usize,
        #[source]
        source: anyhow::Error,
    },

    #[error("process hook failed at step {step}: {source}")]
    ProcessHook {
        step: usize,
        #[source]
        source: anyhow::Error,
    },

    #[error("transport error at step {step}: {source}")]
    Transport {
        step: usize,
        #[source]
        source: TransportError,
    },

    #[error("invalid step url '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("failed to initialize transport: {0}")]
    Setup(#[from] TransportError),
}
