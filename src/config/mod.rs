//! Walk configuration types
//!
//! This module contains the static definition of a walk:
//! - `WalkConfig` - session-wide defaults plus the ordered step list
//! - `StepConfig` - one step: URL, request template, optional hooks
//! - `StepRequest` - the partial request template/override shape
//! - `hooks` - the `prepare`/`process` hook traits and closure adapters

pub mod hooks;

pub use hooks::{FnPrepare, FnProcess, PrepareHook, ProcessHook};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Top-level input to a walk: session defaults and the ordered steps.
///
/// Immutable for the duration of a walk. Session headers and cookies sit
/// below step-level values and above the built-in defaults in merge
/// precedence.
#[derive(Debug, Default)]
pub struct WalkConfig {
    /// Default headers applied to every step (case-insensitive names)
    pub headers: HashMap<String, String>,

    /// Default cookies forced onto every step's `cookie` header
    pub cookies: HashMap<String, String>,

    /// Steps in execution order
    pub steps: Vec<StepConfig>,
}

impl WalkConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.insert(name.into(), value.into());
        self
    }

    pub fn step(mut self, step: StepConfig) -> Self {
        self.steps.push(step);
        self
    }
}

/// Static definition of one step.
pub struct StepConfig {
    /// Target URL, used unless the `prepare` hook overrides it
    pub url: String,

    /// Static request template merged below `prepare` overrides
    pub request: StepRequest,

    /// Optional hook run before the request is assembled
    pub prepare: Option<Box<dyn PrepareHook>>,

    /// Optional hook run after the response is normalized
    pub process: Option<Box<dyn ProcessHook>>,
}

impl StepConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            request: StepRequest::default(),
            prepare: None,
            process: None,
        }
    }

    pub fn request(mut self, request: StepRequest) -> Self {
        self.request = request;
        self
    }

    pub fn prepare(mut self, hook: impl PrepareHook + 'static) -> Self {
        self.prepare = Some(Box::new(hook));
        self
    }

    pub fn process(mut self, hook: impl ProcessHook + 'static) -> Self {
        self.process = Some(Box::new(hook));
        self
    }
}

impl fmt::Debug for StepConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepConfig")
            .field("url", &self.url)
            .field("request", &self.request)
            .field("prepare", &self.prepare.is_some())
            .field("process", &self.process.is_some())
            .finish()
    }
}

/// Partial request shape used both as a step's static template and as the
/// override record returned by a `prepare` hook.
///
/// `cookies` and `form_data` are construction-time conveniences; they are
/// folded into the `cookie` header and the body during assembly and never
/// reach the transport as-is.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StepRequest {
    /// Replacement target URL; only meaningful when returned by `prepare`
    pub url: Option<String>,

    /// Explicit method; defaults to POST with a body, GET without
    pub method: Option<String>,

    /// Explicit body, taking priority over encoded form data
    pub body: Option<String>,

    pub headers: HashMap<String, String>,

    pub cookies: HashMap<String, String>,

    /// Url-encoded into the body when no explicit body is set
    pub form_data: HashMap<String, String>,
}

impl StepRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.insert(name.into(), value.into());
        self
    }

    pub fn form_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.form_data.insert(name.into(), value.into());
        self
    }
}
