//! # webwalk
//!
//! A scripted, multi-step HTTP walker: execute an ordered sequence of HTTP
//! exchanges against a site or API, carrying cookies and derived state
//! forward from each step to the next - the login-then-fetch-protected-page
//! flows a single request cannot express.
//!
//! ## Features
//!
//! - **Sequential steps** - each request sees the cookies and responses of
//!   every step before it
//! - **Merge precedence** - built-in defaults, session config, step template,
//!   and `prepare`-hook overrides flatten into one effective request
//! - **Cookie jar** - one jar per walk, replayed per-URL and updated from
//!   every Set-Cookie directive, redirects included
//! - **Hooks** - async `prepare`/`process` callbacks customize request
//!   construction and response interpretation per step
//! - **Injectable boundaries** - the HTTP transport and the cookie store are
//!   traits; swap them for tests or custom policies
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use webwalk::{walk, StepConfig, StepRequest, WalkConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = WalkConfig::new()
//!         .step(
//!             StepConfig::new("https://example.com/login").request(
//!                 StepRequest::new()
//!                     .form_field("user", "alice")
//!                     .form_field("password", "hunter2"),
//!             ),
//!         )
//!         // The session cookie set by the login response is replayed here.
//!         .step(StepConfig::new("https://example.com/account"));
//!
//!     let output = walk(&config).await?;
//!     println!("final page: {:?}", output);
//!     Ok(())
//! }
//! ```
//!
//! HTTP error statuses are surfaced as data on the step response, never as
//! engine errors; hook and transport failures abort the walk.

pub mod config;
pub mod cookies;
pub mod engine;
pub mod transport;

// Re-export main types
pub use config::{
    FnPrepare, FnProcess, PrepareHook, ProcessHook, StepConfig, StepRequest, WalkConfig,
};
pub use cookies::{parse_set_cookie, CookieStore, MemoryCookieJar, RawCookie};
pub use engine::{walk, StepResponse, WalkError, Walker};
pub use transport::{
    EffectiveRequest, HttpTransport, Transport, TransportError, TransportResponse,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{
        FnPrepare, FnProcess, PrepareHook, ProcessHook, StepConfig, StepRequest, WalkConfig,
    };
    pub use crate::cookies::{CookieStore, MemoryCookieJar, RawCookie};
    pub use crate::engine::{walk, StepResponse, WalkError, Walker};
    pub use crate::transport::{
        EffectiveRequest, HttpTransport, Transport, TransportError, TransportResponse,
    };
}
