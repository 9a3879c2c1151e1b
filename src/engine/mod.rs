//! Walk execution engine module
//!
//! This module contains:
//! - `executor` - the session walker and per-step state machine
//! - `merge` - request assembly and merge precedence rules
//! - `response` - response normalization into `StepResponse`
//! - `error` - walk error types

pub mod error;
pub mod executor;
pub mod merge;
pub mod response;

pub use error::WalkError;
pub use executor::{walk, Walker};
pub use merge::{
    build_cookie_header, encode_form_data, inject_cookie_header, merge_headers, FORM_URLENCODED,
};
pub use response::{normalize_response, StepResponse};
