//! Utility functions and helper modules.
//!
//! This module contains request inspection helpers used by handlers and
//! middleware, plus credential masking for logs.

pub mod http;
pub mod route;

pub use http::*;
pub use route::*;
