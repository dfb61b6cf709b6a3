//! Configuration structures and loading utilities.
//!
//! This module contains all configuration structures used by the application,
//! including environment variable loading and default values.

pub mod logging;
pub mod metrics;
pub mod quota;
pub mod resilient_client;
pub mod weather;

pub use logging::*;
pub use metrics::*;
pub use quota::*;
pub use weather::*;
