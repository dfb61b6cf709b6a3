//! Business logic and service layer modules.
//!
//! This module contains the core of the application: the credential quota
//! gate, the cache-or-fetch report resolver and the collaborators it drives
//! (report store, upstream provider client), plus metrics collection.

pub mod clock;
pub mod metrics;
pub mod quota;
pub mod resilient_client;
pub mod store;
pub mod upstream;
pub mod weather;

pub use clock::*;
pub use metrics::*;
pub use quota::*;
pub use resilient_client::{ResilientClient, ResilientClientConfig, ResilientClientError};
pub use store::*;
pub use upstream::*;
pub use weather::*;
