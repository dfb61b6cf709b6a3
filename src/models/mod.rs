//! Data models and schemas for the weather API.
//!
//! This module contains the data structures exchanged with clients and
//! collaborators: request/response models, report values and error bodies.

pub mod api;
pub mod error;
pub mod report;

pub use api::*;
pub use error::*;
pub use report::*;
