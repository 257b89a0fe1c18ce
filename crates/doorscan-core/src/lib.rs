//! # doorscan-core
//!
//! Core types, validation, and repository traits for the doorscan API.
//!
//! This crate holds the domain models for buildings, points of interest,
//! POI details, users and user groups, plus the error type every other
//! crate returns.

pub mod defaults;
pub mod error;
pub mod logging;
pub mod models;
pub mod query;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use models::*;
pub use query::{parse_positive_id, ListQuery, RadiusParams, RadiusQuery};
pub use traits::*;
