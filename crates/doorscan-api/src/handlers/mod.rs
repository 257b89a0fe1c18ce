//! HTTP handlers for doorscan-api, one module per resource.

pub mod buildings;
pub mod files;
pub mod pois;
pub mod system;
pub mod user_groups;
pub mod users;
