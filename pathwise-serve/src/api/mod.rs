//! HTTP API handlers for pathwise-serve

pub mod admin;
pub mod health;
pub mod predict;

pub use admin::list_records;
pub use health::{health_check, health_routes};
pub use predict::{list_interests, predict};
