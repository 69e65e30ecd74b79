//! # Pathwise Common Library
//!
//! Shared code for the Pathwise trainer and inference service:
//! - Trained artifact contracts (category encoders, feature order, forest)
//! - Classifier capability traits
//! - SQLite record store for submissions and predictions
//! - Configuration loading

pub mod artifacts;
pub mod config;
pub mod db;
pub mod error;
pub mod model;

pub use error::{Error, Result};
