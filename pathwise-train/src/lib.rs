//! pathwise-train library - offline trainer for the career model
//!
//! Turns a labeled CSV of student records into the four-file artifact
//! bundle that pathwise-serve loads at startup.

pub mod dataset;
pub mod error;
pub mod trainer;

pub use error::{TrainError, TrainResult};
