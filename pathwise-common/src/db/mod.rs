//! SQLite persistence for submissions and predictions.

pub mod init;
pub mod store;

pub use init::init_database;
pub use store::{PredictionListing, PredictionOutcome, RecordIds, RecordStore, StudentSubmission};
