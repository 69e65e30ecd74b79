//! Feature column ordering

use crate::{Error, Result};

/// Ordered feature column names, fixed at training time.
///
/// The model's learned weights are positional: serving must assemble rows
/// in exactly this order, or features are silently misapplied. Equality is
/// therefore order-sensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureOrder {
    columns: Vec<String>,
}

impl FeatureOrder {
    pub fn new(columns: Vec<String>) -> Result<Self> {
        if columns.is_empty() {
            return Err(Error::Artifact(
                "feature order must name at least one column".to_string(),
            ));
        }

        let mut unique = columns.clone();
        unique.sort();
        unique.dedup();
        if unique.len() != columns.len() {
            return Err(Error::Artifact(
                "feature order contains a duplicate column name".to_string(),
            ));
        }

        Ok(Self { columns })
    }

    /// Column names in model input order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Position of a column name, if present.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }
}
