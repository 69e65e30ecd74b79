//! Classifier capability traits and the trained forest implementation.

pub mod forest;

pub use forest::{DecisionTree, RandomForest, SplitCondition, TreeNode};

use crate::Result;

/// A trained classifier producing an encoded class label per feature row.
pub trait Classifier {
    /// Number of input features the model was trained on.
    fn num_features(&self) -> usize;

    /// Number of target classes.
    fn num_classes(&self) -> usize;

    /// Predict the encoded class label for one feature row.
    fn predict(&self, features: &[f64]) -> Result<u32>;
}

/// A classifier that can additionally estimate per-class probabilities.
pub trait ProbabilisticClassifier: Classifier {
    /// Probability per class for one feature row; entries sum to 1.
    fn predict_probabilities(&self, features: &[f64]) -> Result<Vec<f64>>;
}

/// The capability a loaded model actually exposes.
///
/// Not every classifier family estimates calibrated probabilities. The
/// variant makes that explicit so callers branch on what they hold instead
/// of probing for a method at call time.
pub enum ModelCapability {
    /// Label prediction only; confidence is unavailable.
    LabelOnly(Box<dyn Classifier + Send + Sync>),
    /// Label prediction plus a class probability distribution.
    Probabilistic(Box<dyn ProbabilisticClassifier + Send + Sync>),
}

impl std::fmt::Debug for ModelCapability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelCapability::LabelOnly(_) => f.write_str("ModelCapability::LabelOnly"),
            ModelCapability::Probabilistic(_) => f.write_str("ModelCapability::Probabilistic"),
        }
    }
}

impl ModelCapability {
    pub fn num_features(&self) -> usize {
        match self {
            ModelCapability::LabelOnly(model) => model.num_features(),
            ModelCapability::Probabilistic(model) => model.num_features(),
        }
    }

    pub fn num_classes(&self) -> usize {
        match self {
            ModelCapability::LabelOnly(model) => model.num_classes(),
            ModelCapability::Probabilistic(model) => model.num_classes(),
        }
    }
}
