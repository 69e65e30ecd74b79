//! Random-forest classifier over flat node vectors.

use serde::{Deserialize, Serialize};

use super::{Classifier, ProbabilisticClassifier};
use crate::{Error, Result};

/// Split condition for a decision node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplitCondition {
    /// Feature index to split on
    pub feature_index: u32,
    /// Threshold value (go left if feature < threshold)
    pub threshold: f64,
}

impl SplitCondition {
    pub fn new(feature_index: u32, threshold: f64) -> Self {
        Self {
            feature_index,
            threshold,
        }
    }

    /// Evaluate which direction to go for a feature value.
    /// Returns true for left, false for right.
    #[inline]
    pub fn go_left(&self, feature_value: f64) -> bool {
        feature_value < self.threshold
    }
}

/// A node in a decision tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TreeNode {
    /// Internal split node
    Split {
        condition: SplitCondition,
        left: u32,
        right: u32,
    },
    /// Leaf holding a class probability distribution
    Leaf { distribution: Vec<f64> },
}

/// A single decision tree over a flat node vector; node 0 is the root and
/// children always come after their parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<TreeNode>,
}

impl DecisionTree {
    pub fn new(nodes: Vec<TreeNode>) -> Self {
        Self { nodes }
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Walk the tree for one feature row down to a leaf distribution.
    pub fn predict_distribution(&self, features: &[f64]) -> Result<&[f64]> {
        let mut idx = 0usize;
        loop {
            match self.nodes.get(idx) {
                Some(TreeNode::Split {
                    condition,
                    left,
                    right,
                }) => {
                    let value = features
                        .get(condition.feature_index as usize)
                        .copied()
                        .ok_or_else(|| {
                            Error::Internal(format!(
                                "split references feature {} but row has {} values",
                                condition.feature_index,
                                features.len()
                            ))
                        })?;
                    idx = if condition.go_left(value) {
                        *left as usize
                    } else {
                        *right as usize
                    };
                }
                Some(TreeNode::Leaf { distribution }) => return Ok(distribution),
                None => {
                    return Err(Error::Internal(format!(
                        "tree walk reached missing node {}",
                        idx
                    )))
                }
            }
        }
    }

    /// Structural validation against the forest's shape.
    ///
    /// Children must point past their parent, which also rules out cycles,
    /// so `predict_distribution` always terminates on a validated tree.
    pub fn validate(&self, num_features: usize, num_classes: usize) -> Result<()> {
        if self.nodes.is_empty() {
            return Err(Error::Artifact("tree has no nodes".to_string()));
        }

        for (idx, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Split {
                    condition,
                    left,
                    right,
                } => {
                    if condition.feature_index as usize >= num_features {
                        return Err(Error::Artifact(format!(
                            "node {} splits on feature {} but the model has {} features",
                            idx, condition.feature_index, num_features
                        )));
                    }
                    for child in [*left, *right] {
                        if child as usize >= self.nodes.len() {
                            return Err(Error::Artifact(format!(
                                "node {} points at missing child {}",
                                idx, child
                            )));
                        }
                        if child as usize <= idx {
                            return Err(Error::Artifact(format!(
                                "node {} points backwards at child {}",
                                idx, child
                            )));
                        }
                    }
                }
                TreeNode::Leaf { distribution } => {
                    if distribution.len() != num_classes {
                        return Err(Error::Artifact(format!(
                            "leaf {} has {} class entries but the model has {} classes",
                            idx,
                            distribution.len(),
                            num_classes
                        )));
                    }
                }
            }
        }

        Ok(())
    }
}

/// Averaged ensemble of classification trees.
///
/// Prediction averages the leaf distributions of every tree; the label is
/// the class with the highest averaged probability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    num_features: usize,
    num_classes: usize,
    trees: Vec<DecisionTree>,
}

impl RandomForest {
    pub fn new(num_features: usize, num_classes: usize, trees: Vec<DecisionTree>) -> Result<Self> {
        let forest = Self {
            num_features,
            num_classes,
            trees,
        };
        forest.validate()?;
        Ok(forest)
    }

    /// Check the whole ensemble for structural consistency.
    pub fn validate(&self) -> Result<()> {
        if self.num_features == 0 {
            return Err(Error::Artifact("model expects zero features".to_string()));
        }
        if self.num_classes == 0 {
            return Err(Error::Artifact("model predicts zero classes".to_string()));
        }
        if self.trees.is_empty() {
            return Err(Error::Artifact("forest has no trees".to_string()));
        }
        for tree in &self.trees {
            tree.validate(self.num_features, self.num_classes)?;
        }
        Ok(())
    }

    pub fn num_features(&self) -> usize {
        self.num_features
    }

    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }

    fn check_row(&self, features: &[f64]) -> Result<()> {
        if features.len() != self.num_features {
            return Err(Error::Internal(format!(
                "model expects {} features, got {}",
                self.num_features,
                features.len()
            )));
        }
        Ok(())
    }
}

impl Classifier for RandomForest {
    fn num_features(&self) -> usize {
        self.num_features
    }

    fn num_classes(&self) -> usize {
        self.num_classes
    }

    fn predict(&self, features: &[f64]) -> Result<u32> {
        let probabilities = self.predict_probabilities(features)?;
        Ok(argmax(&probabilities))
    }
}

impl ProbabilisticClassifier for RandomForest {
    fn predict_probabilities(&self, features: &[f64]) -> Result<Vec<f64>> {
        self.check_row(features)?;

        let mut sums = vec![0.0f64; self.num_classes];
        for tree in &self.trees {
            let distribution = tree.predict_distribution(features)?;
            for (sum, p) in sums.iter_mut().zip(distribution) {
                *sum += p;
            }
        }

        let scale = 1.0 / self.trees.len() as f64;
        for sum in sums.iter_mut() {
            *sum *= scale;
        }

        Ok(sums)
    }
}

/// Index of the largest probability; ties break toward the lowest index.
fn argmax(probabilities: &[f64]) -> u32 {
    let mut best = 0usize;
    for (idx, p) in probabilities.iter().enumerate().skip(1) {
        if *p > probabilities[best] {
            best = idx;
        }
    }
    best as u32
}
