//! Random-forest training.
//!
//! Bootstrap sampling per tree, a random feature subset per split, greedy
//! Gini splits, and leaves holding normalized class distributions. All
//! randomness flows from one seeded generator, so a fixed seed reproduces
//! the forest bit for bit.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use pathwise_common::artifacts::{CategoryEncoder, FeatureOrder};
use pathwise_common::model::{Classifier, DecisionTree, RandomForest, SplitCondition, TreeNode};

use crate::dataset::{Dataset, INTEREST_COLUMN, SCORE_COLUMNS};
use crate::error::{TrainError, TrainResult};

/// Training hyperparameters.
#[derive(Debug, Clone)]
pub struct TrainConfig {
    /// Number of trees in the forest.
    pub num_trees: usize,
    /// Depth cap; `None` grows until leaves are pure or too small to split.
    pub max_depth: Option<usize>,
    /// Smallest node the splitter will divide.
    pub min_samples_split: usize,
    /// Seed for bootstrap and feature sampling.
    pub seed: u64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            num_trees: 250,
            max_depth: None,
            min_samples_split: 2,
            seed: 42,
        }
    }
}

/// A dataset turned numeric, plus the artifacts that did the turning.
pub struct EncodedDataset {
    /// Feature rows in `feature_order` column order.
    pub rows: Vec<Vec<f64>>,
    /// Encoded career label per row.
    pub labels: Vec<u32>,
    pub interest_encoder: CategoryEncoder,
    pub target_encoder: CategoryEncoder,
    pub feature_order: FeatureOrder,
}

/// Fit both encoders over the full dataset and encode every example.
pub fn encode_dataset(dataset: &Dataset) -> TrainResult<EncodedDataset> {
    let interest_encoder =
        CategoryEncoder::fit(dataset.examples().iter().map(|e| e.interest.as_str()))?;
    let target_encoder =
        CategoryEncoder::fit(dataset.examples().iter().map(|e| e.career.as_str()))?;

    let mut columns: Vec<String> = SCORE_COLUMNS.iter().map(|s| s.to_string()).collect();
    columns.push(INTEREST_COLUMN.to_string());
    let feature_order = FeatureOrder::new(columns)?;

    let mut rows = Vec::with_capacity(dataset.len());
    let mut labels = Vec::with_capacity(dataset.len());
    for example in dataset.examples() {
        let mut row = example.scores.to_vec();
        row.push(f64::from(interest_encoder.encode(&example.interest)?));
        rows.push(row);
        labels.push(target_encoder.encode(&example.career)?);
    }

    Ok(EncodedDataset {
        rows,
        labels,
        interest_encoder,
        target_encoder,
        feature_order,
    })
}

/// Deterministically shuffle `0..num_rows` and split off the trailing
/// `holdout_fraction` as the evaluation set.
///
/// The holdout is clamped so at least one row is always left to train on.
pub fn split_indices(
    num_rows: usize,
    holdout_fraction: f64,
    seed: u64,
) -> (Vec<usize>, Vec<usize>) {
    let mut indices: Vec<usize> = (0..num_rows).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    // Fisher-Yates
    for i in (1..indices.len()).rev() {
        let j = rng.gen_range(0..=i);
        indices.swap(i, j);
    }

    let holdout = ((num_rows as f64 * holdout_fraction).round() as usize)
        .min(num_rows.saturating_sub(1));
    let train_len = num_rows - holdout;
    let eval = indices.split_off(train_len);
    (indices, eval)
}

/// Fit a random forest on encoded rows.
pub fn fit(
    rows: &[Vec<f64>],
    labels: &[u32],
    num_classes: usize,
    config: &TrainConfig,
) -> TrainResult<RandomForest> {
    if rows.is_empty() {
        return Err(TrainError::Invalid(
            "cannot train on an empty dataset".to_string(),
        ));
    }
    if rows.len() != labels.len() {
        return Err(TrainError::Invalid(format!(
            "row/label count mismatch: {} rows, {} labels",
            rows.len(),
            labels.len()
        )));
    }
    if config.num_trees == 0 {
        return Err(TrainError::Invalid("num_trees must be at least 1".to_string()));
    }
    let num_features = rows[0].len();
    if num_features == 0 {
        return Err(TrainError::Invalid("rows have no features".to_string()));
    }
    if let Some(row) = rows.iter().find(|row| row.len() != num_features) {
        return Err(TrainError::Invalid(format!(
            "ragged feature row: expected {} features, got {}",
            num_features,
            row.len()
        )));
    }
    if let Some(label) = labels.iter().find(|&&label| label as usize >= num_classes) {
        return Err(TrainError::Invalid(format!(
            "label {label} out of range for {num_classes} classes"
        )));
    }

    // sqrt(k) features per split, the usual forest default
    let features_per_split = ((num_features as f64).sqrt().round() as usize).clamp(1, num_features);

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut trees = Vec::with_capacity(config.num_trees);
    for _ in 0..config.num_trees {
        let sample = bootstrap_sample(rows.len(), &mut rng);
        let mut builder = TreeBuilder {
            rows,
            labels,
            num_classes,
            features_per_split,
            max_depth: config.max_depth,
            min_samples_split: config.min_samples_split.max(2),
            nodes: Vec::new(),
        };
        builder.grow(&sample, 0, &mut rng);
        trees.push(DecisionTree::new(builder.nodes));
    }

    let forest = RandomForest::new(num_features, num_classes, trees)?;
    info!(
        "Fitted {} trees over {} features, {} classes",
        forest.num_trees(),
        num_features,
        num_classes
    );
    Ok(forest)
}

/// Fraction of `indices` the forest labels correctly.
///
/// An empty index set scores 0; callers decide whether to report it.
pub fn accuracy(
    forest: &RandomForest,
    rows: &[Vec<f64>],
    labels: &[u32],
    indices: &[usize],
) -> TrainResult<f64> {
    if indices.is_empty() {
        return Ok(0.0);
    }
    let mut correct = 0usize;
    for &i in indices {
        if forest.predict(&rows[i])? == labels[i] {
            correct += 1;
        }
    }
    Ok(correct as f64 / indices.len() as f64)
}

/// `n` draws with replacement from `0..n`.
fn bootstrap_sample(n: usize, rng: &mut StdRng) -> Vec<usize> {
    (0..n).map(|_| rng.gen_range(0..n)).collect()
}

/// Choose `k` distinct feature indices by partial Fisher-Yates, sorted.
fn sample_features(num_features: usize, k: usize, rng: &mut StdRng) -> Vec<u32> {
    let k = k.min(num_features);
    let mut indices: Vec<u32> = (0..num_features as u32).collect();
    for i in 0..k {
        let j = rng.gen_range(i..num_features);
        indices.swap(i, j);
    }
    let mut sampled = indices[..k].to_vec();
    sampled.sort_unstable();
    sampled
}

/// Gini impurity of a node: 1 minus the summed squared class shares.
fn gini(counts: &[usize], total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    1.0 - counts
        .iter()
        .map(|&c| {
            let p = c as f64 / total;
            p * p
        })
        .sum::<f64>()
}

struct TreeBuilder<'a> {
    rows: &'a [Vec<f64>],
    labels: &'a [u32],
    num_classes: usize,
    features_per_split: usize,
    max_depth: Option<usize>,
    min_samples_split: usize,
    nodes: Vec<TreeNode>,
}

impl TreeBuilder<'_> {
    /// Grow the subtree for `indices` and return its node index.
    ///
    /// Children are pushed after their parent, so child links always point
    /// forward in the node vector.
    fn grow(&mut self, indices: &[usize], depth: usize, rng: &mut StdRng) -> u32 {
        let counts = self.class_counts(indices);
        let depth_capped = self.max_depth.map_or(false, |cap| depth >= cap);
        let too_small = indices.len() < self.min_samples_split;
        let pure = counts.iter().any(|&c| c == indices.len());

        if depth_capped || too_small || pure {
            return self.push_leaf(&counts, indices.len());
        }

        let Some((condition, left_rows, right_rows)) = self.best_split(indices, &counts, rng)
        else {
            return self.push_leaf(&counts, indices.len());
        };

        let node_index = self.nodes.len() as u32;
        // Placeholder children, patched after both subtrees exist
        self.nodes.push(TreeNode::Split {
            condition,
            left: 0,
            right: 0,
        });
        let left = self.grow(&left_rows, depth + 1, rng);
        let right = self.grow(&right_rows, depth + 1, rng);
        self.nodes[node_index as usize] = TreeNode::Split {
            condition,
            left,
            right,
        };
        node_index
    }

    fn push_leaf(&mut self, counts: &[usize], total: usize) -> u32 {
        let total = total.max(1) as f64;
        let distribution = counts.iter().map(|&c| c as f64 / total).collect();
        let index = self.nodes.len() as u32;
        self.nodes.push(TreeNode::Leaf { distribution });
        index
    }

    fn class_counts(&self, indices: &[usize]) -> Vec<usize> {
        let mut counts = vec![0usize; self.num_classes];
        for &i in indices {
            counts[self.labels[i] as usize] += 1;
        }
        counts
    }

    /// Greedy Gini split over a random feature subset.
    ///
    /// Candidate thresholds are midpoints between adjacent distinct values.
    /// Returns `None` when no candidate improves on the node's own impurity
    /// or every candidate leaves one side empty.
    fn best_split(
        &self,
        indices: &[usize],
        parent_counts: &[usize],
        rng: &mut StdRng,
    ) -> Option<(SplitCondition, Vec<usize>, Vec<usize>)> {
        let parent_gini = gini(parent_counts, indices.len());
        let total = indices.len() as f64;
        let mut best: Option<(f64, SplitCondition, Vec<usize>, Vec<usize>)> = None;

        for feature in sample_features(self.rows[0].len(), self.features_per_split, rng) {
            let mut values: Vec<f64> = indices
                .iter()
                .map(|&i| self.rows[i][feature as usize])
                .collect();
            values.sort_by(f64::total_cmp);
            values.dedup();

            for pair in values.windows(2) {
                let threshold = (pair[0] + pair[1]) / 2.0;
                let condition = SplitCondition::new(feature, threshold);
                let (left, right): (Vec<usize>, Vec<usize>) = indices
                    .iter()
                    .copied()
                    .partition(|&i| condition.go_left(self.rows[i][feature as usize]));
                if left.is_empty() || right.is_empty() {
                    continue;
                }

                let left_gini = gini(&self.class_counts(&left), left.len());
                let right_gini = gini(&self.class_counts(&right), right.len());
                let weighted = left_gini * left.len() as f64 / total
                    + right_gini * right.len() as f64 / total;

                if weighted < parent_gini
                    && best.as_ref().map_or(true, |(score, ..)| weighted < *score)
                {
                    best = Some((weighted, condition, left, right));
                }
            }
        }

        best.map(|(_, condition, left, right)| (condition, left, right))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pathwise_common::model::ProbabilisticClassifier;

    /// Two redundant features, classes cleanly separated around 7.
    fn separable_data() -> (Vec<Vec<f64>>, Vec<u32>) {
        let rows = vec![
            vec![1.0, 1.0],
            vec![2.0, 2.0],
            vec![3.0, 3.0],
            vec![4.0, 4.0],
            vec![10.0, 10.0],
            vec![11.0, 11.0],
            vec![12.0, 12.0],
            vec![13.0, 13.0],
        ];
        let labels = vec![0, 0, 0, 0, 1, 1, 1, 1];
        (rows, labels)
    }

    fn small_config() -> TrainConfig {
        TrainConfig {
            num_trees: 40,
            seed: 7,
            ..TrainConfig::default()
        }
    }

    #[test]
    fn fit_separates_clean_classes() {
        let (rows, labels) = separable_data();
        let forest = fit(&rows, &labels, 2, &small_config()).unwrap();

        assert_eq!(forest.predict(&[2.5, 2.5]).unwrap(), 0);
        assert_eq!(forest.predict(&[11.5, 11.5]).unwrap(), 1);

        let probs = forest.predict_probabilities(&[2.5, 2.5]).unwrap();
        assert!(probs[0] > 0.9);
        assert!((probs.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn fit_is_deterministic_for_a_seed() {
        let (rows, labels) = separable_data();
        let first = fit(&rows, &labels, 2, &small_config()).unwrap();
        let second = fit(&rows, &labels, 2, &small_config()).unwrap();

        let first_json = serde_json::to_string(&first).unwrap();
        let second_json = serde_json::to_string(&second).unwrap();
        assert_eq!(first_json, second_json);
    }

    #[test]
    fn fit_respects_depth_cap() {
        let (rows, labels) = separable_data();
        let config = TrainConfig {
            max_depth: Some(0),
            ..small_config()
        };
        let forest = fit(&rows, &labels, 2, &config).unwrap();

        // Depth zero means every tree is a single leaf
        let probs = forest.predict_probabilities(&[2.5, 2.5]).unwrap();
        let far_probs = forest.predict_probabilities(&[11.5, 11.5]).unwrap();
        assert_eq!(probs, far_probs);
    }

    #[test]
    fn fit_rejects_empty_dataset() {
        let err = fit(&[], &[], 2, &small_config()).unwrap_err();
        assert!(matches!(err, TrainError::Invalid(_)));
    }

    #[test]
    fn fit_rejects_mismatched_labels() {
        let (rows, _) = separable_data();
        let err = fit(&rows, &[0, 1], 2, &small_config()).unwrap_err();
        assert!(matches!(err, TrainError::Invalid(_)));
    }

    #[test]
    fn fit_rejects_out_of_range_label() {
        let (rows, mut labels) = separable_data();
        labels[3] = 9;
        let err = fit(&rows, &labels, 2, &small_config()).unwrap_err();
        assert!(matches!(err, TrainError::Invalid(_)));
    }

    #[test]
    fn accuracy_is_perfect_on_separable_data() {
        let (rows, labels) = separable_data();
        let forest = fit(&rows, &labels, 2, &small_config()).unwrap();
        let all: Vec<usize> = (0..rows.len()).collect();

        let score = accuracy(&forest, &rows, &labels, &all).unwrap();
        assert!((score - 1.0).abs() < 1e-12);
    }

    #[test]
    fn accuracy_of_empty_holdout_is_zero() {
        let (rows, labels) = separable_data();
        let forest = fit(&rows, &labels, 2, &small_config()).unwrap();

        assert_eq!(accuracy(&forest, &rows, &labels, &[]).unwrap(), 0.0);
    }

    #[test]
    fn split_indices_partitions_every_row() {
        let (train, eval) = split_indices(10, 0.2, 42);

        assert_eq!(train.len(), 8);
        assert_eq!(eval.len(), 2);
        let mut all: Vec<usize> = train.iter().chain(eval.iter()).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn split_indices_is_reproducible() {
        assert_eq!(split_indices(20, 0.25, 42), split_indices(20, 0.25, 42));
    }

    #[test]
    fn split_indices_always_leaves_training_rows() {
        let (train, eval) = split_indices(3, 0.9, 1);
        assert_eq!(train.len(), 1);
        assert_eq!(eval.len(), 2);

        let (train, eval) = split_indices(5, 0.0, 1);
        assert_eq!(train.len(), 5);
        assert!(eval.is_empty());
    }

    #[test]
    fn encode_dataset_follows_score_then_interest_order() {
        let csv = "\
English,Math,Science,History,Geography,Interest,career_path
80,90,75,60,65,Coding,Engineer
55,60,88,70,72,Arts,Doctor
";
        let dataset = Dataset::parse(csv).unwrap();
        let encoded = encode_dataset(&dataset).unwrap();

        assert_eq!(
            encoded.feature_order.columns(),
            &["English", "Math", "Science", "History", "Geography", "Interest"]
        );
        // "Arts" < "Coding", so Coding encodes as 1
        assert_eq!(encoded.rows[0], vec![80.0, 90.0, 75.0, 60.0, 65.0, 1.0]);
        assert_eq!(encoded.rows[1], vec![55.0, 60.0, 88.0, 70.0, 72.0, 0.0]);
        assert_eq!(
            encoded.target_encoder.decode(encoded.labels[0]).unwrap(),
            "Engineer"
        );
        assert_eq!(
            encoded.target_encoder.decode(encoded.labels[1]).unwrap(),
            "Doctor"
        );
    }

    #[test]
    fn sample_features_stays_in_bounds() {
        let mut rng = StdRng::seed_from_u64(3);
        let sampled = sample_features(6, 3, &mut rng);

        assert_eq!(sampled.len(), 3);
        assert!(sampled.windows(2).all(|pair| pair[0] < pair[1]));
        assert!(sampled.iter().all(|&f| f < 6));
    }

    #[test]
    fn bootstrap_sample_draws_n_rows_in_range() {
        let mut rng = StdRng::seed_from_u64(3);
        let sample = bootstrap_sample(8, &mut rng);

        assert_eq!(sample.len(), 8);
        assert!(sample.iter().all(|&i| i < 8));
    }
}
