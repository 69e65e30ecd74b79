//! End-to-end training test: CSV in, loadable artifact bundle out.

use std::fs;

use pathwise_common::artifacts::ArtifactBundle;
use pathwise_common::model::ModelCapability;
use pathwise_train::dataset::Dataset;
use pathwise_train::trainer::{accuracy, encode_dataset, fit, split_indices, TrainConfig};

/// Four cleanly separated career bands. Every score column and the interest
/// carry the class signal, and the surplus `name` column must be ignored.
const TRAINING_CSV: &str = "\
name,English,Math,Science,History,Geography,Interest,career_path
Ana,10,11,12,13,14,Arts,Artist
Ben,12,13,14,15,16,Arts,Artist
Cleo,14,15,16,10,11,Arts,Artist
Dev,16,10,11,12,13,Arts,Artist
Eli,40,41,42,43,44,Medicine,Doctor
Fay,42,43,44,45,46,Medicine,Doctor
Gus,44,45,46,40,41,Medicine,Doctor
Hana,46,40,41,42,43,Medicine,Doctor
Ivan,70,71,72,73,74,Coding,Engineer
Jade,72,73,74,75,76,Coding,Engineer
Kai,74,75,76,70,71,Coding,Engineer
Lena,76,70,71,72,73,Coding,Engineer
Mona,92,93,94,95,96,Other,Teacher
Nils,94,95,96,97,98,Other,Teacher
Omar,96,97,98,92,93,Other,Teacher
Pia,98,92,93,94,95,Other,Teacher
";

#[test]
fn trained_bundle_round_trips_through_the_serving_loader() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("career_data.csv");
    fs::write(&csv_path, TRAINING_CSV).unwrap();

    let dataset = Dataset::load(&csv_path).unwrap();
    assert_eq!(dataset.len(), 16);

    let encoded = encode_dataset(&dataset).unwrap();
    let config = TrainConfig {
        num_trees: 40,
        ..TrainConfig::default()
    };
    let forest = fit(
        &encoded.rows,
        &encoded.labels,
        encoded.target_encoder.len(),
        &config,
    )
    .unwrap();

    let models = dir.path().join("models");
    let bundle_id = ArtifactBundle::save(
        &models,
        &forest,
        &encoded.interest_encoder,
        &encoded.target_encoder,
        &encoded.feature_order,
    )
    .unwrap();

    let bundle = ArtifactBundle::load(&models).unwrap();
    assert_eq!(bundle.bundle_id, bundle_id);
    assert_eq!(
        bundle.feature_order.columns(),
        &["English", "Math", "Science", "History", "Geography", "Interest"]
    );
    assert!(bundle.interest_encoder.contains("Other"));
    assert_eq!(bundle.target_encoder.len(), 4);

    // Probe one training row per class through the loaded model.
    // Interests encode alphabetically: Arts 0, Coding 1, Medicine 2, Other 3.
    let probes: [([f64; 6], &str); 4] = [
        ([10.0, 11.0, 12.0, 13.0, 14.0, 0.0], "Artist"),
        ([40.0, 41.0, 42.0, 43.0, 44.0, 2.0], "Doctor"),
        ([70.0, 71.0, 72.0, 73.0, 74.0, 1.0], "Engineer"),
        ([92.0, 93.0, 94.0, 95.0, 96.0, 3.0], "Teacher"),
    ];

    match &bundle.model {
        ModelCapability::Probabilistic(model) => {
            for (row, career) in &probes {
                let label = model.predict(row).unwrap();
                assert_eq!(bundle.target_encoder.decode(label).unwrap(), *career);

                let probs = model.predict_probabilities(row).unwrap();
                assert_eq!(probs.len(), 4);
                assert!((probs.iter().sum::<f64>() - 1.0).abs() < 1e-9);
            }
        }
        ModelCapability::LabelOnly(_) => panic!("trained bundles should load as probabilistic"),
    }
}

#[test]
fn holdout_split_scores_well_on_separable_bands() {
    let dataset = Dataset::parse(TRAINING_CSV).unwrap();
    let encoded = encode_dataset(&dataset).unwrap();

    let (train_idx, eval_idx) = split_indices(encoded.rows.len(), 0.25, 42);
    assert_eq!(train_idx.len(), 12);
    assert_eq!(eval_idx.len(), 4);

    let train_rows: Vec<Vec<f64>> = train_idx.iter().map(|&i| encoded.rows[i].clone()).collect();
    let train_labels: Vec<u32> = train_idx.iter().map(|&i| encoded.labels[i]).collect();

    let config = TrainConfig {
        num_trees: 60,
        ..TrainConfig::default()
    };
    let forest = fit(
        &train_rows,
        &train_labels,
        encoded.target_encoder.len(),
        &config,
    )
    .unwrap();

    let score = accuracy(&forest, &encoded.rows, &encoded.labels, &eval_idx).unwrap();
    assert!(score >= 0.75, "holdout accuracy {score} too low");
}
