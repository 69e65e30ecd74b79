//! Trained artifact bundle: loading, saving, and consistency checks.
//!
//! A training run produces four files that only make sense together: the
//! serialized forest, the interest-category encoder, the target-label
//! encoder, and the feature order. Every file carries the same stamped
//! bundle id; loading rejects any mix of files from different runs.

pub mod encoder;
pub mod feature_order;

pub use encoder::CategoryEncoder;
pub use feature_order::FeatureOrder;

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::model::{ModelCapability, RandomForest};
use crate::{Error, Result};

/// File names within the models directory.
pub const MODEL_FILE: &str = "career_model.json";
pub const INTEREST_ENCODER_FILE: &str = "interest_encoder.json";
pub const TARGET_ENCODER_FILE: &str = "target_encoder.json";
pub const FEATURE_ORDER_FILE: &str = "feature_order.json";

#[derive(Serialize, Deserialize)]
struct ModelArtifact {
    bundle_id: Uuid,
    forest: RandomForest,
}

#[derive(Serialize, Deserialize)]
struct EncoderArtifact {
    bundle_id: Uuid,
    classes: Vec<String>,
}

#[derive(Serialize, Deserialize)]
struct FeatureOrderArtifact {
    bundle_id: Uuid,
    columns: Vec<String>,
}

/// The four co-versioned trained artifacts, loaded and used as one unit.
#[derive(Debug)]
pub struct ArtifactBundle {
    /// Shared id stamped into every file at save time.
    pub bundle_id: Uuid,
    /// The classifier, wrapped in the capability it exposes.
    pub model: ModelCapability,
    /// Encoder for the interest input feature.
    pub interest_encoder: CategoryEncoder,
    /// Encoder for the predicted career labels.
    pub target_encoder: CategoryEncoder,
    /// Column order the model was trained on.
    pub feature_order: FeatureOrder,
}

impl ArtifactBundle {
    /// Load all four artifacts from `dir`.
    ///
    /// Fails if any file is missing or unparsable, if the files carry
    /// different bundle ids, or if their shapes disagree (feature count,
    /// class count). Callers treat any of these as fatal: serving with a
    /// partial or mixed bundle would silently misapply the model.
    pub fn load(dir: &Path) -> Result<Self> {
        let model_artifact: ModelArtifact = read_artifact(dir, MODEL_FILE)?;
        let interest_artifact: EncoderArtifact = read_artifact(dir, INTEREST_ENCODER_FILE)?;
        let target_artifact: EncoderArtifact = read_artifact(dir, TARGET_ENCODER_FILE)?;
        let order_artifact: FeatureOrderArtifact = read_artifact(dir, FEATURE_ORDER_FILE)?;

        let bundle_id = model_artifact.bundle_id;
        for (file, id) in [
            (INTEREST_ENCODER_FILE, interest_artifact.bundle_id),
            (TARGET_ENCODER_FILE, target_artifact.bundle_id),
            (FEATURE_ORDER_FILE, order_artifact.bundle_id),
        ] {
            if id != bundle_id {
                return Err(Error::Artifact(format!(
                    "{} is from bundle {} but {} is from bundle {}; all artifacts must come from one training run",
                    file, id, MODEL_FILE, bundle_id
                )));
            }
        }

        let forest = model_artifact.forest;
        forest.validate()?;
        let interest_encoder = CategoryEncoder::from_classes(interest_artifact.classes)?;
        let target_encoder = CategoryEncoder::from_classes(target_artifact.classes)?;
        let feature_order = FeatureOrder::new(order_artifact.columns)?;

        check_shapes(&forest, &target_encoder, &feature_order)?;

        info!(
            %bundle_id,
            trees = forest.num_trees(),
            features = feature_order.len(),
            classes = target_encoder.len(),
            "Loaded artifact bundle"
        );

        Ok(Self {
            bundle_id,
            model: ModelCapability::Probabilistic(Box::new(forest)),
            interest_encoder,
            target_encoder,
            feature_order,
        })
    }

    /// Write all four artifacts under a fresh shared bundle id.
    ///
    /// The same shape checks as `load` run first, so an inconsistent
    /// bundle can never reach disk. Returns the stamped id.
    pub fn save(
        dir: &Path,
        forest: &RandomForest,
        interest_encoder: &CategoryEncoder,
        target_encoder: &CategoryEncoder,
        feature_order: &FeatureOrder,
    ) -> Result<Uuid> {
        forest.validate()?;
        check_shapes(forest, target_encoder, feature_order)?;

        std::fs::create_dir_all(dir)?;
        let bundle_id = Uuid::new_v4();

        write_artifact(
            dir,
            MODEL_FILE,
            &ModelArtifact {
                bundle_id,
                forest: forest.clone(),
            },
        )?;
        write_artifact(
            dir,
            INTEREST_ENCODER_FILE,
            &EncoderArtifact {
                bundle_id,
                classes: interest_encoder.classes().to_vec(),
            },
        )?;
        write_artifact(
            dir,
            TARGET_ENCODER_FILE,
            &EncoderArtifact {
                bundle_id,
                classes: target_encoder.classes().to_vec(),
            },
        )?;
        write_artifact(
            dir,
            FEATURE_ORDER_FILE,
            &FeatureOrderArtifact {
                bundle_id,
                columns: feature_order.columns().to_vec(),
            },
        )?;

        info!(%bundle_id, dir = %dir.display(), "Saved artifact bundle");
        Ok(bundle_id)
    }
}

fn check_shapes(
    forest: &RandomForest,
    target_encoder: &CategoryEncoder,
    feature_order: &FeatureOrder,
) -> Result<()> {
    if feature_order.len() != forest.num_features() {
        return Err(Error::Artifact(format!(
            "feature order names {} columns but the model expects {}",
            feature_order.len(),
            forest.num_features()
        )));
    }
    if target_encoder.len() != forest.num_classes() {
        return Err(Error::Artifact(format!(
            "target encoder has {} labels but the model predicts {} classes",
            target_encoder.len(),
            forest.num_classes()
        )));
    }
    Ok(())
}

fn read_artifact<T: serde::de::DeserializeOwned>(dir: &Path, file: &str) -> Result<T> {
    let path = dir.join(file);
    let contents = std::fs::read_to_string(&path).map_err(|e| {
        Error::Artifact(format!(
            "cannot read {}: {} (run pathwise-train first to produce a model)",
            path.display(),
            e
        ))
    })?;
    serde_json::from_str(&contents)
        .map_err(|e| Error::Artifact(format!("cannot parse {}: {}", path.display(), e)))
}

fn write_artifact<T: Serialize>(dir: &Path, file: &str, value: &T) -> Result<()> {
    let path = dir.join(file);
    let contents = serde_json::to_string_pretty(value)
        .map_err(|e| Error::Artifact(format!("cannot serialize {}: {}", file, e)))?;
    std::fs::write(&path, contents)?;
    Ok(())
}
