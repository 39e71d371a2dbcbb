//! Model bundle - serialized forest plus its reported accuracy
//!
//! Loaded once at startup and shared read-only between requests.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::models::NewObservation;
use super::features::{self, FeatureVector, FEATURE_COUNT, FEATURE_LAYOUT};
use super::forest::{DecisionTree, ForestError, RandomForest};
use super::{format_decimal, round2, Verdict};

/// Probability of the danger class at or above which an observation is flagged
pub const DANGER_THRESHOLD: f64 = 0.5;

/// Index of the danger class in the forest output
const DANGER_CLASS: usize = 1;

#[derive(Debug, Error)]
pub enum BundleError {
    #[error("cannot read model bundle {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed model bundle: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid forest: {0}")]
    Forest(#[from] ForestError),

    #[error("accuracy {0} is outside 0..=1")]
    AccuracyOutOfRange(f64),

    #[error("bundle features {found:?} do not match the expected layout")]
    FeatureMismatch { found: Vec<String> },
}

/// On-disk JSON shape
#[derive(Debug, Deserialize)]
struct BundleFile {
    accuracy: f64,
    #[serde(default)]
    feature_names: Option<Vec<String>>,
    #[serde(default = "default_class_count")]
    n_classes: usize,
    trees: Vec<DecisionTree>,
}

fn default_class_count() -> usize {
    2
}

/// Probability-based assessment used by the dashboard form
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskAssessment {
    pub is_danger: bool,
    /// Danger probability in 0..=1
    pub probability: f64,
    /// Danger probability as a percentage rounded to two decimals
    pub probability_pct: f64,
}

impl RiskAssessment {
    pub fn verdict(&self) -> Verdict {
        Verdict::from_flag(self.is_danger)
    }
}

/// Class-only prediction used by the single prediction page
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub is_danger: bool,
    pub features: FeatureVector,
}

impl Classification {
    pub fn verdict(&self) -> Verdict {
        Verdict::from_flag(self.is_danger)
    }
}

#[derive(Debug)]
pub struct ModelBundle {
    forest: RandomForest,
    accuracy: f64,
    fingerprint: String,
}

impl ModelBundle {
    pub fn load(path: &Path) -> Result<Self, BundleError> {
        let bytes = fs::read(path).map_err(|source| BundleError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let bundle = Self::from_slice(&bytes)?;
        tracing::info!(
            "Model bundle loaded from {} ({} trees, accuracy {}%, sha256 {})",
            path.display(),
            bundle.forest.tree_count(),
            bundle.accuracy_percent(),
            &bundle.fingerprint[..12]
        );
        Ok(bundle)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, BundleError> {
        let fingerprint = format!("{:x}", Sha256::digest(bytes));
        let file: BundleFile = serde_json::from_slice(bytes)?;

        if !(0.0..=1.0).contains(&file.accuracy) {
            return Err(BundleError::AccuracyOutOfRange(file.accuracy));
        }

        if let Some(names) = file.feature_names {
            if names.iter().map(String::as_str).ne(FEATURE_LAYOUT.iter().copied()) {
                return Err(BundleError::FeatureMismatch { found: names });
            }
        }

        let forest = RandomForest::new(file.trees, FEATURE_COUNT, file.n_classes)?;

        Ok(Self {
            forest,
            accuracy: file.accuracy,
            fingerprint,
        })
    }

    /// SHA-256 of the artifact bytes, hex encoded
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn tree_count(&self) -> usize {
        self.forest.tree_count()
    }

    pub fn accuracy_percent(&self) -> f64 {
        round2(self.accuracy * 100.0)
    }

    pub fn accuracy_label(&self) -> String {
        format!("정확도: {}%", format_decimal(self.accuracy_percent()))
    }

    /// Danger probability with the [`DANGER_THRESHOLD`] cut
    pub fn assess(&self, obs: &NewObservation) -> RiskAssessment {
        let x = features::encode(obs);
        let probability = self.forest.predict_proba(&x)[DANGER_CLASS];

        RiskAssessment {
            is_danger: probability >= DANGER_THRESHOLD,
            probability,
            probability_pct: round2(probability * 100.0),
        }
    }

    /// Majority class, reported together with the encoded inputs
    pub fn classify(&self, obs: &NewObservation) -> Classification {
        let features = features::encode(obs);
        let class = self.forest.predict(&features);

        Classification {
            is_danger: class == DANGER_CLASS,
            features,
        }
    }
}
