// src/detection/classifier.rs
//
// Scoring seam between feature extraction and calibration

use log::warn;
use std::sync::Once;

use crate::core::{FeatureVector, SchemaVersion};
use crate::error::{DetectionError, Result};

use super::result::Label;

/// A model that returns the probability that a voice is AI-generated.
///
/// Implementations are shared read-only across threads.
pub trait Classifier: Send + Sync {
    fn name(&self) -> &str;

    /// Layout the model was trained against
    fn schema(&self) -> SchemaVersion;

    /// Probability of the AI-generated class, in [0, 1]
    fn score_ai(&self, features: &FeatureVector) -> Result<f64>;
}

/// A model that can only return a hard label
pub trait LabelClassifier: Send + Sync {
    fn name(&self) -> &str;
    fn schema(&self) -> SchemaVersion;
    fn predict_label(&self, features: &FeatureVector) -> Result<Label>;
}

/// Exposes a [`LabelClassifier`] as a [`Classifier`] scoring AI as 1.0 and
/// human as 0.0. Calibrated confidence is then always at a clamp bound.
pub struct HardLabelAdapter<C> {
    inner: C,
    warned: Once,
}

impl<C: LabelClassifier> HardLabelAdapter<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            warned: Once::new(),
        }
    }

    pub fn into_inner(self) -> C {
        self.inner
    }
}

impl<C: LabelClassifier> Classifier for HardLabelAdapter<C> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn schema(&self) -> SchemaVersion {
        self.inner.schema()
    }

    fn score_ai(&self, features: &FeatureVector) -> Result<f64> {
        self.warned.call_once(|| {
            warn!(
                "classifier '{}' returns hard labels only; confidence will sit at the policy bounds",
                self.inner.name()
            );
        });
        Ok(match self.inner.predict_label(features)? {
            Label::AiGenerated => 1.0,
            Label::Human => 0.0,
        })
    }
}

/// Reject scores a calibrator cannot accept
pub fn check_probability(name: &str, p: f64) -> Result<f64> {
    if p.is_finite() && (0.0..=1.0).contains(&p) {
        Ok(p)
    } else {
        Err(DetectionError::PredictionFailed(format!(
            "classifier '{}' returned {}",
            name, p
        )))
    }
}
