//! Detection module for VoiceCheckr
//!
//! Classifier seam, score calibration, explanations and the end-to-end
//! [`VoiceDetector`].

mod calibrator;
mod classifier;
mod explanation;
mod model;
mod pipeline;
mod result;

pub use calibrator::ScoreCalibrator;
pub use classifier::{check_probability, Classifier, HardLabelAdapter, LabelClassifier};
pub use explanation::{ExplanationEngine, ExplanationThresholds};
pub use model::{
    LogisticModel, ModelArtifact, ModelClassifier, ModelKind, Tree, TreeEnsemble, TreeNode,
};
pub use pipeline::VoiceDetector;
pub use result::{Calibration, ClassificationResult, Label};
