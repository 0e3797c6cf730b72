// src/detection/pipeline.rs
//
// Waveform -> features -> score -> calibrated verdict with explanation

use log::debug;
use std::path::Path;
use std::sync::Arc;

use crate::config::CalibrationPolicy;
use crate::core::{decode_bytes, decode_file, FeatureExtractor, FeatureVector, Waveform};
use crate::error::{DetectionError, Result};

use super::calibrator::ScoreCalibrator;
use super::classifier::Classifier;
use super::explanation::{ExplanationEngine, ExplanationThresholds};
use super::result::ClassificationResult;

/// End-to-end detector. Immutable after construction and safe to share
/// between threads; each call works on its own waveform.
pub struct VoiceDetector {
    extractor: FeatureExtractor,
    classifier: Arc<dyn Classifier>,
    calibrator: ScoreCalibrator,
    explainer: ExplanationEngine,
    include_features: bool,
}

impl VoiceDetector {
    pub fn new(
        extractor: FeatureExtractor,
        classifier: Arc<dyn Classifier>,
        policy: CalibrationPolicy,
    ) -> Result<Self> {
        Self::with_thresholds(extractor, classifier, policy, ExplanationThresholds::default())
    }

    pub fn with_thresholds(
        extractor: FeatureExtractor,
        classifier: Arc<dyn Classifier>,
        policy: CalibrationPolicy,
        thresholds: ExplanationThresholds,
    ) -> Result<Self> {
        let schema = extractor.schema().version();
        if classifier.schema() != schema {
            return Err(DetectionError::SchemaMismatch(format!(
                "classifier '{}' uses {} schema, extractor uses {}",
                classifier.name(),
                classifier.schema(),
                schema
            )));
        }
        let calibrator = ScoreCalibrator::new(policy)?;
        let explainer = ExplanationEngine::new(extractor.schema(), thresholds)?;

        Ok(Self {
            extractor,
            classifier,
            calibrator,
            explainer,
            include_features: false,
        })
    }

    /// Attach the feature vector to every result
    pub fn include_features(mut self, include: bool) -> Self {
        self.include_features = include;
        self
    }

    pub fn extractor(&self) -> &FeatureExtractor {
        &self.extractor
    }

    pub fn policy(&self) -> &CalibrationPolicy {
        self.calibrator.policy()
    }

    pub fn classifier_name(&self) -> &str {
        self.classifier.name()
    }

    pub fn analyze(&self, waveform: &Waveform) -> Result<ClassificationResult> {
        let features = self.extractor.extract(waveform)?;
        self.classify(features)
    }

    /// Score an already extracted vector
    pub fn classify(&self, features: FeatureVector) -> Result<ClassificationResult> {
        let raw_probability = self.classifier.score_ai(&features)?;
        let calibration = self.calibrator.calibrate(raw_probability)?;
        let explanation = self
            .explainer
            .explain(&features, raw_probability, self.calibrator.threshold())?;

        debug!(
            "raw {:.4} -> {} ({:.4})",
            raw_probability, calibration.label, calibration.confidence
        );

        Ok(ClassificationResult {
            label: calibration.label,
            raw_probability,
            confidence: calibration.confidence,
            explanation,
            features: self.include_features.then_some(features),
        })
    }

    pub fn analyze_file(&self, path: &Path) -> Result<ClassificationResult> {
        let audio = decode_file(path)?;
        debug!(
            "decoded {}: {} Hz, {} ch, {:.2}s ({})",
            path.display(),
            audio.sample_rate,
            audio.channels,
            audio.duration_secs,
            audio.codec_name
        );
        self.analyze(&audio.to_waveform()?)
    }

    pub fn analyze_bytes(&self, bytes: Vec<u8>, extension: Option<&str>) -> Result<ClassificationResult> {
        let audio = decode_bytes(bytes, extension)?;
        self.analyze(&audio.to_waveform()?)
    }
}
