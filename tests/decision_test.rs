// tests/decision_test.rs
//
// Calibration, explanation and end-to-end verdicts

mod test_utils;

use std::sync::Arc;

use test_utils::*;
use voicecheckr::config::{PolicyBuilder, PolicyPreset};
use voicecheckr::detection::ModelClassifier;
use voicecheckr::testgen::{generate_signal, SignalConfig, SignalKind};
use voicecheckr::{
    CalibrationPolicy, DetectionError, ErrorKind, ExplanationEngine, FeatureExtractor,
    FeatureSchema, FeatureSlot, FeatureVector, HardLabelAdapter, Label, LabelClassifier,
    ScoreCalibrator, SchemaVersion, VoiceDetector,
};

fn detector(probability: f64, policy: CalibrationPolicy) -> VoiceDetector {
    VoiceDetector::new(
        FeatureExtractor::with_schema(SchemaVersion::Basic),
        Arc::new(FixedScore {
            probability,
            schema: SchemaVersion::Basic,
        }),
        policy,
    )
    .unwrap()
}

#[test]
fn test_synthetic_sine_scenario() {
    let result = detector(0.82, CalibrationPolicy::default())
        .analyze(&sine(220.0, 3.0, 0.5))
        .unwrap();

    assert_eq!(result.label, Label::AiGenerated);
    assert_eq!(result.raw_probability, 0.82);
    assert!(result.confidence >= 0.82 && result.confidence <= 0.98);
    assert!(result.explanation.contains("Robotic pitch consistency"));
    assert!(result.explanation.contains("synthetic vocal stability"));
}

#[test]
fn test_probability_at_threshold_is_ai() {
    for preset in [PolicyPreset::AnswerConfidence, PolicyPreset::RawScore] {
        let policy = CalibrationPolicy::from_preset(preset);
        let result = detector(policy.threshold, policy)
            .analyze(&sine(220.0, 1.0, 0.5))
            .unwrap();
        assert_eq!(result.label, Label::AiGenerated);
        assert!(result.explanation.starts_with("Classified as AI-generated speech."));
    }
}

#[test]
fn test_bounds_and_label_consistency() {
    for preset in [PolicyPreset::AnswerConfidence, PolicyPreset::RawScore] {
        for t in [0.05, 0.25, 0.5, 0.6, 0.75, 0.95] {
            let policy = PolicyBuilder::from_preset(preset).threshold(t).build().unwrap();
            let (low, high) = (policy.clamp_low, policy.clamp_high);
            let calibrator = ScoreCalibrator::new(policy).unwrap();

            for i in 0..=200 {
                let p = i as f64 / 200.0;
                let c = calibrator.calibrate(p).unwrap();
                assert!(c.confidence >= low && c.confidence <= high, "{:?} t={} p={}", preset, t, p);
                assert_eq!(c.label == Label::AiGenerated, p >= t);
            }
        }
    }
}

#[test]
fn test_policies_disagree_on_same_score() {
    let answer = ScoreCalibrator::new(CalibrationPolicy::from_preset(PolicyPreset::AnswerConfidence)).unwrap();
    let raw = ScoreCalibrator::new(CalibrationPolicy::from_preset(PolicyPreset::RawScore)).unwrap();

    let a = answer.calibrate(0.2).unwrap();
    let r = raw.calibrate(0.2).unwrap();
    assert_eq!(a.label, r.label);
    assert_eq!(a.confidence, 0.85);
    assert_eq!(r.confidence, 0.2);
}

#[test]
fn test_explanation_never_empty() {
    let schema = FeatureSchema::new(SchemaVersion::Extended);
    let engine = ExplanationEngine::new(&schema, Default::default()).unwrap();
    let grid = [0.0, 0.0005, 0.002, 0.1, 0.7, 15.0, 50.0, -3.0];

    for &value in &grid {
        let features = FeatureVector::new(&schema, vec![value; schema.len()]).unwrap();
        for p in [0.0, 0.3, 0.6, 0.99] {
            let text = engine.explain(&features, p, 0.6).unwrap();
            assert!(text.len() > "Classified as human speech. ".len());
            assert!(text.ends_with(" detected."));
        }
    }
}

#[test]
fn test_model_trained_on_other_schema_is_refused() {
    let basic = FeatureSchema::new(SchemaVersion::Basic);
    let extended_extractor = FeatureExtractor::with_schema(SchemaVersion::Extended);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("basic.json");
    single_weight_model(&basic, 0, 1.0, 0.0).save(&path).unwrap();

    let err = ModelClassifier::load(&path, extended_extractor.schema()).unwrap_err();
    assert!(matches!(err, DetectionError::SchemaMismatch(_)));
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[test]
fn test_loaded_model_drives_verdict() {
    let extractor = FeatureExtractor::with_schema(SchemaVersion::Basic);
    let schema = extractor.schema().clone();
    let silence_pos = schema.position(FeatureSlot::SilenceRatio).unwrap();

    // Score falls as the silence ratio rises
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.json");
    single_weight_model(&schema, silence_pos, -40.0, 2.0).save(&path).unwrap();

    let classifier = ModelClassifier::load(&path, &schema).unwrap();
    let detector = VoiceDetector::new(extractor, Arc::new(classifier), CalibrationPolicy::default()).unwrap();

    let synthetic = detector.analyze(&sine(220.0, 3.0, 0.5)).unwrap();
    assert_eq!(synthetic.label, Label::AiGenerated);

    let human = generate_signal(&SignalConfig::new(SignalKind::HumanLike, 3.0));
    let result = detector.analyze(&human).unwrap();
    assert_eq!(result.label, Label::Human);
    assert!(result.explanation.starts_with("Classified as human speech."));
}

struct AlwaysHuman;

impl LabelClassifier for AlwaysHuman {
    fn name(&self) -> &str {
        "always-human"
    }
    fn schema(&self) -> SchemaVersion {
        SchemaVersion::Basic
    }
    fn predict_label(&self, _: &FeatureVector) -> voicecheckr::Result<Label> {
        Ok(Label::Human)
    }
}

#[test]
fn test_hard_label_model_through_adapter() {
    let detector = VoiceDetector::new(
        FeatureExtractor::with_schema(SchemaVersion::Basic),
        Arc::new(HardLabelAdapter::new(AlwaysHuman)),
        CalibrationPolicy::default(),
    )
    .unwrap();

    let result = detector.analyze(&sine(220.0, 1.0, 0.5)).unwrap();
    assert_eq!(result.label, Label::Human);
    assert_eq!(result.raw_probability, 0.0);
    assert_eq!(result.confidence, 0.98);
}

#[test]
fn test_short_clip_is_client_error() {
    let err = detector(0.5, CalibrationPolicy::default())
        .analyze(&sine(220.0, 0.2, 0.5))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ClientInput);
}
