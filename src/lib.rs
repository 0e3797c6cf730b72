//! VoiceCheckr - Detect AI-generated speech
//!
//! Reduces a speech recording to a fixed-length vector of spectral and
//! prosodic statistics, scores it with a trained model, and turns the raw
//! score into a bounded confidence plus a short rule-based explanation.
//!
//! ## Module Structure
//!
//! - `core` - Decoding, DSP and feature extraction
//! - `config` - Named calibration policies
//! - `detection` - Classifier seam, calibration, explanations, pipeline
//! - `cli` - Command-line interface
//! - `testgen` - Deterministic synthetic test signals
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use voicecheckr::{CalibrationPolicy, FeatureExtractor, ModelClassifier, SchemaVersion, VoiceDetector};
//!
//! let extractor = FeatureExtractor::with_schema(SchemaVersion::Basic);
//! let model = ModelClassifier::load(path, extractor.schema())?;
//! let detector = VoiceDetector::new(extractor, Arc::new(model), CalibrationPolicy::default())?;
//!
//! let result = detector.analyze_file(clip)?;
//! println!("{} ({:.0}%): {}", result.label, result.confidence * 100.0, result.explanation);
//! ```
//!
//! ## Feature Schemas
//!
//! | Schema   | Features | Groups                                                   |
//! |----------|----------|----------------------------------------------------------|
//! | Basic    | 39       | MFCC, centroid, rolloff, flatness, pitch, ZCR, RMS, silence, smoothness |
//! | Extended | 92       | Basic plus delta-MFCC, bandwidth, contrast, chroma, tonnetz |
//!
//! A model artifact records the schema fingerprint it was trained on and is
//! refused by any extractor using a different layout.
//!
//! ## Calibration Policies
//!
//! | Policy           | Bounds        | Confidence measured from | Boost               |
//! |------------------|---------------|--------------------------|---------------------|
//! | AnswerConfidence | [0.50, 0.98]  | chosen label             | >= 0.85 beyond 0.15 |
//! | RawScore         | [0.02, 0.98]  | raw AI score             | none                |

// Core analysis functionality
pub mod core;

// Command-line interface
pub mod cli;

// Calibration policies
pub mod config;

// Scoring, calibration and explanation
pub mod detection;

pub mod error;

// Synthetic test signal generation
pub mod testgen;

// Re-export commonly used types at crate root for convenience
pub use config::{CalibrationPolicy, PolicyBuilder, PolicyPreset};
pub use core::{
    AudioData, ExtractorConfig, FeatureExtractor, FeatureSchema, FeatureSlot, FeatureVector,
    SchemaVersion, Waveform,
};
pub use detection::{
    Classifier, ClassificationResult, ExplanationEngine, HardLabelAdapter, Label,
    LabelClassifier, ModelClassifier, ScoreCalibrator, VoiceDetector,
};
pub use error::{DetectionError, ErrorKind, Result};
