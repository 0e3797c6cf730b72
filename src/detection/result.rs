//! Classification result types

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::FeatureVector;

/// Predicted origin of a voice recording
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Label {
    #[serde(rename = "AI_GENERATED")]
    AiGenerated,
    #[serde(rename = "HUMAN")]
    Human,
}

impl Label {
    /// AI_GENERATED iff `raw_probability >= threshold`
    pub fn from_probability(raw_probability: f64, threshold: f64) -> Self {
        if raw_probability >= threshold {
            Label::AiGenerated
        } else {
            Label::Human
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Label::AiGenerated => "AI_GENERATED",
            Label::Human => "HUMAN",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Label::AiGenerated => "✗",
            Label::Human => "✓",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Label::AiGenerated => "AI-generated voice",
            Label::Human => "Human voice",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Output of the score calibrator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    pub label: Label,
    pub confidence: f64,
}

/// Final verdict for one waveform. Built once per request, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub label: Label,
    pub raw_probability: f64,
    pub confidence: f64,
    pub explanation: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub features: Option<FeatureVector>,
}

impl ClassificationResult {
    pub fn is_ai_generated(&self) -> bool {
        self.label == Label::AiGenerated
    }
}
