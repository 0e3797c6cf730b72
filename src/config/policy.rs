// src/config/policy.rs
//
// Named calibration policies turning a raw AI probability into a bounded
// confidence in the chosen label.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::error::{DetectionError, Result};

/// Preset policies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PolicyPreset {
    /// Confidence that the chosen label is right, clamped to [0.50, 0.98]
    /// and boosted when the score is far from the threshold
    AnswerConfidence,
    /// The raw AI score itself, clamped to [0.02, 0.98]
    RawScore,
    /// User-defined settings
    Custom,
}

impl PolicyPreset {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "answer" | "answer-confidence" | "answer_confidence" => Some(Self::AnswerConfidence),
            "raw" | "raw-score" | "raw_score" => Some(Self::RawScore),
            _ => None,
        }
    }
}

impl fmt::Display for PolicyPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::AnswerConfidence => "answer-confidence",
            Self::RawScore => "raw-score",
            Self::Custom => "custom",
        };
        write!(f, "{}", name)
    }
}

/// What the pre-clamp confidence is measured from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfidenceBasis {
    /// `raw` for AI_GENERATED, `1 - raw` for HUMAN
    ChosenLabel,
    /// `raw` regardless of label
    RawScore,
}

/// Raise confidence to at least `floor` when |raw - threshold| > `margin`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Boost {
    pub margin: f64,
    pub floor: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationPolicy {
    pub name: String,
    pub preset: PolicyPreset,
    /// Decision threshold on the raw AI probability (inclusive on the AI side)
    pub threshold: f64,
    pub clamp_low: f64,
    pub clamp_high: f64,
    pub basis: ConfidenceBasis,
    pub boost: Option<Boost>,
}

impl Default for CalibrationPolicy {
    fn default() -> Self {
        Self::from_preset(PolicyPreset::AnswerConfidence)
    }
}

impl CalibrationPolicy {
    pub fn from_preset(preset: PolicyPreset) -> Self {
        match preset {
            PolicyPreset::AnswerConfidence => Self::answer_confidence(),
            PolicyPreset::RawScore => Self::raw_score(),
            PolicyPreset::Custom => Self::answer_confidence(),
        }
    }

    fn answer_confidence() -> Self {
        Self {
            name: "AnswerConfidence".to_string(),
            preset: PolicyPreset::AnswerConfidence,
            threshold: 0.6,
            clamp_low: 0.50,
            clamp_high: 0.98,
            basis: ConfidenceBasis::ChosenLabel,
            boost: Some(Boost {
                margin: 0.15,
                floor: 0.85,
            }),
        }
    }

    fn raw_score() -> Self {
        Self {
            name: "RawScore".to_string(),
            preset: PolicyPreset::RawScore,
            threshold: 0.6,
            clamp_low: 0.02,
            clamp_high: 0.98,
            basis: ConfidenceBasis::RawScore,
            boost: None,
        }
    }

    /// Check the policy is internally consistent
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(DetectionError::InvalidConfig(msg));

        if !(self.threshold > 0.0 && self.threshold < 1.0) {
            return invalid(format!("threshold {} must lie in (0, 1)", self.threshold));
        }
        if !(0.0..=1.0).contains(&self.clamp_low)
            || !(0.0..=1.0).contains(&self.clamp_high)
            || self.clamp_low > self.clamp_high
        {
            return invalid(format!(
                "clamp bounds [{}, {}] must satisfy 0 <= low <= high <= 1",
                self.clamp_low, self.clamp_high
            ));
        }
        if let Some(boost) = self.boost {
            if !(boost.margin >= 0.0 && boost.margin < 1.0) {
                return invalid(format!("boost margin {} must lie in [0, 1)", boost.margin));
            }
            if boost.floor < self.clamp_low || boost.floor > self.clamp_high {
                return invalid(format!(
                    "boost floor {} lies outside clamp bounds [{}, {}]",
                    boost.floor, self.clamp_low, self.clamp_high
                ));
            }
        }
        Ok(())
    }

    /// Load and validate a policy from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            DetectionError::InvalidConfig(format!("cannot read policy {}: {}", path.display(), e))
        })?;
        let policy: Self = serde_json::from_str(&text).map_err(|e| {
            DetectionError::InvalidConfig(format!("invalid policy {}: {}", path.display(), e))
        })?;
        policy.validate()?;
        Ok(policy)
    }
}

/// Builder for custom policies
pub struct PolicyBuilder {
    policy: CalibrationPolicy,
}

impl PolicyBuilder {
    pub fn new() -> Self {
        Self {
            policy: CalibrationPolicy::default(),
        }
    }

    pub fn from_preset(preset: PolicyPreset) -> Self {
        Self {
            policy: CalibrationPolicy::from_preset(preset),
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.policy.name = name.into();
        self
    }

    pub fn threshold(mut self, threshold: f64) -> Self {
        self.policy.threshold = threshold;
        self
    }

    pub fn clamp(mut self, low: f64, high: f64) -> Self {
        self.policy.clamp_low = low;
        self.policy.clamp_high = high;
        self
    }

    pub fn basis(mut self, basis: ConfidenceBasis) -> Self {
        self.policy.basis = basis;
        self
    }

    pub fn boost(mut self, margin: f64, floor: f64) -> Self {
        self.policy.boost = Some(Boost { margin, floor });
        self
    }

    pub fn no_boost(mut self) -> Self {
        self.policy.boost = None;
        self
    }

    /// Validate and return the policy. Changing only the threshold keeps the
    /// preset; any other change marks the policy as custom.
    pub fn build(mut self) -> Result<CalibrationPolicy> {
        let base = CalibrationPolicy::from_preset(self.policy.preset);
        let changed = self.policy.clamp_low != base.clamp_low
            || self.policy.clamp_high != base.clamp_high
            || self.policy.basis != base.basis
            || self.policy.boost != base.boost
            || self.policy.name != base.name;
        if changed {
            self.policy.preset = PolicyPreset::Custom;
        }
        self.policy.validate()?;
        Ok(self.policy)
    }
}

impl Default for PolicyBuilder {
    fn default() -> Self {
        Self::new()
    }
}
