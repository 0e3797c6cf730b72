// src/detection/calibrator.rs
//
// Raw AI probability -> (label, calibrated confidence) under a named policy

use crate::config::{CalibrationPolicy, ConfidenceBasis};
use crate::error::{DetectionError, Result};

use super::result::{Calibration, Label};

/// Decimal places kept in the reported confidence
const CONFIDENCE_DECIMALS: i32 = 4;

#[derive(Debug, Clone)]
pub struct ScoreCalibrator {
    policy: CalibrationPolicy,
}

impl ScoreCalibrator {
    pub fn new(policy: CalibrationPolicy) -> Result<Self> {
        policy.validate()?;
        Ok(Self { policy })
    }

    pub fn policy(&self) -> &CalibrationPolicy {
        &self.policy
    }

    pub fn threshold(&self) -> f64 {
        self.policy.threshold
    }

    pub fn calibrate(&self, raw_probability: f64) -> Result<Calibration> {
        if !(0.0..=1.0).contains(&raw_probability) {
            return Err(DetectionError::PredictionFailed(format!(
                "probability {} outside [0, 1]",
                raw_probability
            )));
        }

        let policy = &self.policy;
        let label = Label::from_probability(raw_probability, policy.threshold);

        let base = match (policy.basis, label) {
            (ConfidenceBasis::ChosenLabel, Label::Human) => 1.0 - raw_probability,
            _ => raw_probability,
        };
        let mut confidence = base.clamp(policy.clamp_low, policy.clamp_high);

        if let Some(boost) = policy.boost {
            if (raw_probability - policy.threshold).abs() > boost.margin {
                confidence = confidence.max(boost.floor);
            }
        }

        Ok(Calibration {
            label,
            confidence: round_to(confidence, CONFIDENCE_DECIMALS),
        })
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
