// src/detection/explanation.rs
//
// Rule-based justification of a verdict from a handful of named features.
// Only the rules for the predicted side are evaluated, so the explanation
// always agrees with the label.

use serde::{Deserialize, Serialize};

use crate::core::{FeatureSchema, FeatureSlot, FeatureVector, SchemaVersion};
use crate::error::{DetectionError, Result};

use super::result::Label;

const AI_FALLBACK: &str = "detected statistical anomalies in frequency distribution";
const HUMAN_FALLBACK: &str = "irregular pitch patterns and organic spectral variance";

/// Feature thresholds for the explanation rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplanationThresholds {
    /// Pitch std (Hz) below which pitch is called robotic
    pub ai_pitch_std: f64,
    /// Pitch std (Hz) above which pitch is called natural
    pub human_pitch_std: f64,
    pub ai_zcr_var: f64,
    pub human_zcr_var: f64,
    pub ai_silence_ratio: f64,
    pub human_silence_ratio: f64,
    /// Bounds on |spectral smoothness|
    pub ai_smoothness: f64,
    pub human_smoothness: f64,
    pub ai_flatness: f64,
    pub human_flatness: f64,
}

impl Default for ExplanationThresholds {
    fn default() -> Self {
        Self {
            ai_pitch_std: 10.0,
            human_pitch_std: 20.0,
            ai_zcr_var: 0.001,
            human_zcr_var: 0.003,
            ai_silence_ratio: 0.05,
            human_silence_ratio: 0.15,
            ai_smoothness: 0.5,
            human_smoothness: 1.0,
            ai_flatness: 0.005,
            human_flatness: 0.05,
        }
    }
}

/// Features the rules read
#[derive(Debug, Clone, Copy)]
enum Cue {
    PitchStd,
    ZcrVar,
    SilenceRatio,
    Smoothness,
    Flatness,
}

impl Cue {
    const ALL: [Cue; 5] = [
        Cue::PitchStd,
        Cue::ZcrVar,
        Cue::SilenceRatio,
        Cue::Smoothness,
        Cue::Flatness,
    ];

    fn slot(self) -> FeatureSlot {
        match self {
            Cue::PitchStd => FeatureSlot::PitchStd,
            Cue::ZcrVar => FeatureSlot::ZcrVar,
            Cue::SilenceRatio => FeatureSlot::SilenceRatio,
            Cue::Smoothness => FeatureSlot::SpectralSmoothness,
            Cue::Flatness => FeatureSlot::FlatnessMean,
        }
    }

    /// Phrase and predicate for this cue on the given side
    fn rule(self, side: Label, value: f64, t: &ExplanationThresholds) -> (&'static str, bool) {
        match (side, self) {
            (Label::AiGenerated, Cue::PitchStd) => ("robotic pitch consistency", value < t.ai_pitch_std),
            (Label::AiGenerated, Cue::ZcrVar) => ("synthetic vocal stability", value < t.ai_zcr_var),
            (Label::AiGenerated, Cue::SilenceRatio) => {
                ("absence of natural breathing", value < t.ai_silence_ratio)
            }
            (Label::AiGenerated, Cue::Smoothness) => {
                ("over-smoothed spectral transitions", value.abs() < t.ai_smoothness)
            }
            (Label::AiGenerated, Cue::Flatness) => ("uniform tonal spectrum", value < t.ai_flatness),
            (Label::Human, Cue::PitchStd) => ("natural pitch variation", value > t.human_pitch_std),
            (Label::Human, Cue::ZcrVar) => ("irregular vocal micro-timing", value > t.human_zcr_var),
            (Label::Human, Cue::SilenceRatio) => ("natural breathing pauses", value > t.human_silence_ratio),
            (Label::Human, Cue::Smoothness) => {
                ("organic spectral transitions", value.abs() > t.human_smoothness)
            }
            (Label::Human, Cue::Flatness) => {
                ("natural breath noise in the spectrum", value > t.human_flatness)
            }
        }
    }
}

/// Builds the reason string attached to every verdict
#[derive(Debug, Clone)]
pub struct ExplanationEngine {
    schema: SchemaVersion,
    schema_len: usize,
    positions: [usize; 5],
    thresholds: ExplanationThresholds,
}

impl ExplanationEngine {
    /// Resolve rule positions from `schema`. Fails if a rule's slot is absent.
    pub fn new(schema: &FeatureSchema, thresholds: ExplanationThresholds) -> Result<Self> {
        let mut positions = [0usize; 5];
        for (i, cue) in Cue::ALL.iter().enumerate() {
            positions[i] = schema.position(cue.slot()).ok_or_else(|| {
                DetectionError::SchemaMismatch(format!(
                    "{} schema has no {} slot",
                    schema.version(),
                    cue.slot()
                ))
            })?;
        }

        Ok(Self {
            schema: schema.version(),
            schema_len: schema.len(),
            positions,
            thresholds,
        })
    }

    /// Reasons that fired for the side chosen by `raw_probability`, or the
    /// generic fallback when none did
    pub fn reasons(&self, features: &FeatureVector, raw_probability: f64, threshold: f64) -> Result<Vec<&'static str>> {
        if features.schema() != self.schema || features.len() != self.schema_len {
            return Err(DetectionError::SchemaMismatch(format!(
                "explanation expects {} features ({}), got {} ({})",
                self.schema_len,
                self.schema,
                features.len(),
                features.schema()
            )));
        }

        let side = Label::from_probability(raw_probability, threshold);
        let values = features.values();

        let mut reasons: Vec<&'static str> = Cue::ALL
            .iter()
            .zip(self.positions)
            .filter_map(|(cue, pos)| {
                let (phrase, fired) = cue.rule(side, values[pos], &self.thresholds);
                fired.then_some(phrase)
            })
            .collect();

        if reasons.is_empty() {
            reasons.push(match side {
                Label::AiGenerated => AI_FALLBACK,
                Label::Human => HUMAN_FALLBACK,
            });
        }
        Ok(reasons)
    }

    pub fn explain(&self, features: &FeatureVector, raw_probability: f64, threshold: f64) -> Result<String> {
        let reasons = self.reasons(features, raw_probability, threshold)?;
        let side = Label::from_probability(raw_probability, threshold);
        let sentence = match side {
            Label::AiGenerated => "Classified as AI-generated speech",
            Label::Human => "Classified as human speech",
        };
        Ok(format!("{}. {} detected.", sentence, capitalize(&join_reasons(&reasons))))
    }
}

/// "a", "a, and b", "a, b, and c"
fn join_reasons(reasons: &[&str]) -> String {
    match reasons {
        [] => String::new(),
        [one] => one.to_string(),
        [init @ .., last] => format!("{}, and {}", init.join(", "), last),
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vector(schema: &FeatureSchema, set: &[(FeatureSlot, f64)]) -> FeatureVector {
        let mut values = vec![0.0; schema.len()];
        for &(slot, v) in set {
            values[schema.position(slot).unwrap()] = v;
        }
        FeatureVector::new(schema, values).unwrap()
    }

    fn engine(schema: &FeatureSchema) -> ExplanationEngine {
        ExplanationEngine::new(schema, ExplanationThresholds::default()).unwrap()
    }

    #[test]
    fn test_join_reasons() {
        assert_eq!(join_reasons(&["a"]), "a");
        assert_eq!(join_reasons(&["a", "b"]), "a, and b");
        assert_eq!(join_reasons(&["a", "b", "c"]), "a, b, and c");
    }

    #[test]
    fn test_synthetic_profile_explained() {
        let schema = FeatureSchema::new(SchemaVersion::Basic);
        let features = vector(
            &schema,
            &[
                (FeatureSlot::PitchStd, 2.0),
                (FeatureSlot::ZcrVar, 0.0001),
                (FeatureSlot::SilenceRatio, 0.0),
                (FeatureSlot::SpectralSmoothness, 1.2),
                (FeatureSlot::FlatnessMean, 0.02),
            ],
        );
        let text = engine(&schema).explain(&features, 0.82, 0.6).unwrap();
        assert_eq!(
            text,
            "Classified as AI-generated speech. Robotic pitch consistency, synthetic vocal \
             stability, and absence of natural breathing detected."
        );
    }

    #[test]
    fn test_two_human_cues_keep_serial_comma() {
        let schema = FeatureSchema::new(SchemaVersion::Basic);
        let features = vector(
            &schema,
            &[
                (FeatureSlot::PitchStd, 35.0),
                (FeatureSlot::ZcrVar, 0.002),
                (FeatureSlot::SilenceRatio, 0.3),
                (FeatureSlot::SpectralSmoothness, 0.7),
                (FeatureSlot::FlatnessMean, 0.01),
            ],
        );
        assert_eq!(
            engine(&schema).explain(&features, 0.2, 0.6).unwrap(),
            "Classified as human speech. Natural pitch variation, and natural breathing \
             pauses detected."
        );
    }

    #[test]
    fn test_fallbacks() {
        let schema = FeatureSchema::new(SchemaVersion::Basic);
        // Between the AI and human thresholds, so no rule fires on either side
        let features = vector(
            &schema,
            &[
                (FeatureSlot::PitchStd, 15.0),
                (FeatureSlot::ZcrVar, 0.002),
                (FeatureSlot::SilenceRatio, 0.1),
                (FeatureSlot::SpectralSmoothness, 0.7),
                (FeatureSlot::FlatnessMean, 0.01),
            ],
        );
        let e = engine(&schema);
        assert_eq!(e.reasons(&features, 0.9, 0.6).unwrap(), vec![AI_FALLBACK]);
        assert_eq!(
            e.explain(&features, 0.9, 0.6).unwrap(),
            "Classified as AI-generated speech. Detected statistical anomalies in frequency \
             distribution detected."
        );
        let human = e.explain(&features, 0.1, 0.6).unwrap();
        assert!(human.starts_with("Classified as human speech."));
        assert!(human.contains("Irregular pitch patterns and organic spectral variance"));
    }

    #[test]
    fn test_human_side_rules() {
        let schema = FeatureSchema::new(SchemaVersion::Extended);
        let features = vector(
            &schema,
            &[
                (FeatureSlot::PitchStd, 35.0),
                (FeatureSlot::ZcrVar, 0.004),
                (FeatureSlot::SilenceRatio, 0.2),
                (FeatureSlot::SpectralSmoothness, 0.1),
                (FeatureSlot::FlatnessMean, 0.01),
            ],
        );
        let reasons = engine(&schema).reasons(&features, 0.3, 0.6).unwrap();
        assert_eq!(
            reasons,
            vec![
                "natural pitch variation",
                "irregular vocal micro-timing",
                "natural breathing pauses"
            ]
        );
    }

    #[test]
    fn test_schema_mismatch_rejected() {
        let basic = FeatureSchema::new(SchemaVersion::Basic);
        let extended = FeatureSchema::new(SchemaVersion::Extended);
        let features = vector(&basic, &[]);
        assert!(matches!(
            engine(&extended).explain(&features, 0.9, 0.6),
            Err(DetectionError::SchemaMismatch(_))
        ));
    }
}
