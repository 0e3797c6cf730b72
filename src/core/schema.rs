// src/core/schema.rs
//
// Versioned feature layouts. The extractor writes and the explanation
// engine reads feature values through slot names, never raw indices.

use std::collections::HashMap;
use std::fmt;
use serde::{Deserialize, Serialize};

use crate::error::{DetectionError, Result};

pub const NUM_MFCC: usize = 13;
pub const NUM_CONTRAST_BANDS: usize = 7;
pub const NUM_CHROMA: usize = 12;
pub const NUM_TONNETZ: usize = 6;

/// Known feature layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaVersion {
    /// MFCC mean/std plus scalar spectral, prosodic and temporal statistics (39 slots)
    Basic,
    /// Basic groups plus delta-MFCC, bandwidth, contrast, chroma and tonnetz (92 slots)
    Extended,
}

impl SchemaVersion {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "basic" | "v1" => Some(Self::Basic),
            "extended" | "v2" => Some(Self::Extended),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SchemaVersion::Basic => "basic",
            SchemaVersion::Extended => "extended",
        }
    }
}

impl Default for SchemaVersion {
    fn default() -> Self {
        Self::Basic
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A single named position in a feature vector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureSlot {
    MfccMean(usize),
    MfccStd(usize),
    MfccDeltaMean(usize),
    MfccDeltaStd(usize),
    CentroidMean,
    CentroidStd,
    RolloffMean,
    RolloffStd,
    BandwidthMean,
    BandwidthStd,
    Contrast(usize),
    FlatnessMean,
    Chroma(usize),
    PitchMean,
    PitchStd,
    ZcrMean,
    ZcrVar,
    RmsMean,
    RmsVar,
    SilenceRatio,
    SpectralSmoothness,
    Tonnetz(usize),
}

impl FeatureSlot {
    /// Stable snake_case name, used in model artifacts and feature dumps
    pub fn name(&self) -> String {
        match self {
            FeatureSlot::MfccMean(i) => format!("mfcc_mean_{}", i),
            FeatureSlot::MfccStd(i) => format!("mfcc_std_{}", i),
            FeatureSlot::MfccDeltaMean(i) => format!("mfcc_delta_mean_{}", i),
            FeatureSlot::MfccDeltaStd(i) => format!("mfcc_delta_std_{}", i),
            FeatureSlot::CentroidMean => "centroid_mean".to_string(),
            FeatureSlot::CentroidStd => "centroid_std".to_string(),
            FeatureSlot::RolloffMean => "rolloff_mean".to_string(),
            FeatureSlot::RolloffStd => "rolloff_std".to_string(),
            FeatureSlot::BandwidthMean => "bandwidth_mean".to_string(),
            FeatureSlot::BandwidthStd => "bandwidth_std".to_string(),
            FeatureSlot::Contrast(i) => format!("contrast_{}", i),
            FeatureSlot::FlatnessMean => "flatness_mean".to_string(),
            FeatureSlot::Chroma(i) => format!("chroma_{}", i),
            FeatureSlot::PitchMean => "pitch_mean".to_string(),
            FeatureSlot::PitchStd => "pitch_std".to_string(),
            FeatureSlot::ZcrMean => "zcr_mean".to_string(),
            FeatureSlot::ZcrVar => "zcr_var".to_string(),
            FeatureSlot::RmsMean => "rms_mean".to_string(),
            FeatureSlot::RmsVar => "rms_var".to_string(),
            FeatureSlot::SilenceRatio => "silence_ratio".to_string(),
            FeatureSlot::SpectralSmoothness => "spectral_smoothness".to_string(),
            FeatureSlot::Tonnetz(i) => format!("tonnetz_{}", i),
        }
    }
}

impl fmt::Display for FeatureSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Ordered slot layout with a name-to-position map built once
#[derive(Debug, Clone)]
pub struct FeatureSchema {
    version: SchemaVersion,
    slots: Vec<FeatureSlot>,
    positions: HashMap<FeatureSlot, usize>,
}

impl FeatureSchema {
    pub fn new(version: SchemaVersion) -> Self {
        let slots = match version {
            SchemaVersion::Basic => basic_layout(),
            SchemaVersion::Extended => extended_layout(),
        };
        let positions = slots
            .iter()
            .enumerate()
            .map(|(i, &slot)| (slot, i))
            .collect();

        Self { version, slots, positions }
    }

    pub fn version(&self) -> SchemaVersion {
        self.version
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slots(&self) -> &[FeatureSlot] {
        &self.slots
    }

    pub fn position(&self, slot: FeatureSlot) -> Option<usize> {
        self.positions.get(&slot).copied()
    }

    pub fn contains(&self, slot: FeatureSlot) -> bool {
        self.positions.contains_key(&slot)
    }

    pub fn names(&self) -> Vec<String> {
        self.slots.iter().map(|s| s.name()).collect()
    }

    /// MD5 over the ordered slot names. Two schemas with the same
    /// fingerprint index their vectors identically.
    pub fn fingerprint(&self) -> String {
        let joined = self.names().join(",");
        format!("{:x}", md5::compute(joined.as_bytes()))
    }

    /// Check a trained model's declared layout against this schema
    pub fn verify(&self, fingerprint: &str, feature_count: usize) -> Result<()> {
        if feature_count != self.len() {
            return Err(DetectionError::SchemaMismatch(format!(
                "model expects {} features, {} schema has {}",
                feature_count,
                self.version,
                self.len()
            )));
        }
        let expected = self.fingerprint();
        if !fingerprint.eq_ignore_ascii_case(&expected) {
            return Err(DetectionError::SchemaMismatch(format!(
                "model fingerprint {} does not match {} schema fingerprint {}",
                fingerprint, self.version, expected
            )));
        }
        Ok(())
    }
}

fn basic_layout() -> Vec<FeatureSlot> {
    let mut slots = Vec::with_capacity(39);
    slots.extend((0..NUM_MFCC).map(FeatureSlot::MfccMean));
    slots.extend((0..NUM_MFCC).map(FeatureSlot::MfccStd));
    slots.extend([
        FeatureSlot::CentroidMean,
        FeatureSlot::CentroidStd,
        FeatureSlot::RolloffMean,
        FeatureSlot::RolloffStd,
        FeatureSlot::FlatnessMean,
        FeatureSlot::PitchMean,
        FeatureSlot::PitchStd,
        FeatureSlot::ZcrMean,
        FeatureSlot::ZcrVar,
        FeatureSlot::RmsMean,
        FeatureSlot::RmsVar,
        FeatureSlot::SilenceRatio,
        FeatureSlot::SpectralSmoothness,
    ]);
    slots
}

fn extended_layout() -> Vec<FeatureSlot> {
    let mut slots = Vec::with_capacity(92);
    slots.extend((0..NUM_MFCC).map(FeatureSlot::MfccMean));
    slots.extend((0..NUM_MFCC).map(FeatureSlot::MfccStd));
    slots.extend((0..NUM_MFCC).map(FeatureSlot::MfccDeltaMean));
    slots.extend((0..NUM_MFCC).map(FeatureSlot::MfccDeltaStd));
    slots.extend([
        FeatureSlot::CentroidMean,
        FeatureSlot::CentroidStd,
        FeatureSlot::RolloffMean,
        FeatureSlot::RolloffStd,
        FeatureSlot::BandwidthMean,
        FeatureSlot::BandwidthStd,
    ]);
    slots.extend((0..NUM_CONTRAST_BANDS).map(FeatureSlot::Contrast));
    slots.push(FeatureSlot::FlatnessMean);
    slots.extend((0..NUM_CHROMA).map(FeatureSlot::Chroma));
    slots.extend([
        FeatureSlot::PitchMean,
        FeatureSlot::PitchStd,
        FeatureSlot::ZcrMean,
        FeatureSlot::ZcrVar,
        FeatureSlot::RmsMean,
        FeatureSlot::RmsVar,
        FeatureSlot::SilenceRatio,
        FeatureSlot::SpectralSmoothness,
    ]);
    slots.extend((0..NUM_TONNETZ).map(FeatureSlot::Tonnetz));
    slots
}

/// Fixed-length feature values laid out by a [`FeatureSchema`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    schema: SchemaVersion,
    values: Vec<f64>,
}

impl FeatureVector {
    /// Wrap values produced for `schema`; the length must match exactly.
    pub fn new(schema: &FeatureSchema, values: Vec<f64>) -> Result<Self> {
        if values.len() != schema.len() {
            return Err(DetectionError::SchemaMismatch(format!(
                "{} values supplied for {} schema of length {}",
                values.len(),
                schema.version(),
                schema.len()
            )));
        }
        Ok(Self { schema: schema.version(), values })
    }

    pub fn schema(&self) -> SchemaVersion {
        self.schema
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Read a slot by name. Returns `None` when the slot is not part of
    /// the layout this vector was built with.
    pub fn get(&self, schema: &FeatureSchema, slot: FeatureSlot) -> Option<f64> {
        if schema.version() != self.schema {
            return None;
        }
        schema.position(slot).map(|i| self.values[i])
    }

    /// (name, value) pairs in schema order
    pub fn named(&self, schema: &FeatureSchema) -> Vec<(String, f64)> {
        schema.names().into_iter().zip(self.values.iter().copied()).collect()
    }
}
