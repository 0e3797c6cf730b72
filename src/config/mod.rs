//! Configuration module for VoiceCheckr

mod policy;

pub use policy::{Boost, CalibrationPolicy, ConfidenceBasis, PolicyBuilder, PolicyPreset};
