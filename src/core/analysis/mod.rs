//! Audio analysis algorithms
//!
//! Statistics summarizing a voice recording over its full length:
//! - MFCC mean/std and delta-MFCC (spectral envelope)
//! - Spectral shape (centroid, rolloff, bandwidth, flatness, contrast)
//! - Pitch tracking (prosody)
//! - Zero-crossing rate, RMS energy and silence ratio (temporal irregularity)
//! - Onset strength (spectral smoothness)
//! - Chroma and tonnetz (tonal content)

mod mfcc;
mod onset;
mod pitch;
mod spectral;
mod temporal;
mod tonal;

pub use mfcc::{analyze_mfcc, MfccAnalysis, MfccParams};
pub use onset::{onset_strength, spectral_smoothness};
pub use pitch::{analyze_pitch, track_pitches, PitchAnalysis, PitchParams};
pub use spectral::{analyze_spectral_shape, SpectralParams, SpectralShape};
pub use temporal::{analyze_temporal, TemporalAnalysis, TemporalParams};
pub use tonal::{
    chroma_means, harmonic_spectrogram, tonnetz_means, ChromaFilterBank, TonalParams,
};
