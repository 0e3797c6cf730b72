//! Core decoding, DSP and feature extraction

pub mod analysis;
pub mod decoder;
pub mod dsp;
pub mod extractor;
pub mod schema;

pub use decoder::{decode_bytes, decode_file, AudioData, Waveform, TARGET_SAMPLE_RATE};
pub use extractor::{ExtractorConfig, FeatureExtractor};
pub use schema::{FeatureSchema, FeatureSlot, FeatureVector, SchemaVersion};
