#![allow(dead_code)]

use std::f32::consts::PI;
use std::path::{Path, PathBuf};
use std::process::Command;

use voicecheckr::core::FeatureVector;
use voicecheckr::detection::{LogisticModel, ModelArtifact, ModelKind};
use voicecheckr::{Classifier, FeatureSchema, SchemaVersion, Waveform};

pub const SR: u32 = 22_050;

pub fn get_binary_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_voicecheckr"))
}

pub fn run_voicecheckr<P: AsRef<std::ffi::OsStr>>(file_path: P) -> Command {
    let mut cmd = Command::new(get_binary_path());
    cmd.arg(file_path);
    cmd.env_remove("VOICECHECKR_MODEL");
    cmd.env_remove("VOICECHECKR_THRESHOLD");
    cmd
}

pub fn sine(freq: f32, secs: f64, amplitude: f32) -> Waveform {
    let n = (secs * SR as f64).round() as usize;
    let samples = (0..n)
        .map(|i| amplitude * (2.0 * PI * freq * i as f32 / SR as f32).sin())
        .collect();
    Waveform::new(samples, SR)
}

pub fn silence(secs: f64) -> Waveform {
    Waveform::new(vec![0.0; (secs * SR as f64).round() as usize], SR)
}

/// Write interleaved 16-bit PCM at any rate and channel count
pub fn write_wav(path: &Path, samples: &[f32], sample_rate: u32, channels: u16) {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).expect("create wav");
    for &s in samples {
        writer
            .write_sample((s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)
            .expect("write sample");
    }
    writer.finalize().expect("finalize wav");
}

/// Logistic model with a single non-zero weight
pub fn single_weight_model(schema: &FeatureSchema, feature: usize, weight: f64, intercept: f64) -> ModelArtifact {
    let n = schema.len();
    let mut weights = vec![0.0; n];
    weights[feature] = weight;
    ModelArtifact::new(
        schema,
        ModelKind::Logistic(LogisticModel {
            mean: vec![0.0; n],
            scale: vec![1.0; n],
            weights,
            intercept,
        }),
    )
}

/// Always returns the same probability
pub struct FixedScore {
    pub probability: f64,
    pub schema: SchemaVersion,
}

impl Classifier for FixedScore {
    fn name(&self) -> &str {
        "fixed"
    }

    fn schema(&self) -> SchemaVersion {
        self.schema
    }

    fn score_ai(&self, _: &FeatureVector) -> voicecheckr::Result<f64> {
        Ok(self.probability)
    }
}
