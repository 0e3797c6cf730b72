// src/testgen/mod.rs
//
// Deterministic synthetic voice-like signals for testing and demos.
//
// "Synthetic" signals keep pitch, level and spectrum perfectly steady with
// no pauses; "human-like" signals add vibrato, pitch drift, level jitter and
// breathing pauses. Both are written as WAV via hound.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::path::{Path, PathBuf};

use crate::core::{Waveform, TARGET_SAMPLE_RATE};
use crate::detection::Label;

/// Kinds of generated signals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalKind {
    /// Single steady sine
    SteadyTone,
    /// Steady harmonic stack with constant level and no pauses
    SyntheticVoice,
    /// Harmonic stack with vibrato, drift, shimmer and breath pauses
    HumanLike,
    /// Uniform white noise
    WhiteNoise,
    /// All zeros
    Silence,
}

impl SignalKind {
    pub fn all() -> Vec<Self> {
        vec![
            Self::SteadyTone,
            Self::SyntheticVoice,
            Self::HumanLike,
            Self::WhiteNoise,
            Self::Silence,
        ]
    }

    pub fn short_name(&self) -> &'static str {
        match self {
            SignalKind::SteadyTone => "steady_tone",
            SignalKind::SyntheticVoice => "synthetic_voice",
            SignalKind::HumanLike => "human_like",
            SignalKind::WhiteNoise => "white_noise",
            SignalKind::Silence => "silence",
        }
    }

    /// Which side the explanation cues of this signal point to, if any
    pub fn expected_label(&self) -> Option<Label> {
        match self {
            SignalKind::SteadyTone | SignalKind::SyntheticVoice => Some(Label::AiGenerated),
            SignalKind::HumanLike => Some(Label::Human),
            SignalKind::WhiteNoise | SignalKind::Silence => None,
        }
    }
}

impl std::fmt::Display for SignalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.short_name())
    }
}

#[derive(Debug, Clone)]
pub struct SignalConfig {
    pub kind: SignalKind,
    pub duration_secs: f64,
    pub sample_rate: u32,
    /// Base fundamental in Hz
    pub f0: f64,
    pub amplitude: f64,
    pub seed: u64,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            kind: SignalKind::SyntheticVoice,
            duration_secs: 3.0,
            sample_rate: TARGET_SAMPLE_RATE,
            f0: 180.0,
            amplitude: 0.5,
            seed: 0x5eed,
        }
    }
}

impl SignalConfig {
    pub fn new(kind: SignalKind, duration_secs: f64) -> Self {
        Self {
            kind,
            duration_secs,
            ..Default::default()
        }
    }
}

/// xorshift64* generator, so outputs do not depend on platform RNGs
struct NoiseSource(u64);

impl NoiseSource {
    fn new(seed: u64) -> Self {
        Self(seed.max(1))
    }

    fn next_u64(&mut self) -> u64 {
        self.0 ^= self.0 >> 12;
        self.0 ^= self.0 << 25;
        self.0 ^= self.0 >> 27;
        self.0.wrapping_mul(0x2545_f491_4f6c_dd1d)
    }

    /// Uniform in [-1, 1)
    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 52) as f64 - 1.0
    }
}

/// Partial amplitudes of the harmonic stack
const HARMONICS: [f64; 4] = [1.0, 0.5, 0.25, 0.125];

fn harmonic_sample(phase: f64) -> f64 {
    let norm: f64 = HARMONICS.iter().sum();
    HARMONICS
        .iter()
        .enumerate()
        .map(|(h, a)| a * (phase * (h + 1) as f64).sin())
        .sum::<f64>()
        / norm
}

/// Generate a mono waveform for `config`
pub fn generate_signal(config: &SignalConfig) -> Waveform {
    let sr = config.sample_rate as f64;
    let n = (config.duration_secs * sr).round() as usize;
    let mut noise = NoiseSource::new(config.seed);

    let samples: Vec<f64> = match config.kind {
        SignalKind::Silence => vec![0.0; n],
        SignalKind::WhiteNoise => (0..n).map(|_| config.amplitude * noise.next_f64()).collect(),
        SignalKind::SteadyTone => (0..n)
            .map(|i| config.amplitude * (2.0 * PI * config.f0 * i as f64 / sr).sin())
            .collect(),
        SignalKind::SyntheticVoice => (0..n)
            .map(|i| config.amplitude * harmonic_sample(2.0 * PI * config.f0 * i as f64 / sr))
            .collect(),
        SignalKind::HumanLike => human_like(config, n, &mut noise),
    };

    Waveform::new(samples.into_iter().map(|s| s as f32).collect(), config.sample_rate)
}

fn human_like(config: &SignalConfig, n: usize, noise: &mut NoiseSource) -> Vec<f64> {
    let sr = config.sample_rate as f64;
    // Phrases of ~0.7 s separated by ~0.25 s breaths
    let phrase = (0.7 * sr) as usize;
    let breath = (0.25 * sr) as usize;
    let cycle = phrase + breath;

    let mut phase = 0.0;
    let mut drift = 0.0;
    let mut level = 1.0;
    let mut out = Vec::with_capacity(n);

    for i in 0..n {
        let t = i as f64 / sr;
        if i % 256 == 0 {
            drift = (drift + 4.0 * noise.next_f64()).clamp(-40.0, 40.0);
            level = (1.0 + 0.3 * noise.next_f64()).max(0.2);
        }

        let f0 = config.f0 + 25.0 * (2.0 * PI * 5.0 * t).sin() + drift;
        phase += 2.0 * PI * f0 / sr;

        let sample = if i % cycle < phrase {
            level * harmonic_sample(phase) + 0.02 * noise.next_f64()
        } else {
            // Breath: faint broadband noise
            0.003 * noise.next_f64()
        };
        out.push(config.amplitude * sample);
    }
    out
}

/// Writes generated signals as 16-bit WAV files
pub struct TestFileGenerator {
    output_dir: PathBuf,
}

impl TestFileGenerator {
    pub fn new<P: AsRef<Path>>(output_dir: P) -> Result<Self> {
        let output_dir = output_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&output_dir)
            .with_context(|| format!("Failed to create {}", output_dir.display()))?;
        Ok(Self { output_dir })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Generate `config` and write it as `<name>.wav`
    pub fn generate(&self, name: &str, config: &SignalConfig) -> Result<PathBuf> {
        let path = self.output_dir.join(format!("{}.wav", name));
        write_wav(&path, &generate_signal(config))?;
        Ok(path)
    }

    /// One file per signal kind plus a manifest
    pub fn generate_suite(&self, duration_secs: f64) -> Result<TestManifest> {
        let mut cases = Vec::new();
        for kind in SignalKind::all() {
            let config = SignalConfig::new(kind, duration_secs);
            let path = self.generate(kind.short_name(), &config)?;
            cases.push(TestCase {
                filename: path
                    .file_name()
                    .map(|f| f.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                kind,
                sample_rate: config.sample_rate,
                duration_secs,
                expected_label: kind.expected_label(),
            });
        }

        let manifest = TestManifest { cases };
        manifest.save(self.output_dir.join("manifest.json"))?;
        Ok(manifest)
    }
}

/// Write a mono waveform as 16-bit PCM WAV
pub fn write_wav(path: &Path, waveform: &Waveform) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: waveform.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    for &s in &waveform.samples {
        writer.write_sample((s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)?;
    }
    writer.finalize().context("Failed to finalize WAV")?;
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCase {
    pub filename: String,
    pub kind: SignalKind,
    pub sample_rate: u32,
    pub duration_secs: f64,
    pub expected_label: Option<Label>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestManifest {
    pub cases: Vec<TestCase>,
}

impl TestManifest {
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let manifest: Self = serde_json::from_str(&json)?;
        Ok(manifest)
    }
}
