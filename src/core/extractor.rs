// src/core/extractor.rs
//
// Waveform -> FeatureVector. Validates the input, computes every statistic
// group once over the full signal and writes the values in schema order.

use log::{debug, warn};
use std::time::Instant;

use super::analysis::{
    analyze_mfcc, analyze_pitch, analyze_spectral_shape, analyze_temporal, chroma_means,
    harmonic_spectrogram, onset_strength, spectral_smoothness, tonnetz_means, ChromaFilterBank,
    MfccAnalysis, MfccParams, PitchAnalysis, PitchParams, SpectralParams, SpectralShape,
    TemporalAnalysis, TemporalParams, TonalParams,
};
use super::decoder::{Waveform, TARGET_SAMPLE_RATE};
use super::dsp::mel::power_to_db;
use super::dsp::{fft_frequencies, MelFilterBank, StftProcessor};
use super::schema::{
    FeatureSchema, FeatureSlot, FeatureVector, SchemaVersion, NUM_CONTRAST_BANDS, NUM_MFCC,
    NUM_TONNETZ,
};
use crate::error::{DetectionError, Result};

/// Extraction configuration
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    pub schema: SchemaVersion,
    pub sample_rate: u32,
    pub min_duration_secs: f64,
    pub fft_size: usize,
    pub hop_size: usize,
    pub num_mels: usize,
    pub mfcc: MfccParams,
    pub spectral: SpectralParams,
    pub pitch: PitchParams,
    pub temporal: TemporalParams,
    pub tonal: TonalParams,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            schema: SchemaVersion::Basic,
            sample_rate: TARGET_SAMPLE_RATE,
            min_duration_secs: 0.5,
            fft_size: 2048,
            hop_size: 512,
            num_mels: 128,
            mfcc: MfccParams::default(),
            spectral: SpectralParams::default(),
            pitch: PitchParams::default(),
            temporal: TemporalParams::default(),
            tonal: TonalParams::default(),
        }
    }
}

impl ExtractorConfig {
    pub fn for_schema(schema: SchemaVersion) -> Self {
        Self {
            schema,
            ..Default::default()
        }
    }

    /// Reject sizes and parameters the transforms cannot run with
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(DetectionError::InvalidConfig(msg));

        if self.sample_rate == 0 {
            return invalid("sample rate must be positive".into());
        }
        if !(self.min_duration_secs.is_finite() && self.min_duration_secs > 0.0) {
            return invalid(format!(
                "minimum duration {} must be a positive number of seconds",
                self.min_duration_secs
            ));
        }
        if self.fft_size < 16 {
            return invalid(format!("fft size {} must be at least 16", self.fft_size));
        }
        if self.hop_size == 0 || self.hop_size > self.fft_size {
            return invalid(format!(
                "hop size {} must lie in [1, fft size {}]",
                self.hop_size, self.fft_size
            ));
        }
        if self.mfcc.num_coefficients != NUM_MFCC {
            return invalid(format!(
                "{} cepstral coefficients configured, the schema holds {}",
                self.mfcc.num_coefficients, NUM_MFCC
            ));
        }
        if self.num_mels < self.mfcc.num_coefficients {
            return invalid(format!(
                "{} mel bands cannot yield {} cepstral coefficients",
                self.num_mels, self.mfcc.num_coefficients
            ));
        }
        if self.mfcc.delta_width < 3 || self.mfcc.delta_width % 2 == 0 {
            return invalid(format!("delta width {} must be odd and >= 3", self.mfcc.delta_width));
        }
        if !(self.spectral.rolloff_percent > 0.0 && self.spectral.rolloff_percent < 1.0) {
            return invalid(format!(
                "rolloff percent {} must lie in (0, 1)",
                self.spectral.rolloff_percent
            ));
        }
        if self.spectral.contrast_bands + 1 != NUM_CONTRAST_BANDS {
            return invalid(format!(
                "{} contrast bands configured, the schema holds {}",
                self.spectral.contrast_bands + 1,
                NUM_CONTRAST_BANDS
            ));
        }
        if !(self.spectral.contrast_fmin > 0.0) {
            return invalid(format!("contrast fmin {} must be positive", self.spectral.contrast_fmin));
        }
        if !(self.spectral.contrast_quantile > 0.0 && self.spectral.contrast_quantile < 1.0) {
            return invalid(format!(
                "contrast quantile {} must lie in (0, 1)",
                self.spectral.contrast_quantile
            ));
        }
        if !(self.pitch.fmin > 0.0 && self.pitch.fmin < self.pitch.fmax) {
            return invalid(format!(
                "pitch range [{}, {}] must satisfy 0 < fmin < fmax",
                self.pitch.fmin, self.pitch.fmax
            ));
        }
        if !(0.0..=1.0).contains(&self.pitch.threshold) {
            return invalid(format!("pitch threshold {} must lie in [0, 1]", self.pitch.threshold));
        }
        if self.temporal.frame_length == 0 || self.temporal.hop_length == 0 {
            return invalid("zero-crossing and RMS frames must be non-empty".into());
        }
        if self.tonal.hpss_kernel % 2 == 0 {
            return invalid(format!("HPSS kernel {} must be odd", self.tonal.hpss_kernel));
        }
        Ok(())
    }
}

/// Every statistic group computed for one waveform
#[derive(Debug, Clone, Default)]
struct FeatureSet {
    mfcc: MfccAnalysis,
    spectral: SpectralShape,
    pitch: PitchAnalysis,
    temporal: TemporalAnalysis,
    smoothness: f64,
    chroma: Vec<f64>,
    tonnetz: Vec<f64>,
}

impl FeatureSet {
    fn value(&self, slot: FeatureSlot) -> Option<f64> {
        let v = match slot {
            FeatureSlot::MfccMean(i) => *self.mfcc.mean.get(i)?,
            FeatureSlot::MfccStd(i) => *self.mfcc.std.get(i)?,
            FeatureSlot::MfccDeltaMean(i) => *self.mfcc.delta_mean.get(i)?,
            FeatureSlot::MfccDeltaStd(i) => *self.mfcc.delta_std.get(i)?,
            FeatureSlot::CentroidMean => self.spectral.centroid_mean,
            FeatureSlot::CentroidStd => self.spectral.centroid_std,
            FeatureSlot::RolloffMean => self.spectral.rolloff_mean,
            FeatureSlot::RolloffStd => self.spectral.rolloff_std,
            FeatureSlot::BandwidthMean => self.spectral.bandwidth_mean,
            FeatureSlot::BandwidthStd => self.spectral.bandwidth_std,
            FeatureSlot::Contrast(i) => *self.spectral.contrast.get(i)?,
            FeatureSlot::FlatnessMean => self.spectral.flatness_mean,
            FeatureSlot::Chroma(i) => *self.chroma.get(i)?,
            FeatureSlot::PitchMean => self.pitch.mean,
            FeatureSlot::PitchStd => self.pitch.std,
            FeatureSlot::ZcrMean => self.temporal.zcr_mean,
            FeatureSlot::ZcrVar => self.temporal.zcr_var,
            FeatureSlot::RmsMean => self.temporal.rms_mean,
            FeatureSlot::RmsVar => self.temporal.rms_var,
            FeatureSlot::SilenceRatio => self.temporal.silence_ratio,
            FeatureSlot::SpectralSmoothness => self.smoothness,
            FeatureSlot::Tonnetz(i) => *self.tonnetz.get(i)?,
        };
        Some(v)
    }
}

/// Deterministic feature extractor for one schema. Holds only immutable
/// precomputed tables, so one instance can serve many threads.
pub struct FeatureExtractor {
    config: ExtractorConfig,
    schema: FeatureSchema,
    stft: StftProcessor,
    mel_bank: MelFilterBank,
    chroma_bank: Option<ChromaFilterBank>,
    freqs: Vec<f64>,
}

impl FeatureExtractor {
    pub fn new(config: ExtractorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    /// Default configuration for `version`
    pub fn with_schema(version: SchemaVersion) -> Self {
        Self::build(ExtractorConfig::for_schema(version))
    }

    fn build(config: ExtractorConfig) -> Self {
        let schema = FeatureSchema::new(config.schema);
        let stft = StftProcessor::new(config.fft_size, config.hop_size);
        let mel_bank = MelFilterBank::new(
            config.sample_rate,
            config.fft_size,
            config.num_mels,
            0.0,
            config.sample_rate as f64 / 2.0,
        );
        let chroma_bank = match config.schema {
            SchemaVersion::Extended => Some(ChromaFilterBank::new(
                config.sample_rate,
                config.fft_size,
                &config.tonal,
            )),
            SchemaVersion::Basic => None,
        };
        let freqs = fft_frequencies(config.sample_rate, config.fft_size);

        Self {
            config,
            schema,
            stft,
            mel_bank,
            chroma_bank,
            freqs,
        }
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Minimum-duration and format checks, in order
    pub fn validate(&self, waveform: &Waveform) -> Result<()> {
        if waveform.is_empty() {
            return Err(DetectionError::EmptyAudio);
        }
        if waveform.sample_rate != self.config.sample_rate {
            return Err(DetectionError::UnsupportedAudio(format!(
                "expected {} Hz audio, got {} Hz",
                self.config.sample_rate, waveform.sample_rate
            )));
        }
        let duration_secs = waveform.duration_secs();
        if duration_secs < self.config.min_duration_secs {
            return Err(DetectionError::AudioTooShort {
                duration_secs,
                min_secs: self.config.min_duration_secs,
            });
        }
        Ok(())
    }

    /// Extract the full feature vector. Never returns a partial vector.
    pub fn extract(&self, waveform: &Waveform) -> Result<FeatureVector> {
        self.validate(waveform)?;
        let started = Instant::now();

        if let Some(pos) = waveform.samples.iter().position(|s| !s.is_finite()) {
            return Err(DetectionError::FeatureExtractionFailed(format!(
                "non-finite sample at index {}",
                pos
            )));
        }
        let samples: Vec<f64> = waveform.samples.iter().map(|&s| s as f64).collect();

        let set = self.compute(&samples);

        let values = self
            .schema
            .slots()
            .iter()
            .map(|&slot| {
                let v = set.value(slot).ok_or_else(|| {
                    DetectionError::FeatureExtractionFailed(format!("{} was not computed", slot))
                })?;
                if !v.is_finite() {
                    return Err(DetectionError::FeatureExtractionFailed(format!(
                        "{} is not finite ({})",
                        slot, v
                    )));
                }
                Ok(v)
            })
            .collect::<Result<Vec<f64>>>()?;

        debug!(
            "extracted {} {} features from {:.2}s in {:?}",
            values.len(),
            self.schema.version(),
            waveform.duration_secs(),
            started.elapsed()
        );

        FeatureVector::new(&self.schema, values)
    }

    fn compute(&self, samples: &[f64]) -> FeatureSet {
        let magnitude = self.stft.magnitude(samples);
        let power = magnitude.power();

        let mel_db = power_to_db(&self.mel_bank.apply(&power), 1e-10, 80.0);
        let mfcc = analyze_mfcc(&mel_db, &self.config.mfcc);
        let spectral = analyze_spectral_shape(&magnitude, &power, &self.freqs, &self.config.spectral);
        let pitch = analyze_pitch(&magnitude, self.config.sample_rate, &self.config.pitch);
        let temporal = analyze_temporal(samples, &self.config.temporal);

        let onset_env = onset_strength(&mel_db, self.config.fft_size, self.config.hop_size);
        let smoothness = spectral_smoothness(&onset_env);

        let (chroma, tonnetz) = match &self.chroma_bank {
            Some(bank) => {
                let chroma = chroma_means(&bank.apply(&power));
                let tonnetz = match harmonic_spectrogram(&magnitude, self.config.tonal.hpss_kernel) {
                    Ok(harmonic) => tonnetz_means(&bank.apply(&harmonic.power())),
                    Err(e) => {
                        warn!("harmonic separation failed ({}), using zero tonnetz", e);
                        vec![0.0; NUM_TONNETZ]
                    }
                };
                (chroma, tonnetz)
            }
            None => (Vec::new(), Vec::new()),
        };

        FeatureSet {
            mfcc,
            spectral,
            pitch,
            temporal,
            smoothness,
            chroma,
            tonnetz,
        }
    }
}
