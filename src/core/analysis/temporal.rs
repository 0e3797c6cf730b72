// src/core/analysis/temporal.rs
//
// Frame-level irregularity proxies: zero-crossing rate (jitter), RMS energy
// (shimmer) and the share of near-silent frames (breathing pauses).

use crate::core::dsp::stats::{amplitude_to_db_peak_ref, frame_rms, mean, variance, zero_crossing_rates};

#[derive(Debug, Clone)]
pub struct TemporalParams {
    pub frame_length: usize,
    pub hop_length: usize,
    /// Frames quieter than this, relative to the loudest frame, count as silence
    pub silence_threshold_db: f64,
}

impl Default for TemporalParams {
    fn default() -> Self {
        Self {
            frame_length: 2048,
            hop_length: 512,
            silence_threshold_db: -40.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TemporalAnalysis {
    pub zcr_mean: f64,
    pub zcr_var: f64,
    pub rms_mean: f64,
    pub rms_var: f64,
    pub silence_ratio: f64,
}

pub fn analyze_temporal(samples: &[f64], params: &TemporalParams) -> TemporalAnalysis {
    let zcr = zero_crossing_rates(samples, params.frame_length, params.hop_length);
    let rms = frame_rms(samples, params.frame_length, params.hop_length);

    let rms_db = amplitude_to_db_peak_ref(&rms, 1e-5, 80.0);
    let silent = rms_db.iter().filter(|&&db| db < params.silence_threshold_db).count();
    let silence_ratio = if rms_db.is_empty() {
        0.0
    } else {
        silent as f64 / rms_db.len() as f64
    };

    TemporalAnalysis {
        zcr_mean: mean(&zcr),
        zcr_var: variance(&zcr),
        rms_mean: mean(&rms),
        rms_var: variance(&rms),
        silence_ratio,
    }
}
