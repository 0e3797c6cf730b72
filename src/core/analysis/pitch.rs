// src/core/analysis/pitch.rs
//
// Fundamental frequency statistics from parabolic-interpolated spectral peaks

use crate::core::dsp::stats::{mean, median, std_dev};
use crate::core::dsp::{fft_frequencies, Spectrogram};

#[derive(Debug, Clone)]
pub struct PitchParams {
    pub fmin: f64,
    pub fmax: f64,
    /// Peaks below this fraction of the frame maximum are ignored
    pub threshold: f64,
}

impl Default for PitchParams {
    fn default() -> Self {
        Self {
            fmin: 150.0,
            fmax: 4000.0,
            threshold: 0.1,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PitchAnalysis {
    pub mean: f64,
    pub std: f64,
    /// Candidates that survived the magnitude and positivity filters
    pub voiced_candidates: usize,
}

/// Per-frame (pitch, magnitude) candidates at spectral local maxima
pub fn track_pitches(
    magnitude: &Spectrogram,
    sample_rate: u32,
    params: &PitchParams,
) -> Vec<Vec<(f64, f64)>> {
    let freqs = fft_frequencies(sample_rate, magnitude.fft_size());
    let fmin = params.fmin.max(0.0);
    let fmax = params.fmax.min(sample_rate as f64 / 2.0);
    let bin_hz = sample_rate as f64 / magnitude.fft_size() as f64;

    magnitude
        .frames()
        .iter()
        .map(|s| {
            let n = s.len();
            let peak = s.iter().copied().fold(0.0f64, f64::max);
            let ref_value = params.threshold * peak;
            let gated: Vec<f64> = s.iter().map(|&m| if m > ref_value { m } else { 0.0 }).collect();

            let mut candidates = vec![(0.0, 0.0); n];
            for i in 1..n.saturating_sub(1) {
                if !(freqs[i] >= fmin && freqs[i] < fmax) {
                    continue;
                }
                let is_peak = gated[i] > gated[i - 1] && gated[i] >= gated[i + 1];
                if !is_peak {
                    continue;
                }

                let avg = 0.5 * (s[i + 1] - s[i - 1]);
                let curvature = 2.0 * s[i] - s[i + 1] - s[i - 1];
                let denom = if curvature.abs() < f64::MIN_POSITIVE { curvature + 1.0 } else { curvature };
                let shift = avg / denom;
                let dskew = 0.5 * avg * shift;

                candidates[i] = ((i as f64 + shift) * bin_hz, s[i] + dskew);
            }
            candidates
        })
        .collect()
}

/// Mean and standard deviation of pitch candidates whose magnitude exceeds
/// their frame's median magnitude. Yields 0/0 when nothing survives.
pub fn analyze_pitch(magnitude: &Spectrogram, sample_rate: u32, params: &PitchParams) -> PitchAnalysis {
    let mut pitches = Vec::new();

    for frame in track_pitches(magnitude, sample_rate, params) {
        let mut mags: Vec<f64> = frame.iter().map(|&(_, m)| m).collect();
        let frame_median = median(&mut mags);

        pitches.extend(
            frame
                .iter()
                .filter(|&&(p, m)| m > frame_median && p > 0.0)
                .map(|&(p, _)| p),
        );
    }

    if pitches.is_empty() {
        return PitchAnalysis::default();
    }

    PitchAnalysis {
        mean: mean(&pitches),
        std: std_dev(&pitches),
        voiced_candidates: pitches.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dsp::StftProcessor;
    use std::f64::consts::PI;

    fn analyze(samples: &[f64]) -> PitchAnalysis {
        let stft = StftProcessor::new(2048, 512);
        analyze_pitch(&stft.magnitude(samples), 22050, &PitchParams::default())
    }

    #[test]
    fn test_steady_tone_has_low_pitch_spread() {
        let samples: Vec<f64> = (0..22050 * 2)
            .map(|i| 0.5 * (2.0 * PI * 220.0 * i as f64 / 22050.0).sin())
            .collect();
        let pitch = analyze(&samples);

        assert!(pitch.voiced_candidates > 0);
        assert!((pitch.mean - 220.0).abs() < 15.0, "mean {}", pitch.mean);
        assert!(pitch.std < 10.0, "std {}", pitch.std);
    }

    #[test]
    fn test_silence_has_no_pitch() {
        let pitch = analyze(&vec![0.0; 22050]);
        assert_eq!(pitch.mean, 0.0);
        assert_eq!(pitch.std, 0.0);
        assert_eq!(pitch.voiced_candidates, 0);
    }
}
