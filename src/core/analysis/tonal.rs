// src/core/analysis/tonal.rs
//
// Pitch-class energy (chroma), harmonic/percussive separation and the
// tonal centroid (tonnetz) of the harmonic component.

use std::f64::consts::PI;

use crate::core::dsp::filters::{median_filter, soft_mask};
use crate::core::dsp::stats::column_mean_std;
use crate::core::dsp::Spectrogram;
use crate::core::schema::{NUM_CHROMA, NUM_TONNETZ};

/// Reference frequency of octave zero for A440 tuning (A0 = 27.5 Hz)
const A0_HZ: f64 = 27.5;

#[derive(Debug, Clone)]
pub struct TonalParams {
    /// Octave the chroma weighting is centered on
    pub center_octave: f64,
    /// Width of the octave weighting in octaves
    pub octave_width: f64,
    /// Median filter length for harmonic/percussive separation
    pub hpss_kernel: usize,
}

impl Default for TonalParams {
    fn default() -> Self {
        Self {
            center_octave: 5.0,
            octave_width: 2.0,
            hpss_kernel: 31,
        }
    }
}

/// Gaussian-weighted mapping from FFT bins to 12 pitch classes, C first
#[derive(Debug, Clone)]
pub struct ChromaFilterBank {
    weights: Vec<Vec<f64>>,
}

impl ChromaFilterBank {
    pub fn new(sample_rate: u32, fft_size: usize, params: &TonalParams) -> Self {
        let n = NUM_CHROMA as f64;

        // Bin 0 has no defined octave; place it 1.5 octaves below bin 1
        let mut frq_bins: Vec<f64> = (1..fft_size)
            .map(|k| {
                let hz = k as f64 * sample_rate as f64 / fft_size as f64;
                n * (hz / A0_HZ).log2()
            })
            .collect();
        frq_bins.insert(0, frq_bins[0] - 1.5 * n);

        let mut bin_widths: Vec<f64> = frq_bins.windows(2).map(|w| (w[1] - w[0]).max(1.0)).collect();
        bin_widths.push(1.0);

        let half = (n / 2.0).round();
        let mut weights = vec![vec![0.0; fft_size]; NUM_CHROMA];
        for k in 0..fft_size {
            for (c, row) in weights.iter_mut().enumerate() {
                let d = (frq_bins[k] - c as f64 + half + 10.0 * n).rem_euclid(n) - half;
                row[k] = (-0.5 * (2.0 * d / bin_widths[k]).powi(2)).exp();
            }

            let norm = weights.iter().map(|row| row[k] * row[k]).sum::<f64>().sqrt();
            let octave_weight =
                (-0.5 * ((frq_bins[k] / n - params.center_octave) / params.octave_width).powi(2)).exp();
            for row in weights.iter_mut() {
                if norm > f64::MIN_POSITIVE {
                    row[k] /= norm;
                }
                row[k] *= octave_weight;
            }
        }

        // Rotate so that pitch class 0 is C rather than A
        weights.rotate_left(3);
        for row in weights.iter_mut() {
            row.truncate(fft_size / 2 + 1);
        }

        Self { weights }
    }

    /// Chroma of each frame of a power spectrogram, max-normalized
    pub fn apply(&self, power: &Spectrogram) -> Vec<Vec<f64>> {
        power
            .frames()
            .iter()
            .map(|frame| {
                let mut chroma: Vec<f64> = self
                    .weights
                    .iter()
                    .map(|row| row.iter().zip(frame).map(|(w, p)| w * p).sum())
                    .collect();
                let peak = chroma.iter().map(|c| c.abs()).fold(0.0f64, f64::max);
                if peak > f64::MIN_POSITIVE {
                    chroma.iter_mut().for_each(|c| *c /= peak);
                }
                chroma
            })
            .collect()
    }
}

/// Mean chroma energy per pitch class
pub fn chroma_means(chroma: &[Vec<f64>]) -> Vec<f64> {
    if chroma.is_empty() {
        return vec![0.0; NUM_CHROMA];
    }
    column_mean_std(chroma, NUM_CHROMA).0
}

/// Harmonic part of a magnitude spectrogram via median-filter soft masking.
///
/// Harmonic energy is smooth along time, percussive energy along frequency.
pub fn harmonic_spectrogram(magnitude: &Spectrogram, kernel: usize) -> Result<Spectrogram, String> {
    if magnitude.num_frames() == 0 {
        return Err("empty spectrogram".to_string());
    }
    if magnitude.has_non_finite() {
        return Err("non-finite magnitude".to_string());
    }

    let frames = magnitude.frames();
    let num_bins = magnitude.num_bins();

    // Median along time for each bin
    let mut harmonic = vec![vec![0.0; num_bins]; frames.len()];
    for k in 0..num_bins {
        let track: Vec<f64> = frames.iter().map(|f| f[k]).collect();
        for (t, v) in median_filter(&track, kernel).into_iter().enumerate() {
            harmonic[t][k] = v;
        }
    }

    let masked = frames
        .iter()
        .zip(&harmonic)
        .map(|(frame, h_frame)| {
            let percussive = median_filter(frame, kernel);
            frame
                .iter()
                .zip(h_frame)
                .zip(&percussive)
                .map(|((&s, &h), &p)| s * soft_mask(h, p, 2))
                .collect()
        })
        .collect();

    let result = Spectrogram::new(masked, magnitude.fft_size());
    if result.has_non_finite() {
        return Err("non-finite harmonic mask".to_string());
    }
    Ok(result)
}

/// 6-D tonal centroid projection (fifths, minor thirds, major thirds)
fn tonnetz_basis() -> Vec<Vec<f64>> {
    let scale = [7.0 / 6.0, 7.0 / 6.0, 1.5, 1.5, 2.0 / 3.0, 2.0 / 3.0];
    let radius = [1.0, 1.0, 1.0, 1.0, 0.5, 0.5];

    (0..NUM_TONNETZ)
        .map(|d| {
            (0..NUM_CHROMA)
                .map(|c| {
                    let mut v = scale[d] * c as f64;
                    if d % 2 == 0 {
                        v -= 0.5;
                    }
                    radius[d] * (PI * v).cos()
                })
                .collect()
        })
        .collect()
}

/// Mean tonnetz over frames of a (max-normalized) chroma sequence
pub fn tonnetz_means(chroma: &[Vec<f64>]) -> Vec<f64> {
    if chroma.is_empty() {
        return vec![0.0; NUM_TONNETZ];
    }
    let basis = tonnetz_basis();

    let frames: Vec<Vec<f64>> = chroma
        .iter()
        .map(|frame| {
            let total: f64 = frame.iter().map(|c| c.abs()).sum();
            let norm = if total > f64::MIN_POSITIVE { total } else { 1.0 };
            basis
                .iter()
                .map(|row| row.iter().zip(frame).map(|(b, c)| b * c / norm).sum())
                .collect()
        })
        .collect();

    column_mean_std(&frames, NUM_TONNETZ).0
}
