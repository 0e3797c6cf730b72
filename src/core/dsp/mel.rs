//! Mel filter bank, decibel scaling and cepstral transform

use std::f64::consts::PI;

use super::{fft_frequencies, Spectrogram};

const F_SP: f64 = 200.0 / 3.0;
const MIN_LOG_HZ: f64 = 1000.0;
const MIN_LOG_MEL: f64 = MIN_LOG_HZ / F_SP;

fn log_step() -> f64 {
    6.4f64.ln() / 27.0
}

/// Hz to mel on the Slaney scale (linear below 1 kHz, logarithmic above)
pub fn hz_to_mel(hz: f64) -> f64 {
    if hz >= MIN_LOG_HZ {
        MIN_LOG_MEL + (hz / MIN_LOG_HZ).ln() / log_step()
    } else {
        hz / F_SP
    }
}

pub fn mel_to_hz(mel: f64) -> f64 {
    if mel >= MIN_LOG_MEL {
        MIN_LOG_HZ * (log_step() * (mel - MIN_LOG_MEL)).exp()
    } else {
        F_SP * mel
    }
}

/// Triangular filter with its non-zero bin range
#[derive(Debug, Clone)]
struct MelFilter {
    start: usize,
    weights: Vec<f64>,
}

/// Slaney-normalized triangular mel filter bank
#[derive(Debug, Clone)]
pub struct MelFilterBank {
    filters: Vec<MelFilter>,
    num_bins: usize,
}

impl MelFilterBank {
    pub fn new(sample_rate: u32, fft_size: usize, num_mels: usize, fmin: f64, fmax: f64) -> Self {
        let fft_freqs = fft_frequencies(sample_rate, fft_size);
        let num_bins = fft_freqs.len();

        let min_mel = hz_to_mel(fmin);
        let max_mel = hz_to_mel(fmax);
        let mel_f: Vec<f64> = (0..num_mels + 2)
            .map(|i| mel_to_hz(min_mel + (max_mel - min_mel) * i as f64 / (num_mels + 1) as f64))
            .collect();

        let filters = (0..num_mels)
            .map(|m| {
                let (lo, center, hi) = (mel_f[m], mel_f[m + 1], mel_f[m + 2]);
                let enorm = 2.0 / (hi - lo);
                let dense: Vec<f64> = fft_freqs
                    .iter()
                    .map(|&f| {
                        let lower = (f - lo) / (center - lo);
                        let upper = (hi - f) / (hi - center);
                        lower.min(upper).max(0.0) * enorm
                    })
                    .collect();

                let start = dense.iter().position(|&w| w > 0.0).unwrap_or(0);
                let end = dense.iter().rposition(|&w| w > 0.0).map_or(start, |e| e + 1);
                MelFilter {
                    start,
                    weights: dense[start..end].to_vec(),
                }
            })
            .collect();

        Self { filters, num_bins }
    }

    pub fn num_mels(&self) -> usize {
        self.filters.len()
    }

    /// Project each frame of a power spectrogram onto the mel bands
    pub fn apply(&self, power: &Spectrogram) -> Vec<Vec<f64>> {
        debug_assert_eq!(power.num_bins(), self.num_bins);
        power
            .frames()
            .iter()
            .map(|frame| {
                self.filters
                    .iter()
                    .map(|f| {
                        frame[f.start..f.start + f.weights.len()]
                            .iter()
                            .zip(&f.weights)
                            .map(|(p, w)| p * w)
                            .sum()
                    })
                    .collect()
            })
            .collect()
    }
}

/// Convert a power matrix to decibels (ref 1.0), flooring at `amin` and
/// clipping everything more than `top_db` below the global peak.
pub fn power_to_db(frames: &[Vec<f64>], amin: f64, top_db: f64) -> Vec<Vec<f64>> {
    let mut db: Vec<Vec<f64>> = frames
        .iter()
        .map(|f| f.iter().map(|&p| 10.0 * p.max(amin).log10()).collect())
        .collect();

    let peak = db.iter().flatten().copied().fold(f64::NEG_INFINITY, f64::max);
    if peak.is_finite() {
        let floor = peak - top_db;
        for v in db.iter_mut().flatten() {
            *v = v.max(floor);
        }
    }
    db
}

/// Orthonormal DCT-II keeping the first `num_coeffs` outputs
#[derive(Debug, Clone)]
pub struct Dct {
    basis: Vec<Vec<f64>>,
}

impl Dct {
    pub fn new(input_len: usize, num_coeffs: usize) -> Self {
        let n = input_len as f64;
        let basis = (0..num_coeffs)
            .map(|k| {
                let scale = if k == 0 { (1.0 / n).sqrt() } else { (2.0 / n).sqrt() };
                (0..input_len)
                    .map(|i| scale * (PI * k as f64 * (2 * i + 1) as f64 / (2.0 * n)).cos())
                    .collect()
            })
            .collect();
        Self { basis }
    }

    pub fn apply(&self, input: &[f64]) -> Vec<f64> {
        self.basis
            .iter()
            .map(|row| row.iter().zip(input).map(|(b, x)| b * x).sum())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mel_scale_roundtrip_points() {
        assert!((hz_to_mel(1000.0) - 15.0).abs() < 1e-9);
        assert!((mel_to_hz(15.0) - 1000.0).abs() < 1e-9);
        assert!((mel_to_hz(hz_to_mel(4000.0)) - 4000.0).abs() < 1e-6);
    }

    #[test]
    fn test_filter_bank_shape() {
        let bank = MelFilterBank::new(22050, 2048, 128, 0.0, 11025.0);
        assert_eq!(bank.num_mels(), 128);

        let flat = Spectrogram::new(vec![vec![1.0; 1025]], 2048);
        let mel = bank.apply(&flat);
        assert_eq!(mel.len(), 1);
        assert_eq!(mel[0].len(), 128);
        assert!(mel[0].iter().all(|&v| v >= 0.0));
    }

    #[test]
    fn test_power_to_db_top_clip() {
        let db = power_to_db(&[vec![1.0, 1e-12]], 1e-10, 80.0);
        assert!((db[0][0] - 0.0).abs() < 1e-9);
        assert!((db[0][1] + 80.0).abs() < 1e-9);
    }

    #[test]
    fn test_dct_constant_input() {
        let dct = Dct::new(8, 3);
        let out = dct.apply(&[1.0; 8]);
        assert!((out[0] - 8f64.sqrt()).abs() < 1e-9);
        assert!(out[1].abs() < 1e-9);
        assert!(out[2].abs() < 1e-9);
    }
}
