// src/core/analysis/spectral.rs
//
// Spectral shape statistics: centroid, rolloff, bandwidth, flatness and
// octave-band contrast, each summarized across frames.

use crate::core::dsp::mel::power_to_db;
use crate::core::dsp::stats::{
    band_peak_valley, column_mean_std, contrast_bands, mean, spectral_bandwidth,
    spectral_centroid, spectral_flatness, spectral_rolloff, std_dev,
};
use crate::core::dsp::Spectrogram;

#[derive(Debug, Clone)]
pub struct SpectralParams {
    pub rolloff_percent: f64,
    pub flatness_amin: f64,
    pub contrast_fmin: f64,
    /// Number of octave bands above `contrast_fmin`; one extra band covers DC
    pub contrast_bands: usize,
    pub contrast_quantile: f64,
}

impl Default for SpectralParams {
    fn default() -> Self {
        Self {
            rolloff_percent: 0.85,
            flatness_amin: 1e-10,
            contrast_fmin: 200.0,
            contrast_bands: 6,
            contrast_quantile: 0.02,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SpectralShape {
    pub centroid_mean: f64,
    pub centroid_std: f64,
    pub rolloff_mean: f64,
    pub rolloff_std: f64,
    pub bandwidth_mean: f64,
    pub bandwidth_std: f64,
    pub flatness_mean: f64,
    /// Mean contrast per band in dB, `contrast_bands + 1` values
    pub contrast: Vec<f64>,
}

/// Analyze spectral shape of a magnitude spectrogram
pub fn analyze_spectral_shape(
    magnitude: &Spectrogram,
    power: &Spectrogram,
    freqs: &[f64],
    params: &SpectralParams,
) -> SpectralShape {
    let mut centroids = Vec::with_capacity(magnitude.num_frames());
    let mut rolloffs = Vec::with_capacity(magnitude.num_frames());
    let mut bandwidths = Vec::with_capacity(magnitude.num_frames());

    for frame in magnitude.frames() {
        let centroid = spectral_centroid(frame, freqs);
        centroids.push(centroid);
        rolloffs.push(spectral_rolloff(frame, freqs, params.rolloff_percent));
        bandwidths.push(spectral_bandwidth(frame, freqs, centroid));
    }

    let flatness: Vec<f64> = power
        .frames()
        .iter()
        .map(|frame| spectral_flatness(frame, params.flatness_amin))
        .collect();

    SpectralShape {
        centroid_mean: mean(&centroids),
        centroid_std: std_dev(&centroids),
        rolloff_mean: mean(&rolloffs),
        rolloff_std: std_dev(&rolloffs),
        bandwidth_mean: mean(&bandwidths),
        bandwidth_std: std_dev(&bandwidths),
        flatness_mean: mean(&flatness),
        contrast: spectral_contrast(magnitude, freqs, params),
    }
}

/// Mean peak-to-valley ratio (dB) per octave band
fn spectral_contrast(magnitude: &Spectrogram, freqs: &[f64], params: &SpectralParams) -> Vec<f64> {
    let bands = contrast_bands(
        freqs,
        params.contrast_fmin,
        params.contrast_bands,
        params.contrast_quantile,
    );
    let width = params.contrast_bands + 1;

    let (peaks, valleys): (Vec<Vec<f64>>, Vec<Vec<f64>>) = magnitude
        .frames()
        .iter()
        .map(|frame| {
            let mut peak = vec![0.0; width];
            let mut valley = vec![0.0; width];
            for (k, band) in bands.iter().enumerate().take(width) {
                let (p, v) = band_peak_valley(frame, band);
                peak[k] = p;
                valley[k] = v;
            }
            (peak, valley)
        })
        .unzip();

    let peak_db = power_to_db(&peaks, 1e-10, 80.0);
    let valley_db = power_to_db(&valleys, 1e-10, 80.0);

    let contrast: Vec<Vec<f64>> = peak_db
        .iter()
        .zip(&valley_db)
        .map(|(p, v)| p.iter().zip(v).map(|(a, b)| a - b).collect())
        .collect();

    column_mean_std(&contrast, width).0
}
