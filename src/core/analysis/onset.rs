// src/core/analysis/onset.rs
//
// Onset strength envelope and spectral smoothness

use crate::core::dsp::stats::mean_diff;

/// Spectral-flux onset envelope of a dB mel spectrogram.
///
/// Positive differences between consecutive frames are averaged over mel
/// bands. The envelope is delayed by `1 + fft_size / (2 * hop)` frames to
/// align with centered STFT frames, then cut to the input frame count.
pub fn onset_strength(mel_db: &[Vec<f64>], fft_size: usize, hop_size: usize) -> Vec<f64> {
    let num_frames = mel_db.len();
    let pad = 1 + fft_size / (2 * hop_size);

    let flux = mel_db.windows(2).map(|pair| {
        let (prev, curr) = (&pair[0], &pair[1]);
        let bands = curr.len().max(1) as f64;
        curr.iter().zip(prev).map(|(c, p)| (c - p).max(0.0)).sum::<f64>() / bands
    });

    std::iter::repeat(0.0)
        .take(pad)
        .chain(flux)
        .take(num_frames)
        .collect()
}

/// Mean first difference of the onset envelope. Near-zero values indicate
/// the over-regular frame-to-frame spectra typical of synthesis.
pub fn spectral_smoothness(onset_env: &[f64]) -> f64 {
    mean_diff(onset_env)
}
