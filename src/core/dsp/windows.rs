//! Window function implementations

use std::f64::consts::PI;

/// Periodic Hann window (the DFT-even form used for STFT analysis)
pub fn hann_window(size: usize) -> Vec<f64> {
    let n = size as f64;
    (0..size)
        .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f64 / n).cos()))
        .collect()
}
