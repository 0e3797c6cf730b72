//! Digital Signal Processing utilities

mod fft;
pub mod filters;
pub mod mel;
pub mod stats;
mod windows;

pub use fft::StftProcessor;
pub use mel::MelFilterBank;
pub use windows::hann_window;

/// Frame-major spectrogram: `frames[t][k]` is bin `k` of frame `t`
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrogram {
    frames: Vec<Vec<f64>>,
    fft_size: usize,
}

impl Spectrogram {
    pub fn new(frames: Vec<Vec<f64>>, fft_size: usize) -> Self {
        Self { frames, fft_size }
    }

    pub fn frames(&self) -> &[Vec<f64>] {
        &self.frames
    }

    pub fn num_frames(&self) -> usize {
        self.frames.len()
    }

    pub fn num_bins(&self) -> usize {
        self.fft_size / 2 + 1
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Element-wise square (magnitude to power)
    pub fn power(&self) -> Spectrogram {
        let frames = self
            .frames
            .iter()
            .map(|f| f.iter().map(|m| m * m).collect())
            .collect();
        Spectrogram::new(frames, self.fft_size)
    }

    /// True if any element is NaN or infinite
    pub fn has_non_finite(&self) -> bool {
        self.frames.iter().flatten().any(|v| !v.is_finite())
    }
}

/// Center frequency of each FFT bin in Hz
pub fn fft_frequencies(sample_rate: u32, fft_size: usize) -> Vec<f64> {
    (0..=fft_size / 2)
        .map(|k| k as f64 * sample_rate as f64 / fft_size as f64)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fft_frequencies() {
        let freqs = fft_frequencies(22050, 2048);
        assert_eq!(freqs.len(), 1025);
        assert_eq!(freqs[0], 0.0);
        assert!((freqs[1024] - 11025.0).abs() < 1e-9);
    }

    #[test]
    fn test_power() {
        let spec = Spectrogram::new(vec![vec![2.0, 3.0]], 2);
        assert_eq!(spec.power().frames()[0], vec![4.0, 9.0]);
    }
}
