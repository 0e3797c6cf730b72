//! Short-time Fourier transform with centered, zero-padded frames

use num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;

use super::windows::hann_window;
use super::Spectrogram;

/// STFT computation with windowing
pub struct StftProcessor {
    fft: Arc<dyn Fft<f64>>,
    window: Vec<f64>,
    fft_size: usize,
    hop_size: usize,
}

impl StftProcessor {
    pub fn new(fft_size: usize, hop_size: usize) -> Self {
        let mut planner = FftPlanner::new();
        Self {
            fft: planner.plan_fft_forward(fft_size),
            window: hann_window(fft_size),
            fft_size,
            hop_size,
        }
    }

    /// Number of frames produced for a signal of `len` samples
    pub fn frame_count(&self, len: usize) -> usize {
        1 + len / self.hop_size
    }

    /// Complex spectrum of each frame (positive frequencies only).
    ///
    /// The signal is padded with `fft_size / 2` zeros on each side so frame
    /// `t` is centered on sample `t * hop_size`.
    pub fn complex_frames(&self, samples: &[f64]) -> Vec<Vec<Complex<f64>>> {
        let pad = self.fft_size / 2;
        let mut padded = vec![0.0; samples.len() + 2 * pad];
        padded[pad..pad + samples.len()].copy_from_slice(samples);

        let num_bins = self.fft_size / 2 + 1;
        let num_frames = self.frame_count(samples.len());
        let mut frames = Vec::with_capacity(num_frames);
        let mut buffer = vec![Complex::new(0.0, 0.0); self.fft_size];

        for t in 0..num_frames {
            let start = t * self.hop_size;
            let frame = &padded[start..start + self.fft_size];
            for (slot, (&s, &w)) in buffer.iter_mut().zip(frame.iter().zip(&self.window)) {
                *slot = Complex::new(s * w, 0.0);
            }
            self.fft.process(&mut buffer);
            frames.push(buffer[..num_bins].to_vec());
        }

        frames
    }

    /// Magnitude spectrogram, frame-major
    pub fn magnitude(&self, samples: &[f64]) -> Spectrogram {
        let frames = self
            .complex_frames(samples)
            .into_iter()
            .map(|frame| frame.iter().map(|c| c.norm()).collect())
            .collect();
        Spectrogram::new(frames, self.fft_size)
    }
}
