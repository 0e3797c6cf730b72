// src/core/analysis/mfcc.rs
//
// MFCC statistics: spectral envelope shape and its frame-to-frame motion

use crate::core::dsp::filters::delta;
use crate::core::dsp::mel::Dct;
use crate::core::dsp::stats::column_mean_std;

/// MFCC analysis parameters
#[derive(Debug, Clone)]
pub struct MfccParams {
    pub num_coefficients: usize,
    /// Savitzky-Golay window used for delta coefficients
    pub delta_width: usize,
}

impl Default for MfccParams {
    fn default() -> Self {
        Self {
            num_coefficients: 13,
            delta_width: 9,
        }
    }
}

/// MFCC analysis results
#[derive(Debug, Clone, Default)]
pub struct MfccAnalysis {
    /// Per-frame coefficients, frame-major
    pub coefficients: Vec<Vec<f64>>,
    pub mean: Vec<f64>,
    pub std: Vec<f64>,
    pub delta_mean: Vec<f64>,
    pub delta_std: Vec<f64>,
}

/// Analyze MFCC features from a dB-scaled mel spectrogram
pub fn analyze_mfcc(mel_db: &[Vec<f64>], params: &MfccParams) -> MfccAnalysis {
    let num_mels = mel_db.first().map_or(0, |f| f.len());
    let n = params.num_coefficients;
    if num_mels == 0 {
        return MfccAnalysis {
            mean: vec![0.0; n],
            std: vec![0.0; n],
            delta_mean: vec![0.0; n],
            delta_std: vec![0.0; n],
            ..Default::default()
        };
    }

    let dct = Dct::new(num_mels, n);
    let coefficients: Vec<Vec<f64>> = mel_db.iter().map(|frame| dct.apply(frame)).collect();
    let (mean, std) = column_mean_std(&coefficients, n);

    // Delta runs along time, one coefficient track at a time
    let deltas_by_coeff: Vec<Vec<f64>> = (0..n)
        .map(|c| {
            let track: Vec<f64> = coefficients.iter().map(|f| f[c]).collect();
            delta(&track, params.delta_width)
        })
        .collect();
    let deltas: Vec<Vec<f64>> = (0..coefficients.len())
        .map(|t| deltas_by_coeff.iter().map(|track| track[t]).collect())
        .collect();
    let (delta_mean, delta_std) = column_mean_std(&deltas, n);

    MfccAnalysis {
        coefficients,
        mean,
        std,
        delta_mean,
        delta_std,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stationary_input_has_zero_spread() {
        let mel_db = vec![vec![-20.0; 128]; 30];
        let analysis = analyze_mfcc(&mel_db, &MfccParams::default());

        assert_eq!(analysis.mean.len(), 13);
        assert!(analysis.std.iter().all(|s| s.abs() < 1e-9));
        assert!(analysis.delta_mean.iter().all(|d| d.abs() < 1e-9));
        // Only the DC coefficient carries energy for a flat envelope
        assert!(analysis.mean[0] < 0.0);
        assert!(analysis.mean[1..].iter().all(|c| c.abs() < 1e-9));
    }

    #[test]
    fn test_rising_level_has_positive_delta() {
        let mel_db: Vec<Vec<f64>> = (0..30).map(|t| vec![-60.0 + t as f64; 128]).collect();
        let analysis = analyze_mfcc(&mel_db, &MfccParams::default());
        assert!(analysis.delta_mean[0] > 0.0);
    }
}
