//! Statistical and spectral analysis functions

use std::cmp::Ordering;

/// Arithmetic mean, 0.0 for an empty slice
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    data.iter().sum::<f64>() / data.len() as f64
}

/// Population variance
pub fn variance(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let m = mean(data);
    data.iter().map(|x| (x - m) * (x - m)).sum::<f64>() / data.len() as f64
}

/// Population standard deviation
pub fn std_dev(data: &[f64]) -> f64 {
    variance(data).sqrt()
}

/// Compute median of a slice
pub fn median(data: &mut [f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }

    data.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    let mid = data.len() / 2;
    if data.len() % 2 == 0 {
        (data[mid - 1] + data[mid]) / 2.0
    } else {
        data[mid]
    }
}

/// Mean of the first difference; 0.0 when fewer than two values
pub fn mean_diff(data: &[f64]) -> f64 {
    if data.len() < 2 {
        return 0.0;
    }
    let diffs: Vec<f64> = data.windows(2).map(|w| w[1] - w[0]).collect();
    mean(&diffs)
}

/// Per-row mean and standard deviation of a frame-major matrix, taken
/// across frames for each column
pub fn column_mean_std(frames: &[Vec<f64>], width: usize) -> (Vec<f64>, Vec<f64>) {
    (0..width)
        .map(|c| {
            let column: Vec<f64> = frames.iter().map(|f| f[c]).collect();
            (mean(&column), std_dev(&column))
        })
        .unzip()
}

/// Compute spectral centroid (brightness measure)
pub fn spectral_centroid(magnitudes: &[f64], freqs: &[f64]) -> f64 {
    let total: f64 = magnitudes.iter().sum();
    if total <= f64::MIN_POSITIVE {
        return 0.0;
    }

    magnitudes.iter().zip(freqs).map(|(m, f)| m * f).sum::<f64>() / total
}

/// Compute spectral bandwidth (second-order spread around the centroid)
pub fn spectral_bandwidth(magnitudes: &[f64], freqs: &[f64], centroid: f64) -> f64 {
    let total: f64 = magnitudes.iter().sum();
    if total <= f64::MIN_POSITIVE {
        return 0.0;
    }

    let spread: f64 = magnitudes
        .iter()
        .zip(freqs)
        .map(|(m, f)| (m / total) * (f - centroid).powi(2))
        .sum();
    spread.sqrt()
}

/// Compute spectral rolloff (lowest frequency below which `percentile`
/// of the magnitude sum is contained)
pub fn spectral_rolloff(magnitudes: &[f64], freqs: &[f64], percentile: f64) -> f64 {
    let total: f64 = magnitudes.iter().sum();
    let threshold = total * percentile;

    let mut cumulative = 0.0;
    for (&mag, &freq) in magnitudes.iter().zip(freqs) {
        cumulative += mag;
        if cumulative >= threshold {
            return freq;
        }
    }

    freqs.last().copied().unwrap_or(0.0)
}

/// Compute spectral flatness (Wiener entropy) of a power spectrum.
/// Returns 1.0 for white noise, approaches 0.0 for tonal signals.
pub fn spectral_flatness(power: &[f64], amin: f64) -> f64 {
    if power.is_empty() {
        return 0.0;
    }
    let n = power.len() as f64;

    let log_mean = power.iter().map(|&p| p.max(amin).ln()).sum::<f64>() / n;
    let arithmetic_mean = power.iter().map(|&p| p.max(amin)).sum::<f64>() / n;

    log_mean.exp() / arithmetic_mean
}

/// Bin range of one octave band used by spectral contrast
#[derive(Debug, Clone, Copy)]
pub struct ContrastBand {
    start: usize,
    end: usize,
    alpha: usize,
}

/// Octave sub-bands starting at `fmin`: `[0, fmin]`, `[fmin, 2·fmin]`, …,
/// with the last band running to Nyquist. Each band borrows one bin from
/// below; all but the last drop their top bin.
pub fn contrast_bands(freqs: &[f64], fmin: f64, num_bands: usize, quantile: f64) -> Vec<ContrastBand> {
    let mut edges = vec![0.0];
    edges.extend((0..=num_bands).map(|i| fmin * 2f64.powi(i as i32)));

    (0..=num_bands)
        .filter_map(|k| {
            let (f_low, f_high) = (edges[k], edges[k + 1]);
            let first = freqs.iter().position(|&f| f >= f_low && f <= f_high)?;
            let last = freqs.iter().rposition(|&f| f >= f_low && f <= f_high)?;

            let start = if k > 0 { first.saturating_sub(1) } else { first };
            let end = if k == num_bands { freqs.len() - 1 } else { last };
            let selected = end - start + 1;
            let alpha = ((quantile * selected as f64).round() as usize).max(1);
            let end = if k < num_bands { end.saturating_sub(1) } else { end };

            Some(ContrastBand { start, end, alpha })
        })
        .collect()
}

/// Mean of the lowest and highest quantile of magnitudes within a band,
/// returned as (peak, valley)
pub fn band_peak_valley(magnitudes: &[f64], band: &ContrastBand) -> (f64, f64) {
    let mut sorted: Vec<f64> = magnitudes[band.start..=band.end].to_vec();
    if sorted.is_empty() {
        return (0.0, 0.0);
    }
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    let alpha = band.alpha.min(sorted.len());
    let valley = mean(&sorted[..alpha]);
    let peak = mean(&sorted[sorted.len() - alpha..]);
    (peak, valley)
}

/// Zero-crossing rate of centered frames (edge-padded). Samples with
/// magnitude at or below 1e-10 count as zero, and zero counts as positive.
pub fn zero_crossing_rates(samples: &[f64], frame_len: usize, hop: usize) -> Vec<f64> {
    if samples.is_empty() {
        return Vec::new();
    }
    let pad = frame_len / 2;
    let first = samples[0];
    let last = samples[samples.len() - 1];

    let padded: Vec<f64> = std::iter::repeat(first)
        .take(pad)
        .chain(samples.iter().copied())
        .chain(std::iter::repeat(last).take(pad))
        .collect();

    let negative: Vec<bool> = padded
        .iter()
        .map(|&s| if s.abs() <= 1e-10 { false } else { s < 0.0 })
        .collect();

    let num_frames = 1 + samples.len() / hop;
    (0..num_frames)
        .map(|t| {
            let frame = &negative[t * hop..t * hop + frame_len];
            let crossings = frame.windows(2).filter(|w| w[0] != w[1]).count();
            crossings as f64 / frame_len as f64
        })
        .collect()
}

/// RMS of centered, zero-padded frames
pub fn frame_rms(samples: &[f64], frame_len: usize, hop: usize) -> Vec<f64> {
    let pad = frame_len / 2;
    let mut padded = vec![0.0; samples.len() + 2 * pad];
    padded[pad..pad + samples.len()].copy_from_slice(samples);

    let num_frames = 1 + samples.len() / hop;
    (0..num_frames)
        .map(|t| {
            let frame = &padded[t * hop..t * hop + frame_len];
            (frame.iter().map(|s| s * s).sum::<f64>() / frame_len as f64).sqrt()
        })
        .collect()
}

/// Convert amplitudes to dB relative to their own peak, flooring at `amin`
/// and clipping more than `top_db` below the loudest value
pub fn amplitude_to_db_peak_ref(amplitudes: &[f64], amin: f64, top_db: f64) -> Vec<f64> {
    let peak = amplitudes.iter().map(|a| a.abs()).fold(0.0f64, f64::max);
    let ref_db = 20.0 * peak.max(amin).log10();

    let db: Vec<f64> = amplitudes
        .iter()
        .map(|a| 20.0 * a.abs().max(amin).log10() - ref_db)
        .collect();

    let max_db = db.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    db.into_iter().map(|v| v.max(max_db - top_db)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_std() {
        let data = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((mean(&data) - 5.0).abs() < 1e-12);
        assert!((std_dev(&data) - 2.0).abs() < 1e-12);
        assert_eq!(mean(&[]), 0.0);
    }

    #[test]
    fn test_median() {
        assert_eq!(median(&mut [3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(&mut [4.0, 1.0, 2.0, 3.0]), 2.5);
        assert_eq!(median(&mut []), 0.0);
    }

    #[test]
    fn test_spectral_flatness_tonal() {
        // Mostly zeros with one peak = low flatness
        let mut power = vec![1e-6; 100];
        power[50] = 1.0;
        assert!(spectral_flatness(&power, 1e-10) < 0.1);
    }

    #[test]
    fn test_spectral_flatness_noise() {
        // All equal = high flatness
        let power = vec![1.0; 100];
        assert!(spectral_flatness(&power, 1e-10) > 0.99);
    }

    #[test]
    fn test_centroid_and_rolloff() {
        let freqs = [0.0, 100.0, 200.0, 300.0];
        let mags = [0.0, 0.0, 1.0, 0.0];
        assert!((spectral_centroid(&mags, &freqs) - 200.0).abs() < 1e-9);
        assert_eq!(spectral_rolloff(&mags, &freqs, 0.85), 200.0);
        assert!(spectral_bandwidth(&mags, &freqs, 200.0).abs() < 1e-9);
        assert_eq!(spectral_centroid(&[0.0; 4], &freqs), 0.0);
    }

    #[test]
    fn test_contrast_band_layout() {
        let freqs: Vec<f64> = (0..=1024).map(|k| k as f64 * 22050.0 / 2048.0).collect();
        let bands = contrast_bands(&freqs, 200.0, 6, 0.02);
        assert_eq!(bands.len(), 7);
        assert_eq!(bands[0].start, 0);
        assert_eq!(bands[6].end, 1024);
    }

    #[test]
    fn test_zcr_alternating() {
        let samples: Vec<f64> = (0..4096).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
        let zcr = zero_crossing_rates(&samples, 2048, 512);
        assert_eq!(zcr.len(), 9);
        let mid = zcr[4];
        assert!((mid - 2047.0 / 2048.0).abs() < 1e-9);
    }

    #[test]
    fn test_rms_constant() {
        let rms = frame_rms(&[0.5; 8192], 2048, 512);
        assert!((rms[8] - 0.5).abs() < 1e-12);
        assert!(rms[0] < 0.5);
    }

    #[test]
    fn test_amplitude_to_db_peak_ref() {
        let db = amplitude_to_db_peak_ref(&[1.0, 0.1, 0.0], 1e-5, 80.0);
        assert!((db[0]).abs() < 1e-9);
        assert!((db[1] + 20.0).abs() < 1e-9);
        assert!((db[2] + 80.0).abs() < 1e-9);
    }
}
