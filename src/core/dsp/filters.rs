//! Median filtering, soft masking and temporal derivatives

use std::cmp::Ordering;

/// Reflect an out-of-range index back into `0..len` (edge sample repeated)
fn reflect(idx: isize, len: usize) -> usize {
    let n = len as isize;
    let mut i = idx;
    loop {
        if i < 0 {
            i = -i - 1;
        } else if i >= n {
            i = 2 * n - i - 1;
        } else {
            return i as usize;
        }
    }
}

/// Running median with an odd kernel and reflected boundaries
pub fn median_filter(data: &[f64], kernel: usize) -> Vec<f64> {
    if data.is_empty() || kernel <= 1 {
        return data.to_vec();
    }
    let half = (kernel / 2) as isize;
    let mut window = Vec::with_capacity(kernel);

    (0..data.len() as isize)
        .map(|i| {
            window.clear();
            window.extend((i - half..=i + half).map(|j| data[reflect(j, data.len())]));
            let mid = window.len() / 2;
            let (_, m, _) = window
                .select_nth_unstable_by(mid, |a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
            *m
        })
        .collect()
}

/// Wiener-style soft mask `x^p / (x^p + r^p)`; 0.0 where both are ~0
pub fn soft_mask(x: f64, reference: f64, power: i32) -> f64 {
    let z = x.max(reference);
    if z < f64::MIN_POSITIVE {
        return 0.0;
    }
    let a = (x / z).powi(power);
    let b = (reference / z).powi(power);
    a / (a + b)
}

/// First-order Savitzky-Golay derivative (linear fit) over `width` points.
/// Edge positions take the slope of the least-squares line through the
/// first/last full window.
pub fn delta(data: &[f64], width: usize) -> Vec<f64> {
    let n = data.len();
    if n < 2 {
        return vec![0.0; n];
    }

    if n < width {
        let slope = linear_slope(data);
        return vec![slope; n];
    }

    let half = width / 2;
    let denom: f64 = (1..=half).map(|k| 2.0 * (k * k) as f64).sum();

    (0..n)
        .map(|i| {
            let c = i.clamp(half, n - 1 - half);
            (1..=half)
                .map(|k| k as f64 * (data[c + k] - data[c - k]))
                .sum::<f64>()
                / denom
        })
        .collect()
}

fn linear_slope(data: &[f64]) -> f64 {
    let n = data.len() as f64;
    let x_mean = (n - 1.0) / 2.0;
    let y_mean = data.iter().sum::<f64>() / n;

    let (num, den) = data.iter().enumerate().fold((0.0, 0.0), |(num, den), (i, &y)| {
        let dx = i as f64 - x_mean;
        (num + dx * (y - y_mean), den + dx * dx)
    });

    if den > 0.0 { num / den } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_median_filter_removes_spike() {
        let data = [1.0, 1.0, 9.0, 1.0, 1.0];
        assert_eq!(median_filter(&data, 3), vec![1.0; 5]);
    }

    #[test]
    fn test_median_filter_reflects_edges() {
        let data = [5.0, 1.0, 1.0, 1.0];
        // reflected window at index 0 is [5, 5, 1]
        assert_eq!(median_filter(&data, 3)[0], 5.0);
    }

    #[test]
    fn test_soft_mask() {
        assert!((soft_mask(1.0, 1.0, 2) - 0.5).abs() < 1e-12);
        assert!(soft_mask(1.0, 0.0, 2) > 0.99);
        assert_eq!(soft_mask(0.0, 0.0, 2), 0.0);
    }

    #[test]
    fn test_delta_of_ramp_is_slope() {
        let ramp: Vec<f64> = (0..20).map(|i| 3.0 * i as f64).collect();
        for d in delta(&ramp, 9) {
            assert!((d - 3.0).abs() < 1e-9);
        }
        let short: Vec<f64> = (0..5).map(|i| 2.0 * i as f64).collect();
        for d in delta(&short, 9) {
            assert!((d - 2.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_delta_of_constant_is_zero() {
        assert!(delta(&[4.0; 12], 9).iter().all(|d| d.abs() < 1e-12));
    }
}
