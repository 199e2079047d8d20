//! Descriptive statistics over plain `f64` slices.
//!
//! Every function returns `None` instead of dividing by zero; callers decide
//! whether a missing statistic is fatal.

/// Arithmetic mean.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (Bessel's correction, `n - 1`).
pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Some((ss / (values.len() as f64 - 1.0)).sqrt())
}

/// Standard error of the mean: `s / sqrt(n)`.
pub fn standard_error(values: &[f64]) -> Option<f64> {
    let sd = sample_std_dev(values)?;
    Some(sd / (values.len() as f64).sqrt())
}

/// Quartiles using the exclusive ("n + 1") interpolation method.
///
/// Needs at least two values.
pub fn quartiles(values: &[f64]) -> Option<[f64; 3]> {
    let n = values.len();
    if n < 2 {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let m = n + 1;
    let mut out = [0.0; 3];
    for (slot, i) in out.iter_mut().zip(1..=3usize) {
        let j = (i * m / 4).clamp(1, n - 1);
        let delta = (i * m) as f64 - (j * 4) as f64;
        *slot = (sorted[j - 1] * (4.0 - delta) + sorted[j] * delta) / 4.0;
    }
    Some(out)
}

/// Population central moment of order `k` around `center`.
pub fn central_moment(values: &[f64], center: f64, k: i32) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().map(|v| (v - center).powi(k)).sum::<f64>() / values.len() as f64)
}

/// `(min, max)` of the finite values.
pub fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for &v in values.iter().filter(|v| v.is_finite()) {
        lo = lo.min(v);
        hi = hi.max(v);
    }
    if lo.is_finite() && hi.is_finite() {
        Some((lo, hi))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_and_std_dev() {
        let v = [10.0, 12.0, 14.0];
        assert!((mean(&v).unwrap() - 12.0).abs() < 1e-12);
        assert!((sample_std_dev(&v).unwrap() - 2.0).abs() < 1e-12);
        assert!((standard_error(&v).unwrap() - 2.0 / 3f64.sqrt()).abs() < 1e-12);
        assert!(mean(&[]).is_none());
        assert!(sample_std_dev(&[1.0]).is_none());
    }

    #[test]
    fn quartiles_exclusive_method() {
        let v: Vec<f64> = (1..=9).map(f64::from).collect();
        let q = quartiles(&v).unwrap();
        assert!((q[0] - 2.5).abs() < 1e-12);
        assert!((q[1] - 5.0).abs() < 1e-12);
        assert!((q[2] - 7.5).abs() < 1e-12);
    }

    #[test]
    fn quartiles_small_sample_clamps() {
        let q = quartiles(&[14.0, 10.0, 12.0]).unwrap();
        assert_eq!(q, [10.0, 12.0, 14.0]);
        assert!(quartiles(&[1.0]).is_none());
    }

    #[test]
    fn min_max_skips_non_finite() {
        assert_eq!(min_max(&[3.0, f64::NAN, -1.0, 7.0]), Some((-1.0, 7.0)));
        assert_eq!(min_max(&[f64::NAN]), None);
    }
}
