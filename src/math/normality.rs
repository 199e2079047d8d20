//! D'Agostino–Pearson K² omnibus normality test.
//!
//! The skewness and kurtosis of the sample are each transformed to an
//! approximately standard-normal z-score; `K² = z_s² + z_k²` is then compared
//! against a χ² distribution with 2 degrees of freedom.

use serde::Serialize;
use statrs::distribution::{ChiSquared, ContinuousCDF};

use crate::error::AppError;
use crate::math::descriptive::{central_moment, mean};

/// The skewness transform is undefined below this sample size.
pub const MIN_NORMALITY_SAMPLES: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NormalityTest {
    pub skew_z: f64,
    pub kurtosis_z: f64,
    pub statistic: f64,
    pub p_value: f64,
}

/// Run the test. Returns `Ok(None)` when the sample is too small or has no spread.
pub fn dagostino_pearson(values: &[f64]) -> Result<Option<NormalityTest>, AppError> {
    if values.len() < MIN_NORMALITY_SAMPLES {
        return Ok(None);
    }
    let Some(m) = mean(values) else {
        return Ok(None);
    };
    let m2 = central_moment(values, m, 2).unwrap_or(0.0);
    if m2 <= 0.0 {
        return Ok(None);
    }
    let m3 = central_moment(values, m, 3).unwrap_or(0.0);
    let m4 = central_moment(values, m, 4).unwrap_or(0.0);

    let n = values.len() as f64;
    let skew_z = skew_z(m3 / m2.powf(1.5), n);
    let kurtosis_z = kurtosis_z(m4 / (m2 * m2), n);
    let statistic = skew_z * skew_z + kurtosis_z * kurtosis_z;

    let chi2 = ChiSquared::new(2.0)
        .map_err(|e| AppError::internal(format!("Chi-squared distribution error: {e}")))?;

    Ok(Some(NormalityTest {
        skew_z,
        kurtosis_z,
        statistic,
        p_value: chi2.sf(statistic),
    }))
}

fn skew_z(b2: f64, n: f64) -> f64 {
    let y = b2 * (((n + 1.0) * (n + 3.0)) / (6.0 * (n - 2.0))).sqrt();
    let beta2 = 3.0 * (n * n + 27.0 * n - 70.0) * (n + 1.0) * (n + 3.0)
        / ((n - 2.0) * (n + 5.0) * (n + 7.0) * (n + 9.0));
    let w2 = -1.0 + (2.0 * (beta2 - 1.0)).sqrt();
    let delta = 1.0 / (0.5 * w2.ln()).sqrt();
    let alpha = (2.0 / (w2 - 1.0)).sqrt();
    delta * (y / alpha).asinh()
}

fn kurtosis_z(b2: f64, n: f64) -> f64 {
    let e = 3.0 * (n - 1.0) / (n + 1.0);
    let var_b2 = 24.0 * n * (n - 2.0) * (n - 3.0) / ((n + 1.0).powi(2) * (n + 3.0) * (n + 5.0));
    let x = (b2 - e) / var_b2.sqrt();
    let sqrt_beta1 = 6.0 * (n * n - 5.0 * n + 2.0) / ((n + 7.0) * (n + 9.0))
        * ((6.0 * (n + 3.0) * (n + 5.0)) / (n * (n - 2.0) * (n - 3.0))).sqrt();
    let a = 6.0 + 8.0 / sqrt_beta1 * (2.0 / sqrt_beta1 + (1.0 + 4.0 / (sqrt_beta1 * sqrt_beta1)).sqrt());
    let term1 = 1.0 - 2.0 / (9.0 * a);
    let denom = 1.0 + x * (2.0 / (a - 4.0)).sqrt();
    let term2 = denom.signum() * ((1.0 - 2.0 / a) / denom.abs()).cbrt();
    (term1 - term2) / (2.0 / (9.0 * a)).sqrt()
}
