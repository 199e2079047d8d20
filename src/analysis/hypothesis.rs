//! Inference over the per-station means.
//!
//! - quartiles, mean, sample standard deviation
//! - 95% confidence interval for the population mean (Student's t, n-1 df)
//! - one-sample two-sided t-test against the country mean
//! - D'Agostino–Pearson normality test (n >= 8)

use serde::Serialize;
use statrs::distribution::{ContinuousCDF, StudentsT};

use crate::error::AppError;
use crate::math::{NormalityTest, dagostino_pearson, mean, quartiles, sample_std_dev, standard_error};

pub const CONFIDENCE_LEVEL: f64 = 0.95;
pub const SIGNIFICANCE: f64 = 1.0 - CONFIDENCE_LEVEL;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConfidenceInterval {
    pub level: f64,
    pub lower: f64,
    pub upper: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TTest {
    /// Hypothesized population mean (the country mean).
    pub reference: f64,
    pub statistic: f64,
    pub df: f64,
    pub p_value: f64,
    /// Two-sided critical value `t(1 - α/2, df)`.
    pub critical_value: f64,
    pub reject_null: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct HypothesisReport {
    pub n: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub std_error: f64,
    pub quartiles: [f64; 3],
    pub interval: ConfidenceInterval,
    pub t_test: TTest,
    pub normality: Option<NormalityTest>,
}

pub fn hypothesis_report(values: &[f64], reference: f64) -> Result<HypothesisReport, AppError> {
    let n = values.len();
    let (Some(m), Some(sd), Some(se), Some(q)) =
        (mean(values), sample_std_dev(values), standard_error(values), quartiles(values))
    else {
        return Err(AppError::insufficient_data(format!(
            "Need at least 2 station means for inference, found {n}."
        )));
    };

    let df = n as f64 - 1.0;
    let t_dist = StudentsT::new(0.0, 1.0, df)
        .map_err(|e| AppError::internal(format!("Student's t distribution error: {e}")))?;
    let critical_value = t_dist.inverse_cdf(1.0 - SIGNIFICANCE / 2.0);

    let half_width = critical_value * se;
    let interval = ConfidenceInterval {
        level: CONFIDENCE_LEVEL,
        lower: m - half_width,
        upper: m + half_width,
    };

    let (statistic, p_value) = if se > 0.0 {
        let t = (m - reference) / se;
        (t, 2.0 * t_dist.sf(t.abs()))
    } else if m == reference {
        (0.0, 1.0)
    } else {
        ((m - reference).signum() * f64::INFINITY, 0.0)
    };

    Ok(HypothesisReport {
        n,
        mean: m,
        std_dev: sd,
        std_error: se,
        quartiles: q,
        interval,
        t_test: TTest {
            reference,
            statistic,
            df,
            p_value,
            critical_value,
            reject_null: p_value < SIGNIFICANCE,
        },
        normality: dagostino_pearson(values)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn t_test_at_the_reference_mean() {
        let r = hypothesis_report(&[10.0, 12.0, 14.0], 12.0).unwrap();
        assert!(r.t_test.statistic.abs() < 1e-12);
        assert!(r.t_test.p_value > 0.999);
        assert!(!r.t_test.reject_null);
        assert_eq!(r.quartiles, [10.0, 12.0, 14.0]);
        assert!(r.normality.is_none());
    }

    #[test]
    fn confidence_interval_uses_t_quantile() {
        let r = hypothesis_report(&[10.0, 12.0, 14.0], 12.0).unwrap();
        assert!((r.std_error - standard_error(&[10.0, 12.0, 14.0]).unwrap()).abs() < 1e-12);
        assert!((r.std_error - 1.154_700_5).abs() < 1e-6);
        assert!((r.t_test.critical_value - 4.302_653).abs() < 1e-4);
        assert!((r.interval.lower - 7.031_6).abs() < 1e-3);
        assert!((r.interval.upper - 16.968_4).abs() < 1e-3);
    }

    #[test]
    fn t_test_known_p_value() {
        let r = hypothesis_report(&[1.0, 2.0, 3.0, 4.0, 5.0], 0.0).unwrap();
        assert!((r.t_test.statistic - 4.242_64).abs() < 1e-4);
        assert!((r.t_test.p_value - 0.013_24).abs() < 1e-4);
        assert!(r.t_test.reject_null);
    }

    #[test]
    fn zero_spread_is_handled() {
        let same = hypothesis_report(&[3.0, 3.0, 3.0], 3.0).unwrap();
        assert_eq!(same.t_test.statistic, 0.0);
        assert_eq!(same.t_test.p_value, 1.0);

        let off = hypothesis_report(&[3.0, 3.0, 3.0], 1.0).unwrap();
        assert!(off.t_test.statistic.is_infinite() && off.t_test.statistic > 0.0);
        assert_eq!(off.t_test.p_value, 0.0);
    }

    #[test]
    fn too_few_means_is_an_error() {
        assert_eq!(hypothesis_report(&[1.0], 1.0).unwrap_err().exit_code(), 3);
    }

    #[test]
    fn normality_runs_for_larger_samples() {
        let v: Vec<f64> = (1..=12).map(f64::from).collect();
        let r = hypothesis_report(&v, 6.5).unwrap();
        assert!(r.normality.is_some());
    }
}
