//! Window statistics shared by scoring, artifact detection and session
//! summaries. Every function either returns a finite value or an error.

use crate::error::{ComputeError, ComputeResult};

/// Arithmetic mean.
pub fn mean(values: &[f64]) -> ComputeResult<f64> {
    if values.is_empty() {
        return Err(ComputeError::EmptyInput("mean"));
    }
    finite(values.iter().sum::<f64>() / values.len() as f64, "mean")
}

/// Population standard deviation (divides by N, not N - 1).
pub fn std_dev(values: &[f64]) -> ComputeResult<f64> {
    std_dev_chained(&[values])
}

/// Population standard deviation over the concatenation of several series,
/// without materializing the concatenated vector.
pub fn std_dev_chained(series: &[&[f64]]) -> ComputeResult<f64> {
    let n: usize = series.iter().map(|s| s.len()).sum();
    if n == 0 {
        return Err(ComputeError::EmptyInput("std_dev"));
    }
    let all = || series.iter().flat_map(|s| s.iter().copied());

    let mean = finite(all().sum::<f64>() / n as f64, "std_dev")?;
    let variance = all().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n as f64;
    finite(variance.sqrt(), "std_dev")
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn finite(value: f64, what: &'static str) -> ComputeResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ComputeError::NonFinite(what))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mean_basic() {
        assert_relative_eq!(mean(&[1.0, 2.0, 3.0, 4.0]).unwrap(), 2.5);
    }

    #[test]
    fn test_mean_empty_is_error() {
        assert_eq!(mean(&[]), Err(ComputeError::EmptyInput("mean")));
    }

    #[test]
    fn test_mean_non_finite_is_error() {
        assert_eq!(
            mean(&[1.0, f64::NAN]),
            Err(ComputeError::NonFinite("mean"))
        );
        assert!(mean(&[f64::INFINITY, 1.0]).is_err());
    }

    #[test]
    fn test_std_dev_is_population() {
        // Population std of [2, 4, 4, 4, 5, 5, 7, 9] is exactly 2.
        let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_relative_eq!(std_dev(&v).unwrap(), 2.0);
    }

    #[test]
    fn test_std_dev_constant_is_zero() {
        assert_relative_eq!(std_dev(&[3.0; 16]).unwrap(), 0.0);
    }

    #[test]
    fn test_std_dev_chained_matches_concatenation() {
        let a = [1.0, 2.0, 3.0];
        let b = [10.0, 20.0];
        let concat: Vec<f64> = a.iter().chain(b.iter()).copied().collect();
        assert_relative_eq!(
            std_dev_chained(&[&a, &b]).unwrap(),
            std_dev(&concat).unwrap(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_std_dev_chained_skips_empty_parts() {
        let a = [5.0, 5.0];
        assert_relative_eq!(std_dev_chained(&[&[], &a]).unwrap(), 0.0);
        assert!(std_dev_chained(&[&[], &[]]).is_err());
    }

    #[test]
    fn test_round2() {
        assert_relative_eq!(round2(12.3456), 12.35);
        assert_relative_eq!(round2(-0.004), 0.0);
        assert_relative_eq!(round2(100.0), 100.0);
    }
}
