//! Attention and meditation scores from band-power ratios.
//!
//! Attention follows the engagement ratio beta / (alpha + theta); meditation
//! follows alpha / theta. Both ratios are mapped linearly onto [0, 100] and
//! rounded to two decimals. A zero denominator yields the neutral score
//! rather than an error; non-finite input is an error the caller replaces
//! with the neutral score.

use serde::{Deserialize, Serialize};

use crate::constants::{
    ATTENTION_RATIO_FLOOR, ATTENTION_RATIO_SPAN, MEDITATION_RATIO_FLOOR, MEDITATION_RATIO_SPAN,
    NEUTRAL_SCORE,
};
use crate::error::{ComputeError, ComputeResult};
use crate::stats::{mean, round2};

/// The two cognitive scores of one processing pass, each in [0, 100].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub attention: f64,
    pub meditation: f64,
}

impl ScoreResult {
    pub const NEUTRAL: ScoreResult = ScoreResult {
        attention: NEUTRAL_SCORE,
        meditation: NEUTRAL_SCORE,
    };
}

impl Default for ScoreResult {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

pub fn attention_score(alpha: &[f64], beta: &[f64], theta: &[f64]) -> ComputeResult<f64> {
    let a = mean(alpha)?;
    let b = mean(beta)?;
    let t = mean(theta)?;

    if a + t == 0.0 {
        return Ok(NEUTRAL_SCORE);
    }
    normalize(b / (a + t), ATTENTION_RATIO_FLOOR, ATTENTION_RATIO_SPAN, "attention")
}

pub fn meditation_score(alpha: &[f64], theta: &[f64]) -> ComputeResult<f64> {
    let a = mean(alpha)?;
    let t = mean(theta)?;

    if t == 0.0 {
        return Ok(NEUTRAL_SCORE);
    }
    normalize(a / t, MEDITATION_RATIO_FLOOR, MEDITATION_RATIO_SPAN, "meditation")
}

fn normalize(ratio: f64, floor: f64, span: f64, what: &'static str) -> ComputeResult<f64> {
    if !ratio.is_finite() {
        return Err(ComputeError::NonFinite(what));
    }
    let scaled = (ratio - floor) / span * 100.0;
    Ok(round2(scaled.clamp(0.0, 100.0)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn flat(v: f64) -> Vec<f64> {
        vec![v; 64]
    }

    #[test]
    fn test_attention_low_ratios() {
        // ratio = 5 / (20 + 5) = 0.2 -> (0.2 - 0.1) / 1.9 * 100 = 5.26
        let score = attention_score(&flat(20.0), &flat(5.0), &flat(5.0)).unwrap();
        assert_relative_eq!(score, 5.26);

        // ratio = 1 / 20 = 0.05 -> negative -> 0
        let score = attention_score(&flat(10.0), &flat(1.0), &flat(10.0)).unwrap();
        assert_relative_eq!(score, 0.0);
    }

    #[test]
    fn test_attention_high_ratio_clamps_to_hundred() {
        let score = attention_score(&flat(1.0), &flat(10.0), &flat(1.0)).unwrap();
        assert_relative_eq!(score, 100.0);
    }

    #[test]
    fn test_attention_mid_range() {
        // ratio = 10 / (5 + 5) = 1.0 -> 0.9 / 1.9 * 100 = 47.368... -> 47.37
        let score = attention_score(&flat(5.0), &flat(10.0), &flat(5.0)).unwrap();
        assert_relative_eq!(score, 47.37);
    }

    #[test]
    fn test_attention_zero_denominator_is_neutral() {
        let score = attention_score(&flat(0.0), &flat(12.0), &flat(0.0)).unwrap();
        assert_eq!(score, NEUTRAL_SCORE);
    }

    #[test]
    fn test_meditation_scores() {
        // ratio = 20 / 5 = 4 -> 3.5 / 2.5 * 100 = 140 -> 100
        assert_relative_eq!(meditation_score(&flat(20.0), &flat(5.0)).unwrap(), 100.0);
        // ratio = 10 / 5 = 2 -> 1.5 / 2.5 * 100 = 60
        assert_relative_eq!(meditation_score(&flat(10.0), &flat(5.0)).unwrap(), 60.0);
        // ratio = 1 / 5 = 0.2 -> negative -> 0
        assert_relative_eq!(meditation_score(&flat(1.0), &flat(5.0)).unwrap(), 0.0);
    }

    #[test]
    fn test_meditation_zero_theta_is_neutral() {
        assert_eq!(
            meditation_score(&flat(3.0), &flat(0.0)).unwrap(),
            NEUTRAL_SCORE
        );
    }

    #[test]
    fn test_non_finite_input_is_error() {
        let mut alpha = flat(1.0);
        alpha[3] = f64::INFINITY;
        assert!(attention_score(&alpha, &flat(1.0), &flat(1.0)).is_err());
        assert!(meditation_score(&alpha, &flat(1.0)).is_err());
    }

    #[test]
    fn test_empty_input_is_error() {
        assert!(attention_score(&[], &[], &[]).is_err());
        assert!(meditation_score(&[], &[]).is_err());
    }

    proptest! {
        #[test]
        fn prop_scores_stay_in_range(
            alpha in prop::collection::vec(-100.0f64..1000.0, 1..80),
            beta in prop::collection::vec(-100.0f64..1000.0, 1..80),
            theta in prop::collection::vec(-100.0f64..1000.0, 1..80),
        ) {
            if let Ok(score) = attention_score(&alpha, &beta, &theta) {
                prop_assert!((0.0..=100.0).contains(&score));
            }
            if let Ok(score) = meditation_score(&alpha, &theta) {
                prop_assert!((0.0..=100.0).contains(&score));
            }
        }
    }
}
