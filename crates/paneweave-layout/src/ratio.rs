//! Split ratio arithmetic.
//!
//! A split stores one `f64` share per child. Shares are strictly positive and
//! sum to `1.0` within [`RATIO_TOLERANCE`].

use thiserror::Error;

/// Allowed drift of a ratio sum away from `1.0`.
pub const RATIO_TOLERANCE: f64 = 0.001;

/// Why a ratio list was rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RatioError {
    #[error("expected {expected} ratios, got {actual}")]
    WrongCount { expected: usize, actual: usize },
    #[error("ratio #{index} must be finite and > 0, got {value}")]
    NonPositive { index: usize, value: f64 },
    #[error("ratios must sum to 1.0 (±{RATIO_TOLERANCE}), got {sum}")]
    BadSum { sum: f64 },
}

/// Check a ratio list against a split with `expected` children.
pub fn validate_ratios(ratios: &[f64], expected: usize) -> Result<(), RatioError> {
    if ratios.len() != expected {
        return Err(RatioError::WrongCount {
            expected,
            actual: ratios.len(),
        });
    }
    if let Some((index, &value)) = ratios
        .iter()
        .enumerate()
        .find(|(_, value)| !value.is_finite() || **value <= 0.0)
    {
        return Err(RatioError::NonPositive { index, value });
    }
    let sum = ratios.iter().sum::<f64>();
    if (sum - 1.0).abs() > RATIO_TOLERANCE {
        return Err(RatioError::BadSum { sum });
    }
    Ok(())
}

/// `n` equal shares.
#[must_use]
pub fn equal_ratios(n: usize) -> Vec<f64> {
    if n == 0 {
        return Vec::new();
    }
    vec![1.0 / n as f64; n]
}

/// Rescale arbitrary non-negative weights so they sum to `1.0`.
///
/// Negative and non-finite weights count as zero. When nothing positive is
/// left the shares are distributed equally.
#[must_use]
pub fn normalize(weights: &[f64]) -> Vec<f64> {
    let cleaned = weights
        .iter()
        .map(|w| if w.is_finite() && *w > 0.0 { *w } else { 0.0 })
        .collect::<Vec<_>>();
    let total = cleaned.iter().sum::<f64>();
    if total <= 0.0 || !total.is_finite() {
        return equal_ratios(weights.len());
    }
    cleaned.into_iter().map(|w| w / total).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn exact_sums_validate() {
        assert_eq!(validate_ratios(&[0.6, 0.3, 0.1], 3), Ok(()));
        assert_eq!(validate_ratios(&[0.5, 0.5005], 2), Ok(()));
    }

    #[test]
    fn wrong_count_is_reported_first() {
        assert_eq!(
            validate_ratios(&[0.6, 0.3], 3),
            Err(RatioError::WrongCount {
                expected: 3,
                actual: 2
            })
        );
    }

    #[test]
    fn zero_and_nan_shares_are_rejected() {
        assert_eq!(
            validate_ratios(&[1.0, 0.0], 2),
            Err(RatioError::NonPositive {
                index: 1,
                value: 0.0
            })
        );
        assert!(matches!(
            validate_ratios(&[f64::NAN, 1.0], 2),
            Err(RatioError::NonPositive { index: 0, .. })
        ));
    }

    #[test]
    fn sum_outside_tolerance_is_rejected() {
        assert!(matches!(
            validate_ratios(&[0.5, 0.49], 2),
            Err(RatioError::BadSum { .. })
        ));
    }

    #[test]
    fn all_zero_normalizes_to_equal_shares() {
        assert_eq!(normalize(&[0.0, 0.0, 0.0, 0.0]), vec![0.25; 4]);
        assert!(normalize(&[]).is_empty());
    }

    #[test]
    fn normalize_keeps_proportions() {
        let shares = normalize(&[2.0, 1.0, 1.0]);
        assert_eq!(shares, vec![0.5, 0.25, 0.25]);
    }

    proptest! {
        #[test]
        fn normalized_shares_sum_to_one(
            weights in prop::collection::vec(0.0f64..1_000.0, 1..16)
        ) {
            let shares = normalize(&weights);
            prop_assert_eq!(shares.len(), weights.len());
            let sum = shares.iter().sum::<f64>();
            prop_assert!((sum - 1.0).abs() <= RATIO_TOLERANCE, "sum={}", sum);
            prop_assert!(shares.iter().all(|s| *s >= 0.0));
        }
    }
}
