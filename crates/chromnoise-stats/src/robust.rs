use thiserror::Error;

/// Divisor that rescales the raw MAD into a consistent estimator of the
/// standard deviation of normally distributed data.
pub const MAD_SCALE: f64 = 0.6745;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StatsError {
    #[error("cannot compute a statistic of an empty sequence")]
    Empty,
    #[error("value at index {index} is not a finite number")]
    NonFinite { index: usize },
}

/// Median of `values`. Odd counts return the middle element after sorting,
/// even counts the mean of the two central elements.
///
/// The input is left untouched; a sorted copy is used internally.
pub fn median(values: &[f64]) -> Result<f64, StatsError> {
    check_values(values)?;
    let mut sorted = values.to_vec();
    Ok(median_of_sorted(&mut sorted))
}

/// Median absolute deviation, scaled by `1 / MAD_SCALE`.
///
/// Computed as `median(|x_i - median(x)|) / 0.6745`.
pub fn median_absolute_deviation(values: &[f64]) -> Result<f64, StatsError> {
    check_values(values)?;
    let mut scratch = values.to_vec();
    let center = median_of_sorted(&mut scratch);
    for v in scratch.iter_mut() {
        *v = (*v - center).abs();
    }
    Ok(median_of_sorted(&mut scratch) / MAD_SCALE)
}

fn check_values(values: &[f64]) -> Result<(), StatsError> {
    if values.is_empty() {
        return Err(StatsError::Empty);
    }
    match values.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(StatsError::NonFinite { index }),
        None => Ok(()),
    }
}

// Sorts `buf` in place. Caller guarantees a non-empty, finite buffer.
fn median_of_sorted(buf: &mut [f64]) -> f64 {
    buf.sort_unstable_by(f64::total_cmp);
    let n = buf.len();
    if n % 2 == 0 {
        (buf[n / 2 - 1] + buf[n / 2]) / 2.0
    } else {
        buf[(n - 1) / 2]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn median_odd_count_is_middle_element() {
        assert_eq!(median(&[1.0, 3.0, 2.0]), Ok(2.0));
        assert_eq!(median(&[7.0]), Ok(7.0));
    }

    #[test]
    fn median_even_count_is_mean_of_central_pair() {
        assert_eq!(median(&[1.0, 2.0, 3.0, 4.0]), Ok(2.5));
        assert_eq!(median(&[4.0, -4.0]), Ok(0.0));
    }

    #[test]
    fn median_does_not_reorder_input() {
        let values = [5.0, 1.0, 4.0, 2.0, 3.0];
        let before = values;
        median(&values).expect("median");
        assert_eq!(values, before);
    }

    #[test]
    fn mad_of_constant_is_zero() {
        assert_eq!(median_absolute_deviation(&[5.0, 5.0, 5.0, 5.0]), Ok(0.0));
    }

    #[test]
    fn mad_is_scaled_by_constant() {
        let mad = median_absolute_deviation(&[1.0, 2.0, 3.0, 4.0, 5.0]).expect("mad");
        assert_relative_eq!(mad, 1.0 / 0.6745);
        assert_relative_eq!(mad, 1.4826, epsilon = 1e-4);
    }

    #[test]
    fn mad_ignores_single_outlier() {
        let mad = median_absolute_deviation(&[10.0, 10.0, 10.0, 50.0, 10.0]).expect("mad");
        assert_eq!(mad, 0.0);
    }

    #[test]
    fn empty_input_is_rejected() {
        assert_eq!(median(&[]), Err(StatsError::Empty));
        assert_eq!(median_absolute_deviation(&[]), Err(StatsError::Empty));
    }

    #[test]
    fn non_finite_input_is_rejected() {
        assert_eq!(
            median(&[1.0, f64::NAN, 3.0]),
            Err(StatsError::NonFinite { index: 1 })
        );
        assert_eq!(
            median_absolute_deviation(&[f64::INFINITY]),
            Err(StatsError::NonFinite { index: 0 })
        );
    }

    proptest! {
        #[test]
        fn median_splits_sample_in_half(values in prop::collection::vec(-1e6f64..1e6, 1..64)) {
            let m = median(&values).unwrap();
            let below = values.iter().filter(|&&v| v <= m).count();
            let above = values.iter().filter(|&&v| v >= m).count();
            prop_assert!(2 * below >= values.len());
            prop_assert!(2 * above >= values.len());
        }

        #[test]
        fn mad_is_non_negative(values in prop::collection::vec(-1e6f64..1e6, 1..64)) {
            prop_assert!(median_absolute_deviation(&values).unwrap() >= 0.0);
        }

        #[test]
        fn mad_is_shift_invariant(
            values in prop::collection::vec(-1e3f64..1e3, 1..32),
            shift in -1e3f64..1e3,
        ) {
            let shifted: Vec<f64> = values.iter().map(|v| v + shift).collect();
            let a = median_absolute_deviation(&values).unwrap();
            let b = median_absolute_deviation(&shifted).unwrap();
            prop_assert!((a - b).abs() <= 1e-6);
        }
    }
}
