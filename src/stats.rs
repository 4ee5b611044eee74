//! Descriptive statistics for a set of weight measurements.
//!
//! The mean test needs the sample mean and the Bessel-corrected sample
//! standard deviation. A single measurement has a defined mean and a standard
//! deviation of exactly zero.
//!
//! # References
//!
//! - Montgomery, D.C. (2019). *Introduction to Statistical Quality Control*, 8th ed.,
//!   Chapter 3.

use serde::Serialize;
use u_numflow::stats;

/// Mean and sample standard deviation of one measurement set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    /// Number of measurements.
    pub n: usize,
    /// Arithmetic mean.
    pub mean: f64,
    /// Sample standard deviation, divisor `n - 1`; zero when `n == 1`.
    pub std_dev: f64,
}

/// Computes mean and sample standard deviation.
///
/// # Returns
///
/// `None` if `data` is empty or contains NaN or infinity.
///
/// # Examples
///
/// ```
/// use weightcheck::stats::summarize;
///
/// let s = summarize(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
/// assert!((s.mean - 5.0).abs() < 1e-12);
/// assert!((s.std_dev - 2.138_089_935).abs() < 1e-6);
///
/// let single = summarize(&[96.0]).unwrap();
/// assert_eq!(single.std_dev, 0.0);
/// ```
pub fn summarize(data: &[f64]) -> Option<Summary> {
    if data.is_empty() || !data.iter().all(|x| x.is_finite()) {
        return None;
    }
    let mean = stats::mean(data)?;
    let std_dev = if data.len() > 1 {
        stats::std_dev(data)?
    } else {
        0.0
    };
    Some(Summary {
        n: data.len(),
        mean,
        std_dev,
    })
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn std_dev_invariant_under_reordering(
            data in proptest::collection::vec(1.0_f64..1e3, 1..=80)
        ) {
            let mut reversed = data.clone();
            reversed.reverse();
            let mut sorted = data.clone();
            sorted.sort_by(|a, b| a.partial_cmp(b).expect("finite"));

            let a = summarize(&data).expect("non-empty");
            let b = summarize(&reversed).expect("non-empty");
            let c = summarize(&sorted).expect("non-empty");
            prop_assert!((a.std_dev - b.std_dev).abs() < 1e-9);
            prop_assert!((a.std_dev - c.std_dev).abs() < 1e-9);
            prop_assert!((a.mean - c.mean).abs() < 1e-9);
        }

        #[test]
        fn mean_within_range(
            data in proptest::collection::vec(1.0_f64..1e3, 1..=80)
        ) {
            let s = summarize(&data).expect("non-empty");
            let lo = data.iter().cloned().fold(f64::INFINITY, f64::min);
            let hi = data.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            prop_assert!(s.mean >= lo - 1e-9 && s.mean <= hi + 1e-9);
            prop_assert!(s.std_dev >= 0.0);
        }
    }
}
