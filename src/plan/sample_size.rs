//! Required sample count per round as a step function of declared quantity.
//!
//! | Declared quantity | Measurements per round |
//! |-------------------|------------------------|
//! | 1..=100           | every unit             |
//! | 101..=500         | 30                     |
//! | 501..=3200        | 50                     |
//! | > 3200            | 80                     |

use serde::{Deserialize, Serialize};

/// One step of the rule: quantities up to `max_quantity` need `sample_size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleStep {
    /// Inclusive upper bound on the declared quantity.
    pub max_quantity: u64,
    /// Measurements required per round.
    pub sample_size: usize,
}

/// Step function mapping declared quantity to sample size.
///
/// Monotonically non-decreasing in quantity with a fixed ceiling for very
/// large lots.
///
/// # Examples
///
/// ```
/// use weightcheck::plan::SampleSizeRule;
///
/// let rule = SampleSizeRule::default();
/// assert_eq!(rule.sample_size(42), Some(42));
/// assert_eq!(rule.sample_size(500), Some(30));
/// assert_eq!(rule.sample_size(3500), Some(80));
/// assert_eq!(rule.sample_size(0), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SampleSizeRule {
    /// Quantities up to this bound are inspected at 100 %.
    pub full_inspection_max: u64,
    /// Intermediate steps, strictly increasing in both fields.
    pub steps: Vec<SampleStep>,
    /// Sample size for quantities beyond the last step.
    pub ceiling: usize,
}

impl SampleSizeRule {
    /// Required measurements per round, or `None` when `quantity == 0`.
    pub fn sample_size(&self, quantity: u64) -> Option<usize> {
        if quantity == 0 {
            return None;
        }
        if quantity <= self.full_inspection_max {
            return usize::try_from(quantity).ok();
        }
        let size = self
            .steps
            .iter()
            .find(|step| quantity <= step.max_quantity)
            .map_or(self.ceiling, |step| step.sample_size);
        Some(size)
    }

    /// Checks that steps increase strictly in quantity and size and that the
    /// ceiling is positive and not below the last step.
    ///
    /// Returns the first offending quantity bound.
    pub fn check(&self) -> Result<(), u64> {
        let mut prev_qty = self.full_inspection_max;
        let mut prev_size = 0usize;
        for step in &self.steps {
            if step.max_quantity <= prev_qty || step.sample_size <= prev_size {
                return Err(step.max_quantity);
            }
            prev_qty = step.max_quantity;
            prev_size = step.sample_size;
        }
        if self.ceiling == 0 || self.ceiling < prev_size {
            return Err(prev_qty);
        }
        Ok(())
    }
}

impl Default for SampleSizeRule {
    fn default() -> Self {
        Self {
            full_inspection_max: 100,
            steps: vec![
                SampleStep {
                    max_quantity: 500,
                    sample_size: 30,
                },
                SampleStep {
                    max_quantity: 3200,
                    sample_size: 50,
                },
            ],
            ceiling: 80,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundaries() {
        let rule = SampleSizeRule::default();
        assert_eq!(rule.sample_size(1), Some(1));
        assert_eq!(rule.sample_size(100), Some(100));
        assert_eq!(rule.sample_size(101), Some(30));
        assert_eq!(rule.sample_size(500), Some(30));
        assert_eq!(rule.sample_size(501), Some(50));
        assert_eq!(rule.sample_size(3200), Some(50));
        assert_eq!(rule.sample_size(3201), Some(80));
        assert_eq!(rule.sample_size(u64::MAX), Some(80));
    }

    #[test]
    fn test_zero_is_not_ready() {
        assert_eq!(SampleSizeRule::default().sample_size(0), None);
    }

    #[test]
    fn test_default_rule_is_consistent() {
        assert!(SampleSizeRule::default().check().is_ok());
    }

    #[test]
    fn test_check_rejects_unordered_steps() {
        let rule = SampleSizeRule {
            full_inspection_max: 100,
            steps: vec![
                SampleStep {
                    max_quantity: 3200,
                    sample_size: 50,
                },
                SampleStep {
                    max_quantity: 500,
                    sample_size: 30,
                },
            ],
            ceiling: 80,
        };
        assert_eq!(rule.check(), Err(500));
    }

    #[test]
    fn test_check_rejects_zero_ceiling() {
        let rule = SampleSizeRule {
            full_inspection_max: 100,
            steps: Vec::new(),
            ceiling: 0,
        };
        assert_eq!(rule.sample_size(101), Some(0));
        assert_eq!(rule.check(), Err(100));
    }
}
