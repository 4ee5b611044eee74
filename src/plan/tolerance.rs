//! Minimum tolerated individual weight per nominal weight class.
//!
//! A unit weighing strictly less than the minimum of its class is a
//! non-conforming unit (TU1). Classes are integer grams; a product weight is
//! rounded to the nearest gram, halves to even, before the lookup. Classes that are not in the
//! table have no minimum: the lookup says so instead of guessing.

use serde::{Deserialize, Serialize};

/// Built-in tolerance table of the line, `(nominal g, minimum g)`.
const DEFAULT_TOLERANCES: [(u32, f64); 14] = [
    (50, 45.5),
    (70, 65.5),
    (85, 80.5),
    (100, 95.5),
    (120, 114.6),
    (150, 143.3),
    (180, 171.9),
    (200, 191.0),
    (225, 216.0),
    (250, 241.0),
    (500, 485.0),
    (700, 685.0),
    (800, 785.0),
    (1000, 985.0),
];

/// One row of the tolerance table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToleranceEntry {
    /// Nominal weight class in grams.
    pub nominal: u32,
    /// Minimum tolerated individual weight in grams.
    pub minimum: f64,
}

/// Static mapping from weight class to minimum tolerated weight.
///
/// # Examples
///
/// ```
/// use weightcheck::plan::ToleranceTable;
///
/// let table = ToleranceTable::default();
/// assert_eq!(table.minimum_for(100.0), Some(95.5));
/// assert_eq!(table.minimum_for(99.6), Some(95.5)); // rounds to 100 g
/// assert_eq!(table.minimum_for(999.0), None);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToleranceTable {
    entries: Vec<ToleranceEntry>,
}

impl ToleranceTable {
    /// Builds a table from explicit entries.
    pub fn new(entries: Vec<ToleranceEntry>) -> Self {
        Self { entries }
    }

    /// Rounds a product weight to its integer weight class.
    ///
    /// Halves round to the even gram: 100.5 g is class 100, 84.5 g is
    /// class 84.
    pub fn weight_class(weight: f64) -> i64 {
        weight.round_ties_even() as i64
    }

    /// Minimum tolerated weight for `weight`, or `None` if its class is not
    /// defined or the weight is not a positive finite number.
    pub fn minimum_for(&self, weight: f64) -> Option<f64> {
        if !weight.is_finite() || weight <= 0.0 {
            return None;
        }
        let class = Self::weight_class(weight);
        self.entries
            .iter()
            .find(|e| i64::from(e.nominal) == class)
            .map(|e| e.minimum)
    }

    /// All entries in table order.
    pub fn entries(&self) -> &[ToleranceEntry] {
        &self.entries
    }
}

impl Default for ToleranceTable {
    fn default() -> Self {
        Self::new(
            DEFAULT_TOLERANCES
                .iter()
                .map(|&(nominal, minimum)| ToleranceEntry { nominal, minimum })
                .collect(),
        )
    }
}
