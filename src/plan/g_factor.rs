//! Statistical factor `g` and the sample-mean test.
//!
//! The mean of the sample must reach `m + g(n) * s`, where `m` is the
//! minimum tolerated weight and `s` the sample standard deviation. `g`
//! shrinks with the sample size; it corresponds to a one-sided risk of 10 %.
//!
//! For a size missing from the table the factor of the largest tabulated
//! size not above `n` is used. Below the smallest tabulated size there is no
//! factor and the test cannot be evaluated.

use serde::{Deserialize, Serialize};

use crate::stats::Summary;

/// Factors for n = 2..=50, index 0 corresponds to n = 2.
const G_SMALL: [f64; 49] = [
    2.176, 1.089, 0.819, 0.686, 0.603, 0.544, 0.500, 0.466, 0.437, 0.414, 0.394, 0.376, 0.361,
    0.347, 0.335, 0.324, 0.314, 0.305, 0.297, 0.289, 0.282, 0.275, 0.269, 0.264, 0.258, 0.253,
    0.248, 0.244, 0.239, 0.235, 0.231, 0.228, 0.224, 0.221, 0.218, 0.215, 0.212, 0.209, 0.206,
    0.204, 0.201, 0.199, 0.196, 0.194, 0.192, 0.190, 0.188, 0.186, 0.184,
];

/// Factors beyond 50, tabulated every 5 measurements.
const G_LARGE: [(usize, f64); 6] = [
    (55, 0.175),
    (60, 0.167),
    (65, 0.161),
    (70, 0.155),
    (75, 0.149),
    (80, 0.144),
];

/// One row of the g table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GFactorEntry {
    /// Sample size.
    pub n: usize,
    /// Factor applied to the standard deviation.
    pub g: f64,
}

/// Sample size to g factor, sorted by strictly increasing `n`.
///
/// # Examples
///
/// ```
/// use weightcheck::plan::GFactorTable;
///
/// let table = GFactorTable::default();
/// assert_eq!(table.factor(30), Some(0.239));
/// assert_eq!(table.factor(57), Some(0.175)); // falls back to n = 55
/// assert_eq!(table.factor(500), Some(0.144)); // falls back to n = 80
/// assert_eq!(table.factor(1), None);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GFactorTable {
    entries: Vec<GFactorEntry>,
}

impl GFactorTable {
    /// Builds a table; entries are sorted by `n`.
    pub fn new(mut entries: Vec<GFactorEntry>) -> Self {
        entries.sort_by_key(|e| e.n);
        Self { entries }
    }

    /// Factor for `n`: exact match, else the largest key `<= n`, else `None`.
    pub fn factor(&self, n: usize) -> Option<f64> {
        let idx = self.entries.partition_point(|e| e.n <= n);
        idx.checked_sub(1).map(|i| self.entries[i].g)
    }

    /// Smallest sample size with a defined factor.
    pub fn smallest_size(&self) -> Option<usize> {
        self.entries.first().map(|e| e.n)
    }

    /// All entries in increasing `n`.
    pub fn entries(&self) -> &[GFactorEntry] {
        &self.entries
    }

    /// Runs the mean test for a sample summary against `minimum`.
    pub fn mean_test(&self, summary: &Summary, minimum: f64) -> MeanTest {
        match self.factor(summary.n) {
            Some(g) => {
                let threshold = minimum + g * summary.std_dev;
                MeanTest::Evaluated {
                    g,
                    threshold,
                    passed: summary.mean >= threshold,
                }
            }
            None => MeanTest::NotEvaluable,
        }
    }
}

impl Default for GFactorTable {
    fn default() -> Self {
        let small = G_SMALL
            .iter()
            .enumerate()
            .map(|(i, &g)| GFactorEntry { n: i + 2, g });
        let large = G_LARGE.iter().map(|&(n, g)| GFactorEntry { n, g });
        Self {
            entries: small.chain(large).collect(),
        }
    }
}

/// Outcome of the sample-mean test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MeanTest {
    /// A factor was available and the threshold computed.
    Evaluated {
        /// Factor used.
        g: f64,
        /// Required mean, `m + g * s`.
        threshold: f64,
        /// `mean >= threshold`.
        passed: bool,
    },
    /// No factor for a sample this small.
    ///
    /// Counts as passing; see [`MeanTest::passed`].
    NotEvaluable,
}

impl MeanTest {
    /// Whether the test lets the lot through.
    ///
    /// [`MeanTest::NotEvaluable`] does not block acceptance.
    pub fn passed(&self) -> bool {
        match self {
            MeanTest::Evaluated { passed, .. } => *passed,
            MeanTest::NotEvaluable => true,
        }
    }

    /// Factor used, if any.
    pub fn g(&self) -> Option<f64> {
        match self {
            MeanTest::Evaluated { g, .. } => Some(*g),
            MeanTest::NotEvaluable => None,
        }
    }

    /// Required mean, if computed.
    pub fn threshold(&self) -> Option<f64> {
        match self {
            MeanTest::Evaluated { threshold, .. } => Some(*threshold),
            MeanTest::NotEvaluable => None,
        }
    }
}
