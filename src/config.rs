//! Inspection plan configuration.
//!
//! An [`InspectionPlan`] bundles the tables of one production line. The
//! default plan carries the built-in tables; a plan can also be read from a
//! TOML document where any omitted section keeps its default.
//!
//! ```toml
//! line = "OMORI 2"
//!
//! [[tolerances]]
//! nominal = 100
//! minimum = 95.5
//!
//! [sample_size]
//! full_inspection_max = 100
//! ceiling = 80
//! steps = [
//!     { max_quantity = 500, sample_size = 30 },
//!     { max_quantity = 3200, sample_size = 50 },
//! ]
//! ```

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;
use crate::plan::{GFactorTable, SampleSizeRule, ToleranceTable};

/// Line name used when none is configured.
pub const DEFAULT_LINE: &str = "OMORI 2";

/// Tables used to inspect lots on one production line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InspectionPlan {
    /// Production line (workstation) name, copied into archive records.
    pub line: String,
    /// Minimum tolerated weight per weight class.
    pub tolerances: ToleranceTable,
    /// Statistical factors for the mean test.
    pub g_factors: GFactorTable,
    /// Measurements per round from the declared quantity.
    pub sample_size: SampleSizeRule,
}

impl Default for InspectionPlan {
    fn default() -> Self {
        Self {
            line: DEFAULT_LINE.to_string(),
            tolerances: ToleranceTable::default(),
            g_factors: GFactorTable::default(),
            sample_size: SampleSizeRule::default(),
        }
    }
}

impl InspectionPlan {
    /// Parses and validates a plan from TOML.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] for malformed documents, or the first table
    /// invariant violated (see [`InspectionPlan::validate`]).
    ///
    /// # Examples
    ///
    /// ```
    /// use weightcheck::config::InspectionPlan;
    ///
    /// let plan = InspectionPlan::from_toml_str(r#"
    ///     line = "OMORI 3"
    ///     [[tolerances]]
    ///     nominal = 999
    ///     minimum = 984.0
    /// "#).unwrap();
    /// assert_eq!(plan.line, "OMORI 3");
    /// assert_eq!(plan.tolerances.minimum_for(999.0), Some(984.0));
    /// assert_eq!(plan.g_factors.factor(30), Some(0.239));
    /// ```
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let plan: InspectionPlan = toml::from_str(input)?;
        plan.validate()?;
        debug!(
            line = %plan.line,
            weight_classes = plan.tolerances.entries().len(),
            g_entries = plan.g_factors.entries().len(),
            "loaded inspection plan"
        );
        Ok(plan)
    }

    /// Checks table invariants.
    ///
    /// - the tolerance and g factor tables are not empty
    /// - every minimum is positive and below its nominal class
    /// - no weight class is listed twice
    /// - g sample sizes strictly increase and every factor is positive
    /// - sample-size steps strictly increase up to a positive ceiling
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tolerances.entries().is_empty() {
            return Err(ConfigError::EmptyToleranceTable);
        }
        // Without any g factor every mean test would pass unevaluated
        if self.g_factors.entries().is_empty() {
            return Err(ConfigError::EmptyFactorTable);
        }

        let mut seen = HashSet::new();
        for entry in self.tolerances.entries() {
            if !entry.minimum.is_finite()
                || entry.minimum <= 0.0
                || entry.minimum >= f64::from(entry.nominal)
            {
                return Err(ConfigError::InvalidTolerance {
                    nominal: entry.nominal,
                    minimum: entry.minimum,
                });
            }
            if !seen.insert(entry.nominal) {
                return Err(ConfigError::DuplicateWeightClass(entry.nominal));
            }
        }

        let mut prev_n = None;
        for entry in self.g_factors.entries() {
            if !(entry.g.is_finite() && entry.g > 0.0) || prev_n.is_some_and(|p| entry.n <= p) {
                return Err(ConfigError::InvalidFactorTable(entry.n));
            }
            prev_n = Some(entry.n);
        }

        self.sample_size
            .check()
            .map_err(ConfigError::InvalidSampleSizeSteps)
    }
}
