//! Error types for the inspection engine.
//!
//! Pure table lookups return `Option`; the session layer turns a missing value
//! into one of the variants below so the caller always learns which input
//! blocked the evaluation.

use std::fmt;

use thiserror::Error;

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, InspectionError>;

/// Sampling round a measurement error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum Round {
    /// First sampling round.
    First,
    /// Second sampling round, only reachable from an inconclusive first round.
    Second,
}

impl fmt::Display for Round {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Round::First => f.write_str("first round"),
            Round::Second => f.write_str("second round"),
        }
    }
}

/// A single general-information field that failed validation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldIssue {
    /// Operator name is empty.
    #[error("operator name is required")]
    MissingOperator,
    /// No product selected.
    #[error("a product must be selected")]
    MissingProduct,
    /// Manufacture date not given.
    #[error("manufacture date is required")]
    MissingManufactureDate,
    /// Packaging date not given.
    #[error("packaging date is required")]
    MissingPackagingDate,
    /// Packaging year has no three-digit lot year code (2000..=2999).
    #[error("packaging date {0} is outside the years 2000 to 2999 covered by lot numbers")]
    PackagingDateOutOfRange(chrono::NaiveDate),
    /// Embossing day missing or outside 1..=31.
    #[error("embossing day must be between 1 and 31, got {0:?}")]
    InvalidEmbossingDay(Option<u8>),
    /// Product weight is zero, negative or not finite.
    #[error("product weight must be strictly greater than 0 g, got {0}")]
    NonPositiveWeight(f64),
    /// Theoretical quantity is zero.
    #[error("theoretical produced quantity must be strictly greater than 0")]
    NonPositiveQuantity,
    /// Actual produced quantity is zero (archival only).
    #[error("actual produced quantity must be strictly greater than 0")]
    NonPositiveActualQuantity,
}

/// Every field issue found in one validation pass.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FieldIssues(pub Vec<FieldIssue>);

impl FieldIssues {
    /// Returns `true` when no issue was recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the recorded issues in detection order.
    pub fn iter(&self) -> impl Iterator<Item = &FieldIssue> {
        self.0.iter()
    }

    /// Returns `true` if `issue` was recorded.
    pub fn contains(&self, issue: &FieldIssue) -> bool {
        self.0.contains(issue)
    }
}

impl fmt::Display for FieldIssues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, issue) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

/// Problems found while loading or checking an [`InspectionPlan`](crate::config::InspectionPlan).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The TOML document could not be parsed.
    #[error("invalid plan document: {0}")]
    Parse(#[from] toml::de::Error),
    /// The tolerance table has no entry.
    #[error("tolerance table must define at least one weight class")]
    EmptyToleranceTable,
    /// The g factor table has no entry, which would disable the mean test.
    #[error("g factor table must define at least one sample size")]
    EmptyFactorTable,
    /// A tolerance entry is inconsistent.
    #[error("tolerance for {nominal} g: minimum {minimum} g must be > 0 and below the nominal weight")]
    InvalidTolerance {
        /// Nominal weight class.
        nominal: u32,
        /// Configured minimum.
        minimum: f64,
    },
    /// The same weight class appears twice.
    #[error("weight class {0} g is defined more than once")]
    DuplicateWeightClass(u32),
    /// g table keys are not strictly increasing or a factor is not positive.
    #[error("g factor table must have strictly increasing sample sizes and positive factors (at n = {0})")]
    InvalidFactorTable(usize),
    /// Sample-size steps are not strictly increasing, or the ceiling is 0 or
    /// below the last step.
    #[error("sample-size steps must be strictly increasing up to a positive ceiling (at quantity {0})")]
    InvalidSampleSizeSteps(u64),
}

/// Errors raised by the inspection engine and its ambient layers.
#[derive(Debug, Error)]
pub enum InspectionError {
    /// One or more general-information fields are missing or invalid.
    #[error("invalid general information: {0}")]
    InvalidFields(FieldIssues),

    /// Fewer or more measurements than the required sample size.
    #[error("{round}: {entered} measurements entered, {expected} required")]
    IncompleteMeasurements {
        /// Round being evaluated.
        round: Round,
        /// Required sample size.
        expected: usize,
        /// Number of values supplied.
        entered: usize,
    },

    /// A measurement is zero, negative or not finite.
    #[error("{round}: measurement #{} must be strictly positive, got {value}", .index + 1)]
    InvalidMeasurement {
        /// Round being evaluated.
        round: Round,
        /// Zero-based position in the round.
        index: usize,
        /// Rejected value.
        value: f64,
    },

    /// The weight class is not in the tolerance table.
    #[error("weight class {weight_class} g is not defined in the tolerance table")]
    UndefinedTolerance {
        /// Rounded weight class that was looked up.
        weight_class: i64,
    },

    /// Declared quantity is zero, so no sample size can be derived.
    #[error("declared quantity must be > 0 before a sample size can be computed")]
    SampleSizeNotReady,

    /// The zone policy has no thresholds for this sample size.
    #[error("no certified acceptance zones for a sample of {sample_size}")]
    ZonesUndefined {
        /// Realized sample count.
        sample_size: usize,
    },

    /// Plan configuration error.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Archive CSV error.
    #[error("archive write failed: {0}")]
    Archive(#[from] csv::Error),

    /// Archive file error.
    #[error("archive file error: {0}")]
    Io(#[from] std::io::Error),
}

/// A submission refused by validation, handing back the state it was made
/// against so corrected measurements can be submitted again.
///
/// Converts into [`InspectionError`] with `?`, dropping the state.
#[derive(Debug)]
pub struct Resubmit<S> {
    state: S,
    error: InspectionError,
}

impl<S> Resubmit<S> {
    pub(crate) fn new(state: S, error: InspectionError) -> Self {
        Self { state, error }
    }

    /// Why the submission was refused.
    pub fn error(&self) -> &InspectionError {
        &self.error
    }

    /// The unchanged session or pending round.
    pub fn into_state(self) -> S {
        self.state
    }

    /// State and error.
    pub fn into_parts(self) -> (S, InspectionError) {
        (self.state, self.error)
    }
}

impl<S> fmt::Display for Resubmit<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.error, f)
    }
}

impl<S: fmt::Debug> std::error::Error for Resubmit<S> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

impl<S> From<Resubmit<S>> for InspectionError {
    fn from(refused: Resubmit<S>) -> Self {
        refused.error
    }
}
