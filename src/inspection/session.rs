//! Two-round verdict engine.
//!
//! # Algorithm
//!
//! First round, `n` measurements:
//!
//! 1. Count non-conforming units (strictly below the minimum tolerated weight).
//! 2. Look up `(accept_max, refuse_min)` for `n`.
//! 3. Run the mean test `mean >= m + g(n) * s`.
//! 4. Accept if `nc <= accept_max` and the mean test passes; otherwise reject
//!    if `nc >= refuse_min`; otherwise a second round is required.
//!
//! Second round, another `n` measurements pooled with the first:
//!
//! 1. Total non-conforming = first-round count + second-round count.
//! 2. Mean test on the pooled `2n` measurements.
//! 3. Accept if the total is within the combined tolerance for `n` per round
//!    and the pooled mean test passes, otherwise reject. Always final.
//!
//! A [`SecondRound`] can only be obtained from [`FirstRound::Inconclusive`],
//! and its evaluation yields a [`FinalReport`], so a third round cannot be
//! expressed. Both the session and the pending round are consumed by their
//! evaluation; a refused submission returns them inside [`Resubmit`].
//!
//! # Examples
//!
//! ```
//! use chrono::NaiveDate;
//! use weightcheck::config::InspectionPlan;
//! use weightcheck::inspection::{ControlSession, FirstRound, GeneralInfo};
//!
//! let plan = InspectionPlan::default();
//! let info = GeneralInfo {
//!     operator: "A. Martin".into(),
//!     product: "TOP doux".into(),
//!     manufacture_date: NaiveDate::from_ymd_opt(2025, 11, 20),
//!     packaging_date: NaiveDate::from_ymd_opt(2025, 11, 25),
//!     embossing_day: Some(24),
//!     product_weight: 100.0,
//!     theoretical_quantity: 400,
//!     lot_override: None,
//! };
//! let session = ControlSession::new(&plan, info).unwrap();
//! assert_eq!(session.sample_size(), 30);
//!
//! match session.first_round(&[96.0; 30]).unwrap() {
//!     FirstRound::Accepted(report) => assert!(report.is_accepted()),
//!     other => panic!("expected acceptance, got {other:?}"),
//! }
//! ```

use std::fmt;

use serde::Serialize;
use tracing::{debug, info, warn};

use super::general::GeneralInfo;
use crate::config::InspectionPlan;
use crate::error::{FieldIssue, FieldIssues, InspectionError, Resubmit, Result, Round};
use crate::plan::{
    CombinedTolerance, MeanTest, StandardZonePolicy, ToleranceTable, Zone, ZonePolicy, ZoneSource,
    ZoneThresholds,
};
use crate::stats::{summarize, Summary};

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// Figures computed for the first round.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FirstRoundReport {
    /// Measurements in entry order.
    pub measurements: Vec<f64>,
    /// Mean and standard deviation.
    pub summary: Summary,
    /// Units strictly below the minimum tolerated weight.
    pub non_conforming: usize,
    /// Thresholds used for the classification.
    pub zones: ZoneThresholds,
    /// Zone of `non_conforming`.
    pub zone: Zone,
    /// Mean test on the first-round sample.
    pub mean_test: MeanTest,
}

/// Figures computed for the second round.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SecondRoundReport {
    /// Second-round measurements in entry order.
    pub measurements: Vec<f64>,
    /// Non-conforming units in the second round alone.
    pub non_conforming: usize,
    /// Statistics over both rounds pooled.
    pub pooled: Summary,
    /// Non-conforming units over both rounds.
    pub total_non_conforming: usize,
    /// Maximum total allowed over both rounds.
    pub combined: CombinedTolerance,
    /// Mean test on the pooled sample.
    pub mean_test: MeanTest,
}

/// Why a lot was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RejectionReason {
    /// Too many non-conforming units.
    NonConforming,
    /// Mean too close to the minimum tolerated weight.
    MeanTest,
    /// Both criteria failed.
    NonConformingAndMeanTest,
}

/// Final decision on a lot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Verdict {
    /// Lot accepted.
    Accepted,
    /// Lot rejected and must be blocked.
    Rejected(RejectionReason),
}

/// Terminal outcome of an inspection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinalReport {
    /// Accepted or rejected.
    pub verdict: Verdict,
    /// Round in which the verdict fell.
    pub decided_in: Round,
    /// Production line of the plan used.
    pub line: String,
    /// Lot metadata.
    pub info: GeneralInfo,
    /// Minimum tolerated weight used.
    pub minimum: f64,
    /// Measurements per round.
    pub sample_size: usize,
    /// First-round figures.
    pub first: FirstRoundReport,
    /// Second-round figures, when a second round took place.
    pub second: Option<SecondRoundReport>,
}

impl FinalReport {
    /// Whether the lot was accepted.
    pub fn is_accepted(&self) -> bool {
        self.verdict == Verdict::Accepted
    }

    /// Pooled mean after two rounds, else the first-round mean.
    pub fn overall_mean(&self) -> f64 {
        self.second
            .as_ref()
            .map_or(self.first.summary.mean, |s| s.pooled.mean)
    }

    /// Total non-conforming count after two rounds, else the first-round count.
    pub fn total_non_conforming(&self) -> usize {
        self.second
            .as_ref()
            .map_or(self.first.non_conforming, |s| s.total_non_conforming)
    }
}

impl fmt::Display for FinalReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.verdict, self.decided_in) {
            (Verdict::Accepted, Round::First) => f.write_str("Lot accepted at first round"),
            (Verdict::Accepted, Round::Second) => f.write_str("Lot accepted after second round"),
            (Verdict::Rejected(_), Round::First) => {
                f.write_str("Lot REJECTED at first round - STOP")
            }
            (Verdict::Rejected(_), Round::Second) => {
                f.write_str("Lot REJECTED after second round - STOP")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Inspection of a single lot.
///
/// Created once the weight class and declared quantity are known; the
/// minimum tolerated weight and the sample size are fixed at that point.
/// The first round consumes the session, so a lot is evaluated once.
/// Starting a new lot means creating another session.
///
/// ```compile_fail
/// use weightcheck::config::InspectionPlan;
/// use weightcheck::inspection::{ControlSession, GeneralInfo};
///
/// let plan = InspectionPlan::default();
/// let info = GeneralInfo {
///     product_weight: 100.0,
///     theoretical_quantity: 400,
///     ..GeneralInfo::default()
/// };
/// let session = ControlSession::new(&plan, info).unwrap();
/// let _ = session.first_round(&[96.0; 30]);
/// let _ = session.first_round(&[96.0; 30]); // session already consumed
/// ```
#[derive(Debug)]
pub struct ControlSession<'p, P: ZonePolicy = StandardZonePolicy> {
    plan: &'p InspectionPlan,
    policy: P,
    info: GeneralInfo,
    weight_class: i64,
    minimum: f64,
    sample_size: usize,
}

impl<'p> ControlSession<'p, StandardZonePolicy> {
    /// Opens a session with the standard zone policy.
    ///
    /// # Errors
    ///
    /// - [`InspectionError::InvalidFields`] if the product weight is not positive
    /// - [`InspectionError::UndefinedTolerance`] if the weight class has no minimum
    /// - [`InspectionError::SampleSizeNotReady`] if the theoretical quantity is 0
    pub fn new(plan: &'p InspectionPlan, info: GeneralInfo) -> Result<Self> {
        Self::with_policy(plan, info, StandardZonePolicy)
    }
}

impl<'p, P: ZonePolicy> ControlSession<'p, P> {
    /// Opens a session with an explicit zone policy.
    pub fn with_policy(plan: &'p InspectionPlan, info: GeneralInfo, policy: P) -> Result<Self> {
        let weight = info.product_weight;
        if !(weight.is_finite() && weight > 0.0) {
            return Err(InspectionError::InvalidFields(FieldIssues(vec![
                FieldIssue::NonPositiveWeight(weight),
            ])));
        }
        let weight_class = ToleranceTable::weight_class(weight);
        let minimum = plan
            .tolerances
            .minimum_for(weight)
            .ok_or(InspectionError::UndefinedTolerance { weight_class })?;
        let sample_size = plan
            .sample_size
            .sample_size(info.theoretical_quantity)
            .ok_or(InspectionError::SampleSizeNotReady)?;

        debug!(
            line = %plan.line,
            weight_class,
            minimum,
            quantity = info.theoretical_quantity,
            sample_size,
            "control session opened"
        );

        Ok(Self {
            plan,
            policy,
            info,
            weight_class,
            minimum,
            sample_size,
        })
    }

    /// Lot metadata.
    pub fn info(&self) -> &GeneralInfo {
        &self.info
    }

    /// Plan the session runs against.
    pub fn plan(&self) -> &InspectionPlan {
        self.plan
    }

    /// Rounded weight class in grams.
    pub fn weight_class(&self) -> i64 {
        self.weight_class
    }

    /// Minimum tolerated individual weight in grams.
    pub fn minimum(&self) -> f64 {
        self.minimum
    }

    /// Measurements required per round.
    pub fn sample_size(&self) -> usize {
        self.sample_size
    }

    /// Whether an entered value is a non-conforming unit.
    ///
    /// Zero means "not measured yet" and is never flagged.
    pub fn is_non_conforming(&self, value: f64) -> bool {
        value > 0.0 && value < self.minimum
    }

    /// Evaluates the first round, consuming the session.
    ///
    /// # Errors
    ///
    /// The session comes back inside [`Resubmit`] with one of:
    ///
    /// - [`InspectionError::InvalidFields`] listing every missing general field
    /// - [`InspectionError::IncompleteMeasurements`] if `values.len()` differs
    ///   from the sample size
    /// - [`InspectionError::InvalidMeasurement`] for the first value that is
    ///   not strictly positive
    /// - [`InspectionError::ZonesUndefined`] if the zone policy has no
    ///   thresholds for the sample size
    pub fn first_round(
        self,
        values: &[f64],
    ) -> std::result::Result<FirstRound<'p, P>, Resubmit<Self>> {
        match self.assess_first_round(values) {
            Ok(report) => Ok(self.decide_first_round(report)),
            Err(error) => Err(Resubmit::new(self, error)),
        }
    }

    fn assess_first_round(&self, values: &[f64]) -> Result<FirstRoundReport> {
        self.info.validate()?;
        let summary = self.check_measurements(Round::First, values)?;

        let non_conforming = self.count_non_conforming(values);
        let zones = self
            .policy
            .first_round(values.len())
            .ok_or(InspectionError::ZonesUndefined {
                sample_size: values.len(),
            })?;
        if zones.source == ZoneSource::Heuristic {
            warn!(
                sample_size = values.len(),
                accept_max = zones.accept_max,
                refuse_min = zones.refuse_min,
                "no certified zones for this sample size, using heuristic thresholds"
            );
        }
        let zone = zones.classify(non_conforming);
        let mean_test = self.mean_test(&summary);

        debug!(
            mean = summary.mean,
            std_dev = summary.std_dev,
            non_conforming,
            ?zone,
            ?mean_test,
            "first round evaluated"
        );

        Ok(FirstRoundReport {
            measurements: values.to_vec(),
            summary,
            non_conforming,
            zones,
            zone,
            mean_test,
        })
    }

    fn decide_first_round(self, report: FirstRoundReport) -> FirstRound<'p, P> {
        let non_conforming = report.non_conforming;
        let mean_passed = report.mean_test.passed();
        if non_conforming <= report.zones.accept_max && mean_passed {
            FirstRound::Accepted(self.conclude(Verdict::Accepted, Round::First, report, None))
        } else if non_conforming >= report.zones.refuse_min {
            let verdict = Verdict::Rejected(RejectionReason::NonConforming);
            FirstRound::Rejected(self.conclude(verdict, Round::First, report, None))
        } else {
            info!(
                lot = %self.info.lot(),
                non_conforming,
                mean_test_passed = mean_passed,
                "first round inconclusive, second round required"
            );
            FirstRound::Inconclusive(SecondRound {
                session: self,
                first: report,
            })
        }
    }

    fn check_measurements(&self, round: Round, values: &[f64]) -> Result<Summary> {
        if values.len() != self.sample_size {
            return Err(InspectionError::IncompleteMeasurements {
                round,
                expected: self.sample_size,
                entered: values.len(),
            });
        }
        if let Some((index, &value)) = values
            .iter()
            .enumerate()
            .find(|(_, v)| !(v.is_finite() && **v > 0.0))
        {
            return Err(InspectionError::InvalidMeasurement {
                round,
                index,
                value,
            });
        }
        summarize(values).ok_or(InspectionError::IncompleteMeasurements {
            round,
            expected: self.sample_size,
            entered: 0,
        })
    }

    fn count_non_conforming(&self, values: &[f64]) -> usize {
        values.iter().filter(|&&v| v < self.minimum).count()
    }

    fn mean_test(&self, summary: &Summary) -> MeanTest {
        let test = self.plan.g_factors.mean_test(summary, self.minimum);
        if test == MeanTest::NotEvaluable {
            warn!(
                n = summary.n,
                "no g factor for this sample size, mean test skipped and counted as passed"
            );
        }
        test
    }

    fn conclude(
        self,
        verdict: Verdict,
        decided_in: Round,
        first: FirstRoundReport,
        second: Option<SecondRoundReport>,
    ) -> FinalReport {
        let report = FinalReport {
            verdict,
            decided_in,
            line: self.plan.line.clone(),
            info: self.info,
            minimum: self.minimum,
            sample_size: self.sample_size,
            first,
            second,
        };
        info!(
            lot = %report.info.lot(),
            product = %report.info.product,
            verdict = ?report.verdict,
            round = %decided_in,
            total_non_conforming = report.total_non_conforming(),
            overall_mean = report.overall_mean(),
            "{report}"
        );
        report
    }
}

// ---------------------------------------------------------------------------
// Round outcomes
// ---------------------------------------------------------------------------

/// Outcome of the first round.
#[derive(Debug)]
pub enum FirstRound<'p, P: ZonePolicy = StandardZonePolicy> {
    /// Accepted at the first round.
    Accepted(FinalReport),
    /// Rejected at the first round.
    Rejected(FinalReport),
    /// Between the zones, or within the acceptance zone with a failed mean
    /// test: a second round is required.
    Inconclusive(SecondRound<'p, P>),
}

impl<P: ZonePolicy> FirstRound<'_, P> {
    /// First-round figures, whatever the outcome.
    pub fn report(&self) -> &FirstRoundReport {
        match self {
            FirstRound::Accepted(r) | FirstRound::Rejected(r) => &r.first,
            FirstRound::Inconclusive(second) => &second.first,
        }
    }

    /// The final report if the first round was decisive.
    pub fn into_final(self) -> Option<FinalReport> {
        match self {
            FirstRound::Accepted(r) | FirstRound::Rejected(r) => Some(r),
            FirstRound::Inconclusive(_) => None,
        }
    }
}

/// Pending second round of an inconclusive lot.
///
/// Owns the session and the first-round figures. Evaluating it consumes it,
/// so a lot receives exactly one final report:
///
/// ```compile_fail
/// use weightcheck::config::InspectionPlan;
/// use weightcheck::inspection::{ControlSession, FirstRound, GeneralInfo};
///
/// let plan = InspectionPlan::default();
/// let info = GeneralInfo {
///     product_weight: 100.0,
///     theoretical_quantity: 400,
///     ..GeneralInfo::default()
/// };
/// let session = ControlSession::new(&plan, info).unwrap();
/// if let Ok(FirstRound::Inconclusive(pending)) = session.first_round(&[96.0; 30]) {
///     let _ = pending.evaluate(&[95.0; 30]);
///     let _ = pending.evaluate(&[97.0; 30]); // pending round already consumed
/// }
/// ```
#[derive(Debug)]
pub struct SecondRound<'p, P: ZonePolicy = StandardZonePolicy> {
    session: ControlSession<'p, P>,
    first: FirstRoundReport,
}

impl<'p, P: ZonePolicy> SecondRound<'p, P> {
    /// First-round figures.
    pub fn first(&self) -> &FirstRoundReport {
        &self.first
    }

    /// Session the round belongs to.
    pub fn session(&self) -> &ControlSession<'p, P> {
        &self.session
    }

    /// Measurements required for the second round.
    pub fn sample_size(&self) -> usize {
        self.session.sample_size
    }

    /// Evaluates the second round against the pooled sample.
    ///
    /// The verdict is always final. A refused submission hands the pending
    /// round back inside [`Resubmit`] so corrected measurements can be
    /// submitted again.
    ///
    /// # Errors
    ///
    /// - [`InspectionError::IncompleteMeasurements`] / [`InspectionError::InvalidMeasurement`]
    ///   for the second-round values
    /// - [`InspectionError::ZonesUndefined`] if the policy has no combined
    ///   tolerance for the per-round size
    pub fn evaluate(self, values: &[f64]) -> std::result::Result<FinalReport, Resubmit<Self>> {
        match self.assess(values) {
            Ok((verdict, second)) => {
                let SecondRound { session, first } = self;
                Ok(session.conclude(verdict, Round::Second, first, Some(second)))
            }
            Err(error) => Err(Resubmit::new(self, error)),
        }
    }

    fn assess(&self, values: &[f64]) -> Result<(Verdict, SecondRoundReport)> {
        let session = &self.session;
        session.check_measurements(Round::Second, values)?;

        let non_conforming = session.count_non_conforming(values);
        let total_non_conforming = self.first.non_conforming + non_conforming;
        let combined = session
            .policy
            .combined_tolerance(session.sample_size)
            .ok_or(InspectionError::ZonesUndefined {
                sample_size: session.sample_size,
            })?;
        if combined.source == ZoneSource::Heuristic {
            warn!(
                per_round = session.sample_size,
                max_non_conforming = combined.max_non_conforming,
                "no certified combined tolerance for this sample size, using heuristic"
            );
        }

        let pooled_values: Vec<f64> = self
            .first
            .measurements
            .iter()
            .chain(values)
            .copied()
            .collect();
        let pooled = summarize(&pooled_values).ok_or(InspectionError::IncompleteMeasurements {
            round: Round::Second,
            expected: session.sample_size,
            entered: 0,
        })?;
        let mean_test = session.mean_test(&pooled);

        debug!(
            pooled_n = pooled.n,
            pooled_mean = pooled.mean,
            pooled_std_dev = pooled.std_dev,
            total_non_conforming,
            max_non_conforming = combined.max_non_conforming,
            ?mean_test,
            "second round evaluated"
        );

        let count_ok = total_non_conforming <= combined.max_non_conforming;
        let verdict = match (count_ok, mean_test.passed()) {
            (true, true) => Verdict::Accepted,
            (false, true) => Verdict::Rejected(RejectionReason::NonConforming),
            (true, false) => Verdict::Rejected(RejectionReason::MeanTest),
            (false, false) => Verdict::Rejected(RejectionReason::NonConformingAndMeanTest),
        };

        Ok((
            verdict,
            SecondRoundReport {
                measurements: values.to_vec(),
                non_conforming,
                pooled,
                total_non_conforming,
                combined,
                mean_test,
            },
        ))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
