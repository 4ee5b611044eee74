//! Acceptance zones on the number of non-conforming units.
//!
//! A first-round sample is classified by its non-conforming count against a
//! pair `(accept_max, refuse_min)`:
//!
//! | Count                          | Zone         |
//! |--------------------------------|--------------|
//! | `<= accept_max`                | accept       |
//! | `accept_max < c < refuse_min`  | second round |
//! | `>= refuse_min`                | reject       |
//!
//! After a second round the total count over both rounds is compared with a
//! single combined tolerance.
//!
//! Certified values exist only for 30, 50 and 80 measurements per round.
//! [`StandardZonePolicy`] extends them to other sizes with a coarse step
//! heuristic that has no certification behind it; [`CertifiedZonePolicy`]
//! refuses those sizes instead. Both sit behind [`ZonePolicy`] so the
//! heuristic can be replaced without touching the verdict engine.

use serde::Serialize;

/// Certified first-round zones, `(sample size, accept_max, refuse_min)`.
const CERTIFIED_FIRST_ROUND: [(usize, usize, usize); 3] = [(30, 0, 2), (50, 1, 3), (80, 1, 4)];

/// Certified combined tolerance after two rounds, `(per-round size, max NC)`.
///
/// Totals of 60, 100 and 160 measurements respectively.
const CERTIFIED_COMBINED: [(usize, usize); 3] = [(30, 1), (50, 2), (80, 3)];

/// Where a set of thresholds comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ZoneSource {
    /// Taken from the certified sampling table.
    Certified,
    /// Derived by the fallback heuristic for a non-tabulated size.
    Heuristic,
}

/// Classification of a non-conforming count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Zone {
    /// Count within the acceptance limit.
    Accept,
    /// Count between the limits: a second round is required.
    Inconclusive,
    /// Count at or beyond the rejection limit.
    Reject,
}

/// First-round thresholds for one sample size.
///
/// # Invariants
///
/// - `accept_max < refuse_min`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ZoneThresholds {
    /// Largest non-conforming count that still accepts.
    pub accept_max: usize,
    /// Smallest non-conforming count that rejects outright.
    pub refuse_min: usize,
    /// Certified table or heuristic fallback.
    pub source: ZoneSource,
}

impl ZoneThresholds {
    /// Classifies a non-conforming count.
    ///
    /// # Examples
    ///
    /// ```
    /// use weightcheck::plan::{StandardZonePolicy, Zone, ZonePolicy};
    ///
    /// let zones = StandardZonePolicy.first_round(30).unwrap();
    /// assert_eq!(zones.classify(0), Zone::Accept);
    /// assert_eq!(zones.classify(1), Zone::Inconclusive);
    /// assert_eq!(zones.classify(2), Zone::Reject);
    /// ```
    pub fn classify(&self, non_conforming: usize) -> Zone {
        if non_conforming <= self.accept_max {
            Zone::Accept
        } else if non_conforming >= self.refuse_min {
            Zone::Reject
        } else {
            Zone::Inconclusive
        }
    }
}

/// Combined tolerance after two rounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CombinedTolerance {
    /// Maximum total non-conforming count across both rounds.
    pub max_non_conforming: usize,
    /// Certified table or heuristic fallback.
    pub source: ZoneSource,
}

/// Source of acceptance zones for the verdict engine.
pub trait ZonePolicy {
    /// First-round thresholds for a realized sample count, or `None` if the
    /// policy has no value for it.
    fn first_round(&self, sample_size: usize) -> Option<ZoneThresholds>;

    /// Total non-conforming units allowed over both rounds, keyed by the
    /// per-round sample size.
    fn combined_tolerance(&self, per_round: usize) -> Option<CombinedTolerance>;
}

/// Certified table, with the heuristic fallback for other sizes.
///
/// Fallback (not certified):
///
/// | Size      | accept_max | refuse_min | combined |
/// |-----------|------------|------------|----------|
/// | < 30      | 0          | 2          | max(1, n / 40) |
/// | 30..50    | 1          | 3          | max(1, n / 40) |
/// | 50..80    | 2          | 4          | max(1, n / 40) |
/// | >= 80     | 3          | 5          | max(1, n / 40) |
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardZonePolicy;

/// Certified table only; any other size is undefined.
#[derive(Debug, Clone, Copy, Default)]
pub struct CertifiedZonePolicy;

fn certified_first_round(sample_size: usize) -> Option<ZoneThresholds> {
    CERTIFIED_FIRST_ROUND
        .iter()
        .find(|&&(n, _, _)| n == sample_size)
        .map(|&(_, accept_max, refuse_min)| ZoneThresholds {
            accept_max,
            refuse_min,
            source: ZoneSource::Certified,
        })
}

fn certified_combined(per_round: usize) -> Option<CombinedTolerance> {
    CERTIFIED_COMBINED
        .iter()
        .find(|&&(n, _)| n == per_round)
        .map(|&(_, max_non_conforming)| CombinedTolerance {
            max_non_conforming,
            source: ZoneSource::Certified,
        })
}

impl ZonePolicy for StandardZonePolicy {
    fn first_round(&self, sample_size: usize) -> Option<ZoneThresholds> {
        certified_first_round(sample_size).or_else(|| {
            let (accept_max, refuse_min) = match sample_size {
                0..=29 => (0, 2),
                30..=49 => (1, 3),
                50..=79 => (2, 4),
                _ => (3, 5),
            };
            Some(ZoneThresholds {
                accept_max,
                refuse_min,
                source: ZoneSource::Heuristic,
            })
        })
    }

    fn combined_tolerance(&self, per_round: usize) -> Option<CombinedTolerance> {
        certified_combined(per_round).or(Some(CombinedTolerance {
            max_non_conforming: (per_round / 40).max(1),
            source: ZoneSource::Heuristic,
        }))
    }
}

impl ZonePolicy for CertifiedZonePolicy {
    fn first_round(&self, sample_size: usize) -> Option<ZoneThresholds> {
        certified_first_round(sample_size)
    }

    fn combined_tolerance(&self, per_round: usize) -> Option<CombinedTolerance> {
        certified_combined(per_round)
    }
}
