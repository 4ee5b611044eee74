//! Inspection plan tables.
//!
//! Everything the verdict engine looks up lives here.
//!
//! - [`ToleranceTable`] — minimum tolerated weight per nominal weight class
//! - [`SampleSizeRule`] — measurements per round from the declared quantity
//! - [`ZonePolicy`] — accept / second round / reject thresholds on the
//!   non-conforming count, and the combined tolerance after two rounds
//! - [`GFactorTable`] — statistical factor for the sample-mean test
//!
//! # References
//!
//! - OIML R 87 — Quantity of product in prepackages.
//! - Council Directive 76/211/EEC, Annex II — reference method for checking
//!   batches of prepackages.

mod g_factor;
mod sample_size;
mod tolerance;
mod zones;

pub use g_factor::{GFactorEntry, GFactorTable, MeanTest};
pub use sample_size::{SampleSizeRule, SampleStep};
pub use tolerance::{ToleranceEntry, ToleranceTable};
pub use zones::{
    CertifiedZonePolicy, CombinedTolerance, StandardZonePolicy, Zone, ZonePolicy, ZoneSource,
    ZoneThresholds,
};
