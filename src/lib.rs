//! # weightcheck
//!
//! Acceptance sampling for the net weight of packaged products on a
//! production line: a lot is accepted, rejected, or sent to a second
//! sampling round from individual weight measurements.
//!
//! The engine performs no I/O during evaluation; forms, persistence and
//! printing belong to the caller, which supplies the lot information and the
//! measurements and consumes the reports.
//!
//! ## Modules
//!
//! - [`plan`] — Tolerance table, sample-size rule, acceptance zones, g factors
//! - [`stats`] — Mean and sample standard deviation
//! - [`inspection`] — General information, lot numbers, two-round verdict engine
//! - [`archive`] — Semicolon-delimited history records
//! - [`config`] — Per-line inspection plan, loadable from TOML
//! - [`error`] — Error taxonomy
//!
//! ## Decision rule
//!
//! A unit is non-conforming when it weighs strictly less than the minimum
//! tolerated weight of its class. A sample passes the mean test when
//! `mean >= minimum + g(n) * s`. See [`inspection`] for the two-round flow.

pub mod archive;
pub mod config;
pub mod error;
pub mod inspection;
pub mod plan;
pub mod stats;

pub use error::{InspectionError, Resubmit, Result};
