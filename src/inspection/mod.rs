//! Lot inspection: general information, lot numbering and the two-round
//! verdict engine.
//!
//! # Flow
//!
//! 1. [`ControlSession::new`] resolves the minimum tolerated weight and the
//!    sample size from the [`GeneralInfo`].
//! 2. [`ControlSession::first_round`] returns a [`FirstRound`]: accepted,
//!    rejected, or inconclusive with a pending [`SecondRound`].
//! 3. [`SecondRound::evaluate`] pools both rounds and always returns a
//!    [`FinalReport`].
//!
//! Each step consumes its input. A submission refused by validation hands
//! the session or pending round back in a [`Resubmit`](crate::Resubmit).

mod general;
mod lot;
mod session;

pub use general::GeneralInfo;
pub use lot::lot_number;
pub use session::{
    ControlSession, FinalReport, FirstRound, FirstRoundReport, RejectionReason, SecondRound,
    SecondRoundReport, Verdict,
};
