//! Single-elimination bracket logic for cup competitions.
//!
//! `bracket`, `aggregate`, `round` and `progression` are pure functions over
//! fixtures. `engine` reads and writes them through a `FixtureStore`.

pub mod aggregate;
pub mod bracket;
pub mod engine;
pub mod progression;
pub mod round;

pub use aggregate::{score, Aggregate, SlotVerdict};
pub use bracket::{BracketError, BracketShape};
pub use engine::{BracketView, KnockoutEngine, ProgressReport, UnresolvedSlot};
pub use progression::advance;
pub use round::{evaluate_round, is_round_complete, RoundSummary, SlotSummary};
