//! # Sample jobs.
//!
//! Ready-made [`Job`](crate::Job) variants, useful for demos and tests. Each one
//! composes a [`JobState`](crate::JobState) (plus [`Cadence`] when it repeats)
//! rather than building on another sample.
//!
//! | Job               | Runs             | Notes                                          |
//! |-------------------|------------------|------------------------------------------------|
//! | [`OneShotJob`]    | once             | optional sleep, records start/finish instants  |
//! | [`PeriodicJob`]   | forever          | `work` then `pause`, counts launches           |
//! | [`SequentialJob`] | once             | reports progress after each stage              |
//! | [`PrimeCalcJob`]  | once             | never auto-retired, required by checkers       |
//! | [`PrimeCheckJob`] | once             | requires a [`PrimeCalcJob`]                    |
//! | [`AlternatingJob`]| forever, in pair | ready only while its partner is idle           |

mod alternating;
mod cadence;
mod one_shot;
mod periodic;
mod primes;
mod sequential;

pub use alternating::AlternatingJob;
pub use cadence::Cadence;
pub use one_shot::OneShotJob;
pub use periodic::PeriodicJob;
pub use primes::{PrimeCalcJob, PrimeCheck, PrimeCheckJob};
pub use sequential::SequentialJob;
