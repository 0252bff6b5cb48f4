pub mod diff;
pub mod reconcile;
pub mod sync;

#[cfg(test)]
mod fakes;

pub use diff::{diff_history, diff_ratings, diff_watchlist, Diff};
pub use reconcile::{Reconciler, StageCounts};
pub use sync::{Stage, StagePlan, StageReport, SyncOrchestrator, SyncReport};
