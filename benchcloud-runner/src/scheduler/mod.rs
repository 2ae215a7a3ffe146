//! Scheduler layer for the runner
//!
//! Submission and cancellation fan out over a bounded worker pool; the
//! lifecycle tracker polls outstanding runs from a single control flow.

pub mod cancellation;
pub mod pool;
pub mod submission;
pub mod tracker;

pub use cancellation::{CancellationCoordinator, StopSummary};
pub use submission::SubmissionCoordinator;
pub use tracker::LifecycleTracker;
