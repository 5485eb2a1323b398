//! Scheduled background tasks for DBox.
//!
//! The only periodic task is the orphan sweep, which retries blob deletes
//! the file coordinator could not finish inline.

pub mod jobs;
pub mod scheduler;

pub use jobs::OrphanSweepJob;
pub use scheduler::CronScheduler;
