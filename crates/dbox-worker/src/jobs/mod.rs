//! Job implementations run by the scheduler.

pub mod orphan_sweep;

pub use orphan_sweep::OrphanSweepJob;
