//! # dbox-service
//!
//! The file lifecycle coordinator. Every file operation touches two stores
//! that fail independently: the object store holding blob bytes and the
//! relational store holding metadata. [`FileCoordinator`] fixes the order of
//! the two writes per operation, compensates when the second write fails,
//! and serializes operations on the same file or storage key.
//!
//! Dependencies are injected at construction time as `Arc<dyn Trait>`.

pub mod file;

pub use file::{FileCoordinator, KeyedLocks, SweepReport, UploadItem};
