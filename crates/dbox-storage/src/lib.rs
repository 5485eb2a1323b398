//! # dbox-storage
//!
//! Object store implementations for DBox: local filesystem, S3-compatible
//! object storage, and a process-local memory store.

pub mod factory;
pub mod providers;

pub use factory::build_object_store;
