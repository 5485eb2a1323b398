//! # dbox-entity
//!
//! Domain entity models for DBox. Database-backed entities come with a
//! `sqlx::FromRow` row type; where the row shape allows states the domain
//! forbids, the row is converted into the domain type with `TryFrom`.

pub mod file;
pub mod folder;
pub mod orphan;

pub use file::{File, FileRow, NewFile, TrashState};
pub use folder::Folder;
pub use orphan::OrphanBlob;
