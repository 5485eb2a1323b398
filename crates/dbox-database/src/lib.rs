//! # dbox-database
//!
//! Metadata store for DBox: the store traits the coordinator is written
//! against, PostgreSQL connection management, migrations, and the sqlx
//! repositories implementing the traits.

pub mod connection;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use store::{FileStore, FolderStore, OrphanStore};
