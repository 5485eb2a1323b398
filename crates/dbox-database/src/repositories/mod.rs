//! PostgreSQL repositories implementing the metadata store traits.

pub mod file;
pub mod folder;
pub mod orphan;

use std::sync::Arc;

use sqlx::PgPool;

use dbox_core::error::{AppError, ErrorKind};

pub use file::FileRepository;
pub use folder::FolderRepository;
pub use orphan::OrphanRepository;

/// The repositories sharing one pool.
#[derive(Debug, Clone)]
pub struct Repositories {
    pub files: Arc<FileRepository>,
    pub folders: Arc<FolderRepository>,
    pub orphans: Arc<OrphanRepository>,
}

impl Repositories {
    /// Create all repositories over `pool`.
    pub fn new(pool: PgPool) -> Self {
        Self {
            files: Arc::new(FileRepository::new(pool.clone())),
            folders: Arc::new(FolderRepository::new(pool.clone())),
            orphans: Arc::new(OrphanRepository::new(pool)),
        }
    }
}

/// Map a sqlx error raised by a read.
pub(crate) fn read_error(context: &str, err: sqlx::Error) -> AppError {
    AppError::with_source(ErrorKind::MetadataReadFailed, context, err)
}

/// Map a sqlx error raised by a write. Unique violations become conflicts.
pub(crate) fn write_error(context: &str, err: sqlx::Error) -> AppError {
    let unique = err
        .as_database_error()
        .is_some_and(|db| db.is_unique_violation());
    let kind = if unique {
        ErrorKind::Conflict
    } else {
        ErrorKind::MetadataWriteFailed
    };
    AppError::with_source(kind, context, err)
}
