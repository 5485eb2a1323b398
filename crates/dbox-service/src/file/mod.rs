//! File lifecycle operations.

pub mod coordinator;
pub mod guard;
pub mod locks;
pub mod naming;
pub mod reconcile;
pub mod upload;

pub use coordinator::FileCoordinator;
pub use locks::KeyedLocks;
pub use reconcile::SweepReport;
pub use upload::UploadItem;
