//! File domain entities.

pub mod model;
pub mod state;

pub use model::{File, FileRow, NewFile};
pub use state::TrashState;
