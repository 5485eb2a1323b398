//! Convenience result type alias for DBox.

use crate::error::AppError;

/// A specialized `Result` type for DBox operations.
pub type AppResult<T> = Result<T, AppError>;
