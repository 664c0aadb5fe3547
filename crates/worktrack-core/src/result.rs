//! Convenience result type alias for WorkTrack.

use crate::error::AppError;

/// A specialized `Result` type for WorkTrack operations.
pub type AppResult<T> = Result<T, AppError>;
