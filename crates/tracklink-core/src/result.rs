//! Convenience result type alias for TrackLink.

use crate::error::AppError;

/// A specialized `Result` type for TrackLink operations.
pub type AppResult<T> = Result<T, AppError>;
