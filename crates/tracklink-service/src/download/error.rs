//! Outcomes that stop a download before any byte is sent.

use thiserror::Error;

use tracklink_core::error::{AppError, ErrorKind};
use tracklink_proxy::FetchError;

/// Why a download request was refused or failed.
///
/// The display strings are the client-facing messages.
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("Link not found")]
    NotFound,

    #[error("Link is inactive")]
    Inactive,

    #[error("Link has expired")]
    Expired,

    #[error("Download limit reached")]
    LimitReached,

    #[error("Failed to fetch file")]
    FetchFailed(#[source] FetchError),

    #[error("Download timeout")]
    Timeout(#[source] FetchError),

    #[error(transparent)]
    Store(#[from] AppError),
}

impl From<FetchError> for DownloadError {
    fn from(err: FetchError) -> Self {
        if err.is_timeout() {
            Self::Timeout(err)
        } else {
            Self::FetchFailed(err)
        }
    }
}

impl From<DownloadError> for AppError {
    fn from(err: DownloadError) -> Self {
        let message = err.to_string();
        match err {
            DownloadError::NotFound => AppError::not_found(message),
            DownloadError::Inactive | DownloadError::Expired | DownloadError::LimitReached => {
                AppError::rejected(message)
            }
            DownloadError::FetchFailed(source) => {
                AppError::with_source(ErrorKind::ExternalService, message, source)
            }
            DownloadError::Timeout(source) => {
                AppError::with_source(ErrorKind::Timeout, message, source)
            }
            DownloadError::Store(inner) => inner,
        }
    }
}
