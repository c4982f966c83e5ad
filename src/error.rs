//! Failure taxonomy for the load sequence.
//!
//! Being offline is not an error; the load sequence routes around it.

use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("remote manifest unavailable")]
    ManifestUnavailable(#[source] BoxError),

    #[error("failed to download {path}")]
    DownloadFailed {
        path: String,
        #[source]
        source: BoxError,
    },

    #[error("sync failed")]
    SyncFailed(#[source] BoxError),

    #[error("bootstrap from bundled content failed")]
    BootstrapFailed(#[source] BoxError),
}

impl SyncError {
    pub fn manifest(err: impl Into<BoxError>) -> Self {
        SyncError::ManifestUnavailable(err.into())
    }

    pub fn download(path: &str, err: impl Into<BoxError>) -> Self {
        SyncError::DownloadFailed {
            path: path.to_string(),
            source: err.into(),
        }
    }

    pub fn sync(err: impl Into<BoxError>) -> Self {
        SyncError::SyncFailed(err.into())
    }

    pub fn bootstrap(err: impl Into<BoxError>) -> Self {
        SyncError::BootstrapFailed(err.into())
    }

    /// Full cause chain on one line, for status text and logs.
    pub fn chain(&self) -> String {
        let mut out = self.to_string();
        let mut cur = std::error::Error::source(self);
        while let Some(err) = cur {
            out.push_str(": ");
            out.push_str(&err.to_string());
            cur = err.source();
        }
        out
    }
}
