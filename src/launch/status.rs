use std::fmt;
use std::path::PathBuf;
use std::sync::mpsc;

/// Human-facing progress of the load sequence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadStatus {
    Starting,
    ShowingCached,
    NotConfigured { cached: bool },
    Checking,
    Offline { cached: bool },
    Fetching,
    Syncing { files: usize },
    Updated { files: u64 },
    UpToDate,
    SyncFailed { reason: String, cached: bool },
    BootstrapFailed { reason: String },
    NoContent,
}

impl LoadStatus {
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            LoadStatus::SyncFailed { .. } | LoadStatus::BootstrapFailed { .. } | LoadStatus::NoContent
        )
    }
}

impl fmt::Display for LoadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadStatus::Starting => write!(f, "Starting..."),
            LoadStatus::ShowingCached => write!(f, "Showing local copy"),
            LoadStatus::NotConfigured { cached: true } => {
                write!(f, "No remote configured - showing local copy")
            }
            LoadStatus::NotConfigured { cached: false } => {
                write!(f, "No remote configured and no local copy")
            }
            LoadStatus::Checking => write!(f, "Checking connectivity..."),
            LoadStatus::Offline { cached: true } => write!(f, "Offline - showing cached copy"),
            LoadStatus::Offline { cached: false } => {
                write!(f, "Offline - no local copy available")
            }
            LoadStatus::Fetching => write!(f, "Checking for updates..."),
            LoadStatus::Syncing { files } => write!(f, "Downloading {} files...", files),
            LoadStatus::Updated { files } => write!(f, "Updated ({} files)", files),
            LoadStatus::UpToDate => write!(f, "Already up to date"),
            LoadStatus::SyncFailed { reason, cached: true } => {
                write!(f, "Update failed, showing cached copy: {}", reason)
            }
            LoadStatus::SyncFailed {
                reason,
                cached: false,
            } => write!(f, "Update failed: {}", reason),
            LoadStatus::BootstrapFailed { reason } => {
                write!(f, "No content available: {}", reason)
            }
            LoadStatus::NoContent => write!(f, "No content available"),
        }
    }
}

/// Where the entry document lives, tagged with the content revision so a
/// changed tree yields a changed location.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentLocation {
    pub path: PathBuf,
    pub revision: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadEvent {
    Status(LoadStatus),
    Document(DocumentLocation),
    Finished,
}

/// Write side of the status channel. Owned by the background load.
#[derive(Clone)]
pub struct StatusPublisher {
    tx: mpsc::Sender<LoadEvent>,
}

impl StatusPublisher {
    pub fn status(&self, status: LoadStatus) {
        // A closed view is not the loader's problem.
        let _ = self.tx.send(LoadEvent::Status(status));
    }

    pub fn document(&self, location: DocumentLocation) {
        let _ = self.tx.send(LoadEvent::Document(location));
    }

    pub fn finished(&self) {
        let _ = self.tx.send(LoadEvent::Finished);
    }
}

pub fn status_channel() -> (StatusPublisher, mpsc::Receiver<LoadEvent>) {
    let (tx, rx) = mpsc::channel();
    (StatusPublisher { tx }, rx)
}
