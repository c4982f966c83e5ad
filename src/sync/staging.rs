use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::warn;

use crate::store::LocalStore;

/// Directory that new content is downloaded into before promotion.
///
/// Removed on drop unless it was promoted.
pub(crate) struct StagingRoot {
    path: PathBuf,
    armed: bool,
}

impl StagingRoot {
    pub(crate) fn create(store: &LocalStore) -> Result<Self> {
        let path = store.new_staging_dir();
        fs::create_dir_all(&path)
            .with_context(|| format!("create staging dir {}", path.display()))?;
        Ok(Self { path, armed: true })
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn write_file(&self, rel: &str, bytes: &[u8]) -> Result<()> {
        let path = crate::path_ops::safe_join(&self.path, rel)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create dir {}", parent.display()))?;
        }
        fs::write(&path, bytes).with_context(|| format!("write file {}", path.display()))
    }

    pub(crate) fn create_dir(&self, rel: &str) -> Result<()> {
        let path = crate::path_ops::safe_join(&self.path, rel)?;
        fs::create_dir_all(&path).with_context(|| format!("create dir {}", path.display()))
    }

    /// Called once the directory has been renamed into place.
    pub(crate) fn promoted(mut self) {
        self.armed = false;
    }
}

impl Drop for StagingRoot {
    fn drop(&mut self) {
        if !self.armed || !self.path.exists() {
            return;
        }
        if let Err(err) = fs::remove_dir_all(&self.path) {
            warn!(path = %self.path.display(), error = %err, "failed to remove staging dir");
        }
    }
}
