//! Local content resolution and first-run seeding from bundled defaults.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use crate::error::SyncError;
use crate::store::LocalStore;
use crate::sync::promote;
use crate::sync::staging::StagingRoot;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BootstrapOutcome {
    AlreadyPresent,
    Seeded { files: u64 },
}

pub struct ContentResolver<'a> {
    store: &'a LocalStore,
    entry_document: String,
}

impl<'a> ContentResolver<'a> {
    pub fn new(store: &'a LocalStore, entry_document: &str) -> Self {
        Self {
            store,
            entry_document: entry_document.to_string(),
        }
    }

    pub fn resolve_entry_document(&self) -> Option<PathBuf> {
        let path = crate::path_ops::safe_join(&self.store.site_dir(), &self.entry_document).ok()?;
        path.is_file().then_some(path)
    }

    /// Seed the live root from `bundled_dir` unless it already holds an entry
    /// document. Never touches a populated root.
    pub fn ensure_local_content_exists(
        &self,
        bundled_dir: &Path,
    ) -> Result<BootstrapOutcome, SyncError> {
        promote::recover_interrupted(&self.store.site_dir(), &self.store.backup_dir())
            .map_err(SyncError::bootstrap)?;
        if self.resolve_entry_document().is_some() {
            return Ok(BootstrapOutcome::AlreadyPresent);
        }
        let files = self.seed_from(bundled_dir).map_err(SyncError::bootstrap)?;
        info!(files, from = %bundled_dir.display(), "seeded local content from bundled defaults");
        Ok(BootstrapOutcome::Seeded { files })
    }

    fn seed_from(&self, bundled_dir: &Path) -> Result<u64> {
        if !bundled_dir.is_dir() {
            anyhow::bail!("bundled content not found at {}", bundled_dir.display());
        }
        if !bundled_dir.join(&self.entry_document).is_file() {
            anyhow::bail!(
                "bundled content at {} has no {}",
                bundled_dir.display(),
                self.entry_document
            );
        }

        let staging = StagingRoot::create(self.store)?;
        let files = copy_tree(bundled_dir, staging.path())?;
        promote::promote(
            staging.path(),
            &self.store.site_dir(),
            &self.store.backup_dir(),
        )?;
        staging.promoted();
        // Bundled content is not any remote revision.
        self.store.clear_signature()?;
        Ok(files)
    }
}

/// Default location of bundled content: `bundled/` next to the executable.
pub fn default_bundled_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|p| p.join("bundled")))
        .unwrap_or_else(|| PathBuf::from("bundled"))
}

fn copy_tree(from: &Path, to: &Path) -> Result<u64> {
    let mut files = 0;
    for entry in fs::read_dir(from).with_context(|| format!("read dir {}", from.display()))? {
        let entry = entry?;
        let src = entry.path();
        let dst = to.join(entry.file_name());
        let ft = entry.file_type()?;
        if ft.is_dir() {
            fs::create_dir_all(&dst).with_context(|| format!("create dir {}", dst.display()))?;
            files += copy_tree(&src, &dst)?;
        } else if ft.is_file() {
            fs::copy(&src, &dst)
                .with_context(|| format!("copy {} -> {}", src.display(), dst.display()))?;
            files += 1;
        }
    }
    Ok(files)
}
