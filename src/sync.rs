//! Content synchronizer: signature check, staged download, promotion.

use anyhow::Context;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::{debug, info, warn};

use crate::error::SyncError;
use crate::model::{EntryKind, RemoteManifest, SyncRecord, SyncSignature};
use crate::remote::RemoteSource;
use crate::store::LocalStore;

pub mod promote;
pub(crate) mod staging;

use self::staging::StagingRoot;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncOutcome {
    Updated { files: u64, bytes: u64 },
    UpToDate,
}

pub struct Synchronizer<'a> {
    store: &'a LocalStore,
    remote: &'a dyn RemoteSource,
    git_ref: String,
}

impl<'a> Synchronizer<'a> {
    pub fn new(store: &'a LocalStore, remote: &'a dyn RemoteSource, git_ref: &str) -> Self {
        Self {
            store,
            remote,
            git_ref: git_ref.to_string(),
        }
    }

    /// Bring the live root in line with `manifest`.
    ///
    /// On error the live root is left exactly as it was.
    pub fn sync(&self, manifest: &RemoteManifest) -> Result<SyncOutcome, SyncError> {
        let signature = manifest.signature();
        let previous = match self.store.read_signature() {
            Ok(sig) => sig,
            Err(err) => {
                warn!(error = %format!("{:#}", err), "unreadable signature; treating as never synced");
                None
            }
        };

        if previous.as_ref() == Some(&signature) && self.store.site_dir().is_dir() {
            info!("local content already matches remote manifest");
            return Ok(SyncOutcome::UpToDate);
        }

        let (files, bytes) = self.stage_and_promote(manifest)?;
        self.persist(&signature, files, bytes);
        info!(files, bytes, "applied remote content");
        Ok(SyncOutcome::Updated { files, bytes })
    }

    fn stage_and_promote(&self, manifest: &RemoteManifest) -> Result<(u64, u64), SyncError> {
        let staging = StagingRoot::create(self.store).map_err(SyncError::sync)?;

        let mut files = 0u64;
        let mut bytes = 0u64;
        for entry in manifest.entries() {
            match entry.kind {
                EntryKind::Tree => {
                    staging.create_dir(&entry.path).map_err(SyncError::sync)?;
                }
                EntryKind::Blob => {
                    let content = self.remote.download(entry).map_err(SyncError::sync)?;
                    staging
                        .write_file(&entry.path, &content)
                        .map_err(|err| {
                            SyncError::sync(err.context(format!("write staged file {}", entry.path)))
                        })?;
                    debug!(path = %entry.path, bytes = content.len(), "staged");
                    files += 1;
                    bytes += content.len() as u64;
                }
            }
        }

        promote::promote(
            staging.path(),
            &self.store.site_dir(),
            &self.store.backup_dir(),
        )
        .context("promote staged content")
        .map_err(SyncError::sync)?;
        staging.promoted();
        Ok((files, bytes))
    }

    fn persist(&self, signature: &SyncSignature, files: u64, bytes: u64) {
        if let Err(err) = self.store.write_signature(signature) {
            warn!(error = %format!("{:#}", err), "content promoted but signature not saved");
            return;
        }
        let synced_at = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_else(|_| "unknown".to_string());
        let record = SyncRecord {
            synced_at,
            git_ref: self.git_ref.clone(),
            files,
            bytes,
        };
        if let Err(err) = self.store.set_last_sync(record) {
            warn!(error = %format!("{:#}", err), "failed to record sync in state.json");
        }
    }
}
