use std::time::Duration;

use anyhow::{Context, Result};

use crate::error::SyncError;
use crate::model::{AppConfig, RemoteConfig, RemoteFileEntry, RemoteManifest};

mod content;
mod filter;
mod http_client;
mod manifest;
mod probe;
mod types;

pub use self::filter::ManifestFilter;

pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);
pub const MANIFEST_TIMEOUT: Duration = Duration::from_secs(20);
pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Answers "should we attempt a sync at all". Never fails.
pub trait ConnectivityProbe {
    fn probe(&self) -> bool;
}

/// Where manifests and file content come from.
pub trait RemoteSource {
    fn fetch_manifest(&self) -> Result<RemoteManifest, SyncError>;

    fn download(&self, entry: &RemoteFileEntry) -> Result<Vec<u8>, SyncError>;
}

/// Client for GitHub-style hosting: a tree-listing API plus raw content by path.
pub struct RemoteClient {
    remote: RemoteConfig,
    filter: ManifestFilter,
    client: reqwest::blocking::Client,
}

impl RemoteClient {
    pub fn new(remote: RemoteConfig, filter: ManifestFilter) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("mirrorview/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("build reqwest client")?;
        Ok(Self {
            remote,
            filter,
            client,
        })
    }

    pub fn from_config(cfg: &AppConfig) -> Result<Self> {
        if !cfg.remote.is_configured() {
            anyhow::bail!(
                "no remote configured (run `mirrorview config set --owner ... --repo ...`)"
            );
        }
        let filter = ManifestFilter::new(&cfg.entry_document, &cfg.include)?;
        Self::new(cfg.remote.clone(), filter)
    }
}

impl ConnectivityProbe for RemoteClient {
    fn probe(&self) -> bool {
        probe::probe_url(&self.client, &self.remote.probe_url, PROBE_TIMEOUT)
    }
}

impl RemoteSource for RemoteClient {
    fn fetch_manifest(&self) -> Result<RemoteManifest, SyncError> {
        self.fetch_tree_manifest().map_err(SyncError::manifest)
    }

    fn download(&self, entry: &RemoteFileEntry) -> Result<Vec<u8>, SyncError> {
        self.download_raw(&entry.path)
            .map_err(|err| SyncError::download(&entry.path, err))
    }
}
