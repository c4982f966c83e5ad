//! The one-shot load sequence: bootstrap, resolve, probe, fetch, sync, resolve.

use std::path::PathBuf;
use std::thread::JoinHandle;

use anyhow::Result;
use tracing::{info, warn};

use crate::error::SyncError;
use crate::model::AppConfig;
use crate::remote::{ConnectivityProbe, RemoteClient, RemoteSource};
use crate::resolver::{BootstrapOutcome, ContentResolver, default_bundled_dir};
use crate::store::LocalStore;
use crate::sync::{SyncOutcome, Synchronizer};

mod once;
mod status;

pub use self::once::{OneShot, spawn_once};
pub use self::status::{DocumentLocation, LoadEvent, LoadStatus, StatusPublisher, status_channel};

static LOAD_ONCE: OneShot = OneShot::new();

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    NotConfigured,
    Offline,
    UpToDate,
    Updated { files: u64, bytes: u64 },
    Failed(String),
}

#[derive(Clone, Debug)]
pub struct LoadReport {
    pub outcome: LoadOutcome,
    pub bootstrap: Result<BootstrapOutcome, String>,
    pub entry_document: Option<PathBuf>,
    pub status: LoadStatus,
}

/// Remote endpoints used by a load; absent when no remote is configured.
#[derive(Clone, Copy)]
pub struct Endpoints<'a> {
    pub probe: &'a dyn ConnectivityProbe,
    pub source: &'a dyn RemoteSource,
}

pub struct LoadPlan {
    pub entry_document: String,
    pub bundled_dir: PathBuf,
    pub git_ref: String,
}

impl LoadPlan {
    pub fn from_config(cfg: &AppConfig) -> Self {
        Self {
            entry_document: cfg.entry_document.clone(),
            bundled_dir: cfg.bundled_dir.clone().unwrap_or_else(default_bundled_dir),
            git_ref: cfg.remote.git_ref.clone(),
        }
    }
}

/// Run the whole sequence. Never fails: every problem degrades to whatever
/// local content exists and is reported through `publisher`.
pub fn run_load(
    store: &LocalStore,
    endpoints: Option<Endpoints<'_>>,
    plan: &LoadPlan,
    publisher: &StatusPublisher,
) -> LoadReport {
    publisher.status(LoadStatus::Starting);
    match store.remove_stale_staging() {
        Ok(0) => {}
        Ok(n) => info!(removed = n, "removed stale staging directories"),
        Err(err) => warn!(error = %format!("{:#}", err), "failed to sweep staging directories"),
    }

    let resolver = ContentResolver::new(store, &plan.entry_document);
    let bootstrap = resolver
        .ensure_local_content_exists(&plan.bundled_dir)
        .map_err(|err| {
            let reason = err.chain();
            warn!(error = %reason, "bootstrap failed");
            publisher.status(LoadStatus::BootstrapFailed {
                reason: reason.clone(),
            });
            reason
        });

    let before = resolver.resolve_entry_document();
    let cached = before.is_some();
    if let Some(path) = &before {
        publish_document(store, publisher, path.clone());
        publisher.status(LoadStatus::ShowingCached);
    }

    let outcome = match endpoints {
        None => {
            info!("no remote configured; skipping sync");
            LoadOutcome::NotConfigured
        }
        Some(ep) => sync_with_remote(store, ep, plan, publisher),
    };

    let after = resolver.resolve_entry_document();
    if let Some(path) = &after
        && (before.as_ref() != Some(path) || matches!(outcome, LoadOutcome::Updated { .. }))
    {
        publish_document(store, publisher, path.clone());
    }

    let status = final_status(&outcome, cached, after.is_some(), bootstrap.as_ref().err());
    info!(status = %status, "load finished");
    publisher.status(status.clone());
    publisher.finished();

    LoadReport {
        outcome,
        bootstrap,
        entry_document: after,
        status,
    }
}

fn sync_with_remote(
    store: &LocalStore,
    ep: Endpoints<'_>,
    plan: &LoadPlan,
    publisher: &StatusPublisher,
) -> LoadOutcome {
    publisher.status(LoadStatus::Checking);
    if !ep.probe.probe() {
        info!("offline; using local content");
        return LoadOutcome::Offline;
    }

    publisher.status(LoadStatus::Fetching);
    let manifest = match ep.source.fetch_manifest() {
        Ok(m) => m,
        Err(err) => return failed(err),
    };

    publisher.status(LoadStatus::Syncing {
        files: manifest.len(),
    });
    match Synchronizer::new(store, ep.source, &plan.git_ref).sync(&manifest) {
        Ok(SyncOutcome::UpToDate) => LoadOutcome::UpToDate,
        Ok(SyncOutcome::Updated { files, bytes }) => LoadOutcome::Updated { files, bytes },
        Err(err) => failed(err),
    }
}

fn failed(err: SyncError) -> LoadOutcome {
    let reason = err.chain();
    warn!(error = %reason, "sync failed; keeping local content");
    LoadOutcome::Failed(reason)
}

fn final_status(
    outcome: &LoadOutcome,
    cached: bool,
    has_document: bool,
    bootstrap_err: Option<&String>,
) -> LoadStatus {
    if !has_document && let Some(reason) = bootstrap_err {
        return LoadStatus::BootstrapFailed {
            reason: reason.clone(),
        };
    }
    let status = match outcome {
        LoadOutcome::NotConfigured => LoadStatus::NotConfigured { cached },
        LoadOutcome::Offline => LoadStatus::Offline { cached },
        LoadOutcome::UpToDate => LoadStatus::UpToDate,
        LoadOutcome::Updated { files, .. } => LoadStatus::Updated { files: *files },
        LoadOutcome::Failed(reason) => LoadStatus::SyncFailed {
            reason: reason.clone(),
            cached: has_document,
        },
    };
    if !has_document && !status.is_error() && !matches!(status, LoadStatus::Offline { .. }) {
        return LoadStatus::NoContent;
    }
    status
}

fn publish_document(store: &LocalStore, publisher: &StatusPublisher, path: PathBuf) {
    let revision = store
        .read_signature()
        .ok()
        .flatten()
        .map(|sig| sig.revision());
    publisher.document(DocumentLocation { path, revision });
}

/// Run [`run_load`] for `cfg` on a background thread, at most once per process.
pub fn start_background_load(
    store: LocalStore,
    cfg: AppConfig,
    publisher: StatusPublisher,
) -> Result<Option<JoinHandle<LoadReport>>> {
    spawn_once(&LOAD_ONCE, "mirrorview-load", move || {
        load_from_config(&store, &cfg, &publisher)
    })
}

/// Build the remote client from `cfg` and run the load sequence in the
/// calling thread.
pub fn load_from_config(
    store: &LocalStore,
    cfg: &AppConfig,
    publisher: &StatusPublisher,
) -> LoadReport {
    let plan = LoadPlan::from_config(cfg);
    if !cfg.remote.is_configured() {
        return run_load(store, None, &plan, publisher);
    }
    match RemoteClient::from_config(cfg) {
        Ok(client) => {
            let ep = Endpoints {
                probe: &client,
                source: &client,
            };
            run_load(store, Some(ep), &plan, publisher)
        }
        Err(err) => {
            warn!(error = %format!("{:#}", err), "invalid remote configuration");
            let mut report = run_load(store, None, &plan, publisher);
            let reason = format!("{:#}", err);
            report.status = LoadStatus::SyncFailed {
                reason: reason.clone(),
                cached: report.entry_document.is_some(),
            };
            report.outcome = LoadOutcome::Failed(reason);
            publisher.status(report.status.clone());
            report
        }
    }
}
