use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use mirrorview::launch::{LoadEvent, LoadOutcome, LoadReport, load_from_config, status_channel};
use mirrorview::model::{AppConfig, SyncRecord, ViewKind};
use mirrorview::resolver::{BootstrapOutcome, ContentResolver};
use mirrorview::store::LocalStore;
use mirrorview::{logging, shell};

use crate::{Commands, ConfigCommands};

pub(crate) fn launch_shell(data_dir: &Path, plain: bool) -> Result<()> {
    let store = LocalStore::open_or_init(data_dir)?;
    let cfg = store.read_config()?;
    let requested = if plain { ViewKind::Plain } else { cfg.view };
    let kind = shell::resolve_view_kind(requested);
    match kind {
        ViewKind::Terminal => logging::init_file(&store.log_path())?,
        _ => logging::init_stderr(),
    }
    shell::run(store, cfg, kind)
}

pub(crate) fn handle_command(data_dir: &Path, command: Commands) -> Result<()> {
    logging::init_stderr();
    match command {
        Commands::Sync { json, force } => run_sync(data_dir, json, force),
        Commands::Status { json } => show_status(data_dir, json),
        Commands::Config { command } => match command {
            ConfigCommands::Show { json } => {
                let store = LocalStore::open_or_init(data_dir)?;
                let cfg = store.read_config()?;
                if json {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&cfg).context("serialize config json")?
                    );
                } else {
                    print_config(&cfg);
                }
                Ok(())
            }
            ConfigCommands::Set {
                owner,
                repo,
                git_ref,
                api_base,
                raw_base,
                probe_url,
                bundled_dir,
            } => {
                let store = LocalStore::open_or_init(data_dir)?;
                let mut cfg = store.read_config()?;
                cfg.remote.owner = owner;
                cfg.remote.repo = repo;
                cfg.remote.git_ref = git_ref;
                if let Some(v) = api_base {
                    cfg.remote.api_base = v;
                }
                if let Some(v) = raw_base {
                    cfg.remote.raw_base = v;
                }
                if let Some(v) = probe_url {
                    cfg.remote.probe_url = v;
                }
                if bundled_dir.is_some() {
                    cfg.bundled_dir = bundled_dir;
                }
                store.write_config(&cfg)?;
                println!("Remote set to {}", cfg.remote.display_name());
                Ok(())
            }
        },
    }
}

fn print_config(cfg: &AppConfig) {
    println!("remote: {}", cfg.remote.display_name());
    println!("api_base: {}", cfg.remote.api_base);
    println!("raw_base: {}", cfg.remote.raw_base);
    println!("probe_url: {}", cfg.remote.probe_url);
    println!("entry_document: {}", cfg.entry_document);
    println!("include: {}", cfg.include.join(", "));
    if let Some(dir) = &cfg.bundled_dir {
        println!("bundled_dir: {}", dir.display());
    }
    println!("view: {:?}", cfg.view);
}

#[derive(Serialize)]
struct SyncReportJson {
    outcome: &'static str,
    status: String,
    files: Option<u64>,
    bytes: Option<u64>,
    error: Option<String>,
    bootstrap: String,
    entry_document: Option<String>,
}

impl SyncReportJson {
    fn from_report(report: &LoadReport) -> Self {
        let (outcome, files, bytes, error) = match &report.outcome {
            LoadOutcome::NotConfigured => ("not_configured", None, None, None),
            LoadOutcome::Offline => ("offline", None, None, None),
            LoadOutcome::UpToDate => ("up_to_date", None, None, None),
            LoadOutcome::Updated { files, bytes } => ("updated", Some(*files), Some(*bytes), None),
            LoadOutcome::Failed(reason) => ("failed", None, None, Some(reason.clone())),
        };
        let bootstrap = match &report.bootstrap {
            Ok(BootstrapOutcome::AlreadyPresent) => "already_present".to_string(),
            Ok(BootstrapOutcome::Seeded { files }) => format!("seeded {} files", files),
            Err(reason) => format!("failed: {}", reason),
        };
        Self {
            outcome,
            status: report.status.to_string(),
            files,
            bytes,
            error,
            bootstrap,
            entry_document: report
                .entry_document
                .as_ref()
                .map(|p| p.display().to_string()),
        }
    }
}

fn run_sync(data_dir: &Path, json: bool, force: bool) -> Result<()> {
    let store = LocalStore::open_or_init(data_dir)?;
    let cfg = store.read_config()?;
    if force {
        store.clear_signature()?;
    }
    let (publisher, events) = status_channel();

    let report = std::thread::scope(|s| {
        let worker = s.spawn(|| {
            let publisher = publisher;
            load_from_config(&store, &cfg, &publisher)
        });
        for ev in events.iter() {
            if !json && let LoadEvent::Status(status) = ev {
                eprintln!("{}", status);
            }
        }
        worker.join()
    })
    .map_err(|_| anyhow::anyhow!("load thread panicked"))?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&SyncReportJson::from_report(&report))
                .context("serialize sync report")?
        );
    } else if let Some(doc) = &report.entry_document {
        println!("{}", doc.display());
    }

    if let LoadOutcome::Failed(reason) = &report.outcome {
        anyhow::bail!("sync failed: {}", reason);
    }
    Ok(())
}

#[derive(Serialize)]
struct StatusJson {
    data_dir: String,
    remote: Option<String>,
    entry_document: Option<String>,
    revision: Option<String>,
    last_sync: Option<SyncRecord>,
}

fn show_status(data_dir: &Path, json: bool) -> Result<()> {
    let store = LocalStore::open(data_dir)?;
    let cfg = store.read_config()?;
    let resolver = ContentResolver::new(&store, &cfg.entry_document);
    let status = StatusJson {
        data_dir: store.root().display().to_string(),
        remote: cfg
            .remote
            .is_configured()
            .then(|| cfg.remote.display_name()),
        entry_document: resolver
            .resolve_entry_document()
            .map(|p| p.display().to_string()),
        revision: store.read_signature()?.map(|s| s.revision()),
        last_sync: store.read_state()?.last_sync,
    };

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&status).context("serialize status json")?
        );
        return Ok(());
    }

    println!("data_dir: {}", status.data_dir);
    println!(
        "remote: {}",
        status.remote.as_deref().unwrap_or("(not configured)")
    );
    println!(
        "entry_document: {}",
        status.entry_document.as_deref().unwrap_or("(none)")
    );
    println!(
        "revision: {}",
        status.revision.as_deref().unwrap_or("(never synced)")
    );
    if let Some(rec) = &status.last_sync {
        println!(
            "last_sync: {} ref={} files={} bytes={}",
            rec.synced_at, rec.git_ref, rec.files, rec.bytes
        );
    }
    Ok(())
}
