use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::{Context, Result, anyhow};

use crate::model::{AppConfig, CONFIG_VERSION};

mod state_meta;

const CONFIG_FILE: &str = "config.json";
const STATE_FILE: &str = "state.json";
const SIGNATURE_FILE: &str = "signature";
const LOG_FILE: &str = "mirrorview.log";
const SITE_DIR: &str = "site";
const BACKUP_DIR: &str = "site.backup";
const STAGING_PREFIX: &str = ".staging-";

pub const DATA_DIR_ENV: &str = "MIRRORVIEW_DATA_DIR";

static STAGING_SEQ: AtomicU64 = AtomicU64::new(0);

/// Application-private data directory.
///
/// ```text
/// <root>/config.json
/// <root>/state.json
/// <root>/signature      fingerprint of the last applied manifest
/// <root>/site/          served content (live root)
/// <root>/site.backup/   previous live root, only during promotion
/// <root>/.staging-*/    in-flight downloads
/// ```
#[derive(Clone, Debug)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    /// Resolve the data directory: explicit path, then `$MIRRORVIEW_DATA_DIR`,
    /// then `$HOME/.mirrorview`, then `./mirrorview-data`.
    pub fn default_root(explicit: Option<&Path>) -> PathBuf {
        if let Some(p) = explicit {
            return p.to_path_buf();
        }
        if let Some(p) = std::env::var_os(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
            return PathBuf::from(p);
        }
        if let Some(home) = std::env::var_os("HOME").filter(|v| !v.is_empty()) {
            return PathBuf::from(home).join(".mirrorview");
        }
        PathBuf::from("./mirrorview-data")
    }

    pub fn open(root: &Path) -> Result<Self> {
        if !root.is_dir() {
            return Err(anyhow!(
                "No data directory found at {} (run `mirrorview config set ...` first)",
                root.display()
            ));
        }
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    /// Open the data directory, creating it with a default config on first use.
    pub fn open_or_init(root: &Path) -> Result<Self> {
        fs::create_dir_all(root)
            .with_context(|| format!("create data dir {}", root.display()))?;
        let store = Self {
            root: root.to_path_buf(),
        };
        if !store.root.join(CONFIG_FILE).exists() {
            store
                .write_config(&AppConfig::default())
                .context("write default config")?;
        }
        Ok(store)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn site_dir(&self) -> PathBuf {
        self.root.join(SITE_DIR)
    }

    pub fn backup_dir(&self) -> PathBuf {
        self.root.join(BACKUP_DIR)
    }

    pub fn log_path(&self) -> PathBuf {
        self.root.join(LOG_FILE)
    }

    /// A fresh staging path on the same volume as the live root. Not created.
    pub fn new_staging_dir(&self) -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let seq = STAGING_SEQ.fetch_add(1, Ordering::Relaxed);
        self.root.join(format!(
            "{}{}-{}-{}",
            STAGING_PREFIX,
            std::process::id(),
            nanos,
            seq
        ))
    }

    /// Remove staging directories left behind by a crashed process.
    pub fn remove_stale_staging(&self) -> Result<usize> {
        let mut removed = 0;
        for entry in
            fs::read_dir(&self.root).with_context(|| format!("read dir {}", self.root.display()))?
        {
            let entry = entry?;
            let name = entry.file_name();
            if !name.to_string_lossy().starts_with(STAGING_PREFIX) {
                continue;
            }
            let path = entry.path();
            if entry.file_type()?.is_dir() {
                fs::remove_dir_all(&path)
                    .with_context(|| format!("remove dir {}", path.display()))?;
            } else {
                fs::remove_file(&path)
                    .with_context(|| format!("remove file {}", path.display()))?;
            }
            removed += 1;
        }
        Ok(removed)
    }

    pub fn read_config(&self) -> Result<AppConfig> {
        let path = self.root.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(AppConfig::default());
        }
        let bytes = fs::read(&path).context("read config.json")?;
        let cfg: AppConfig = serde_json::from_slice(&bytes).context("parse config.json")?;
        if cfg.version != CONFIG_VERSION {
            anyhow::bail!("unsupported config version {}", cfg.version);
        }
        Ok(cfg)
    }

    pub fn write_config(&self, cfg: &AppConfig) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(cfg).context("serialize config")?;
        write_atomic(&self.root.join(CONFIG_FILE), &bytes).context("write config.json")?;
        Ok(())
    }
}

pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("create parent directories")?;
    }
    let tmp = path.with_extension(format!("tmp.{}", std::process::id()));
    fs::write(&tmp, bytes).with_context(|| format!("write temp file {}", tmp.display()))?;
    fs::rename(&tmp, path)
        .with_context(|| format!("rename {} -> {}", tmp.display(), path.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
