//! Build-then-swap promotion of a staged tree over the live root.
//!
//! At every instant the live path holds either the complete old tree or the
//! complete new tree. A crash between the two renames leaves only the backup,
//! which `recover_interrupted` moves back before anything else happens.

use std::fs;
use std::io;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use tracing::{info, warn};

pub fn promote(staging: &Path, live: &Path, backup: &Path) -> Result<()> {
    promote_with(staging, live, backup, |from, to| fs::rename(from, to))
}

/// Same as [`promote`], with the rename used for the swap supplied by the caller.
pub fn promote_with<F>(staging: &Path, live: &Path, backup: &Path, mut rename: F) -> Result<()>
where
    F: FnMut(&Path, &Path) -> io::Result<()>,
{
    recover_interrupted(live, backup)?;

    if exists(backup) {
        remove_tree(backup).context("remove stale backup")?;
    }

    let had_live = exists(live);
    if had_live {
        rename(live, backup)
            .with_context(|| format!("rename {} -> {}", live.display(), backup.display()))?;
    }

    match rename(staging, live) {
        Ok(()) => {
            if had_live && let Err(err) = remove_tree(backup) {
                warn!(path = %backup.display(), error = %format!("{:#}", err), "failed to remove backup");
            }
            Ok(())
        }
        Err(err) => {
            if exists(live)
                && let Err(cleanup) = remove_tree(live)
            {
                warn!(path = %live.display(), error = %format!("{:#}", cleanup), "failed to remove partial live root");
            }
            if had_live {
                fs::rename(backup, live).with_context(|| {
                    format!(
                        "restore {} -> {} after failed promotion",
                        backup.display(),
                        live.display()
                    )
                })?;
            }
            Err(anyhow!(err).context(format!(
                "rename {} -> {}",
                staging.display(),
                live.display()
            )))
        }
    }
}

/// Put the backup back if a previous promotion died between its two renames.
pub fn recover_interrupted(live: &Path, backup: &Path) -> Result<bool> {
    if exists(live) || !exists(backup) {
        return Ok(false);
    }
    info!(path = %live.display(), "restoring live root from interrupted promotion");
    fs::rename(backup, live)
        .with_context(|| format!("rename {} -> {}", backup.display(), live.display()))?;
    Ok(true)
}

fn exists(p: &Path) -> bool {
    fs::symlink_metadata(p).is_ok()
}

fn remove_tree(p: &Path) -> Result<()> {
    let meta = fs::symlink_metadata(p).with_context(|| format!("stat {}", p.display()))?;
    if meta.is_dir() {
        fs::remove_dir_all(p).with_context(|| format!("remove dir {}", p.display()))
    } else {
        fs::remove_file(p).with_context(|| format!("remove file {}", p.display()))
    }
}

#[cfg(test)]
#[path = "../tests/sync/promote_tests.rs"]
mod tests;
