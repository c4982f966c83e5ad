use std::path::{Component, Path, PathBuf};

use anyhow::Result;

/// Reject paths that could land outside the directory they are joined onto.
pub fn reject_unsafe_path(p: &str) -> Result<()> {
    if p.is_empty() {
        anyhow::bail!("empty path");
    }
    if p.contains('\\') || p.contains('\0') {
        anyhow::bail!("path contains a backslash or NUL: {:?}", p);
    }
    let path = Path::new(p);
    if path.is_absolute() {
        anyhow::bail!("path must be relative: {}", p);
    }
    for c in path.components() {
        match c {
            Component::Normal(_) => {}
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                anyhow::bail!("path may not contain '..' or be rooted: {}", p)
            }
        }
    }
    Ok(())
}

/// `root.join(rel)` after checking `rel` stays under `root`.
pub fn safe_join(root: &Path, rel: &str) -> Result<PathBuf> {
    reject_unsafe_path(rel)?;
    Ok(root.join(rel))
}
