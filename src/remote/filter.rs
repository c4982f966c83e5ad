use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};

/// Decides which remote paths belong to the served application: the entry
/// document plus anything matching the configured include globs.
#[derive(Clone, Debug)]
pub struct ManifestFilter {
    entry_document: String,
    include: GlobSet,
}

impl ManifestFilter {
    pub fn new(entry_document: &str, patterns: &[String]) -> Result<Self> {
        crate::path_ops::reject_unsafe_path(entry_document)
            .context("invalid entry document path")?;
        let mut builder = GlobSetBuilder::new();
        for p in patterns {
            let glob = Glob::new(p).with_context(|| format!("invalid include pattern {:?}", p))?;
            builder.add(glob);
        }
        let include = builder.build().context("build include patterns")?;
        Ok(Self {
            entry_document: entry_document.to_string(),
            include,
        })
    }

    pub fn entry_document(&self) -> &str {
        &self.entry_document
    }

    pub fn keeps(&self, path: &str) -> bool {
        path == self.entry_document || self.include.is_match(path)
    }
}
