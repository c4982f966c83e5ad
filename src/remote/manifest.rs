//! Remote file listing via the tree-listing API.

use tracing::{debug, info};

use super::types::TreeListing;
use super::*;
use crate::model::EntryKind;

impl RemoteClient {
    pub(super) fn fetch_tree_manifest(&self) -> Result<RemoteManifest> {
        let resp = self
            .client
            .get(self.tree_url())
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .timeout(MANIFEST_TIMEOUT)
            .send()
            .context("send tree listing request")?;
        let bytes = self
            .ensure_ok(resp, "tree listing")?
            .bytes()
            .context("read tree listing body")?;
        let listing: TreeListing =
            serde_json::from_slice(&bytes).context("parse tree listing")?;

        let manifest = manifest_from_listing(listing, &self.filter)?;
        info!(
            remote = %self.remote.display_name(),
            files = manifest.len(),
            "fetched remote manifest"
        );
        Ok(manifest)
    }
}

pub(super) fn manifest_from_listing(
    listing: TreeListing,
    filter: &ManifestFilter,
) -> Result<RemoteManifest> {
    if listing.truncated {
        anyhow::bail!("tree listing was truncated by the host");
    }
    debug!(
        tree = listing.sha.as_deref().unwrap_or("-"),
        items = listing.tree.len(),
        "filtering tree listing"
    );

    let mut entries = Vec::new();
    for item in listing.tree {
        let kind = match item.kind.as_str() {
            "blob" => EntryKind::Blob,
            "tree" => EntryKind::Tree,
            _ => continue,
        };
        if kind != EntryKind::Blob || !filter.keeps(&item.path) {
            continue;
        }
        crate::path_ops::reject_unsafe_path(&item.path)
            .with_context(|| format!("unsafe path in tree listing: {:?}", item.path))?;
        if item.sha.is_empty() {
            anyhow::bail!("tree listing entry {} has no content hash", item.path);
        }
        entries.push(RemoteFileEntry {
            path: item.path,
            kind,
            content_hash: item.sha,
        });
    }

    if !entries.iter().any(|e| e.path == filter.entry_document()) {
        anyhow::bail!(
            "tree listing has no {} ({} other matching files)",
            filter.entry_document(),
            entries.len()
        );
    }
    Ok(RemoteManifest::new(entries))
}

#[cfg(test)]
#[path = "../tests/remote/manifest_tests.rs"]
mod tests;
