use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Blob,
    Tree,
}

/// One file or directory of the remote source at a given ref.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFileEntry {
    pub path: String,
    pub kind: EntryKind,
    pub content_hash: String,
}

impl RemoteFileEntry {
    pub fn blob(path: impl Into<String>, content_hash: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::Blob,
            content_hash: content_hash.into(),
        }
    }
}

/// Remote file set, always kept in canonical (byte-wise path) order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RemoteManifest {
    entries: Vec<RemoteFileEntry>,
}

impl RemoteManifest {
    pub fn new(mut entries: Vec<RemoteFileEntry>) -> Self {
        entries.sort_by(|a, b| {
            a.path
                .cmp(&b.path)
                .then_with(|| a.content_hash.cmp(&b.content_hash))
        });
        entries.dedup_by(|a, b| a.path == b.path && a.content_hash == b.content_hash);
        Self { entries }
    }

    pub fn entries(&self) -> &[RemoteFileEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn signature(&self) -> SyncSignature {
        let text = self
            .entries
            .iter()
            .map(|e| format!("{}:{}", e.path, e.content_hash))
            .collect::<Vec<_>>()
            .join("\n");
        SyncSignature(text)
    }
}

/// Fingerprint of a whole manifest; compared byte-for-byte.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSignature(pub String);

impl SyncSignature {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short content revision used to tag served document URLs.
    pub fn revision(&self) -> String {
        blake3::hash(self.0.as_bytes())
            .to_hex()
            .chars()
            .take(12)
            .collect()
    }
}

#[cfg(test)]
#[path = "../tests/model/manifest_tests.rs"]
mod tests;
