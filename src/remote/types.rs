//! Payloads of the hosting API.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(super) struct TreeListing {
    #[serde(default)]
    pub(super) sha: Option<String>,

    pub(super) tree: Vec<TreeItem>,

    /// Set by the host when the listing was cut short.
    #[serde(default)]
    pub(super) truncated: bool,
}

#[derive(Debug, Deserialize)]
pub(super) struct TreeItem {
    pub(super) path: String,

    /// `blob`, `tree`, or `commit` (submodule).
    #[serde(rename = "type")]
    pub(super) kind: String,

    pub(super) sha: String,
}
