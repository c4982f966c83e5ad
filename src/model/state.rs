use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AppState {
    pub version: u32,

    /// Last successfully applied sync, if any.
    #[serde(default)]
    pub last_sync: Option<SyncRecord>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncRecord {
    pub synced_at: String,
    pub git_ref: String,
    pub files: u64,
    pub bytes: u64,
}
