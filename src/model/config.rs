use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub const CONFIG_VERSION: u32 = 1;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppConfig {
    pub version: u32,

    pub remote: RemoteConfig,

    #[serde(default = "default_entry_document")]
    pub entry_document: String,

    /// Glob patterns (relative to the repository root) of files worth mirroring.
    /// The entry document is always included.
    #[serde(default = "default_include")]
    pub include: Vec<String>,

    /// Directory holding the default content shipped with the application.
    /// Defaults to `bundled/` next to the executable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bundled_dir: Option<PathBuf>,

    #[serde(default)]
    pub view: ViewKind,

    /// Port for the local content server (0 picks a free one).
    #[serde(default)]
    pub listen_port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            remote: RemoteConfig::default(),
            entry_document: default_entry_document(),
            include: default_include(),
            bundled_dir: None,
            view: ViewKind::default(),
            listen_port: 0,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RemoteConfig {
    pub owner: String,
    pub repo: String,

    #[serde(default = "default_git_ref")]
    pub git_ref: String,

    #[serde(default = "default_api_base")]
    pub api_base: String,

    #[serde(default = "default_raw_base")]
    pub raw_base: String,

    #[serde(default = "default_probe_url")]
    pub probe_url: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            owner: String::new(),
            repo: String::new(),
            git_ref: default_git_ref(),
            api_base: default_api_base(),
            raw_base: default_raw_base(),
            probe_url: default_probe_url(),
        }
    }
}

impl RemoteConfig {
    pub fn is_configured(&self) -> bool {
        !self.owner.is_empty() && !self.repo.is_empty()
    }

    pub fn display_name(&self) -> String {
        format!("{}/{}@{}", self.owner, self.repo, self.git_ref)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewKind {
    /// Terminal view when attached to a TTY, plain otherwise.
    #[default]
    Auto,
    Terminal,
    Plain,
}

fn default_entry_document() -> String {
    "index.html".to_string()
}

fn default_include() -> Vec<String> {
    vec!["assets/**".to_string(), "public/**".to_string()]
}

fn default_git_ref() -> String {
    "main".to_string()
}

fn default_api_base() -> String {
    "https://api.github.com".to_string()
}

fn default_raw_base() -> String {
    "https://raw.githubusercontent.com".to_string()
}

fn default_probe_url() -> String {
    "https://github.com".to_string()
}
