//! Presentation shell: binds load status and the resolved entry document to a
//! content view. No business logic lives here.

use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::Duration;

use anyhow::Result;
use tracing::{debug, info};

use crate::launch::{DocumentLocation, LoadEvent, LoadStatus, start_background_load, status_channel};
use crate::model::{AppConfig, ViewKind};
use crate::store::LocalStore;

mod plain;
pub mod server;
mod terminal;

pub use self::plain::PlainView;
pub use self::server::ContentServer;
pub use self::terminal::TerminalView;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// A surface that shows the status line and the current document.
pub trait ContentView {
    fn show_status(&mut self, status: &LoadStatus) -> Result<()>;

    /// Point the view at a new document URL.
    fn show_document(&mut self, url: &str, location: &DocumentLocation) -> Result<()>;

    /// Wait up to `timeout` for user input; true once the user closed the view.
    fn poll_quit(&mut self, timeout: Duration) -> Result<bool>;
}

/// Pick the concrete backend for `Auto`.
pub fn resolve_view_kind(kind: ViewKind) -> ViewKind {
    match kind {
        ViewKind::Auto => {
            if io::stdin().is_terminal() && io::stdout().is_terminal() {
                ViewKind::Terminal
            } else {
                ViewKind::Plain
            }
        }
        other => other,
    }
}

/// Feeds load events into a view, reloading the document only when its
/// location changes.
pub struct Shell<V: ContentView> {
    view: V,
    base_url: String,
    site_root: PathBuf,
    current: Option<DocumentLocation>,
    loaded: bool,
}

impl<V: ContentView> Shell<V> {
    pub fn new(view: V, base_url: &str, site_root: &Path) -> Self {
        Self {
            view,
            base_url: base_url.trim_end_matches('/').to_string(),
            site_root: site_root.to_path_buf(),
            current: None,
            loaded: false,
        }
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn handle_event(&mut self, event: LoadEvent) -> Result<()> {
        match event {
            LoadEvent::Status(status) => self.view.show_status(&status),
            LoadEvent::Document(location) => {
                if self.current.as_ref() == Some(&location) {
                    debug!(path = %location.path.display(), "document unchanged; not reloading");
                    return Ok(());
                }
                let url = document_url(&self.base_url, &self.site_root, &location);
                self.view.show_document(&url, &location)?;
                self.current = Some(location);
                Ok(())
            }
            LoadEvent::Finished => {
                self.loaded = true;
                Ok(())
            }
        }
    }

    /// Pump events until the user quits. Keeps serving after the load ends.
    pub fn run(&mut self, events: Receiver<LoadEvent>) -> Result<()> {
        let mut connected = true;
        loop {
            while connected {
                match events.try_recv() {
                    Ok(ev) => self.handle_event(ev)?,
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => connected = false,
                }
            }
            if self.view.poll_quit(POLL_INTERVAL)? {
                return Ok(());
            }
        }
    }
}

/// URL of `location` on the content server, tagged with its revision.
pub fn document_url(base_url: &str, site_root: &Path, location: &DocumentLocation) -> String {
    let rel = location
        .path
        .strip_prefix(site_root)
        .unwrap_or(&location.path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/");
    match &location.revision {
        Some(rev) => format!("{}/{}?rev={}", base_url, rel, rev),
        None => format!("{}/{}", base_url, rel),
    }
}

/// Start the content server and the background load, then hand the terminal
/// (or stdout) to the chosen view until the user quits.
pub fn run(store: LocalStore, cfg: AppConfig, kind: ViewKind) -> Result<()> {
    let server = ContentServer::start(store.site_dir(), &cfg.entry_document, cfg.listen_port)?;
    info!(url = %server.base_url(), "serving local content");

    let (publisher, events) = status_channel();
    let remote_label = if cfg.remote.is_configured() {
        cfg.remote.display_name()
    } else {
        "(no remote configured)".to_string()
    };
    let site_root = store.site_dir();
    let data_dir = store.root().to_path_buf();
    let _load = start_background_load(store, cfg, publisher)?;

    match resolve_view_kind(kind) {
        ViewKind::Terminal => {
            let view = TerminalView::enter(&remote_label, &data_dir)?;
            Shell::new(view, &server.base_url(), &site_root).run(events)
        }
        _ => {
            let view = PlainView::new(io::stdout(), server.interrupted());
            Shell::new(view, &server.base_url(), &site_root).run(events)
        }
    }
}

#[cfg(test)]
#[path = "tests/shell_tests.rs"]
mod tests;
