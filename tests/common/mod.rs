#![allow(dead_code)]

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use axum::Router;
use axum::extract::{Path as UrlPath, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use tokio::sync::oneshot;

use mirrorview::model::AppConfig;

pub const OWNER: &str = "acme";
pub const REPO: &str = "game";
pub const REF: &str = "main";

#[derive(Default)]
struct HostState {
    files: Mutex<BTreeMap<String, (String, Vec<u8>)>>,
    failing: Mutex<HashSet<String>>,
    tree_requests: AtomicUsize,
    raw_requests: AtomicUsize,
}

/// In-process stand-in for the hosting API: a tree listing plus raw content.
pub struct FakeHost {
    pub base_url: String,
    state: Arc<HostState>,
    shutdown: Option<oneshot::Sender<()>>,
    thread: Option<std::thread::JoinHandle<()>>,
}

impl Drop for FakeHost {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(t) = self.thread.take() {
            let _ = t.join();
        }
    }
}

impl FakeHost {
    pub fn put(&self, path: &str, hash: &str, body: &[u8]) {
        self.state
            .files
            .lock()
            .unwrap()
            .insert(path.to_string(), (hash.to_string(), body.to_vec()));
    }

    pub fn remove(&self, path: &str) {
        self.state.files.lock().unwrap().remove(path);
    }

    pub fn fail(&self, path: &str) {
        self.state.failing.lock().unwrap().insert(path.to_string());
    }

    pub fn heal(&self, path: &str) {
        self.state.failing.lock().unwrap().remove(path);
    }

    pub fn tree_requests(&self) -> usize {
        self.state.tree_requests.load(Ordering::SeqCst)
    }

    pub fn raw_requests(&self) -> usize {
        self.state.raw_requests.load(Ordering::SeqCst)
    }

    /// Config pointing every remote endpoint at this host.
    pub fn config(&self) -> AppConfig {
        let mut cfg = AppConfig::default();
        cfg.remote.owner = OWNER.to_string();
        cfg.remote.repo = REPO.to_string();
        cfg.remote.git_ref = REF.to_string();
        cfg.remote.api_base = format!("{}/api", self.base_url);
        cfg.remote.raw_base = format!("{}/raw", self.base_url);
        cfg.remote.probe_url = format!("{}/", self.base_url);
        cfg
    }
}

pub fn spawn_host() -> Result<FakeHost> {
    let state = Arc::new(HostState::default());
    let app = Router::new()
        .route("/", get(|| async { "ok" }))
        .route("/api/repos/:owner/:repo/git/trees/:git_ref", get(tree_listing))
        .route("/raw/:owner/:repo/:git_ref/*path", get(raw_content))
        .with_state(state.clone());

    let (addr_tx, addr_rx) = std::sync::mpsc::channel();
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let thread = std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("build test runtime");
        rt.block_on(async move {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                .await
                .expect("bind fake host");
            addr_tx
                .send(listener.local_addr().expect("local addr"))
                .expect("send addr");
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .expect("serve fake host");
        });
    });

    let addr = addr_rx.recv().context("fake host did not start")?;
    Ok(FakeHost {
        base_url: format!("http://{}", addr),
        state,
        shutdown: Some(shutdown_tx),
        thread: Some(thread),
    })
}

async fn tree_listing(
    State(state): State<Arc<HostState>>,
    UrlPath((owner, repo, git_ref)): UrlPath<(String, String, String)>,
) -> Response {
    state.tree_requests.fetch_add(1, Ordering::SeqCst);
    if owner != OWNER || repo != REPO || git_ref != REF {
        return StatusCode::NOT_FOUND.into_response();
    }
    let files = state.files.lock().unwrap();
    let mut tree = Vec::new();
    let mut dirs = HashSet::new();
    for (path, (hash, _)) in files.iter() {
        let mut parts = path.split('/').collect::<Vec<_>>();
        parts.pop();
        for i in 1..=parts.len() {
            let dir = parts[..i].join("/");
            if dirs.insert(dir.clone()) {
                tree.push(serde_json::json!({"path": dir, "type": "tree", "sha": format!("t-{}", i), "mode": "040000"}));
            }
        }
        tree.push(serde_json::json!({"path": path, "type": "blob", "sha": hash, "mode": "100644"}));
    }
    axum::Json(serde_json::json!({"sha": "root", "tree": tree, "truncated": false})).into_response()
}

async fn raw_content(
    State(state): State<Arc<HostState>>,
    UrlPath((_owner, _repo, _git_ref, path)): UrlPath<(String, String, String, String)>,
) -> Response {
    state.raw_requests.fetch_add(1, Ordering::SeqCst);
    if state.failing.lock().unwrap().contains(&path) {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    match state.files.lock().unwrap().get(&path) {
        Some((_, body)) => body.clone().into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// A local address nothing listens on.
pub fn dead_url() -> Result<String> {
    let l = std::net::TcpListener::bind("127.0.0.1:0").context("bind probe port")?;
    let addr = l.local_addr()?;
    drop(l);
    Ok(format!("http://{}", addr))
}

pub fn write_bundled(root: &Path) -> Result<PathBuf> {
    let dir = root.join("bundled");
    fs::create_dir_all(dir.join("assets")).context("create bundled dir")?;
    fs::write(dir.join("index.html"), b"<html>bundled</html>").context("write bundled index")?;
    fs::write(dir.join("assets/app.js"), b"// bundled").context("write bundled js")?;
    Ok(dir)
}

pub fn capture_tree(root: &Path) -> Result<BTreeMap<PathBuf, Vec<u8>>> {
    let mut out = BTreeMap::new();
    capture_dir(root, Path::new(""), &mut out)?;
    Ok(out)
}

fn capture_dir(root: &Path, rel: &Path, out: &mut BTreeMap<PathBuf, Vec<u8>>) -> Result<()> {
    let dir = root.join(rel);
    for entry in fs::read_dir(&dir).with_context(|| format!("read dir {}", dir.display()))? {
        let entry = entry?;
        let child_rel = rel.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            capture_dir(root, &child_rel, out)?;
        } else {
            out.insert(child_rel.clone(), fs::read(root.join(&child_rel))?);
        }
    }
    Ok(())
}

/// Names of leftover staging/backup directories next to the live root.
pub fn leftovers(data_dir: &Path) -> Result<Vec<String>> {
    let mut out = Vec::new();
    for entry in fs::read_dir(data_dir)? {
        let name = entry?.file_name().to_string_lossy().into_owned();
        if name.starts_with(".staging-") || name == "site.backup" {
            out.push(name);
        }
    }
    Ok(out)
}
