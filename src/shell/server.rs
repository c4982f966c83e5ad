//! Read-only local HTTP server that exposes the live root to a browser.
//!
//! Only GET/HEAD are routed. Every request is resolved against the live root
//! at request time, so a promotion is picked up without a restart.

use std::net::SocketAddr;
use std::path::{Path as FsPath, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result, anyhow};
use axum::Router;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use tokio::sync::oneshot;
use tracing::{debug, warn};

struct ServeState {
    root: PathBuf,
    entry_document: String,
}

pub struct ContentServer {
    addr: SocketAddr,
    interrupted: Arc<AtomicBool>,
    shutdown: Option<oneshot::Sender<()>>,
    thread: Option<std::thread::JoinHandle<()>>,
}

impl ContentServer {
    /// Bind `127.0.0.1:port` (0 for any free port) and serve `root` on a
    /// dedicated runtime thread.
    pub fn start(root: PathBuf, entry_document: &str, port: u16) -> Result<Self> {
        let state = Arc::new(ServeState {
            root,
            entry_document: entry_document.to_string(),
        });
        let (addr_tx, addr_rx) = std::sync::mpsc::channel::<Result<SocketAddr>>();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let interrupted = Arc::new(AtomicBool::new(false));
        let ctrl_c = interrupted.clone();

        let thread = std::thread::Builder::new()
            .name("mirrorview-server".to_string())
            .spawn(move || {
                let rt = match tokio::runtime::Builder::new_multi_thread()
                    .worker_threads(2)
                    .enable_all()
                    .build()
                {
                    Ok(rt) => rt,
                    Err(err) => {
                        let _ = addr_tx.send(Err(anyhow!(err).context("build tokio runtime")));
                        return;
                    }
                };
                rt.block_on(async move {
                    let addr = SocketAddr::from(([127, 0, 0, 1], port));
                    let listener = match tokio::net::TcpListener::bind(addr).await {
                        Ok(l) => l,
                        Err(err) => {
                            let _ = addr_tx.send(Err(anyhow!(err).context(format!("bind {}", addr))));
                            return;
                        }
                    };
                    let local = listener.local_addr().context("read listener local addr");
                    let ok = local.is_ok();
                    let _ = addr_tx.send(local);
                    if !ok {
                        return;
                    }
                    tokio::spawn(async move {
                        if tokio::signal::ctrl_c().await.is_ok() {
                            ctrl_c.store(true, Ordering::Release);
                        }
                    });
                    let app = router(state);
                    if let Err(err) = axum::serve(listener, app)
                        .with_graceful_shutdown(async {
                            let _ = shutdown_rx.await;
                        })
                        .await
                    {
                        warn!(error = %err, "content server stopped");
                    }
                });
            })
            .context("spawn content server thread")?;

        let addr = addr_rx
            .recv()
            .context("content server exited before binding")??;
        debug!(%addr, "content server listening");
        Ok(Self {
            addr,
            interrupted,
            shutdown: Some(shutdown_tx),
            thread: Some(thread),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Set once Ctrl-C reaches the process.
    pub fn interrupted(&self) -> Arc<AtomicBool> {
        self.interrupted.clone()
    }
}

impl Drop for ContentServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(t) = self.thread.take() {
            let _ = t.join();
        }
    }
}

fn router(state: Arc<ServeState>) -> Router {
    Router::new()
        .route("/", get(serve_index))
        .route("/*path", get(serve_path))
        .with_state(state)
}

async fn serve_index(State(state): State<Arc<ServeState>>) -> Response {
    let rel = state.entry_document.clone();
    serve(state, rel).await
}

async fn serve_path(State(state): State<Arc<ServeState>>, Path(path): Path<String>) -> Response {
    serve(state, path).await
}

async fn serve(state: Arc<ServeState>, rel: String) -> Response {
    let res = tokio::task::spawn_blocking(move || read_under_root(&state, &rel)).await;
    match res {
        Ok(Ok((path, bytes))) => (
            [
                (header::CONTENT_TYPE, content_type(&path)),
                (header::CACHE_CONTROL, "no-cache"),
                (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
            ],
            bytes,
        )
            .into_response(),
        Ok(Err(status)) => status.into_response(),
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

/// Resolve `rel` inside the live root, refusing anything that ends up outside it.
fn read_under_root(state: &ServeState, rel: &str) -> Result<(PathBuf, Vec<u8>), StatusCode> {
    let rel = rel.trim_start_matches('/');
    let rel = if rel.is_empty() {
        state.entry_document.as_str()
    } else {
        rel
    };
    let joined =
        crate::path_ops::safe_join(&state.root, rel).map_err(|_| StatusCode::BAD_REQUEST)?;

    let root = state
        .root
        .canonicalize()
        .map_err(|_| StatusCode::NOT_FOUND)?;
    let mut path = joined.canonicalize().map_err(|_| StatusCode::NOT_FOUND)?;
    if !path.starts_with(&root) {
        return Err(StatusCode::FORBIDDEN);
    }
    if path.is_dir() {
        path = path.join(&state.entry_document);
    }
    let bytes = std::fs::read(&path).map_err(|_| StatusCode::NOT_FOUND)?;
    Ok((path, bytes))
}

fn content_type(path: &FsPath) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "html" | "htm" => "text/html; charset=utf-8",
        "js" | "mjs" => "text/javascript; charset=utf-8",
        "css" => "text/css; charset=utf-8",
        "json" | "map" => "application/json",
        "txt" => "text/plain; charset=utf-8",
        "svg" => "image/svg+xml",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "ico" => "image/x-icon",
        "wasm" => "application/wasm",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        "mp3" => "audio/mpeg",
        "ogg" => "audio/ogg",
        "wav" => "audio/wav",
        _ => "application/octet-stream",
    }
}
