//! Development server: routes requests against the live registry and
//! rebuilds it when content changes.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐        ┌──────────────────┐
//! │   Main Thread   │        │  Rebuild Thread  │
//! │  (HTTP Server)  │        │  (File Monitor)  │
//! └────────┬────────┘        └────────┬─────────┘
//!          │                          │
//!     load snapshot              notify events
//!     router::handle             debounce 300ms
//!          │                     clone → rebuild
//!          ▼                          ▼
//!   ┌────────────────────────────────────────┐
//!   │   ArcSwap<ResourceRegistry> (live)     │
//!   └────────────────────────────────────────┘
//! ```
//!
//! Requests always see one complete registry. The rebuild thread works on its
//! own copy and swaps it in only after a successful pass; a failed rebuild is
//! logged and the previous snapshot keeps serving. Only one thread rebuilds,
//! so passes never overlap and bursts of events collapse into one pass.

use crate::files::{self, ListError};
use crate::registry::{BuildError, RebuildSummary, ResourceRegistry};
use crate::render::{HtmlRenderer, Renderer};
use crate::router::{self, Response as RouteResponse};
use arc_swap::ArcSwap;
use notify::{Event, EventKind, RecursiveMode, Watcher};
use std::collections::HashSet;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::{Duration, Instant};
use thiserror::Error;
use tiny_http::{Header, Method, Request, Response, Server};
use tracing::{debug, error, info, warn};

const DEBOUNCE_MS: u64 = 300;
const MAX_PORT_RETRIES: u16 = 10;

#[derive(Error, Debug)]
pub enum ServeError {
    #[error("failed to bind after {attempts} attempts (ports {first}-{last}): {message}")]
    Bind {
        attempts: u16,
        first: u16,
        last: u16,
        message: String,
    },
    #[error(transparent)]
    List(#[from] ListError),
    #[error(transparent)]
    Build(#[from] BuildError),
    #[error("file watcher error: {0}")]
    Watch(#[from] notify::Error),
    #[error("failed to set Ctrl+C handler: {0}")]
    Signal(#[from] ctrlc::Error),
}

#[derive(Debug, Clone)]
pub struct ServeOptions {
    /// Content root.
    pub root: PathBuf,
    pub interface: IpAddr,
    /// First port to try; up to ten successive ports are attempted.
    pub port: u16,
    /// Rebuild on content changes.
    pub watch: bool,
}

/// Bind, build, and serve until Ctrl+C.
pub fn serve(options: ServeOptions) -> Result<(), ServeError> {
    let (server, addr) = try_bind_port(options.interface, options.port, MAX_PORT_RETRIES)?;
    let server = Arc::new(server);
    let origin = format!("http://{addr}");

    let registry = ResourceRegistry::new(&options.root).with_local_origin(origin.clone());
    let live = Arc::new(ArcSwap::from_pointee(registry));
    rebuild_snapshot(&live, &HtmlRenderer)?;

    let server_for_signal = Arc::clone(&server);
    ctrlc::set_handler(move || {
        info!("shutting down");
        server_for_signal.unblock();
    })?;

    if options.watch {
        let live = Arc::clone(&live);
        let root = options.root.clone();
        std::thread::spawn(move || {
            if let Err(e) = watch_and_rebuild(&root, &live, &HtmlRenderer) {
                error!(error = %e, "file watcher stopped");
            }
        });
    }

    info!(%origin, root = %options.root.display(), "serving");

    for request in server.incoming_requests() {
        let snapshot = live.load();
        if let Err(e) = handle_request(request, &snapshot) {
            warn!(error = %e, "failed to send response");
        }
    }
    Ok(())
}

/// Try to bind to a port, moving up one port at a time while in use.
fn try_bind_port(
    interface: IpAddr,
    base_port: u16,
    max_retries: u16,
) -> Result<(Server, SocketAddr), ServeError> {
    let mut last_error = String::new();
    for offset in 0..max_retries {
        let port = base_port.saturating_add(offset);
        let addr = SocketAddr::new(interface, port);
        match Server::http(addr) {
            Ok(server) => {
                if offset > 0 {
                    info!(requested = base_port, port, "port in use, using next free port");
                }
                return Ok((server, addr));
            }
            Err(e) => {
                debug!(port, error = %e, "bind failed");
                last_error = e.to_string();
            }
        }
    }
    Err(ServeError::Bind {
        attempts: max_retries,
        first: base_port,
        last: base_port.saturating_add(max_retries.saturating_sub(1)),
        message: last_error,
    })
}

/// Rebuild a copy of the live registry from the current file list and
/// publish it. On error the live snapshot is left alone.
pub fn rebuild_snapshot(
    live: &ArcSwap<ResourceRegistry>,
    renderer: &dyn Renderer,
) -> Result<RebuildSummary, ServeError> {
    let mut next = ResourceRegistry::clone(&live.load());
    let files = files::list_files(next.root())?;
    let summary = next.rebuild(&files, renderer)?;
    live.store(Arc::new(next));
    Ok(summary)
}

// ============================================================================
// Watching
// ============================================================================

/// Batches rapid file events until they go quiet.
struct Debouncer {
    pending: HashSet<PathBuf>,
    last_event: Option<Instant>,
}

impl Debouncer {
    fn new() -> Self {
        Self {
            pending: HashSet::new(),
            last_event: None,
        }
    }

    fn add(&mut self, event: Event) {
        for path in event.paths {
            if !is_noise(&path) {
                self.pending.insert(path);
            }
        }
        self.last_event = Some(Instant::now());
    }

    fn ready(&self) -> bool {
        !self.pending.is_empty()
            && self
                .last_event
                .is_some_and(|t| t.elapsed() >= Duration::from_millis(DEBOUNCE_MS))
    }

    fn take(&mut self) -> Vec<PathBuf> {
        self.last_event = None;
        self.pending.drain().collect()
    }

    fn timeout(&self) -> Duration {
        if self.pending.is_empty() {
            Duration::from_secs(60)
        } else {
            Duration::from_millis(DEBOUNCE_MS)
        }
    }
}

/// Editor swap files and anything under `.git`.
fn is_noise(path: &Path) -> bool {
    if path.components().any(|c| c.as_os_str() == ".git") {
        return true;
    }
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    name.ends_with('~') || matches!(ext, "swp" | "swo" | "swx" | "bak" | "tmp")
}

const fn is_relevant(event: &Event) -> bool {
    matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    )
}

fn watch_and_rebuild(
    root: &Path,
    live: &ArcSwap<ResourceRegistry>,
    renderer: &dyn Renderer,
) -> Result<(), ServeError> {
    let (tx, rx) = mpsc::channel();
    let mut watcher = notify::recommended_watcher(tx)?;
    watcher.watch(root, RecursiveMode::Recursive)?;
    info!(root = %root.display(), "watching for changes");

    let mut debouncer = Debouncer::new();
    loop {
        match rx.recv_timeout(debouncer.timeout()) {
            Ok(Ok(event)) if is_relevant(&event) => debouncer.add(event),
            Ok(Err(e)) => warn!(error = %e, "watch error"),
            Err(RecvTimeoutError::Timeout) if debouncer.ready() => {
                let changed = debouncer.take();
                debug!(count = changed.len(), "changes detected, rebuilding");
                // The last good snapshot keeps serving on failure.
                if let Err(e) = rebuild_snapshot(live, renderer) {
                    error!(error = %e, "rebuild failed");
                }
            }
            Err(RecvTimeoutError::Disconnected) => break,
            _ => {}
        }
    }
    Ok(())
}

// ============================================================================
// Request Handling
// ============================================================================

/// Decoded request path with the query string removed.
fn request_path(url: &str) -> String {
    let without_query = url.split(['?', '#']).next().unwrap_or(url);
    let decoded = urlencoding::decode(without_query)
        .map(std::borrow::Cow::into_owned)
        .unwrap_or_else(|_| without_query.to_string());
    if decoded.starts_with('/') {
        decoded
    } else {
        format!("/{decoded}")
    }
}

/// Route a method and URL to a transport-free response.
fn route(registry: &ResourceRegistry, method: &Method, url: &str) -> RouteResponse {
    if !matches!(method, Method::Get | Method::Head) {
        return plain(405, "405 Method Not Allowed");
    }
    let path = request_path(url);
    match router::handle(registry, &path) {
        Ok(response) => response,
        Err(e) => {
            error!(%path, error = %e, "request failed");
            plain(500, "500 Internal Server Error")
        }
    }
}

fn plain(status: u16, body: &str) -> RouteResponse {
    RouteResponse {
        status,
        location: None,
        content_type: Some("text/plain; charset=utf-8"),
        body: body.as_bytes().to_vec(),
    }
}

fn header(name: &str, value: &str) -> Option<Header> {
    Header::from_bytes(name.as_bytes(), value.as_bytes()).ok()
}

fn handle_request(request: Request, registry: &ResourceRegistry) -> std::io::Result<()> {
    let routed = route(registry, request.method(), request.url());
    debug!(
        method = %request.method(),
        url = request.url(),
        status = routed.status,
        "request"
    );

    // tiny_http drops the body itself for HEAD requests.
    let mut response = Response::from_data(routed.body).with_status_code(routed.status);
    if let Some(h) = routed.content_type.and_then(|ct| header("Content-Type", ct)) {
        response.add_header(h);
    }
    if let Some(h) = routed.location.as_deref().and_then(|l| header("Location", l)) {
        response.add_header(h);
    }
    if routed.status == 405
        && let Some(h) = header("Allow", "GET, HEAD")
    {
        response.add_header(h);
    }
    request.respond(response)
}
