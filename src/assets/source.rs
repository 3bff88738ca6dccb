//! Asset transport.
//!
//! An [`AssetSource`] starts fetches and later hands back [`FetchEvent`]s
//! when polled from the frame thread. Sources never block the caller;
//! worker threads (or the host) push events through a channel.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};

/// Identifier the composer attaches to each fetch.
pub type RequestId = u64;

/// Bytes read per progress step by [`FileSource`].
const FILE_CHUNK_SIZE: usize = 64 * 1024;

/// Progress or completion of one fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchEvent {
    /// Bytes received so far; `total` is 0 when the size is unknown.
    Progress {
        /// Request the event belongs to.
        id: RequestId,
        /// Bytes received.
        loaded: u64,
        /// Expected size, 0 if unknown.
        total: u64,
    },
    /// The whole payload arrived.
    Completed {
        /// Request the event belongs to.
        id: RequestId,
        /// Payload.
        bytes: Vec<u8>,
    },
    /// The fetch failed.
    Failed {
        /// Request the event belongs to.
        id: RequestId,
        /// Transport-level reason.
        message: String,
    },
}

impl FetchEvent {
    /// Request the event belongs to.
    #[must_use]
    pub fn id(&self) -> RequestId {
        match self {
            Self::Progress { id, .. } | Self::Completed { id, .. } | Self::Failed { id, .. } => *id,
        }
    }
}

/// Where assets come from.
pub trait AssetSource: Send {
    /// Begin fetching `url`. Events for it carry `id`.
    fn fetch(&mut self, id: RequestId, url: &str);

    /// Events produced since the last poll, in arrival order.
    fn poll(&mut self) -> Vec<FetchEvent>;
}

/// Resolve `url` against the location of `reference`.
///
/// Absolute URLs (with a scheme) and absolute paths are returned as-is;
/// anything else replaces the last path segment of `reference`.
#[must_use]
pub fn resolve_url(reference: &str, url: &str) -> String {
    if url.contains("://") || url.starts_with('/') || reference.is_empty() {
        return url.to_owned();
    }
    match reference.rfind('/') {
        Some(slash) => format!("{}{url}", &reference[..=slash]),
        None => url.to_owned(),
    }
}

// ---------------------------------------------------------------------------
// Local files
// ---------------------------------------------------------------------------

/// Reads local files on short-lived worker threads, reporting progress
/// per chunk.
pub struct FileSource {
    root: PathBuf,
    tx: mpsc::Sender<FetchEvent>,
    rx: mpsc::Receiver<FetchEvent>,
}

impl FileSource {
    /// Source resolving relative paths against `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            root: root.into(),
            tx,
            rx,
        }
    }

    fn read_file(id: RequestId, path: &Path, tx: &mpsc::Sender<FetchEvent>) -> std::io::Result<Vec<u8>> {
        let mut file = std::fs::File::open(path)?;
        let total = file.metadata().map(|m| m.len()).unwrap_or(0);
        let mut bytes = Vec::with_capacity(total as usize);
        let mut chunk = vec![0_u8; FILE_CHUNK_SIZE];
        loop {
            let n = file.read(&mut chunk)?;
            if n == 0 {
                break;
            }
            bytes.extend_from_slice(&chunk[..n]);
            let _ = tx.send(FetchEvent::Progress {
                id,
                loaded: bytes.len() as u64,
                total,
            });
        }
        Ok(bytes)
    }
}

impl AssetSource for FileSource {
    fn fetch(&mut self, id: RequestId, url: &str) {
        let path = self.root.join(url.trim_start_matches("file://"));
        let tx = self.tx.clone();
        let spawned = std::thread::Builder::new()
            .name("asset-file".into())
            .spawn(move || {
                let event = match Self::read_file(id, &path, &tx) {
                    Ok(bytes) => FetchEvent::Completed { id, bytes },
                    Err(e) => FetchEvent::Failed {
                        id,
                        message: format!("{}: {e}", path.display()),
                    },
                };
                let _ = tx.send(event);
            });
        if let Err(e) = spawned {
            log::error!("failed to spawn file reader: {e}");
            let _ = self.tx.send(FetchEvent::Failed {
                id,
                message: e.to_string(),
            });
        }
    }

    fn poll(&mut self) -> Vec<FetchEvent> {
        self.rx.try_iter().collect()
    }
}

// ---------------------------------------------------------------------------
// HTTP
// ---------------------------------------------------------------------------

/// Fetches over HTTP(S) with `ureq`, one worker thread per request.
#[cfg(feature = "http")]
pub struct HttpSource {
    tx: mpsc::Sender<FetchEvent>,
    rx: mpsc::Receiver<FetchEvent>,
}

#[cfg(feature = "http")]
impl Default for HttpSource {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "http")]
impl HttpSource {
    /// New source with no requests in flight.
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx }
    }

    fn download(id: RequestId, url: &str, tx: &mpsc::Sender<FetchEvent>) -> Result<Vec<u8>, String> {
        let response = ureq::get(url).call().map_err(|e| e.to_string())?;
        let total = response
            .headers()
            .get("content-length")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(0);
        let mut reader = response.into_body().into_reader();
        let mut bytes = Vec::new();
        let mut chunk = vec![0_u8; FILE_CHUNK_SIZE];
        loop {
            let n = reader.read(&mut chunk).map_err(|e| e.to_string())?;
            if n == 0 {
                break;
            }
            bytes.extend_from_slice(&chunk[..n]);
            let _ = tx.send(FetchEvent::Progress {
                id,
                loaded: bytes.len() as u64,
                total,
            });
        }
        Ok(bytes)
    }
}

#[cfg(feature = "http")]
impl AssetSource for HttpSource {
    fn fetch(&mut self, id: RequestId, url: &str) {
        let tx = self.tx.clone();
        let url = url.to_owned();
        let spawned = std::thread::Builder::new()
            .name("asset-http".into())
            .spawn(move || {
                log::debug!("GET {url}");
                let event = match Self::download(id, &url, &tx) {
                    Ok(bytes) => FetchEvent::Completed { id, bytes },
                    Err(message) => FetchEvent::Failed { id, message },
                };
                let _ = tx.send(event);
            });
        if let Err(e) = spawned {
            log::error!("failed to spawn http fetch: {e}");
            let _ = self.tx.send(FetchEvent::Failed {
                id,
                message: e.to_string(),
            });
        }
    }

    fn poll(&mut self) -> Vec<FetchEvent> {
        self.rx.try_iter().collect()
    }
}

// ---------------------------------------------------------------------------
// Host-driven
// ---------------------------------------------------------------------------

/// Source whose payloads are pushed by the host through a
/// [`ManualHandle`]. Useful when the embedding application already owns
/// networking, and in tests.
pub struct ManualSource {
    requests: Arc<Mutex<Vec<(RequestId, String)>>>,
    tx: mpsc::Sender<FetchEvent>,
    rx: mpsc::Receiver<FetchEvent>,
}

/// Cloneable handle for answering a [`ManualSource`]'s requests.
#[derive(Clone)]
pub struct ManualHandle {
    requests: Arc<Mutex<Vec<(RequestId, String)>>>,
    tx: mpsc::Sender<FetchEvent>,
}

impl Default for ManualSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualSource {
    /// Source with no outstanding requests.
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            requests: Arc::default(),
            tx,
            rx,
        }
    }

    /// Handle for answering requests.
    #[must_use]
    pub fn handle(&self) -> ManualHandle {
        ManualHandle {
            requests: Arc::clone(&self.requests),
            tx: self.tx.clone(),
        }
    }
}

impl AssetSource for ManualSource {
    fn fetch(&mut self, id: RequestId, url: &str) {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push((id, url.to_owned()));
        }
    }

    fn poll(&mut self) -> Vec<FetchEvent> {
        self.rx.try_iter().collect()
    }
}

impl ManualHandle {
    /// Unanswered requests in issue order.
    #[must_use]
    pub fn pending(&self) -> Vec<(RequestId, String)> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    fn take(&self, url: &str) -> Option<RequestId> {
        let mut requests = self.requests.lock().ok()?;
        let index = requests.iter().position(|(_, u)| u == url)?;
        Some(requests.remove(index).0)
    }

    fn id_for(&self, url: &str) -> Option<RequestId> {
        let requests = self.requests.lock().ok()?;
        requests.iter().find(|(_, u)| u == url).map(|(id, _)| *id)
    }

    /// Report download progress for the oldest request to `url`.
    pub fn progress(&self, url: &str, loaded: u64, total: u64) -> bool {
        let Some(id) = self.id_for(url) else {
            return false;
        };
        self.tx.send(FetchEvent::Progress { id, loaded, total }).is_ok()
    }

    /// Deliver the payload for the oldest request to `url`.
    pub fn complete(&self, url: &str, bytes: impl Into<Vec<u8>>) -> bool {
        let Some(id) = self.take(url) else {
            return false;
        };
        self.tx
            .send(FetchEvent::Completed {
                id,
                bytes: bytes.into(),
            })
            .is_ok()
    }

    /// Fail the oldest request to `url`.
    pub fn fail(&self, url: &str, message: &str) -> bool {
        let Some(id) = self.take(url) else {
            return false;
        };
        self.tx
            .send(FetchEvent::Failed {
                id,
                message: message.to_owned(),
            })
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_urls_resolve_against_reference() {
        assert_eq!(resolve_url("models/meta.json", "heart.json"), "models/heart.json");
        assert_eq!(
            resolve_url("https://x.org/a/b.json", "c/d.json"),
            "https://x.org/a/c/d.json"
        );
        assert_eq!(resolve_url("a/b.json", "https://y.org/z"), "https://y.org/z");
        assert_eq!(resolve_url("meta.json", "heart.json"), "heart.json");
    }

    #[test]
    fn manual_source_answers_in_order() {
        let mut source = ManualSource::new();
        let handle = source.handle();
        source.fetch(1, "a.json");
        source.fetch(2, "b.json");
        assert_eq!(handle.pending().len(), 2);
        assert!(handle.progress("b.json", 5, 10));
        assert!(handle.complete("b.json", b"{}".to_vec()));
        assert!(!handle.complete("b.json", Vec::new()));
        assert!(handle.fail("a.json", "404"));
        let events = source.poll();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0], FetchEvent::Progress { id: 2, loaded: 5, total: 10 });
        assert_eq!(events[2].id(), 1);
        assert!(source.poll().is_empty());
    }

    #[test]
    fn file_source_reads_and_reports_missing() {
        let dir = std::env::temp_dir().join("morphview-file-source");
        let _ = std::fs::create_dir_all(&dir);
        std::fs::write(dir.join("present.txt"), b"hello").unwrap();
        let mut source = FileSource::new(&dir);
        source.fetch(7, "present.txt");
        source.fetch(8, "missing.txt");

        let mut done = Vec::new();
        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
        while done.len() < 2 && std::time::Instant::now() < deadline {
            done.extend(
                source
                    .poll()
                    .into_iter()
                    .filter(|e| !matches!(e, FetchEvent::Progress { .. })),
            );
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
        assert!(done.contains(&FetchEvent::Completed {
            id: 7,
            bytes: b"hello".to_vec()
        }));
        assert!(done.iter().any(|e| matches!(e, FetchEvent::Failed { id: 8, .. })));
    }
}
