//! Where the page components get their JSON from.
//! `DirSource` reads the data directory the server also publishes and
//! `HttpSource` pulls from a remote origin. `MemorySource` holds bodies
//! fetched ahead of time, by the browser driver or by tests.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;

use url::Url;

use crate::models::SchemaError;

#[derive(Debug, Clone, PartialEq)]
pub enum FetchError {
    /// The source answered with a non-success status.
    Status(u16),
    /// The request never produced a response.
    Network(String),
    /// The body could not be read as the expected record array.
    Parse(String),
    /// The body parsed but a record broke the schema.
    Schema { index: usize, reason: String },
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::Status(code) => write!(f, "HTTP error! status: {}", code),
            FetchError::Network(msg) => write!(f, "network error: {}", msg),
            FetchError::Parse(msg) => write!(f, "invalid JSON: {}", msg),
            FetchError::Schema { index, reason } => {
                write!(f, "record {} rejected: {}", index, reason)
            }
        }
    }
}

impl std::error::Error for FetchError {}

impl From<SchemaError> for FetchError {
    fn from(err: SchemaError) -> Self {
        match err {
            SchemaError::Malformed(msg) => FetchError::Parse(msg),
            SchemaError::Invalid { index, reason } => FetchError::Schema { index, reason },
        }
    }
}

/// Resolves a site-relative path (e.g. `/data/projects.json`) to a body.
pub trait DataSource: Send + Sync {
    fn fetch(&self, path: &str) -> Result<String, FetchError>;
}

// ── Filesystem ────────────────────────────────────────

/// Serves `/data/<file>` from a local directory. Only the file name of the
/// requested path is used, so nothing outside `root` is reachable.
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DirSource { root: root.into() }
    }
}

impl DataSource for DirSource {
    fn fetch(&self, path: &str) -> Result<String, FetchError> {
        let name = path
            .rsplit('/')
            .next()
            .filter(|n| !n.is_empty() && *n != "." && *n != "..")
            .ok_or(FetchError::Status(404))?;
        match fs::read_to_string(self.root.join(name)) {
            Ok(body) => Ok(body),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(FetchError::Status(404)),
            Err(e) => Err(FetchError::Network(e.to_string())),
        }
    }
}

// ── HTTP ──────────────────────────────────────────────

/// Parse a data base URL. Its path is treated as a directory, so
/// `https://host/site` and `https://host/site/` resolve the same way.
pub fn data_base(base: &str) -> Result<Url, FetchError> {
    let mut url = Url::parse(base)
        .map_err(|e| FetchError::Network(format!("bad base URL '{}': {}", base, e)))?;
    if !url.path().ends_with('/') {
        let dir = format!("{}/", url.path());
        url.set_path(&dir);
    }
    Ok(url)
}

/// Resolve a site-relative data path under `base`, keeping the base path.
pub fn resolve_data_url(base: &Url, path: &str) -> Result<Url, FetchError> {
    base.join(path.trim_start_matches('/'))
        .map_err(|e| FetchError::Network(format!("cannot resolve '{}': {}", path, e)))
}

/// Pulls data from a remote origin. A blocking client is built per fetch so
/// none is ever owned (or dropped) by an async runtime thread.
#[cfg(not(target_arch = "wasm32"))]
pub struct HttpSource {
    base: Url,
}

#[cfg(not(target_arch = "wasm32"))]
impl HttpSource {
    pub fn new(base: &str) -> Result<Self, FetchError> {
        Ok(HttpSource { base: data_base(base)? })
    }

    fn client(&self) -> Result<reqwest::blocking::Client, FetchError> {
        reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))
    }

    pub fn resolve(&self, path: &str) -> Result<Url, FetchError> {
        resolve_data_url(&self.base, path)
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl DataSource for HttpSource {
    fn fetch(&self, path: &str) -> Result<String, FetchError> {
        let url = self.resolve(path)?;
        let resp = self
            .client()?
            .get(url)
            .send()
            .map_err(|e| FetchError::Network(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        resp.text().map_err(|e| FetchError::Network(e.to_string()))
    }
}

// ── In-memory ─────────────────────────────────────────

/// Fixed responses keyed by path. Unknown paths answer 404.
#[derive(Default)]
pub struct MemorySource {
    responses: HashMap<String, Result<(u16, String), FetchError>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, path: &str, status: u16, body: &str) -> Self {
        self.insert(path, status, body);
        self
    }

    pub fn insert(&mut self, path: &str, status: u16, body: &str) {
        self.responses
            .insert(path.to_string(), Ok((status, body.to_string())));
    }

    /// Record a fetch that never produced a response.
    pub fn insert_failure(&mut self, path: &str, err: FetchError) {
        self.responses.insert(path.to_string(), Err(err));
    }
}

impl DataSource for MemorySource {
    fn fetch(&self, path: &str) -> Result<String, FetchError> {
        match self.responses.get(path) {
            Some(Ok((status, body))) if (200..300).contains(status) => Ok(body.clone()),
            Some(Ok((status, _))) => Err(FetchError::Status(*status)),
            Some(Err(err)) => Err(err.clone()),
            None => Err(FetchError::Status(404)),
        }
    }
}
