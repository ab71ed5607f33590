//! Persistence of computed run data.
//!
//! Entries are written and read whole, one per `(owner, repo, run id)`.
//! There is no locking: at most one writer per key is expected.

use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::{Path, PathBuf};

use octocrab::models::RunId;
use parking_lot::Mutex;

use crate::error::FetchError;
use crate::WorkflowRunData;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub owner: String,
    pub repo: String,
    pub run_id: RunId,
}

impl CacheKey {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>, run_id: RunId) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            run_id,
        }
    }
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{}/workflow_runs/{}.json",
            self.owner, self.repo, self.run_id
        )
    }
}

/// Byte-level key-value storage behind [`RunCache`].
#[async_trait::async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> io::Result<Option<Vec<u8>>>;
    async fn put(&self, key: &str, value: Vec<u8>) -> io::Result<()>;
}

/// Stores each key as a file under `root`.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

#[async_trait::async_trait]
impl CacheStore for FileStore {
    async fn get(&self, key: &str) -> io::Result<Option<Vec<u8>>> {
        match tokio::fs::read(self.path(key)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(error),
        }
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> io::Result<()> {
        let path = self.path(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, value).await
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    entries: HashMap<String, Vec<u8>>,
    writes: usize,
}

/// In-process store, mostly useful for tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entry(&self, key: &str) -> Option<Vec<u8>> {
        self.state.lock().entries.get(key).cloned()
    }

    /// Number of `put` calls so far.
    pub fn writes(&self) -> usize {
        self.state.lock().writes
    }
}

#[async_trait::async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> io::Result<Option<Vec<u8>>> {
        Ok(self.entry(key))
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> io::Result<()> {
        let mut state = self.state.lock();
        state.entries.insert(key.to_string(), value);
        state.writes += 1;
        Ok(())
    }
}

/// Typed view over a [`CacheStore`] holding serialized [`WorkflowRunData`].
#[derive(Debug)]
pub struct RunCache<S> {
    store: S,
}

impl<S: CacheStore> RunCache<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns the cached entry, or `None` on a miss. An entry that does not
    /// deserialize is an error, not a miss.
    pub async fn lookup(&self, key: &CacheKey) -> Result<Option<WorkflowRunData>, FetchError> {
        let key = key.to_string();
        let Some(bytes) = self
            .store
            .get(&key)
            .await
            .map_err(|source| FetchError::Cache {
                key: key.clone(),
                source,
            })?
        else {
            return Ok(None);
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| FetchError::MalformedCache { key, source })
    }

    pub async fn write(&self, key: &CacheKey, data: &WorkflowRunData) -> Result<(), FetchError> {
        let bytes = serde_json::to_vec(data).map_err(|source| FetchError::Serialize {
            run_id: key.run_id,
            source,
        })?;
        let key = key.to_string();
        self.store
            .put(&key, bytes)
            .await
            .map_err(|source| FetchError::Cache { key, source })
    }
}
