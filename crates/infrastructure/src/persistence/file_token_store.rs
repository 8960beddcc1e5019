//! File-backed token store.
//!
//! Tokens live in a single JSON file so that several processes (a CLI run,
//! a webhook worker) share one login:
//!
//! ```json
//! {
//!   "ringcentral:abc:access_token": {
//!     "value": "U1BCMDFUMDRKV1MwMnxBQ...",
//!     "expires_at": "2024-05-01T13:00:00Z"
//!   }
//! }
//! ```
//!
//! Writers hold an exclusive OS lock on a sibling `.lock` file for the whole
//! read-modify-write, and replace the token file by renaming a uniquely named
//! temp file over it. Readers never lock: they see either the old or the new
//! file. Both files are created owner-only (0600) on unix.

use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ringcentral_application::ports::{Clock, StoreError, TokenStore};
use ringcentral_domain::expires_after;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::adapters::SystemClock;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredToken {
    value: String,
    expires_at: DateTime<Utc>,
}

type TokenFile = BTreeMap<String, StoredToken>;

/// Token store persisted as a JSON file.
#[derive(Clone)]
pub struct FileTokenStore {
    path: PathBuf,
    clock: Arc<dyn Clock>,
}

impl FileTokenStore {
    /// Creates a store writing to `path`. The file is created on first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_clock(path, Arc::new(SystemClock::new()))
    }

    /// Creates a store that reads time from `clock`.
    #[must_use]
    pub fn with_clock(path: impl Into<PathBuf>, clock: Arc<dyn Clock>) -> Self {
        Self {
            path: path.into(),
            clock,
        }
    }

    /// Location of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn parse(path: &Path, bytes: &[u8]) -> Result<TokenFile, StoreError> {
    if bytes.is_empty() {
        return Ok(TokenFile::new());
    }
    serde_json::from_slice(bytes)
        .map_err(|e| StoreError::Serialization(format!("{}: {e}", path.display())))
}

fn read_tokens(path: &Path) -> Result<TokenFile, StoreError> {
    match std::fs::read(path) {
        Ok(bytes) => parse(path, &bytes),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(TokenFile::new()),
        Err(e) => Err(StoreError::Io(e)),
    }
}

fn lock_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".lock");
    path.with_file_name(name)
}

fn open_lock_file(path: &Path) -> std::io::Result<File> {
    let mut options = OpenOptions::new();
    options.create(true).truncate(false).write(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    options.open(path)
}

/// Writes `tokens` next to `path` under a fresh name, then renames it over
/// `path`. `tempfile` creates the file with mode 0600 on unix.
fn replace_file(path: &Path, dir: &Path, tokens: &TokenFile) -> Result<(), StoreError> {
    let mut content = serde_json::to_vec_pretty(tokens)
        .map_err(|e| StoreError::Serialization(e.to_string()))?;
    content.push(b'\n');

    let mut tmp = tempfile::Builder::new()
        .prefix(".tokens-")
        .suffix(".tmp")
        .tempfile_in(dir)?;
    tmp.write_all(&content)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| StoreError::Io(e.error))?;
    Ok(())
}

/// Inserts one entry while holding the writer lock, dropping expired ones.
fn update_locked(
    path: &Path,
    key: String,
    token: StoredToken,
    now: DateTime<Utc>,
) -> Result<(), StoreError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let lock = open_lock_file(&lock_path(path))?;
    lock.lock()?;

    let mut tokens = read_tokens(path)?;
    tokens.retain(|_, t| t.expires_at > now);
    tokens.insert(key, token);
    replace_file(path, dir, &tokens)
}

impl std::fmt::Debug for FileTokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileTokenStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn has(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.get(key).await?.is_some())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let now = self.clock.now();
        let tokens = match tokio::fs::read(&self.path).await {
            Ok(bytes) => parse(&self.path, &bytes)?,
            Err(e) if e.kind() == ErrorKind::NotFound => TokenFile::new(),
            Err(e) => return Err(StoreError::Io(e)),
        };
        Ok(tokens
            .get(key)
            .filter(|t| t.expires_at > now)
            .map(|t| t.value.clone()))
    }

    async fn put(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), StoreError> {
        let now = self.clock.now();
        let token = StoredToken {
            value: value.to_string(),
            expires_at: expires_after(now, ttl_seconds),
        };

        let path = self.path.clone();
        let owned_key = key.to_string();
        tokio::task::spawn_blocking(move || update_locked(&path, owned_key, token, now))
            .await
            .map_err(std::io::Error::other)??;

        debug!(path = %self.path.display(), %key, ttl_seconds, "token stored");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;
    use tempfile::TempDir;

    struct FixedClock(StdMutex<DateTime<Utc>>);

    impl FixedClock {
        fn at(rfc3339: &str) -> Arc<Self> {
            Arc::new(Self(StdMutex::new(
                DateTime::parse_from_rfc3339(rfc3339).unwrap().to_utc(),
            )))
        }

        fn advance(&self, seconds: i64) {
            *self.0.lock().unwrap() += chrono::Duration::seconds(seconds);
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            *self.0.lock().unwrap()
        }
    }

    #[tokio::test]
    async fn test_missing_file_reads_empty() {
        let dir = TempDir::new().unwrap();
        let store = FileTokenStore::new(dir.path().join("tokens.json"));

        assert!(!store.has("k").await.unwrap());
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_put_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("tokens.json");
        let store = FileTokenStore::new(&path);

        store.put("k", "v", 60).await.unwrap();

        assert!(path.exists());
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v"));
    }

    #[tokio::test]
    async fn test_entries_expire() {
        let dir = TempDir::new().unwrap();
        let clock = FixedClock::at("2024-05-01T00:00:00Z");
        let store = FileTokenStore::with_clock(dir.path().join("tokens.json"), clock.clone());

        store.put("k", "v", 60).await.unwrap();
        clock.advance(59);
        assert!(store.has("k").await.unwrap());
        clock.advance(1);
        assert!(!store.has("k").await.unwrap());
    }

    #[tokio::test]
    async fn test_two_stores_share_the_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tokens.json");
        let writer = FileTokenStore::new(&path);
        let reader = FileTokenStore::new(&path);

        writer.put("a", "1", 60).await.unwrap();
        writer.put("b", "2", 60).await.unwrap();

        assert_eq!(reader.get("a").await.unwrap().as_deref(), Some("1"));
        assert_eq!(reader.get("b").await.unwrap().as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn test_put_drops_expired_entries() {
        let dir = TempDir::new().unwrap();
        let clock = FixedClock::at("2024-05-01T00:00:00Z");
        let path = dir.path().join("tokens.json");
        let store = FileTokenStore::with_clock(&path, clock.clone());

        store.put("old", "x", 10).await.unwrap();
        clock.advance(20);
        store.put("new", "y", 10).await.unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(!raw.contains("\"old\""));
        assert!(raw.contains("\"new\""));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_writers_keep_every_key() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tokens.json");

        for round in 0..50 {
            let first = FileTokenStore::new(&path);
            let second = FileTokenStore::new(&path);
            let a_key = format!("a-{round}");
            let b_key = format!("b-{round}");

            let (a, b) = tokio::join!(
                tokio::spawn({
                    let key = a_key.clone();
                    async move { first.put(&key, "1", 600).await }
                }),
                tokio::spawn({
                    let key = b_key.clone();
                    async move { second.put(&key, "2", 600).await }
                }),
            );
            a.unwrap().unwrap();
            b.unwrap().unwrap();

            let reader = FileTokenStore::new(&path);
            assert_eq!(reader.get(&a_key).await.unwrap().as_deref(), Some("1"));
            assert_eq!(reader.get(&b_key).await.unwrap().as_deref(), Some("2"));
        }

        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_token_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tokens.json");
        FileTokenStore::new(&path).put("k", "v", 60).await.unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        let lock_mode = std::fs::metadata(lock_path(&path)).unwrap().permissions().mode();
        assert_eq!(lock_mode & 0o077, 0);
    }

    #[test]
    fn test_lock_path_is_sibling() {
        assert_eq!(
            lock_path(Path::new("/var/lib/rc/tokens.json")),
            PathBuf::from("/var/lib/rc/tokens.json.lock")
        );
    }

    #[tokio::test]
    async fn test_corrupt_file_is_serialization_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tokens.json");
        std::fs::write(&path, "{not json").unwrap();
        let store = FileTokenStore::new(&path);

        let err = store.get("k").await.unwrap_err();
        assert!(matches!(err, StoreError::Serialization(_)));
    }
}
