//! Session scoped key/value storage for the access token and the PKCE verifier.

use snafu::ResultExt;
use tracing::debug;

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{SpotifyResult, Storage, StorageFormat};

/// Key of the access token obtained from the code exchange.
pub const ACCESS_TOKEN_KEY: &str = "access-token";
/// Key of the code verifier kept between the redirect and the code exchange.
pub const VERIFIER_KEY: &str = "verifier";

/// Storage that lives as long as the user's session.
pub trait SessionStore {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&mut self, key: &str, value: &str) -> SpotifyResult<()>;

    fn remove(&mut self, key: &str) -> SpotifyResult<()>;
}

/// In process storage, lost when the store is dropped.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> SpotifyResult<()> {
        self.entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> SpotifyResult<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Storage backed by a JSON object on disk, so a session survives the authorization redirect
/// when the client runs as separate processes.
///
/// # Example
///
/// ```no_run
/// use weather_tunes::session::{FileStore, SessionStore, ACCESS_TOKEN_KEY};
///
/// let store = FileStore::open(".session.json").unwrap();
/// let token = store.get(ACCESS_TOKEN_KEY);
/// ```
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: HashMap<String, String>,
}

impl FileStore {
    /// Load the store at ``path``. A missing file is an empty session.
    pub fn open<P: AsRef<Path>>(path: P) -> SpotifyResult<Self> {
        let path = path.as_ref().to_path_buf();

        let entries = match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).context(StorageFormat { path: &path })?,
            Err(e) if e.kind() == ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e).context(Storage { path: &path }),
        };

        debug!(path = %path.display(), entries = entries.len(), "Opened session store");

        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> SpotifyResult<()> {
        let contents =
            serde_json::to_string_pretty(&self.entries).context(StorageFormat { path: &self.path })?;
        fs::write(&self.path, contents).context(Storage { path: &self.path })
    }
}

impl SessionStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> SpotifyResult<()> {
        self.entries.insert(key.to_owned(), value.to_owned());
        self.flush()
    }

    fn remove(&mut self, key: &str) -> SpotifyResult<()> {
        if self.entries.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SpotifyError;

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get(ACCESS_TOKEN_KEY), None);

        store.set(ACCESS_TOKEN_KEY, "BQDx").unwrap();
        assert_eq!(store.get(ACCESS_TOKEN_KEY).as_deref(), Some("BQDx"));

        store.remove(ACCESS_TOKEN_KEY).unwrap();
        assert_eq!(store.get(ACCESS_TOKEN_KEY), None);
    }

    #[test]
    fn test_file_store_persists_between_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let mut store = FileStore::open(&path).unwrap();
        store.set(VERIFIER_KEY, "abc123").unwrap();
        store.set(ACCESS_TOKEN_KEY, "BQDx").unwrap();
        store.remove(VERIFIER_KEY).unwrap();

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get(ACCESS_TOKEN_KEY).as_deref(), Some("BQDx"));
        assert_eq!(reopened.get(VERIFIER_KEY), None);
    }

    #[test]
    fn test_file_store_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("absent.json")).unwrap();

        assert_eq!(store.get(ACCESS_TOKEN_KEY), None);
    }

    #[test]
    fn test_file_store_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "not json").unwrap();

        match FileStore::open(&path) {
            Err(SpotifyError::StorageFormat { .. }) => {}
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
