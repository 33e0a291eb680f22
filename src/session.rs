//! Bearer-token session storage.
//!
//! The backend hands out an opaque token string; this module only stores
//! and retrieves it. Authentication state is derived from the stored token
//! by the auth state slice.

use std::fs;
use std::io;
use std::path::PathBuf;

/// Opaque key-value storage for the session token.
pub trait TokenStore {
    fn get(&self) -> Option<String>;
    fn set(&mut self, token: &str) -> io::Result<()>;
    fn remove(&mut self) -> io::Result<()>;
}

/// In-memory token store; the session ends with the process.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Option<String>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self) -> Option<String> {
        self.token.clone()
    }

    fn set(&mut self, token: &str) -> io::Result<()> {
        self.token = Some(token.to_string());
        Ok(())
    }

    fn remove(&mut self) -> io::Result<()> {
        self.token = None;
        Ok(())
    }
}

/// File-backed token store, so a session survives restarts.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self) -> Option<String> {
        let contents = fs::read_to_string(&self.path).ok()?;
        let token = contents.trim();
        if token.is_empty() {
            None
        } else {
            Some(token.to_string())
        }
    }

    fn set(&mut self, token: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, token)
    }

    fn remove(&mut self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_round_trip() {
        let mut store = MemoryTokenStore::new();
        assert_eq!(store.get(), None);

        store.set("abc123").unwrap();
        assert_eq!(store.get(), Some("abc123".to_string()));

        store.remove().unwrap();
        assert_eq!(store.get(), None);
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileTokenStore::new(dir.path().join("session").join("token"));

        assert_eq!(store.get(), None);
        store.set("tok-1").unwrap();
        assert_eq!(store.get(), Some("tok-1".to_string()));

        // Reopening at the same path sees the same token.
        let reopened = FileTokenStore::new(dir.path().join("session").join("token"));
        assert_eq!(reopened.get(), Some("tok-1".to_string()));

        store.remove().unwrap();
        assert_eq!(store.get(), None);
        // Removing twice is fine.
        store.remove().unwrap();
    }
}
