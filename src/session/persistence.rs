//! Token Persistence
//!
//! Durable key-value storage for the bearer token so a session survives a
//! restart.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{AuthError, StorageError};

/// Token persistence interface.
pub trait TokenPersistence: Send + Sync {
    /// Load the value stored under `key`.
    fn load(&self, key: &str) -> Result<Option<String>, AuthError>;

    /// Store `value` under `key`, replacing any previous value.
    fn save(&self, key: &str, value: &str) -> Result<(), AuthError>;

    /// Remove `key`. Removing a missing key succeeds.
    fn remove(&self, key: &str) -> Result<(), AuthError>;
}

/// In-memory persistence. Nothing survives the process.
#[derive(Default)]
pub struct InMemoryTokenPersistence {
    values: Mutex<HashMap<String, String>>,
}

impl InMemoryTokenPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a key.
    pub fn with_value(key: &str, value: &str) -> Self {
        let persistence = Self::new();
        persistence
            .values
            .lock()
            .insert(key.to_string(), value.to_string());
        persistence
    }
}

impl TokenPersistence for InMemoryTokenPersistence {
    fn load(&self, key: &str) -> Result<Option<String>, AuthError> {
        Ok(self.values.lock().get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<(), AuthError> {
        self.values.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), AuthError> {
        self.values.lock().remove(key);
        Ok(())
    }
}

/// File-backed persistence: one file per key inside a directory.
pub struct FileTokenPersistence {
    dir: PathBuf,
}

impl FileTokenPersistence {
    /// Store files under `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, AuthError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
            && !key.starts_with('.');
        if !valid {
            return Err(AuthError::Storage(StorageError::WriteFailed {
                message: format!("invalid storage key: {:?}", key),
            }));
        }
        Ok(self.dir.join(key))
    }
}

impl TokenPersistence for FileTokenPersistence {
    fn load(&self, key: &str) -> Result<Option<String>, AuthError> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value.trim_end().to_string()).filter(|v| !v.is_empty())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AuthError::Storage(StorageError::ReadFailed {
                message: format!("{}: {}", path.display(), e),
            })),
        }
    }

    fn save(&self, key: &str, value: &str) -> Result<(), AuthError> {
        let path = self.path_for(key)?;
        std::fs::create_dir_all(&self.dir)
            .and_then(|_| std::fs::write(&path, value))
            .map_err(|e| {
                AuthError::Storage(StorageError::WriteFailed {
                    message: format!("{}: {}", path.display(), e),
                })
            })
    }

    fn remove(&self, key: &str) -> Result<(), AuthError> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AuthError::Storage(StorageError::DeleteFailed {
                message: format!("{}: {}", path.display(), e),
            })),
        }
    }
}

/// Persistence operation recorded by [`MockTokenPersistence`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PersistenceOp {
    Load(String),
    Save(String),
    Remove(String),
}

/// Mock persistence for testing.
///
/// Values are kept in memory; every call is recorded and writes can be made
/// to fail.
#[derive(Default)]
pub struct MockTokenPersistence {
    inner: InMemoryTokenPersistence,
    history: Mutex<Vec<PersistenceOp>>,
    fail_writes: Mutex<bool>,
}

impl MockTokenPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a key.
    pub fn with_value(key: &str, value: &str) -> Self {
        Self {
            inner: InMemoryTokenPersistence::with_value(key, value),
            ..Self::default()
        }
    }

    /// Make subsequent saves and removes fail.
    pub fn set_fail_writes(&self, fail: bool) {
        *self.fail_writes.lock() = fail;
    }

    /// All recorded operations.
    pub fn history(&self) -> Vec<PersistenceOp> {
        self.history.lock().clone()
    }

    /// Current value without recording a load.
    pub fn peek(&self, key: &str) -> Option<String> {
        self.inner.values.lock().get(key).cloned()
    }

    fn check_writable(&self) -> Result<(), AuthError> {
        if *self.fail_writes.lock() {
            return Err(AuthError::Storage(StorageError::WriteFailed {
                message: "mock write failure".to_string(),
            }));
        }
        Ok(())
    }
}

impl TokenPersistence for MockTokenPersistence {
    fn load(&self, key: &str) -> Result<Option<String>, AuthError> {
        self.history.lock().push(PersistenceOp::Load(key.to_string()));
        self.inner.load(key)
    }

    fn save(&self, key: &str, value: &str) -> Result<(), AuthError> {
        self.history.lock().push(PersistenceOp::Save(key.to_string()));
        self.check_writable()?;
        self.inner.save(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), AuthError> {
        self.history.lock().push(PersistenceOp::Remove(key.to_string()));
        self.check_writable()?;
        self.inner.remove(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_roundtrip() {
        let persistence = InMemoryTokenPersistence::new();
        assert_eq!(persistence.load("token").unwrap(), None);

        persistence.save("token", "abc").unwrap();
        assert_eq!(persistence.load("token").unwrap().as_deref(), Some("abc"));

        persistence.remove("token").unwrap();
        persistence.remove("token").unwrap();
        assert_eq!(persistence.load("token").unwrap(), None);
    }

    #[test]
    fn test_file_persistence() {
        let dir = tempfile::tempdir().unwrap();
        let persistence = FileTokenPersistence::new(dir.path().join("session"));

        assert_eq!(persistence.load("token").unwrap(), None);
        persistence.save("token", "abc.def").unwrap();
        assert_eq!(persistence.load("token").unwrap().as_deref(), Some("abc.def"));

        let reopened = FileTokenPersistence::new(dir.path().join("session"));
        assert_eq!(reopened.load("token").unwrap().as_deref(), Some("abc.def"));

        reopened.remove("token").unwrap();
        assert_eq!(persistence.load("token").unwrap(), None);
        reopened.remove("token").unwrap();
    }

    #[test]
    fn test_file_persistence_rejects_path_keys() {
        let dir = tempfile::tempdir().unwrap();
        let persistence = FileTokenPersistence::new(dir.path());

        for key in ["", "../token", "a/b", ".hidden"] {
            assert!(matches!(
                persistence.save(key, "x"),
                Err(AuthError::Storage(_))
            ));
        }
    }

    #[test]
    fn test_mock_persistence_records_and_fails() {
        let persistence = MockTokenPersistence::with_value("token", "old");
        assert_eq!(persistence.load("token").unwrap().as_deref(), Some("old"));

        persistence.set_fail_writes(true);
        assert!(persistence.save("token", "new").is_err());
        assert_eq!(persistence.peek("token").as_deref(), Some("old"));

        assert_eq!(
            persistence.history(),
            vec![
                PersistenceOp::Load("token".to_string()),
                PersistenceOp::Save("token".to_string()),
            ]
        );
    }
}
