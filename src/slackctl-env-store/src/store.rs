//! File-backed and in-memory credential stores.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::grammar::EnvDocument;
use crate::{EnvStoreError, Result, validate_entry};

/// Durable key-value storage for credentials and settings.
pub trait CredentialStore {
    /// Read the current value for `key`, if any.
    fn get_value(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing an existing entry or adding one.
    fn set_value(&mut self, key: &str, value: &str) -> Result<()>;
}

/// An env file on disk.
///
/// Every `set_value` reads the whole file, updates one line and writes the
/// whole file back using the host line separator. The new content goes to
/// a temporary file in the same directory which then replaces the env file,
/// so a failed write leaves the previous content in place.
#[derive(Debug, Clone)]
pub struct EnvFile {
    path: PathBuf,
}

impl EnvFile {
    /// Create a handle for the env file at `path`. Nothing is read yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the env file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the env file exists.
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Create an empty env file if none exists.
    ///
    /// An existing file is left untouched. Returns `true` when a file was
    /// created.
    pub fn create_if_missing(&self) -> Result<bool> {
        match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.path)
        {
            Ok(_) => {
                debug!("Created env file {}", self.path.display());
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(false),
            Err(e) => Err(EnvStoreError::Write {
                path: self.path.clone(),
                source: e,
            }),
        }
    }

    /// Read and parse the env file.
    pub fn load(&self) -> Result<EnvDocument> {
        let content = fs::read_to_string(&self.path).map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                EnvStoreError::NotFound {
                    path: self.path.clone(),
                }
            } else {
                EnvStoreError::Read {
                    path: self.path.clone(),
                    source: e,
                }
            }
        })?;
        Ok(EnvDocument::parse(&content))
    }

    fn save(&self, document: &EnvDocument) -> Result<()> {
        let content = document.render();
        write_atomically(&self.path, |file| file.write_all(content.as_bytes())).map_err(|e| {
            warn!("Failed to write env file {}: {}", self.path.display(), e);
            EnvStoreError::Write {
                path: self.path.clone(),
                source: e,
            }
        })
    }
}

/// Replace `path` with whatever `write` puts into a temporary sibling file.
///
/// The temporary file is synced and renamed over `path` only after `write`
/// succeeds; on any error it is removed and `path` is untouched. Existing
/// permissions on `path` carry over to the new file.
fn write_atomically<F>(path: &Path, write: F) -> io::Result<()>
where
    F: FnOnce(&mut NamedTempFile) -> io::Result<()>,
{
    let parent = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(parent)?;
    if let Ok(metadata) = fs::metadata(path) {
        temp.as_file().set_permissions(metadata.permissions())?;
    }

    write(&mut temp)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;

    debug!(path = %path.display(), "Atomic write completed");
    Ok(())
}

impl CredentialStore for EnvFile {
    fn get_value(&self, key: &str) -> Result<Option<String>> {
        Ok(self.load()?.get(key).map(str::to_string))
    }

    fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        validate_entry(key, value)?;

        let mut document = self.load()?;
        let replaced = document.upsert(key, value);
        self.save(&document)?;

        if replaced {
            debug!("Updated '{}' in {}", key, self.path.display());
        } else {
            debug!("Added '{}' to {}", key, self.path.display());
        }
        Ok(())
    }
}

/// In-memory store, useful for dry runs and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MemoryStore {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl CredentialStore for MemoryStore {
    fn get_value(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        validate_entry(key, value)?;
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LINE_SEPARATOR;

    fn env_file_with(content: &str) -> (tempfile::TempDir, EnvFile) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        fs::write(&path, content).unwrap();
        (dir, EnvFile::new(path))
    }

    fn lines_of(file: &EnvFile) -> Vec<String> {
        fs::read_to_string(file.path())
            .unwrap()
            .split(LINE_SEPARATOR)
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_set_value_replaces_in_place() {
        let (_dir, mut file) = env_file_with("A=1\nB=2\nC=3");

        file.set_value("B", "9").unwrap();

        assert_eq!(lines_of(&file), ["A=1", "B=9", "C=3"]);
    }

    #[test]
    fn test_set_value_is_idempotent() {
        let (_dir, mut file) = env_file_with("A=1");

        file.set_value("K", "V").unwrap();
        file.set_value("K", "V").unwrap();

        let lines = lines_of(&file);
        assert_eq!(lines.iter().filter(|l| l.starts_with("K=")).count(), 1);
        assert_eq!(lines, ["A=1", "K=V"]);
    }

    #[test]
    fn test_set_value_does_not_touch_comments() {
        let (_dir, mut file) = env_file_with("# K=old\nA=1");

        file.set_value("K", "new").unwrap();

        assert_eq!(lines_of(&file), ["# K=old", "A=1", "K=new"]);
    }

    #[test]
    fn test_set_value_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = EnvFile::new(dir.path().join(".env"));

        let result = file.set_value("K", "V");

        assert!(matches!(result, Err(EnvStoreError::NotFound { .. })));
        assert!(!file.exists());
    }

    #[test]
    fn test_set_value_rejects_invalid_entry_without_writing() {
        let (_dir, mut file) = env_file_with("A=1");

        let result = file.set_value("K", "two\nlines");

        assert!(matches!(result, Err(EnvStoreError::InvalidEntry { .. })));
        assert_eq!(lines_of(&file), ["A=1"]);
    }

    #[test]
    fn test_set_value_collapses_duplicate_keys() {
        let (_dir, mut file) = env_file_with("K=a\nA=1\nK=b\n");

        file.set_value("K", "new").unwrap();

        assert_eq!(
            fs::read_to_string(file.path()).unwrap(),
            format!("K=new{0}A=1{0}", LINE_SEPARATOR)
        );
    }

    #[test]
    fn test_failed_write_keeps_previous_content() {
        let (dir, file) = env_file_with("K=old\nA=1\n");

        let result = write_atomically(file.path(), |temp| {
            temp.write_all(b"K=ne")?;
            Err(io::Error::other("no space left on device"))
        });

        assert!(result.is_err());
        assert_eq!(fs::read_to_string(file.path()).unwrap(), "K=old\nA=1\n");
        // The temporary file is cleaned up
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_write_atomically_replaces_content() {
        let (dir, file) = env_file_with("K=old\n");

        write_atomically(file.path(), |temp| temp.write_all(b"K=new\n")).unwrap();

        assert_eq!(fs::read_to_string(file.path()).unwrap(), "K=new\n");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_get_value() {
        let (_dir, file) = env_file_with("# K=commented\nK=live\nK=shadowed");
        assert_eq!(file.get_value("K").unwrap(), Some("live".to_string()));
        assert_eq!(file.get_value("MISSING").unwrap(), None);
    }

    #[test]
    fn test_create_if_missing() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = EnvFile::new(dir.path().join(".env"));

        assert!(file.create_if_missing().unwrap());
        assert!(file.exists());
        file.set_value("K", "V").unwrap();

        // Second call must not truncate the existing file
        assert!(!file.create_if_missing().unwrap());
        assert_eq!(file.get_value("K").unwrap(), Some("V".to_string()));
    }

    #[test]
    fn test_memory_store() {
        let mut store: MemoryStore = [("A", "1")].into_iter().collect();
        store.set_value("A", "2").unwrap();
        store.set_value("B", "3").unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(store.get_value("A").unwrap(), Some("2".to_string()));
        assert!(store.set_value("", "x").is_err());
    }
}
