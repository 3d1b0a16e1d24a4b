use std::io::Write;
use std::path::{Component, Path, PathBuf};

use crate::core::errors::{PgpVaultError, Result};
use crate::core::traits::storage::Storage;

/// File-based storage that maps each storage path to a file.
///
/// `keys/alice` lives at `<root>/keys/alice`. Writes go to a temporary
/// file in the same directory and are renamed into place, so a crash
/// mid-write never leaves a truncated record behind.
///
/// Example layout:
/// ```text
/// ~/.local/share/pgpvault/
///   config.toml
///   keys/
///     alice
///     bob
/// ```
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    /// Create a storage rooted at the given directory.
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Return the directory this storage reads from.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a storage key to a path, refusing anything that escapes the root.
    fn resolve(&self, key: &str) -> Result<PathBuf> {
        let relative = Path::new(key.trim_end_matches('/'));
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));

        if key.is_empty() || escapes {
            return Err(PgpVaultError::StorageUnavailable {
                detail: format!("refusing storage path '{key}'"),
            });
        }

        Ok(self.root.join(relative))
    }

    fn io_error(action: &str, path: &Path, e: std::io::Error) -> PgpVaultError {
        PgpVaultError::StorageUnavailable {
            detail: format!("cannot {action} {}: {e}", path.display()),
        }
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.resolve(key)?;

        if !path.is_file() {
            return Ok(None);
        }

        std::fs::read(&path)
            .map(Some)
            .map_err(|e| Self::io_error("read", &path, e))
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        let path = self.resolve(key)?;
        let parent = path.parent().unwrap_or(&self.root);

        std::fs::create_dir_all(parent).map_err(|e| Self::io_error("create", parent, e))?;

        let mut tmp =
            tempfile::NamedTempFile::new_in(parent).map_err(|e| Self::io_error("write", parent, e))?;
        tmp.write_all(value)
            .and_then(|_| tmp.as_file().sync_all())
            .map_err(|e| Self::io_error("write", tmp.path(), e))?;
        tmp.persist(&path)
            .map_err(|e| Self::io_error("replace", &path, e.error))?;

        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        let path = self.resolve(key)?;

        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Self::io_error("delete", &path, e)),
        }
    }

    fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let dir = self.resolve(prefix)?;

        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let entries = std::fs::read_dir(&dir).map_err(|e| Self::io_error("list", &dir, e))?;
        let mut children = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|e| Self::io_error("list", &dir, e))?;
            let name = entry.file_name().to_string_lossy().to_string();

            // Leftovers of interrupted writes
            if name.starts_with(".tmp") {
                continue;
            }

            if entry.path().is_dir() {
                children.push(format!("{name}/"));
            } else {
                children.push(name);
            }
        }

        children.sort();
        Ok(children)
    }
}
