use std::collections::BTreeMap;
use std::sync::RwLock;

use crate::core::errors::{PgpVaultError, Result};
use crate::core::traits::storage::Storage;

/// In-process storage, used by tests and embedders without a host.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned() -> PgpVaultError {
        PgpVaultError::StorageUnavailable {
            detail: "memory storage lock poisoned".into(),
        }
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let entries = self.entries.read().map_err(|_| Self::poisoned())?;
        Ok(entries.get(key).cloned())
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        let mut entries = self.entries.write().map_err(|_| Self::poisoned())?;
        entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.write().map_err(|_| Self::poisoned())?;
        entries.remove(key);
        Ok(())
    }

    fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let entries = self.entries.read().map_err(|_| Self::poisoned())?;
        let mut children: Vec<String> = entries
            .keys()
            .filter_map(|k| k.strip_prefix(prefix))
            .map(|rest| match rest.split_once('/') {
                Some((dir, _)) => format!("{dir}/"),
                None => rest.to_string(),
            })
            .collect();
        children.dedup();
        Ok(children)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_missing_returns_none() {
        let storage = MemoryStorage::new();
        assert!(storage.get("keys/nope").unwrap().is_none());
    }

    #[test]
    fn put_get_delete() {
        let storage = MemoryStorage::new();
        storage.put("keys/a", b"one").unwrap();
        assert_eq!(storage.get("keys/a").unwrap().as_deref(), Some(&b"one"[..]));

        storage.put("keys/a", b"two").unwrap();
        assert_eq!(storage.get("keys/a").unwrap().as_deref(), Some(&b"two"[..]));

        storage.delete("keys/a").unwrap();
        assert!(storage.get("keys/a").unwrap().is_none());
    }

    #[test]
    fn delete_missing_is_ok() {
        let storage = MemoryStorage::new();
        assert!(storage.delete("keys/ghost").is_ok());
    }

    #[test]
    fn list_returns_immediate_children() {
        let storage = MemoryStorage::new();
        storage.put("keys/b", b"").unwrap();
        storage.put("keys/a", b"").unwrap();
        storage.put("keys/nested/c", b"").unwrap();
        storage.put("other/x", b"").unwrap();

        let names = storage.list("keys/").unwrap();
        assert_eq!(names, vec!["a", "b", "nested/"]);
    }
}
