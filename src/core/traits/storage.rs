use crate::core::errors::Result;

/// Port for the host's key-value storage.
///
/// Keys are slash-separated paths (`keys/alice`). Implementations must
/// make `put` atomic per key: a failed write leaves the previous value
/// intact. There is no multi-key transaction.
pub trait Storage: Send + Sync {
    /// Read a value; `Ok(None)` when the path holds nothing.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Write a value, replacing any previous one.
    fn put(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Remove a value. Deleting a missing path is not an error.
    fn delete(&self, key: &str) -> Result<()>;

    /// List the immediate children under `prefix` (which ends in `/`).
    fn list(&self, prefix: &str) -> Result<Vec<String>>;
}
