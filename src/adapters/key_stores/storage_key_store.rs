use tracing::debug;

use crate::core::context::RequestContext;
use crate::core::errors::{PgpVaultError, Result};
use crate::core::models::key_record::KeyRecord;
use crate::core::traits::key_store::KeyStore;

/// Storage prefix for key records.
pub const KEYS_PREFIX: &str = "keys/";

/// Key store that keeps one JSON record per key under `keys/<name>`
/// in the request's storage.
///
/// Every call checks the request's cancellation token before touching
/// storage.
pub struct StorageKeyStore<'a> {
    ctx: &'a RequestContext<'a>,
}

impl<'a> StorageKeyStore<'a> {
    pub fn new(ctx: &'a RequestContext<'a>) -> Self {
        Self { ctx }
    }

    fn path(name: &str) -> String {
        format!("{KEYS_PREFIX}{name}")
    }
}

impl KeyStore for StorageKeyStore<'_> {
    fn get(&self, name: &str) -> Result<Option<KeyRecord>> {
        self.ctx.check_cancelled()?;

        let Some(raw) = self.ctx.storage().get(&Self::path(name))? else {
            return Ok(None);
        };

        let record = serde_json::from_slice(&raw).map_err(|e| PgpVaultError::KeyCorrupt {
            name: name.to_string(),
            detail: format!("unreadable record: {e}"),
        })?;

        Ok(Some(record))
    }

    fn put(&self, record: &KeyRecord) -> Result<()> {
        self.ctx.check_cancelled()?;

        let raw = serde_json::to_vec(record).map_err(|e| PgpVaultError::StorageUnavailable {
            detail: format!("failed to serialize key record: {e}"),
        })?;

        self.ctx.storage().put(&Self::path(&record.name), &raw)?;
        debug!(name = %record.name, "stored key record");
        Ok(())
    }

    fn delete(&self, name: &str) -> Result<()> {
        self.ctx.check_cancelled()?;
        self.ctx.storage().delete(&Self::path(name))
    }

    fn list(&self) -> Result<Vec<String>> {
        self.ctx.check_cancelled()?;

        let mut names: Vec<String> = self
            .ctx
            .storage()
            .list(KEYS_PREFIX)?
            .into_iter()
            .filter(|n| !n.ends_with('/'))
            .collect();
        names.sort();
        Ok(names)
    }
}
