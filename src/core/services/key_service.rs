use chrono::Utc;
use tracing::info;

use crate::adapters::openpgp::entity::{Entity, is_protected, unlock};
use crate::adapters::openpgp::keygen::{ImportedKey, generate_secret_key, parse_import};
use crate::config::app_config::EngineSection;
use crate::core::errors::{PgpVaultError, Result};
use crate::core::models::key_record::{GenerationParams, KeyInfo, KeyRecord};
use crate::core::models::requests::{GenerateKeyRequest, ImportKeyRequest, validate_key_name};
use crate::core::traits::key_store::KeyStore;

/// Manages named key records through a `KeyStore` backend.
pub struct KeyService<K: KeyStore> {
    pub store: K,
    pub engine: EngineSection,
}

impl<K: KeyStore> KeyService<K> {
    /// Generate a new key pair and store it under `req.name`.
    ///
    /// The name collision check runs before generation so a conflicting
    /// request costs nothing.
    pub fn generate(&self, req: &GenerateKeyRequest) -> Result<KeyRecord> {
        let bits = self.engine.key_bits(req.key_bits)?;
        let user_id = req.user_id();
        if user_id.is_empty() {
            return Err(PgpVaultError::MissingField {
                field: "real_name".into(),
            });
        }
        self.ensure_free(&req.name, req.overwrite)?;

        let secret = generate_secret_key(&user_id, bits)?;
        let serialized_key =
            secret
                .to_armored_string(Default::default())
                .map_err(|e| PgpVaultError::CryptoFailed {
                    detail: format!("failed to armor generated key: {e}"),
                })?;

        let record = KeyRecord {
            name: req.name.clone(),
            serialized_key,
            fingerprint: String::new(),
            generation: Some(GenerationParams {
                real_name: req.real_name.clone(),
                email: req.email.clone(),
                comment: req.comment.clone().filter(|c| !c.is_empty()),
                key_bits: bits,
            }),
            public_only: false,
            exportable: req.exportable,
            passphrase: None,
            created_at: Utc::now(),
        };
        let record = self.store_checked(record)?;

        info!(name = %record.name, fingerprint = %record.fingerprint, bits, "generated key");
        Ok(record)
    }

    /// Import armored key material under `req.name`.
    pub fn import(&self, req: &ImportKeyRequest) -> Result<KeyRecord> {
        let imported = parse_import(&req.armored_key)?;
        self.ensure_free(&req.name, req.overwrite)?;

        let passphrase = req.passphrase.as_deref().map(|p| p.as_str());
        let armor_failed = |e: pgp::errors::Error| PgpVaultError::CryptoFailed {
            detail: format!("failed to armor imported key: {e}"),
        };

        let (serialized_key, public_only, stored_passphrase) = match imported {
            ImportedKey::Private(secret) => {
                unlock(&req.name, &secret, passphrase)?;
                let stored = if is_protected(&secret) {
                    passphrase.map(str::to_string)
                } else {
                    None
                };
                let armored = secret
                    .to_armored_string(Default::default())
                    .map_err(armor_failed)?;
                (armored, false, stored)
            }
            ImportedKey::Public(public) => {
                if !self.engine.allow_public_only {
                    return Err(PgpVaultError::PublicOnlyRejected);
                }
                let armored = public
                    .to_armored_string(Default::default())
                    .map_err(armor_failed)?;
                (armored, true, None)
            }
        };

        let record = KeyRecord {
            name: req.name.clone(),
            serialized_key,
            fingerprint: String::new(),
            generation: None,
            public_only,
            exportable: req.exportable,
            passphrase: stored_passphrase,
            created_at: Utc::now(),
        };
        let record = self.store_checked(record)?;

        info!(name = %record.name, fingerprint = %record.fingerprint, public_only, "imported key");
        Ok(record)
    }

    /// Fetch a record, mapping absence to `KeyNotFound`.
    pub fn record(&self, name: &str) -> Result<KeyRecord> {
        validate_key_name(name)?;
        self.store
            .get(name)?
            .ok_or_else(|| PgpVaultError::KeyNotFound {
                name: name.to_string(),
            })
    }

    /// Describe a stored key without touching its secret half.
    pub fn read(&self, name: &str) -> Result<KeyInfo> {
        let record = self.record(name)?;
        let entity = Entity::public_view(&record)?;

        Ok(KeyInfo {
            name: record.name.clone(),
            fingerprint: entity.fingerprint(),
            key_id: entity.key_id(),
            user_ids: entity.user_ids(),
            algorithm: entity.algorithm(),
            public_key: entity.armored_public_key()?,
            exportable: record.exportable,
            public_only: record.public_only,
            created_at: record.created_at,
            generation: record.generation,
        })
    }

    /// List all stored key names.
    pub fn list(&self) -> Result<Vec<String>> {
        self.store.list()
    }

    /// Remove a key. Removing an absent key is not an error.
    pub fn delete(&self, name: &str) -> Result<()> {
        validate_key_name(name)?;
        self.store.delete(name)?;
        info!(name, "deleted key");
        Ok(())
    }

    /// Armored key material of an exportable record.
    pub fn export(&self, name: &str) -> Result<String> {
        let record = self.record(name)?;
        if !record.exportable {
            return Err(PgpVaultError::KeyNotExportable {
                name: name.to_string(),
            });
        }

        info!(name, public_only = record.public_only, "exported key");
        Ok(record.serialized_key)
    }

    fn ensure_free(&self, name: &str, overwrite: bool) -> Result<()> {
        validate_key_name(name)?;
        if !overwrite && self.store.get(name)?.is_some() {
            return Err(PgpVaultError::KeyAlreadyExists {
                name: name.to_string(),
            });
        }
        Ok(())
    }

    /// Re-derive the record before persisting it, so only keys that
    /// load back cleanly ever reach storage.
    fn store_checked(&self, mut record: KeyRecord) -> Result<KeyRecord> {
        let entity = Entity::derive(&record, None)?;
        record.fingerprint = entity.fingerprint();
        self.store.put(&record)?;
        Ok(record)
    }
}
