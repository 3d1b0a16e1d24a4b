use tracing::debug;

use crate::adapters::openpgp::entity::{Entity, parse_first_public, parse_recipient};
use crate::adapters::openpgp::envelope::Envelope;
use crate::adapters::openpgp::operations::{self, Decrypted};
use crate::core::errors::{PgpVaultError, Result};
use crate::core::models::key_record::KeyRecord;
use crate::core::models::requests::{DecryptRequest, EncryptRequest, SignRequest, VerifyRequest};
use crate::core::traits::key_store::KeyStore;

/// Runs the four message operations against keys held in a `KeyStore`.
///
/// Requests arrive already validated; everything that can be checked
/// without storage is checked before the store is consulted.
pub struct CryptoService<K: KeyStore> {
    pub store: K,
}

impl<K: KeyStore> CryptoService<K> {
    pub fn encrypt(&self, req: &EncryptRequest) -> Result<String> {
        let recipient = parse_recipient(&req.recipient_key)?;
        let record = self.load(&req.name)?;
        let signer = Entity::derive(&record, passphrase(&req.passphrase))?;

        debug!(key = %req.name, algorithm = %req.algorithm, format = %req.format, "encrypt");
        operations::encrypt_and_sign(
            &req.plaintext,
            &recipient,
            &signer,
            req.algorithm,
            req.format,
        )
    }

    pub fn decrypt(&self, req: &DecryptRequest) -> Result<Decrypted> {
        let ciphertext = Envelope::open("ciphertext", &req.ciphertext, req.format)?;
        let signer = req
            .signer_key
            .as_deref()
            .map(|armored| {
                parse_first_public(armored).map_err(|detail| PgpVaultError::InvalidField {
                    field: "signer_key".into(),
                    detail,
                })
            })
            .transpose()?;

        let record = self.load(&req.name)?;
        let entity = Entity::derive(&record, passphrase(&req.passphrase))?;

        debug!(key = %req.name, format = %req.format, "decrypt");
        operations::decrypt(&entity, &ciphertext, signer.as_ref())
    }

    pub fn sign(&self, req: &SignRequest) -> Result<String> {
        let record = self.load(&req.name)?;
        let entity = Entity::derive(&record, passphrase(&req.passphrase))?;

        debug!(key = %req.name, algorithm = %req.algorithm, format = %req.format, "sign");
        operations::sign_detached(&entity, &req.input, req.algorithm, req.format)
    }

    /// A well-formed signature that does not match is `Ok(false)`.
    pub fn verify(&self, req: &VerifyRequest) -> Result<bool> {
        let signature = Envelope::open("signature", &req.signature, req.format)?;

        let public = match &req.public_key {
            Some(armored) => Entity::from_public(
                &req.name,
                parse_first_public(armored).map_err(|detail| PgpVaultError::InvalidField {
                    field: "public_key".into(),
                    detail,
                })?,
            ),
            None => Entity::public_view(&self.load(&req.name)?)?,
        };

        debug!(key = %req.name, format = %req.format, "verify");
        operations::verify_detached(public.public_key(), &req.input, &signature)
    }

    fn load(&self, name: &str) -> Result<KeyRecord> {
        self.store
            .get(name)?
            .ok_or_else(|| PgpVaultError::KeyNotFound {
                name: name.to_string(),
            })
    }
}

fn passphrase(value: &Option<zeroize::Zeroizing<String>>) -> Option<&str> {
    value.as_deref().map(|p| p.as_str())
}
