use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identity and size a key pair was generated with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationParams {
    pub real_name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub key_bits: u32,
}

/// A named key as persisted in storage under `keys/<name>`.
///
/// `serialized_key` holds the ASCII-armored transferable key. For
/// regular records that is the private key; `public_only` records hold
/// an armored public key and can only encrypt and verify.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyRecord {
    pub name: String,
    pub serialized_key: String,
    pub fingerprint: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation: Option<GenerationParams>,
    #[serde(default)]
    pub public_only: bool,
    #[serde(default)]
    pub exportable: bool,
    /// Unlock material for passphrase-protected imports.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passphrase: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl std::fmt::Display for KeyRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.fingerprint)
    }
}

/// Public description of a stored key, as returned by a key read.
#[derive(Debug, Clone, Serialize)]
pub struct KeyInfo {
    pub name: String,
    pub fingerprint: String,
    pub key_id: String,
    pub user_ids: Vec<String>,
    pub algorithm: String,
    pub public_key: String,
    pub exportable: bool,
    pub public_only: bool,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation: Option<GenerationParams>,
}
