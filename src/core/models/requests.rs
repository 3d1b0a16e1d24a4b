use std::sync::OnceLock;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use regex::Regex;
use zeroize::Zeroizing;

use crate::core::errors::{PgpVaultError, Result};
use crate::core::models::options::{HashAlgorithmName, OutputFormat};

/// Pattern for key names, identical to the host's generic name segment.
/// Word characters are ASCII only.
pub const KEY_NAME_PATTERN: &str = r"[A-Za-z0-9_](([A-Za-z0-9_.-]+)?[A-Za-z0-9_])?";

/// Reject names that could not have come from a `keys/<name>` path.
pub fn validate_key_name(name: &str) -> Result<()> {
    static NAME_RE: OnceLock<Regex> = OnceLock::new();
    let re = NAME_RE
        .get_or_init(|| Regex::new(&format!("^{KEY_NAME_PATTERN}$")).expect("valid name pattern"));

    if re.is_match(name) {
        Ok(())
    } else {
        Err(PgpVaultError::InvalidName {
            name: name.to_string(),
        })
    }
}

/// Decode a standard base64 field, naming the field in the error.
pub fn decode_base64_field(field: &str, value: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(value.trim())
        .map_err(|e| PgpVaultError::InvalidEncoding {
            field: field.to_string(),
            expected: "base64".into(),
            detail: e.to_string(),
        })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn passphrase(value: Option<String>) -> Option<Zeroizing<String>> {
    non_empty(value).map(Zeroizing::new)
}

/// `keys/<name>` create without an armored key: generate a new pair.
#[derive(Debug, Clone)]
pub struct GenerateKeyRequest {
    pub name: String,
    pub real_name: String,
    pub email: String,
    pub comment: Option<String>,
    /// `None` uses the configured default size.
    pub key_bits: Option<u32>,
    pub exportable: bool,
    pub overwrite: bool,
}

impl GenerateKeyRequest {
    pub fn new(name: &str, real_name: &str, email: &str) -> Result<Self> {
        validate_key_name(name)?;
        Ok(Self {
            name: name.to_string(),
            real_name: real_name.trim().to_string(),
            email: email.trim().to_string(),
            comment: None,
            key_bits: None,
            exportable: false,
            overwrite: false,
        })
    }

    /// OpenPGP user id: `Real Name (comment) <email>`.
    pub fn user_id(&self) -> String {
        let mut uid = self.real_name.clone();
        if let Some(comment) = self.comment.as_deref().filter(|c| !c.is_empty()) {
            if !uid.is_empty() {
                uid.push(' ');
            }
            uid.push_str(&format!("({comment})"));
        }
        if !self.email.is_empty() {
            if !uid.is_empty() {
                uid.push(' ');
            }
            uid.push_str(&format!("<{}>", self.email));
        }
        uid
    }
}

/// `keys/<name>` create with an armored key: import it.
#[derive(Debug, Clone)]
pub struct ImportKeyRequest {
    pub name: String,
    pub armored_key: String,
    pub passphrase: Option<Zeroizing<String>>,
    pub exportable: bool,
    pub overwrite: bool,
}

impl ImportKeyRequest {
    pub fn new(name: &str, armored_key: &str, passphrase_field: Option<String>) -> Result<Self> {
        validate_key_name(name)?;
        if armored_key.trim().is_empty() {
            return Err(PgpVaultError::MissingField { field: "key".into() });
        }
        Ok(Self {
            name: name.to_string(),
            armored_key: armored_key.to_string(),
            passphrase: passphrase(passphrase_field),
            exportable: false,
            overwrite: false,
        })
    }
}

#[derive(Debug, Clone)]
pub struct EncryptRequest {
    pub name: String,
    pub plaintext: Zeroizing<Vec<u8>>,
    pub algorithm: HashAlgorithmName,
    pub format: OutputFormat,
    pub recipient_key: String,
    pub passphrase: Option<Zeroizing<String>>,
}

impl EncryptRequest {
    /// Validate raw request values, in the order callers see failures:
    /// plaintext encoding, algorithm, format, then recipient presence.
    pub fn new(
        name: &str,
        plaintext_b64: &str,
        url_algorithm: Option<&str>,
        algorithm: Option<&str>,
        format: Option<&str>,
        recipient_key: Option<String>,
    ) -> Result<Self> {
        validate_key_name(name)?;
        let plaintext = Zeroizing::new(decode_base64_field("plaintext", plaintext_b64)?);
        let algorithm = HashAlgorithmName::resolve(url_algorithm, algorithm)?;
        let format = OutputFormat::parse(format)?;
        let recipient_key = non_empty(recipient_key).ok_or(PgpVaultError::MissingRecipient)?;

        Ok(Self {
            name: name.to_string(),
            plaintext,
            algorithm,
            format,
            recipient_key,
            passphrase: None,
        })
    }

    pub fn with_passphrase(mut self, value: Option<String>) -> Self {
        self.passphrase = passphrase(value);
        self
    }
}

#[derive(Debug, Clone)]
pub struct DecryptRequest {
    pub name: String,
    pub ciphertext: String,
    pub format: OutputFormat,
    /// Armored public key the embedded signature must verify against.
    pub signer_key: Option<String>,
    pub passphrase: Option<Zeroizing<String>>,
}

impl DecryptRequest {
    pub fn new(
        name: &str,
        ciphertext: Option<String>,
        format: Option<&str>,
        signer_key: Option<String>,
    ) -> Result<Self> {
        validate_key_name(name)?;
        let ciphertext = non_empty(ciphertext).ok_or_else(|| PgpVaultError::MissingField {
            field: "ciphertext".into(),
        })?;
        let format = OutputFormat::parse(format)?;

        Ok(Self {
            name: name.to_string(),
            ciphertext,
            format,
            signer_key: non_empty(signer_key),
            passphrase: None,
        })
    }

    pub fn with_passphrase(mut self, value: Option<String>) -> Self {
        self.passphrase = passphrase(value);
        self
    }
}

#[derive(Debug, Clone)]
pub struct SignRequest {
    pub name: String,
    pub input: Vec<u8>,
    pub algorithm: HashAlgorithmName,
    pub format: OutputFormat,
    pub passphrase: Option<Zeroizing<String>>,
}

impl SignRequest {
    pub fn new(
        name: &str,
        input_b64: &str,
        url_algorithm: Option<&str>,
        algorithm: Option<&str>,
        format: Option<&str>,
    ) -> Result<Self> {
        validate_key_name(name)?;
        let input = decode_base64_field("input", input_b64)?;
        let algorithm = HashAlgorithmName::resolve(url_algorithm, algorithm)?;
        let format = OutputFormat::parse(format)?;

        Ok(Self {
            name: name.to_string(),
            input,
            algorithm,
            format,
            passphrase: None,
        })
    }

    pub fn with_passphrase(mut self, value: Option<String>) -> Self {
        self.passphrase = passphrase(value);
        self
    }
}

#[derive(Debug, Clone)]
pub struct VerifyRequest {
    pub name: String,
    pub input: Vec<u8>,
    pub signature: String,
    pub format: OutputFormat,
    /// Caller-supplied armored key; when set the stored key is not consulted.
    pub public_key: Option<String>,
}

impl VerifyRequest {
    pub fn new(
        name: &str,
        input_b64: &str,
        signature: Option<String>,
        format: Option<&str>,
        public_key: Option<String>,
    ) -> Result<Self> {
        validate_key_name(name)?;
        let input = decode_base64_field("input", input_b64)?;
        let signature = non_empty(signature).ok_or_else(|| PgpVaultError::MissingField {
            field: "signature".into(),
        })?;
        let format = OutputFormat::parse(format)?;

        Ok(Self {
            name: name.to_string(),
            input,
            signature,
            format,
            public_key: non_empty(public_key),
        })
    }
}
