/// All domain errors for pgpvault.
///
/// Each variant provides enough context to diagnose the issue
/// without needing a debugger. Client-correctable variants carry a
/// hint; internal ones are never shown verbatim to callers.
#[derive(Debug, thiserror::Error)]
pub enum PgpVaultError {
    #[error("Unable to decode {field} as {expected}: {detail}")]
    InvalidEncoding {
        field: String,
        expected: String,
        detail: String,
    },

    #[error(
        "Unsupported algorithm '{algorithm}'\n\n  \
         Valid values are: sha2-224, sha2-256, sha2-384, sha2-512"
    )]
    UnsupportedAlgorithm { algorithm: String },

    #[error("Unsupported encoding format '{format}'; must be \"base64\" or \"ascii-armor\"")]
    UnsupportedFormat { format: String },

    #[error("recipient_key is required: provide the ASCII-armored public key of the recipient")]
    MissingRecipient,

    #[error("Invalid recipient key: {detail}")]
    InvalidRecipientKey { detail: String },

    #[error("Key '{name}' not found")]
    KeyNotFound { name: String },

    #[error(
        "Key '{name}' already exists\n\n  \
         Solutions:\n    \
         → Pick another name\n    \
         → Or replace it explicitly with overwrite=true"
    )]
    KeyAlreadyExists { name: String },

    #[error("Stored key '{name}' is corrupt: {detail}")]
    KeyCorrupt { name: String, detail: String },

    #[error(
        "Key '{name}' is protected by a passphrase\n\n  \
         Supply the passphrase with the request or store it at import time."
    )]
    PassphraseRequired { name: String },

    #[error("The passphrase for key '{name}' is incorrect")]
    PassphraseInvalid { name: String },

    #[error(
        "Key '{name}' only holds public material\n\n  \
         It can encrypt and verify, but cannot {operation}."
    )]
    PrivateKeyUnavailable { name: String, operation: String },

    #[error(
        "Public-only keys are not accepted\n\n  \
         Import the private key, or enable allow_public_only in config.toml."
    )]
    PublicOnlyRejected,

    #[error("Key '{name}' is not exportable")]
    KeyNotExportable { name: String },

    #[error("Invalid key material: {detail}")]
    InvalidKey { detail: String },

    #[error(
        "Invalid key size {bits}\n\n  \
         Accepted range is {min}..={max} bits."
    )]
    InvalidKeyBits { bits: u32, min: u32, max: u32 },

    #[error(
        "Invalid key name '{name}'\n\n  \
         Names may contain letters, digits, '_', '-' and '.', and must start and end \
         with a letter, digit or '_'."
    )]
    InvalidName { name: String },

    #[error("Missing required field '{field}'")]
    MissingField { field: String },

    #[error("Invalid value for field '{field}': {detail}")]
    InvalidField { field: String, detail: String },

    #[error("Invalid signature: {detail}")]
    InvalidSignature { detail: String },

    #[error("Signature verification failed: the message was not signed by the supplied signer_key")]
    SignatureVerificationFailed,

    #[error("Decryption failed: {detail}")]
    DecryptionFailed { detail: String },

    #[error("Unsupported path: {path}")]
    UnsupportedPath { path: String },

    #[error("Unsupported operation {operation} on {path}")]
    UnsupportedOperation { operation: String, path: String },

    #[error("Request cancelled")]
    Cancelled,

    #[error("Storage unavailable: {detail}")]
    StorageUnavailable { detail: String },

    #[error("Cryptographic operation failed: {detail}")]
    CryptoFailed { detail: String },

    #[error("Invalid configuration: {detail}")]
    InvalidConfig { detail: String },

    #[error(
        "This data directory uses format version {project_version}, but your pgpvault \
         only supports up to version {supported_version}.\n\n  \
         Solutions:\n    \
         → Update pgpvault: cargo install pgpvault --force"
    )]
    FormatVersionTooNew {
        project_version: u32,
        supported_version: u32,
    },

    /// An error response relayed from the backend to a local caller.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Coarse classification used by the routing layer to pick a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    BadRequest,
    NotFound,
    Conflict,
    Internal,
}

impl ErrorKind {
    /// HTTP-equivalent status code for the host.
    pub fn status(self) -> u16 {
        match self {
            ErrorKind::BadRequest => 400,
            ErrorKind::NotFound => 404,
            ErrorKind::Conflict => 409,
            ErrorKind::Internal => 500,
        }
    }
}

impl PgpVaultError {
    pub fn kind(&self) -> ErrorKind {
        use PgpVaultError::*;

        match self {
            KeyNotFound { .. } | UnsupportedPath { .. } => ErrorKind::NotFound,
            Rejected { status, .. } => match status {
                404 => ErrorKind::NotFound,
                409 => ErrorKind::Conflict,
                s if *s >= 500 => ErrorKind::Internal,
                _ => ErrorKind::BadRequest,
            },
            KeyAlreadyExists { .. } => ErrorKind::Conflict,
            KeyCorrupt { .. }
            | StorageUnavailable { .. }
            | CryptoFailed { .. }
            | InvalidConfig { .. }
            | FormatVersionTooNew { .. }
            | Cancelled
            | Io(_) => ErrorKind::Internal,
            _ => ErrorKind::BadRequest,
        }
    }

    /// Whether the caller can fix the request and retry.
    pub fn is_user_error(&self) -> bool {
        self.kind() != ErrorKind::Internal
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PgpVaultError>;
