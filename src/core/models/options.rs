use crate::core::errors::{PgpVaultError, Result};

/// Hash algorithms accepted for signatures made by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HashAlgorithmName {
    Sha2_224,
    #[default]
    Sha2_256,
    Sha2_384,
    Sha2_512,
}

impl HashAlgorithmName {
    /// Pick the algorithm for a request.
    ///
    /// A non-empty URL segment wins over the body field; an empty body
    /// field falls back to sha2-256.
    pub fn resolve(url_algorithm: Option<&str>, body_algorithm: Option<&str>) -> Result<Self> {
        let chosen = url_algorithm
            .filter(|a| !a.is_empty())
            .or(body_algorithm.filter(|a| !a.is_empty()));

        match chosen {
            Some(name) => Self::parse(name),
            None => Ok(Self::default()),
        }
    }

    pub fn parse(name: &str) -> Result<Self> {
        match name {
            "sha2-224" => Ok(Self::Sha2_224),
            "sha2-256" => Ok(Self::Sha2_256),
            "sha2-384" => Ok(Self::Sha2_384),
            "sha2-512" => Ok(Self::Sha2_512),
            other => Err(PgpVaultError::UnsupportedAlgorithm {
                algorithm: other.to_string(),
            }),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sha2_224 => "sha2-224",
            Self::Sha2_256 => "sha2-256",
            Self::Sha2_384 => "sha2-384",
            Self::Sha2_512 => "sha2-512",
        }
    }
}

impl std::fmt::Display for HashAlgorithmName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Framing for binary OpenPGP output (ciphertext and signatures).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Base64,
    AsciiArmor,
}

impl OutputFormat {
    /// Parse a format name; empty means the default (base64).
    pub fn parse(name: Option<&str>) -> Result<Self> {
        match name.unwrap_or("") {
            "" | "base64" => Ok(Self::Base64),
            "ascii-armor" => Ok(Self::AsciiArmor),
            other => Err(PgpVaultError::UnsupportedFormat {
                format: other.to_string(),
            }),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Base64 => "base64",
            Self::AsciiArmor => "ascii-armor",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
