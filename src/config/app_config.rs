use serde::Deserialize;
use std::path::Path;

use crate::core::errors::{PgpVaultError, Result};

/// Current format version supported by this build of pgpvault.
pub const CURRENT_FORMAT_VERSION: u32 = 1;

/// Smallest RSA modulus the engine will ever accept, whatever the config says.
pub const HARD_MIN_KEY_BITS: u32 = 1024;

/// Top-level configuration read from `<data_dir>/config.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub engine: EngineSection,
}

impl AppConfig {
    /// Load the configuration from `<data_dir>/config.toml`.
    ///
    /// A missing file yields the defaults. A present file is parsed,
    /// checked for format compatibility and validated.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let config_path = data_dir.join("config.toml");
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&config_path)?;
        Self::parse(&content)
    }

    /// Parse and validate configuration text.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| PgpVaultError::InvalidConfig {
            detail: format!("Failed to parse config.toml: {e}"),
        })?;

        if config.engine.format_version > CURRENT_FORMAT_VERSION {
            return Err(PgpVaultError::FormatVersionTooNew {
                project_version: config.engine.format_version,
                supported_version: CURRENT_FORMAT_VERSION,
            });
        }

        config.engine.validate()?;
        Ok(config)
    }
}

/// The `[engine]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineSection {
    pub format_version: u32,
    /// Accept imports that carry only a public key.
    pub allow_public_only: bool,
    pub min_key_bits: u32,
    pub max_key_bits: u32,
    pub default_key_bits: u32,
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            format_version: CURRENT_FORMAT_VERSION,
            allow_public_only: false,
            min_key_bits: 2048,
            max_key_bits: 4096,
            default_key_bits: 2048,
        }
    }
}

impl EngineSection {
    fn validate(&self) -> Result<()> {
        if self.min_key_bits < HARD_MIN_KEY_BITS {
            return Err(PgpVaultError::InvalidConfig {
                detail: format!(
                    "min_key_bits = {} is below the floor of {HARD_MIN_KEY_BITS}",
                    self.min_key_bits
                ),
            });
        }

        if !(self.min_key_bits..=self.max_key_bits).contains(&self.default_key_bits) {
            return Err(PgpVaultError::InvalidConfig {
                detail: format!(
                    "default_key_bits = {} must lie within min_key_bits..=max_key_bits ({}..={})",
                    self.default_key_bits, self.min_key_bits, self.max_key_bits
                ),
            });
        }

        Ok(())
    }

    /// Resolve the requested key size against the configured range.
    pub fn key_bits(&self, requested: Option<u32>) -> Result<u32> {
        let bits = requested.unwrap_or(self.default_key_bits);
        if (self.min_key_bits..=self.max_key_bits).contains(&bits) {
            Ok(bits)
        } else {
            Err(PgpVaultError::InvalidKeyBits {
                bits,
                min: self.min_key_bits,
                max: self.max_key_bits,
            })
        }
    }
}
