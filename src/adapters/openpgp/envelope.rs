use std::io::{self, Write};

use base64::Engine as _;
use base64::engine::GeneralPurpose;
use base64::engine::general_purpose::STANDARD;
use base64::write::EncoderStringWriter;

use crate::core::errors::{PgpVaultError, Result};
use crate::core::models::options::OutputFormat;

/// Outer stage of the output writer chain.
///
/// The cryptographic writer (message or signature serializer) writes
/// into this sink. The sink is the encoder: base64 or ASCII armor. The
/// chain is only complete once the inner writer has returned and
/// [`EnvelopeSink::finalize`] has closed the encoder; reading the buffer
/// earlier would lose the trailing base64 quantum.
pub enum EnvelopeSink {
    Base64(EncoderStringWriter<'static, GeneralPurpose, String>),
    /// Armor is produced by the OpenPGP serializer itself; the sink only
    /// collects the text.
    Armor(Vec<u8>),
}

impl EnvelopeSink {
    pub fn new(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Base64 => Self::Base64(EncoderStringWriter::new(&STANDARD)),
            OutputFormat::AsciiArmor => Self::Armor(Vec::new()),
        }
    }

    pub fn format(&self) -> OutputFormat {
        match self {
            Self::Base64(_) => OutputFormat::Base64,
            Self::Armor(_) => OutputFormat::AsciiArmor,
        }
    }

    /// Close the encoder and return the finished text.
    pub fn finalize(mut self) -> Result<String> {
        self.flush().map_err(|e| PgpVaultError::CryptoFailed {
            detail: format!("failed to flush output encoder: {e}"),
        })?;

        match self {
            Self::Base64(encoder) => Ok(encoder.into_inner()),
            Self::Armor(buf) => String::from_utf8(buf).map_err(|e| PgpVaultError::CryptoFailed {
                detail: format!("armored output is not UTF-8: {e}"),
            }),
        }
    }
}

impl Write for EnvelopeSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Base64(encoder) => encoder.write(buf),
            Self::Armor(out) => out.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Base64(encoder) => encoder.flush(),
            Self::Armor(out) => out.flush(),
        }
    }
}

/// Input side: ciphertext or signature text as received in a request.
pub enum Envelope {
    Binary(Vec<u8>),
    Armored(String),
}

impl Envelope {
    /// Undo the outer encoding named by `format`.
    pub fn open(field: &str, text: &str, format: OutputFormat) -> Result<Self> {
        match format {
            OutputFormat::Base64 => {
                let compact: String = text.split_whitespace().collect();
                STANDARD
                    .decode(compact)
                    .map(Self::Binary)
                    .map_err(|e| PgpVaultError::InvalidEncoding {
                        field: field.to_string(),
                        expected: "base64".into(),
                        detail: e.to_string(),
                    })
            }
            OutputFormat::AsciiArmor => {
                let trimmed = text.trim();
                if !trimmed.starts_with("-----BEGIN PGP ") {
                    return Err(PgpVaultError::InvalidEncoding {
                        field: field.to_string(),
                        expected: "ASCII armor".into(),
                        detail: "missing armor header".into(),
                    });
                }
                Ok(Self::Armored(trimmed.to_string()))
            }
        }
    }
}
