use std::path::Path;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value;

use crate::backend::framework::{Operation, Request};
use crate::cli::context::{CliContext, read_text, write_output, writes_to_file};
use crate::cli::output;
use crate::cli::{IoArgs, PassphraseArgs};
use crate::core::errors::{PgpVaultError, Result};

/// Execute the `pgpvault decrypt` command.
///
/// With `--signer`, decryption only succeeds when the message carries a
/// valid signature from that key.
pub fn execute(
    cli: &CliContext,
    name: &str,
    signer: Option<&Path>,
    io: &IoArgs,
    format: Option<&str>,
    unlock: &PassphraseArgs,
) -> Result<()> {
    let ciphertext = read_text(io.input.as_deref())?;

    let mut request = Request::new(Operation::Update, format!("decrypt/{name}"))
        .with("ciphertext", ciphertext.trim());
    if let Some(signer) = signer {
        request = request.with("signer_key", read_text(Some(signer))?);
    }
    if let Some(format) = format {
        request = request.with("format", format);
    }
    if let Some(passphrase) = &unlock.passphrase {
        request = request.with("passphrase", passphrase.as_str());
    }

    let data = cli.call(request)?;
    let encoded = data
        .get("plaintext")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let plaintext = STANDARD
        .decode(encoded)
        .map_err(|e| PgpVaultError::InvalidEncoding {
            field: "plaintext".into(),
            expected: "base64".into(),
            detail: e.to_string(),
        })?;
    let verified = data
        .get("verified")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    write_output(io.output.as_deref(), &plaintext)?;

    if writes_to_file(io.output.as_deref()) {
        output::success(&format!("Decrypted {} bytes with key '{name}'", plaintext.len()));
    }
    if !verified {
        output::warning("Signature not checked: pass --signer to require a valid signature");
    }
    Ok(())
}
