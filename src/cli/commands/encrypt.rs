use std::path::Path;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value;

use crate::backend::framework::{Operation, Request};
use crate::cli::context::{CliContext, read_input, read_text, write_output, writes_to_file};
use crate::cli::output;
use crate::cli::{EncodingArgs, IoArgs};
use crate::core::errors::Result;

/// Execute the `pgpvault encrypt` command.
///
/// Reads the plaintext from a file or stdin, encrypts it to the
/// recipient's public key and signs it with the stored key `name`.
pub fn execute(
    cli: &CliContext,
    name: &str,
    recipient: &Path,
    io: &IoArgs,
    encoding: &EncodingArgs,
) -> Result<()> {
    let recipient_key = read_text(Some(recipient))?;
    let plaintext = read_input(io.input.as_deref())?;

    let request = Request::new(Operation::Update, format!("encrypt/{name}"))
        .with("plaintext", STANDARD.encode(&plaintext))
        .with("recipient_key", recipient_key);
    let data = cli.call(super::with_encoding(request, encoding))?;

    let ciphertext = data
        .get("ciphertext")
        .and_then(Value::as_str)
        .unwrap_or_default();
    write_output(io.output.as_deref(), format!("{ciphertext}\n").as_bytes())?;

    if writes_to_file(io.output.as_deref()) {
        output::success(&format!(
            "Encrypted {} bytes with key '{name}'",
            plaintext.len()
        ));
    }
    Ok(())
}
