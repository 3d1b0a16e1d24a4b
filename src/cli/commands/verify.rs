use std::path::Path;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value;

use crate::backend::framework::{Operation, Request};
use crate::cli::context::{CliContext, read_input, read_text};
use crate::cli::output;
use crate::core::errors::{PgpVaultError, Result};

/// Execute the `pgpvault verify` command.
///
/// A signature that does not match is reported as an error so the exit
/// status can be used in scripts.
pub fn execute(
    cli: &CliContext,
    name: &str,
    signature: &Path,
    public_key: Option<&Path>,
    input: Option<&Path>,
    format: Option<&str>,
) -> Result<()> {
    let signature = read_text(Some(signature))?;
    let data = read_input(input)?;

    let mut request = Request::new(Operation::Update, format!("verify/{name}"))
        .with("input", STANDARD.encode(&data))
        .with("signature", signature.trim());
    if let Some(path) = public_key {
        request = request.with("public_key", read_text(Some(path))?);
    }
    if let Some(format) = format {
        request = request.with("format", format);
    }

    let response = cli.call(request)?;
    if response.get("valid").and_then(Value::as_bool) == Some(true) {
        output::success("Signature is valid");
        Ok(())
    } else {
        Err(PgpVaultError::Rejected {
            status: 400,
            message: format!("Signature does not match key '{name}'"),
        })
    }
}
