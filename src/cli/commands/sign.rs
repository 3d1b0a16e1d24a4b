use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value;

use crate::backend::framework::{Operation, Request};
use crate::cli::context::{CliContext, read_input, write_output, writes_to_file};
use crate::cli::output;
use crate::cli::{EncodingArgs, IoArgs};
use crate::core::errors::Result;

/// Execute the `pgpvault sign` command.
pub fn execute(cli: &CliContext, name: &str, io: &IoArgs, encoding: &EncodingArgs) -> Result<()> {
    let input = read_input(io.input.as_deref())?;

    let request = Request::new(Operation::Update, format!("sign/{name}"))
        .with("input", STANDARD.encode(&input));
    let data = cli.call(super::with_encoding(request, encoding))?;

    let signature = data
        .get("signature")
        .and_then(Value::as_str)
        .unwrap_or_default();
    write_output(io.output.as_deref(), format!("{signature}\n").as_bytes())?;

    if writes_to_file(io.output.as_deref()) {
        output::success(&format!("Signed {} bytes with key '{name}'", input.len()));
    }
    Ok(())
}
