use serde_json::{Map, Value};

use crate::backend::framework::{Operation, Request};
use crate::cli::KeysAction;
use crate::cli::context::{CliContext, read_text, write_output, writes_to_file};
use crate::cli::output;
use crate::core::errors::Result;

/// Execute the `pgpvault keys` command.
pub fn execute(cli: &CliContext, action: &KeysAction) -> Result<()> {
    match action {
        KeysAction::Create {
            name,
            real_name,
            email,
            comment,
            bits,
            exportable,
            overwrite,
        } => {
            let mut request = Request::new(Operation::Create, format!("keys/{name}"))
                .with("real_name", real_name.as_str())
                .with("email", email.as_str())
                .with("exportable", *exportable)
                .with("overwrite", *overwrite);
            if let Some(comment) = comment {
                request = request.with("comment", comment.as_str());
            }
            if let Some(bits) = bits {
                request = request.with("key_bits", *bits);
            }

            let sp = output::spinner(&format!("Generating RSA key pair '{name}'..."));
            match cli.call(request) {
                Ok(info) => {
                    output::finish_spinner(sp, &format!("Generated key '{name}'"));
                    print_info(&info, false);
                    Ok(())
                }
                Err(e) => {
                    sp.finish_and_clear();
                    Err(e)
                }
            }
        }
        KeysAction::Import {
            name,
            file,
            unlock,
            exportable,
            overwrite,
        } => {
            let armored = read_text(file.as_deref())?;
            let mut request = Request::new(Operation::Create, format!("keys/{name}"))
                .with("key", armored)
                .with("exportable", *exportable)
                .with("overwrite", *overwrite);
            if let Some(passphrase) = &unlock.passphrase {
                request = request.with("passphrase", passphrase.as_str());
            }

            let info = cli.call(request)?;
            output::success(&format!("Imported key '{name}'"));
            print_info(&info, false);
            Ok(())
        }
        KeysAction::List => {
            let data = cli.call(Request::new(Operation::List, "keys/"))?;
            let names: Vec<&str> = data
                .get("keys")
                .and_then(Value::as_array)
                .map(|keys| keys.iter().filter_map(Value::as_str).collect())
                .unwrap_or_default();

            if names.is_empty() {
                output::warning("No keys stored yet. Create one with 'pgpvault keys create'.");
                return Ok(());
            }

            output::header(&format!("Stored keys ({})", names.len()));
            for name in names {
                println!("  {name}");
            }
            Ok(())
        }
        KeysAction::Show { name } => {
            let info = cli.call(Request::new(Operation::Read, format!("keys/{name}")))?;
            output::header(&format!("Key '{name}'"));
            print_info(&info, true);
            Ok(())
        }
        KeysAction::Delete { name } => {
            cli.call(Request::new(Operation::Delete, format!("keys/{name}")))?;
            output::success(&format!("Deleted key '{name}'"));
            Ok(())
        }
        KeysAction::Export { name, output: path } => {
            let data = cli.call(Request::new(Operation::Read, format!("export/{name}")))?;
            let key = data.get("key").and_then(Value::as_str).unwrap_or_default();

            write_output(path.as_deref(), key.as_bytes())?;
            if writes_to_file(path.as_deref()) {
                output::success(&format!("Exported key '{name}'"));
            }
            Ok(())
        }
    }
}

fn print_info(info: &Map<String, Value>, with_public_key: bool) {
    let text = |field: &str| info.get(field).and_then(Value::as_str).unwrap_or_default();

    output::detail("Fingerprint", text("fingerprint"));
    output::detail("Key ID", text("key_id"));
    output::detail("Algorithm", text("algorithm"));
    if let Some(uids) = info.get("user_ids").and_then(Value::as_array) {
        for uid in uids.iter().filter_map(Value::as_str) {
            output::detail("User ID", uid);
        }
    }

    let flag = |field: &str| info.get(field).and_then(Value::as_bool).unwrap_or(false);
    if flag("public_only") {
        output::detail("Type", "public key only");
    }
    output::detail("Exportable", if flag("exportable") { "yes" } else { "no" });
    output::detail("Created", text("created_at"));

    if with_public_key {
        println!("\n{}", text("public_key"));
    }
}
