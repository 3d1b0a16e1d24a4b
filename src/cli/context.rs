use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::adapters::storage::file_storage::FileStorage;
use crate::backend::Backend;
use crate::backend::framework::Request;
use crate::config::app_config::AppConfig;
use crate::core::context::RequestContext;
use crate::core::errors::{PgpVaultError, Result};

/// Everything a CLI command needs: the data directory's storage and a
/// backend configured from its `config.toml`.
pub struct CliContext {
    storage: FileStorage,
    backend: Backend,
}

impl CliContext {
    /// Open the data directory, defaulting to `<data_dir>/pgpvault`.
    pub fn open(data_dir: Option<&Path>) -> Result<Self> {
        let root = match data_dir {
            Some(dir) => dir.to_path_buf(),
            None => default_data_dir()?,
        };

        let config = AppConfig::load(&root)?;
        Ok(Self {
            storage: FileStorage::new(root),
            backend: Backend::new(config)?,
        })
    }

    /// Send one request through the backend; error responses become errors.
    pub fn call(&self, request: Request) -> Result<Map<String, Value>> {
        let ctx = RequestContext::new(&self.storage);
        let response = self.backend.handle_request(&ctx, request);

        match (response.data, response.error) {
            (Some(data), None) => Ok(data),
            (_, error) => Err(PgpVaultError::Rejected {
                status: response.status,
                message: error.unwrap_or_else(|| "request failed".into()),
            }),
        }
    }
}

fn default_data_dir() -> Result<PathBuf> {
    dirs::data_dir()
        .map(|d| d.join("pgpvault"))
        .ok_or_else(|| PgpVaultError::InvalidConfig {
            detail: "Cannot determine the user data directory.\n\n  \
                     Pass --data-dir or set PGPVAULT_DIR."
                .into(),
        })
}

/// Read a file, or stdin when `path` is `None` or `-`.
pub fn read_input(path: Option<&Path>) -> Result<Vec<u8>> {
    match path {
        Some(p) if p != Path::new("-") => std::fs::read(p).map_err(|e| PgpVaultError::InvalidField {
            field: p.display().to_string(),
            detail: format!("cannot read file: {e}"),
        }),
        _ => {
            let mut buf = Vec::new();
            std::io::stdin().read_to_end(&mut buf)?;
            Ok(buf)
        }
    }
}

/// Read a text file such as an armored key.
pub fn read_text(path: Option<&Path>) -> Result<String> {
    let bytes = read_input(path)?;
    String::from_utf8(bytes).map_err(|_| PgpVaultError::InvalidEncoding {
        field: path
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "stdin".into()),
        expected: "UTF-8 text".into(),
        detail: "file is not valid UTF-8".into(),
    })
}

/// Write to a file, or stdout when `path` is `None` or `-`.
pub fn write_output(path: Option<&Path>, bytes: &[u8]) -> Result<()> {
    match path {
        Some(p) if p != Path::new("-") => std::fs::write(p, bytes)?,
        _ => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(bytes)?;
            stdout.flush()?;
        }
    }
    Ok(())
}

/// Whether output goes to a file, leaving stdout free for status lines.
pub fn writes_to_file(path: Option<&Path>) -> bool {
    matches!(path, Some(p) if p != Path::new("-"))
}
