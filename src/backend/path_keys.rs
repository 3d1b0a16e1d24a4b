use serde_json::{Map, Value, json};

use super::Backend;
use super::framework::{FieldData, FieldSchema, Operation, PathDef};
use crate::adapters::key_stores::storage_key_store::StorageKeyStore;
use crate::core::context::RequestContext;
use crate::core::errors::{PgpVaultError, Result};
use crate::core::models::requests::{GenerateKeyRequest, ImportKeyRequest, KEY_NAME_PATTERN};
use crate::core::services::key_service::KeyService;

pub fn paths() -> Result<Vec<PathDef>> {
    Ok(vec![
        PathDef::new("keys/?", vec![])?.on(Operation::List, list_keys),
        PathDef::new(
            &format!("keys/(?P<name>{KEY_NAME_PATTERN})"),
            vec![
                FieldSchema::string("name"),
                FieldSchema::string("real_name"),
                FieldSchema::string("email"),
                FieldSchema::string("comment"),
                FieldSchema::int("key_bits"),
                FieldSchema::string("key"),
                FieldSchema::string("passphrase"),
                FieldSchema::bool("exportable"),
                FieldSchema::bool("overwrite"),
            ],
        )?
        .on(Operation::Create, write_key)
        .on(Operation::Update, write_key)
        .on(Operation::Read, read_key)
        .on(Operation::Delete, delete_key),
        PathDef::new(
            &format!("export/(?P<name>{KEY_NAME_PATTERN})"),
            vec![FieldSchema::string("name")],
        )?
        .on(Operation::Read, export_key),
    ])
}

fn keys<'a>(backend: &Backend, ctx: &'a RequestContext<'a>) -> KeyService<StorageKeyStore<'a>> {
    KeyService {
        store: StorageKeyStore::new(ctx),
        engine: backend.config().engine.clone(),
    }
}

fn to_map(value: impl serde::Serialize) -> Result<Map<String, Value>> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Ok(Map::new()),
        Err(e) => Err(PgpVaultError::CryptoFailed {
            detail: format!("failed to encode response: {e}"),
        }),
    }
}

fn list_keys(
    backend: &Backend,
    ctx: &RequestContext<'_>,
    _data: &FieldData<'_>,
) -> Result<Map<String, Value>> {
    let names = keys(backend, ctx).list()?;
    to_map(json!({ "keys": names }))
}

/// Generate a key, or import one when `key` carries armored material.
fn write_key(
    backend: &Backend,
    ctx: &RequestContext<'_>,
    data: &FieldData<'_>,
) -> Result<Map<String, Value>> {
    let name = data.string_or_empty("name")?;
    let service = keys(backend, ctx);
    let exportable = data.get_bool("exportable")?;
    let overwrite = data.get_bool("overwrite")?;

    let record = match data.get_string("key")?.filter(|k| !k.trim().is_empty()) {
        Some(armored) => {
            let mut req = ImportKeyRequest::new(&name, &armored, data.get_string("passphrase")?)?;
            req.exportable = exportable;
            req.overwrite = overwrite;
            service.import(&req)?
        }
        None => {
            let mut req = GenerateKeyRequest::new(
                &name,
                &data.string_or_empty("real_name")?,
                &data.string_or_empty("email")?,
            )?;
            req.comment = data.get_string("comment")?;
            req.key_bits = data.get_u32("key_bits")?;
            req.exportable = exportable;
            req.overwrite = overwrite;
            service.generate(&req)?
        }
    };

    to_map(service.read(&record.name)?)
}

fn read_key(
    backend: &Backend,
    ctx: &RequestContext<'_>,
    data: &FieldData<'_>,
) -> Result<Map<String, Value>> {
    let info = keys(backend, ctx).read(&data.string_or_empty("name")?)?;
    to_map(info)
}

fn delete_key(
    backend: &Backend,
    ctx: &RequestContext<'_>,
    data: &FieldData<'_>,
) -> Result<Map<String, Value>> {
    keys(backend, ctx).delete(&data.string_or_empty("name")?)?;
    Ok(Map::new())
}

fn export_key(
    backend: &Backend,
    ctx: &RequestContext<'_>,
    data: &FieldData<'_>,
) -> Result<Map<String, Value>> {
    let name = data.string_or_empty("name")?;
    let key = keys(backend, ctx).export(&name)?;
    to_map(json!({ "name": name, "key": key }))
}
