use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde_json::{Map, Value};

use super::Backend;
use super::framework::{FieldData, FieldSchema, Operation, PathDef};
use crate::adapters::key_stores::storage_key_store::StorageKeyStore;
use crate::core::context::RequestContext;
use crate::core::errors::Result;
use crate::core::models::options::{HashAlgorithmName, OutputFormat};
use crate::core::models::requests::{
    DecryptRequest, EncryptRequest, KEY_NAME_PATTERN, SignRequest, VerifyRequest,
};
use crate::core::services::crypto_service::CryptoService;

pub fn paths() -> Result<Vec<PathDef>> {
    let algorithm = || FieldSchema::string("algorithm").with_default(HashAlgorithmName::default().as_str());
    let format = || FieldSchema::string("format").with_default(OutputFormat::default().as_str());

    Ok(vec![
        PathDef::new(
            &format!("encrypt/(?P<name>{KEY_NAME_PATTERN})(?:/(?P<urlalgorithm>[^/]+))?"),
            vec![
                FieldSchema::string("name"),
                FieldSchema::string("plaintext"),
                FieldSchema::string("urlalgorithm"),
                algorithm(),
                format(),
                FieldSchema::string("recipient_key"),
                FieldSchema::string("passphrase"),
            ],
        )?
        .on(Operation::Update, encrypt),
        PathDef::new(
            &format!("decrypt/(?P<name>{KEY_NAME_PATTERN})"),
            vec![
                FieldSchema::string("name"),
                FieldSchema::string("ciphertext"),
                format(),
                FieldSchema::string("signer_key"),
                FieldSchema::string("passphrase"),
            ],
        )?
        .on(Operation::Update, decrypt),
        PathDef::new(
            &format!("sign/(?P<name>{KEY_NAME_PATTERN})(?:/(?P<urlalgorithm>[^/]+))?"),
            vec![
                FieldSchema::string("name"),
                FieldSchema::string("input"),
                FieldSchema::string("urlalgorithm"),
                algorithm(),
                format(),
                FieldSchema::string("passphrase"),
            ],
        )?
        .on(Operation::Update, sign),
        PathDef::new(
            &format!("verify/(?P<name>{KEY_NAME_PATTERN})"),
            vec![
                FieldSchema::string("name"),
                FieldSchema::string("input"),
                FieldSchema::string("signature"),
                format(),
                FieldSchema::string("public_key"),
            ],
        )?
        .on(Operation::Update, verify),
    ])
}

fn crypto<'a>(ctx: &'a RequestContext<'a>) -> CryptoService<StorageKeyStore<'a>> {
    CryptoService {
        store: StorageKeyStore::new(ctx),
    }
}

fn encrypt(
    _backend: &Backend,
    ctx: &RequestContext<'_>,
    data: &FieldData<'_>,
) -> Result<Map<String, Value>> {
    let req = EncryptRequest::new(
        &data.string_or_empty("name")?,
        &data.string_or_empty("plaintext")?,
        data.get_string("urlalgorithm")?.as_deref(),
        data.get_string("algorithm")?.as_deref(),
        data.get_string("format")?.as_deref(),
        data.get_string("recipient_key")?,
    )?
    .with_passphrase(data.get_string("passphrase")?);

    let ciphertext = crypto(ctx).encrypt(&req)?;

    let mut out = Map::new();
    out.insert("ciphertext".into(), Value::String(ciphertext));
    Ok(out)
}

fn decrypt(
    _backend: &Backend,
    ctx: &RequestContext<'_>,
    data: &FieldData<'_>,
) -> Result<Map<String, Value>> {
    let req = DecryptRequest::new(
        &data.string_or_empty("name")?,
        data.get_string("ciphertext")?,
        data.get_string("format")?.as_deref(),
        data.get_string("signer_key")?,
    )?
    .with_passphrase(data.get_string("passphrase")?);

    let opened = crypto(ctx).decrypt(&req)?;

    let mut out = Map::new();
    out.insert(
        "plaintext".into(),
        Value::String(STANDARD.encode(opened.plaintext.as_slice())),
    );
    out.insert("verified".into(), Value::Bool(opened.verified));
    Ok(out)
}

fn sign(
    _backend: &Backend,
    ctx: &RequestContext<'_>,
    data: &FieldData<'_>,
) -> Result<Map<String, Value>> {
    let req = SignRequest::new(
        &data.string_or_empty("name")?,
        &data.string_or_empty("input")?,
        data.get_string("urlalgorithm")?.as_deref(),
        data.get_string("algorithm")?.as_deref(),
        data.get_string("format")?.as_deref(),
    )?
    .with_passphrase(data.get_string("passphrase")?);

    let signature = crypto(ctx).sign(&req)?;

    let mut out = Map::new();
    out.insert("signature".into(), Value::String(signature));
    Ok(out)
}

fn verify(
    _backend: &Backend,
    ctx: &RequestContext<'_>,
    data: &FieldData<'_>,
) -> Result<Map<String, Value>> {
    let req = VerifyRequest::new(
        &data.string_or_empty("name")?,
        &data.string_or_empty("input")?,
        data.get_string("signature")?,
        data.get_string("format")?.as_deref(),
        data.get_string("public_key")?,
    )?;

    let valid = crypto(ctx).verify(&req)?;

    let mut out = Map::new();
    out.insert("valid".into(), Value::Bool(valid));
    Ok(out)
}
