use std::io::{BufRead, Write};
use std::time::SystemTime;

use pgp::composed::{Deserializable, Message, MessageBuilder, SignedPublicKey, StandaloneSignature};
use pgp::crypto::hash::HashAlgorithm;
use pgp::crypto::sym::SymmetricKeyAlgorithm;
use pgp::packet::{
    Packet, PacketParser, Signature, SignatureConfig, SignatureType, Subpacket, SubpacketData,
};
use pgp::ser::Serialize;
use pgp::types::{KeyDetails, PublicKeyTrait};
use rand::thread_rng;
use tracing::debug;
use zeroize::Zeroizing;

use super::entity::Entity;
use super::envelope::{Envelope, EnvelopeSink};
use crate::core::errors::{PgpVaultError, Result};
use crate::core::models::options::{HashAlgorithmName, OutputFormat};

pub fn to_pgp_hash(name: HashAlgorithmName) -> HashAlgorithm {
    match name {
        HashAlgorithmName::Sha2_224 => HashAlgorithm::Sha224,
        HashAlgorithmName::Sha2_256 => HashAlgorithm::Sha256,
        HashAlgorithmName::Sha2_384 => HashAlgorithm::Sha384,
        HashAlgorithmName::Sha2_512 => HashAlgorithm::Sha512,
    }
}

fn crypto_failed(stage: &str, e: impl std::fmt::Display) -> PgpVaultError {
    PgpVaultError::CryptoFailed {
        detail: format!("{stage}: {e}"),
    }
}

/// Encrypt `plaintext` to `recipient` and sign it with the signer's
/// primary key in one OpenPGP message.
///
/// The message is encrypted to the first encryption-capable subkey of
/// the recipient, falling back to an encryption-capable primary key.
pub fn encrypt_and_sign(
    plaintext: &[u8],
    recipient: &SignedPublicKey,
    signer: &Entity,
    hash: HashAlgorithmName,
    format: OutputFormat,
) -> Result<String> {
    let secret = signer.secret_key("encrypt")?;
    let mut rng = thread_rng();

    let mut builder = MessageBuilder::from_bytes("", plaintext.to_vec())
        .seipd_v1(&mut rng, SymmetricKeyAlgorithm::AES256);
    builder.sign(&secret.primary_key, signer.password(), to_pgp_hash(hash));

    let encrypted = match recipient
        .public_subkeys
        .iter()
        .find(|sub| sub.is_encryption_key())
    {
        Some(sub) => builder.encrypt_to_key(&mut rng, sub),
        None if recipient.primary_key.is_encryption_key() => {
            builder.encrypt_to_key(&mut rng, &recipient.primary_key)
        }
        None => {
            return Err(PgpVaultError::InvalidRecipientKey {
                detail: "recipient has no encryption-capable key".into(),
            });
        }
    };
    encrypted.map_err(|e| crypto_failed("failed to encrypt session key", e))?;

    let mut sink = EnvelopeSink::new(format);
    let body = match format {
        OutputFormat::Base64 => builder.to_vec(&mut rng),
        OutputFormat::AsciiArmor => builder
            .to_armored_string(&mut rng, Default::default())
            .map(String::into_bytes),
    }
    .map_err(|e| crypto_failed("failed to write message", e))?;

    sink.write_all(&body)
        .map_err(|e| crypto_failed("failed to encode message", e))?;

    debug!(
        signer = signer.name(),
        recipient = %recipient.fingerprint(),
        bytes = plaintext.len(),
        "message encrypted"
    );
    sink.finalize()
}

/// Result of opening a message.
pub struct Decrypted {
    pub plaintext: Zeroizing<Vec<u8>>,
    /// Set only when a signer key was supplied and its signature checked out.
    pub verified: bool,
}

/// Decrypt a message with the entity's private key.
///
/// With `signer` given, the embedded signature must verify against it
/// or the whole operation fails. Without it, signatures are not checked
/// and `verified` is false.
pub fn decrypt(
    entity: &Entity,
    ciphertext: &Envelope,
    signer: Option<&SignedPublicKey>,
) -> Result<Decrypted> {
    let secret = entity.secret_key("decrypt")?;
    let invalid = |e: pgp::errors::Error| PgpVaultError::DecryptionFailed {
        detail: e.to_string(),
    };
    let unreadable = |e: std::io::Error| PgpVaultError::DecryptionFailed {
        detail: e.to_string(),
    };

    let message = match ciphertext {
        Envelope::Binary(bytes) => Message::from_bytes(bytes.as_slice()).map_err(invalid)?,
        Envelope::Armored(text) => Message::from_armor(text.as_bytes()).map_err(invalid)?.0,
    };

    let mut message = message
        .decrypt(&entity.password(), secret)
        .map_err(invalid)?;
    while message.is_compressed() {
        message = message.decompress().map_err(invalid)?;
    }

    // The one-pass reader refuses a zero-length literal body, so an
    // empty signed message is unpacked here and its signature checked
    // over no data.
    let mut message = match message {
        Message::SignedOnePass {
            one_pass_signature,
            mut reader,
            is_nested,
        } => {
            let empty = reader.get_mut().fill_buf().map_err(unreadable)?.is_empty();
            if empty {
                let signature = trailing_signature(reader.into_inner().into_inner())?;
                let verified = match signer {
                    Some(signer) if signed_by(signer, &signature, &[]) => true,
                    Some(_) => return Err(PgpVaultError::SignatureVerificationFailed),
                    None => false,
                };

                debug!(key = entity.name(), verified, "empty message decrypted");
                return Ok(Decrypted {
                    plaintext: Zeroizing::new(Vec::new()),
                    verified,
                });
            }
            Message::SignedOnePass {
                one_pass_signature,
                reader,
                is_nested,
            }
        }
        other => other,
    };

    let plaintext = Zeroizing::new(message.as_data_vec().map_err(unreadable)?);

    let verified = match signer {
        Some(signer) => {
            message
                .verify(signer)
                .map_err(|_| PgpVaultError::SignatureVerificationFailed)?;
            true
        }
        None => false,
    };

    debug!(key = entity.name(), verified, "message decrypted");
    Ok(Decrypted {
        plaintext,
        verified,
    })
}

/// Read the signature packet that closes a one-pass signed message.
fn trailing_signature<R: BufRead>(rest: R) -> Result<Signature> {
    match PacketParser::new(rest).next() {
        Some(Ok(Packet::Signature(signature))) => Ok(signature),
        Some(Err(e)) => Err(PgpVaultError::DecryptionFailed {
            detail: e.to_string(),
        }),
        _ => Err(PgpVaultError::DecryptionFailed {
            detail: "missing signature packet".into(),
        }),
    }
}

fn signed_by(public: &SignedPublicKey, signature: &Signature, data: &[u8]) -> bool {
    signature.verify(&public.primary_key, data).is_ok()
        || public
            .public_subkeys
            .iter()
            .any(|sub| signature.verify(&sub.key, data).is_ok())
}

/// Produce a detached binary signature over `input` with the primary key.
pub fn sign_detached(
    entity: &Entity,
    input: &[u8],
    hash: HashAlgorithmName,
    format: OutputFormat,
) -> Result<String> {
    let secret = entity.secret_key("sign")?;

    let mut config = SignatureConfig::from_key(thread_rng(), &secret.primary_key, SignatureType::Binary)
        .map_err(|e| crypto_failed("failed to create signature config", e))?;
    config.hash_alg = to_pgp_hash(hash);
    config.hashed_subpackets = vec![
        Subpacket::regular(SubpacketData::IssuerFingerprint(secret.fingerprint()))
            .map_err(|e| crypto_failed("failed to create fingerprint subpacket", e))?,
        Subpacket::critical(SubpacketData::SignatureCreationTime(SystemTime::now().into()))
            .map_err(|e| crypto_failed("failed to create creation time subpacket", e))?,
    ];
    config.unhashed_subpackets = vec![
        Subpacket::regular(SubpacketData::Issuer(secret.key_id()))
            .map_err(|e| crypto_failed("failed to create issuer subpacket", e))?,
    ];

    let signature = config
        .sign(&secret.primary_key, &entity.password(), input)
        .map_err(|e| crypto_failed("failed to create signature", e))?;
    let signature = StandaloneSignature::new(signature);

    let mut sink = EnvelopeSink::new(format);
    match format {
        OutputFormat::Base64 => signature
            .to_writer(&mut sink)
            .map_err(|e| crypto_failed("failed to write signature", e))?,
        OutputFormat::AsciiArmor => {
            let armored = signature
                .to_armored_string(Default::default())
                .map_err(|e| crypto_failed("failed to armor signature", e))?;
            sink.write_all(armored.as_bytes())
                .map_err(|e| crypto_failed("failed to encode signature", e))?;
        }
    }

    debug!(key = entity.name(), bytes = input.len(), "detached signature created");
    sink.finalize()
}

/// Check a detached signature over `input`.
///
/// A signature that parses but does not match is `Ok(false)`; text that
/// is not a signature at all is `InvalidSignature`.
pub fn verify_detached(
    public: &SignedPublicKey,
    input: &[u8],
    signature: &Envelope,
) -> Result<bool> {
    let invalid = |e: pgp::errors::Error| PgpVaultError::InvalidSignature {
        detail: e.to_string(),
    };

    let signature = match signature {
        Envelope::Binary(bytes) => StandaloneSignature::from_bytes(bytes.as_slice()).map_err(invalid)?,
        Envelope::Armored(text) => {
            StandaloneSignature::from_armor_single(std::io::Cursor::new(text.as_bytes()))
                .map_err(invalid)?
                .0
        }
    };

    let valid = signature.verify(&public.primary_key, input).is_ok()
        || public
            .public_subkeys
            .iter()
            .any(|sub| signature.verify(&sub.key, input).is_ok());

    debug!(signer = %public.fingerprint(), valid, "detached signature checked");
    Ok(valid)
}
