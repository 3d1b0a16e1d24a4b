//! Shared fixtures for the integration tests.
//!
//! RSA generation is the slow part of every test here, so each test
//! binary generates its key pairs once and reuses them.

#![allow(dead_code)]

use std::sync::OnceLock;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use pgp::armor::{self, BlockType};
use pgp::composed::{
    Deserializable, KeyType, SecretKeyParamsBuilder, SignedPublicKey, SignedSecretKey,
    SubkeyParamsBuilder,
};
use pgp::types::Password;
use pgpvault::adapters::openpgp::keygen::generate_secret_key;
use pgpvault::adapters::storage::memory_storage::MemoryStorage;
use pgpvault::config::app_config::AppConfig;
use pgpvault::{Backend, Operation, Request, RequestContext, Response};

/// Initialize test logging (call once per test).
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("pgpvault=debug")
        .with_test_writer()
        .try_init();
}

/// An armored key pair.
pub struct KeyPair {
    pub private: String,
    pub public: String,
}

fn generate(user_id: &str) -> KeyPair {
    let secret = generate_secret_key(user_id, 2048).expect("generate key");
    let public = SignedPublicKey::from(secret.clone());
    KeyPair {
        private: secret.to_armored_string(Default::default()).expect("armor"),
        public: public.to_armored_string(Default::default()).expect("armor"),
    }
}

pub fn alice() -> &'static KeyPair {
    static KEY: OnceLock<KeyPair> = OnceLock::new();
    KEY.get_or_init(|| generate("Alice <alice@example.com>"))
}

pub fn bob() -> &'static KeyPair {
    static KEY: OnceLock<KeyPair> = OnceLock::new();
    KEY.get_or_init(|| generate("Bob <bob@example.com>"))
}

pub fn carol() -> &'static KeyPair {
    static KEY: OnceLock<KeyPair> = OnceLock::new();
    KEY.get_or_init(|| generate("Carol <carol@example.com>"))
}

/// Passphrase that unlocks [`dora`].
pub const DORA_PASSPHRASE: &str = "correct horse battery staple";

/// A key pair whose primary key and encryption subkey are both locked
/// with [`DORA_PASSPHRASE`].
pub fn dora() -> &'static KeyPair {
    static KEY: OnceLock<KeyPair> = OnceLock::new();
    KEY.get_or_init(|| {
        let mut rng = rand::thread_rng();
        let subkey = SubkeyParamsBuilder::default()
            .key_type(KeyType::Rsa(2048))
            .can_encrypt(true)
            .passphrase(Some(DORA_PASSPHRASE.into()))
            .build()
            .expect("subkey params");
        let params = SecretKeyParamsBuilder::default()
            .key_type(KeyType::Rsa(2048))
            .can_certify(true)
            .can_sign(true)
            .primary_user_id("Dora <dora@example.com>".into())
            .passphrase(Some(DORA_PASSPHRASE.into()))
            .subkey(subkey)
            .build()
            .expect("key params");
        let secret = params
            .generate(&mut rng)
            .expect("generate key")
            .sign(&mut rng, &Password::from(DORA_PASSPHRASE))
            .expect("self-sign");
        let public = SignedPublicKey::from(secret.clone());
        KeyPair {
            private: secret.to_armored_string(Default::default()).expect("armor"),
            public: public.to_armored_string(Default::default()).expect("armor"),
        }
    })
}

/// Backend with default config over fresh in-memory storage.
pub struct Engine {
    pub backend: Backend,
    pub storage: MemoryStorage,
}

impl Engine {
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    pub fn with_config(config: AppConfig) -> Self {
        init_test_logging();
        Self {
            backend: Backend::new(config).expect("backend"),
            storage: MemoryStorage::new(),
        }
    }

    pub fn call(&self, request: Request) -> Response {
        let ctx = RequestContext::new(&self.storage);
        self.backend.handle_request(&ctx, request)
    }

    /// Import `pair` under `name` and assert it worked.
    pub fn import(&self, name: &str, pair: &KeyPair) -> Response {
        let response = self.call(
            Request::new(Operation::Create, format!("keys/{name}")).with("key", pair.private.as_str()),
        );
        assert!(response.is_success(), "import failed: {:?}", response.error);
        response
    }
}

/// Standard base64 of `data`.
pub fn b64(data: &[u8]) -> String {
    STANDARD.encode(data)
}

pub fn unb64(data: &str) -> Vec<u8> {
    STANDARD.decode(data).expect("valid base64")
}

/// One armored public keyring holding every key in `pairs`, in order.
pub fn public_keyring(pairs: &[&KeyPair]) -> String {
    let keys: Vec<SignedPublicKey> = pairs
        .iter()
        .map(|pair| SignedPublicKey::from_string(&pair.public).expect("parse public key").0)
        .collect();

    let mut out = Vec::new();
    armor::write(&keys, BlockType::PublicKey, &mut out, None, true).expect("armor keyring");
    String::from_utf8(out).expect("armor is ascii")
}

/// Fingerprint of an armored private key.
pub fn fingerprint(pair: &KeyPair) -> String {
    use pgp::types::KeyDetails;

    let (key, _) = SignedSecretKey::from_string(&pair.private).expect("parse private key");
    key.fingerprint().to_string()
}
