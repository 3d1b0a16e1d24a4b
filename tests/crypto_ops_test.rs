mod common;

use common::{Engine, alice, b64, bob, carol, public_keyring, unb64};
use pgpvault::{Operation, Request, Response};

fn encrypt(name: &str, plaintext: &str, recipient: &str) -> Request {
    Request::new(Operation::Update, format!("encrypt/{name}"))
        .with("plaintext", plaintext)
        .with("recipient_key", recipient)
}

fn ciphertext(response: &Response) -> String {
    assert!(response.is_success(), "encrypt failed: {:?}", response.error);
    response.str_field("ciphertext").unwrap().to_string()
}

fn decrypt(engine: &Engine, name: &str, ciphertext: &str) -> Response {
    engine.call(
        Request::new(Operation::Update, format!("decrypt/{name}")).with("ciphertext", ciphertext),
    )
}

fn two_keys() -> Engine {
    let engine = Engine::new();
    engine.import("alice", alice());
    engine.import("bob", bob());
    engine
}

#[test]
fn alice_encrypts_hello_for_bob() {
    let engine = two_keys();

    let response = engine.call(
        encrypt("alice", "aGVsbG8=", &bob().public)
            .with("algorithm", "sha2-256")
            .with("format", "base64"),
    );
    let ct = ciphertext(&response);
    assert!(!ct.contains("-----BEGIN"));
    unb64(&ct);

    let response = decrypt(&engine, "bob", &ct);
    assert!(response.is_success(), "{:?}", response.error);
    assert_eq!(unb64(response.str_field("plaintext").unwrap()), b"hello");
    assert_eq!(response.bool_field("verified"), Some(false));
}

#[test]
fn round_trip_binary_payload() {
    let engine = two_keys();
    let payload: Vec<u8> = (0..=255u8).cycle().take(4096).collect();

    let ct = ciphertext(&engine.call(encrypt("alice", &b64(&payload), &bob().public)));
    let response = decrypt(&engine, "bob", &ct);

    assert_eq!(unb64(response.str_field("plaintext").unwrap()), payload);
}

#[test]
fn decrypt_with_signer_key_reports_verified() {
    let engine = two_keys();
    let ct = ciphertext(&engine.call(encrypt("alice", "aGVsbG8=", &bob().public)));

    let response = engine.call(
        Request::new(Operation::Update, "decrypt/bob")
            .with("ciphertext", ct.as_str())
            .with("signer_key", alice().public.as_str()),
    );
    assert!(response.is_success(), "{:?}", response.error);
    assert_eq!(response.bool_field("verified"), Some(true));

    let response = engine.call(
        Request::new(Operation::Update, "decrypt/bob")
            .with("ciphertext", ct.as_str())
            .with("signer_key", carol().public.as_str()),
    );
    assert_eq!(response.status, 400);
}

#[test]
fn empty_plaintext_round_trips() {
    let engine = two_keys();

    for format in ["base64", "ascii-armor"] {
        let ct = ciphertext(
            &engine.call(encrypt("alice", "", &bob().public).with("format", format)),
        );

        let response = engine.call(
            Request::new(Operation::Update, "decrypt/bob")
                .with("ciphertext", ct.as_str())
                .with("format", format),
        );
        assert!(response.is_success(), "{format}: {:?}", response.error);
        assert_eq!(response.str_field("plaintext"), Some(""));
        assert_eq!(response.bool_field("verified"), Some(false));

        let response = engine.call(
            Request::new(Operation::Update, "decrypt/bob")
                .with("ciphertext", ct.as_str())
                .with("format", format)
                .with("signer_key", alice().public.as_str()),
        );
        assert!(response.is_success(), "{format}: {:?}", response.error);
        assert_eq!(response.str_field("plaintext"), Some(""));
        assert_eq!(response.bool_field("verified"), Some(true));

        let response = engine.call(
            Request::new(Operation::Update, "decrypt/bob")
                .with("ciphertext", ct.as_str())
                .with("format", format)
                .with("signer_key", carol().public.as_str()),
        );
        assert_eq!(response.status, 400, "{format}");
    }
}

#[test]
fn ascii_armor_output_is_framed() {
    let engine = two_keys();

    let ct = ciphertext(&engine.call(
        encrypt("alice", "aGVsbG8=", &bob().public).with("format", "ascii-armor"),
    ));
    let trimmed = ct.trim_end();
    assert!(trimmed.starts_with("-----BEGIN PGP MESSAGE-----"));
    assert!(trimmed.ends_with("-----END PGP MESSAGE-----"));

    let response = engine.call(
        Request::new(Operation::Update, "decrypt/bob")
            .with("ciphertext", ct.as_str())
            .with("format", "ascii-armor"),
    );
    assert_eq!(unb64(response.str_field("plaintext").unwrap()), b"hello");
}

#[test]
fn url_algorithm_takes_precedence() {
    let engine = two_keys();

    let response = engine.call(
        Request::new(Operation::Update, "encrypt/alice/sha2-512")
            .with("plaintext", "aGVsbG8=")
            .with("algorithm", "md5")
            .with("recipient_key", bob().public.as_str()),
    );
    assert!(response.is_success(), "{:?}", response.error);

    let response = engine.call(
        Request::new(Operation::Update, "encrypt/alice/md5")
            .with("plaintext", "aGVsbG8=")
            .with("algorithm", "sha2-256")
            .with("recipient_key", bob().public.as_str()),
    );
    assert_eq!(response.status, 400);
    assert!(response.error.unwrap().contains("md5"));
}

#[test]
fn unsupported_algorithm_has_no_side_effects() {
    let engine = Engine::new();

    let response =
        engine.call(encrypt("ghost", "aGVsbG8=", &bob().public).with("algorithm", "sha1"));
    assert_eq!(response.status, 400);
    assert!(response.error.unwrap().contains("Unsupported algorithm"));

    let list = engine.call(Request::new(Operation::List, "keys/"));
    assert_eq!(list.data.unwrap()["keys"], serde_json::json!([]));
}

#[test]
fn empty_recipient_is_rejected_before_key_lookup() {
    let engine = Engine::new();

    for recipient in ["", "   "] {
        let response = engine.call(encrypt("ghost", "aGVsbG8=", recipient));
        assert_eq!(response.status, 400);
        assert!(response.error.unwrap().contains("recipient_key"));
    }

    let response = engine.call(
        Request::new(Operation::Update, "encrypt/ghost").with("plaintext", "aGVsbG8="),
    );
    assert_eq!(response.status, 400);
}

#[test]
fn unsupported_format_is_rejected() {
    let engine = two_keys();

    let response =
        engine.call(encrypt("alice", "aGVsbG8=", &bob().public).with("format", "hex"));
    assert_eq!(response.status, 400);
    assert!(response.error.unwrap().contains("hex"));
}

#[test]
fn bad_plaintext_encoding_is_rejected() {
    let engine = two_keys();

    let response = engine.call(encrypt("alice", "not base64!", &bob().public));
    assert_eq!(response.status, 400);
    assert!(response.error.unwrap().contains("plaintext"));
}

#[test]
fn malformed_recipient_is_rejected() {
    let engine = two_keys();

    let garbage =
        "-----BEGIN PGP PUBLIC KEY BLOCK-----\n\ngarbage\n-----END PGP PUBLIC KEY BLOCK-----\n";
    let response = engine.call(encrypt("alice", "aGVsbG8=", garbage));
    assert_eq!(response.status, 400);
    assert!(response.error.unwrap().contains("recipient"));
}

#[test]
fn unknown_sender_is_not_found() {
    let engine = Engine::new();

    let response = engine.call(encrypt("ghost", "aGVsbG8=", &bob().public));
    assert_eq!(response.status, 404);
}

#[test]
fn multi_key_keyring_encrypts_to_first_entry_only() {
    let engine = Engine::new();
    engine.import("alice", alice());
    engine.import("bob", bob());
    engine.import("carol", carol());

    let keyring = public_keyring(&[bob(), carol()]);
    let ct = ciphertext(&engine.call(encrypt("alice", "aGVsbG8=", &keyring)));

    let response = decrypt(&engine, "bob", &ct);
    assert!(response.is_success(), "{:?}", response.error);
    assert_eq!(unb64(response.str_field("plaintext").unwrap()), b"hello");

    let response = decrypt(&engine, "carol", &ct);
    assert_eq!(response.status, 400);
}

#[test]
fn detached_signature_verifies_and_detects_tampering() {
    let engine = two_keys();

    let response = engine.call(
        Request::new(Operation::Update, "sign/alice/sha2-384").with("input", "aGVsbG8="),
    );
    assert!(response.is_success(), "{:?}", response.error);
    let signature = response.str_field("signature").unwrap().to_string();

    let verify = |signature: &str, key: &str| {
        engine.call(
            Request::new(Operation::Update, format!("verify/{key}"))
                .with("input", "aGVsbG8=")
                .with("signature", signature),
        )
    };

    let response = verify(&signature, "alice");
    assert_eq!(response.bool_field("valid"), Some(true));

    let mut bytes = unb64(&signature);
    let last = bytes.len() - 1;
    bytes[last] ^= 0x01;
    let response = verify(&b64(&bytes), "alice");
    assert!(response.is_success(), "{:?}", response.error);
    assert_eq!(response.bool_field("valid"), Some(false));

    let response = verify(&signature, "bob");
    assert_eq!(response.bool_field("valid"), Some(false));
}

#[test]
fn armored_signature_with_caller_public_key() {
    let engine = two_keys();

    let response = engine.call(
        Request::new(Operation::Update, "sign/alice")
            .with("input", "aGVsbG8=")
            .with("format", "ascii-armor"),
    );
    let signature = response.str_field("signature").unwrap().to_string();
    assert!(signature.starts_with("-----BEGIN PGP SIGNATURE-----"));

    // The stored key under the path name is ignored when public_key is given.
    let response = engine.call(
        Request::new(Operation::Update, "verify/bob")
            .with("input", "aGVsbG8=")
            .with("signature", signature.as_str())
            .with("format", "ascii-armor")
            .with("public_key", alice().public.as_str()),
    );
    assert_eq!(response.bool_field("valid"), Some(true));
}

#[test]
fn garbage_signature_is_a_client_error() {
    let engine = two_keys();

    let response = engine.call(
        Request::new(Operation::Update, "verify/alice")
            .with("input", "aGVsbG8=")
            .with("signature", "3q2+7w=="),
    );
    assert_eq!(response.status, 400);
}

#[test]
fn concurrent_encrypts_on_different_keys() {
    let engine = Engine::new();
    engine.import("alice", alice());
    engine.import("bob", bob());
    engine.import("carol", carol());

    std::thread::scope(|scope| {
        let handles: Vec<_> = [("alice", carol()), ("bob", carol())]
            .into_iter()
            .map(|(sender, recipient)| {
                let engine = &engine;
                scope.spawn(move || {
                    let request = Request::new(Operation::Update, format!("encrypt/{sender}"))
                        .with("plaintext", b64(sender.as_bytes()))
                        .with("recipient_key", recipient.public.as_str());
                    (sender, ciphertext(&engine.call(request)))
                })
            })
            .collect();

        for handle in handles {
            let (sender, ct) = handle.join().unwrap();
            let response = decrypt(&engine, "carol", &ct);
            assert_eq!(unb64(response.str_field("plaintext").unwrap()), sender.as_bytes());
        }
    });
}
