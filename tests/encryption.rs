//! Card-encryption tests against a real RSA keypair.
//!
//! These tests generate fresh keypairs, write the public half to disk the
//! way a merchant deployment would, and assert both directions of the
//! contract: ciphertext shape on the way out, and byte-exact JSON after
//! decrypting with the private key the gateway would hold.

use std::fs;
use std::path::PathBuf;

use openssl::pkey::Private;
use openssl::rsa::{Padding, Rsa};
use zivra_pay::encryption::CardEncryptor;
use zivra_pay::types::CardFields;
use zivra_pay::ZivraError;

/// JSON the gateway decrypts the standard test card into.
const EXPECTED_JSON: &str =
    r#"{"cvv":"123","pin":"1234","expiryDate":"1225","pan":"4111111111111111"}"#;

fn test_card() -> CardFields {
    CardFields::new("4111111111111111", "12", "25", "123", "1234")
}

/// Writes PEM bytes to a unique temp file and returns its path.
fn write_key(pem: &[u8]) -> PathBuf {
    let path = std::env::temp_dir().join(format!("zivra-test-key-{}.pem", uuid::Uuid::new_v4()));
    fs::write(&path, pem).unwrap();
    path
}

/// Decrypts a base64 ciphertext with the matching private key.
fn decrypt(keypair: &Rsa<Private>, ciphertext_b64: &str) -> Vec<u8> {
    use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

    let ciphertext = BASE64.decode(ciphertext_b64).unwrap();
    assert_eq!(ciphertext.len(), keypair.size() as usize);

    let mut plaintext = vec![0u8; keypair.size() as usize];
    let written = keypair
        .private_decrypt(&ciphertext, &mut plaintext, Padding::PKCS1)
        .unwrap();
    plaintext.truncate(written);
    plaintext
}

#[test]
fn ciphertext_is_344_base64_chars_for_2048_bit_key() {
    let keypair = Rsa::generate(2048).unwrap();
    let key_path = write_key(&keypair.public_key_to_pem().unwrap());

    let encryptor = CardEncryptor::new(&key_path).unwrap();
    let ciphertext = encryptor.encrypt(&test_card()).unwrap();

    // 256 raw bytes for a 2048-bit modulus encode to exactly 344 chars.
    assert_eq!(ciphertext.len(), 344);
    assert!(!ciphertext.is_empty());
    assert!(ciphertext
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '/' || c == '='));

    let _ = fs::remove_file(&key_path);
}

#[test]
fn decrypting_ciphertext_recovers_exact_json() {
    let keypair = Rsa::generate(2048).unwrap();
    let key_path = write_key(&keypair.public_key_to_pem().unwrap());

    let encryptor = CardEncryptor::new(&key_path).unwrap();
    let ciphertext = encryptor.encrypt(&test_card()).unwrap();

    assert_eq!(decrypt(&keypair, &ciphertext), EXPECTED_JSON.as_bytes());

    let _ = fs::remove_file(&key_path);
}

#[test]
fn repeated_encryption_randomizes_padding_but_not_length() {
    let keypair = Rsa::generate(2048).unwrap();
    let key_path = write_key(&keypair.public_key_to_pem().unwrap());

    let encryptor = CardEncryptor::new(&key_path).unwrap();
    let first = encryptor.encrypt(&test_card()).unwrap();
    let second = encryptor.encrypt(&test_card()).unwrap();

    // PKCS#1 v1.5 pads with fresh random bytes each call.
    assert_ne!(first, second);
    assert_eq!(first.len(), second.len());
    assert_eq!(decrypt(&keypair, &first), decrypt(&keypair, &second));

    let _ = fs::remove_file(&key_path);
}

#[test]
fn ciphertext_length_tracks_key_modulus() {
    let keypair = Rsa::generate(3072).unwrap();
    let key_path = write_key(&keypair.public_key_to_pem().unwrap());

    let encryptor = CardEncryptor::new(&key_path).unwrap();
    let ciphertext = encryptor.encrypt(&test_card()).unwrap();

    // 384 raw bytes for a 3072-bit modulus encode to exactly 512 chars.
    assert_eq!(ciphertext.len(), 512);
    assert_eq!(decrypt(&keypair, &ciphertext), EXPECTED_JSON.as_bytes());

    let _ = fs::remove_file(&key_path);
}

#[test]
fn pkcs1_marker_pem_is_accepted() {
    let keypair = Rsa::generate(2048).unwrap();
    let pem = keypair.public_key_to_pem_pkcs1().unwrap();
    assert!(String::from_utf8_lossy(&pem).contains("BEGIN RSA PUBLIC KEY"));
    let key_path = write_key(&pem);

    let encryptor = CardEncryptor::new(&key_path).unwrap();
    let ciphertext = encryptor.encrypt(&test_card()).unwrap();
    assert_eq!(decrypt(&keypair, &ciphertext), EXPECTED_JSON.as_bytes());

    let _ = fs::remove_file(&key_path);
}

#[test]
fn spki_pem_mislabeled_with_rsa_marker_is_accepted() {
    // Some key exports carry a generic SubjectPublicKeyInfo body under an
    // "RSA PUBLIC KEY" header. The encryptor must normalize the label and
    // import the key anyway.
    let keypair = Rsa::generate(2048).unwrap();
    let spki = String::from_utf8(keypair.public_key_to_pem().unwrap()).unwrap();
    let mislabeled = spki
        .replace("BEGIN PUBLIC KEY", "BEGIN RSA PUBLIC KEY")
        .replace("END PUBLIC KEY", "END RSA PUBLIC KEY");
    let key_path = write_key(mislabeled.as_bytes());

    let encryptor = CardEncryptor::new(&key_path).unwrap();
    let ciphertext = encryptor.encrypt(&test_card()).unwrap();
    assert_eq!(decrypt(&keypair, &ciphertext), EXPECTED_JSON.as_bytes());

    let _ = fs::remove_file(&key_path);
}

#[test]
fn oversized_payload_fails_instead_of_truncating() {
    let keypair = Rsa::generate(2048).unwrap();
    let key_path = write_key(&keypair.public_key_to_pem().unwrap());
    let encryptor = CardEncryptor::new(&key_path).unwrap();

    // PKCS#1 v1.5 caps the plaintext at 256 - 11 = 245 bytes for this key;
    // a 300-digit PAN pushes the JSON well past that.
    let card = CardFields::new("9".repeat(300), "12", "25", "123", "1234");
    match encryptor.encrypt(&card) {
        Err(ZivraError::EncryptionError(msg)) => {
            assert!(msg.contains("245"), "message should name the limit: {msg}");
        }
        other => panic!("expected EncryptionError, got {other:?}"),
    }

    let _ = fs::remove_file(&key_path);
}

#[test]
fn rotated_key_is_picked_up_without_reconstruction() {
    let first_pair = Rsa::generate(2048).unwrap();
    let second_pair = Rsa::generate(2048).unwrap();
    let key_path = write_key(&first_pair.public_key_to_pem().unwrap());

    let encryptor = CardEncryptor::new(&key_path).unwrap();
    let before = encryptor.encrypt(&test_card()).unwrap();

    // The key file is re-read on every call, so an on-disk rotation takes
    // effect immediately for the same encryptor instance.
    fs::write(&key_path, second_pair.public_key_to_pem().unwrap()).unwrap();
    let after = encryptor.encrypt(&test_card()).unwrap();

    assert_eq!(decrypt(&first_pair, &before), EXPECTED_JSON.as_bytes());
    assert_eq!(decrypt(&second_pair, &after), EXPECTED_JSON.as_bytes());

    let _ = fs::remove_file(&key_path);
}

#[test]
fn missing_key_file_fails_before_any_encryption() {
    let path = std::env::temp_dir().join(format!("zivra-absent-{}.pem", uuid::Uuid::new_v4()));
    match CardEncryptor::new(&path) {
        Err(ZivraError::KeyNotFound(reported)) => assert_eq!(reported, path),
        other => panic!("expected KeyNotFound, got {other:?}"),
    }
}

#[test]
fn unreadable_key_path_surfaces_key_read_error() {
    // A directory passes the existence check at construction but fails the
    // text read, the same failure shape as a permission-denied key file.
    let dir = std::env::temp_dir().join(format!("zivra-keydir-{}", uuid::Uuid::new_v4()));
    fs::create_dir(&dir).unwrap();

    let encryptor = CardEncryptor::new(&dir).unwrap();
    match encryptor.encrypt(&test_card()) {
        Err(ZivraError::KeyReadError { path, .. }) => assert_eq!(path, dir),
        other => panic!("expected KeyReadError, got {other:?}"),
    }

    let _ = fs::remove_dir(&dir);
}

#[test]
fn log_events_report_shape_but_never_card_material() {
    use std::io;
    use std::sync::{Arc, Mutex};

    struct BufferWriter(Arc<Mutex<Vec<u8>>>);

    impl io::Write for BufferWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    let keypair = Rsa::generate(2048).unwrap();
    let key_path = write_key(&keypair.public_key_to_pem().unwrap());

    let buffer = Arc::new(Mutex::new(Vec::new()));
    let sink = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .without_time()
        .with_writer(move || BufferWriter(sink.clone()))
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let encryptor = CardEncryptor::new(&key_path).unwrap();
    encryptor.encrypt(&test_card()).unwrap();

    let logs = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
    assert!(logs.contains("card payload encrypted"), "no event: {logs}");
    assert!(logs.contains("ciphertext_len=256"));

    // Neither the PAN nor any serialized card field may reach a sink.
    assert!(!logs.contains("4111111111111111"));
    for field in ["\"cvv\"", "\"pin\"", "\"expiryDate\"", "\"pan\""] {
        assert!(!logs.contains(field), "log output leaked {field}: {logs}");
    }

    let _ = fs::remove_file(&key_path);
}
