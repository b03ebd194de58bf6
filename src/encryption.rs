//! RSA encryption of card details.
//!
//! Card fields never travel in the clear: the SDK serializes them to JSON
//! and encrypts the bytes with the merchant's RSA public key before they are
//! attached to a card charge. The gateway decrypts with the matching private
//! key, so padding and encoding here must match it exactly: PKCS#1 v1.5
//! padding (not OAEP) and standard base64 output.

use std::fs;
use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use openssl::pkey::Public;
use openssl::rsa::{Padding, Rsa};
use zeroize::Zeroizing;

use crate::errors::{Result, ZivraError};
use crate::types::CardFields;

/// PKCS#1 v1.5 reserves 11 bytes of every RSA block for padding.
const PKCS1_PADDING_OVERHEAD: usize = 11;

/// Encrypts card details with the merchant's RSA public key.
///
/// Bound to a PEM key file on disk. The file is read fresh on every call,
/// so a rotated key takes effect without reconstructing the encryptor.
/// Both `BEGIN PUBLIC KEY` and `BEGIN RSA PUBLIC KEY` PEM markers are
/// accepted.
///
/// # Examples
///
/// ```no_run
/// use zivra_pay::encryption::CardEncryptor;
/// use zivra_pay::types::CardFields;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let encryptor = CardEncryptor::new("/etc/zivra/public.pem")?;
/// let card = CardFields::new("4111111111111111", "12", "25", "123", "1234");
///
/// let ciphertext = encryptor.encrypt(&card)?;
/// assert!(!ciphertext.is_empty());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct CardEncryptor {
    key_path: PathBuf,
}

impl CardEncryptor {
    /// Creates an encryptor backed by the RSA public key at `key_path`.
    ///
    /// Fails with [`ZivraError::KeyNotFound`] if no file exists at that
    /// path. The key itself is not parsed until the first encrypt call.
    pub fn new(key_path: impl Into<PathBuf>) -> Result<Self> {
        let key_path = key_path.into();
        if !key_path.exists() {
            return Err(ZivraError::KeyNotFound(key_path));
        }
        Ok(Self { key_path })
    }

    /// Path of the public key file backing this encryptor.
    pub fn key_path(&self) -> &Path {
        &self.key_path
    }

    /// Encrypts card details into a base64 ciphertext.
    ///
    /// The card is validated first, then serialized to JSON with the key
    /// order `cvv`, `pin`, `expiryDate`, `pan` and encrypted with PKCS#1
    /// v1.5 padding. PKCS#1 v1.5 caps the plaintext at `keysize/8 - 11`
    /// bytes (245 for a 2048-bit key); a payload over that limit fails with
    /// [`ZivraError::EncryptionError`] rather than truncating.
    pub fn encrypt(&self, card: &CardFields) -> Result<String> {
        card.validate()?;

        let pem = fs::read_to_string(&self.key_path).map_err(|source| {
            ZivraError::KeyReadError {
                path: self.key_path.clone(),
                source,
            }
        })?;
        let key = load_public_key(&pem)?;

        let json = Zeroizing::new(serde_json::to_string(card)?);
        let limit = key.size() as usize - PKCS1_PADDING_OVERHEAD;
        if json.len() > limit {
            return Err(ZivraError::EncryptionError(format!(
                "card payload of {} bytes exceeds the {}-byte limit for this key",
                json.len(),
                limit
            )));
        }

        let mut ciphertext = vec![0u8; key.size() as usize];
        let written = key.public_encrypt(json.as_bytes(), &mut ciphertext, Padding::PKCS1)?;
        ciphertext.truncate(written);
        tracing::debug!(
            key = %self.key_path.display(),
            ciphertext_len = written,
            "card payload encrypted"
        );
        Ok(BASE64.encode(&ciphertext))
    }
}

/// Rewrites `RSA PUBLIC KEY` PEM markers to the generic form.
fn normalize_pem(pem: &str) -> String {
    pem.replace("BEGIN RSA PUBLIC KEY", "BEGIN PUBLIC KEY")
        .replace("END RSA PUBLIC KEY", "END PUBLIC KEY")
}

/// Imports an RSA public key from PEM text.
///
/// Tries the generic (SubjectPublicKeyInfo) encoding against the normalized
/// markers first, then falls back to a PKCS#1 import of the original text
/// for keys whose body really is the PKCS#1 structure.
fn load_public_key(pem: &str) -> Result<Rsa<Public>> {
    match Rsa::public_key_from_pem(normalize_pem(pem).as_bytes()) {
        Ok(key) => Ok(key),
        Err(_) => Rsa::public_key_from_pem_pkcs1(pem.as_bytes())
            .map_err(|e| ZivraError::EncryptionError(format!("unsupported public key: {}", e))),
    }
}
