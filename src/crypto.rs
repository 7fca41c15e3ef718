//! Secret encryption
//!
//! Secrets are stored only as ciphertext. The cipher is a collaborator of the
//! HTTP layer: handlers encrypt before calling
//! [`CreationService`](crate::services::CreationService) and decrypt what
//! [`RetrievalService`](crate::services::RetrievalService) hands back.
//! Every failure here means bad key material or tampered data, never bad
//! user input.

use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::errors::{Result, SecretLinksError};

const KEY_LEN: usize = 32;
const NONCE_LEN: usize = 12;

/// Symmetric text cipher
pub trait SecretCipher: Send + Sync {
    fn encrypt(&self, plaintext: &str) -> Result<String>;
    fn decrypt(&self, ciphertext: &str) -> Result<String>;
}

/// AES-256-GCM with a random nonce per message
///
/// Output is `base64(nonce || ciphertext)`.
pub struct AesGcmCipher {
    cipher: Aes256Gcm,
}

impl AesGcmCipher {
    pub fn new(key: &[u8; KEY_LEN]) -> Self {
        let key = Key::<Aes256Gcm>::from_slice(key);
        Self {
            cipher: Aes256Gcm::new(key),
        }
    }

    /// Build from configured key material
    ///
    /// Accepts either base64 of exactly 32 bytes or a raw 32-byte string.
    pub fn from_key_material(material: &str) -> Result<Self> {
        let bytes = match STANDARD.decode(material) {
            Ok(decoded) if decoded.len() == KEY_LEN => decoded,
            _ if material.len() == KEY_LEN => material.as_bytes().to_vec(),
            _ => {
                return Err(SecretLinksError::crypto(format!(
                    "encryption key must be 32 bytes (raw or base64), got {} bytes",
                    material.len()
                )));
            }
        };

        let mut key = [0u8; KEY_LEN];
        key.copy_from_slice(&bytes);
        Ok(Self::new(&key))
    }
}

impl SecretCipher for AesGcmCipher {
    fn encrypt(&self, plaintext: &str) -> Result<String> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|e| SecretLinksError::crypto(format!("encryption failed: {}", e)))?;

        let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        out.extend_from_slice(nonce.as_slice());
        out.extend_from_slice(&ciphertext);
        Ok(STANDARD.encode(out))
    }

    fn decrypt(&self, ciphertext: &str) -> Result<String> {
        let raw = STANDARD
            .decode(ciphertext)
            .map_err(|e| SecretLinksError::crypto(format!("ciphertext is not base64: {}", e)))?;
        if raw.len() < NONCE_LEN {
            return Err(SecretLinksError::crypto("ciphertext is truncated"));
        }

        let (nonce, body) = raw.split_at(NONCE_LEN);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), body)
            .map_err(|e| SecretLinksError::crypto(format!("decryption failed: {}", e)))?;

        String::from_utf8(plaintext)
            .map_err(|e| SecretLinksError::crypto(format!("plaintext is not UTF-8: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cipher() -> AesGcmCipher {
        AesGcmCipher::from_key_material("hello_this_is_32_symbols_string!").unwrap()
    }

    #[test]
    fn test_encrypt_then_decrypt() {
        let c = cipher();
        let encrypted = c.encrypt("test").unwrap();
        assert_ne!(encrypted, "test");
        assert_eq!(c.decrypt(&encrypted).unwrap(), "test");
    }

    #[test]
    fn test_nonce_makes_ciphertexts_differ() {
        let c = cipher();
        assert_ne!(c.encrypt("same").unwrap(), c.encrypt("same").unwrap());
    }

    #[test]
    fn test_base64_key_material() {
        let material = STANDARD.encode([7u8; 32]);
        let c = AesGcmCipher::from_key_material(&material).unwrap();
        let encrypted = c.encrypt("über secret").unwrap();
        assert_eq!(c.decrypt(&encrypted).unwrap(), "über secret");
    }

    #[test]
    fn test_short_key_is_rejected() {
        let err = AesGcmCipher::from_key_material("too short").err().unwrap();
        assert_eq!(err.code(), "E005");
    }

    #[test]
    fn test_wrong_key_fails_to_decrypt() {
        let encrypted = cipher().encrypt("secret").unwrap();
        let other = AesGcmCipher::new(&[1u8; 32]);
        assert!(matches!(
            other.decrypt(&encrypted),
            Err(SecretLinksError::Crypto(_))
        ));
    }

    #[test]
    fn test_garbage_ciphertext_fails() {
        let c = cipher();
        assert!(c.decrypt("not base64 !!").is_err());
        assert!(c.decrypt(&STANDARD.encode([0u8; 4])).is_err());
    }
}
