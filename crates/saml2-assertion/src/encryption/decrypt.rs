//! `EncryptedAssertion` decryption.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::debug;

use saml2_crypto::{
    decrypt_content, parse_private_key, unwrap_key, ContentEncryptionAlgorithm,
    KeyTransportAlgorithm, RsaPrivateKey,
};

use crate::error::{SamlError, SamlResult};
use crate::xml::{self, Element};

/// Recovers plaintext assertions with the recipient's private key.
#[derive(Clone)]
pub struct AssertionDecrypter {
    key: RsaPrivateKey,
}

impl AssertionDecrypter {
    /// Creates a decrypter from a private key.
    #[must_use]
    pub const fn new(key: RsaPrivateKey) -> Self {
        Self { key }
    }

    /// Creates a decrypter from a PEM private key.
    ///
    /// # Errors
    ///
    /// Returns [`SamlError::MissingKey`] for blank input or a crypto error if
    /// the key cannot be parsed.
    pub fn from_pem(key_pem: &str) -> SamlResult<Self> {
        if key_pem.trim().is_empty() {
            return Err(SamlError::MissingKey);
        }
        Ok(Self::new(parse_private_key(key_pem)?))
    }

    /// Decrypts the first `EncryptedData` in `xml`, which may be an
    /// `EncryptedAssertion` or a Response carrying one.
    ///
    /// # Errors
    ///
    /// Returns [`SamlError::Decryption`] if the document has no usable
    /// `EncryptedData` or the key does not match.
    pub fn decrypt(&self, xml: &str) -> SamlResult<String> {
        if xml.trim().is_empty() {
            return Err(SamlError::EmptyDocument);
        }
        let document = xml::parse(xml)?;
        let encrypted_data = document
            .find("EncryptedData")
            .ok_or_else(|| failed("document has no EncryptedData"))?;

        let content_algorithm = ContentEncryptionAlgorithm::from_uri(
            algorithm_of(encrypted_data).ok_or_else(|| failed("EncryptedData has no EncryptionMethod"))?,
        )
        .ok_or_else(|| failed("unsupported content encryption algorithm"))?;

        let encrypted_key = encrypted_data
            .find("EncryptedKey")
            .ok_or_else(|| failed("EncryptedData carries no EncryptedKey"))?;
        let key_transport = KeyTransportAlgorithm::from_uri(
            algorithm_of(encrypted_key).ok_or_else(|| failed("EncryptedKey has no EncryptionMethod"))?,
        )
        .ok_or_else(|| failed("unsupported key transport algorithm"))?;

        let wrapped_key = cipher_value(encrypted_key)?;
        let ciphertext = cipher_value(encrypted_data)?;

        let content_key = unwrap_key(&self.key, key_transport, &wrapped_key)
            .map_err(|e| SamlError::Decryption(e.to_string()))?;
        let plaintext = decrypt_content(content_algorithm, &content_key, &ciphertext)
            .map_err(|e| SamlError::Decryption(e.to_string()))?;

        debug!(algorithm = content_algorithm.uri(), "Assertion decrypted");
        String::from_utf8(plaintext).map_err(|_| failed("plaintext is not UTF-8"))
    }
}

impl fmt::Debug for AssertionDecrypter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssertionDecrypter")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

fn failed(reason: &str) -> SamlError {
    SamlError::Decryption(reason.to_string())
}

fn algorithm_of(parent: &Element) -> Option<&str> {
    parent
        .child("EncryptionMethod")
        .and_then(|method| method.attr("Algorithm"))
}

fn cipher_value(parent: &Element) -> SamlResult<Vec<u8>> {
    let value = parent
        .child("CipherData")
        .and_then(|data| data.child("CipherValue"))
        .ok_or_else(|| failed(&format!("{} has no CipherValue", parent.local_name())))?
        .text();
    let compact: String = value.split_whitespace().collect();
    STANDARD
        .decode(compact)
        .map_err(|e| failed(&format!("invalid CipherValue: {e}")))
}
