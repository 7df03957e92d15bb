//! XML-Enc content ciphers and RSA key transport.
//!
//! Ciphertext layouts follow XML Encryption:
//! - CBC: `IV || C`, padded so that the last byte holds the pad length
//! - GCM: `nonce (12 bytes) || C || tag`

use aes::cipher::block_padding::{NoPadding, Pkcs7};
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes128Gcm, Aes256Gcm, Nonce};
use rsa::rand_core::OsRng;
use rsa::{Oaep, Pkcs1v15Encrypt, RsaPrivateKey, RsaPublicKey};
use sha1::Sha1;

use crate::algorithm::{ContentEncryptionAlgorithm, KeyTransportAlgorithm};
use crate::error::{CryptoError, CryptoResult};
use crate::random::random_bytes;

const AES_BLOCK_LEN: usize = 16;
const GCM_NONCE_LEN: usize = 12;
const GCM_TAG_LEN: usize = 16;

type Aes128CbcEnc = cbc::Encryptor<aes::Aes128>;
type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes128CbcDec = cbc::Decryptor<aes::Aes128>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// Generates a fresh random content-encryption key for the algorithm.
#[must_use]
pub fn generate_content_key(algorithm: ContentEncryptionAlgorithm) -> Vec<u8> {
    random_bytes(algorithm.key_len())
}

fn check_key(algorithm: ContentEncryptionAlgorithm, key: &[u8]) -> CryptoResult<()> {
    if key.len() == algorithm.key_len() {
        Ok(())
    } else {
        Err(CryptoError::InvalidKeyLength {
            expected: algorithm.key_len(),
            actual: key.len(),
        })
    }
}

/// Encrypts `plaintext` with a fresh IV or nonce.
///
/// # Errors
///
/// Returns an error if the key has the wrong length or the cipher fails.
pub fn encrypt_content(
    algorithm: ContentEncryptionAlgorithm,
    key: &[u8],
    plaintext: &[u8],
) -> CryptoResult<Vec<u8>> {
    check_key(algorithm, key)?;

    if algorithm.is_gcm() {
        let nonce = random_bytes(GCM_NONCE_LEN);
        let nonce_ref = Nonce::from_slice(&nonce);
        let ciphertext = match algorithm {
            ContentEncryptionAlgorithm::Aes128Gcm => Aes128Gcm::new_from_slice(key)
                .map_err(|e| CryptoError::Encryption(e.to_string()))?
                .encrypt(nonce_ref, plaintext),
            _ => Aes256Gcm::new_from_slice(key)
                .map_err(|e| CryptoError::Encryption(e.to_string()))?
                .encrypt(nonce_ref, plaintext),
        }
        .map_err(|e| CryptoError::Encryption(format!("AES-GCM encryption failed: {e}")))?;

        let mut out = nonce;
        out.extend_from_slice(&ciphertext);
        return Ok(out);
    }

    let iv = random_bytes(AES_BLOCK_LEN);
    let ciphertext = match algorithm {
        ContentEncryptionAlgorithm::Aes128Cbc => Aes128CbcEnc::new_from_slices(key, &iv)
            .map_err(|e| CryptoError::Encryption(e.to_string()))?
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext),
        _ => Aes256CbcEnc::new_from_slices(key, &iv)
            .map_err(|e| CryptoError::Encryption(e.to_string()))?
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext),
    };

    let mut out = iv;
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

/// Decrypts data produced by [`encrypt_content`] or any XML-Enc peer.
///
/// CBC padding is removed by the XML-Enc rule: the last byte is the pad
/// length and the remaining pad bytes are not inspected.
///
/// # Errors
///
/// Returns an error if the data is truncated, the key has the wrong length,
/// the padding is invalid or the GCM tag does not verify.
pub fn decrypt_content(
    algorithm: ContentEncryptionAlgorithm,
    key: &[u8],
    data: &[u8],
) -> CryptoResult<Vec<u8>> {
    check_key(algorithm, key)?;

    if algorithm.is_gcm() {
        if data.len() < GCM_NONCE_LEN + GCM_TAG_LEN {
            return Err(CryptoError::Decryption("ciphertext too short".to_string()));
        }
        let (nonce, ciphertext) = data.split_at(GCM_NONCE_LEN);
        let nonce = Nonce::from_slice(nonce);
        return match algorithm {
            ContentEncryptionAlgorithm::Aes128Gcm => Aes128Gcm::new_from_slice(key)
                .map_err(|e| CryptoError::Decryption(e.to_string()))?
                .decrypt(nonce, ciphertext),
            _ => Aes256Gcm::new_from_slice(key)
                .map_err(|e| CryptoError::Decryption(e.to_string()))?
                .decrypt(nonce, ciphertext),
        }
        .map_err(|_| CryptoError::Decryption("authentication tag mismatch".to_string()));
    }

    if data.len() < 2 * AES_BLOCK_LEN || data.len() % AES_BLOCK_LEN != 0 {
        return Err(CryptoError::Decryption(
            "ciphertext is not a whole number of blocks".to_string(),
        ));
    }
    let (iv, ciphertext) = data.split_at(AES_BLOCK_LEN);
    let mut plaintext = match algorithm {
        ContentEncryptionAlgorithm::Aes128Cbc => Aes128CbcDec::new_from_slices(key, iv)
            .map_err(|e| CryptoError::Decryption(e.to_string()))?
            .decrypt_padded_vec_mut::<NoPadding>(ciphertext),
        _ => Aes256CbcDec::new_from_slices(key, iv)
            .map_err(|e| CryptoError::Decryption(e.to_string()))?
            .decrypt_padded_vec_mut::<NoPadding>(ciphertext),
    }
    .map_err(|e| CryptoError::Decryption(e.to_string()))?;

    let pad = plaintext.last().copied().map_or(0, usize::from);
    if pad == 0 || pad > AES_BLOCK_LEN || pad > plaintext.len() {
        return Err(CryptoError::Decryption("invalid padding".to_string()));
    }
    plaintext.truncate(plaintext.len() - pad);
    Ok(plaintext)
}

/// Encrypts a content key for the recipient.
///
/// # Errors
///
/// Returns an error if the key is too large for the RSA modulus.
pub fn wrap_key(
    recipient: &RsaPublicKey,
    algorithm: KeyTransportAlgorithm,
    content_key: &[u8],
) -> CryptoResult<Vec<u8>> {
    let mut rng = OsRng;
    let wrapped = match algorithm {
        KeyTransportAlgorithm::RsaOaepMgf1p => {
            recipient.encrypt(&mut rng, Oaep::new::<Sha1>(), content_key)
        }
        KeyTransportAlgorithm::Rsa15 => recipient.encrypt(&mut rng, Pkcs1v15Encrypt, content_key),
    };
    wrapped.map_err(|e| CryptoError::Encryption(format!("key transport failed: {e}")))
}

/// Recovers a content key wrapped by [`wrap_key`].
///
/// # Errors
///
/// Returns an error if the private key does not match or the padding is bad.
pub fn unwrap_key(
    key: &RsaPrivateKey,
    algorithm: KeyTransportAlgorithm,
    wrapped: &[u8],
) -> CryptoResult<Vec<u8>> {
    let unwrapped = match algorithm {
        KeyTransportAlgorithm::RsaOaepMgf1p => key.decrypt(Oaep::new::<Sha1>(), wrapped),
        KeyTransportAlgorithm::Rsa15 => key.decrypt(Pkcs1v15Encrypt, wrapped),
    };
    unwrapped.map_err(|e| CryptoError::Decryption(format!("key unwrap failed: {e}")))
}
