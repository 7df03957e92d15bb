//! Error types for cryptographic operations.

use thiserror::Error;

/// Result type for cryptographic operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors raised by key parsing, signing and encryption.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// The private or public key could not be decoded.
    #[error("invalid key format: {0}")]
    InvalidKey(String),

    /// The X.509 certificate could not be decoded.
    #[error("invalid certificate: {0}")]
    InvalidCertificate(String),

    /// Signing failed.
    #[error("signing failed: {0}")]
    Signing(String),

    /// The signature does not match the data.
    #[error("signature verification failed")]
    Verification,

    /// Content encryption or key wrapping failed.
    #[error("encryption failed: {0}")]
    Encryption(String),

    /// Content decryption or key unwrapping failed.
    #[error("decryption failed: {0}")]
    Decryption(String),

    /// A symmetric key has the wrong length for its algorithm.
    #[error("invalid key length: expected {expected} bytes, got {actual}")]
    InvalidKeyLength {
        /// Length required by the algorithm.
        expected: usize,
        /// Length supplied.
        actual: usize,
    },

    /// Base64 decoding error.
    #[error("base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),
}
