//! Digest functions for XML-DSig references.

use sha1::{Digest, Sha1};
use sha2::Sha256;

use crate::algorithm::DigestAlgorithm;

/// Computes a digest of the input data.
#[must_use]
pub fn digest(algorithm: DigestAlgorithm, data: &[u8]) -> Vec<u8> {
    match algorithm {
        DigestAlgorithm::Sha1 => sha1(data),
        DigestAlgorithm::Sha256 => sha256(data),
    }
}

/// Computes a SHA-1 digest of the input data.
#[must_use]
pub fn sha1(data: &[u8]) -> Vec<u8> {
    Sha1::digest(data).to_vec()
}

/// Computes a SHA-256 digest of the input data.
#[must_use]
pub fn sha256(data: &[u8]) -> Vec<u8> {
    Sha256::digest(data).to_vec()
}
