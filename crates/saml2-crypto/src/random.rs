//! Cryptographically secure random generation.
//!
//! Used for:
//! - Assertion and Response `ID` attributes
//! - Symmetric content-encryption keys
//! - CBC initialization vectors and GCM nonces

use rand::distr::{Alphanumeric, SampleString};
use rand::Rng;

/// Length of identifiers generated for `ID` attributes.
pub const UID_LENGTH: usize = 32;

/// Generates a cryptographically secure random byte array.
#[must_use]
pub fn random_bytes(len: usize) -> Vec<u8> {
    let mut rng = rand::rng();
    let mut bytes = vec![0u8; len];
    rng.fill(&mut bytes[..]);
    bytes
}

/// Generates a random string of `len` alphanumeric characters (a-z, A-Z, 0-9).
#[must_use]
pub fn random_alphanumeric(len: usize) -> String {
    let mut rng = rand::rng();
    Alphanumeric.sample_string(&mut rng, len)
}

/// Generates a unique identifier of the requested length.
///
/// Identifiers are alphanumeric so that `"_" + uid` is always a valid
/// `xs:ID` value.
#[must_use]
pub fn generate_uid(len: usize) -> String {
    random_alphanumeric(len)
}
