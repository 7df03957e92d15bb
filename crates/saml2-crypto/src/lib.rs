//! # saml2-crypto
//!
//! Cryptographic primitives used to issue SAML 2.0 assertions.
//!
//! This crate covers everything the XML layer treats as an opaque capability:
//!
//! - **Key material** - PEM private keys (PKCS#1 and PKCS#8), public keys and
//!   X.509 certificates
//! - **Digests** - SHA-1 and SHA-256 for XML-DSig references
//! - **Signatures** - RSA PKCS#1 v1.5 with SHA-1 or SHA-256
//! - **Encryption** - XML-Enc content ciphers (AES-CBC, AES-GCM) and RSA key
//!   transport (OAEP with MGF1/SHA-1, PKCS#1 v1.5)
//! - **Identifiers** - random alphanumeric identifiers for `ID` attributes
//!
//! SHA-1 based algorithms exist only for interoperability with relying
//! parties that still require them.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod algorithm;
pub mod encryption;
pub mod error;
pub mod hash;
pub mod keys;
pub mod random;
pub mod signature;

pub use algorithm::{
    ContentEncryptionAlgorithm, DigestAlgorithm, KeyTransportAlgorithm, SignatureAlgorithm,
};
pub use encryption::{
    decrypt_content, encrypt_content, generate_content_key, unwrap_key, wrap_key,
};
pub use error::{CryptoError, CryptoResult};
pub use hash::{digest, sha1, sha256};
pub use keys::{
    certificate_base64, certificate_der, parse_private_key, parse_public_key, pem_to_der,
    public_key_from_certificate,
};
pub use random::{generate_uid, random_alphanumeric, random_bytes};
pub use signature::{rsa_sign, rsa_verify};

pub use rsa::{RsaPrivateKey, RsaPublicKey};
