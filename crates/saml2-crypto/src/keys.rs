//! PEM key material and X.509 certificates.
//!
//! Private keys are accepted in PKCS#8 (`PRIVATE KEY`) and PKCS#1
//! (`RSA PRIVATE KEY`) form. Public keys may come from a certificate, a
//! SubjectPublicKeyInfo (`PUBLIC KEY`) or a PKCS#1 `RSA PUBLIC KEY`.
//! Certificates may also be supplied as bare base64 without armor.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey};
use rsa::{RsaPrivateKey, RsaPublicKey};

use crate::error::{CryptoError, CryptoResult};

const ARMOR_PREFIX: &str = "-----";

/// Returns the base64 body of a PEM document with the armor lines and all
/// whitespace removed.
///
/// Input without armor is returned with whitespace removed, so a bare
/// base64 certificate passes through unchanged.
#[must_use]
pub fn certificate_base64(pem: &str) -> String {
    pem.lines()
        .map(str::trim)
        .filter(|line| !line.starts_with(ARMOR_PREFIX))
        .flat_map(|line| line.split_whitespace())
        .collect()
}

/// Decodes the body of a PEM document into DER bytes.
///
/// # Errors
///
/// Returns an error if the body is not valid base64 or is empty.
pub fn pem_to_der(pem: &str) -> CryptoResult<Vec<u8>> {
    let body = certificate_base64(pem);
    if body.is_empty() {
        return Err(CryptoError::InvalidKey("empty PEM document".to_string()));
    }
    Ok(STANDARD.decode(body)?)
}

/// Decodes a PEM (or bare base64) X.509 certificate into DER bytes.
///
/// # Errors
///
/// Returns an error if the input does not hold a parseable certificate.
pub fn certificate_der(pem: &str) -> CryptoResult<Vec<u8>> {
    let der = pem_to_der(pem)
        .map_err(|e| CryptoError::InvalidCertificate(format!("not a PEM certificate: {e}")))?;
    x509_parser::parse_x509_certificate(&der)
        .map_err(|e| CryptoError::InvalidCertificate(e.to_string()))?;
    Ok(der)
}

/// Extracts the RSA public key from a DER-encoded X.509 certificate.
///
/// # Errors
///
/// Returns an error if the certificate cannot be parsed or does not carry
/// an RSA key.
pub fn public_key_from_certificate(der: &[u8]) -> CryptoResult<RsaPublicKey> {
    let (_, cert) = x509_parser::parse_x509_certificate(der)
        .map_err(|e| CryptoError::InvalidCertificate(e.to_string()))?;
    RsaPublicKey::from_public_key_der(cert.public_key().raw)
        .map_err(|e| CryptoError::InvalidCertificate(format!("certificate key is not RSA: {e}")))
}

/// Parses an RSA private key from PEM.
///
/// # Errors
///
/// Returns an error if the key is neither PKCS#8 nor PKCS#1.
pub fn parse_private_key(pem: &str) -> CryptoResult<RsaPrivateKey> {
    let pem = pem.trim();
    if let Ok(key) = RsaPrivateKey::from_pkcs8_pem(pem) {
        return Ok(key);
    }
    RsaPrivateKey::from_pkcs1_pem(pem)
        .map_err(|e| CryptoError::InvalidKey(format!("expected an RSA private key in PEM format: {e}")))
}

/// Parses an RSA public key from a certificate or public key PEM.
///
/// # Errors
///
/// Returns an error if no RSA public key can be decoded.
pub fn parse_public_key(pem: &str) -> CryptoResult<RsaPublicKey> {
    let pem = pem.trim();
    if pem.contains("BEGIN RSA PUBLIC KEY") {
        return RsaPublicKey::from_pkcs1_pem(pem)
            .map_err(|e| CryptoError::InvalidKey(e.to_string()));
    }
    if pem.contains("BEGIN PUBLIC KEY") {
        return RsaPublicKey::from_public_key_pem(pem)
            .map_err(|e| CryptoError::InvalidKey(e.to_string()));
    }

    let der = pem_to_der(pem)?;
    if let Ok(key) = public_key_from_certificate(&der) {
        return Ok(key);
    }
    RsaPublicKey::from_public_key_der(&der)
        .map_err(|e| CryptoError::InvalidKey(format!("expected a certificate or public key: {e}")))
}
