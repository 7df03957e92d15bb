//! RSA PKCS#1 v1.5 signatures over canonical `SignedInfo` bytes.

use rsa::pkcs1v15::{Signature, SigningKey, VerifyingKey};
use rsa::signature::{SignatureEncoding, Signer, Verifier};
use rsa::{RsaPrivateKey, RsaPublicKey};
use sha1::Sha1;
use sha2::Sha256;

use crate::algorithm::SignatureAlgorithm;
use crate::error::{CryptoError, CryptoResult};

/// Signs `data` with the given key and algorithm.
///
/// # Errors
///
/// Returns an error if the RSA operation fails.
pub fn rsa_sign(
    key: &RsaPrivateKey,
    algorithm: SignatureAlgorithm,
    data: &[u8],
) -> CryptoResult<Vec<u8>> {
    let signature = match algorithm {
        SignatureAlgorithm::RsaSha1 => SigningKey::<Sha1>::new(key.clone())
            .try_sign(data)
            .map_err(|e| CryptoError::Signing(format!("RSA-SHA1 signing failed: {e}")))?,
        SignatureAlgorithm::RsaSha256 => SigningKey::<Sha256>::new(key.clone())
            .try_sign(data)
            .map_err(|e| CryptoError::Signing(format!("RSA-SHA256 signing failed: {e}")))?,
    };
    Ok(signature.to_vec())
}

/// Verifies an RSA signature over `data`.
///
/// # Errors
///
/// Returns [`CryptoError::Verification`] if the signature does not match.
pub fn rsa_verify(
    key: &RsaPublicKey,
    algorithm: SignatureAlgorithm,
    data: &[u8],
    signature: &[u8],
) -> CryptoResult<()> {
    let signature = Signature::try_from(signature).map_err(|_| CryptoError::Verification)?;
    let verified = match algorithm {
        SignatureAlgorithm::RsaSha1 => {
            VerifyingKey::<Sha1>::new(key.clone()).verify(data, &signature)
        }
        SignatureAlgorithm::RsaSha256 => {
            VerifyingKey::<Sha256>::new(key.clone()).verify(data, &signature)
        }
    };
    verified.map_err(|_| CryptoError::Verification)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::{parse_private_key, parse_public_key};

    const SIGNING_KEY: &str = include_str!("../../saml2-assertion/tests/fixtures/idp-signing.key");
    const SIGNING_CERT: &str = include_str!("../../saml2-assertion/tests/fixtures/idp-signing.pem");

    #[test]
    fn sign_and_verify_both_algorithms() -> anyhow::Result<()> {
        let private = parse_private_key(SIGNING_KEY)?;
        let public = parse_public_key(SIGNING_CERT)?;

        for alg in [SignatureAlgorithm::RsaSha1, SignatureAlgorithm::RsaSha256] {
            let sig = rsa_sign(&private, alg, b"signed info")?;
            rsa_verify(&public, alg, b"signed info", &sig)?;
        }
        Ok(())
    }

    #[test]
    fn tampered_data_fails_verification() -> anyhow::Result<()> {
        let private = parse_private_key(SIGNING_KEY)?;
        let public = parse_public_key(SIGNING_CERT)?;

        let sig = rsa_sign(&private, SignatureAlgorithm::RsaSha256, b"signed info")?;
        let result = rsa_verify(&public, SignatureAlgorithm::RsaSha256, b"signed inf0", &sig);
        assert!(matches!(result, Err(CryptoError::Verification)));
        Ok(())
    }

    #[test]
    fn algorithm_mismatch_fails_verification() -> anyhow::Result<()> {
        let private = parse_private_key(SIGNING_KEY)?;
        let public = parse_public_key(SIGNING_CERT)?;

        let sig = rsa_sign(&private, SignatureAlgorithm::RsaSha1, b"data")?;
        assert!(rsa_verify(&public, SignatureAlgorithm::RsaSha256, b"data", &sig).is_err());
        Ok(())
    }
}
