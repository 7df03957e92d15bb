//! XML Signature support.
//!
//! Assertions and Responses carry enveloped XML-DSig signatures:
//!
//! - Reference `URI="#" + ID` over the signed element
//! - Transforms: enveloped-signature, then exclusive canonicalization
//! - Digest: SHA-256 (default) or SHA-1
//! - Signature: RSA-SHA256 (default) or RSA-SHA1
//! - `KeyInfo/X509Data/X509Certificate` carrying the signing certificate
//!
//! Legacy SHA-1 algorithms are supported for compatibility but not recommended.

mod signer;
mod validator;

pub use signer::*;
pub use validator::*;

use std::fmt;
use std::sync::Arc;

use saml2_crypto::{
    certificate_base64, certificate_der, parse_private_key, rsa_sign, DigestAlgorithm,
    RsaPrivateKey, SignatureAlgorithm,
};

use crate::error::{SamlError, SamlResult};
use crate::types::AssertionOptions;
use crate::xml::NodeSelector;

/// The element a signature covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SigningTarget {
    /// `saml:Assertion`.
    Assertion,
    /// `samlp:Response`.
    Response,
}

impl SigningTarget {
    /// Returns the local name of the signed element.
    #[must_use]
    pub const fn local_name(&self) -> &'static str {
        match self {
            Self::Assertion => "Assertion",
            Self::Response => "Response",
        }
    }
}

impl fmt::Display for SigningTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.local_name())
    }
}

/// Produces raw signature bytes and names the certificate to embed.
///
/// Implement this to sign with keys held outside the process.
pub trait SigningCapability: Send + Sync {
    /// Signs canonical `SignedInfo` bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the key cannot produce a signature.
    fn sign(&self, algorithm: SignatureAlgorithm, data: &[u8]) -> SamlResult<Vec<u8>>;

    /// Returns the base64 DER certificate written into `X509Certificate`.
    fn certificate(&self) -> &str;
}

/// An in-memory RSA key and its certificate.
#[derive(Clone)]
pub struct RsaSigningKey {
    key: RsaPrivateKey,
    certificate: String,
}

impl RsaSigningKey {
    /// Parses a PEM private key and PEM certificate.
    ///
    /// # Errors
    ///
    /// Returns [`SamlError::MissingKey`] or [`SamlError::MissingCertificate`]
    /// for blank input, or a crypto error if either fails to parse.
    pub fn from_pem(key_pem: &str, cert_pem: &str) -> SamlResult<Self> {
        if key_pem.trim().is_empty() {
            return Err(SamlError::MissingKey);
        }
        if cert_pem.trim().is_empty() {
            return Err(SamlError::MissingCertificate);
        }
        let key = parse_private_key(key_pem)?;
        certificate_der(cert_pem)?;
        Ok(Self {
            key,
            certificate: certificate_base64(cert_pem),
        })
    }
}

impl fmt::Debug for RsaSigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RsaSigningKey")
            .field("key", &"[REDACTED]")
            .field("certificate", &self.certificate)
            .finish()
    }
}

impl SigningCapability for RsaSigningKey {
    fn sign(&self, algorithm: SignatureAlgorithm, data: &[u8]) -> SamlResult<Vec<u8>> {
        Ok(rsa_sign(&self.key, algorithm, data)?)
    }

    fn certificate(&self) -> &str {
        &self.certificate
    }
}

/// How and where a signature is produced.
#[derive(Clone)]
pub struct SignatureOptions {
    /// Key and certificate.
    pub signer: Arc<dyn SigningCapability>,
    /// Signature algorithm.
    pub signature_algorithm: SignatureAlgorithm,
    /// Reference digest algorithm.
    pub digest_algorithm: DigestAlgorithm,
    /// Namespace prefix for the `Signature` element and its descendants.
    pub prefix: Option<String>,
    /// The element the signature is inserted after.
    pub location: NodeSelector,
}

impl SignatureOptions {
    /// Creates options with default algorithms, no prefix and placement
    /// after the first `Issuer`.
    #[must_use]
    pub fn new(signer: Arc<dyn SigningCapability>) -> Self {
        Self {
            signer,
            signature_algorithm: SignatureAlgorithm::default(),
            digest_algorithm: DigestAlgorithm::default(),
            prefix: None,
            location: NodeSelector::default(),
        }
    }

    /// Derives signing options from assertion options.
    ///
    /// Key, certificate and node selector are checked in that order.
    ///
    /// # Errors
    ///
    /// Returns [`SamlError::MissingKey`] or [`SamlError::MissingCertificate`]
    /// if either is absent or blank, a crypto error if either fails to parse,
    /// or [`SamlError::InvalidOption`] for an unsupported node selector.
    pub fn from_assertion_options(options: &AssertionOptions) -> SamlResult<Self> {
        let key = options
            .key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(SamlError::MissingKey)?;
        let cert = options
            .cert
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .ok_or(SamlError::MissingCertificate)?;
        let signer = RsaSigningKey::from_pem(key, cert)?;

        let location = match options.xpath_to_node_before_signature.as_deref() {
            Some(expression) if !expression.trim().is_empty() => NodeSelector::parse(expression)?,
            _ => NodeSelector::default(),
        };

        Ok(Self {
            signer: Arc::new(signer),
            signature_algorithm: options.signature_algorithm,
            digest_algorithm: options.digest_algorithm,
            prefix: options.effective_signature_prefix().map(str::to_string),
            location,
        })
    }

    /// Sets the algorithms.
    #[must_use]
    pub const fn with_algorithms(
        mut self,
        signature: SignatureAlgorithm,
        digest: DigestAlgorithm,
    ) -> Self {
        self.signature_algorithm = signature;
        self.digest_algorithm = digest;
        self
    }

    /// Sets the namespace prefix.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into()).filter(|p: &String| !p.is_empty());
        self
    }

    /// Sets the element the signature is inserted after.
    #[must_use]
    pub fn with_location(mut self, location: NodeSelector) -> Self {
        self.location = location;
        self
    }
}

impl fmt::Debug for SignatureOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignatureOptions")
            .field("signature_algorithm", &self.signature_algorithm)
            .field("digest_algorithm", &self.digest_algorithm)
            .field("prefix", &self.prefix)
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = include_str!("../../tests/fixtures/idp-signing.key");
    const CERT: &str = include_str!("../../tests/fixtures/idp-signing.pem");

    #[test]
    fn validation_order_is_key_then_cert() {
        let options = AssertionOptions::default();
        assert!(matches!(
            SignatureOptions::from_assertion_options(&options),
            Err(SamlError::MissingKey)
        ));

        let options = AssertionOptions {
            key: Some(KEY.to_string()),
            cert: Some("  ".to_string()),
            ..AssertionOptions::default()
        };
        assert!(matches!(
            SignatureOptions::from_assertion_options(&options),
            Err(SamlError::MissingCertificate)
        ));
    }

    #[test]
    fn options_carry_prefix_and_location() -> anyhow::Result<()> {
        let options = AssertionOptions::new(KEY, CERT)
            .with_signature_prefix("ds")
            .with_signature_location("//*[local-name(.)='Conditions']");
        let signing = SignatureOptions::from_assertion_options(&options)?;
        assert_eq!(signing.prefix.as_deref(), Some("ds"));
        assert_eq!(signing.location, NodeSelector::local_name("Conditions"));
        assert_eq!(signing.signer.certificate(), certificate_base64(CERT));
        Ok(())
    }

    #[test]
    fn unsupported_location_is_rejected() {
        let options = AssertionOptions::new(KEY, CERT).with_signature_location("//a/b");
        assert!(matches!(
            SignatureOptions::from_assertion_options(&options),
            Err(SamlError::InvalidOption(_))
        ));
    }

    #[test]
    fn debug_redacts_key() -> anyhow::Result<()> {
        let key = RsaSigningKey::from_pem(KEY, CERT)?;
        assert!(format!("{key:?}").contains("[REDACTED]"));
        Ok(())
    }
}
