//! Assertion encryption.
//!
//! The assertion is encrypted into an XML-Enc `EncryptedData` fragment by an
//! [`EncryptionCapability`]; [`EncryptionEngine`] wraps that fragment in a
//! `saml:EncryptedAssertion` element. Encryption is the only asynchronous
//! step of issuance.

mod decrypt;
mod xmlenc;

pub use decrypt::AssertionDecrypter;
pub use xmlenc::encrypt_fragment;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use saml2_crypto::{
    certificate_base64, certificate_der, parse_public_key, public_key_from_certificate,
    ContentEncryptionAlgorithm, KeyTransportAlgorithm, RsaPublicKey,
};

use crate::error::{SamlError, SamlResult};
use crate::types::{ResponseOptions, SAML_NS};

/// Recipient key material and algorithms.
#[derive(Clone)]
pub struct EncryptionOptions {
    /// Key used to wrap the content key.
    pub recipient_key: RsaPublicKey,
    /// Base64 DER certificate announced in the `EncryptedKey`.
    pub certificate: String,
    /// Content encryption algorithm.
    pub content_algorithm: ContentEncryptionAlgorithm,
    /// Key transport algorithm.
    pub key_transport: KeyTransportAlgorithm,
}

impl EncryptionOptions {
    /// Builds options from a recipient certificate and, optionally, a
    /// separate public key. Without one the certificate's key is used.
    ///
    /// # Errors
    ///
    /// Returns a crypto error if the certificate or key cannot be parsed.
    pub fn from_pem(cert_pem: &str, public_key_pem: Option<&str>) -> SamlResult<Self> {
        let der = certificate_der(cert_pem)?;
        let recipient_key = match public_key_pem.filter(|pem| !pem.trim().is_empty()) {
            Some(pem) => parse_public_key(pem)?,
            None => public_key_from_certificate(&der)?,
        };
        Ok(Self {
            recipient_key,
            certificate: certificate_base64(cert_pem),
            content_algorithm: ContentEncryptionAlgorithm::default(),
            key_transport: KeyTransportAlgorithm::default(),
        })
    }

    /// Derives encryption options from response options. Returns `None`
    /// when no encryption certificate is configured.
    ///
    /// # Errors
    ///
    /// See [`EncryptionOptions::from_pem`].
    pub fn from_response_options(options: &ResponseOptions) -> SamlResult<Option<Self>> {
        let Some(cert) = options.encryption_cert.as_deref().filter(|c| !c.trim().is_empty()) else {
            return Ok(None);
        };
        let encryption = Self::from_pem(cert, options.encryption_public_key.as_deref())?
            .with_algorithms(options.encryption_algorithm, options.key_encryption_algorithm);
        Ok(Some(encryption))
    }

    /// Sets the algorithms.
    #[must_use]
    pub const fn with_algorithms(
        mut self,
        content: ContentEncryptionAlgorithm,
        key_transport: KeyTransportAlgorithm,
    ) -> Self {
        self.content_algorithm = content;
        self.key_transport = key_transport;
        self
    }
}

impl fmt::Debug for EncryptionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptionOptions")
            .field("certificate", &self.certificate)
            .field("content_algorithm", &self.content_algorithm)
            .field("key_transport", &self.key_transport)
            .finish_non_exhaustive()
    }
}

/// Encrypts an XML fragment into an `EncryptedData` element.
#[async_trait]
pub trait EncryptionCapability: Send + Sync {
    /// Returns the serialized `EncryptedData` element.
    ///
    /// # Errors
    ///
    /// Returns an error if encryption fails; the error reaches the caller
    /// unchanged.
    async fn encrypt(&self, xml: String, options: &EncryptionOptions) -> SamlResult<String>;
}

/// Default capability: AES content encryption and RSA key transport, run on
/// the blocking thread pool.
///
/// # Panics
///
/// [`EncryptionCapability::encrypt`] panics when polled outside a Tokio
/// runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlEncryptor;

#[async_trait]
impl EncryptionCapability for XmlEncryptor {
    async fn encrypt(&self, xml: String, options: &EncryptionOptions) -> SamlResult<String> {
        let options = options.clone();
        tokio::task::spawn_blocking(move || encrypt_fragment(&xml, &options))
            .await
            .map_err(|e| SamlError::Encryption(format!("encryption task failed: {e}")))?
    }
}

/// Encrypts assertions and wraps them in `EncryptedAssertion`.
#[derive(Clone)]
pub struct EncryptionEngine {
    capability: Arc<dyn EncryptionCapability>,
}

impl EncryptionEngine {
    /// Creates an engine over a capability.
    #[must_use]
    pub fn new(capability: Arc<dyn EncryptionCapability>) -> Self {
        Self { capability }
    }

    /// Encrypts `assertion_xml` and returns the `EncryptedAssertion`.
    ///
    /// The wrapper always declares the assertion namespace, whatever the
    /// capability emitted.
    ///
    /// # Errors
    ///
    /// Returns [`SamlError::EmptyDocument`] for blank input, or the
    /// capability's error unchanged.
    pub async fn encrypt(&self, assertion_xml: &str, options: &EncryptionOptions) -> SamlResult<String> {
        if assertion_xml.trim().is_empty() {
            return Err(SamlError::EmptyDocument);
        }
        debug!(
            algorithm = options.content_algorithm.uri(),
            key_transport = options.key_transport.uri(),
            "Encrypting assertion"
        );
        let fragment = self
            .capability
            .encrypt(assertion_xml.to_string(), options)
            .await?;
        debug!("Assertion encrypted");
        Ok(wrap(&fragment))
    }
}

impl Default for EncryptionEngine {
    fn default() -> Self {
        Self::new(Arc::new(XmlEncryptor))
    }
}

impl fmt::Debug for EncryptionEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptionEngine").finish_non_exhaustive()
    }
}

fn wrap(fragment: &str) -> String {
    format!(r#"<saml:EncryptedAssertion xmlns:saml="{SAML_NS}">{fragment}</saml:EncryptedAssertion>"#)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CERT: &str = include_str!("../../tests/fixtures/sp-encryption.pem");
    const PUBLIC_KEY: &str = include_str!("../../tests/fixtures/sp-encryption.pub");

    struct Fixed;

    #[async_trait]
    impl EncryptionCapability for Fixed {
        async fn encrypt(&self, _xml: String, _options: &EncryptionOptions) -> SamlResult<String> {
            Ok(r#"<xenc:EncryptedData xmlns:xenc="urn:other"/>"#.to_string())
        }
    }

    struct Failing;

    #[async_trait]
    impl EncryptionCapability for Failing {
        async fn encrypt(&self, _xml: String, _options: &EncryptionOptions) -> SamlResult<String> {
            Err(SamlError::Encryption("recipient rejected".to_string()))
        }
    }

    #[test]
    fn key_defaults_to_certificate() -> anyhow::Result<()> {
        let from_cert = EncryptionOptions::from_pem(CERT, None)?;
        let explicit = EncryptionOptions::from_pem(CERT, Some(PUBLIC_KEY))?;
        assert_eq!(from_cert.recipient_key, explicit.recipient_key);
        assert_eq!(from_cert.content_algorithm, ContentEncryptionAlgorithm::Aes256Cbc);
        assert_eq!(from_cert.key_transport, KeyTransportAlgorithm::RsaOaepMgf1p);
        Ok(())
    }

    #[test]
    fn no_certificate_means_no_encryption() -> anyhow::Result<()> {
        assert!(EncryptionOptions::from_response_options(&ResponseOptions::default())?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn wrapper_declares_assertion_namespace() -> anyhow::Result<()> {
        let engine = EncryptionEngine::new(Arc::new(Fixed));
        let options = EncryptionOptions::from_pem(CERT, None)?;
        let wrapped = engine.encrypt("<a/>", &options).await?;
        assert_eq!(
            wrapped,
            r#"<saml:EncryptedAssertion xmlns:saml="urn:oasis:names:tc:SAML:2.0:assertion"><xenc:EncryptedData xmlns:xenc="urn:other"/></saml:EncryptedAssertion>"#
        );
        Ok(())
    }

    #[tokio::test]
    async fn capability_errors_are_propagated() -> anyhow::Result<()> {
        let engine = EncryptionEngine::new(Arc::new(Failing));
        let options = EncryptionOptions::from_pem(CERT, None)?;
        let result = engine.encrypt("<a/>", &options).await;
        assert!(matches!(result, Err(SamlError::Encryption(reason)) if reason == "recipient rejected"));
        Ok(())
    }
}
