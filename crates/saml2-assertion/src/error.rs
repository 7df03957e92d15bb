//! SAML issuance error types.
//!
//! Errors fall into three groups:
//!
//! - input validation, raised synchronously before any XML is built
//! - parse failures of templates or assertion fragments
//! - failures of the signing and encryption capabilities, propagated unchanged

use saml2_crypto::CryptoError;
use thiserror::Error;

/// Result type for SAML operations.
pub type SamlResult<T> = Result<T, SamlError>;

/// SAML issuance errors.
#[derive(Debug, Error)]
pub enum SamlError {
    /// No signing key was supplied.
    #[error("Expect a private key in pem format")]
    MissingKey,

    /// No signing certificate was supplied.
    #[error("Expect a public key cert in pem format")]
    MissingCertificate,

    /// Response mode was requested without a destination.
    #[error("Expect a SAML Response destination for message to be valid.")]
    MissingDestination,

    /// An empty document was passed to the signer or response builder.
    #[error("XML to sign cannot be null or empty.")]
    EmptyDocument,

    /// An option holds a value that cannot be used.
    #[error("invalid option: {0}")]
    InvalidOption(String),

    /// XML parsing error.
    #[error("XML parsing error: {0}")]
    XmlParse(String),

    /// A template is malformed or does not have the expected shape.
    #[error("template error: {0}")]
    Template(String),

    /// XML signature creation failed.
    #[error("signature creation failed: {0}")]
    SignatureCreation(String),

    /// XML signature validation failed.
    #[error("signature validation failed: {0}")]
    SignatureInvalid(String),

    /// Assertion encryption failed.
    #[error("encryption failed: {0}")]
    Encryption(String),

    /// Assertion decryption failed.
    #[error("decryption failed: {0}")]
    Decryption(String),

    /// Cryptographic operation error.
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),
}

impl SamlError {
    /// Returns true for input validation errors, which are always raised
    /// before any signing or encryption work begins.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::MissingKey
                | Self::MissingCertificate
                | Self::MissingDestination
                | Self::EmptyDocument
                | Self::InvalidOption(_)
        )
    }
}

impl From<quick_xml::Error> for SamlError {
    fn from(err: quick_xml::Error) -> Self {
        Self::XmlParse(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for SamlError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Self::XmlParse(err.to_string())
    }
}

impl From<base64::DecodeError> for SamlError {
    fn from(err: base64::DecodeError) -> Self {
        Self::XmlParse(format!("invalid base64 content: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_are_classified() {
        assert!(SamlError::MissingKey.is_validation());
        assert!(SamlError::MissingDestination.is_validation());
        assert!(SamlError::EmptyDocument.is_validation());
        assert!(!SamlError::XmlParse("x".to_string()).is_validation());
        assert!(!SamlError::Encryption("x".to_string()).is_validation());
    }

    #[test]
    fn messages_name_the_missing_input() {
        assert_eq!(
            SamlError::MissingKey.to_string(),
            "Expect a private key in pem format"
        );
        assert_eq!(
            SamlError::MissingCertificate.to_string(),
            "Expect a public key cert in pem format"
        );
    }

    #[test]
    fn crypto_errors_convert() {
        let err: SamlError = CryptoError::Verification.into();
        assert!(matches!(err, SamlError::Crypto(CryptoError::Verification)));
    }
}
