//! SAML 2.0 assertion and response issuance.
//!
//! This crate builds signed, optionally encrypted SAML 2.0 assertions from a
//! set of identity claims, and optionally wraps them in a signed Response:
//!
//! - **Attribute encoding** - claims become typed `saml:Attribute` elements
//! - **Assertion building** - issuer, subject, validity window, audiences and
//!   the authentication statement are written into a fixed template
//! - **XML signatures** - enveloped XML-DSig with exclusive canonicalization,
//!   placed after a configurable node
//! - **Encryption** - XML-Enc `EncryptedAssertion` with AES content keys
//!   transported under the recipient's RSA key
//! - **Responses** - the assertion is embedded in a `samlp:Response` that is
//!   signed once more
//!
//! A validator and a decrypter close the loop for relying-party tests and
//! the command line tool.
//!
//! # Architecture
//!
//! - [`types`] - Claims, options and SAML constants
//! - [`xml`] - Owned XML tree, node selection and canonicalization
//! - [`attribute`] - Claim to attribute encoding
//! - [`assertion`] - Assertion template population
//! - [`signature`] - Signing and signature validation
//! - [`encryption`] - Assertion encryption and decryption
//! - [`response`] - Response assembly and signing topologies
//! - [`issuer`] - The issuance pipeline
//! - [`error`] - Error types
//!
//! # Example
//!
//! ```rust,ignore
//! use saml2_assertion::{AssertionOptions, ResponseOptions, SamlIssuer};
//!
//! let options = ResponseOptions::new(
//!     AssertionOptions::new(key_pem, cert_pem).with_issuer("urn:issuer"),
//! );
//! let issuer = SamlIssuer::new()?;
//! let xml = issuer.create(&options)?.await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod assertion;
pub mod attribute;
pub mod encryption;
pub mod error;
pub mod issuer;
pub mod response;
pub mod signature;
pub mod template;
pub mod types;
pub mod xml;

pub use assertion::{AssertionBuilder, Context};
pub use attribute::{AttributeDescriptor, AttributeEncoder, AttributeValue, EncodingOptions};
pub use encryption::{
    AssertionDecrypter, EncryptionCapability, EncryptionEngine, EncryptionOptions, XmlEncryptor,
};
pub use error::{SamlError, SamlResult};
pub use issuer::{IdGenerator, Issuance, RandomIdGenerator, SamlIssuer};
pub use response::{ResponseBuilder, ResponseEnvelope, Topology};
pub use signature::{
    RsaSigningKey, SignatureEngine, SignatureOptions, SigningCapability, SigningTarget,
    VerifiedReference, XmlSignatureValidator,
};
pub use template::Templates;
pub use types::*;

pub use saml2_crypto::{
    ContentEncryptionAlgorithm, DigestAlgorithm, KeyTransportAlgorithm, SignatureAlgorithm,
};
