//! Issuance options.
//!
//! Options deserialize from snake_case keys and also accept the camelCase
//! spellings used by existing configurations (`lifetimeInSeconds`,
//! `createSignedSamlResponse`, ...).

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer};

use saml2_crypto::{
    ContentEncryptionAlgorithm, DigestAlgorithm, KeyTransportAlgorithm, SignatureAlgorithm,
};

use super::claims::ClaimSet;

/// One audience or several.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Audiences {
    /// A single audience URI.
    One(String),
    /// Several audience URIs, in order.
    Many(Vec<String>),
}

impl Audiences {
    /// Iterates over the audience URIs.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        let audiences: &[String] = match self {
            Self::One(audience) => std::slice::from_ref(audience),
            Self::Many(audiences) => audiences,
        };
        audiences.iter().map(String::as_str)
    }

    /// Returns true if there is no audience. A blank single audience
    /// counts as none.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::One(audience) => audience.trim().is_empty(),
            Self::Many(audiences) => audiences.is_empty(),
        }
    }
}

impl From<&str> for Audiences {
    fn from(audience: &str) -> Self {
        Self::One(audience.to_string())
    }
}

impl From<Vec<String>> for Audiences {
    fn from(audiences: Vec<String>) -> Self {
        Self::Many(audiences)
    }
}

/// Which documents carry a signature when a Response is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
pub enum ResponseSigningLevel {
    /// Only the Response is signed; the embedded assertion is not.
    #[default]
    ResponseOnly,
    /// The assertion is signed, embedded, then the Response is signed.
    AssertionAndResponse,
}

/// Accepts any value; anything but a string means "no prefix".
fn lenient_prefix<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Prefix {
        Text(String),
        Other(IgnoredAny),
    }

    Ok(match Prefix::deserialize(deserializer)? {
        Prefix::Text(prefix) => Some(prefix),
        Prefix::Other(_) => None,
    })
}

const fn default_true() -> bool {
    true
}

/// Options for building and signing an assertion.
#[derive(Debug, Clone, Deserialize)]
pub struct AssertionOptions {
    /// Issuer entity ID.
    #[serde(default)]
    pub issuer: Option<String>,

    /// `NameID` text content.
    #[serde(default, alias = "nameIdentifier")]
    pub name_identifier: Option<String>,

    /// `NameID` `Format` attribute.
    #[serde(default, alias = "nameIdentifierFormat")]
    pub name_identifier_format: Option<String>,

    /// `AuthnStatement` `SessionIndex`.
    #[serde(default, alias = "sessionIndex")]
    pub session_index: Option<String>,

    /// `AuthnContextClassRef` text; the template default is used if absent.
    #[serde(default, alias = "authnContextClassRef")]
    pub authn_context_class_ref: Option<String>,

    /// Validity window in seconds. Zero is treated as absent.
    #[serde(default, alias = "lifetimeInSeconds")]
    pub lifetime_in_seconds: Option<u64>,

    /// Audience restriction.
    #[serde(default)]
    pub audiences: Option<Audiences>,

    /// `SubjectConfirmationData` `Recipient`.
    #[serde(default)]
    pub recipient: Option<String>,

    /// `SubjectConfirmationData` `InResponseTo`.
    #[serde(default, alias = "inResponseTo")]
    pub in_response_to: Option<String>,

    /// Claims for the attribute statement. The statement exists only if
    /// this is present.
    #[serde(default)]
    pub attributes: Option<ClaimSet>,

    /// Write `NameFormat` on each `Attribute`.
    #[serde(default = "default_true", alias = "includeAttributeNameFormat")]
    pub include_attribute_name_format: bool,

    /// Derive `xsi:type` from each value's type instead of `xs:anyType`.
    #[serde(default = "default_true", alias = "typedAttributes")]
    pub typed_attributes: bool,

    /// Assertion identifier without the leading underscore.
    #[serde(default)]
    pub uid: Option<String>,

    /// Signature algorithm.
    #[serde(default, alias = "signatureAlgorithm")]
    pub signature_algorithm: SignatureAlgorithm,

    /// Reference digest algorithm.
    #[serde(default, alias = "digestAlgorithm")]
    pub digest_algorithm: DigestAlgorithm,

    /// Signing private key, PEM.
    #[serde(default)]
    pub key: Option<String>,

    /// Signing certificate, PEM.
    #[serde(default)]
    pub cert: Option<String>,

    /// Namespace prefix for the `Signature` element and its children.
    #[serde(
        default,
        alias = "signatureNamespacePrefix",
        deserialize_with = "lenient_prefix"
    )]
    pub signature_namespace_prefix: Option<String>,

    /// Legacy spelling of `signature_namespace_prefix`.
    #[serde(default, deserialize_with = "lenient_prefix")]
    pub prefix: Option<String>,

    /// Expression selecting the element the signature is placed after.
    #[serde(default, alias = "xpathToNodeBeforeSignature")]
    pub xpath_to_node_before_signature: Option<String>,
}

impl Default for AssertionOptions {
    fn default() -> Self {
        Self {
            issuer: None,
            name_identifier: None,
            name_identifier_format: None,
            session_index: None,
            authn_context_class_ref: None,
            lifetime_in_seconds: None,
            audiences: None,
            recipient: None,
            in_response_to: None,
            attributes: None,
            include_attribute_name_format: true,
            typed_attributes: true,
            uid: None,
            signature_algorithm: SignatureAlgorithm::default(),
            digest_algorithm: DigestAlgorithm::default(),
            key: None,
            cert: None,
            signature_namespace_prefix: None,
            prefix: None,
            xpath_to_node_before_signature: None,
        }
    }
}

impl AssertionOptions {
    /// Creates options with the signing key and certificate.
    #[must_use]
    pub fn new(key: impl Into<String>, cert: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            cert: Some(cert.into()),
            ..Self::default()
        }
    }

    /// Sets the issuer.
    #[must_use]
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    /// Sets the name identifier and its format.
    #[must_use]
    pub fn with_name_identifier(
        mut self,
        name_identifier: impl Into<String>,
        format: Option<String>,
    ) -> Self {
        self.name_identifier = Some(name_identifier.into());
        self.name_identifier_format = format;
        self
    }

    /// Sets the validity window.
    #[must_use]
    pub const fn with_lifetime(mut self, seconds: u64) -> Self {
        self.lifetime_in_seconds = Some(seconds);
        self
    }

    /// Sets the audiences.
    #[must_use]
    pub fn with_audiences(mut self, audiences: impl Into<Audiences>) -> Self {
        self.audiences = Some(audiences.into());
        self
    }

    /// Sets the claims.
    #[must_use]
    pub fn with_attributes(mut self, attributes: ClaimSet) -> Self {
        self.attributes = Some(attributes);
        self
    }

    /// Sets the assertion identifier.
    #[must_use]
    pub fn with_uid(mut self, uid: impl Into<String>) -> Self {
        self.uid = Some(uid.into());
        self
    }

    /// Sets the signature and digest algorithms.
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

    /// Sets the signature namespace prefix.
    #[must_use]
    pub fn with_signature_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.signature_namespace_prefix = Some(prefix.into());
        self
    }

    /// Sets the expression selecting the element the signature follows.
    #[must_use]
    pub fn with_signature_location(mut self, expression: impl Into<String>) -> Self {
        self.xpath_to_node_before_signature = Some(expression.into());
        self
    }

    /// Returns the effective signature prefix: the first non-empty of
    /// `signature_namespace_prefix` and the legacy `prefix`.
    #[must_use]
    pub fn effective_signature_prefix(&self) -> Option<&str> {
        self.signature_namespace_prefix
            .as_deref()
            .filter(|p| !p.is_empty())
            .or_else(|| self.prefix.as_deref().filter(|p| !p.is_empty()))
    }

    /// Returns the lifetime if it is set and non-zero.
    #[must_use]
    pub fn effective_lifetime(&self) -> Option<u64> {
        self.lifetime_in_seconds.filter(|&seconds| seconds > 0)
    }
}

/// Options for a full issuance: the assertion plus the optional Response
/// envelope and encryption.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponseOptions {
    /// Assertion options.
    #[serde(flatten)]
    pub assertion: AssertionOptions,

    /// Wrap the assertion in a signed Response.
    #[serde(default, alias = "createSignedSamlResponse")]
    pub create_signed_saml_response: bool,

    /// Response `Destination`; required in response mode.
    #[serde(default)]
    pub destination: Option<String>,

    /// Signing topology for the Response.
    #[serde(default, alias = "responseSigningLevel")]
    pub response_signing_level: ResponseSigningLevel,

    /// Response identifier without the leading underscore.
    #[serde(default, alias = "responseUid")]
    pub response_uid: Option<String>,

    /// Recipient public key, PEM. Taken from the certificate if absent.
    #[serde(default, alias = "encryptionPublicKey")]
    pub encryption_public_key: Option<String>,

    /// Recipient certificate, PEM. Encryption is enabled when present.
    #[serde(default, alias = "encryptionCert")]
    pub encryption_cert: Option<String>,

    /// Content encryption algorithm.
    #[serde(default, alias = "encryptionAlgorithm")]
    pub encryption_algorithm: ContentEncryptionAlgorithm,

    /// Key transport algorithm.
    #[serde(default, alias = "keyEncryptionAlgorithm")]
    pub key_encryption_algorithm: KeyTransportAlgorithm,
}

impl ResponseOptions {
    /// Wraps assertion options without a Response or encryption.
    #[must_use]
    pub fn new(assertion: AssertionOptions) -> Self {
        Self {
            assertion,
            ..Self::default()
        }
    }

    /// Requests a signed Response addressed to `destination`.
    #[must_use]
    pub fn with_response(
        mut self,
        destination: impl Into<String>,
        level: ResponseSigningLevel,
    ) -> Self {
        self.create_signed_saml_response = true;
        self.destination = Some(destination.into());
        self.response_signing_level = level;
        self
    }

    /// Requests encryption for the recipient certificate.
    #[must_use]
    pub fn with_encryption(mut self, cert: impl Into<String>, public_key: Option<String>) -> Self {
        self.encryption_cert = Some(cert.into());
        self.encryption_public_key = public_key;
        self
    }

    /// Returns true if encryption is requested.
    #[must_use]
    pub fn encrypts(&self) -> bool {
        self.encryption_cert.as_deref().is_some_and(|cert| !cert.is_empty())
    }
}
