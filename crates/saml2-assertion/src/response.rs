//! Response assembly and signing topologies.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::assertion::format_instant;
use crate::error::{SamlError, SamlResult};
use crate::template::Templates;
use crate::types::ResponseSigningLevel;
use crate::xml;

/// Which documents are signed, and whether the assertion is encrypted
/// before it leaves the pipeline or is embedded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topology {
    /// The assertion alone, always signed, optionally encrypted afterwards.
    AssertionOnly {
        /// Encrypt the signed assertion.
        encrypt: bool,
    },
    /// An unsigned assertion embedded in a signed Response.
    ResponseWithPlainAssertion,
    /// A signed assertion embedded in a signed Response.
    ResponseWithSignedAssertion,
    /// An encrypted assertion embedded in a signed Response. The Response
    /// signature covers the ciphertext.
    ResponseWithEncryptedAssertion {
        /// Sign the assertion before encrypting it.
        assertion_signed: bool,
    },
}

impl Topology {
    /// Selects the topology.
    #[must_use]
    pub const fn select(create_response: bool, level: ResponseSigningLevel, encrypt: bool) -> Self {
        let assertion_signed = matches!(level, ResponseSigningLevel::AssertionAndResponse);
        match (create_response, encrypt) {
            (false, encrypt) => Self::AssertionOnly { encrypt },
            (true, true) => Self::ResponseWithEncryptedAssertion { assertion_signed },
            (true, false) if assertion_signed => Self::ResponseWithSignedAssertion,
            (true, false) => Self::ResponseWithPlainAssertion,
        }
    }

    /// Returns true if the assertion carries its own signature.
    #[must_use]
    pub const fn signs_assertion(&self) -> bool {
        match self {
            Self::AssertionOnly { .. } | Self::ResponseWithSignedAssertion => true,
            Self::ResponseWithPlainAssertion => false,
            Self::ResponseWithEncryptedAssertion { assertion_signed } => *assertion_signed,
        }
    }

    /// Returns true if a Response is produced and signed.
    #[must_use]
    pub const fn signs_response(&self) -> bool {
        !matches!(self, Self::AssertionOnly { .. })
    }

    /// Returns true if the assertion is encrypted.
    #[must_use]
    pub const fn encrypts(&self) -> bool {
        matches!(
            self,
            Self::AssertionOnly { encrypt: true } | Self::ResponseWithEncryptedAssertion { .. }
        )
    }
}

/// Values written into the Response template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseEnvelope {
    /// Identifier without the leading underscore.
    pub uid: String,
    /// `IssueInstant`.
    pub issue_instant: DateTime<Utc>,
    /// `Destination`.
    pub destination: String,
    /// `Issuer` text.
    pub issuer: Option<String>,
}

impl ResponseEnvelope {
    /// Returns the `ID` attribute value.
    #[must_use]
    pub fn id(&self) -> String {
        format!("_{}", self.uid)
    }
}

/// Embeds assertions in the Response template.
#[derive(Debug, Clone, Copy)]
pub struct ResponseBuilder<'a> {
    templates: &'a Templates,
}

impl<'a> ResponseBuilder<'a> {
    /// Creates a builder over the given templates.
    #[must_use]
    pub const fn new(templates: &'a Templates) -> Self {
        Self { templates }
    }

    /// Populates the Response template and appends `assertion_xml` (a plain,
    /// signed or encrypted assertion) as its last child.
    ///
    /// # Errors
    ///
    /// Returns [`SamlError::MissingDestination`] for a blank destination,
    /// [`SamlError::EmptyDocument`] for a blank assertion, and
    /// [`SamlError::XmlParse`] if the assertion is malformed.
    pub fn assemble(&self, assertion_xml: &str, envelope: &ResponseEnvelope) -> SamlResult<String> {
        if envelope.destination.trim().is_empty() {
            return Err(SamlError::MissingDestination);
        }
        if assertion_xml.trim().is_empty() {
            return Err(SamlError::EmptyDocument);
        }
        let assertion = xml::parse(assertion_xml)?;

        let mut response = self.templates.response();
        response.set_attr("ID", envelope.id());
        response.set_attr("IssueInstant", format_instant(envelope.issue_instant));
        response.set_attr("Destination", &envelope.destination);
        if let Some(issuer) = &envelope.issuer {
            response
                .find_mut("Issuer")
                .ok_or_else(|| SamlError::Template("response template has no Issuer element".to_string()))?
                .set_text(issuer);
        }
        response.push(assertion);

        debug!(id = %envelope.id(), destination = %envelope.destination, "Response assembled");
        Ok(response.to_xml())
    }
}
