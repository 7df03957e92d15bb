//! The issuance pipeline.
//!
//! [`SamlIssuer::create`] validates its inputs synchronously, builds and
//! signs the assertion, and returns an [`Issuance`]. Paths without
//! encryption complete immediately; encrypting paths suspend once, on the
//! encryption step, and finish the Response inside the returned future.

use std::fmt;
use std::future::IntoFuture;
use std::sync::Arc;

use chrono::Utc;
use futures::future::{self, BoxFuture};
use tracing::{debug, info};

use saml2_crypto::generate_uid;

use crate::assertion::{AssertionBuilder, Context};
use crate::encryption::{EncryptionCapability, EncryptionEngine, EncryptionOptions};
use crate::error::{SamlError, SamlResult};
use crate::response::{ResponseBuilder, ResponseEnvelope, Topology};
use crate::signature::{SignatureEngine, SignatureOptions, SigningTarget};
use crate::template::Templates;
use crate::types::{ResponseOptions, UID_LENGTH};

/// Source of identifiers for `ID` attributes.
pub trait IdGenerator: Send + Sync {
    /// Returns a fresh identifier of `len` characters.
    fn generate(&self, len: usize) -> String;
}

/// Random alphanumeric identifiers.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIdGenerator;

impl IdGenerator for RandomIdGenerator {
    fn generate(&self, len: usize) -> String {
        generate_uid(len)
    }
}

/// The result of [`SamlIssuer::create`].
///
/// Await it to obtain the document on any path. A pending issuance running
/// the default [`XmlEncryptor`](crate::XmlEncryptor) must be awaited inside a
/// Tokio runtime, since encryption runs on the blocking thread pool.
pub enum Issuance {
    /// The document is complete.
    Ready(String),
    /// The document completes after encryption.
    Pending(BoxFuture<'static, SamlResult<String>>),
}

impl Issuance {
    /// Returns true if no asynchronous work remains.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    /// Returns the document if it is complete.
    #[must_use]
    pub fn into_ready(self) -> Option<String> {
        match self {
            Self::Ready(xml) => Some(xml),
            Self::Pending(_) => None,
        }
    }
}

impl IntoFuture for Issuance {
    type Output = SamlResult<String>;
    type IntoFuture = BoxFuture<'static, SamlResult<String>>;

    fn into_future(self) -> Self::IntoFuture {
        match self {
            Self::Ready(xml) => Box::pin(future::ready(Ok(xml))),
            Self::Pending(pending) => pending,
        }
    }
}

impl fmt::Debug for Issuance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready(xml) => f.debug_tuple("Ready").field(xml).finish(),
            Self::Pending(_) => f.write_str("Pending"),
        }
    }
}

/// Issues signed, optionally encrypted assertions and Responses.
///
/// Holds only read-only state and may be shared across tasks.
#[derive(Clone)]
pub struct SamlIssuer {
    templates: Arc<Templates>,
    ids: Arc<dyn IdGenerator>,
    encryption: EncryptionEngine,
}

impl SamlIssuer {
    /// Creates an issuer over the built-in templates.
    ///
    /// # Errors
    ///
    /// Returns [`SamlError::Template`] if the built-in templates fail to parse.
    pub fn new() -> SamlResult<Self> {
        Ok(Self::with_templates(Templates::builtin()?))
    }

    /// Creates an issuer over custom templates.
    #[must_use]
    pub fn with_templates(templates: Arc<Templates>) -> Self {
        Self {
            templates,
            ids: Arc::new(RandomIdGenerator),
            encryption: EncryptionEngine::default(),
        }
    }

    /// Replaces the identifier source.
    #[must_use]
    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    /// Replaces the encryption capability.
    #[must_use]
    pub fn with_encryption(mut self, capability: Arc<dyn EncryptionCapability>) -> Self {
        self.encryption = EncryptionEngine::new(capability);
        self
    }

    /// Issues a document.
    ///
    /// Missing key, certificate or destination are reported here, before
    /// any XML is built. Failures after the encryption step are delivered
    /// through the returned future only.
    ///
    /// When encryption is configured the returned [`Issuance`] is pending;
    /// with the default capability it must be awaited inside a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns validation errors, key parsing errors and failures of the
    /// synchronous build and signing steps.
    pub fn create(&self, options: &ResponseOptions) -> SamlResult<Issuance> {
        validate(options)?;
        let signing = SignatureOptions::from_assertion_options(&options.assertion)?;
        let encryption = EncryptionOptions::from_response_options(options)?;

        let topology = Topology::select(
            options.create_signed_saml_response,
            options.response_signing_level,
            encryption.is_some(),
        );
        debug!(?topology, "Issuance topology selected");

        let context = Context::at_now(self.uid(options.assertion.uid.as_deref()));
        let mut document = AssertionBuilder::new(&self.templates).build(&options.assertion, &context)?;
        if topology.signs_assertion() {
            document = SignatureEngine::sign(&document, &signing, SigningTarget::Assertion)?;
        }

        let envelope = topology.signs_response().then(|| ResponseEnvelope {
            uid: self.uid(options.response_uid.as_deref()),
            issue_instant: context.now,
            destination: options.destination.clone().unwrap_or_default(),
            issuer: options.assertion.issuer.clone(),
        });

        let issuance = match (topology, encryption, envelope) {
            (Topology::AssertionOnly { .. }, None, _) => Issuance::Ready(document),
            (Topology::AssertionOnly { .. }, Some(encryption), _) => {
                let engine = self.encryption.clone();
                Issuance::Pending(Box::pin(async move {
                    engine.encrypt(&document, &encryption).await
                }))
            }
            (_, None, Some(envelope)) => {
                Issuance::Ready(sign_response(&self.templates, &document, &envelope, &signing)?)
            }
            (_, Some(encryption), Some(envelope)) => {
                let engine = self.encryption.clone();
                let templates = Arc::clone(&self.templates);
                Issuance::Pending(Box::pin(async move {
                    let encrypted = engine.encrypt(&document, &encryption).await?;
                    sign_response(&templates, &encrypted, &envelope, &signing)
                }))
            }
            (_, _, None) => {
                return Err(SamlError::InvalidOption(format!(
                    "{topology:?} requires a Response envelope"
                )))
            }
        };

        info!(id = %context.id(), ready = issuance.is_ready(), "Assertion issued");
        Ok(issuance)
    }

    fn uid(&self, requested: Option<&str>) -> String {
        requested
            .filter(|uid| !uid.is_empty())
            .map_or_else(|| self.ids.generate(UID_LENGTH), str::to_string)
    }
}

impl fmt::Debug for SamlIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SamlIssuer")
            .field("templates", &self.templates)
            .finish_non_exhaustive()
    }
}

/// Presence checks, in the order key, certificate, destination.
fn validate(options: &ResponseOptions) -> SamlResult<()> {
    let blank = |value: Option<&str>| value.map_or(true, |v| v.trim().is_empty());
    if blank(options.assertion.key.as_deref()) {
        return Err(SamlError::MissingKey);
    }
    if blank(options.assertion.cert.as_deref()) {
        return Err(SamlError::MissingCertificate);
    }
    if options.create_signed_saml_response && blank(options.destination.as_deref()) {
        return Err(SamlError::MissingDestination);
    }
    Ok(())
}

fn sign_response(
    templates: &Templates,
    assertion: &str,
    envelope: &ResponseEnvelope,
    signing: &SignatureOptions,
) -> SamlResult<String> {
    let response = ResponseBuilder::new(templates).assemble(assertion, envelope)?;
    SignatureEngine::sign(&response, signing, SigningTarget::Response)
}
