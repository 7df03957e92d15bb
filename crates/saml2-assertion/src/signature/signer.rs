//! XML Signature creation.
//!
//! Signs SAML documents with enveloped XML-DSig signatures.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::debug;

use saml2_crypto::digest;

use crate::error::{SamlError, SamlResult};
use crate::types::{transforms, XMLDSIG_NS};
use crate::xml::{self, canonicalize, qualified, Element, NamespaceScope};

use super::{SignatureOptions, SigningTarget};

/// Inserts enveloped signatures into documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignatureEngine;

impl SignatureEngine {
    /// Signs the first element named by `target` and returns the document.
    ///
    /// # Errors
    ///
    /// Returns [`SamlError::EmptyDocument`] for blank input,
    /// [`SamlError::XmlParse`] for malformed input, and
    /// [`SamlError::SignatureCreation`] or [`SamlError::InvalidOption`] if the
    /// target or the placement node cannot be found.
    pub fn sign(xml: &str, options: &SignatureOptions, target: SigningTarget) -> SamlResult<String> {
        if xml.trim().is_empty() {
            return Err(SamlError::EmptyDocument);
        }
        let mut document = xml::parse(xml)?;
        Self::sign_element(&mut document, options, target)?;
        Ok(document.to_xml())
    }

    /// Signs the first element named by `target` within `document` in
    /// place. Returns the reference URI.
    ///
    /// # Errors
    ///
    /// See [`SignatureEngine::sign`].
    pub fn sign_element(
        document: &mut Element,
        options: &SignatureOptions,
        target: SigningTarget,
    ) -> SamlResult<String> {
        let target_path = document
            .find_path(|el| el.local_name() == target.local_name())
            .ok_or_else(|| {
                SamlError::SignatureCreation(format!("document has no {target} element"))
            })?;
        let signed = document
            .at_path(&target_path)
            .ok_or_else(|| SamlError::SignatureCreation(format!("{target} element vanished")))?;
        let id = signed
            .attr("ID")
            .filter(|id| !id.is_empty())
            .ok_or_else(|| SamlError::SignatureCreation(format!("{target} element has no ID")))?;
        let reference_uri = format!("#{id}");

        let inherited = match target_path.split_last() {
            Some((_, parent)) => document.namespaces_at(parent),
            None => NamespaceScope::new(),
        };
        let canonical = canonicalize(signed, &inherited);
        let digest_value = STANDARD.encode(digest(options.digest_algorithm, canonical.as_bytes()));

        let location = options.location.select(document).ok_or_else(|| {
            SamlError::InvalidOption(format!("no element matches {}", options.location))
        })?;
        if location.is_empty() {
            return Err(SamlError::InvalidOption(
                "a signature cannot be placed after the document element".to_string(),
            ));
        }

        let signature = signature_template(
            options,
            &reference_uri,
            &digest_value,
            options.signer.certificate(),
        );
        let signature_path = document.insert_after(&location, signature)?;

        let scope = document.namespaces_at(&signature_path);
        let signature = document
            .at_path_mut(&signature_path)
            .ok_or_else(|| SamlError::SignatureCreation("signature element vanished".to_string()))?;
        let signed_info = signature
            .child("SignedInfo")
            .ok_or_else(|| SamlError::SignatureCreation("SignedInfo missing".to_string()))?;
        let signed_info = canonicalize(signed_info, &scope);
        let signature_value = options
            .signer
            .sign(options.signature_algorithm, signed_info.as_bytes())?;

        signature
            .find_mut("SignatureValue")
            .ok_or_else(|| SamlError::SignatureCreation("SignatureValue missing".to_string()))?
            .set_text(STANDARD.encode(signature_value));

        debug!(
            target = %target,
            reference = %reference_uri,
            algorithm = options.signature_algorithm.name(),
            "Signature placed"
        );
        Ok(reference_uri)
    }
}

/// Builds the `Signature` element with an empty `SignatureValue`.
fn signature_template(
    options: &SignatureOptions,
    reference_uri: &str,
    digest_value: &str,
    certificate: &str,
) -> Element {
    let prefix = options.prefix.as_deref();
    let name = |local: &str| qualified(prefix, local);
    let namespace = match prefix {
        Some(prefix) if !prefix.is_empty() => format!("xmlns:{prefix}"),
        _ => "xmlns".to_string(),
    };

    let reference = Element::new(name("Reference"))
        .with_attr("URI", reference_uri)
        .with_child(
            Element::new(name("Transforms"))
                .with_child(
                    Element::new(name("Transform"))
                        .with_attr("Algorithm", transforms::ENVELOPED_SIGNATURE),
                )
                .with_child(
                    Element::new(name("Transform"))
                        .with_attr("Algorithm", transforms::EXCLUSIVE_C14N),
                ),
        )
        .with_child(
            Element::new(name("DigestMethod"))
                .with_attr("Algorithm", options.digest_algorithm.uri()),
        )
        .with_child(Element::new(name("DigestValue")).with_text(digest_value));

    let signed_info = Element::new(name("SignedInfo"))
        .with_child(
            Element::new(name("CanonicalizationMethod"))
                .with_attr("Algorithm", transforms::EXCLUSIVE_C14N),
        )
        .with_child(
            Element::new(name("SignatureMethod"))
                .with_attr("Algorithm", options.signature_algorithm.uri()),
        )
        .with_child(reference);

    let key_info = Element::new(name("KeyInfo")).with_child(
        Element::new(name("X509Data"))
            .with_child(Element::new(name("X509Certificate")).with_text(certificate)),
    );

    Element::new(name("Signature"))
        .with_attr(namespace, XMLDSIG_NS)
        .with_child(signed_info)
        .with_child(Element::new(name("SignatureValue")))
        .with_child(key_info)
}
