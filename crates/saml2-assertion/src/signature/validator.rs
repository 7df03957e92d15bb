//! XML Signature validation.
//!
//! Verifies the enveloped signatures produced by [`super::SignatureEngine`]
//! and by interoperable peers using the same profile.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::debug;

use saml2_crypto::{
    certificate_der, digest, public_key_from_certificate, rsa_verify, DigestAlgorithm,
    RsaPublicKey, SignatureAlgorithm,
};

use crate::error::{SamlError, SamlResult};
use crate::types::{transforms, XMLDSIG_NS};
use crate::xml::{self, canonicalize, Element, NamespaceScope};

/// A reference whose digest and signature both verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedReference {
    /// Local name of the signed element.
    pub element: String,
    /// `ID` of the signed element.
    pub id: String,
    /// Signature algorithm.
    pub signature_algorithm: SignatureAlgorithm,
    /// Digest algorithm.
    pub digest_algorithm: DigestAlgorithm,
}

/// XML signature validator.
///
/// Validates signatures against configured trusted certificates, or against
/// the certificate embedded in each signature when none is configured.
#[derive(Debug, Clone, Default)]
pub struct XmlSignatureValidator {
    trusted_keys: Vec<RsaPublicKey>,
    allow_sha1: bool,
}

impl XmlSignatureValidator {
    /// Creates a validator that trusts the embedded certificates.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a validator from PEM-encoded certificates.
    ///
    /// # Errors
    ///
    /// Returns an error if a certificate cannot be parsed.
    pub fn from_pem(certificates_pem: &[&str]) -> SamlResult<Self> {
        let trusted_keys = certificates_pem
            .iter()
            .map(|pem| {
                let der = certificate_der(pem)?;
                public_key_from_certificate(&der)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            trusted_keys,
            allow_sha1: false,
        })
    }

    /// Allows SHA-1 based signatures and digests (not recommended).
    #[must_use]
    pub const fn allow_sha1(mut self, allow: bool) -> Self {
        self.allow_sha1 = allow;
        self
    }

    /// Validates every signature in the document.
    ///
    /// # Errors
    ///
    /// Returns [`SamlError::SignatureInvalid`] if the document carries no
    /// signature or any signature fails to verify.
    pub fn validate(&self, xml: &str) -> SamlResult<Vec<VerifiedReference>> {
        if xml.trim().is_empty() {
            return Err(SamlError::EmptyDocument);
        }
        let document = xml::parse(xml)?;
        let signatures = document.find_all_paths(|_| true);
        let signatures: Vec<Vec<usize>> = signatures
            .into_iter()
            .filter(|path| is_signature(&document, path))
            .collect();
        if signatures.is_empty() {
            return Err(SamlError::SignatureInvalid("document is not signed".to_string()));
        }

        signatures
            .iter()
            .map(|path| self.verify(&document, path))
            .collect()
    }

    fn verify(&self, document: &Element, signature_path: &[usize]) -> SamlResult<VerifiedReference> {
        let signature = document
            .at_path(signature_path)
            .ok_or_else(|| invalid("signature element vanished"))?;
        let signed_info = signature
            .child("SignedInfo")
            .ok_or_else(|| invalid("Signature has no SignedInfo"))?;

        let c14n = algorithm_of(signed_info, "CanonicalizationMethod")?;
        if c14n != transforms::EXCLUSIVE_C14N {
            return Err(invalid(&format!("unsupported canonicalization {c14n}")));
        }
        let signature_algorithm = SignatureAlgorithm::from_uri(algorithm_of(signed_info, "SignatureMethod")?)
            .ok_or_else(|| invalid("unsupported signature algorithm"))?;
        if signature_algorithm.is_deprecated() && !self.allow_sha1 {
            return Err(invalid("SHA-1 signatures are not allowed"));
        }

        let mut references = signed_info.elements().filter(|el| el.local_name() == "Reference");
        let reference = references
            .next()
            .ok_or_else(|| invalid("SignedInfo has no Reference"))?;
        if references.next().is_some() {
            return Err(invalid("SignedInfo has more than one Reference"));
        }

        let uri = reference.attr("URI").unwrap_or_default();
        let id = uri
            .strip_prefix('#')
            .filter(|id| !id.is_empty())
            .ok_or_else(|| invalid(&format!("unsupported reference URI {uri:?}")))?;

        let mut enveloped = false;
        if let Some(list) = reference.child("Transforms") {
            for transform in list.elements() {
                match transform.attr("Algorithm").unwrap_or_default() {
                    transforms::ENVELOPED_SIGNATURE => enveloped = true,
                    transforms::EXCLUSIVE_C14N => {}
                    other => return Err(invalid(&format!("unsupported transform {other}"))),
                }
            }
        }

        let digest_algorithm = DigestAlgorithm::from_uri(algorithm_of(reference, "DigestMethod")?)
            .ok_or_else(|| invalid("unsupported digest algorithm"))?;
        if digest_algorithm == DigestAlgorithm::Sha1 && !self.allow_sha1 {
            return Err(invalid("SHA-1 digests are not allowed"));
        }
        let expected_digest = decode(
            &reference
                .child("DigestValue")
                .ok_or_else(|| invalid("Reference has no DigestValue"))?
                .text(),
        )?;

        let mut targets = document.find_all_paths(|el| el.attr("ID") == Some(id));
        let target_path = match (targets.pop(), targets.is_empty()) {
            (Some(path), true) => path,
            (Some(_), false) => return Err(invalid(&format!("ID {id} is not unique"))),
            (None, _) => return Err(invalid(&format!("no element has ID {id}"))),
        };
        let mut target = document
            .at_path(&target_path)
            .cloned()
            .ok_or_else(|| invalid("referenced element vanished"))?;
        if enveloped {
            if let Some(relative) = signature_path.strip_prefix(target_path.as_slice()) {
                target.remove_at(relative);
            }
        }
        let inherited = match target_path.split_last() {
            Some((_, parent)) => document.namespaces_at(parent),
            None => NamespaceScope::new(),
        };
        let actual_digest = digest(digest_algorithm, canonicalize(&target, &inherited).as_bytes());
        if actual_digest != expected_digest {
            return Err(invalid(&format!("digest mismatch for #{id}")));
        }

        let signature_value = decode(
            &signature
                .child("SignatureValue")
                .ok_or_else(|| invalid("Signature has no SignatureValue"))?
                .text(),
        )?;
        let signed_info = canonicalize(signed_info, &document.namespaces_at(signature_path));
        let verified = if self.trusted_keys.is_empty() {
            let key = embedded_key(signature)?;
            rsa_verify(&key, signature_algorithm, signed_info.as_bytes(), &signature_value).is_ok()
        } else {
            self.trusted_keys.iter().any(|key| {
                rsa_verify(key, signature_algorithm, signed_info.as_bytes(), &signature_value).is_ok()
            })
        };
        if !verified {
            return Err(invalid(&format!("signature over #{id} does not verify")));
        }

        let element = target.local_name().to_string();
        debug!(element = %element, id = %id, "Signature verified");
        Ok(VerifiedReference {
            element,
            id: id.to_string(),
            signature_algorithm,
            digest_algorithm,
        })
    }
}

fn invalid(reason: &str) -> SamlError {
    SamlError::SignatureInvalid(reason.to_string())
}

fn is_signature(document: &Element, path: &[usize]) -> bool {
    document.at_path(path).is_some_and(|el| {
        el.local_name() == "Signature"
            && document
                .namespaces_at(path)
                .get(el.prefix().unwrap_or_default())
                .is_some_and(|ns| ns == XMLDSIG_NS)
    })
}

fn algorithm_of<'a>(parent: &'a Element, local_name: &str) -> SamlResult<&'a str> {
    parent
        .child(local_name)
        .and_then(|el| el.attr("Algorithm"))
        .ok_or_else(|| invalid(&format!("{local_name} has no Algorithm")))
}

fn decode(text: &str) -> SamlResult<Vec<u8>> {
    let compact: String = text.split_whitespace().collect();
    STANDARD
        .decode(compact)
        .map_err(|e| invalid(&format!("invalid base64 value: {e}")))
}

fn embedded_key(signature: &Element) -> SamlResult<RsaPublicKey> {
    let certificate = signature
        .child("KeyInfo")
        .and_then(|info| info.find("X509Certificate"))
        .ok_or_else(|| invalid("no trusted certificate and none embedded"))?;
    let der = decode(&certificate.text())?;
    Ok(public_key_from_certificate(&der)?)
}
