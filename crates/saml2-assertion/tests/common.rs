//! Common test utilities and fixtures.

use saml2_assertion::xml::{parse, Element};
use saml2_assertion::{AssertionOptions, SamlIssuer};

/// Identity provider signing key (PKCS#8).
pub const IDP_KEY: &str = include_str!("fixtures/idp-signing.key");
/// Identity provider signing certificate.
pub const IDP_CERT: &str = include_str!("fixtures/idp-signing.pem");
/// Service provider decryption key.
pub const SP_KEY: &str = include_str!("fixtures/sp-encryption.key");
/// Service provider encryption certificate.
pub const SP_CERT: &str = include_str!("fixtures/sp-encryption.pem");
/// Service provider public key.
pub const SP_PUBLIC_KEY: &str = include_str!("fixtures/sp-encryption.pub");

/// Assertion options signed with the identity provider fixtures.
pub fn signing_options() -> AssertionOptions {
    AssertionOptions::new(IDP_KEY, IDP_CERT)
}

/// An issuer over the built-in templates.
pub fn issuer() -> anyhow::Result<SamlIssuer> {
    Ok(SamlIssuer::new()?)
}

/// Parses a document produced by the issuer.
pub fn document(xml: &str) -> anyhow::Result<Element> {
    Ok(parse(xml)?)
}

/// Returns every element with the given local name, in document order.
pub fn all<'a>(root: &'a Element, local_name: &str) -> Vec<&'a Element> {
    root.find_all_paths(|el| el.local_name() == local_name)
        .iter()
        .filter_map(|path| root.at_path(path))
        .collect()
}

/// Returns the qualified names of the children of the first element named
/// `local_name`.
pub fn child_names(root: &Element, local_name: &str) -> Vec<String> {
    root.find(local_name)
        .map(|el| el.elements().map(|child| child.name.clone()).collect())
        .unwrap_or_default()
}
