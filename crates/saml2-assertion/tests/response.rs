//! Signed Response issuance.

use saml2_assertion::xml::Element;
use saml2_assertion::{
    ResponseOptions, ResponseSigningLevel, SamlError, SigningTarget, XmlSignatureValidator,
};

use crate::common::{all, document, issuer, signing_options, IDP_CERT};

const ACS: &str = "https://sp.example.com/acs";

fn response_options(level: ResponseSigningLevel) -> ResponseOptions {
    ResponseOptions::new(signing_options().with_issuer("urn:issuer").with_lifetime(600))
        .with_response(ACS, level)
}

#[tokio::test]
async fn response_only_signs_the_response() -> anyhow::Result<()> {
    let xml = issuer()?
        .create(&response_options(ResponseSigningLevel::ResponseOnly))?
        .await?;

    let verified = XmlSignatureValidator::from_pem(&[IDP_CERT])?.validate(&xml)?;
    assert_eq!(verified.len(), 1);
    assert_eq!(verified[0].element, SigningTarget::Response.to_string());

    let root = document(&xml)?;
    assert_eq!(root.local_name(), "Response");
    assert_eq!(root.attr("Destination"), Some(ACS));
    assert_eq!(all(&root, "Signature").len(), 1);
    let assertion = root.child("Assertion");
    assert!(assertion.is_some_and(|a| a.child("Signature").is_none()));
    Ok(())
}

#[tokio::test]
async fn assertion_and_response_signs_both() -> anyhow::Result<()> {
    let xml = issuer()?
        .create(&response_options(ResponseSigningLevel::AssertionAndResponse))?
        .await?;

    let verified = XmlSignatureValidator::new().validate(&xml)?;
    let mut signed: Vec<&str> = verified.iter().map(|v| v.element.as_str()).collect();
    signed.sort_unstable();
    assert_eq!(signed, ["Assertion", "Response"]);

    let root = document(&xml)?;
    assert!(root.child("Signature").is_some());
    assert!(root.child("Assertion").and_then(|a| a.child("Signature")).is_some());
    Ok(())
}

#[test]
fn reference_uris_match_ids() -> anyhow::Result<()> {
    let options = response_options(ResponseSigningLevel::AssertionAndResponse);
    let xml = issuer()?.create(&options)?.into_ready().unwrap_or_default();
    let root = document(&xml)?;

    let response_uri = root
        .child("Signature")
        .and_then(|s| s.find("Reference"))
        .and_then(|r| r.attr("URI"));
    assert_eq!(response_uri.and_then(|u| u.strip_prefix('#')), root.attr("ID"));

    let assertion = root.child("Assertion");
    let assertion_uri = assertion
        .and_then(|a| a.child("Signature"))
        .and_then(|s| s.find("Reference"))
        .and_then(|r| r.attr("URI"));
    assert_eq!(
        assertion_uri.and_then(|u| u.strip_prefix('#')),
        assertion.and_then(|a| a.attr("ID"))
    );
    assert_ne!(root.attr("ID"), assertion.and_then(|a| a.attr("ID")));
    Ok(())
}

#[test]
fn response_carries_the_assertion_issuer_and_instant() -> anyhow::Result<()> {
    let xml = issuer()?
        .create(&response_options(ResponseSigningLevel::ResponseOnly))?
        .into_ready()
        .unwrap_or_default();
    let root = document(&xml)?;
    assert_eq!(root.child("Issuer").map(Element::text).as_deref(), Some("urn:issuer"));
    assert_eq!(
        root.attr("IssueInstant"),
        root.child("Assertion").and_then(|a| a.attr("IssueInstant"))
    );
    assert_eq!(
        root.find("StatusCode").and_then(|s| s.attr("Value")),
        Some("urn:oasis:names:tc:SAML:2.0:status:Success")
    );
    Ok(())
}

#[test]
fn explicit_response_uid() -> anyhow::Result<()> {
    let options = ResponseOptions {
        response_uid: Some("response-1".to_string()),
        ..response_options(ResponseSigningLevel::ResponseOnly)
    };
    let xml = issuer()?.create(&options)?.into_ready().unwrap_or_default();
    assert_eq!(document(&xml)?.attr("ID"), Some("_response-1"));
    Ok(())
}

#[test]
fn missing_destination_fails_before_building() -> anyhow::Result<()> {
    let issuer = issuer()?;
    for destination in ["", "   "] {
        let options = ResponseOptions::new(signing_options())
            .with_response(destination, ResponseSigningLevel::ResponseOnly);
        let error = issuer.create(&options).map(|_| ()).err();
        assert!(matches!(error, Some(SamlError::MissingDestination)));
        assert_eq!(
            error.map(|e| e.to_string()).as_deref(),
            Some("Expect a SAML Response destination for message to be valid.")
        );
    }
    Ok(())
}

#[test]
fn tampered_response_fails_validation() -> anyhow::Result<()> {
    let xml = issuer()?
        .create(&response_options(ResponseSigningLevel::ResponseOnly))?
        .into_ready()
        .unwrap_or_default();
    let tampered = xml.replacen(ACS, "https://attacker.example.com/acs", 1);
    assert!(matches!(
        XmlSignatureValidator::new().validate(&tampered),
        Err(SamlError::SignatureInvalid(_))
    ));
    Ok(())
}
