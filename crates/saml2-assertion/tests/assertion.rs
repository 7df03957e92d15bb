//! Signed assertion issuance.

use chrono::DateTime;

use saml2_assertion::xml::Element;
use saml2_assertion::{
    AssertionOptions, Claim, ClaimSet, ClaimValue, NameFormat, ResponseOptions, SamlError,
    XmlSignatureValidator,
};

use crate::common::{all, child_names, document, issuer, signing_options, IDP_CERT};

const EMAIL: &str = "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/emailaddress";
const NAME: &str = "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/name";
const ACCENT: &str = "http://example.org/claims/testaccent";

fn create(options: AssertionOptions) -> anyhow::Result<String> {
    let issuance = issuer()?.create(&ResponseOptions::new(options))?;
    assert!(issuance.is_ready());
    Ok(issuance.into_ready().unwrap_or_default())
}

fn standard_claims() -> ClaimSet {
    ClaimSet::new()
        .with(EMAIL, Claim::single("foo@bar.com"))
        .with(NAME, Claim::single("Foo Bar"))
        .with("http://example.org/claims/testemptyarray", Claim::Multiple(vec![]))
        .with(ACCENT, Claim::single("fóo"))
        .with("http://undefinedattribute/ws/com.com", Claim::undefined())
}

fn attribute_summary(root: &Element) -> Vec<(String, String)> {
    all(root, "Attribute")
        .into_iter()
        .map(|attribute| {
            let values: Vec<String> = attribute.elements().map(Element::text).collect();
            (attribute.attr("Name").unwrap_or_default().to_string(), values.join(","))
        })
        .collect()
}

#[tokio::test]
async fn whole_assertion_with_default_class_ref() -> anyhow::Result<()> {
    let options = signing_options()
        .with_issuer("urn:issuer")
        .with_lifetime(600)
        .with_audiences("urn:myapp")
        .with_attributes(
            ClaimSet::new()
                .with(EMAIL, Claim::single("foo@bar.com"))
                .with(NAME, Claim::single("Foo Bar")),
        )
        .with_name_identifier(
            "foo",
            Some("urn:oasis:names:tc:SAML:1.1:nameid-format:unspecified".to_string()),
        );
    let xml = issuer()?.create(&ResponseOptions::new(options))?.await?;

    let verified = XmlSignatureValidator::from_pem(&[IDP_CERT])?.validate(&xml)?;
    assert_eq!(verified.len(), 1);

    let root = document(&xml)?;
    let name_id = root.find("NameID");
    assert_eq!(name_id.map(Element::text).as_deref(), Some("foo"));
    assert_eq!(
        name_id.and_then(|n| n.attr("Format")),
        Some("urn:oasis:names:tc:SAML:1.1:nameid-format:unspecified")
    );
    assert_eq!(
        attribute_summary(&root),
        [
            (EMAIL.to_string(), "foo@bar.com".to_string()),
            (NAME.to_string(), "Foo Bar".to_string()),
        ]
    );
    assert_eq!(root.find("Issuer").map(Element::text).as_deref(), Some("urn:issuer"));
    assert_eq!(
        root.find("Audience").map(Element::text).as_deref(),
        Some("urn:myapp")
    );
    assert_eq!(
        root.find("AuthnContextClassRef").map(Element::text).as_deref(),
        Some("urn:oasis:names:tc:SAML:2.0:ac:classes:unspecified")
    );
    Ok(())
}

#[test]
fn lifetime_window_is_exact() -> anyhow::Result<()> {
    let xml = create(signing_options().with_lifetime(600))?;
    let root = document(&xml)?;
    let conditions = root.find("Conditions");
    let not_before = conditions.and_then(|c| c.attr("NotBefore")).unwrap_or_default();
    let not_on_or_after = conditions.and_then(|c| c.attr("NotOnOrAfter")).unwrap_or_default();
    let window = DateTime::parse_from_rfc3339(not_on_or_after)?
        - DateTime::parse_from_rfc3339(not_before)?;
    assert_eq!(window.num_milliseconds(), 600_000);
    Ok(())
}

#[test]
fn reference_uri_matches_assertion_id() -> anyhow::Result<()> {
    for _ in 0..3 {
        let xml = create(signing_options())?;
        let root = document(&xml)?;
        let id = root.attr("ID").unwrap_or_default();
        assert!(id.starts_with('_'));
        assert_eq!(id.len(), 33);
        let uri = root.find("Reference").and_then(|r| r.attr("URI"));
        assert_eq!(uri.and_then(|u| u.strip_prefix('#')), Some(id));
    }
    Ok(())
}

#[test]
fn empty_and_undefined_claims_are_omitted() -> anyhow::Result<()> {
    let xml = create(signing_options().with_attributes(standard_claims()))?;
    XmlSignatureValidator::new().validate(&xml)?;

    let root = document(&xml)?;
    assert_eq!(
        attribute_summary(&root),
        [
            (EMAIL.to_string(), "foo@bar.com".to_string()),
            (NAME.to_string(), "Foo Bar".to_string()),
            (ACCENT.to_string(), "fóo".to_string()),
        ]
    );
    let statement = root.find("AttributeStatement");
    assert_eq!(statement.map(|s| s.name.as_str()), Some("saml:AttributeStatement"));
    Ok(())
}

#[test]
fn sequences_keep_only_defined_values_in_order() -> anyhow::Result<()> {
    let claims = ClaimSet::new().with(
        "groups",
        Claim::Multiple(vec![
            Some(ClaimValue::from("admins")),
            None,
            Some(ClaimValue::from("users")),
        ]),
    );
    let root = document(&create(signing_options().with_attributes(claims))?)?;
    assert_eq!(
        attribute_summary(&root),
        [("groups".to_string(), "admins,users".to_string())]
    );
    Ok(())
}

#[test]
fn values_are_typed() -> anyhow::Result<()> {
    let claims = standard_claims()
        .with("http://attributes/boolean", Claim::single(true))
        .with("http://attributes/booleanNegative", Claim::single(false))
        .with("http://attributes/number", Claim::single(123));
    let root = document(&create(signing_options().with_attributes(claims))?)?;

    let typed: Vec<(String, String)> = all(&root, "AttributeValue")
        .into_iter()
        .map(|value| (value.attr("xsi:type").unwrap_or_default().to_string(), value.text()))
        .collect();
    let expected = [
        ("xs:string", "foo@bar.com"),
        ("xs:string", "Foo Bar"),
        ("xs:string", "fóo"),
        ("xs:boolean", "true"),
        ("xs:boolean", "false"),
        ("xs:double", "123"),
    ]
    .map(|(xsi_type, text)| (xsi_type.to_string(), text.to_string()));
    assert_eq!(typed, expected);
    Ok(())
}

#[test]
fn name_formats_follow_attribute_names() -> anyhow::Result<()> {
    let claims = ClaimSet::new()
        .with(EMAIL, Claim::single("foo@bar.com"))
        .with("testaccent", Claim::single("fóo"))
        .with("invalid name", Claim::single("x"))
        .with("http://example.com/first name", Claim::single("y"));
    let root = document(&create(signing_options().with_attributes(claims))?)?;

    let formats: Vec<Option<NameFormat>> = all(&root, "Attribute")
        .into_iter()
        .map(|a| a.attr("NameFormat").and_then(NameFormat::from_uri))
        .collect();
    assert_eq!(
        formats,
        [
            Some(NameFormat::Uri),
            Some(NameFormat::Basic),
            Some(NameFormat::Unspecified),
            Some(NameFormat::Unspecified),
        ]
    );
    Ok(())
}

#[test]
fn untyped_attributes_are_any_type() -> anyhow::Result<()> {
    let claims = standard_claims().with("http://attributes/number", Claim::single(123));
    let options = AssertionOptions {
        typed_attributes: false,
        ..signing_options().with_attributes(claims)
    };
    let root = document(&create(options)?)?;
    let values = all(&root, "AttributeValue");
    assert_eq!(values.len(), 4);
    assert!(values.iter().all(|v| v.attr("xsi:type") == Some("xs:anyType")));
    Ok(())
}

#[test]
fn name_format_can_be_left_out() -> anyhow::Result<()> {
    let options = AssertionOptions {
        include_attribute_name_format: false,
        ..signing_options().with_attributes(standard_claims())
    };
    let root = document(&create(options)?)?;
    let attributes = all(&root, "Attribute");
    assert_eq!(attributes.len(), 3);
    assert!(attributes.iter().all(|a| a.attr("NameFormat").is_none()));
    Ok(())
}

#[test]
fn empty_sequence_produces_no_attribute() -> anyhow::Result<()> {
    let claims = ClaimSet::new().with("a", Claim::Multiple(vec![]));
    let root = document(&create(signing_options().with_attributes(claims))?)?;
    assert!(all(&root, "Attribute").is_empty());
    assert_eq!(all(&root, "AttributeStatement").len(), 1);
    Ok(())
}

#[test]
fn specific_class_ref() -> anyhow::Result<()> {
    let options = AssertionOptions {
        authn_context_class_ref: Some("specific".to_string()),
        ..signing_options()
    };
    let root = document(&create(options)?)?;
    assert_eq!(
        root.find("AuthnContextClassRef").map(Element::text).as_deref(),
        Some("specific")
    );
    Ok(())
}

#[test]
fn signature_placed_where_specified() -> anyhow::Result<()> {
    let options = signing_options()
        .with_signature_location("//*[local-name(.)='Conditions']")
        .with_attributes(standard_claims());
    let xml = create(options)?;
    XmlSignatureValidator::new().validate(&xml)?;

    let root = document(&xml)?;
    let names: Vec<&str> = root.elements().map(|el| el.name.as_str()).collect();
    let position = names.iter().position(|name| *name == "Signature");
    assert_eq!(position.and_then(|i| names.get(i - 1)), Some(&"saml:Conditions"));
    Ok(())
}

#[test]
fn signature_prefix_where_specified() -> anyhow::Result<()> {
    let current = signing_options().with_signature_prefix("anyprefix");
    let legacy = AssertionOptions {
        prefix: Some("anyprefix".to_string()),
        ..signing_options()
    };
    for options in [current, legacy] {
        let options = options
            .with_signature_location("//*[local-name(.)='Conditions']")
            .with_attributes(standard_claims());
        let xml = create(options)?;
        XmlSignatureValidator::new().validate(&xml)?;

        let root = document(&xml)?;
        let names: Vec<&str> = root.elements().map(|el| el.name.as_str()).collect();
        let position = names.iter().position(|name| *name == "anyprefix:Signature");
        assert_eq!(position.and_then(|i| names.get(i - 1)), Some(&"saml:Conditions"));
        assert_eq!(
            child_names(&root, "KeyInfo"),
            ["anyprefix:X509Data".to_string()]
        );
    }
    Ok(())
}

#[test]
fn non_string_prefix_is_ignored() -> anyhow::Result<()> {
    let mut options: AssertionOptions = serde_json::from_value(serde_json::json!({
        "signatureNamespacePrefix": 123,
        "xpathToNodeBeforeSignature": "//*[local-name(.)='Conditions']"
    }))?;
    options.key = Some(crate::common::IDP_KEY.to_string());
    options.cert = Some(IDP_CERT.to_string());

    let xml = create(options)?;
    XmlSignatureValidator::new().validate(&xml)?;
    let root = document(&xml)?;
    assert!(root.child("Signature").is_some_and(|s| s.name == "Signature"));
    assert_eq!(child_names(&root, "KeyInfo"), ["X509Data".to_string()]);
    Ok(())
}

#[test]
fn no_audience_restriction_without_audiences() -> anyhow::Result<()> {
    let root = document(&create(signing_options().with_attributes(standard_claims()))?)?;
    assert!(all(&root, "AudienceRestriction").is_empty());
    Ok(())
}

#[test]
fn no_attribute_statement_without_attributes() -> anyhow::Result<()> {
    let root = document(&create(signing_options())?)?;
    assert!(all(&root, "AttributeStatement").is_empty());
    Ok(())
}

#[test]
fn tampering_breaks_the_signature() -> anyhow::Result<()> {
    let xml = create(signing_options().with_issuer("urn:issuer").with_attributes(standard_claims()))?;
    XmlSignatureValidator::new().validate(&xml)?;

    for (from, to) in [("foo@bar.com", "foo@bar.co"), ("urn:issuer", "urn:isuer"), ("Foo Bar", "Foo Baz")] {
        let tampered = xml.replacen(from, to, 1);
        assert_ne!(tampered, xml);
        assert!(
            matches!(
                XmlSignatureValidator::new().validate(&tampered),
                Err(SamlError::SignatureInvalid(_))
            ),
            "{from} -> {to}"
        );
    }
    Ok(())
}

#[test]
fn line_breaks_and_tabs_survive_parser_normalization() -> anyhow::Result<()> {
    let address = "1 Main St\r\nSpringfield";
    let recipient = "https://sp.example.com/\tacs\n";
    let options = AssertionOptions {
        recipient: Some(recipient.to_string()),
        ..signing_options()
            .with_attributes(ClaimSet::new().with("address", Claim::single(address)))
    };
    let xml = create(options)?;
    assert!(!xml.contains('\r'));
    assert!(!xml.contains('\t'));

    // End-of-line and attribute-value normalization of a conforming parser.
    let normalized = xml.replace("\r\n", "\n").replace('\r', "\n").replace('\t', " ");
    let verified = XmlSignatureValidator::from_pem(&[IDP_CERT])?.validate(&normalized)?;
    assert_eq!(verified.len(), 1);

    let root = document(&normalized)?;
    assert_eq!(root.find("AttributeValue").map(Element::text).as_deref(), Some(address));
    assert_eq!(
        root.find("SubjectConfirmationData").and_then(|c| c.attr("Recipient")),
        Some(recipient)
    );
    Ok(())
}

#[test]
fn missing_key_material_is_reported_synchronously()-> anyhow::Result<()> {
    let issuer = issuer()?;
    let no_key = ResponseOptions::new(AssertionOptions {
        cert: Some(IDP_CERT.to_string()),
        ..AssertionOptions::default()
    });
    let error = issuer.create(&no_key).map(|_| ()).err();
    assert_eq!(
        error.map(|e| e.to_string()).as_deref(),
        Some("Expect a private key in pem format")
    );

    let no_cert = ResponseOptions::new(AssertionOptions {
        key: Some(crate::common::IDP_KEY.to_string()),
        ..AssertionOptions::default()
    });
    let error = issuer.create(&no_cert).map(|_| ()).err();
    assert!(matches!(error, Some(SamlError::MissingCertificate)));
    Ok(())
}
