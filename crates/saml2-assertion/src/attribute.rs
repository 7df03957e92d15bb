//! Claim to `saml:Attribute` encoding.

use crate::types::{Claim, ClaimValue, NameFormat, ValueType, SAML_NS};
use crate::xml::{is_name, qualified, Element};

/// Flags controlling attribute encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodingOptions {
    /// Write `NameFormat`.
    pub include_name_format: bool,
    /// Derive `xsi:type` from each value.
    pub typed: bool,
}

impl Default for EncodingOptions {
    fn default() -> Self {
        Self {
            include_name_format: true,
            typed: true,
        }
    }
}

/// One encoded attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeValue {
    /// `xsi:type`.
    pub value_type: ValueType,
    /// Text content.
    pub text: String,
}

/// A claim ready to be written as a `saml:Attribute`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeDescriptor {
    /// Attribute name.
    pub name: String,
    /// Name format, or `None` when it is not written.
    pub name_format: Option<NameFormat>,
    /// Defined values in original order. Never empty.
    pub values: Vec<AttributeValue>,
}

impl AttributeDescriptor {
    /// Builds the `Attribute` element using the given namespace prefix.
    #[must_use]
    pub fn to_element(&self, prefix: Option<&str>) -> Element {
        let mut attribute = Element::new(qualified(prefix, "Attribute")).with_attr("Name", &self.name);
        if let Some(format) = self.name_format {
            attribute.set_attr("NameFormat", format.uri());
        }
        for value in &self.values {
            attribute.push(
                Element::new(qualified(prefix, "AttributeValue"))
                    .with_attr("xsi:type", value.value_type.xsi_type())
                    .with_text(&value.text),
            );
        }
        attribute
    }
}

/// Maps claims to attribute descriptors.
#[derive(Debug, Clone, Copy, Default)]
pub struct AttributeEncoder;

impl AttributeEncoder {
    /// Classifies an attribute name: absolute URI, XML `Name`, or neither.
    #[must_use]
    pub fn name_format(name: &str) -> NameFormat {
        if is_uri(name) {
            NameFormat::Uri
        } else if is_name(name) {
            NameFormat::Basic
        } else {
            NameFormat::Unspecified
        }
    }

    /// Returns the `xsi:type` for a value.
    #[must_use]
    pub const fn value_type(value: &ClaimValue) -> ValueType {
        match value {
            ClaimValue::String(_) => ValueType::String,
            ClaimValue::Bool(_) => ValueType::Boolean,
            ClaimValue::Number(_) => ValueType::Double,
        }
    }

    /// Encodes a claim. Returns `None` when the claim has no defined value,
    /// in which case no `Attribute` element may be written.
    #[must_use]
    pub fn encode(name: &str, claim: &Claim, options: &EncodingOptions) -> Option<AttributeDescriptor> {
        let values: Vec<AttributeValue> = claim
            .values()
            .map(|value| AttributeValue {
                value_type: if options.typed {
                    Self::value_type(value)
                } else {
                    ValueType::AnyType
                },
                text: value.to_text(),
            })
            .collect();

        if values.is_empty() {
            return None;
        }

        Some(AttributeDescriptor {
            name: name.to_string(),
            name_format: options.include_name_format.then(|| Self::name_format(name)),
            values,
        })
    }

    /// Builds an `AttributeStatement` holding every claim that encodes.
    ///
    /// The statement declares the `xs` and `xsi` namespaces used by the
    /// `xsi:type` attributes of its values.
    #[must_use]
    pub fn statement<'a>(
        claims: impl IntoIterator<Item = (&'a str, &'a Claim)>,
        options: &EncodingOptions,
        prefix: Option<&str>,
    ) -> Element {
        let mut statement = Element::new(qualified(prefix, "AttributeStatement"))
            .with_attr("xmlns:xs", crate::types::XS_NS)
            .with_attr("xmlns:xsi", crate::types::XSI_NS);
        if prefix.is_none() {
            statement.set_attr("xmlns", SAML_NS);
        }
        for (name, claim) in claims {
            if let Some(descriptor) = Self::encode(name, claim, options) {
                statement.push(descriptor.to_element(prefix));
            }
        }
        statement
    }
}

/// An absolute URI made only of RFC 3986 characters.
///
/// `url` follows the WHATWG rules, which repair whitespace and stray
/// characters instead of rejecting them, so the raw text is checked first.
fn is_uri(name: &str) -> bool {
    let bytes = name.as_bytes();
    let mut index = 0;
    while let Some(&byte) = bytes.get(index) {
        if byte == b'%' {
            let escaped = bytes.get(index + 1..index + 3);
            if !escaped.is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit)) {
                return false;
            }
            index += 3;
            continue;
        }
        if !(byte.is_ascii_alphanumeric() || b"-._~:/?#[]@!$&'()*+,;=".contains(&byte)) {
            return false;
        }
        index += 1;
    }
    url::Url::parse(name).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ClaimSet;

    #[test]
    fn name_formats() {
        assert_eq!(
            AttributeEncoder::name_format("http://schemas.xmlsoap.org/claims/email"),
            NameFormat::Uri
        );
        assert_eq!(AttributeEncoder::name_format("urn:oid:2.5.4.42"), NameFormat::Uri);
        assert_eq!(AttributeEncoder::name_format("email"), NameFormat::Basic);
        assert_eq!(AttributeEncoder::name_format("given_name"), NameFormat::Basic);
        assert_eq!(AttributeEncoder::name_format("first name"), NameFormat::Unspecified);
        assert_eq!(AttributeEncoder::name_format("1st"), NameFormat::Unspecified);
    }

    #[test]
    fn uris_must_use_rfc3986_characters() {
        for name in [
            "http://example.com/first name",
            " http://x.com/",
            "http://x.com/\tpath",
            "urn:a b",
            "http://x.com/%zz",
            "http://x.com/%4",
            "http://x.com/ä",
        ] {
            assert_eq!(AttributeEncoder::name_format(name), NameFormat::Unspecified, "{name:?}");
        }
        assert_eq!(
            AttributeEncoder::name_format("http://x.com/first%20name?q=1#top"),
            NameFormat::Uri
        );
    }

    #[test]
    fn values_are_typed() {
        let claim = Claim::Multiple(vec![
            Some(ClaimValue::from("x")),
            Some(ClaimValue::from(true)),
            Some(ClaimValue::from(123)),
        ]);
        let encoded = AttributeEncoder::encode("n", &claim, &EncodingOptions::default());
        let types: Vec<ValueType> = encoded
            .iter()
            .flat_map(|d| d.values.iter().map(|v| v.value_type))
            .collect();
        assert_eq!(types, [ValueType::String, ValueType::Boolean, ValueType::Double]);
    }

    #[test]
    fn untyped_values_are_any_type() {
        let options = EncodingOptions {
            typed: false,
            ..EncodingOptions::default()
        };
        let encoded = AttributeEncoder::encode("n", &Claim::single(false), &options);
        assert_eq!(
            encoded.map(|d| d.values),
            Some(vec![AttributeValue {
                value_type: ValueType::AnyType,
                text: "false".to_string(),
            }])
        );
    }

    #[test]
    fn empty_claims_are_omitted() {
        let options = EncodingOptions::default();
        assert_eq!(AttributeEncoder::encode("a", &Claim::Multiple(vec![]), &options), None);
        assert_eq!(AttributeEncoder::encode("a", &Claim::Multiple(vec![None, None]), &options), None);
        assert_eq!(AttributeEncoder::encode("a", &Claim::undefined(), &options), None);
    }

    #[test]
    fn name_format_can_be_omitted() {
        let options = EncodingOptions {
            include_name_format: false,
            ..EncodingOptions::default()
        };
        let descriptor = AttributeEncoder::encode("email", &Claim::single("a@b.c"), &options);
        let element = descriptor.map(|d| d.to_element(Some("saml")));
        assert_eq!(element.as_ref().and_then(|e| e.attr("NameFormat")), None);
        assert_eq!(element.as_ref().and_then(|e| e.attr("Name")), Some("email"));
    }

    #[test]
    fn statement_keeps_declaration_order() {
        let claims = ClaimSet::new()
            .with("b", Claim::single("1"))
            .with("skip", Claim::Multiple(vec![]))
            .with("a", Claim::multiple(["2", "3"]));
        let statement = AttributeEncoder::statement(claims.iter(), &EncodingOptions::default(), Some("saml"));
        assert_eq!(
            statement.to_xml(),
            "<saml:AttributeStatement xmlns:xs=\"http://www.w3.org/2001/XMLSchema\" \
             xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\">\
             <saml:Attribute Name=\"b\" NameFormat=\"urn:oasis:names:tc:SAML:2.0:attrname-format:basic\">\
             <saml:AttributeValue xsi:type=\"xs:string\">1</saml:AttributeValue></saml:Attribute>\
             <saml:Attribute Name=\"a\" NameFormat=\"urn:oasis:names:tc:SAML:2.0:attrname-format:basic\">\
             <saml:AttributeValue xsi:type=\"xs:string\">2</saml:AttributeValue>\
             <saml:AttributeValue xsi:type=\"xs:string\">3</saml:AttributeValue></saml:Attribute>\
             </saml:AttributeStatement>"
        );
    }
}
