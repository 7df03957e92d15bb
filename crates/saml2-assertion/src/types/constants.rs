//! SAML 2.0, XML-DSig and XML-Enc namespace URIs and identifiers.

/// SAML 2.0 assertion namespace URI.
pub const SAML_NS: &str = "urn:oasis:names:tc:SAML:2.0:assertion";

/// SAML 2.0 protocol namespace URI.
pub const SAMLP_NS: &str = "urn:oasis:names:tc:SAML:2.0:protocol";

/// XML Digital Signature namespace URI.
pub const XMLDSIG_NS: &str = "http://www.w3.org/2000/09/xmldsig#";

/// XML Encryption namespace URI.
pub const XMLENC_NS: &str = "http://www.w3.org/2001/04/xmlenc#";

/// XSI namespace URI.
pub const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// XS namespace URI.
pub const XS_NS: &str = "http://www.w3.org/2001/XMLSchema";

/// Bearer subject confirmation method.
pub const CM_BEARER: &str = "urn:oasis:names:tc:SAML:2.0:cm:bearer";

/// Authentication context class used when none is configured.
pub const AC_UNSPECIFIED: &str = "urn:oasis:names:tc:SAML:2.0:ac:classes:unspecified";

/// Success status code.
pub const STATUS_SUCCESS: &str = "urn:oasis:names:tc:SAML:2.0:status:Success";

/// Length of generated assertion and response identifiers.
pub const UID_LENGTH: usize = 32;

/// XML-DSig transform URIs.
pub mod transforms {
    /// Enveloped signature transform.
    pub const ENVELOPED_SIGNATURE: &str = "http://www.w3.org/2000/09/xmldsig#enveloped-signature";

    /// Exclusive XML canonicalization without comments.
    pub const EXCLUSIVE_C14N: &str = "http://www.w3.org/2001/10/xml-exc-c14n#";
}

/// XML-Enc type URIs.
pub mod xmlenc_types {
    /// `EncryptedData` carrying a whole element.
    pub const ELEMENT: &str = "http://www.w3.org/2001/04/xmlenc#Element";
}

// ============================================================================
// Attribute Name Formats
// ============================================================================

/// SAML attribute name formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NameFormat {
    /// The name is an absolute URI.
    Uri,
    /// The name is a simple XML `Name`.
    Basic,
    /// Anything else.
    #[default]
    Unspecified,
}

impl NameFormat {
    /// Returns the URI for this name format.
    #[must_use]
    pub const fn uri(&self) -> &'static str {
        match self {
            Self::Uri => "urn:oasis:names:tc:SAML:2.0:attrname-format:uri",
            Self::Basic => "urn:oasis:names:tc:SAML:2.0:attrname-format:basic",
            Self::Unspecified => "urn:oasis:names:tc:SAML:2.0:attrname-format:unspecified",
        }
    }

    /// Parses a name format from its URI.
    #[must_use]
    pub fn from_uri(uri: &str) -> Option<Self> {
        match uri {
            "urn:oasis:names:tc:SAML:2.0:attrname-format:uri" => Some(Self::Uri),
            "urn:oasis:names:tc:SAML:2.0:attrname-format:basic" => Some(Self::Basic),
            "urn:oasis:names:tc:SAML:2.0:attrname-format:unspecified" => Some(Self::Unspecified),
            _ => None,
        }
    }
}

// ============================================================================
// Attribute Value Types
// ============================================================================

/// `xsi:type` of an attribute value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ValueType {
    /// `xs:string`
    String,
    /// `xs:boolean`
    Boolean,
    /// `xs:double`
    Double,
    /// `xs:anyType`
    #[default]
    AnyType,
}

impl ValueType {
    /// Returns the `xsi:type` value.
    #[must_use]
    pub const fn xsi_type(&self) -> &'static str {
        match self {
            Self::String => "xs:string",
            Self::Boolean => "xs:boolean",
            Self::Double => "xs:double",
            Self::AnyType => "xs:anyType",
        }
    }
}
