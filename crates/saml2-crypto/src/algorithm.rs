//! Algorithm identifiers.
//!
//! Each algorithm carries the URI it is announced with inside XML-DSig and
//! XML-Enc documents. Signature and digest algorithms deserialize from their
//! short names (`rsa-sha256`, `sha1`); encryption algorithms from their URIs.

use serde::{Deserialize, Serialize};

/// Digest algorithms for XML-DSig references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DigestAlgorithm {
    /// SHA-1 (legacy interoperability only).
    #[serde(rename = "sha1")]
    Sha1,

    /// SHA-256.
    #[default]
    #[serde(rename = "sha256")]
    Sha256,
}

impl DigestAlgorithm {
    /// Returns the XML-DSig `DigestMethod` URI.
    #[must_use]
    pub const fn uri(self) -> &'static str {
        match self {
            Self::Sha1 => "http://www.w3.org/2000/09/xmldsig#sha1",
            Self::Sha256 => "http://www.w3.org/2001/04/xmlenc#sha256",
        }
    }

    /// Parses a digest algorithm from its URI.
    #[must_use]
    pub fn from_uri(uri: &str) -> Option<Self> {
        match uri {
            "http://www.w3.org/2000/09/xmldsig#sha1" => Some(Self::Sha1),
            "http://www.w3.org/2001/04/xmlenc#sha256" => Some(Self::Sha256),
            _ => None,
        }
    }

    /// Returns the output length in bytes.
    #[must_use]
    pub const fn output_len(self) -> usize {
        match self {
            Self::Sha1 => 20,
            Self::Sha256 => 32,
        }
    }

    /// Returns the short name used in configuration.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Sha1 => "sha1",
            Self::Sha256 => "sha256",
        }
    }
}

/// RSA signature algorithms for XML-DSig.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SignatureAlgorithm {
    /// RSA PKCS#1 v1.5 with SHA-1 (legacy interoperability only).
    #[serde(rename = "rsa-sha1")]
    RsaSha1,

    /// RSA PKCS#1 v1.5 with SHA-256.
    #[default]
    #[serde(rename = "rsa-sha256")]
    RsaSha256,
}

impl SignatureAlgorithm {
    /// Returns the XML-DSig `SignatureMethod` URI.
    #[must_use]
    pub const fn uri(self) -> &'static str {
        match self {
            Self::RsaSha1 => "http://www.w3.org/2000/09/xmldsig#rsa-sha1",
            Self::RsaSha256 => "http://www.w3.org/2001/04/xmldsig-more#rsa-sha256",
        }
    }

    /// Parses a signature algorithm from its URI.
    #[must_use]
    pub fn from_uri(uri: &str) -> Option<Self> {
        match uri {
            "http://www.w3.org/2000/09/xmldsig#rsa-sha1" => Some(Self::RsaSha1),
            "http://www.w3.org/2001/04/xmldsig-more#rsa-sha256" => Some(Self::RsaSha256),
            _ => None,
        }
    }

    /// Returns the short name used in configuration.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::RsaSha1 => "rsa-sha1",
            Self::RsaSha256 => "rsa-sha256",
        }
    }

    /// Returns true if this algorithm relies on SHA-1.
    #[must_use]
    pub const fn is_deprecated(self) -> bool {
        matches!(self, Self::RsaSha1)
    }
}

/// XML-Enc block ciphers used for the `EncryptedData` content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ContentEncryptionAlgorithm {
    /// AES-128 in CBC mode.
    #[serde(rename = "http://www.w3.org/2001/04/xmlenc#aes128-cbc")]
    Aes128Cbc,

    /// AES-256 in CBC mode.
    #[default]
    #[serde(rename = "http://www.w3.org/2001/04/xmlenc#aes256-cbc")]
    Aes256Cbc,

    /// AES-128 in GCM mode (XML-Enc 1.1).
    #[serde(rename = "http://www.w3.org/2009/xmlenc11#aes128-gcm")]
    Aes128Gcm,

    /// AES-256 in GCM mode (XML-Enc 1.1).
    #[serde(rename = "http://www.w3.org/2009/xmlenc11#aes256-gcm")]
    Aes256Gcm,
}

impl ContentEncryptionAlgorithm {
    /// Returns the XML-Enc `EncryptionMethod` URI.
    #[must_use]
    pub const fn uri(self) -> &'static str {
        match self {
            Self::Aes128Cbc => "http://www.w3.org/2001/04/xmlenc#aes128-cbc",
            Self::Aes256Cbc => "http://www.w3.org/2001/04/xmlenc#aes256-cbc",
            Self::Aes128Gcm => "http://www.w3.org/2009/xmlenc11#aes128-gcm",
            Self::Aes256Gcm => "http://www.w3.org/2009/xmlenc11#aes256-gcm",
        }
    }

    /// Parses a content encryption algorithm from its URI.
    #[must_use]
    pub fn from_uri(uri: &str) -> Option<Self> {
        match uri {
            "http://www.w3.org/2001/04/xmlenc#aes128-cbc" => Some(Self::Aes128Cbc),
            "http://www.w3.org/2001/04/xmlenc#aes256-cbc" => Some(Self::Aes256Cbc),
            "http://www.w3.org/2009/xmlenc11#aes128-gcm" => Some(Self::Aes128Gcm),
            "http://www.w3.org/2009/xmlenc11#aes256-gcm" => Some(Self::Aes256Gcm),
            _ => None,
        }
    }

    /// Returns the symmetric key length in bytes.
    #[must_use]
    pub const fn key_len(self) -> usize {
        match self {
            Self::Aes128Cbc | Self::Aes128Gcm => 16,
            Self::Aes256Cbc | Self::Aes256Gcm => 32,
        }
    }

    /// Returns true for authenticated (GCM) modes.
    #[must_use]
    pub const fn is_gcm(self) -> bool {
        matches!(self, Self::Aes128Gcm | Self::Aes256Gcm)
    }
}

/// XML-Enc key transport algorithms for the `EncryptedKey`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum KeyTransportAlgorithm {
    /// RSA-OAEP with MGF1 and SHA-1.
    #[default]
    #[serde(rename = "http://www.w3.org/2001/04/xmlenc#rsa-oaep-mgf1p")]
    RsaOaepMgf1p,

    /// RSA PKCS#1 v1.5.
    #[serde(rename = "http://www.w3.org/2001/04/xmlenc#rsa-1_5")]
    Rsa15,
}

impl KeyTransportAlgorithm {
    /// Returns the XML-Enc `EncryptionMethod` URI.
    #[must_use]
    pub const fn uri(self) -> &'static str {
        match self {
            Self::RsaOaepMgf1p => "http://www.w3.org/2001/04/xmlenc#rsa-oaep-mgf1p",
            Self::Rsa15 => "http://www.w3.org/2001/04/xmlenc#rsa-1_5",
        }
    }

    /// Parses a key transport algorithm from its URI.
    #[must_use]
    pub fn from_uri(uri: &str) -> Option<Self> {
        match uri {
            "http://www.w3.org/2001/04/xmlenc#rsa-oaep-mgf1p" => Some(Self::RsaOaepMgf1p),
            "http://www.w3.org/2001/04/xmlenc#rsa-1_5" => Some(Self::Rsa15),
            _ => None,
        }
    }
}
