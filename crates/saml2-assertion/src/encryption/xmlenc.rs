//! XML-Enc `EncryptedData` production.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use saml2_crypto::{encrypt_content, generate_content_key, wrap_key, DigestAlgorithm, KeyTransportAlgorithm};

use crate::error::SamlResult;
use crate::types::{xmlenc_types, XMLDSIG_NS, XMLENC_NS};
use crate::xml::Element;

use super::EncryptionOptions;

/// Encrypts `xml` under a fresh content key and returns the serialized
/// `xenc:EncryptedData` element, the content key transported in an
/// embedded `EncryptedKey`.
///
/// # Errors
///
/// Returns a crypto error if content encryption or key transport fails.
pub fn encrypt_fragment(xml: &str, options: &EncryptionOptions) -> SamlResult<String> {
    let content_key = generate_content_key(options.content_algorithm);
    let ciphertext = encrypt_content(options.content_algorithm, &content_key, xml.as_bytes())?;
    let wrapped_key = wrap_key(&options.recipient_key, options.key_transport, &content_key)?;

    let mut key_method = Element::new("e:EncryptionMethod")
        .with_attr("Algorithm", options.key_transport.uri());
    if options.key_transport == KeyTransportAlgorithm::RsaOaepMgf1p {
        key_method.push(Element::new("DigestMethod").with_attr("Algorithm", DigestAlgorithm::Sha1.uri()));
    }

    let encrypted_key = Element::new("e:EncryptedKey")
        .with_attr("xmlns:e", XMLENC_NS)
        .with_child(key_method)
        .with_child(
            Element::new("KeyInfo").with_child(
                Element::new("X509Data")
                    .with_child(Element::new("X509Certificate").with_text(&options.certificate)),
            ),
        )
        .with_child(
            Element::new("e:CipherData")
                .with_child(Element::new("e:CipherValue").with_text(STANDARD.encode(wrapped_key))),
        );

    let encrypted_data = Element::new("xenc:EncryptedData")
        .with_attr("xmlns:xenc", XMLENC_NS)
        .with_attr("Type", xmlenc_types::ELEMENT)
        .with_child(
            Element::new("xenc:EncryptionMethod")
                .with_attr("Algorithm", options.content_algorithm.uri()),
        )
        .with_child(
            Element::new("KeyInfo")
                .with_attr("xmlns", XMLDSIG_NS)
                .with_child(encrypted_key),
        )
        .with_child(
            Element::new("xenc:CipherData")
                .with_child(Element::new("xenc:CipherValue").with_text(STANDARD.encode(ciphertext))),
        );

    Ok(encrypted_data.to_xml())
}
