//! Assertion and Response templates.
//!
//! The built-in templates are compiled into the crate and parsed once per
//! process. Builders receive a deep copy for every invocation; the shared
//! trees are never mutated.

use std::sync::{Arc, LazyLock};

use crate::error::{SamlError, SamlResult};
use crate::xml::{self, Element};

const ASSERTION_TEMPLATE: &str = include_str!("../templates/assertion.xml");
const RESPONSE_TEMPLATE: &str = include_str!("../templates/response.xml");

/// Elements every assertion template must contain.
const ASSERTION_ELEMENTS: [&str; 7] = [
    "Issuer",
    "Subject",
    "NameID",
    "SubjectConfirmationData",
    "Conditions",
    "AuthnStatement",
    "AuthnContextClassRef",
];

static BUILTIN: LazyLock<Result<Arc<Templates>, String>> = LazyLock::new(|| {
    Templates::parse(ASSERTION_TEMPLATE, RESPONSE_TEMPLATE)
        .map(Arc::new)
        .map_err(|e| e.to_string())
});

/// Parsed assertion and response templates.
#[derive(Debug, Clone)]
pub struct Templates {
    assertion: Element,
    response: Element,
}

impl Templates {
    /// Returns the built-in templates.
    ///
    /// # Errors
    ///
    /// Returns [`SamlError::Template`] if the built-in templates fail to parse.
    pub fn builtin() -> SamlResult<Arc<Self>> {
        (*BUILTIN).clone().map_err(SamlError::Template)
    }

    /// Parses a custom template pair.
    ///
    /// # Errors
    ///
    /// Returns [`SamlError::Template`] if either document is malformed or
    /// lacks an element the builders populate.
    pub fn parse(assertion_xml: &str, response_xml: &str) -> SamlResult<Self> {
        let mut assertion = xml::parse(assertion_xml)
            .map_err(|e| SamlError::Template(format!("assertion template: {e}")))?;
        let mut response = xml::parse(response_xml)
            .map_err(|e| SamlError::Template(format!("response template: {e}")))?;
        assertion.remove_whitespace();
        response.remove_whitespace();

        if assertion.local_name() != "Assertion" {
            return Err(SamlError::Template(format!(
                "assertion template root is {}",
                assertion.name
            )));
        }
        if let Some(missing) = ASSERTION_ELEMENTS
            .iter()
            .find(|name| assertion.find(name).is_none())
        {
            return Err(SamlError::Template(format!(
                "assertion template has no {missing} element"
            )));
        }

        if response.local_name() != "Response" {
            return Err(SamlError::Template(format!(
                "response template root is {}",
                response.name
            )));
        }
        if response.child("Issuer").is_none() {
            return Err(SamlError::Template(
                "response template has no Issuer element".to_string(),
            ));
        }

        Ok(Self {
            assertion,
            response,
        })
    }

    /// Returns a fresh copy of the assertion template.
    #[must_use]
    pub fn assertion(&self) -> Element {
        self.assertion.clone()
    }

    /// Returns a fresh copy of the response template.
    #[must_use]
    pub fn response(&self) -> Element {
        self.response.clone()
    }
}
