//! Assertion template population.

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use tracing::debug;

use crate::attribute::{AttributeEncoder, EncodingOptions};
use crate::error::{SamlError, SamlResult};
use crate::template::Templates;
use crate::types::AssertionOptions;
use crate::xml::{qualified, Element};

/// Formats an instant as `YYYY-MM-DDTHH:mm:ss.SSSZ`.
#[must_use]
pub fn format_instant(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Per-invocation inputs that are not options: the clock reading and the
/// identifier chosen for the assertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Context {
    /// The instant used for every timestamp in the document.
    pub now: DateTime<Utc>,
    /// Identifier without the leading underscore.
    pub uid: String,
}

impl Context {
    /// Creates a context.
    #[must_use]
    pub fn new(now: DateTime<Utc>, uid: impl Into<String>) -> Self {
        Self {
            now,
            uid: uid.into(),
        }
    }

    /// Creates a context at the current instant.
    #[must_use]
    pub fn at_now(uid: impl Into<String>) -> Self {
        Self::new(Utc::now(), uid)
    }

    /// Returns the `ID` attribute value.
    #[must_use]
    pub fn id(&self) -> String {
        format!("_{}", self.uid)
    }
}

/// Populates the assertion template.
#[derive(Debug, Clone, Copy)]
pub struct AssertionBuilder<'a> {
    templates: &'a Templates,
}

impl<'a> AssertionBuilder<'a> {
    /// Creates a builder over the given templates.
    #[must_use]
    pub const fn new(templates: &'a Templates) -> Self {
        Self { templates }
    }

    /// Builds the unsigned assertion and serializes it without insignificant
    /// whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`SamlError::InvalidOption`] if the lifetime overflows the
    /// calendar, or [`SamlError::Template`] if the template lacks an element
    /// the options require.
    pub fn build(&self, options: &AssertionOptions, context: &Context) -> SamlResult<String> {
        let assertion = self.build_element(options, context)?;
        debug!(id = %context.id(), "Assertion built");
        Ok(assertion.to_xml())
    }

    /// Builds the unsigned assertion tree.
    ///
    /// # Errors
    ///
    /// See [`AssertionBuilder::build`].
    pub fn build_element(&self, options: &AssertionOptions, context: &Context) -> SamlResult<Element> {
        let mut assertion = self.templates.assertion();
        let prefix = assertion.prefix().map(str::to_string);
        let prefix = prefix.as_deref();
        let now = format_instant(context.now);

        assertion.set_attr("ID", context.id());
        assertion.set_attr("IssueInstant", &now);

        if let Some(issuer) = &options.issuer {
            required(&mut assertion, "Issuer")?.set_text(issuer);
        }

        if let Some(seconds) = options.effective_lifetime() {
            let not_on_or_after = format_instant(expiry(context.now, seconds)?);
            let conditions = required(&mut assertion, "Conditions")?;
            conditions.set_attr("NotBefore", &now);
            conditions.set_attr("NotOnOrAfter", &not_on_or_after);
            required(&mut assertion, "SubjectConfirmationData")?
                .set_attr("NotOnOrAfter", &not_on_or_after);
        }

        if let Some(audiences) = options.audiences.as_ref().filter(|a| !a.is_empty()) {
            let mut restriction = Element::new(qualified(prefix, "AudienceRestriction"));
            for audience in audiences.iter() {
                restriction.push(Element::new(qualified(prefix, "Audience")).with_text(audience));
            }
            required(&mut assertion, "Conditions")?.push(restriction);
        }

        if let Some(recipient) = &options.recipient {
            required(&mut assertion, "SubjectConfirmationData")?.set_attr("Recipient", recipient);
        }
        if let Some(in_response_to) = &options.in_response_to {
            required(&mut assertion, "SubjectConfirmationData")?
                .set_attr("InResponseTo", in_response_to);
        }

        if let Some(claims) = &options.attributes {
            let encoding = EncodingOptions {
                include_name_format: options.include_attribute_name_format,
                typed: options.typed_attributes,
            };
            assertion.push(AttributeEncoder::statement(claims.iter(), &encoding, prefix));
        }

        let statement = required(&mut assertion, "AuthnStatement")?;
        statement.set_attr("AuthnInstant", &now);
        if let Some(session_index) = &options.session_index {
            statement.set_attr("SessionIndex", session_index);
        }

        if let Some(name_identifier) = &options.name_identifier {
            let name_id = required(&mut assertion, "NameID")?;
            name_id.set_text(name_identifier);
            if let Some(format) = &options.name_identifier_format {
                name_id.set_attr("Format", format);
            }
        } else if let Some(format) = &options.name_identifier_format {
            required(&mut assertion, "NameID")?.set_attr("Format", format);
        }

        if let Some(class_ref) = &options.authn_context_class_ref {
            required(&mut assertion, "AuthnContextClassRef")?.set_text(class_ref);
        }

        Ok(assertion)
    }
}

fn required<'e>(assertion: &'e mut Element, local_name: &str) -> SamlResult<&'e mut Element> {
    assertion
        .find_mut(local_name)
        .ok_or_else(|| SamlError::Template(format!("assertion template has no {local_name} element")))
}

fn expiry(now: DateTime<Utc>, seconds: u64) -> SamlResult<DateTime<Utc>> {
    i64::try_from(seconds)
        .ok()
        .and_then(Duration::try_seconds)
        .and_then(|lifetime| now.checked_add_signed(lifetime))
        .ok_or_else(|| SamlError::InvalidOption(format!("lifetime of {seconds}s is out of range")))
}
