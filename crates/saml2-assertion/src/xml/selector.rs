//! Element selection for signature placement.
//!
//! Supports the XPath shapes used to point at the node a signature follows:
//!
//! - `//*[local-name(.)='Issuer']` and `//*[local-name()='Issuer']`
//! - `//saml:Issuer` (qualified name, matched literally)
//! - `//Issuer` or `Issuer` (local name)

use std::fmt;
use std::str::FromStr;

use super::{is_name, Element};
use crate::error::{SamlError, SamlResult};

/// Selects the first element in document order matching a name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeSelector {
    /// Matches on local name, ignoring any prefix.
    LocalName(String),
    /// Matches the qualified name exactly.
    QualifiedName(String),
}

impl NodeSelector {
    /// Selector for the first element with the given local name.
    #[must_use]
    pub fn local_name(name: impl Into<String>) -> Self {
        Self::LocalName(name.into())
    }

    /// Parses a selector expression.
    ///
    /// # Errors
    ///
    /// Returns [`SamlError::InvalidOption`] for unsupported expressions.
    pub fn parse(expression: &str) -> SamlResult<Self> {
        let expr = expression.trim();
        let unsupported =
            || SamlError::InvalidOption(format!("unsupported node selector: {expression}"));

        let selector = if let Some(rest) = expr.strip_prefix("//*[") {
            let inner = rest.strip_suffix(']').ok_or_else(unsupported)?;
            let quoted = inner
                .strip_prefix("local-name(.)=")
                .or_else(|| inner.strip_prefix("local-name()="))
                .ok_or_else(unsupported)?;
            let name = unquote(quoted.trim()).ok_or_else(unsupported)?;
            Self::LocalName(name.to_string())
        } else {
            let name = expr.strip_prefix("//").unwrap_or(expr);
            if name.contains(':') {
                Self::QualifiedName(name.to_string())
            } else {
                Self::LocalName(name.to_string())
            }
        };

        if !is_name(selector.name()) {
            return Err(unsupported());
        }
        Ok(selector)
    }

    /// Returns the name this selector matches on.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::LocalName(name) | Self::QualifiedName(name) => name,
        }
    }

    /// Returns true if the element matches.
    #[must_use]
    pub fn matches(&self, element: &Element) -> bool {
        match self {
            Self::LocalName(name) => element.local_name() == name,
            Self::QualifiedName(name) => element.name == *name,
        }
    }

    /// Returns the path of the first matching element under `root`.
    #[must_use]
    pub fn select(&self, root: &Element) -> Option<Vec<usize>> {
        root.find_path(|el| self.matches(el))
    }
}

impl Default for NodeSelector {
    fn default() -> Self {
        Self::local_name("Issuer")
    }
}

impl FromStr for NodeSelector {
    type Err = SamlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for NodeSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LocalName(name) => write!(f, "//*[local-name(.)='{name}']"),
            Self::QualifiedName(name) => write!(f, "//{name}"),
        }
    }
}

fn unquote(value: &str) -> Option<&str> {
    value
        .strip_prefix('\'')
        .and_then(|v| v.strip_suffix('\''))
        .or_else(|| value.strip_prefix('"').and_then(|v| v.strip_suffix('"')))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parse;

    #[test]
    fn parses_local_name_predicates() -> anyhow::Result<()> {
        for expr in [
            "//*[local-name(.)='Conditions']",
            "//*[local-name()='Conditions']",
            r#"//*[local-name(.)="Conditions"]"#,
            "//Conditions",
            "Conditions",
        ] {
            assert_eq!(
                NodeSelector::parse(expr)?,
                NodeSelector::local_name("Conditions"),
                "{expr}"
            );
        }
        Ok(())
    }

    #[test]
    fn parses_qualified_names() -> anyhow::Result<()> {
        let selector = NodeSelector::parse("//saml:Subject")?;
        assert_eq!(selector, NodeSelector::QualifiedName("saml:Subject".to_string()));
        Ok(())
    }

    #[test]
    fn rejects_other_expressions() {
        for expr in ["", "//*", "//a/b", "//*[@ID='x']", "//*[local-name(.)=Issuer]"] {
            assert!(NodeSelector::parse(expr).is_err(), "{expr}");
        }
    }

    #[test]
    fn selects_first_match_in_document_order() -> anyhow::Result<()> {
        let root = parse(r#"<p:R xmlns:p="urn:p"><p:Issuer/><p:A><p:Issuer/></p:A></p:R>"#)?;
        assert_eq!(NodeSelector::default().select(&root), Some(vec![0]));
        assert_eq!(
            NodeSelector::parse("//p:A")?.select(&root),
            Some(vec![1])
        );
        assert_eq!(NodeSelector::parse("//q:A")?.select(&root), None);
        Ok(())
    }

    #[test]
    fn display_roundtrips() -> anyhow::Result<()> {
        let selector = NodeSelector::local_name("Issuer");
        assert_eq!(selector.to_string().parse::<NodeSelector>()?, selector);
        Ok(())
    }
}
