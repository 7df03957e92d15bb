//! Identity claims carried in the attribute statement.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};

/// A single claim value.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ClaimValue {
    /// Text.
    String(String),
    /// `true` or `false`.
    Bool(bool),
    /// A number, serialized as a double.
    Number(f64),
}

impl ClaimValue {
    /// Returns the text written into the `AttributeValue` element.
    #[must_use]
    pub fn to_text(&self) -> String {
        match self {
            Self::String(s) => s.clone(),
            Self::Bool(b) => b.to_string(),
            Self::Number(n) => format_number(*n),
        }
    }
}

impl fmt::Display for ClaimValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl From<&str> for ClaimValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for ClaimValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for ClaimValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for ClaimValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for ClaimValue {
    #[allow(clippy::cast_precision_loss)]
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<i32> for ClaimValue {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

/// Formats a number the way a decimal literal reads: integral values
/// without a fraction, non-finite values by name.
fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let name = if n > 0.0 { "Infinity" } else { "-Infinity" };
        name.to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else if n.fract() == 0.0 {
        format!("{n:.0}")
    } else {
        n.to_string()
    }
}

/// A claim: one value or an ordered sequence of values.
///
/// `None` entries stand for undefined values and are never serialized.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Claim {
    /// A sequence of values.
    Multiple(Vec<Option<ClaimValue>>),
    /// A single, possibly undefined, value.
    Single(Option<ClaimValue>),
}

impl Claim {
    /// A claim with one value.
    #[must_use]
    pub fn single(value: impl Into<ClaimValue>) -> Self {
        Self::Single(Some(value.into()))
    }

    /// A claim with several values.
    #[must_use]
    pub fn multiple<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<ClaimValue>,
    {
        Self::Multiple(values.into_iter().map(|v| Some(v.into())).collect())
    }

    /// A claim whose value is undefined.
    #[must_use]
    pub const fn undefined() -> Self {
        Self::Single(None)
    }

    /// Iterates over the defined values, in order.
    pub fn values(&self) -> impl Iterator<Item = &ClaimValue> {
        let values: &[Option<ClaimValue>] = match self {
            Self::Multiple(values) => values,
            Self::Single(value) => std::slice::from_ref(value),
        };
        values.iter().flatten()
    }

    /// Returns true if the claim has no defined value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values().next().is_none()
    }
}

impl From<ClaimValue> for Claim {
    fn from(value: ClaimValue) -> Self {
        Self::Single(Some(value))
    }
}

/// Claims keyed by attribute name, in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClaimSet {
    entries: Vec<(String, Claim)>,
}

impl ClaimSet {
    /// Creates an empty claim set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a claim. Replacing an existing name keeps its position.
    pub fn insert(&mut self, name: impl Into<String>, claim: impl Into<Claim>) {
        let name = name.into();
        let claim = claim.into();
        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some(slot) => slot.1 = claim,
            None => self.entries.push((name, claim)),
        }
    }

    /// Builder form of [`ClaimSet::insert`].
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, claim: impl Into<Claim>) -> Self {
        self.insert(name, claim);
        self
    }

    /// Returns a claim by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Claim> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, claim)| claim)
    }

    /// Iterates over the claims in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Claim)> {
        self.entries.iter().map(|(name, claim)| (name.as_str(), claim))
    }

    /// Returns the number of claims.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no claims.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<N: Into<String>> FromIterator<(N, Claim)> for ClaimSet {
    fn from_iter<T: IntoIterator<Item = (N, Claim)>>(iter: T) -> Self {
        let mut set = Self::new();
        for (name, claim) in iter {
            set.insert(name, claim);
        }
        set
    }
}

impl<'de> Deserialize<'de> for ClaimSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ClaimSetVisitor;

        impl<'de> Visitor<'de> for ClaimSetVisitor {
            type Value = ClaimSet;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of claim names to values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<ClaimSet, A::Error> {
                let mut set = ClaimSet::new();
                while let Some((name, claim)) = map.next_entry::<String, Claim>()? {
                    set.insert(name, claim);
                }
                Ok(set)
            }
        }

        deserializer.deserialize_map(ClaimSetVisitor)
    }
}
