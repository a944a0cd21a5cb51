//! Webhook subscribers.

use serde::de::{self, Deserializer, SeqAccess, Visitor};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Which signal types a subscriber wants.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TypeFilter {
    /// Every signal type
    #[default]
    All,
    /// Only the listed types (never empty)
    Only(BTreeSet<String>),
}

impl TypeFilter {
    /// Build a filter from a list; an empty list means every type.
    pub fn from_types<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set: BTreeSet<String> = types.into_iter().map(Into::into).collect();
        if set.is_empty() || set.contains("all") {
            TypeFilter::All
        } else {
            TypeFilter::Only(set)
        }
    }

    pub fn accepts(&self, signal_type: &str) -> bool {
        match self {
            TypeFilter::All => true,
            TypeFilter::Only(types) => types.contains(signal_type),
        }
    }
}

impl Serialize for TypeFilter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            TypeFilter::All => serializer.serialize_str("all"),
            TypeFilter::Only(types) => types.serialize(serializer),
        }
    }
}

/// Accepts `"all"`, `null`, or an array of type names.
impl<'de> Deserialize<'de> for TypeFilter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TypeFilterVisitor;

        impl<'de> Visitor<'de> for TypeFilterVisitor {
            type Value = TypeFilter;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("\"all\" or an array of signal types")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                if v.eq_ignore_ascii_case("all") {
                    Ok(TypeFilter::All)
                } else {
                    Err(E::invalid_value(de::Unexpected::Str(v), &self))
                }
            }

            fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(TypeFilter::All)
            }

            fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(TypeFilter::All)
            }

            fn visit_some<D2: Deserializer<'de>>(self, d: D2) -> Result<Self::Value, D2::Error> {
                d.deserialize_any(self)
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                let mut types = Vec::new();
                while let Some(t) = seq.next_element::<String>()? {
                    types.push(t);
                }
                Ok(TypeFilter::from_types(types))
            }
        }

        deserializer.deserialize_any(TypeFilterVisitor)
    }
}

/// A registered webhook endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscriber {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
    #[serde(default)]
    pub types: TypeFilter,
    #[serde(default)]
    pub active: bool,
}

impl Subscriber {
    /// Create an active subscriber for every signal type.
    pub fn new(url: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            secret: Some(secret.into()),
            types: TypeFilter::All,
            active: true,
        }
    }

    pub fn with_types(mut self, types: TypeFilter) -> Self {
        self.types = types;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    /// Delivery URL, if one is set and non-blank.
    pub fn endpoint(&self) -> Option<&str> {
        self.url.as_deref().filter(|u| !u.trim().is_empty())
    }

    /// Whether this subscriber should receive a signal of the given type.
    pub fn wants(&self, signal_type: &str) -> bool {
        self.active && self.endpoint().is_some() && self.types.accepts(signal_type)
    }
}
