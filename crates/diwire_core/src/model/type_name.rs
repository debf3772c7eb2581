//! Qualified type identity.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Identity of a named symbol, keyed by its package-qualified name.
///
/// Equality, hashing and ordering only look at the qualified name, so
/// `TypeName::new("a.b", "C")` and `TypeName::from_qualified("a.b.C")` are the
/// same value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeName {
    qualified_name: String,
}

impl TypeName {
    /// Builds a type name from a package and a simple name.
    ///
    /// An empty package yields the bare simple name.
    pub fn new(package: &str, simple_name: &str) -> Self {
        let package = package.trim();
        let simple_name = simple_name.trim();
        let qualified_name = if package.is_empty() {
            simple_name.to_string()
        } else {
            format!("{package}.{simple_name}")
        };
        Self { qualified_name }
    }

    pub fn from_qualified(qualified_name: impl Into<String>) -> Self {
        Self {
            qualified_name: qualified_name.into(),
        }
    }

    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    /// Everything before the last `.`, or `""` for unpackaged names.
    pub fn package(&self) -> &str {
        match self.qualified_name.rfind('.') {
            Some(index) => &self.qualified_name[..index],
            None => "",
        }
    }

    /// Everything after the last `.`.
    pub fn simple_name(&self) -> &str {
        match self.qualified_name.rfind('.') {
            Some(index) => &self.qualified_name[index + 1..],
            None => &self.qualified_name,
        }
    }
}

impl Display for TypeName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.qualified_name)
    }
}

impl From<&str> for TypeName {
    fn from(value: &str) -> Self {
        Self::from_qualified(value)
    }
}

impl From<String> for TypeName {
    fn from(value: String) -> Self {
        Self::from_qualified(value)
    }
}
