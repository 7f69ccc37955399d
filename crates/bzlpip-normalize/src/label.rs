use std::fmt::{Display, Formatter};

/// A sanitized, prefixed identifier derived from a distribution name (e.g., `pypi__six`).
///
/// Used both as the directory name of a standalone package and as the name of its
/// library target.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CanonicalLabel(String);

impl CanonicalLabel {
    pub(crate) fn new(label: String) -> Self {
        Self(label)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for CanonicalLabel {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for CanonicalLabel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A quoted build-system reference, ready to be spliced into a Starlark list.
///
/// For example, `"//pypi__six"` or `"@pypi__six//:pkg"`, including the double quotes.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Label(String);

impl Label {
    /// Quote an unquoted target address.
    pub fn quoted(address: &str) -> Self {
        Self(format!("\"{address}\""))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Label {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for Label {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// The address of an extracted package, relative to the repository root (e.g., `//pypi__six`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageAddress(String);

impl PackageAddress {
    /// The address of the package rooted at `directory`.
    pub fn from_directory(directory: &str) -> Self {
        Self(format!("//{directory}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for PackageAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
