use std::fmt::{Display, Formatter};

use crate::CanonicalLabel;

/// The name of a distribution, exactly as it appears in the package metadata.
///
/// No normalization is applied: `Foo.Bar`, `foo-bar` and `foo_bar` are three distinct
/// distribution names that all map to the same [`CanonicalLabel`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DistributionName(String);

impl DistributionName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Derive the build-system identifier for this distribution.
    ///
    /// Every `-` and `.` is replaced with `_`, the result is lowercased and `prefix` is
    /// prepended. The prefix itself is used verbatim.
    pub fn sanitize(&self, prefix: &str) -> CanonicalLabel {
        let name = self.0.replace(['-', '.'], "_").to_lowercase();
        CanonicalLabel::new(format!("{prefix}{name}"))
    }
}

impl From<&str> for DistributionName {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for DistributionName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl AsRef<str> for DistributionName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for DistributionName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::DistributionName;

    #[test]
    fn sanitize() {
        let inputs = [
            "numpy",
            "Django",
            "zope.interface",
            "ruamel.yaml.clib",
            "typing-extensions",
            "Flask-SQLAlchemy",
        ];
        let outputs = [
            "pypi__numpy",
            "pypi__django",
            "pypi__zope_interface",
            "pypi__ruamel_yaml_clib",
            "pypi__typing_extensions",
            "pypi__flask_sqlalchemy",
        ];
        for (input, expected) in inputs.into_iter().zip(outputs) {
            assert_eq!(
                DistributionName::from(input).sanitize("pypi__").as_str(),
                expected,
                "{input}"
            );
        }
    }

    #[test]
    fn punctuation_and_case_collapse() {
        let expected = DistributionName::from("foo_bar").sanitize("pypi__");
        for name in ["Foo-Bar", "foo.bar", "FOO_BAR", "foo-bar"] {
            assert_eq!(DistributionName::from(name).sanitize("pypi__"), expected);
        }
    }

    #[test]
    fn prefix_is_verbatim() {
        let label = DistributionName::from("Six").sanitize("My.Repo-");
        assert_eq!(label.as_str(), "My.Repo-six");
    }

    #[test]
    fn empty_prefix() {
        let label = DistributionName::from("Six").sanitize("");
        assert_eq!(label.as_str(), "six");
    }

    #[test]
    fn deterministic() {
        let name = DistributionName::from("Typing.Extensions");
        assert_eq!(name.sanitize("pypi__"), name.sanitize("pypi__"));
    }
}
