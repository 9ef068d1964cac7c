//! Compatibility metadata declared by decorators.

use std::collections::BTreeSet;

use semver::Version;
use serde::{Deserialize, Serialize};

use crate::name::DecoratorName;

/// Requirements, conflicts, and supported ranges for a decorator.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Compatibility {
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    requires: BTreeSet<DecoratorName>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    conflicts: BTreeSet<DecoratorName>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    min_spec_version: Option<Version>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max_spec_version: Option<Version>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    supported_models: BTreeSet<String>,
}

impl Compatibility {
    /// Creates an unconstrained compatibility record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a decorator that must also be present.
    #[must_use]
    pub fn requiring(mut self, name: DecoratorName) -> Self {
        self.requires.insert(name);
        self
    }

    /// Declares a decorator that must not be present.
    #[must_use]
    pub fn conflicting_with(mut self, name: DecoratorName) -> Self {
        self.conflicts.insert(name);
        self
    }

    /// Restricts the supported specification versions (inclusive bounds).
    #[must_use]
    pub fn with_spec_range(mut self, min: Option<Version>, max: Option<Version>) -> Self {
        self.min_spec_version = min;
        self.max_spec_version = max;
        self
    }

    /// Restricts the decorator to the supplied model identifiers.
    #[must_use]
    pub fn with_supported_models<I, S>(mut self, models: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.supported_models = models.into_iter().map(Into::into).collect();
        self
    }

    /// Decorators that must accompany this one.
    #[must_use]
    pub fn requires(&self) -> &BTreeSet<DecoratorName> {
        &self.requires
    }

    /// Decorators this one cannot be combined with.
    #[must_use]
    pub fn conflicts(&self) -> &BTreeSet<DecoratorName> {
        &self.conflicts
    }

    /// Lowest supported specification version.
    #[must_use]
    pub fn min_spec_version(&self) -> Option<&Version> {
        self.min_spec_version.as_ref()
    }

    /// Highest supported specification version.
    #[must_use]
    pub fn max_spec_version(&self) -> Option<&Version> {
        self.max_spec_version.as_ref()
    }

    /// Models this decorator is known to work with; empty means any model.
    #[must_use]
    pub fn supported_models(&self) -> &BTreeSet<String> {
        &self.supported_models
    }

    /// Returns true when `name` is declared as a conflict.
    #[must_use]
    pub fn conflicts_with(&self, name: &str) -> bool {
        self.conflicts.contains(name)
    }

    /// Returns true when `version` lies inside the declared range.
    #[must_use]
    pub fn supports_spec_version(&self, version: &Version) -> bool {
        self.min_spec_version.as_ref().is_none_or(|min| version >= min)
            && self.max_spec_version.as_ref().is_none_or(|max| version <= max)
    }

    /// Returns true when `model` is listed, or no models are listed.
    #[must_use]
    pub fn supports_model(&self, model: &str) -> bool {
        self.supported_models.is_empty() || self.supported_models.contains(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_range_is_inclusive() {
        let compat = Compatibility::new().with_spec_range(
            Some(Version::new(1, 0, 0)),
            Some(Version::new(1, 2, 0)),
        );
        assert!(compat.supports_spec_version(&Version::new(1, 0, 0)));
        assert!(compat.supports_spec_version(&Version::new(1, 2, 0)));
        assert!(!compat.supports_spec_version(&Version::new(0, 9, 0)));
        assert!(!compat.supports_spec_version(&Version::new(2, 0, 0)));
    }

    #[test]
    fn empty_model_list_supports_everything() {
        assert!(Compatibility::new().supports_model("any-model"));
        let compat = Compatibility::new().with_supported_models(["gpt-4o"]);
        assert!(compat.supports_model("gpt-4o"));
        assert!(!compat.supports_model("llama3"));
    }

    #[test]
    fn deserializes_versions_and_names() {
        let compat: Compatibility = serde_json::from_str(
            r#"{"conflicts":["Detailed"],"minSpecVersion":"1.0.0","supportedModels":["gpt-4o"]}"#,
        )
        .unwrap();
        assert!(compat.conflicts_with("Detailed"));
        assert_eq!(compat.min_spec_version(), Some(&Version::new(1, 0, 0)));
        assert!(compat.max_spec_version().is_none());
    }
}
