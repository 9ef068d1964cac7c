//! Strongly typed engine configuration.

use std::fmt;
use std::str::FromStr;

use semver::Version;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Marker that introduces a directive line.
pub const DEFAULT_MARKER: &str = "+++";

/// Specification version assumed when none is configured.
pub const DEFAULT_SPEC_VERSION: Version = Version::new(1, 0, 0);

const DEFAULT_FRAGMENT_SEPARATOR: &str = "\n";
const DEFAULT_SECTION_SEPARATOR: &str = "\n\n";

/// Result alias for configuration validation.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised when a configuration is inconsistent.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A field holds an unusable value.
    #[error("invalid engine configuration: {0}")]
    Invalid(&'static str),
    /// A compatibility policy string was not recognised.
    #[error("unknown compatibility policy `{0}` (expected `advisory` or `strict`)")]
    UnknownPolicy(String),
}

/// Whether compatibility diagnostics abort a transformation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompatibilityPolicy {
    /// Diagnostics are reported alongside the result.
    #[default]
    Advisory,
    /// Any warning-level diagnostic fails the transformation.
    Strict,
}

impl fmt::Display for CompatibilityPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Advisory => f.write_str("advisory"),
            Self::Strict => f.write_str("strict"),
        }
    }
}

impl FromStr for CompatibilityPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> ConfigResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "advisory" => Ok(Self::Advisory),
            "strict" => Ok(Self::Strict),
            _ => Err(ConfigError::UnknownPolicy(s.to_owned())),
        }
    }
}

/// Settings consumed by the transformation engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    marker: String,
    spec_version: Version,
    compatibility: CompatibilityPolicy,
    fragment_separator: String,
    section_separator: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            marker: DEFAULT_MARKER.to_owned(),
            spec_version: DEFAULT_SPEC_VERSION,
            compatibility: CompatibilityPolicy::Advisory,
            fragment_separator: DEFAULT_FRAGMENT_SEPARATOR.to_owned(),
            section_separator: DEFAULT_SECTION_SEPARATOR.to_owned(),
        }
    }
}

impl EngineConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the directive marker.
    #[must_use]
    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = marker.into();
        self
    }

    /// Sets the active specification version.
    #[must_use]
    pub fn with_spec_version(mut self, version: Version) -> Self {
        self.spec_version = version;
        self
    }

    /// Sets the compatibility policy.
    #[must_use]
    pub fn with_compatibility(mut self, policy: CompatibilityPolicy) -> Self {
        self.compatibility = policy;
        self
    }

    /// Sets the separator placed between fragments of one section.
    #[must_use]
    pub fn with_fragment_separator(mut self, separator: impl Into<String>) -> Self {
        self.fragment_separator = separator.into();
        self
    }

    /// Sets the separator placed between sections and the payload.
    #[must_use]
    pub fn with_section_separator(mut self, separator: impl Into<String>) -> Self {
        self.section_separator = separator.into();
        self
    }

    /// Directive marker, `+++` by default.
    #[must_use]
    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Specification version checked against decorator ranges.
    #[must_use]
    pub fn spec_version(&self) -> &Version {
        &self.spec_version
    }

    /// Compatibility policy.
    #[must_use]
    pub const fn compatibility(&self) -> CompatibilityPolicy {
        self.compatibility
    }

    /// Separator between fragments of one section.
    #[must_use]
    pub fn fragment_separator(&self) -> &str {
        &self.fragment_separator
    }

    /// Separator between sections and the payload.
    #[must_use]
    pub fn section_separator(&self) -> &str {
        &self.section_separator
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the marker is empty, contains
    /// whitespace or identifier characters, or a separator is empty.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.marker.is_empty() {
            return Err(ConfigError::Invalid("marker cannot be empty"));
        }
        if self.marker.chars().any(char::is_whitespace) {
            return Err(ConfigError::Invalid("marker cannot contain whitespace"));
        }
        if self
            .marker
            .chars()
            .any(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(ConfigError::Invalid(
                "marker cannot contain identifier characters",
            ));
        }
        if self.marker.contains(['(', ')', '[', ']', '"', '\'', ',', '=']) {
            return Err(ConfigError::Invalid(
                "marker cannot contain parameter delimiters",
            ));
        }
        if self.fragment_separator.is_empty() {
            return Err(ConfigError::Invalid("fragment separator cannot be empty"));
        }
        if self.section_separator.is_empty() {
            return Err(ConfigError::Invalid("section separator cannot be empty"));
        }
        Ok(())
    }
}
