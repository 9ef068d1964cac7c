//! Configuration loaders.

use anyhow::{Context, Result};
use semver::Version;
use tracing::debug;

use crate::schema::{CompatibilityPolicy, EngineConfig};

/// Overrides the directive marker.
pub const ENV_MARKER: &str = "PROMPT_DECORATORS_MARKER";
/// Overrides the active specification version.
pub const ENV_SPEC_VERSION: &str = "PROMPT_DECORATORS_SPEC_VERSION";
/// Overrides the compatibility policy (`advisory` or `strict`).
pub const ENV_COMPATIBILITY: &str = "PROMPT_DECORATORS_COMPATIBILITY";

impl EngineConfig {
    /// Decodes and validates a configuration from JSON.
    ///
    /// Missing fields fall back to their defaults; unknown fields are rejected.
    ///
    /// # Errors
    ///
    /// Returns an error when the JSON is malformed or the resulting
    /// configuration fails [`EngineConfig::validate`].
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).context("failed to decode engine configuration")?;
        config.validate().context("engine configuration is invalid")?;
        Ok(config)
    }

    /// Applies `PROMPT_DECORATORS_*` overrides from the process environment.
    ///
    /// # Errors
    ///
    /// See [`EngineConfig::with_overrides_from`].
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Applies overrides resolved through `lookup`, then validates.
    ///
    /// # Errors
    ///
    /// Returns an error when an override cannot be parsed or the resulting
    /// configuration is invalid.
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(marker) = lookup(ENV_MARKER) {
            debug!(%marker, "marker overridden from environment");
            self = self.with_marker(marker);
        }

        if let Some(raw) = lookup(ENV_SPEC_VERSION) {
            let version = Version::parse(raw.trim())
                .with_context(|| format!("{ENV_SPEC_VERSION} is not a semantic version: {raw}"))?;
            debug!(%version, "spec version overridden from environment");
            self = self.with_spec_version(version);
        }

        if let Some(raw) = lookup(ENV_COMPATIBILITY) {
            let policy: CompatibilityPolicy = raw
                .parse()
                .with_context(|| format!("{ENV_COMPATIBILITY} is invalid"))?;
            debug!(%policy, "compatibility policy overridden from environment");
            self = self.with_compatibility(policy);
        }

        self.validate().context("engine configuration is invalid")?;
        Ok(self)
    }
}
