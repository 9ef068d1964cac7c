//! Declarative decorator definitions.

use std::collections::BTreeSet;

use semver::Version;
use serde::{Deserialize, Serialize};

use crate::compatibility::Compatibility;
use crate::error::{Error, Result};
use crate::name::{DecoratorName, is_identifier};
use crate::parameter::{ParamType, ParameterSpec, compile_pattern};
use crate::template::TransformationTemplate;

/// A named, versioned rule describing how a directive rewrites a prompt.
///
/// Definitions are immutable once registered; a newer version replaces the
/// whole record rather than mutating it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecoratorDefinition {
    name: DecoratorName,
    version: Version,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    category: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    parameters: Vec<ParameterSpec>,
    transformation_template: TransformationTemplate,
    #[serde(default)]
    compatibility: Compatibility,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    examples: Vec<String>,
}

impl DecoratorDefinition {
    /// Starts building a [`DecoratorDefinition`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidName`] when `name` is not an identifier.
    pub fn builder(name: impl Into<String>) -> Result<DefinitionBuilder> {
        Ok(DefinitionBuilder {
            name: DecoratorName::new(name)?,
            version: None,
            description: None,
            category: None,
            parameters: Vec::new(),
            template: None,
            compatibility: Compatibility::default(),
            examples: Vec::new(),
        })
    }

    /// Returns the decorator name.
    #[must_use]
    pub fn name(&self) -> &DecoratorName {
        &self.name
    }

    /// Returns the semantic version of this definition.
    #[must_use]
    pub fn version(&self) -> &Version {
        &self.version
    }

    /// Returns the optional description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the optional category used for grouping.
    #[must_use]
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    /// Returns parameters in declaration order.
    #[must_use]
    pub fn parameters(&self) -> &[ParameterSpec] {
        &self.parameters
    }

    /// Looks up a parameter by name.
    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&ParameterSpec> {
        self.parameters.iter().find(|spec| spec.name() == name)
    }

    /// Returns the rendering rules.
    #[must_use]
    pub fn template(&self) -> &TransformationTemplate {
        &self.transformation_template
    }

    /// Returns the compatibility metadata.
    #[must_use]
    pub fn compatibility(&self) -> &Compatibility {
        &self.compatibility
    }

    /// Returns sample invocations.
    #[must_use]
    pub fn examples(&self) -> &[String] {
        &self.examples
    }

    /// Checks the structural invariants of the definition.
    ///
    /// Deserialized definitions bypass the builder, so registries call this
    /// before accepting them.
    ///
    /// # Errors
    ///
    /// Returns the first invariant violation found.
    pub fn validate(&self) -> Result<()> {
        let decorator = self.name.as_str();
        let mut seen = BTreeSet::new();

        for spec in &self.parameters {
            let invalid = |reason: &str| Error::InvalidParameter {
                decorator: decorator.to_owned(),
                parameter: spec.name().to_owned(),
                reason: reason.to_owned(),
            };

            if !is_identifier(spec.name()) {
                return Err(invalid("parameter name must be an identifier"));
            }
            if !seen.insert(spec.name()) {
                return Err(invalid("parameter declared more than once"));
            }
            match spec.kind() {
                ParamType::Enum if spec.enum_values().is_empty() => {
                    return Err(invalid("enum parameters must declare enumValues"));
                }
                ParamType::Enum => {}
                _ if !spec.enum_values().is_empty() => {
                    return Err(invalid("enumValues is only valid for enum parameters"));
                }
                _ => {}
            }

            let constraints = spec.constraints();
            if let (Some(min), Some(max)) = (constraints.min, constraints.max) {
                if min > max {
                    return Err(invalid("min constraint exceeds max constraint"));
                }
            }
            if let Some(pattern) = constraints.pattern.as_deref() {
                compile_pattern(pattern).map_err(|err| invalid(&err.to_string()))?;
            }

            if let Some(default) = spec.default_value() {
                spec.check(default).map_err(|source| Error::InvalidDefault {
                    decorator: decorator.to_owned(),
                    parameter: spec.name().to_owned(),
                    source,
                })?;
            }
        }

        if let Some(parameter) = self
            .transformation_template
            .parameter_mapping()
            .keys()
            .find(|key| !seen.contains(key.as_str()))
        {
            return Err(Error::UnmappedParameter {
                decorator: decorator.to_owned(),
                parameter: parameter.clone(),
            });
        }

        if let (Some(min), Some(max)) = (
            self.compatibility.min_spec_version(),
            self.compatibility.max_spec_version(),
        ) {
            if min > max {
                return Err(Error::InvalidSpecRange {
                    decorator: decorator.to_owned(),
                    min: min.clone(),
                    max: max.clone(),
                });
            }
        }

        Ok(())
    }
}

/// Builder for [`DecoratorDefinition`].
#[derive(Debug)]
pub struct DefinitionBuilder {
    name: DecoratorName,
    version: Option<Version>,
    description: Option<String>,
    category: Option<String>,
    parameters: Vec<ParameterSpec>,
    template: Option<TransformationTemplate>,
    compatibility: Compatibility,
    examples: Vec<String>,
}

impl DefinitionBuilder {
    /// Sets the semantic version.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidVersion`] when the string is not valid semver.
    pub fn version(mut self, version: &str) -> Result<Self> {
        let parsed = Version::parse(version.trim()).map_err(|source| Error::InvalidVersion {
            version: version.to_owned(),
            source,
        })?;
        self.version = Some(parsed);
        Ok(self)
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the category.
    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Appends a parameter; declaration order is preserved.
    #[must_use]
    pub fn parameter(mut self, spec: ParameterSpec) -> Self {
        self.parameters.push(spec);
        self
    }

    /// Sets the rendering rules.
    #[must_use]
    pub fn template(mut self, template: TransformationTemplate) -> Self {
        self.template = Some(template);
        self
    }

    /// Sets the compatibility metadata.
    #[must_use]
    pub fn compatibility(mut self, compatibility: Compatibility) -> Self {
        self.compatibility = compatibility;
        self
    }

    /// Adds a sample invocation.
    #[must_use]
    pub fn example(mut self, example: impl Into<String>) -> Self {
        self.examples.push(example.into());
        self
    }

    /// Finalises and validates the definition.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingField`] when the version or template were not
    /// set, or any error reported by [`DecoratorDefinition::validate`].
    pub fn build(self) -> Result<DecoratorDefinition> {
        let version = self.version.ok_or(Error::MissingField("version"))?;
        let transformation_template = self.template.ok_or(Error::MissingField("template"))?;

        let definition = DecoratorDefinition {
            name: self.name,
            version,
            description: self.description,
            category: self.category,
            parameters: self.parameters,
            transformation_template,
            compatibility: self.compatibility,
            examples: self.examples,
        };
        definition.validate()?;
        Ok(definition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::ParameterMapping;
    use crate::value::ParamValue;

    fn bullet() -> DefinitionBuilder {
        DecoratorDefinition::builder("Bullet")
            .and_then(|b| b.version("1.0.0"))
            .expect("builder")
            .template(
                TransformationTemplate::new("Format the response as a bulleted list.")
                    .with_mapping(
                        "style",
                        ParameterMapping::value_map([("dash", "Use dashes for bullets.")]),
                    ),
            )
    }

    #[test]
    fn build_definition_success() {
        let definition = bullet()
            .description("Bulleted output")
            .category("structure")
            .parameter(ParameterSpec::enumeration("style", ["dash", "star"]).with_default("dash"))
            .example("+++Bullet(style=star)")
            .build()
            .expect("build");

        assert_eq!(definition.name().as_str(), "Bullet");
        assert_eq!(definition.version(), &Version::new(1, 0, 0));
        assert_eq!(definition.parameters().len(), 1);
        assert_eq!(
            definition.parameter("style").and_then(ParameterSpec::default_value),
            Some(&ParamValue::from("dash"))
        );
    }

    #[test]
    fn requires_version_and_template() {
        let err = DecoratorDefinition::builder("Bare")
            .and_then(DefinitionBuilder::build)
            .expect_err("no version");
        assert!(matches!(err, Error::MissingField("version")));
    }

    #[test]
    fn rejects_bad_version() {
        let err = DecoratorDefinition::builder("Bullet")
            .and_then(|b| b.version("one"))
            .expect_err("bad semver");
        assert!(matches!(err, Error::InvalidVersion { .. }));
    }

    #[test]
    fn rejects_duplicate_parameters() {
        let err = bullet()
            .parameter(ParameterSpec::enumeration("style", ["dash"]))
            .parameter(ParameterSpec::enumeration("style", ["star"]))
            .build()
            .expect_err("duplicate");
        assert!(matches!(err, Error::InvalidParameter { .. }));
    }

    #[test]
    fn rejects_enum_without_members() {
        let err = bullet()
            .parameter(ParameterSpec::new("style", ParamType::Enum))
            .build()
            .expect_err("empty enum");
        assert!(matches!(err, Error::InvalidParameter { reason, .. } if reason.contains("enumValues")));
    }

    #[test]
    fn rejects_default_outside_enum() {
        let err = bullet()
            .parameter(ParameterSpec::enumeration("style", ["dash"]).with_default("circle"))
            .build()
            .expect_err("bad default");
        assert!(matches!(err, Error::InvalidDefault { .. }));
    }

    #[test]
    fn rejects_mapping_for_undeclared_parameter() {
        let err = bullet().build().expect_err("style is mapped but not declared");
        assert!(matches!(err, Error::UnmappedParameter { parameter, .. } if parameter == "style"));
    }

    #[test]
    fn rejects_inverted_spec_range() {
        let err = bullet()
            .parameter(ParameterSpec::enumeration("style", ["dash"]))
            .compatibility(Compatibility::new().with_spec_range(
                Some(Version::new(2, 0, 0)),
                Some(Version::new(1, 0, 0)),
            ))
            .build()
            .expect_err("inverted");
        assert!(matches!(err, Error::InvalidSpecRange { .. }));
    }

    #[test]
    fn deserialized_definitions_can_be_validated() {
        let definition: DecoratorDefinition = serde_json::from_str(
            r#"{
                "name": "Debate",
                "version": "1.2.0",
                "parameters": [
                    {"name": "perspectives", "type": "number", "default": 2,
                     "constraints": {"min": 2, "max": 5}},
                    {"name": "balanced", "type": "boolean", "default": true}
                ],
                "transformationTemplate": {
                    "instruction": "Present a debate.",
                    "parameterMapping": {
                        "perspectives": {"format": "Include {value} distinct perspectives."}
                    }
                },
                "compatibility": {"conflicts": ["Concise"]}
            }"#,
        )
        .unwrap();

        definition.validate().expect("valid");
        assert_eq!(definition.parameters()[0].name(), "perspectives");
        assert!(definition.compatibility().conflicts_with("Concise"));
    }
}
