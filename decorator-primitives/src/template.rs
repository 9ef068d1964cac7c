//! Rendering rules attached to a decorator definition.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::name::DecoratorName;

/// Where a rendered fragment lands relative to the payload.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Placement {
    /// Before the payload.
    #[default]
    Prepend,
    /// After the payload.
    Append,
    /// On both sides of the payload.
    Wrap,
}

/// How a fragment combines with earlier fragments in the same placement bucket.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CompositionBehavior {
    /// Concatenate after earlier fragments.
    #[default]
    Accumulate,
    /// Discard every earlier fragment in the bucket.
    Override,
    /// Discard earlier fragments from the decorators named in
    /// [`TransformationTemplate::overrides`].
    SelectiveOverride,
}

/// Per-parameter rendering rule.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterMapping {
    /// Sentence selected by the parameter's normalized value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_map: Option<BTreeMap<String, String>>,
    /// Sentence with `{value}` substituted by the parameter value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl ParameterMapping {
    /// Mapping that selects a sentence per value.
    #[must_use]
    pub fn value_map<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            value_map: Some(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
            format: None,
        }
    }

    /// Mapping that interpolates the value into a format string.
    #[must_use]
    pub fn format(format: impl Into<String>) -> Self {
        Self {
            value_map: None,
            format: Some(format.into()),
        }
    }

    /// Adds a format string to an existing mapping.
    #[must_use]
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }
}

/// Distinct leading/trailing text for `wrap` placement.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrapText {
    /// Leading text used instead of the fragment; `{fragment}` expands to it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<String>,
    /// Trailing text used instead of the fragment; `{fragment}` expands to it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,
}

/// Declarative description of how one decorator rewrites a prompt.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformationTemplate {
    instruction: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    parameter_mapping: BTreeMap<String, ParameterMapping>,
    #[serde(default)]
    placement: Placement,
    #[serde(default)]
    composition_behavior: CompositionBehavior,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    wrap: Option<WrapText>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    overrides: BTreeSet<DecoratorName>,
}

impl TransformationTemplate {
    /// Creates a prepend/accumulate template with the supplied base instruction.
    #[must_use]
    pub fn new(instruction: impl Into<String>) -> Self {
        Self {
            instruction: instruction.into(),
            ..Self::default()
        }
    }

    /// Adds a rendering rule for the named parameter.
    #[must_use]
    pub fn with_mapping(mut self, parameter: impl Into<String>, mapping: ParameterMapping) -> Self {
        self.parameter_mapping.insert(parameter.into(), mapping);
        self
    }

    /// Sets the placement.
    #[must_use]
    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    /// Sets the composition behavior.
    #[must_use]
    pub fn with_behavior(mut self, behavior: CompositionBehavior) -> Self {
        self.composition_behavior = behavior;
        self
    }

    /// Sets distinct wrap texts.
    #[must_use]
    pub fn with_wrap(mut self, wrap: WrapText) -> Self {
        self.wrap = Some(wrap);
        self
    }

    /// Names a decorator whose earlier fragments a selective override replaces.
    #[must_use]
    pub fn overriding(mut self, name: DecoratorName) -> Self {
        self.overrides.insert(name);
        self
    }

    /// Base instruction text.
    #[must_use]
    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    /// Rendering rules keyed by parameter name.
    #[must_use]
    pub fn parameter_mapping(&self) -> &BTreeMap<String, ParameterMapping> {
        &self.parameter_mapping
    }

    /// Returns the rule for one parameter.
    #[must_use]
    pub fn mapping_for(&self, parameter: &str) -> Option<&ParameterMapping> {
        self.parameter_mapping.get(parameter)
    }

    /// Placement bucket for the rendered fragment.
    #[must_use]
    pub const fn placement(&self) -> Placement {
        self.placement
    }

    /// Composition behavior within the bucket.
    #[must_use]
    pub const fn composition_behavior(&self) -> CompositionBehavior {
        self.composition_behavior
    }

    /// Distinct wrap texts, if declared.
    #[must_use]
    pub fn wrap(&self) -> Option<&WrapText> {
        self.wrap.as_ref()
    }

    /// Decorators targeted by a selective override.
    #[must_use]
    pub fn overrides(&self) -> &BTreeSet<DecoratorName> {
        &self.overrides
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_prepend_accumulate() {
        let template: TransformationTemplate =
            serde_json::from_str(r#"{"instruction":"Be brief."}"#).unwrap();
        assert_eq!(template.placement(), Placement::Prepend);
        assert_eq!(template.composition_behavior(), CompositionBehavior::Accumulate);
        assert!(template.parameter_mapping().is_empty());
    }

    #[test]
    fn deserializes_kebab_case_enums() {
        let template: TransformationTemplate = serde_json::from_str(
            r#"{
                "instruction": "Reply as JSON.",
                "placement": "wrap",
                "compositionBehavior": "selective-override",
                "overrides": ["Markdown"],
                "parameterMapping": {
                    "strict": {"valueMap": {"true": "No prose."}}
                }
            }"#,
        )
        .unwrap();
        assert_eq!(template.placement(), Placement::Wrap);
        assert_eq!(
            template.composition_behavior(),
            CompositionBehavior::SelectiveOverride
        );
        assert!(template.overrides().contains("Markdown"));
        let mapping = template.mapping_for("strict").unwrap();
        assert_eq!(
            mapping.value_map.as_ref().and_then(|m| m.get("true")).map(String::as_str),
            Some("No prose.")
        );
    }
}
