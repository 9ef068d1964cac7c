//! Rendering of a decorator's instruction fragment.

use decorator_primitives::DecoratorDefinition;

use crate::error::RenderError;
use crate::params::ParameterMap;

/// Placeholder replaced by a parameter's display value inside a `format` string.
pub const VALUE_PLACEHOLDER: &str = "{value}";

/// Produces the instruction fragment for one resolved directive.
///
/// The fragment never includes the user's payload; placement is handled by
/// the composer.
pub trait Evaluator: Send + Sync {
    /// Renders `definition` with validated `params`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] when the fragment cannot be produced.
    fn render(
        &self,
        definition: &DecoratorDefinition,
        params: &ParameterMap,
    ) -> Result<String, RenderError>;
}

/// Default evaluator driven entirely by the definition's template.
///
/// Starts from the base instruction, then walks parameters in declaration
/// order. A `valueMap` entry keyed by the normalized value contributes its
/// sentence; a `format` string contributes itself with `{value}` substituted.
/// Non-empty pieces are joined with single spaces.
///
/// # Examples
///
/// ```
/// use decorator_engine::{DeclarativeRenderer, Evaluator, parse_parameters};
/// use decorator_primitives::{
///     DecoratorDefinition, ParameterMapping, ParameterSpec, TransformationTemplate,
/// };
///
/// let bullet = DecoratorDefinition::builder("Bullet")
///     .unwrap()
///     .version("1.0.0")
///     .unwrap()
///     .parameter(ParameterSpec::enumeration("style", ["dash", "number"]).with_default("dash"))
///     .template(
///         TransformationTemplate::new("Format the response as a bulleted list.").with_mapping(
///             "style",
///             ParameterMapping::value_map([("dash", "Use dashes (-) for bullet points.")]),
///         ),
///     )
///     .build()
///     .unwrap();
///
/// let params = parse_parameters(&bullet, None).unwrap();
/// let fragment = DeclarativeRenderer.render(&bullet, &params).unwrap();
/// assert_eq!(
///     fragment,
///     "Format the response as a bulleted list. Use dashes (-) for bullet points."
/// );
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct DeclarativeRenderer;

impl Evaluator for DeclarativeRenderer {
    fn render(
        &self,
        definition: &DecoratorDefinition,
        params: &ParameterMap,
    ) -> Result<String, RenderError> {
        let template = definition.template();
        let mut pieces = vec![template.instruction().trim().to_owned()];

        for spec in definition.parameters() {
            let (Some(mapping), Some(value)) =
                (template.mapping_for(spec.name()), params.get(spec.name()))
            else {
                continue;
            };

            if let Some(sentence) = mapping
                .value_map
                .as_ref()
                .and_then(|map| map.get(&value.normalized()))
            {
                pieces.push(sentence.trim().to_owned());
            }

            if let Some(format) = &mapping.format {
                pieces.push(format.replace(VALUE_PLACEHOLDER, &value.to_string()).trim().to_owned());
            }
        }

        pieces.retain(|piece| !piece.is_empty());
        Ok(pieces.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use decorator_primitives::{ParamType, ParameterMapping, ParameterSpec, TransformationTemplate};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::params::parse_parameters;

    fn debate() -> DecoratorDefinition {
        DecoratorDefinition::builder("Debate")
            .unwrap()
            .version("1.0.0")
            .unwrap()
            .parameter(ParameterSpec::new("perspectives", ParamType::Number).with_default(2))
            .parameter(ParameterSpec::new("balanced", ParamType::Boolean).with_default(true))
            .parameter(ParameterSpec::new("topics", ParamType::Array))
            .template(
                TransformationTemplate::new("Present multiple perspectives on this question.")
                    .with_mapping(
                        "perspectives",
                        ParameterMapping::format("Include {value} distinct viewpoints."),
                    )
                    .with_mapping(
                        "balanced",
                        ParameterMapping::value_map([
                            ("true", "Give each viewpoint equal weight."),
                            ("false", ""),
                        ]),
                    )
                    .with_mapping("topics", ParameterMapping::format("Cover: {value}.")),
            )
            .build()
            .unwrap()
    }

    fn render(raw: Option<&str>) -> String {
        let definition = debate();
        let params = parse_parameters(&definition, raw).unwrap();
        DeclarativeRenderer.render(&definition, &params).unwrap()
    }

    #[test]
    fn renders_defaults_in_declaration_order() {
        assert_eq!(
            render(None),
            "Present multiple perspectives on this question. Include 2 distinct viewpoints. \
             Give each viewpoint equal weight."
        );
    }

    #[test]
    fn empty_map_sentences_are_skipped() {
        assert_eq!(
            render(Some("perspectives=3, balanced=false")),
            "Present multiple perspectives on this question. Include 3 distinct viewpoints."
        );
    }

    #[test]
    fn arrays_join_with_comma_space() {
        let rendered = render(Some(r#"topics=["cost", "risk"]"#));
        assert!(rendered.ends_with("Cover: cost, risk."), "{rendered}");
    }

    #[test]
    fn fractional_numbers_keep_their_fraction() {
        assert!(render(Some("perspectives=2.5")).contains("Include 2.5 distinct"));
    }
}
