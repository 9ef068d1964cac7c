//! End-to-end transformations through the facade crate.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use prompt_decorators::prelude::*;

const CATALOG: &str = r#"{
  "decorators": [
    {
      "name": "Bullet",
      "version": "1.0.0",
      "description": "Formats the response as a bulleted list.",
      "category": "structure",
      "parameters": [
        {
          "name": "style",
          "type": "enum",
          "enumValues": ["dash", "number", "star"],
          "default": "dash"
        }
      ],
      "transformationTemplate": {
        "instruction": "Format the response as a bulleted list.",
        "parameterMapping": {
          "style": {
            "valueMap": {
              "dash": "Use dashes (-) for bullet points.",
              "number": "Use numbers (1., 2., ...) for bullet points.",
              "star": "Use asterisks (*) for bullet points."
            }
          }
        }
      }
    },
    {
      "name": "Debate",
      "version": "1.0.0",
      "category": "reasoning",
      "parameters": [
        {
          "name": "perspectives",
          "type": "number",
          "default": 2,
          "constraints": { "min": 2, "max": 5 }
        },
        { "name": "balanced", "type": "boolean", "default": true }
      ],
      "transformationTemplate": {
        "instruction": "Consider the question from multiple viewpoints.",
        "parameterMapping": {
          "perspectives": { "format": "Present {value} distinct perspectives." },
          "balanced": {
            "valueMap": { "true": "Give each perspective equal representation." }
          }
        }
      }
    },
    {
      "name": "Concise",
      "version": "1.0.0",
      "category": "length",
      "transformationTemplate": { "instruction": "Keep the answer short." },
      "compatibility": { "conflicts": ["Detailed"] }
    },
    {
      "name": "Detailed",
      "version": "1.0.0",
      "category": "length",
      "transformationTemplate": { "instruction": "Explain thoroughly." }
    },
    {
      "name": "Tone",
      "version": "1.0.0",
      "parameters": [
        { "name": "style", "type": "enum", "enumValues": ["formal", "casual"], "required": true }
      ],
      "transformationTemplate": {
        "instruction": "Match the requested tone.",
        "parameterMapping": {
          "style": {
            "valueMap": {
              "formal": "Write formally.",
              "casual": "Write casually."
            }
          }
        },
        "compositionBehavior": "override"
      }
    },
    {
      "name": "Frame",
      "version": "1.0.0",
      "transformationTemplate": {
        "instruction": "Answer only the question below.",
        "placement": "wrap",
        "wrap": { "after": "Remember: answer only the question above." }
      }
    },
    {
      "name": "Summary",
      "version": "1.0.0",
      "transformationTemplate": {
        "instruction": "Finish with a one-line summary.",
        "placement": "append"
      }
    }
  ]
}"#;

fn engine_with(config: EngineConfig) -> TransformEngine {
    let registry = Arc::new(DecoratorRegistry::new());
    registry
        .load_from(&JsonSource::new("catalog", CATALOG))
        .expect("catalog loads");
    TransformEngine::new(registry, config).expect("valid config")
}

fn engine() -> TransformEngine {
    engine_with(EngineConfig::default())
}

#[test]
fn bullet_with_default_style() {
    let result = engine()
        .transform("+++Bullet\nWhat are the main factors?")
        .unwrap();
    assert_eq!(
        result.final_text,
        "Format the response as a bulleted list. Use dashes (-) for bullet points.\n\n\
         What are the main factors?"
    );
    assert!(result.diagnostics.is_empty());
}

#[test]
fn debate_with_parameters() {
    let result = engine()
        .transform("+++Debate(perspectives=3,balanced=true)\nIs X ethical?")
        .unwrap();
    let (fragment, payload) = result.final_text.split_once("\n\n").unwrap();
    assert!(fragment.contains("3 distinct perspectives"), "{fragment}");
    assert!(fragment.contains("Give each perspective equal representation."));
    assert_eq!(payload, "Is X ethical?");
}

#[test]
fn conflict_is_reported_once_in_either_order() {
    for text in [
        "+++Concise\n+++Detailed\nExplain gravity.",
        "+++Detailed\n+++Concise\nExplain gravity.",
    ] {
        let result = engine().transform(text).unwrap();
        let conflicts: Vec<_> = result
            .diagnostics
            .iter()
            .filter(|d| d.code() == DiagnosticCode::Conflict)
            .collect();
        assert_eq!(conflicts.len(), 1, "{text}");
        assert_eq!(conflicts[0].names(), ["Concise", "Detailed"]);
    }
}

#[test]
fn strict_policy_turns_conflicts_into_errors() {
    let engine = engine_with(EngineConfig::default().with_compatibility(CompatibilityPolicy::Strict));
    let err = engine
        .transform("+++Concise\n+++Detailed\nExplain gravity.")
        .expect_err("strict");
    assert!(matches!(err, TransformError::Incompatible { .. }));
}

#[test]
fn identity_without_directives() {
    let text = "No directives here.\n+++Bullet is not at the start\n";
    let result = engine().transform(text).unwrap();
    assert_eq!(result.final_text, text);
    assert!(!result.is_transformed());
}

#[test]
fn enum_selects_matching_sentence() {
    let result = engine().transform("+++Bullet(style=number)\nQ").unwrap();
    assert!(result.final_text.contains("Use numbers"));
    assert!(!result.final_text.contains("Use dashes"));

    let err = engine()
        .transform("+++Bullet(style=circle)\nQ")
        .expect_err("out of enum");
    assert!(matches!(err, TransformError::Validation(_)));
}

#[test]
fn required_parameter_is_enforced() {
    let err = engine().transform("+++Tone\nQ").expect_err("style missing");
    let TransformError::Validation(err) = err else {
        panic!("unexpected error: {err:?}");
    };
    assert_eq!(err.decorator, "Tone");
    assert_eq!(err.parameter.as_deref(), Some("style"));
}

#[test]
fn last_override_wins() {
    let result = engine()
        .transform("+++Tone(style=formal)\n+++Tone(style=casual)\nQ")
        .unwrap();
    assert_eq!(result.final_text, "Match the requested tone. Write casually.\n\nQ");
}

#[test]
fn full_layout_with_wrap_and_append() {
    let result = engine()
        .transform("+++Summary\n+++Frame\n+++Concise\nWhy is the sky blue?\n")
        .unwrap();
    assert_eq!(
        result.final_text,
        "Keep the answer short.\n\n\
         Answer only the question below.\n\n\
         Why is the sky blue?\n\n\
         Remember: answer only the question above.\n\n\
         Finish with a one-line summary."
    );
    assert_eq!(result.applied, vec!["Summary", "Frame", "Concise"]);
}

#[test]
fn unknown_directive_stays_in_payload() {
    let result = engine()
        .transform("+++Bullet\n+++Sparkle(level=11)\nQ")
        .unwrap();
    assert_eq!(
        result.final_text,
        "Format the response as a bulleted list. Use dashes (-) for bullet points.\n\n\
         +++Sparkle(level=11)\nQ"
    );
    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.diagnostics[0].code(), DiagnosticCode::UnknownDirective);
}

#[test]
fn result_serializes_for_callers() {
    let result = engine().transform("+++Concise\n+++Detailed\nQ").unwrap();
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["diagnostics"][0]["code"], "conflict");
    assert_eq!(json["applied"][1], "Detailed");
    assert!(json["final_text"].as_str().unwrap().ends_with("\n\nQ"));
}

#[test]
fn registry_updates_apply_to_later_calls_only() {
    let engine = engine();
    let before = engine.transform("+++Concise\nQ").unwrap();

    let newer = DecoratorDefinition::builder("Concise")
        .unwrap()
        .version("1.1.0")
        .unwrap()
        .template(TransformationTemplate::new("Use at most two sentences."))
        .build()
        .unwrap();
    engine.registry().register(newer).unwrap();

    let after = engine.transform("+++Concise\nQ").unwrap();
    assert_eq!(before.final_text, "Keep the answer short.\n\nQ");
    assert_eq!(after.final_text, "Use at most two sentences.\n\nQ");

    let older = DecoratorDefinition::builder("Concise")
        .unwrap()
        .version("0.9.0")
        .unwrap()
        .template(TransformationTemplate::new("Old."))
        .build()
        .unwrap();
    assert!(engine.registry().register(older).is_err());
}
