//! Example demonstrating decorator registration and prompt transformation.

use std::sync::Arc;

use anyhow::Result;
use prompt_decorators::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

const CATALOG: &str = r#"[
  {
    "name": "Debate",
    "version": "1.0.0",
    "description": "Presents several viewpoints on a question.",
    "category": "reasoning",
    "parameters": [
      { "name": "perspectives", "type": "number", "default": 2, "constraints": { "min": 2, "max": 5 } },
      { "name": "balanced", "type": "boolean", "default": true }
    ],
    "transformationTemplate": {
      "instruction": "Consider the question from multiple viewpoints.",
      "parameterMapping": {
        "perspectives": { "format": "Present {value} distinct perspectives." },
        "balanced": { "valueMap": { "true": "Give each perspective equal representation." } }
      }
    },
    "examples": ["+++Debate(perspectives=3)"]
  },
  {
    "name": "Detailed",
    "version": "1.0.0",
    "category": "length",
    "transformationTemplate": { "instruction": "Explain thoroughly, with examples." }
  }
]"#;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    println!("=== Prompt Decorators: Transform Example ===\n");

    let registry = Arc::new(DecoratorRegistry::new());

    // Example 1: Register definitions built in code and loaded from JSON
    register_decorators(&registry)?;

    let config = EngineConfig::default().with_env_overrides()?;
    let engine = TransformEngine::new(Arc::clone(&registry), config)?;

    // Example 2: Transform prompts
    for prompt in [
        "+++Bullet\nWhat are the main factors behind inflation?",
        "+++Debate(perspectives=3, balanced=true)\nIs remote work better for productivity?",
        "+++Concise\n+++Detailed\nHow does TCP congestion control work?",
        "+++Sparkle\n+++Bullet(style=number)\nList the planets.",
        "No directives, so this text is returned as-is.",
    ] {
        show(&engine, prompt)?;
    }

    // Example 3: Errors abort the transformation
    println!("--- Invalid parameters ---\n");
    match engine.transform("+++Bullet(style=circle)\nQ") {
        Ok(result) => println!("{}\n", result.final_text),
        Err(err) => println!("error: {err}\n"),
    }

    Ok(())
}

fn register_decorators(registry: &DecoratorRegistry) -> Result<()> {
    let bullet = DecoratorDefinition::builder("Bullet")?
        .version("1.0.0")?
        .description("Formats the response as a bulleted list.")
        .category("structure")
        .parameter(
            ParameterSpec::enumeration("style", ["dash", "number", "star"])
                .with_default("dash")
                .with_description("Bullet marker to use."),
        )
        .template(
            TransformationTemplate::new("Format the response as a bulleted list.").with_mapping(
                "style",
                ParameterMapping::value_map([
                    ("dash", "Use dashes (-) for bullet points."),
                    ("number", "Use numbers (1., 2., ...) for bullet points."),
                    ("star", "Use asterisks (*) for bullet points."),
                ]),
            ),
        )
        .example("+++Bullet(style=number)")
        .build()?;

    let concise = DecoratorDefinition::builder("Concise")?
        .version("1.0.0")?
        .category("length")
        .template(TransformationTemplate::new("Keep the answer short and direct."))
        .compatibility(Compatibility::new().conflicting_with(DecoratorName::new("Detailed")?))
        .build()?;

    registry.load_from(&StaticSource::new(vec![bullet, concise]))?;
    registry.load_from(&JsonSource::new("demo catalog", CATALOG))?;

    info!(decorators = ?registry.names(), "registry ready");
    Ok(())
}

fn show(engine: &TransformEngine, prompt: &str) -> Result<()> {
    println!("--- Input ---\n{prompt}\n");
    let result = engine.transform(prompt)?;
    println!("--- Output ---\n{}\n", result.final_text);
    if !result.diagnostics.is_empty() {
        println!(
            "Diagnostics:\n{}\n",
            serde_json::to_string_pretty(&result.diagnostics)?
        );
    }
    Ok(())
}
