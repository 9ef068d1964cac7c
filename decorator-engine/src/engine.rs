//! Transformation entry point tying parser, validator, renderer, checker,
//! and composer together.

use std::sync::Arc;

use decorator_config::{CompatibilityPolicy, ConfigResult, EngineConfig};
use decorator_primitives::DecoratorDefinition;
use decorator_registry::{DecoratorRegistry, RegistrySnapshot};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::compatibility::check_definitions;
use crate::compose::{Fragment, compose};
use crate::diagnostic::Diagnostic;
use crate::error::{TransformError, TransformResult};
use crate::params::{ParameterMap, validate_arguments};
use crate::parser::parse;
use crate::render::{DeclarativeRenderer, Evaluator};

/// A directive resolved against the registry with validated parameters.
#[derive(Debug, Clone)]
pub struct DirectiveInvocation {
    raw_params: Option<String>,
    offset: usize,
    definition: Arc<DecoratorDefinition>,
    parameters: ParameterMap,
}

impl DirectiveInvocation {
    /// Decorator name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.definition.name().as_str()
    }

    /// Parameter text as written between the parentheses.
    #[must_use]
    pub fn raw_params(&self) -> Option<&str> {
        self.raw_params.as_deref()
    }

    /// Byte offset of the directive in the input.
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Definition the directive resolved to.
    #[must_use]
    pub fn definition(&self) -> &Arc<DecoratorDefinition> {
        &self.definition
    }

    /// Validated parameters, defaults included.
    #[must_use]
    pub fn parameters(&self) -> &ParameterMap {
        &self.parameters
    }
}

/// Resolved directives in textual order.
#[derive(Debug, Clone, Default)]
pub struct DecoratorStack(Vec<DirectiveInvocation>);

impl DecoratorStack {
    /// Iterates invocations in textual order.
    pub fn iter(&self) -> std::slice::Iter<'_, DirectiveInvocation> {
        self.0.iter()
    }

    /// Decorator names in textual order, repeats included.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.0.iter().map(DirectiveInvocation::name).collect()
    }

    /// Number of invocations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true when no directive resolved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a DecoratorStack {
    type Item = &'a DirectiveInvocation;
    type IntoIter = std::slice::Iter<'a, DirectiveInvocation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// A prompt split into its resolved stack and the text it decorates.
#[derive(Debug, Clone)]
pub struct ResolvedPrompt {
    stack: DecoratorStack,
    payload: String,
    diagnostics: Vec<Diagnostic>,
}

impl ResolvedPrompt {
    /// Resolved directives.
    #[must_use]
    pub fn stack(&self) -> &DecoratorStack {
        &self.stack
    }

    /// Payload, with unknown directive lines passed through ahead of it.
    #[must_use]
    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// Unknown-directive diagnostics collected while resolving.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

/// Output of a transformation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransformationResult {
    /// Final prompt text.
    pub final_text: String,
    /// Non-fatal findings, unknown directives first.
    pub diagnostics: Vec<Diagnostic>,
    /// Names of applied decorators in textual order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub applied: Vec<String>,
}

impl TransformationResult {
    /// Returns true when at least one decorator was applied.
    #[must_use]
    pub fn is_transformed(&self) -> bool {
        !self.applied.is_empty()
    }
}

/// Splits `text` into a resolved stack and payload using one registry snapshot.
///
/// # Errors
///
/// Returns [`TransformError::Parse`] for a non-identifier directive name or a
/// malformed parameter list on a registered directive, and
/// [`TransformError::Validation`] when parameters do not satisfy the
/// definition.
pub fn resolve_with(
    snapshot: &RegistrySnapshot,
    config: &EngineConfig,
    text: &str,
) -> TransformResult<ResolvedPrompt> {
    let parsed = parse(text, config.marker())?;

    let mut invocations = Vec::new();
    let mut diagnostics = Vec::new();
    let mut payload = String::new();

    for token in parsed.directives() {
        let Some(definition) = snapshot.get(token.name()) else {
            info!(
                decorator = token.name(),
                offset = token.offset(),
                "unknown directive passed through"
            );
            diagnostics.push(Diagnostic::unknown_directive(token.name()));
            payload.push_str(&text[token.line()]);
            continue;
        };

        let arguments = token.arguments().map_err(Clone::clone)?;
        let parameters = validate_arguments(definition, arguments)?;
        debug!(
            decorator = token.name(),
            version = %definition.version(),
            parameters = parameters.len(),
            "directive resolved"
        );

        invocations.push(DirectiveInvocation {
            raw_params: token.raw_params().map(str::to_owned),
            offset: token.offset(),
            definition: Arc::clone(definition),
            parameters,
        });
    }
    payload.push_str(parsed.payload());

    Ok(ResolvedPrompt {
        stack: DecoratorStack(invocations),
        payload,
        diagnostics,
    })
}

/// Runs the full pipeline against one snapshot.
///
/// The output is a pure function of the snapshot, configuration, evaluator,
/// input text, and target model.
///
/// # Errors
///
/// Returns any error from [`resolve_with`], [`TransformError::Render`] when the
/// evaluator fails, and [`TransformError::Incompatible`] when the strict
/// policy rejects the stack.
pub fn transform_with(
    snapshot: &RegistrySnapshot,
    config: &EngineConfig,
    evaluator: &dyn Evaluator,
    text: &str,
    model: Option<&str>,
) -> TransformResult<TransformationResult> {
    let resolved = resolve_with(snapshot, config, text)?;
    let mut diagnostics = resolved.diagnostics;

    if resolved.stack.is_empty() {
        return Ok(TransformationResult {
            final_text: text.to_owned(),
            diagnostics,
            applied: Vec::new(),
        });
    }

    let compatibility = check_definitions(
        resolved.stack.iter().map(|invocation| &*invocation.definition),
        config.spec_version(),
        model,
    );
    for diagnostic in &compatibility {
        warn!(
            code = ?diagnostic.code(),
            decorators = ?diagnostic.names(),
            detail = diagnostic.detail(),
            "compatibility diagnostic"
        );
    }
    diagnostics.extend(compatibility);

    if config.compatibility() == CompatibilityPolicy::Strict {
        let blocking: Vec<Diagnostic> = diagnostics
            .iter()
            .filter(|diagnostic| diagnostic.is_blocking())
            .cloned()
            .collect();
        if !blocking.is_empty() {
            return Err(TransformError::Incompatible {
                diagnostics: blocking,
            });
        }
    }

    let mut rendered = Vec::with_capacity(resolved.stack.len());
    for invocation in &resolved.stack {
        let fragment = evaluator.render(&invocation.definition, &invocation.parameters)?;
        debug!(decorator = invocation.name(), bytes = fragment.len(), "fragment rendered");
        rendered.push(fragment);
    }

    let fragments: Vec<Fragment<'_>> = resolved
        .stack
        .iter()
        .zip(&rendered)
        .map(|(invocation, text)| Fragment::new(&invocation.definition, text))
        .collect();

    Ok(TransformationResult {
        final_text: compose(&fragments, &resolved.payload, config),
        diagnostics,
        applied: resolved
            .stack
            .names()
            .into_iter()
            .map(str::to_owned)
            .collect(),
    })
}

/// Rewrites prompts using decorators from a shared registry.
///
/// Every call takes one registry snapshot, so concurrent registrations never
/// affect a transformation in flight.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use decorator_config::EngineConfig;
/// use decorator_engine::TransformEngine;
/// use decorator_primitives::{DecoratorDefinition, TransformationTemplate};
/// use decorator_registry::DecoratorRegistry;
///
/// let registry = Arc::new(DecoratorRegistry::new());
/// registry
///     .register(
///         DecoratorDefinition::builder("Concise")
///             .unwrap()
///             .version("1.0.0")
///             .unwrap()
///             .template(TransformationTemplate::new("Answer in as few words as possible."))
///             .build()
///             .unwrap(),
///     )
///     .unwrap();
///
/// let engine = TransformEngine::new(registry, EngineConfig::default()).unwrap();
/// let result = engine.transform("+++Concise\nWhy is the sky blue?").unwrap();
/// assert_eq!(
///     result.final_text,
///     "Answer in as few words as possible.\n\nWhy is the sky blue?"
/// );
/// ```
#[derive(Clone)]
pub struct TransformEngine {
    registry: Arc<DecoratorRegistry>,
    config: EngineConfig,
    evaluator: Arc<dyn Evaluator>,
}

impl std::fmt::Debug for TransformEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformEngine")
            .field("registry", &self.registry)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl TransformEngine {
    /// Creates an engine with the declarative renderer.
    ///
    /// # Errors
    ///
    /// Returns the configuration's validation error.
    pub fn new(registry: Arc<DecoratorRegistry>, config: EngineConfig) -> ConfigResult<Self> {
        config.validate()?;
        Ok(Self {
            registry,
            config,
            evaluator: Arc::new(DeclarativeRenderer),
        })
    }

    /// Replaces the evaluator used to render fragments.
    #[must_use]
    pub fn with_evaluator(mut self, evaluator: Arc<dyn Evaluator>) -> Self {
        self.evaluator = evaluator;
        self
    }

    /// Registry the engine reads from.
    #[must_use]
    pub fn registry(&self) -> &Arc<DecoratorRegistry> {
        &self.registry
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Transforms `text` without a target model.
    ///
    /// # Errors
    ///
    /// See [`transform_with`].
    pub fn transform(&self, text: &str) -> TransformResult<TransformationResult> {
        self.transform_for_model(text, None)
    }

    /// Transforms `text`, checking model support when `model` is given.
    ///
    /// # Errors
    ///
    /// See [`transform_with`].
    pub fn transform_for_model(
        &self,
        text: &str,
        model: Option<&str>,
    ) -> TransformResult<TransformationResult> {
        let snapshot = self.registry.snapshot();
        debug!(generation = snapshot.generation(), "transforming prompt");
        transform_with(&snapshot, &self.config, self.evaluator.as_ref(), text, model)
    }

    /// Resolves directives without rendering, for callers that inspect the stack.
    ///
    /// # Errors
    ///
    /// See [`resolve_with`].
    pub fn resolve(&self, text: &str) -> TransformResult<ResolvedPrompt> {
        resolve_with(&self.registry.snapshot(), &self.config, text)
    }
}
