//! Stack-level compatibility checks.
//!
//! Checks never fail; they only produce [`Diagnostic`]s. Whether a diagnostic
//! aborts a transformation is decided by the configured policy.

use std::collections::BTreeSet;

use decorator_primitives::{DecoratorDefinition, Version};
use decorator_registry::RegistrySnapshot;

use crate::diagnostic::Diagnostic;

/// Checks a resolved stack of definitions.
///
/// Repeated decorators are considered once. Diagnostics are ordered by
/// first appearance: pairwise conflicts first, then per decorator its missing
/// requirements, version range, and model support.
#[must_use]
pub fn check_definitions<'a, I>(
    definitions: I,
    spec_version: &Version,
    model: Option<&str>,
) -> Vec<Diagnostic>
where
    I: IntoIterator<Item = &'a DecoratorDefinition>,
{
    let mut seen = BTreeSet::new();
    let mut members: Vec<&DecoratorDefinition> = Vec::new();
    for definition in definitions {
        if seen.insert(definition.name().as_str()) {
            members.push(definition);
        }
    }
    let present: BTreeSet<&str> = members.iter().map(|d| d.name().as_str()).collect();

    let mut diagnostics = Vec::new();

    for (idx, a) in members.iter().enumerate() {
        for b in &members[idx + 1..] {
            let (a_name, b_name) = (a.name().as_str(), b.name().as_str());
            if a.compatibility().conflicts_with(b_name) || b.compatibility().conflicts_with(a_name)
            {
                diagnostics.push(Diagnostic::conflict(a_name, b_name));
            }
        }
    }

    for member in &members {
        let name = member.name().as_str();
        let compatibility = member.compatibility();

        for required in compatibility.requires() {
            if !present.contains(required.as_str()) {
                diagnostics.push(Diagnostic::missing_requirement(name, required.as_str()));
            }
        }

        if !compatibility.supports_spec_version(spec_version) {
            diagnostics.push(Diagnostic::version_incompatible(
                name,
                version_detail(name, spec_version, member),
            ));
        }

        if let Some(model) = model {
            if !compatibility.supports_model(model) {
                diagnostics.push(Diagnostic::unsupported_model(name, model));
            }
        }
    }

    diagnostics
}

/// Checks a stack given by name against a registry snapshot.
///
/// Names the snapshot does not know are skipped.
#[must_use]
pub fn check_names<'a, I>(
    names: I,
    snapshot: &RegistrySnapshot,
    spec_version: &Version,
    model: Option<&str>,
) -> Vec<Diagnostic>
where
    I: IntoIterator<Item = &'a str>,
{
    let definitions: Vec<&DecoratorDefinition> = names
        .into_iter()
        .filter_map(|name| snapshot.get(name))
        .map(|definition| &**definition)
        .collect();
    check_definitions(definitions, spec_version, model)
}

fn version_detail(name: &str, active: &Version, definition: &DecoratorDefinition) -> String {
    let compatibility = definition.compatibility();
    let bound =
        |version: Option<&Version>| version.map_or_else(|| "*".to_owned(), Version::to_string);
    format!(
        "decorator `{name}` supports spec versions {} to {}, active version is {active}",
        bound(compatibility.min_spec_version()),
        bound(compatibility.max_spec_version()),
    )
}
