//! Assembly of rendered fragments and the payload into the final prompt.

use decorator_config::EngineConfig;
use decorator_primitives::{CompositionBehavior, DecoratorDefinition, Placement};
use tracing::debug;

/// Placeholder in `wrap.before`/`wrap.after` replaced by the rendered fragment.
pub const FRAGMENT_PLACEHOLDER: &str = "{fragment}";

/// A rendered fragment paired with the definition that produced it.
#[derive(Debug, Clone, Copy)]
pub struct Fragment<'a> {
    definition: &'a DecoratorDefinition,
    text: &'a str,
}

impl<'a> Fragment<'a> {
    /// Pairs rendered `text` with its `definition`.
    #[must_use]
    pub const fn new(definition: &'a DecoratorDefinition, text: &'a str) -> Self {
        Self { definition, text }
    }

    /// Name of the producing decorator.
    #[must_use]
    pub fn name(&self) -> &'a str {
        self.definition.name().as_str()
    }

    /// Rendered text.
    #[must_use]
    pub const fn text(&self) -> &'a str {
        self.text
    }
}

#[derive(Debug)]
struct Entry<'a> {
    name: &'a str,
    lead: String,
    trail: String,
}

#[derive(Debug, Default)]
struct Buckets<'a> {
    prepend: Vec<Entry<'a>>,
    append: Vec<Entry<'a>>,
    wrap: Vec<Entry<'a>>,
}

impl<'a> Buckets<'a> {
    fn place(&mut self, fragment: &Fragment<'a>) {
        let template = fragment.definition.template();
        let bucket = match template.placement() {
            Placement::Prepend => &mut self.prepend,
            Placement::Append => &mut self.append,
            Placement::Wrap => &mut self.wrap,
        };

        match template.composition_behavior() {
            CompositionBehavior::Accumulate => {}
            CompositionBehavior::Override => bucket.clear(),
            CompositionBehavior::SelectiveOverride => {
                let overrides = template.overrides();
                bucket.retain(|entry| !overrides.contains(entry.name));
            }
        }

        let (lead, trail) = match template.wrap() {
            Some(wrap) if template.placement() == Placement::Wrap => (
                expand(wrap.before.as_deref(), fragment.text),
                expand(wrap.after.as_deref(), fragment.text),
            ),
            _ => (fragment.text.to_owned(), fragment.text.to_owned()),
        };

        bucket.push(Entry {
            name: fragment.name(),
            lead,
            trail,
        });
    }
}

fn expand(custom: Option<&str>, fragment: &str) -> String {
    custom.map_or_else(
        || fragment.to_owned(),
        |text| text.replace(FRAGMENT_PLACEHOLDER, fragment),
    )
}

fn join<'s>(texts: impl Iterator<Item = &'s str>, separator: &str) -> String {
    texts
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(separator)
}

/// Lays out `fragments` around `payload`.
///
/// Sections appear in the order prepend, wrap leads (stack order), payload,
/// wrap trails (reverse stack order), append. Empty sections are skipped.
/// Leading and trailing line breaks of the payload are dropped.
#[must_use]
pub fn compose(fragments: &[Fragment<'_>], payload: &str, config: &EngineConfig) -> String {
    let mut buckets = Buckets::default();
    for fragment in fragments {
        buckets.place(fragment);
    }
    debug!(
        prepend = buckets.prepend.len(),
        wrap = buckets.wrap.len(),
        append = buckets.append.len(),
        "composing prompt"
    );

    let separator = config.fragment_separator();
    let sections = [
        join(buckets.prepend.iter().map(|e| e.lead.as_str()), separator),
        join(buckets.wrap.iter().map(|e| e.lead.as_str()), separator),
        payload.trim_matches(['\n', '\r']).to_owned(),
        join(buckets.wrap.iter().rev().map(|e| e.trail.as_str()), separator),
        join(buckets.append.iter().map(|e| e.lead.as_str()), separator),
    ];

    sections
        .into_iter()
        .filter(|section| !section.is_empty())
        .collect::<Vec<_>>()
        .join(config.section_separator())
}

#[cfg(test)]
mod tests {
    use decorator_primitives::{DecoratorName, TransformationTemplate, WrapText};
    use pretty_assertions::assert_eq;

    use super::*;

    fn def(name: &str, placement: Placement, behavior: CompositionBehavior) -> DecoratorDefinition {
        DecoratorDefinition::builder(name)
            .unwrap()
            .version("1.0.0")
            .unwrap()
            .template(
                TransformationTemplate::new(name)
                    .with_placement(placement)
                    .with_behavior(behavior),
            )
            .build()
            .unwrap()
    }

    fn run(defs: &[&DecoratorDefinition], payload: &str) -> String {
        let texts: Vec<String> = defs.iter().map(|d| format!("<{}>", d.name())).collect();
        let fragments: Vec<_> = defs
            .iter()
            .zip(&texts)
            .map(|(d, t)| Fragment::new(d, t))
            .collect();
        compose(&fragments, payload, &EngineConfig::default())
    }

    #[test]
    fn prepend_and_append_surround_payload() {
        let a = def("A", Placement::Prepend, CompositionBehavior::Accumulate);
        let b = def("B", Placement::Prepend, CompositionBehavior::Accumulate);
        let c = def("C", Placement::Append, CompositionBehavior::Accumulate);
        assert_eq!(run(&[&a, &c, &b], "\nQ?\n"), "<A>\n<B>\n\nQ?\n\n<C>");
    }

    #[test]
    fn override_clears_only_its_bucket() {
        let a = def("A", Placement::Prepend, CompositionBehavior::Accumulate);
        let c = def("C", Placement::Append, CompositionBehavior::Accumulate);
        let o = def("O", Placement::Prepend, CompositionBehavior::Override);
        assert_eq!(run(&[&a, &c, &o], "Q"), "<O>\n\nQ\n\n<C>");
    }

    #[test]
    fn later_entries_survive_an_override() {
        let a = def("A", Placement::Prepend, CompositionBehavior::Accumulate);
        let o = def("O", Placement::Prepend, CompositionBehavior::Override);
        assert_eq!(run(&[&o, &a], "Q"), "<O>\n<A>\n\nQ");
    }

    #[test]
    fn selective_override_removes_named_entries() {
        let a = def("A", Placement::Prepend, CompositionBehavior::Accumulate);
        let b = def("B", Placement::Prepend, CompositionBehavior::Accumulate);
        let s = DecoratorDefinition::builder("S")
            .unwrap()
            .version("1.0.0")
            .unwrap()
            .template(
                TransformationTemplate::new("S")
                    .with_behavior(CompositionBehavior::SelectiveOverride)
                    .overriding(DecoratorName::new("A").unwrap()),
            )
            .build()
            .unwrap();
        assert_eq!(run(&[&a, &b, &s], "Q"), "<B>\n<S>\n\nQ");
    }

    #[test]
    fn selective_override_without_targets_accumulates() {
        let a = def("A", Placement::Prepend, CompositionBehavior::Accumulate);
        let s = def("S", Placement::Prepend, CompositionBehavior::SelectiveOverride);
        assert_eq!(run(&[&a, &s], "Q"), "<A>\n<S>\n\nQ");
    }

    #[test]
    fn wraps_nest() {
        let outer = def("Outer", Placement::Wrap, CompositionBehavior::Accumulate);
        let inner = def("Inner", Placement::Wrap, CompositionBehavior::Accumulate);
        assert_eq!(
            run(&[&outer, &inner], "Q"),
            "<Outer>\n<Inner>\n\nQ\n\n<Inner>\n<Outer>"
        );
    }

    #[test]
    fn wrap_text_replaces_each_side() {
        let quote = DecoratorDefinition::builder("Quote")
            .unwrap()
            .version("1.0.0")
            .unwrap()
            .template(
                TransformationTemplate::new("Quote")
                    .with_placement(Placement::Wrap)
                    .with_wrap(WrapText {
                        before: Some("BEGIN {fragment}".to_owned()),
                        after: Some("END".to_owned()),
                    }),
            )
            .build()
            .unwrap();
        assert_eq!(run(&[&quote], "Q"), "BEGIN <Quote>\n\nQ\n\nEND");
    }

    #[test]
    fn honours_configured_separators() {
        let a = def("A", Placement::Prepend, CompositionBehavior::Accumulate);
        let b = def("B", Placement::Prepend, CompositionBehavior::Accumulate);
        let texts = ["a", "b"];
        let fragments = [Fragment::new(&a, texts[0]), Fragment::new(&b, texts[1])];
        let config = EngineConfig::default()
            .with_fragment_separator(" | ")
            .with_section_separator("\n---\n");
        assert_eq!(compose(&fragments, "Q", &config), "a | b\n---\nQ");
    }

    #[test]
    fn empty_payload_is_skipped() {
        let a = def("A", Placement::Prepend, CompositionBehavior::Accumulate);
        assert_eq!(run(&[&a], ""), "<A>");
    }
}
