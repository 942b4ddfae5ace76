//! Annotation resolution.
//!
//! Turns each declaration's raw markers into a typed tag set and checks the
//! preconditions of every strategy the tags select. Generators only ever see
//! a [`Resolution`], never marker text.

use annogen_core::{
    Annotation, Corpus, Declaration, DeclarationKind, GenerationError, GeneratorConfig,
    ParsedDeclaration, Strategy, ValueForm,
};
use serde::Serialize;
use std::collections::BTreeSet;

/// Resolved tags and runnable strategies for one declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub declaration: String,

    /// Every recognized tag, including ones whose strategy was rejected.
    pub annotations: BTreeSet<Annotation>,

    /// Enabled strategies whose preconditions hold, in [`Strategy::ALL`] order.
    pub strategies: Vec<Strategy>,

    /// DTO counterpart found for `autoMappableFromDTO`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counterpart: Option<String>,
}

impl Resolution {
    pub fn has(&self, annotation: Annotation) -> bool {
        self.annotations.contains(&annotation)
    }

    pub fn runs(&self, strategy: Strategy) -> bool {
        self.strategies.contains(&strategy)
    }
}

/// Map raw markers to typed tags, ignoring unknown ones.
pub fn annotations(declaration: &str, markers: &[String]) -> BTreeSet<Annotation> {
    markers
        .iter()
        .filter_map(|marker| {
            let annotation = Annotation::from_marker(marker);
            if annotation.is_none() {
                tracing::debug!(declaration, marker = %marker, "ignoring unknown marker");
            }
            annotation
        })
        .collect()
}

pub struct Resolver<'a> {
    corpus: &'a Corpus,
    config: &'a GeneratorConfig,
}

impl<'a> Resolver<'a> {
    pub fn new(corpus: &'a Corpus, config: &'a GeneratorConfig) -> Self {
        Self { corpus, config }
    }

    /// Resolve every annotated declaration in corpus order.
    pub fn resolve_all(&self) -> (Vec<Resolution>, Vec<GenerationError>) {
        let mut resolutions = Vec::new();
        let mut errors = Vec::new();
        for entry in self.corpus.entries() {
            let (resolution, mut entry_errors) = self.resolve(entry);
            resolutions.extend(resolution);
            errors.append(&mut entry_errors);
        }
        (resolutions, errors)
    }

    /// Resolve one declaration; `None` when it carries no recognized tag.
    pub fn resolve(&self, entry: &ParsedDeclaration) -> (Option<Resolution>, Vec<GenerationError>) {
        let declaration = &entry.declaration;
        let annotations = annotations(&declaration.name, &entry.markers);
        if annotations.is_empty() {
            return (None, Vec::new());
        }

        let mut errors = Vec::new();
        let mut strategies = Vec::new();
        let mut counterpart = None;

        if annotations.contains(&Annotation::ContainsComposition)
            && !annotations.contains(&Annotation::DescribesFeature)
        {
            errors.push(unresolvable(
                declaration,
                Annotation::ContainsComposition.tag(),
                "requires `describesFeature`",
            ));
        }

        for annotation in &annotations {
            let Some(strategy) = annotation.strategy() else {
                continue;
            };
            if !self.config.is_enabled(strategy) {
                continue;
            }
            match self.check(declaration, strategy) {
                Ok(found) => {
                    if strategy == Strategy::AutoMappableFromDto {
                        counterpart = found;
                    }
                    strategies.push(strategy);
                }
                Err(reason) => errors.push(unresolvable(declaration, strategy.name(), &reason)),
            }
        }
        strategies.sort();

        tracing::debug!(
            declaration = %declaration.name,
            annotations = ?annotations,
            strategies = ?strategies,
            "resolved annotations"
        );

        let resolution = Resolution {
            declaration: declaration.name.clone(),
            annotations,
            strategies,
            counterpart,
        };
        (Some(resolution), errors)
    }

    /// Check preconditions; the mapper returns its counterpart name.
    fn check(&self, declaration: &Declaration, strategy: Strategy) -> Result<Option<String>, String> {
        match strategy {
            Strategy::AutoFailingMock | Strategy::AutoStub => match &declaration.kind {
                DeclarationKind::Contract(_) => Ok(None),
                _ => Err(format!("expected a protocol, found a {}", declaration.form_name())),
            },
            Strategy::AutoMappableFromDto => self.check_mappable(declaration).map(Some),
            Strategy::Autoregister => match &declaration.kind {
                DeclarationKind::Contract(_) | DeclarationKind::ValueType(_) => Ok(None),
                DeclarationKind::Enumeration(_) => {
                    Err("expected a protocol or a concrete type, found an enum".to_string())
                }
            },
            Strategy::DescribesFeature => match declaration.as_value_type() {
                Some(value) if value.form == ValueForm::Struct => Ok(None),
                _ => Err(format!("expected a struct, found a {}", declaration.form_name())),
            },
        }
    }

    fn check_mappable(&self, declaration: &Declaration) -> Result<String, String> {
        match &declaration.kind {
            DeclarationKind::Contract(_) => {
                return Err("expected a struct or enum, found a protocol".to_string());
            }
            DeclarationKind::ValueType(value) if value.form != ValueForm::Struct => {
                return Err(format!(
                    "mapping initializers are only generated for structs and enums, found a {}",
                    value.form.keyword()
                ));
            }
            DeclarationKind::Enumeration(e) if e.has_associated_values => {
                return Err("enums with associated values cannot be mapped".to_string());
            }
            _ => {}
        }

        let candidates = self.config.naming.dto_candidates(&declaration.name);
        let Some(counterpart) = dto_counterpart(self.corpus, self.config, declaration) else {
            return Err(format!(
                "no counterpart declaration found (looked for {})",
                candidates.join(", ")
            ));
        };
        if counterpart.form_name() != declaration.form_name() {
            return Err(format!(
                "counterpart `{}` is a {}, expected a {}",
                counterpart.name,
                counterpart.form_name(),
                declaration.form_name()
            ));
        }
        Ok(counterpart.name.clone())
    }
}

/// First corpus declaration named after `declaration` plus a DTO suffix.
pub fn dto_counterpart<'c>(
    corpus: &'c Corpus,
    config: &GeneratorConfig,
    declaration: &Declaration,
) -> Option<&'c Declaration> {
    config
        .naming
        .dto_candidates(&declaration.name)
        .iter()
        .find_map(|candidate| corpus.get(candidate))
}

fn unresolvable(declaration: &Declaration, strategy: &str, reason: &str) -> GenerationError {
    GenerationError::UnresolvableStrategy {
        declaration: declaration.name.clone(),
        strategy: strategy.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
#[path = "resolver/resolver_tests.rs"]
mod resolver_tests;
