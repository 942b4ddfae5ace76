//! Generation engine.
//!
//! A run goes through five stages:
//!
//! ```text
//! SourceUnits ─→ [parse, parallel] ─→ Corpus ─→ [resolve] ─→ Resolutions
//!     ─→ [generate, parallel per declaration] ─→ Artifacts ─→ [emit] ─→ outputs
//! ```
//!
//! Errors never stop a run: each stage records what it could not handle
//! and the report carries all of them next to whatever was generated.

use crate::resolver::{Resolution, Resolver, annotations};
use crate::{composition, emit, mapper, mock, registration};
use annogen_core::parallel::{map_ordered, resolve_jobs};
use annogen_core::{
    Corpus, Declaration, FixtureProvider, GeneratedArtifact, GenerationError, GeneratorConfig,
    ParsedDeclaration, Strategy,
};
use annogen_parser::{DeclarationSource, Rejected, SourceUnit, SwiftSource, parse_units};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Artifacts for one declaration, or every error that prevented them.
pub type Generated = Result<Vec<GeneratedArtifact>, Vec<GenerationError>>;

/// Read-only state shared by all generators during a run.
pub struct GenerationContext<'a> {
    pub corpus: &'a Corpus,
    pub config: &'a GeneratorConfig,
    pub fixtures: &'a dyn FixtureProvider,
    /// Resolutions keyed by declaration name.
    pub resolutions: &'a BTreeMap<String, Resolution>,
}

impl GenerationContext<'_> {
    pub fn resolution(&self, name: &str) -> Option<&Resolution> {
        self.resolutions.get(name)
    }
}

/// Result of a generation run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GenerationReport {
    /// Output text keyed by output unit name.
    pub outputs: BTreeMap<String, String>,

    /// Every artifact, sorted by (declaration, strategy).
    pub artifacts: Vec<GeneratedArtifact>,

    pub errors: Vec<GenerationError>,
}

impl GenerationReport {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    /// Process exit status for drivers: 0 on success, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        if self.is_success() { 0 } else { 1 }
    }

    /// Diagnostics attached to artifacts, prefixed with their declaration.
    pub fn diagnostics(&self) -> Vec<String> {
        self.artifacts
            .iter()
            .flat_map(|a| {
                a.diagnostics
                    .iter()
                    .map(move |d| format!("{} ({}): {d}", a.declaration, a.strategy))
            })
            .collect()
    }
}

/// Parsed declarations and their resolutions, without generating anything.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Inspection {
    pub declarations: Vec<ParsedDeclaration>,
    pub resolutions: Vec<Resolution>,
    pub errors: Vec<GenerationError>,
}

/// Drives parsing, resolution, generation and emission.
pub struct Engine {
    config: GeneratorConfig,
    fixtures: Box<dyn FixtureProvider>,
}

impl Engine {
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            config,
            fixtures: Box::new(BTreeMap::<String, String>::new()),
        }
    }

    /// Consult `provider` before the configured fixture table.
    pub fn with_fixture_provider(mut self, provider: impl FixtureProvider + 'static) -> Self {
        self.fixtures = Box::new(provider);
        self
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Parse Swift source units and generate.
    pub fn generate(&self, units: &[SourceUnit]) -> GenerationReport {
        let source = SwiftSource::new(&self.config.marker_prefix);
        self.generate_from(&source, units)
    }

    /// Generate from units read by a custom front end.
    pub fn generate_from(
        &self,
        source: &dyn DeclarationSource,
        units: &[SourceUnit],
    ) -> GenerationReport {
        let parsed = parse_units(source, units, self.config.jobs);
        self.run(parsed.declarations, parsed.errors, &parsed.rejected)
    }

    /// Generate from already parsed declarations.
    pub fn generate_parsed(&self, declarations: Vec<ParsedDeclaration>) -> GenerationReport {
        self.run(declarations, Vec::new(), &[])
    }

    fn run(
        &self,
        declarations: Vec<ParsedDeclaration>,
        parse_errors: Vec<GenerationError>,
        rejected: &[Rejected],
    ) -> GenerationReport {
        let (corpus, mut corpus_errors) = Corpus::build(declarations);
        let mut errors = relevant_parse_errors(&corpus, &self.config, parse_errors, rejected);
        errors.append(&mut corpus_errors);
        let (resolutions, mut resolve_errors) = Resolver::new(&corpus, &self.config).resolve_all();
        errors.append(&mut resolve_errors);

        let resolutions: BTreeMap<String, Resolution> = resolutions
            .into_iter()
            .map(|r| (r.declaration.clone(), r))
            .collect();
        let ctx = GenerationContext {
            corpus: &corpus,
            config: &self.config,
            fixtures: self.fixtures.as_ref(),
            resolutions: &resolutions,
        };

        let tasks: Vec<(&Declaration, Strategy)> = corpus
            .declarations()
            .filter_map(|d| resolutions.get(&d.name).map(|r| (d, r)))
            .flat_map(|(d, r)| {
                r.strategies
                    .iter()
                    .filter(|s| **s != Strategy::Autoregister)
                    .map(move |s| (d, *s))
            })
            .collect();

        let jobs = resolve_jobs(self.config.jobs);
        tracing::debug!(tasks = tasks.len(), jobs, "generating");
        let results = map_ordered(&tasks, jobs, |(declaration, strategy)| {
            dispatch(&ctx, declaration, *strategy)
        });

        let mut artifacts: BTreeMap<(String, &'static str), GeneratedArtifact> = BTreeMap::new();
        let mut collect = |generated: Vec<GeneratedArtifact>| {
            for artifact in generated {
                let key = (artifact.declaration.clone(), artifact.strategy.name());
                artifacts.entry(key).or_insert(artifact);
            }
        };

        for result in results {
            match result {
                Ok(generated) => collect(generated),
                Err(mut failed) => errors.append(&mut failed),
            }
        }

        if self.config.is_enabled(Strategy::Autoregister) {
            let (table, mut registration_errors) = registration::generate(&ctx);
            collect(table.into_iter().collect());
            errors.append(&mut registration_errors);
        }

        let artifacts: Vec<GeneratedArtifact> = artifacts.into_values().collect();
        let outputs = emit::emit(&artifacts);

        tracing::info!(
            declarations = corpus.len(),
            annotated = resolutions.len(),
            artifacts = artifacts.len(),
            outputs = outputs.len(),
            errors = errors.len(),
            "generation finished"
        );

        GenerationReport {
            outputs,
            artifacts,
            errors,
        }
    }

    /// Parse and resolve without generating.
    pub fn inspect(&self, units: &[SourceUnit]) -> Inspection {
        let source = SwiftSource::new(&self.config.marker_prefix);
        let parsed = parse_units(&source, units, self.config.jobs);

        let (corpus, mut corpus_errors) = Corpus::build(parsed.declarations);
        let mut errors =
            relevant_parse_errors(&corpus, &self.config, parsed.errors, &parsed.rejected);
        errors.append(&mut corpus_errors);
        let (resolutions, mut resolve_errors) = Resolver::new(&corpus, &self.config).resolve_all();
        errors.append(&mut resolve_errors);

        Inspection {
            declarations: corpus.entries().to_vec(),
            resolutions,
            errors,
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(GeneratorConfig::default())
    }
}

/// Drop parse errors for rejected declarations nothing annotated depends on.
///
/// A rejected declaration stays reported when it carries a recognized marker,
/// when it nests inside an annotated declaration, or when an annotated
/// declaration mentions it (directly, as a DTO counterpart, or as the owner
/// of a nested type such as `Child.State`).
fn relevant_parse_errors(
    corpus: &Corpus,
    config: &GeneratorConfig,
    parse_errors: Vec<GenerationError>,
    rejected: &[Rejected],
) -> Vec<GenerationError> {
    if rejected.is_empty() {
        return parse_errors;
    }

    let annotated: BTreeSet<&str> = corpus
        .entries()
        .iter()
        .filter(|entry| !annotations(&entry.declaration.name, &entry.markers).is_empty())
        .map(|entry| entry.declaration.name.as_str())
        .collect();

    let mut wanted: BTreeSet<String> = BTreeSet::new();
    for name in &annotated {
        let mut mentioned = corpus
            .get(name)
            .map(Declaration::mentioned_names)
            .unwrap_or_default();
        mentioned.insert((*name).to_string());
        for mention in mentioned {
            wanted.extend(config.naming.dto_candidates(&mention));
            if let Some((owner, _)) = mention.rsplit_once('.') {
                wanted.insert(owner.to_string());
            }
            wanted.insert(mention);
        }
    }

    let ignored: BTreeSet<&str> = rejected
        .iter()
        .filter(|r| {
            let relevant = !annotations(&r.declaration, &r.markers).is_empty()
                || wanted.contains(&r.declaration)
                || r.parent
                    .as_deref()
                    .is_some_and(|p| annotated.contains(p) || wanted.contains(p));
            !relevant
        })
        .map(|r| r.declaration.as_str())
        .collect();

    parse_errors
        .into_iter()
        .filter(|error| match error {
            GenerationError::MalformedDeclaration { declaration, .. }
                if ignored.contains(declaration.as_str()) =>
            {
                tracing::debug!(
                    declaration = %declaration,
                    error = %error,
                    "ignoring malformed declaration nothing annotated depends on"
                );
                false
            }
            _ => true,
        })
        .collect()
}

/// Run one strategy for one declaration.
fn dispatch(ctx: &GenerationContext<'_>, declaration: &Declaration, strategy: Strategy) -> Generated {
    tracing::debug!(declaration = %declaration.name, strategy = %strategy, "running strategy");
    match strategy {
        Strategy::AutoFailingMock => mock::failing_mock(ctx, declaration),
        Strategy::AutoStub => mock::stub(ctx, declaration),
        Strategy::AutoMappableFromDto => mapper::generate(ctx, declaration),
        Strategy::DescribesFeature => composition::generate(ctx, declaration),
        Strategy::Autoregister => Ok(Vec::new()),
    }
}
