//! Shared setup for generator unit tests.

#![allow(clippy::unwrap_used)]

use crate::engine::GenerationContext;
use crate::resolver::{Resolution, Resolver};
use annogen_core::{Corpus, Declaration, GenerationError, GeneratorConfig};
use annogen_parser::parse_source;
use std::collections::BTreeMap;

/// A parsed and resolved corpus, owning everything a context borrows.
pub struct Setup {
    pub corpus: Corpus,
    pub config: GeneratorConfig,
    pub fixtures: BTreeMap<String, String>,
    pub resolutions: BTreeMap<String, Resolution>,
    pub errors: Vec<GenerationError>,
}

impl Setup {
    pub fn new(source: &str) -> Self {
        Self::with_config(source, GeneratorConfig::default())
    }

    pub fn with_config(source: &str, config: GeneratorConfig) -> Self {
        let outcome = parse_source("Test.swift", source, &config.marker_prefix);
        assert!(outcome.errors.is_empty(), "{:?}", outcome.errors);

        let (corpus, mut errors) = Corpus::build(outcome.declarations);
        let (resolutions, mut resolve_errors) = Resolver::new(&corpus, &config).resolve_all();
        errors.append(&mut resolve_errors);

        Self {
            corpus,
            config,
            fixtures: BTreeMap::new(),
            resolutions: resolutions
                .into_iter()
                .map(|r| (r.declaration.clone(), r))
                .collect(),
            errors,
        }
    }

    pub fn with_provided(mut self, ty: &str, expression: &str) -> Self {
        self.fixtures.insert(ty.to_string(), expression.to_string());
        self
    }

    pub fn ctx(&self) -> GenerationContext<'_> {
        GenerationContext {
            corpus: &self.corpus,
            config: &self.config,
            fixtures: &self.fixtures,
            resolutions: &self.resolutions,
        }
    }

    pub fn declaration(&self, name: &str) -> &Declaration {
        self.corpus.get(name).unwrap()
    }
}
