//! Immutable declaration corpus
//!
//! The corpus is built once, after every source unit has been parsed, and is
//! only read afterwards. Cross-declaration lookups (DTO counterparts,
//! registration candidates, composed features) all go through it.

use crate::error::GenerationError;
use crate::model::{Declaration, ParsedDeclaration};
use std::collections::BTreeMap;

/// Read-only lookup table over every declaration in a run
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    entries: Vec<ParsedDeclaration>,
    by_name: BTreeMap<String, usize>,
}

impl Corpus {
    /// Build a corpus, assigning declaration positions in input order.
    ///
    /// A declaration whose name was already taken is rejected with
    /// `MalformedDeclaration`; the first one wins.
    pub fn build(parsed: Vec<ParsedDeclaration>) -> (Self, Vec<GenerationError>) {
        let mut corpus = Corpus::default();
        let mut errors = Vec::new();

        for mut entry in parsed {
            let name = entry.declaration.name.clone();
            if let Some(&existing) = corpus.by_name.get(&name) {
                let first = &corpus.entries[existing].declaration;
                errors.push(GenerationError::MalformedDeclaration {
                    declaration: name,
                    member: None,
                    reason: format!(
                        "duplicate declaration (first declared in `{}` at line {})",
                        first.unit, first.line
                    ),
                    line: entry.declaration.line,
                });
                continue;
            }

            entry.declaration.position = corpus.entries.len();
            corpus.by_name.insert(name, corpus.entries.len());
            corpus.entries.push(entry);
        }

        tracing::debug!(
            declarations = corpus.entries.len(),
            rejected = errors.len(),
            "corpus built"
        );

        (corpus, errors)
    }

    pub fn get(&self, name: &str) -> Option<&Declaration> {
        self.by_name
            .get(name)
            .map(|&index| &self.entries[index].declaration)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Nested declaration `parent.child`
    pub fn nested(&self, parent: &str, child: &str) -> Option<&Declaration> {
        self.get(&format!("{parent}.{child}"))
    }

    /// Declarations in corpus order
    pub fn declarations(&self) -> impl Iterator<Item = &Declaration> {
        self.entries.iter().map(|entry| &entry.declaration)
    }

    /// Declarations with their markers, in corpus order
    pub fn entries(&self) -> &[ParsedDeclaration] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
