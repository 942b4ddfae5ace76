//! Source units and batch parsing

use crate::parser::{ParseOutcome, parse_source};
use annogen_core::parallel::map_ordered;
use std::fmt;

/// One named input text, usually a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUnit {
    pub name: String,
    pub text: String,
}

impl SourceUnit {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

impl fmt::Display for SourceUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} bytes)", self.name, self.text.len())
    }
}

/// Something that turns a source unit into declarations.
///
/// The Swift reader is the only implementation shipped; the seam exists so
/// the engine can be driven from pre-built declaration sets in tests.
pub trait DeclarationSource: Sync {
    fn parse(&self, unit: &SourceUnit) -> ParseOutcome;
}

/// Reader for the Swift declaration subset.
#[derive(Debug, Clone)]
pub struct SwiftSource {
    marker_prefix: String,
}

impl SwiftSource {
    pub fn new(marker_prefix: impl Into<String>) -> Self {
        Self {
            marker_prefix: marker_prefix.into(),
        }
    }

    pub fn marker_prefix(&self) -> &str {
        &self.marker_prefix
    }
}

impl DeclarationSource for SwiftSource {
    fn parse(&self, unit: &SourceUnit) -> ParseOutcome {
        parse_source(&unit.name, &unit.text, &self.marker_prefix)
    }
}

/// Parse every unit, in parallel, merging results in input order.
pub fn parse_units(
    source: &dyn DeclarationSource,
    units: &[SourceUnit],
    jobs: usize,
) -> ParseOutcome {
    let outcomes = map_ordered(units, jobs, |unit| source.parse(unit));

    let mut merged = ParseOutcome::default();
    for outcome in outcomes {
        merged.merge(outcome);
    }

    tracing::debug!(
        units = units.len(),
        declarations = merged.declarations.len(),
        errors = merged.errors.len(),
        "parsed source units"
    );
    merged
}

#[cfg(test)]
#[path = "source/source_tests.rs"]
mod source_tests;
