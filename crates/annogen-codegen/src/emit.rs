//! Output unit assembly.
//!
//! Artifacts are grouped by their strategy's output unit. Each unit starts
//! with [`HEADER`] and the sorted union of its artifacts' imports, followed
//! by the artifacts themselves: referenced declarations first, otherwise in
//! (declaration, strategy) order.

use annogen_core::GeneratedArtifact;
use std::collections::{BTreeMap, BTreeSet};

/// First line of every output unit.
pub const HEADER: &str = "// Generated by annogen. Do not edit.";

/// Render every output unit that has at least one artifact.
pub fn emit(artifacts: &[GeneratedArtifact]) -> BTreeMap<String, String> {
    let mut units: BTreeMap<&'static str, Vec<&GeneratedArtifact>> = BTreeMap::new();
    for artifact in artifacts {
        units
            .entry(artifact.strategy.output_unit())
            .or_default()
            .push(artifact);
    }

    units
        .into_iter()
        .map(|(unit, group)| {
            tracing::debug!(unit, artifacts = group.len(), "emitting unit");
            (unit.to_string(), render(&group))
        })
        .collect()
}

/// Render one output unit.
pub fn render(artifacts: &[&GeneratedArtifact]) -> String {
    let imports: BTreeSet<&str> = artifacts
        .iter()
        .flat_map(|a| a.imports.iter().map(String::as_str))
        .collect();

    let mut out = String::from(HEADER);
    out.push('\n');
    if !imports.is_empty() {
        out.push('\n');
        for module in imports {
            out.push_str(&format!("import {module}\n"));
        }
    }

    for artifact in order(artifacts) {
        out.push('\n');
        out.push_str(&artifact.text());
        if !out.ends_with('\n') {
            out.push('\n');
        }
    }
    out
}

/// Topological order over references within the unit, ties broken by sort
/// key. Artifacts caught in a reference cycle follow in sort key order.
pub fn order<'a>(artifacts: &[&'a GeneratedArtifact]) -> Vec<&'a GeneratedArtifact> {
    let index: BTreeMap<&str, usize> = artifacts
        .iter()
        .enumerate()
        .map(|(i, a)| (a.declaration.as_str(), i))
        .collect();

    let mut unmet = vec![0usize; artifacts.len()];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); artifacts.len()];
    for (i, artifact) in artifacts.iter().enumerate() {
        for name in &artifact.references {
            if let Some(&j) = index.get(name.as_str())
                && j != i
            {
                unmet[i] += 1;
                dependents[j].push(i);
            }
        }
    }

    let mut ready: BTreeSet<((&str, &str), usize)> = artifacts
        .iter()
        .enumerate()
        .filter(|(i, _)| unmet[*i] == 0)
        .map(|(i, a)| (a.sort_key(), i))
        .collect();

    let mut ordered = Vec::with_capacity(artifacts.len());
    while let Some((_, i)) = ready.pop_first() {
        ordered.push(artifacts[i]);
        for &d in &dependents[i] {
            unmet[d] -= 1;
            if unmet[d] == 0 {
                ready.insert((artifacts[d].sort_key(), d));
            }
        }
    }

    if ordered.len() < artifacts.len() {
        let mut rest: Vec<usize> = (0..artifacts.len()).filter(|&i| unmet[i] > 0).collect();
        rest.sort_by_key(|&i| artifacts[i].sort_key());
        tracing::warn!(
            artifacts = ?rest.iter().map(|&i| &artifacts[i].declaration).collect::<Vec<_>>(),
            "reference cycle between artifacts, falling back to name order"
        );
        ordered.extend(rest.into_iter().map(|i| artifacts[i]));
    }

    ordered
}
