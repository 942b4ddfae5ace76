//! Input path expansion and reading

use annogen::SourceUnit;
use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Expand files and directories into Swift source paths.
///
/// Files are taken as given; directories contribute every `*.swift` file
/// below them in sorted order. Paths listed twice are read once.
pub fn collect_paths(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut seen = BTreeSet::new();
    let mut paths = Vec::new();

    for input in inputs {
        if input.is_dir() {
            let walker = WalkDir::new(input).sort_by_file_name();
            for entry in walker {
                let entry = entry
                    .with_context(|| format!("Failed to read directory {}", input.display()))?;
                if entry.file_type().is_file() && is_swift(entry.path()) {
                    let path = entry.into_path();
                    if seen.insert(path.clone()) {
                        paths.push(path);
                    }
                }
            }
        } else if input.is_file() {
            if seen.insert(input.clone()) {
                paths.push(input.clone());
            }
        } else {
            anyhow::bail!("Input not found: {}", input.display());
        }
    }

    Ok(paths)
}

/// Read every input into a source unit named after its path.
pub fn read_units(inputs: &[PathBuf]) -> Result<Vec<SourceUnit>> {
    let paths = collect_paths(inputs)?;
    if paths.is_empty() {
        anyhow::bail!("No Swift sources found");
    }

    paths
        .iter()
        .map(|path| {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            tracing::debug!(path = %path.display(), bytes = text.len(), "read source");
            Ok(SourceUnit::new(path.display().to_string(), text))
        })
        .collect()
}

fn is_swift(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "swift")
}
