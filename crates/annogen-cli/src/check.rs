//! Configuration loading and the check-config command

use annogen::GeneratorConfig;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Load a configuration file, or the defaults when none is given.
pub fn load(path: Option<&Path>) -> Result<GeneratorConfig> {
    match path {
        Some(path) => GeneratorConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration: {}", path.display())),
        None => Ok(GeneratorConfig::default()),
    }
}

/// Check command implementation
pub fn run(config_path: Option<PathBuf>) -> Result<ExitCode> {
    let path = config_path.unwrap_or_else(|| PathBuf::from("annogen.toml"));

    println!("Checking configuration: {}", path.display());

    let config = load(Some(&path))?;
    let strategies: Vec<&str> = config.strategies.iter().map(|s| s.name()).collect();

    println!("✓ Strategies: {}", strategies.join(", "));
    println!("✓ Fixtures: {}", config.fixtures.len());
    println!("✓ Marker prefix: {}", config.marker_prefix);
    println!("✓ DTO suffixes: {}", config.naming.dto_suffixes.join(", "));
    println!("\nConfiguration is valid!");

    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
#[path = "check/check_tests.rs"]
mod check_tests;
