//! The generate command

use crate::{check, inputs};
use annogen::{Engine, GenerationReport, Strategy};
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

pub struct Options {
    pub inputs: Vec<PathBuf>,
    pub config: Option<PathBuf>,
    pub jobs: Option<usize>,
    pub output: Option<PathBuf>,
    pub strategies: Vec<Strategy>,
    pub stdout: bool,
}

pub fn run(options: Options) -> Result<ExitCode> {
    let mut config = check::load(options.config.as_deref())?;
    if !options.strategies.is_empty() {
        config = config.with_strategies(options.strategies);
    }
    if let Some(jobs) = options.jobs {
        config.jobs = jobs;
    }

    let units = inputs::read_units(&options.inputs)?;
    tracing::info!(units = units.len(), "read source units");

    let report = Engine::new(config).generate(&units);
    print_problems(&report);

    if options.stdout {
        for (name, text) in &report.outputs {
            println!("// ---- {name} ----");
            print!("{text}");
        }
    } else if let Some(dir) = &options.output {
        let written = write_outputs(dir, &report.outputs)?;
        println!("✓ Wrote {} file(s) to {}", written.len(), dir.display());
    }

    if !report.is_success() {
        eprintln!("{} error(s)", report.errors.len());
    }
    Ok(ExitCode::from(u8::try_from(report.exit_code()).unwrap_or(1)))
}

fn print_problems(report: &GenerationReport) {
    for line in problem_lines(report) {
        eprintln!("{line}");
    }
}

fn problem_lines(report: &GenerationReport) -> Vec<String> {
    let notes = report.diagnostics().into_iter().map(|d| format!("note: {d}"));
    let errors = report.errors.iter().map(|error| {
        format!(
            "error[E{:03}] {}: {error}",
            error.error_code(),
            error.category()
        )
    });
    notes.chain(errors).collect()
}

/// Write each output unit into `dir`, creating it if needed.
pub fn write_outputs(dir: &Path, outputs: &BTreeMap<String, String>) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

    let mut written = Vec::with_capacity(outputs.len());
    for (name, text) in outputs {
        let path = dir.join(name);
        std::fs::write(&path, text)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::debug!(path = %path.display(), bytes = text.len(), "wrote output unit");
        written.push(path);
    }
    Ok(written)
}
