//! JSON dump of parsed declarations and resolutions

use crate::{check, inputs};
use annogen::Engine;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

pub fn run(inputs: &[PathBuf], config: Option<&Path>, jobs: Option<usize>) -> Result<ExitCode> {
    let mut config = check::load(config)?;
    if let Some(jobs) = jobs {
        config.jobs = jobs;
    }

    let units = inputs::read_units(inputs)?;
    let inspection = Engine::new(config).inspect(&units);
    let json = serde_json::to_string_pretty(&inspection).context("Failed to serialize inspection")?;
    println!("{json}");

    if inspection.errors.is_empty() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
