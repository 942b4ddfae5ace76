#![allow(non_snake_case)]

use super::*;
use annogen::Strategy;
use std::fs;
use tempfile::TempDir;

#[test]
fn load___no_path___yields_defaults() {
    let config = load(None).unwrap();

    assert_eq!(config, GeneratorConfig::default());
}

#[test]
fn load___toml_file___is_parsed() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("annogen.toml");
    fs::write(
        &path,
        "strategies = [\"autoStub\"]\nfail_on_ambiguous_registration = false\n\n[fixtures]\nSomething = \"Something()\"\n",
    )
    .unwrap();

    let config = load(Some(&path)).unwrap();

    assert!(config.is_enabled(Strategy::AutoStub));
    assert!(!config.is_enabled(Strategy::AutoFailingMock));
    assert!(!config.fail_on_ambiguous_registration);
    assert_eq!(config.fixtures["Something"], "Something()");
}

#[test]
fn load___invalid_file___names_the_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("annogen.toml");
    fs::write(&path, "marker_prefix = \"\"\n").unwrap();

    let error = load(Some(&path)).unwrap_err();

    assert!(error.to_string().contains("annogen.toml"));
}

#[test]
fn run___missing_file___is_an_error() {
    let dir = TempDir::new().unwrap();

    assert!(run(Some(dir.path().join("absent.toml"))).is_err());
}
