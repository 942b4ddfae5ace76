#![allow(non_snake_case)]

use super::*;
use annogen_core::{Declaration, DeclarationKind, Enumeration, ParsedDeclaration};

fn units() -> Vec<SourceUnit> {
    (0..6)
        .map(|i| SourceUnit::new(format!("Unit{i}.swift"), format!("struct Type{i} {{}}")))
        .collect()
}

#[test]
fn parse_units___many_workers___preserve_unit_order() {
    let source = SwiftSource::new("sourcery:");

    let outcome = parse_units(&source, &units(), 4);

    let names: Vec<_> = outcome
        .declarations
        .iter()
        .map(|d| d.declaration.name.clone())
        .collect();
    assert_eq!(
        names,
        vec!["Type0", "Type1", "Type2", "Type3", "Type4", "Type5"]
    );
    assert_eq!(outcome.declarations[3].declaration.unit, "Unit3.swift");
}

#[test]
fn parse_units___worker_count___does_not_change_outcome() {
    let source = SwiftSource::new("sourcery:");

    let sequential = parse_units(&source, &units(), 1);
    let parallel = parse_units(&source, &units(), 3);

    assert_eq!(sequential, parallel);
}

#[test]
fn parse_units___errors___are_merged() {
    let source = SwiftSource::new("sourcery:");
    let units = vec![
        SourceUnit::new("Bad.swift", "protocol P {\n  var x: Int { get }\n}"),
        SourceUnit::new("Good.swift", "enum E { case a }"),
    ];

    let outcome = parse_units(&source, &units, 2);

    assert_eq!(outcome.errors.len(), 1);
    assert_eq!(outcome.declarations.len(), 1);
}

struct FixedSource;

impl DeclarationSource for FixedSource {
    fn parse(&self, unit: &SourceUnit) -> ParseOutcome {
        ParseOutcome {
            declarations: vec![ParsedDeclaration {
                declaration: Declaration::new(
                    unit.name.clone(),
                    DeclarationKind::Enumeration(Enumeration::default()),
                ),
                markers: Vec::new(),
            }],
            ..ParseOutcome::default()
        }
    }
}

#[test]
fn parse_units___custom_source___is_used() {
    let outcome = parse_units(&FixedSource, &[SourceUnit::new("Only", "")], 1);

    assert_eq!(outcome.declarations[0].declaration.name, "Only");
}

#[test]
fn SourceUnit___display___shows_name_and_size() {
    assert_eq!(SourceUnit::new("A.swift", "abc").to_string(), "A.swift (3 bytes)");
}
