#![allow(non_snake_case)]

use super::*;
use annogen_parser::parse_source;
use test_case::test_case;

fn corpus(source: &str) -> Corpus {
    let outcome = parse_source("Test.swift", source, "sourcery:");
    assert!(outcome.errors.is_empty(), "{:?}", outcome.errors);
    Corpus::build(outcome.declarations).0
}

fn resolve_first(source: &str, config: &GeneratorConfig) -> (Option<Resolution>, Vec<GenerationError>) {
    let corpus = corpus(source);
    let resolver = Resolver::new(&corpus, config);
    resolver.resolve(&corpus.entries()[0])
}

fn reason(errors: &[GenerationError]) -> String {
    match errors.first() {
        Some(GenerationError::UnresolvableStrategy { reason, .. }) => reason.clone(),
        other => panic!("expected unresolvable strategy, got {other:?}"),
    }
}

#[test]
fn annotations___aliases_and_unknown_markers() {
    let markers = vec![
        "AsyncAutoFailing".to_string(),
        "swiftDepAutoregister".to_string(),
        "somethingElse = 3".to_string(),
    ];

    let tags = annotations("X", &markers);

    assert_eq!(
        tags,
        BTreeSet::from([Annotation::AutoFailingMock, Annotation::Autoregister])
    );
}

#[test]
fn resolve___unannotated___yields_nothing() {
    let (resolution, errors) = resolve_first("struct DoNotRegister {}", &GeneratorConfig::default());

    assert!(resolution.is_none());
    assert!(errors.is_empty());
}

#[test]
fn resolve___protocol_with_mock_tags___runs_both() {
    let (resolution, errors) = resolve_first(
        "// sourcery: AutoStub, AutoFailingMock\nprotocol ServiceProtocol {}",
        &GeneratorConfig::default(),
    );

    assert!(errors.is_empty());
    assert_eq!(
        resolution.unwrap().strategies,
        vec![Strategy::AutoFailingMock, Strategy::AutoStub]
    );
}

#[test_case("// sourcery: autoStub\nstruct Plain {}", "autoStub", "expected a protocol, found a struct" ; "stub on struct")]
#[test_case("// sourcery: autoFailingMock\nenum E { case a }", "autoFailingMock", "expected a protocol, found a enum" ; "mock on enum")]
#[test_case("// sourcery: autoregister\nenum E { case a }", "autoregister", "expected a protocol or a concrete type, found an enum" ; "register enum")]
#[test_case("// sourcery: describesTCAFeature\nclass Feature {}", "describesFeature", "expected a struct, found a class" ; "feature on class")]
#[test_case("// sourcery: AutoMappable\nprotocol P {}", "autoMappableFromDTO", "expected a struct or enum, found a protocol" ; "mapper on protocol")]
fn resolve___unmet_precondition___is_unresolvable(source: &str, strategy: &str, expected: &str) {
    let (resolution, errors) = resolve_first(source, &GeneratorConfig::default());

    assert!(resolution.unwrap().strategies.is_empty());
    match &errors[0] {
        GenerationError::UnresolvableStrategy {
            strategy: actual,
            reason,
            ..
        } => {
            assert_eq!(actual, strategy);
            assert_eq!(reason, expected);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn resolve___mappable_with_counterpart___records_it() {
    let (resolution, errors) = resolve_first(
        "// sourcery: AutoMappable\nstruct MyObject {}\nstruct MyObjectDTO {}",
        &GeneratorConfig::default(),
    );

    assert!(errors.is_empty());
    let resolution = resolution.unwrap();
    assert!(resolution.runs(Strategy::AutoMappableFromDto));
    assert_eq!(resolution.counterpart.as_deref(), Some("MyObjectDTO"));
}

#[test]
fn resolve___second_dto_suffix___is_tried() {
    let (resolution, _) = resolve_first(
        "// sourcery: AutoMappable\nstruct MyObject {}\nstruct MyObjectDto {}",
        &GeneratorConfig::default(),
    );

    assert_eq!(resolution.unwrap().counterpart.as_deref(), Some("MyObjectDto"));
}

#[test]
fn resolve___missing_counterpart___lists_candidates() {
    let (_, errors) = resolve_first(
        "// sourcery: AutoMappable\nstruct MyObject {}",
        &GeneratorConfig::default(),
    );

    assert_eq!(
        reason(&errors),
        "no counterpart declaration found (looked for MyObjectDTO, MyObjectDto)"
    );
}

#[test]
fn resolve___counterpart_of_other_form___is_unresolvable() {
    let (_, errors) = resolve_first(
        "// sourcery: AutoMappable\nstruct Status {}\nenum StatusDTO { case a }",
        &GeneratorConfig::default(),
    );

    assert_eq!(
        reason(&errors),
        "counterpart `StatusDTO` is a enum, expected a struct"
    );
}

#[test]
fn resolve___enum_with_payload___is_not_mappable() {
    let (_, errors) = resolve_first(
        "// sourcery: AutoMappable\nenum Event { case tap(Int) }\nenum EventDTO { case tap(Int) }",
        &GeneratorConfig::default(),
    );

    assert!(reason(&errors).contains("associated values"));
}

#[test]
fn resolve___composition_without_feature___is_unresolvable() {
    let (resolution, errors) = resolve_first(
        "// sourcery: containsComposition\nstruct Lonely {}",
        &GeneratorConfig::default(),
    );

    assert!(resolution.unwrap().has(Annotation::ContainsComposition));
    assert_eq!(reason(&errors), "requires `describesFeature`");
}

#[test]
fn resolve___disabled_strategy___is_dropped_silently() {
    let config = GeneratorConfig::default().with_strategies([Strategy::AutoStub]);

    let (resolution, errors) = resolve_first(
        "// sourcery: autoStub, autoFailingMock\nprotocol P {}",
        &config,
    );

    assert!(errors.is_empty());
    let resolution = resolution.unwrap();
    assert_eq!(resolution.strategies, vec![Strategy::AutoStub]);
    assert!(resolution.has(Annotation::AutoFailingMock));
}

#[test]
fn resolve_all___keeps_corpus_order() {
    let corpus = corpus(
        "// sourcery: autoregister\nstruct B {}\nstruct Skip {}\n// sourcery: autoStub\nprotocol A {}",
    );
    let config = GeneratorConfig::default();

    let (resolutions, errors) = Resolver::new(&corpus, &config).resolve_all();

    assert!(errors.is_empty());
    let names: Vec<_> = resolutions.iter().map(|r| r.declaration.as_str()).collect();
    assert_eq!(names, vec!["B", "A"]);
}
