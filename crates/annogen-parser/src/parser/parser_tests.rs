#![allow(non_snake_case)]

use super::*;
use test_case::test_case;

const PREFIX: &str = "sourcery:";

fn parse(source: &str) -> ParseOutcome {
    parse_source("Sample.swift", source, PREFIX)
}

fn only(outcome: &ParseOutcome) -> &ParsedDeclaration {
    assert!(outcome.errors.is_empty(), "errors: {:?}", outcome.errors);
    assert_eq!(outcome.declarations.len(), 1);
    &outcome.declarations[0]
}

fn malformed_reason(outcome: &ParseOutcome) -> (String, Option<String>, String) {
    match outcome.errors.first() {
        Some(GenerationError::MalformedDeclaration {
            declaration,
            member,
            reason,
            ..
        }) => (declaration.clone(), member.clone(), reason.clone()),
        other => panic!("expected malformed declaration, got {other:?}"),
    }
}

// ============================================================================
// Contracts
// ============================================================================

#[test]
fn parse_source___async_service_protocol___extracts_methods() {
    let outcome = parse(
        r#"
protocol SomeServiceProtocol {
    func getSomething(_ id: String) async throws -> Something
    func getArray() async throws -> [String]
    func getDictionary() async throws -> [String: String]
    func postSomething() async throws
}"#,
    );

    let parsed = only(&outcome);
    let contract = parsed.declaration.as_contract().unwrap();
    assert_eq!(parsed.declaration.name, "SomeServiceProtocol");
    assert_eq!(parsed.declaration.line, 2);
    assert_eq!(contract.methods.len(), 4);

    let get = &contract.methods[0];
    assert_eq!(get.selector(), "getSomething(_:)");
    assert!(get.is_async && get.is_throwing);
    assert_eq!(get.params[0].name, "id");
    assert_eq!(get.params[0].label, None);
    assert_eq!(get.ret, TypeRef::named("Something"));

    assert_eq!(contract.methods[1].ret, TypeRef::sequence(TypeRef::primitive("String")));
    assert_eq!(
        contract.methods[2].ret,
        TypeRef::mapping(TypeRef::primitive("String"), TypeRef::primitive("String"))
    );
    assert!(contract.methods[3].ret.is_void());
}

#[test]
fn parse_source___protocol_initializer___is_recorded() {
    let outcome = parse(
        "protocol SomeServiceInterface {\n    init(something: String)\n    func postNoThrow() async\n}",
    );

    let contract = only(&outcome).declaration.as_contract().unwrap().clone();
    assert_eq!(contract.initializers.len(), 1);
    assert_eq!(contract.initializers[0].selector(), "init(something:)");
    assert!(contract.methods[0].is_async);
    assert!(!contract.methods[0].is_throwing);
}

#[test]
fn parse_source___parameter_labels___are_distinguished() {
    let outcome = parse(
        "protocol P {\n  func load(from url: URL, page: Int = 1, _ extra: inout [Int])\n}",
    );

    let contract = only(&outcome).declaration.as_contract().unwrap().clone();
    let params = &contract.methods[0].params;
    assert_eq!(params[0].label.as_deref(), Some("from"));
    assert_eq!(params[0].name, "url");
    assert_eq!(params[1].label.as_deref(), Some("page"));
    assert_eq!(params[1].default.as_deref(), Some("1"));
    assert_eq!(params[2].label, None);
    assert!(params[2].is_inout);
    assert_eq!(contract.methods[0].selector(), "load(from:page:_:)");
}

#[test]
fn parse_source___typed_throws___is_throwing() {
    let outcome = parse("protocol P {\n  func run() throws(RunError) -> Int\n}");

    let contract = only(&outcome).declaration.as_contract().unwrap().clone();
    assert!(contract.methods[0].is_throwing);
    assert_eq!(contract.methods[0].ret, TypeRef::primitive("Int"));
}

#[test]
fn parse_source___protocol_inheritance___is_recorded() {
    let outcome = parse("public protocol P: AnyObject, Sendable {}");

    assert_eq!(
        only(&outcome).declaration.conformances(),
        &["AnyObject".to_string(), "Sendable".to_string()]
    );
}

#[test_case("var name: String { get }", "property requirements are not supported" ; "property")]
#[test_case("associatedtype Item", "associated types are not supported" ; "associated type")]
#[test_case("subscript(index: Int) -> Int { get }", "subscript requirements are not supported" ; "subscript")]
#[test_case("static func make() -> Self", "static requirements are not supported" ; "static")]
#[test_case("func map<T>(_ value: T) -> T", "generic methods are not supported" ; "generic method")]
#[test_case("func run(_ f: () throws -> Void) rethrows", "rethrowing members are not supported" ; "rethrows")]
#[test_case("init?(raw: String)", "failable initializers are not supported" ; "failable init")]
fn parse_source___unsupported_protocol_member___is_malformed(member: &str, reason: &str) {
    let outcome = parse(&format!("protocol Service {{\n  {member}\n}}"));

    assert!(outcome.declarations.is_empty());
    let (declaration, member_name, actual) = malformed_reason(&outcome);
    assert_eq!(declaration, "Service");
    assert!(member_name.is_some());
    assert_eq!(actual, reason);
}

#[test]
fn parse_source___variadic_parameter___is_malformed() {
    let outcome = parse("protocol P {\n  func log(_ items: String...)\n}");

    let (_, member, reason) = malformed_reason(&outcome);
    assert_eq!(member.as_deref(), Some("func log"));
    assert!(reason.contains("variadic"));
}

#[test]
fn parse_source___malformed_member___reports_its_line() {
    let outcome = parse("protocol P {\n  func ok()\n  var broken: Int { get }\n}");

    match &outcome.errors[0] {
        GenerationError::MalformedDeclaration { line, member, .. } => {
            assert_eq!(*line, 3);
            assert_eq!(member.as_deref(), Some("var broken"));
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn parse_source___generic_declaration___is_malformed() {
    let outcome = parse("struct Box<T> {\n  let value: T\n}\nstruct After {}");

    let (declaration, _, reason) = malformed_reason(&outcome);
    assert_eq!(declaration, "Box");
    assert!(reason.contains("generic"));
    assert_eq!(outcome.declarations.len(), 1);
    assert_eq!(outcome.declarations[0].declaration.name, "After");
}

#[test]
fn parse_source___error_in_one_declaration___keeps_the_rest() {
    let outcome = parse(
        "protocol Broken {\n  associatedtype X\n}\n\nprotocol Fine {\n  func a()\n}\n",
    );

    assert_eq!(outcome.errors.len(), 1);
    assert_eq!(outcome.declarations.len(), 1);
    assert_eq!(outcome.declarations[0].declaration.name, "Fine");
}

// ============================================================================
// Value types
// ============================================================================

#[test]
fn parse_source___struct_fields___keep_types_and_defaults() {
    let outcome = parse(
        r#"
struct ComposedFeature: Equatable {
    var name: String = ""
    var description: String? = nil
    var numberOfItems: Int = 0
    var child: Child1.State = .init()
    let id: String
}"#,
    );

    let value = only(&outcome).declaration.as_value_type().unwrap().clone();
    assert_eq!(value.form, ValueForm::Struct);
    assert_eq!(value.conformances, vec!["Equatable".to_string()]);
    assert_eq!(value.fields.len(), 5);
    assert_eq!(value.fields[0].default.as_deref(), Some("\"\""));
    assert_eq!(
        value.fields[1].ty,
        TypeRef::optional(TypeRef::primitive("String"))
    );
    assert_eq!(value.fields[1].default.as_deref(), Some("nil"));
    assert_eq!(value.fields[3].ty, TypeRef::named("Child1.State"));
    assert_eq!(value.fields[3].default.as_deref(), Some(".init()"));
    assert!(value.fields[3].is_mutable);
    assert!(!value.fields[4].is_mutable);
    assert_eq!(value.fields[4].default, None);
}

#[test]
fn parse_source___default_with_trailing_comment___excludes_comment() {
    let outcome = parse("struct A {\n  var count: Int = 1 + 2 // starting value\n}");

    let value = only(&outcome).declaration.as_value_type().unwrap().clone();
    assert_eq!(value.fields[0].default.as_deref(), Some("1 + 2"));
}

#[test]
fn parse_source___multiline_default___follows_member_access() {
    let outcome = parse("struct A {\n  var items: [Int] = [1, 2]\n    .sorted()\n  let b: Int\n}");

    let value = only(&outcome).declaration.as_value_type().unwrap().clone();
    assert_eq!(value.fields.len(), 2);
    assert_eq!(
        value.fields[0].default.as_deref(),
        Some("[1, 2]\n    .sorted()")
    );
}

#[test]
fn parse_source___computed_and_static_members___are_skipped() {
    let outcome = parse(
        r#"
struct A {
    static let shared = A()
    var total: Int { 42 }
    var name: String {
        get { "x" }
    }
    lazy var cache: [Int] = []
    @Dependency(\.client) var client
    var observed: Int = 0 {
        didSet { print(observed) }
    }
    let kept: Bool
}"#,
    );

    let value = only(&outcome).declaration.as_value_type().unwrap().clone();
    let names: Vec<_> = value.fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["observed", "kept"]);
    assert_eq!(value.fields[0].default.as_deref(), Some("0"));
}

#[test]
fn parse_source___closure_field___parses_function_type() {
    let outcome = parse(
        "struct SomeDependencyStruct {\n    let doSomething: () async throws -> String \n}",
    );

    let value = only(&outcome).declaration.as_value_type().unwrap().clone();
    match &value.fields[0].ty {
        TypeRef::Function(function) => {
            assert!(function.params.is_empty());
            assert!(function.is_async && function.is_throwing);
            assert_eq!(*function.ret, TypeRef::primitive("String"));
        }
        other => panic!("expected function type, got {other:?}"),
    }
}

#[test]
fn parse_source___methods_and_inits___record_signatures_and_skip_bodies() {
    let outcome = parse(
        r#"
final class Client {
    private(set) var calls: Int = 0
    init(base: URL) {
        self.base = base
    }
    func fetch(_ id: String) async throws -> Item {
        let value = { id in id }
        return value
    }
    mutating func reset() { calls = 0 }
}"#,
    );

    let value = only(&outcome).declaration.as_value_type().unwrap().clone();
    assert_eq!(value.form, ValueForm::Class);
    assert_eq!(value.fields.len(), 1);
    assert_eq!(value.initializers[0].selector(), "init(base:)");
    assert_eq!(value.methods.len(), 2);
    assert_eq!(value.methods[0].selector(), "fetch(_:)");
    assert_eq!(value.methods[1].name, "reset");
}

#[test]
fn parse_source___generic_method_on_struct___is_left_out() {
    let outcome = parse("struct A {\n  func map<T>(_ f: (Int) -> T) -> T { f(1) }\n  let x: Int\n}");

    let value = only(&outcome).declaration.as_value_type().unwrap().clone();
    assert!(value.methods.is_empty());
    assert_eq!(value.fields.len(), 1);
}

#[test]
fn parse_source___untyped_property___is_malformed() {
    let outcome = parse("struct A {\n  var count = 0\n}");

    let (declaration, member, reason) = malformed_reason(&outcome);
    assert_eq!(declaration, "A");
    assert_eq!(member.as_deref(), Some("var count"));
    assert!(reason.contains("explicit type"));
}

#[test]
fn parse_source___multiple_bindings___is_malformed() {
    let outcome = parse("struct A {\n  var a, b: Int\n}");

    let (_, _, reason) = malformed_reason(&outcome);
    assert!(reason.contains("multiple bindings"));
}

#[test]
fn parse_source___actor___is_value_type_form() {
    let outcome = parse("actor Store {\n  var count: Int = 0\n}");

    let value = only(&outcome).declaration.as_value_type().unwrap().clone();
    assert_eq!(value.form, ValueForm::Actor);
}

// ============================================================================
// Enumerations and nesting
// ============================================================================

#[test]
fn parse_source___enum_cases___are_collected() {
    let outcome = parse(
        "enum Status: String {\n  case idle = \"idle\", running\n  case completed\n  var label: String { rawValue }\n}",
    );

    let enumeration = only(&outcome).declaration.as_enumeration().unwrap().clone();
    assert_eq!(enumeration.cases, vec!["idle", "running", "completed"]);
    assert!(!enumeration.has_associated_values);
    assert_eq!(enumeration.conformances, vec!["String".to_string()]);
}

#[test]
fn parse_source___enum_with_payload___flags_associated_values() {
    let outcome = parse("enum Action {\n  case child(Child.Action)\n  case tapped\n}");

    let enumeration = only(&outcome).declaration.as_enumeration().unwrap().clone();
    assert!(enumeration.has_associated_values);
    assert_eq!(enumeration.cases, vec!["child", "tapped"]);
}

#[test]
fn parse_source___nested_declarations___use_dotted_names() {
    let outcome = parse(
        r#"
struct Child1: Reducer {
    struct State: Equatable {}
    enum Action: Equatable {}
    func reduce(into state: inout State, action: Action) -> Effect<Action> { .none }
}"#,
    );

    assert!(outcome.errors.is_empty());
    let names: Vec<_> = outcome
        .declarations
        .iter()
        .map(|d| d.declaration.name.as_str())
        .collect();
    assert_eq!(names, vec!["Child1", "Child1.State", "Child1.Action"]);
    assert_eq!(
        outcome.declarations[1].declaration.parent.as_deref(),
        Some("Child1")
    );
    let reduce = &outcome.declarations[0]
        .declaration
        .as_value_type()
        .unwrap()
        .methods[0];
    assert!(reduce.params[0].is_inout);
    assert_eq!(reduce.params[0].label.as_deref(), Some("into"));
}

// ============================================================================
// Markers
// ============================================================================

#[test]
fn parse_source___markers___attach_to_next_declaration() {
    let outcome = parse(
        r#"
// sourcery: describesTCAFeature
// Some notes in between
// sourcery: containsComposition, extra
@MainActor
public struct ComposedFeature {}

struct Plain {}"#,
    );

    assert_eq!(
        outcome.declarations[0].markers,
        vec!["describesTCAFeature", "containsComposition", "extra"]
    );
    assert!(outcome.declarations[1].markers.is_empty());
}

#[test]
fn parse_source___intervening_statement___discards_markers() {
    let outcome = parse("// sourcery: autoStub\nimport Foundation\nprotocol P {}");

    assert!(outcome.declarations[0].markers.is_empty());
}

#[test]
fn parse_source___custom_prefix___is_honored() {
    let outcome = parse_source("A.swift", "// gen: autoStub\nprotocol P {}", "gen:");

    assert_eq!(outcome.declarations[0].markers, vec!["autoStub"]);
}

#[test]
fn parse_source___nested_marker___attaches_to_nested_declaration() {
    let outcome = parse("struct Outer {\n  // sourcery: autoStub\n  struct Inner {}\n  let x: Int\n}");

    assert_eq!(outcome.declarations[1].declaration.name, "Outer.Inner");
    assert_eq!(outcome.declarations[1].markers, vec!["autoStub"]);
}

// ============================================================================
// Top level
// ============================================================================

#[test]
fn parse_source___top_level_noise___is_skipped() {
    let outcome = parse(
        r#"
import Foundation
import ComposableArchitecture

let formatter = DateFormatter()
    .configured()

func helper() -> Int {
    return 1
}

extension Status: CustomStringConvertible {
    var description: String { "" }
}

enum Status {
    case idle
}"#,
    );

    let parsed = only(&outcome);
    assert_eq!(parsed.declaration.name, "Status");
    assert_eq!(parsed.declaration.unit, "Sample.swift");
}

#[test]
fn parse_source___lex_error___reports_unit() {
    let outcome = parse("struct A {\n  let s: String = \"oops\n}");

    let (declaration, member, reason) = malformed_reason(&outcome);
    assert_eq!(declaration, "Sample.swift");
    assert_eq!(member, None);
    assert!(reason.contains("unterminated"));
}

#[test]
fn parse_source___missing_body___is_malformed() {
    let outcome = parse("struct Dangling");

    let (declaration, _, reason) = malformed_reason(&outcome);
    assert_eq!(declaration, "Dangling");
    assert!(reason.contains("`{`"));
}

#[test]
fn parse_source___missing_body___keeps_following_annotated_declaration() {
    let outcome = parse(
        "struct Dangling\n\n// sourcery: autoStub\nprotocol ClockProtocol { func now() async throws -> Date }",
    );

    let (declaration, _, reason) = malformed_reason(&outcome);
    assert_eq!(declaration, "Dangling");
    assert!(reason.contains("expected `{`"), "{reason}");
    assert_eq!(outcome.declarations.len(), 1);
    let clock = &outcome.declarations[0];
    assert_eq!(clock.declaration.name, "ClockProtocol");
    assert_eq!(clock.markers, vec!["autoStub".to_string()]);
}

#[test]
fn parse_source___missing_body_after_conformance___keeps_next_declaration() {
    let outcome = parse("enum Broken: Int\n\nstruct Fine { let x: Int }");

    let (declaration, _, _) = malformed_reason(&outcome);
    assert_eq!(declaration, "Broken");
    assert_eq!(outcome.declarations.len(), 1);
    assert_eq!(outcome.declarations[0].declaration.name, "Fine");
}

#[test]
fn parse_source___conformances_across_lines___still_find_body() {
    let outcome = parse("struct A: Equatable,\n  Sendable // note\n{\n  let x: Int\n}");

    let value = only(&outcome).declaration.as_value_type().unwrap().clone();
    assert_eq!(value.conformances, vec!["Equatable", "Sendable"]);
}

#[test]
fn parse_source___deeply_nested_type___fails_only_its_declaration() {
    let depth = 20_000;
    let ty = format!("{}Int{}", "[".repeat(depth), "]".repeat(depth));
    let outcome = parse(&format!("struct Deep {{\n  let x: {ty}\n}}\nstruct After {{}}"));

    let (declaration, _, reason) = malformed_reason(&outcome);
    assert_eq!(declaration, "Deep");
    assert_eq!(reason, "type nesting too deep");
    assert_eq!(outcome.declarations.len(), 1);
    assert_eq!(outcome.declarations[0].declaration.name, "After");
}

#[test]
fn parse_source___nesting_within_bound___is_parsed() {
    let ty = format!("{}Int{}", "[".repeat(32), "]".repeat(32));

    let outcome = parse(&format!("struct Shallow {{\n  let x: {ty}\n}}"));

    assert_eq!(only(&outcome).declaration.name, "Shallow");
}

#[test]
fn parse_source___deeply_nested_declarations___are_bounded() {
    let depth = 200;
    let source = format!("{}{}", "struct S {\n".repeat(depth), "}\n".repeat(depth));

    let outcome = parse(&source);

    assert!(outcome.errors.iter().any(|e| matches!(
        e,
        GenerationError::MalformedDeclaration { reason, .. } if reason == "declaration nesting too deep"
    )));
    assert_eq!(outcome.declarations.len(), MAX_NESTING);
}

#[test]
fn parse_source___failed_parent___drops_nested_declarations() {
    let outcome = parse("struct Outer {\n  struct Inner {}\n  var broken = 1\n}");

    let (declaration, _, _) = malformed_reason(&outcome);
    assert_eq!(declaration, "Outer");
    assert!(outcome.declarations.is_empty());
}

#[test]
fn parse_source___rejected_declaration___keeps_its_markers() {
    let outcome = parse("// sourcery: autoStub\nprotocol Named {\n  var name: String { get }\n}");

    assert_eq!(
        outcome.rejected,
        vec![Rejected {
            declaration: "Named".to_string(),
            parent: None,
            markers: vec!["autoStub".to_string()],
        }]
    );
}

#[test]
fn ParseOutcome___merge___appends_in_order() {
    let mut first = parse("struct A {}");
    first.merge(parse("struct B {}\nstruct A {}"));

    let names: Vec<_> = first
        .declarations
        .iter()
        .map(|d| d.declaration.name.as_str())
        .collect();
    assert_eq!(names, vec!["A", "B", "A"]);
}
