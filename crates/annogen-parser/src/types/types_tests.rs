#![allow(non_snake_case)]

use super::*;
use test_case::test_case;

fn string() -> TypeRef {
    TypeRef::primitive("String")
}

#[test_case("String", TypeRef::primitive("String") ; "primitive")]
#[test_case("Something", TypeRef::named("Something") ; "named")]
#[test_case("Child1.State", TypeRef::named("Child1.State") ; "dotted")]
#[test_case("[String]", TypeRef::sequence(string()) ; "sequence")]
#[test_case("Array<String>", TypeRef::sequence(string()) ; "array generic")]
#[test_case("[String: Int]", TypeRef::mapping(string(), TypeRef::primitive("Int")) ; "mapping")]
#[test_case("Dictionary<String, Int>", TypeRef::mapping(string(), TypeRef::primitive("Int")) ; "dictionary generic")]
#[test_case("String?", TypeRef::optional(string()) ; "optional")]
#[test_case("String!", TypeRef::optional(string()) ; "implicitly unwrapped")]
#[test_case("Optional<String>", TypeRef::optional(string()) ; "optional generic")]
#[test_case("()", TypeRef::void() ; "empty tuple")]
#[test_case("Void", TypeRef::void() ; "void")]
#[test_case("(String)", string() ; "parenthesized")]
fn parse_type_str___valid___normalizes(text: &str, expected: TypeRef) {
    assert_eq!(parse_type_str(text), Ok(expected));
}

#[test]
fn parse_type_str___nested_containers___compose() {
    let ty = parse_type_str("[String: [ListItem]]?").unwrap();

    assert_eq!(
        ty,
        TypeRef::optional(TypeRef::mapping(
            string(),
            TypeRef::sequence(TypeRef::named("ListItem"))
        ))
    );
    assert_eq!(ty.to_string(), "[String: [ListItem]]?");
}

#[test]
fn parse_type_str___other_generics___stay_named() {
    let ty = parse_type_str("Set<Int>").unwrap();

    assert_eq!(
        ty,
        TypeRef::Named {
            name: "Set".to_string(),
            args: vec![TypeRef::primitive("Int")],
        }
    );
}

#[test]
fn parse_type_str___function_type___keeps_effects() {
    let ty = parse_type_str("@escaping @Sendable (_ id: String, Int) async throws -> [Item]").unwrap();

    match ty {
        TypeRef::Function(function) => {
            assert_eq!(function.params, vec![string(), TypeRef::primitive("Int")]);
            assert!(function.is_async);
            assert!(function.is_throwing);
            assert_eq!(*function.ret, TypeRef::sequence(TypeRef::named("Item")));
            assert_eq!(function.attributes, vec!["escaping", "Sendable"]);
        }
        other => panic!("expected function, got {other:?}"),
    }
}

#[test]
fn parse_type_str___optional_closure___wraps_function() {
    let ty = parse_type_str("(() -> Void)?").unwrap();

    assert!(matches!(ty, TypeRef::Optional { .. }));
    assert_eq!(ty.to_string(), "(() -> Void)?");
}

#[test]
fn parse_type_str___existential___is_recognized() {
    let ty = parse_type_str("(any Error)?").unwrap();

    assert_eq!(
        ty,
        TypeRef::optional(TypeRef::Existential {
            constraint: Box::new(TypeRef::named("Error")),
        })
    );
}

#[test_case("(Int, String)", "tuple" ; "tuple")]
#[test_case("some View", "opaque" ; "opaque")]
#[test_case("@escaping Int", "function types" ; "attribute on non function")]
#[test_case("[Int", "expected `]`" ; "unclosed sequence")]
#[test_case("() async", "`->`" ; "effects without arrow")]
#[test_case("Int Int", "after type" ; "trailing tokens")]
fn parse_type_str___invalid___reports_reason(text: &str, fragment: &str) {
    let error = parse_type_str(text).unwrap_err();

    assert!(error.contains(fragment), "{error}");
}
