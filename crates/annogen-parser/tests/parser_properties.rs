#![allow(non_snake_case)]

use annogen_core::TypeRef;
use annogen_parser::{parse_source, parse_type_str, tokenize};
use proptest::prelude::*;

fn type_strategy() -> impl Strategy<Value = TypeRef> {
    let leaf = prop_oneof![
        prop::sample::select(vec!["String", "Int", "Bool", "Date", "UUID"]).prop_map(TypeRef::primitive),
        "My[A-Z][a-z]{1,6}".prop_map(TypeRef::named),
    ];
    leaf.prop_recursive(4, 24, 2, |inner| {
        prop_oneof![
            inner.clone().prop_map(TypeRef::sequence),
            (inner.clone(), inner.clone()).prop_map(|(k, v)| TypeRef::mapping(k, v)),
            inner.prop_map(|t| match t {
                TypeRef::Optional { .. } => t,
                other => TypeRef::optional(other),
            }),
        ]
    })
}

proptest! {
    #[test]
    fn parse_type_str___rendered_type___parses_back(ty in type_strategy()) {
        prop_assert_eq!(parse_type_str(&ty.to_string()), Ok(ty));
    }

    #[test]
    fn tokenize___arbitrary_text___never_panics(text in "\\PC{0,200}") {
        let _ = tokenize(&text);
    }

    #[test]
    fn parse_source___arbitrary_text___never_panics(text in "[a-z{}()\\[\\]<>:;,.=?! \n@/\"-]{0,200}") {
        let _ = parse_source("Fuzz.swift", &text, "sourcery:");
    }

    #[test]
    fn parse_source___generated_struct___keeps_every_field(
        names in prop::collection::btree_set("[a-z][a-zA-Z0-9]{0,8}", 1..8),
    ) {
        let body: String = names
            .iter()
            .map(|name| format!("    let {name}: String\n"))
            .collect();
        let source = format!("struct Generated {{\n{body}}}\n");

        let outcome = parse_source("Gen.swift", &source, "sourcery:");

        prop_assert!(outcome.errors.is_empty());
        let value = outcome.declarations[0].declaration.as_value_type().unwrap().clone();
        let parsed: Vec<_> = value.fields.iter().map(|f| f.name.clone()).collect();
        prop_assert_eq!(parsed, names.into_iter().collect::<Vec<_>>());
    }
}
