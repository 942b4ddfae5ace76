//! Swift rendering helpers and naming conventions.
//!
//! | Input | Function | Output |
//! |-------|----------|--------|
//! | `word` | [`capitalize`] | `Word` |
//! | `SomeDependency` | [`lower_camel`] | `someDependency` |
//! | `URLSession` | [`lower_camel`] | `urlSession` |
//! | [`Method`] | [`method_signature`] | `func get(_ id: String) async throws -> Item` |

use annogen_core::{Corpus, Declaration, Initializer, Method, Parameter, TypeRef};
use std::collections::BTreeSet;

/// Indentation unit used by every generator.
pub const INDENT: &str = "    ";

/// Capitalize the first letter of a string.
///
/// # Examples
///
/// ```
/// use annogen_codegen::swift::capitalize;
///
/// assert_eq!(capitalize("hello"), "Hello");
/// assert_eq!(capitalize(""), "");
/// ```
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}

/// Lower the leading uppercase run of a type name for use as a property name.
///
/// An acronym prefix is lowered as a whole, except for the letter that
/// starts the next word.
///
/// # Examples
///
/// ```
/// use annogen_codegen::swift::lower_camel;
///
/// assert_eq!(lower_camel("SomeDependency"), "someDependency");
/// assert_eq!(lower_camel("URLSession"), "urlSession");
/// assert_eq!(lower_camel("API"), "api");
/// ```
pub fn lower_camel(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let run = chars.iter().take_while(|c| c.is_uppercase()).count();
    let lowered = match run {
        0 => return s.to_string(),
        1 => 1,
        n if n == chars.len() => n,
        n if chars[n].is_lowercase() => n - 1,
        n => n,
    };

    chars
        .iter()
        .enumerate()
        .flat_map(|(i, c)| {
            if i < lowered {
                c.to_lowercase().collect::<Vec<_>>()
            } else {
                vec![*c]
            }
        })
        .collect()
}

/// Render one parameter as it appears in a declaration.
pub fn parameter(param: &Parameter) -> String {
    let binding = match param.label.as_deref() {
        None => format!("_ {}", param.name),
        Some(label) if label == param.name => param.name.clone(),
        Some(label) => format!("{label} {}", param.name),
    };
    let inout = if param.is_inout { "inout " } else { "" };
    match &param.default {
        Some(default) => format!("{binding}: {inout}{} = {default}", param.ty),
        None => format!("{binding}: {inout}{}", param.ty),
    }
}

pub fn parameter_list(params: &[Parameter]) -> String {
    params.iter().map(parameter).collect::<Vec<_>>().join(", ")
}

/// ` async`, ` throws`, ` async throws` or nothing.
pub fn effects(is_async: bool, is_throwing: bool) -> &'static str {
    match (is_async, is_throwing) {
        (true, true) => " async throws",
        (true, false) => " async",
        (false, true) => " throws",
        (false, false) => "",
    }
}

/// `func name(params) effects -> Ret`, omitting a `Void` return.
pub fn method_signature(method: &Method) -> String {
    let mut signature = format!(
        "func {}({}){}",
        method.name,
        parameter_list(&method.params),
        effects(method.is_async, method.is_throwing)
    );
    if method.returns_value() {
        signature.push_str(&format!(" -> {}", method.ret));
    }
    signature
}

pub fn init_signature(init: &Initializer) -> String {
    format!(
        "init({}){}",
        parameter_list(&init.params),
        effects(init.is_async, init.is_throwing)
    )
}

/// Type usable for a stored property: function attributes such as
/// `@escaping` are only valid on parameters.
pub fn storage_type(ty: &TypeRef) -> TypeRef {
    match ty {
        TypeRef::Function(function) if !function.attributes.is_empty() => {
            let mut function = function.clone();
            function.attributes.retain(|a| a == "Sendable" || a == "MainActor");
            TypeRef::Function(function)
        }
        other => other.clone(),
    }
}

/// Storage key per method; overloaded names are qualified with their labels.
///
/// `load(from:)` and `load(id:)` become `loadFrom` and `loadId`. Keys that
/// still collide get a numeric suffix in declaration order.
pub fn storage_keys(methods: &[Method]) -> Vec<String> {
    let overloaded = |name: &str| methods.iter().filter(|m| m.name == name).count() > 1;

    let mut keys: Vec<String> = methods
        .iter()
        .map(|method| {
            if !overloaded(&method.name) {
                return method.name.clone();
            }
            let qualifier: String = method
                .params
                .iter()
                .map(|p| capitalize(p.label.as_deref().unwrap_or(&p.name)))
                .collect();
            format!("{}{qualifier}", method.name)
        })
        .collect();

    let mut seen = BTreeSet::new();
    for (index, key) in keys.iter_mut().enumerate() {
        if !seen.insert(key.clone()) {
            key.push_str(&(index + 1).to_string());
            seen.insert(key.clone());
        }
    }
    keys
}

/// Indent every non-empty line by `level` units.
pub fn indent(text: &str, level: usize) -> String {
    let prefix = INDENT.repeat(level);
    text.lines()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{prefix}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Methods and initializers of a contract, including those inherited from
/// other contracts in the corpus. Duplicated selectors are kept once.
pub fn contract_members(corpus: &Corpus, contract: &Declaration) -> (Vec<Method>, Vec<Initializer>) {
    let mut methods = Vec::new();
    let mut inits = Vec::new();
    let mut visited = BTreeSet::new();
    collect_members(corpus, contract, &mut visited, &mut methods, &mut inits);
    (methods, inits)
}

fn collect_members(
    corpus: &Corpus,
    declaration: &Declaration,
    visited: &mut BTreeSet<String>,
    methods: &mut Vec<Method>,
    inits: &mut Vec<Initializer>,
) {
    if !visited.insert(declaration.name.clone()) {
        return;
    }
    let Some(contract) = declaration.as_contract() else {
        return;
    };

    for method in &contract.methods {
        if !methods.iter().any(|m: &Method| m.selector() == method.selector()) {
            methods.push(method.clone());
        }
    }
    for init in &contract.initializers {
        if !inits.iter().any(|i: &Initializer| i.selector() == init.selector()) {
            inits.push(init.clone());
        }
    }
    for parent in &contract.inherits {
        if let Some(parent) = corpus.get(parent) {
            collect_members(corpus, parent, visited, methods, inits);
        }
    }
}
