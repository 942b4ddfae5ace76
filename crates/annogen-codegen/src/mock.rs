//! Failing mock and fixture-backed stub generation.
//!
//! Both strategies emit a `final class` conforming to the contract, with
//! every method signature copied unchanged (labels, `async`, `throws`,
//! return type) and one initializer per contract initializer.
//!
//! ```swift
//! final class SomeServiceFailingMock: SomeServiceProtocol {
//!     func getDate() async throws -> Date {
//!         throw failure ?? Failure.unimplemented("getDate()")
//!     }
//! }
//!
//! final class SomeServiceStub: SomeServiceProtocol {
//!     var getDateResult: Date = Date()
//!     var getDateError: (any Error)?
//!     private(set) var getDateCallCount = 0
//!     ...
//! }
//! ```

use crate::engine::{Generated, GenerationContext};
use crate::swift::{contract_members, init_signature, method_signature, storage_keys, storage_type};
use annogen_core::{
    Corpus, Declaration, DeclarationKind, FixtureProvider, GeneratedArtifact, GenerationError,
    Initializer, Method, Parameter, Strategy, TypeRef, ValueForm, ValueType,
};
use std::collections::{BTreeMap, BTreeSet};

/// Generate `<Stem>FailingMock` for a contract.
pub fn failing_mock(ctx: &GenerationContext<'_>, declaration: &Declaration) -> Generated {
    let (methods, inits) = contract_members(ctx.corpus, declaration);
    let name = ctx
        .config
        .naming
        .failing_mock_name(declaration.simple_name());

    let mut artifact = GeneratedArtifact::new(Strategy::AutoFailingMock, &declaration.name);
    artifact.import("Foundation");
    reference_signatures(ctx.corpus, &mut artifact, &methods, &inits);

    let mut code = String::new();
    code.push_str(&format!("final class {name}: {} {{\n", declaration.name));
    code.push_str("    enum Failure: Error, Equatable {\n");
    code.push_str("        case unimplemented(String)\n");
    code.push_str("    }\n\n");
    code.push_str("    var failure: (any Error)?\n");

    push_initializers(&mut code, &inits);

    for method in &methods {
        let selector = method.selector();
        code.push('\n');
        if method.is_throwing {
            code.push_str(&format!("    {} {{\n", method_signature(method)));
            code.push_str(&format!(
                "        throw failure ?? Failure.unimplemented(\"{selector}\")\n"
            ));
        } else {
            tracing::warn!(
                declaration = %declaration.name,
                member = %selector,
                "non-throwing member of failing mock aborts when called"
            );
            artifact.note(format!("`{selector}` cannot throw; calling it aborts"));
            code.push_str(&format!(
                "    // Aborts: `{selector}` has no failure channel.\n"
            ));
            code.push_str(&format!("    {} {{\n", method_signature(method)));
            code.push_str(&format!(
                "        fatalError(\"unimplemented: {selector}\")\n"
            ));
        }
        code.push_str("    }\n");
    }

    code.push_str("}\n");
    artifact.push_fragment(code);
    Ok(vec![artifact])
}

/// Generate `<Stem>Stub` for a contract.
pub fn stub(ctx: &GenerationContext<'_>, declaration: &Declaration) -> Generated {
    let (methods, inits) = contract_members(ctx.corpus, declaration);
    let keys = storage_keys(&methods);
    let fixtures = Fixtures::new(ctx.corpus, ctx.fixtures, &ctx.config.fixtures);
    let name = ctx.config.naming.stub_name(declaration.simple_name());

    let mut artifact = GeneratedArtifact::new(Strategy::AutoStub, &declaration.name);
    artifact.import("Foundation");
    reference_signatures(ctx.corpus, &mut artifact, &methods, &inits);

    let mut errors = Vec::new();
    let mut storage = Vec::new();
    let mut bodies = String::new();

    for (method, key) in methods.iter().zip(&keys) {
        let mut lines = Vec::new();
        if method.returns_value() {
            match fixtures.value_for(&method.ret) {
                Some(value) => lines.push(format!(
                    "    var {key}Result: {} = {value}",
                    storage_type(&method.ret)
                )),
                None => errors.push(GenerationError::MissingFixture {
                    declaration: declaration.name.clone(),
                    member: method.selector(),
                    type_name: method.ret.to_string(),
                }),
            }
        }
        if method.is_throwing {
            lines.push(format!("    var {key}Error: (any Error)?"));
        }
        lines.push(format!("    private(set) var {key}CallCount = 0"));
        if !method.params.is_empty() {
            lines.push(format!(
                "    private(set) var {key}Received: [{}] = []",
                received_type(&method.params)
            ));
        }
        storage.push(lines.join("\n"));

        bodies.push('\n');
        bodies.push_str(&format!("    {} {{\n", method_signature(method)));
        bodies.push_str(&format!("        {key}CallCount += 1\n"));
        if !method.params.is_empty() {
            bodies.push_str(&format!(
                "        {key}Received.append({})\n",
                received_value(&method.params)
            ));
        }
        if method.is_throwing {
            bodies.push_str(&format!("        if let error = {key}Error {{\n"));
            bodies.push_str("            throw error\n");
            bodies.push_str("        }\n");
        }
        if method.returns_value() {
            bodies.push_str(&format!("        return {key}Result\n"));
        }
        bodies.push_str("    }\n");
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    let mut code = String::new();
    code.push_str(&format!("final class {name}: {} {{\n", declaration.name));
    code.push_str(&storage.join("\n\n"));
    if !storage.is_empty() {
        code.push('\n');
    }
    push_initializers(&mut code, &inits);
    code.push_str(&bodies);
    code.push_str("}\n");

    artifact.push_fragment(code);
    Ok(vec![artifact])
}

fn push_initializers(code: &mut String, inits: &[Initializer]) {
    for init in inits {
        code.push_str(&format!("\n    {} {{}}\n", init_signature(init)));
    }
}

fn reference_signatures(
    corpus: &Corpus,
    artifact: &mut GeneratedArtifact,
    methods: &[Method],
    inits: &[Initializer],
) {
    let mut names = BTreeSet::new();
    for method in methods {
        method.ret.collect_names(&mut names);
        for param in &method.params {
            param.ty.collect_names(&mut names);
        }
    }
    for init in inits {
        for param in &init.params {
            param.ty.collect_names(&mut names);
        }
    }
    for name in names.into_iter().filter(|n| corpus.contains(n)) {
        artifact.reference(name);
    }
}

/// Element type of a `<key>Received` log: the parameter type, or a labeled
/// tuple when there are several.
fn received_type(params: &[Parameter]) -> String {
    match params {
        [single] => storage_type(&single.ty).to_string(),
        _ => {
            let elements: Vec<String> = params
                .iter()
                .map(|p| format!("{}: {}", p.name, storage_type(&p.ty)))
                .collect();
            format!("({})", elements.join(", "))
        }
    }
}

fn received_value(params: &[Parameter]) -> String {
    match params {
        [single] => single.name.clone(),
        _ => {
            let elements: Vec<String> = params
                .iter()
                .map(|p| format!("{}: {}", p.name, p.name))
                .collect();
            format!("({})", elements.join(", "))
        }
    }
}

/// Default values for stub results.
///
/// Lookup order: the programmatic provider, the configured fixture table,
/// then structural defaults derived from the type and the corpus.
pub struct Fixtures<'a> {
    corpus: &'a Corpus,
    provider: &'a dyn FixtureProvider,
    configured: &'a BTreeMap<String, String>,
}

impl<'a> Fixtures<'a> {
    pub fn new(
        corpus: &'a Corpus,
        provider: &'a dyn FixtureProvider,
        configured: &'a BTreeMap<String, String>,
    ) -> Self {
        Self {
            corpus,
            provider,
            configured,
        }
    }

    /// Swift expression producing a value of `ty`, if one can be built.
    pub fn value_for(&self, ty: &TypeRef) -> Option<String> {
        self.resolve(ty, &mut BTreeSet::new())
    }

    fn resolve(&self, ty: &TypeRef, visiting: &mut BTreeSet<String>) -> Option<String> {
        if let Some(value) = self
            .provider
            .fixture_for(ty)
            .or_else(|| self.configured.fixture_for(ty))
        {
            return Some(value);
        }

        match ty {
            TypeRef::Primitive { name } => primitive_default(name).map(str::to_string),
            TypeRef::Sequence { .. } => Some("[]".to_string()),
            TypeRef::Mapping { .. } => Some("[:]".to_string()),
            TypeRef::Optional { .. } => Some("nil".to_string()),
            TypeRef::Function(function) => {
                let ret = if function.ret.is_void() {
                    None
                } else {
                    Some(self.resolve(&function.ret, visiting)?)
                };
                let params = vec!["_"; function.params.len()].join(", ");
                Some(match (params.is_empty(), ret) {
                    (true, None) => "{}".to_string(),
                    (true, Some(ret)) => format!("{{ {ret} }}"),
                    (false, None) => format!("{{ {params} in }}"),
                    (false, Some(ret)) => format!("{{ {params} in {ret} }}"),
                })
            }
            TypeRef::Named { name, args } if args.is_empty() => self.corpus_value(name, visiting),
            TypeRef::Named { .. } | TypeRef::Existential { .. } => None,
        }
    }

    fn corpus_value(&self, name: &str, visiting: &mut BTreeSet<String>) -> Option<String> {
        let declaration = self.corpus.get(name)?;
        if !visiting.insert(name.to_string()) {
            return None;
        }

        let value = match &declaration.kind {
            DeclarationKind::Enumeration(enumeration) if !enumeration.has_associated_values => {
                enumeration.cases.first().map(|case| format!("{name}.{case}"))
            }
            DeclarationKind::ValueType(value) => self.construct(name, value, visiting),
            _ => None,
        };

        visiting.remove(name);
        value
    }

    /// Memberwise initializer for structs without explicit inits, otherwise
    /// the first synchronous, non-throwing init whose arguments all resolve.
    fn construct(
        &self,
        name: &str,
        value: &ValueType,
        visiting: &mut BTreeSet<String>,
    ) -> Option<String> {
        if value.initializers.is_empty() {
            let required: Vec<_> = value.fields.iter().filter(|f| !f.has_default()).collect();
            if value.form != ValueForm::Struct && !required.is_empty() {
                return None;
            }
            let mut args = Vec::new();
            for field in required {
                args.push(format!("{}: {}", field.name, self.resolve(&field.ty, visiting)?));
            }
            return Some(format!("{name}({})", args.join(", ")));
        }

        'inits: for init in &value.initializers {
            if init.is_async || init.is_throwing {
                continue;
            }
            let mut args = Vec::new();
            for param in init.params.iter().filter(|p| !p.has_default()) {
                let Some(arg) = self.resolve(&param.ty, visiting) else {
                    continue 'inits;
                };
                args.push(match &param.label {
                    Some(label) => format!("{label}: {arg}"),
                    None => arg,
                });
            }
            return Some(format!("{name}({})", args.join(", ")));
        }
        None
    }
}

/// Structural default for a primitive type name.
pub fn primitive_default(name: &str) -> Option<&'static str> {
    let value = match name {
        "String" => "\"\"",
        "Character" => "\" \"",
        "Bool" => "false",
        "Int" | "Int8" | "Int16" | "Int32" | "Int64" | "UInt" | "UInt8" | "UInt16" | "UInt32"
        | "UInt64" | "Double" | "Float" | "CGFloat" | "Decimal" => "0",
        "Void" => "()",
        "Date" => "Date()",
        "Data" => "Data()",
        "UUID" => "UUID()",
        "URL" => "URL(fileURLWithPath: \"/\")",
        _ => return None,
    };
    Some(value)
}
