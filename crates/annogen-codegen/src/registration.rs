//! Dependency registration table.
//!
//! Every `autoregister` contract is paired with the annotated concrete type
//! implementing it; concrete types no contract claims are registered under
//! their own name. The table is a single `DependencyValues` extension:
//!
//! ```swift
//! extension DependencyValues {
//!     var someDependency: SomeDependencyStruct {
//!         get { self[SomeDependencyStruct.self] }
//!         set { self[SomeDependencyStruct.self] = newValue }
//!     }
//! }
//! ```

use crate::engine::GenerationContext;
use crate::swift::{contract_members, lower_camel};
use annogen_core::{
    Declaration, Field, GeneratedArtifact, GenerationError, Initializer, Method, Parameter,
    Strategy, TypeRef, ValueForm, ValueType,
};
use std::collections::{BTreeMap, BTreeSet};

/// Artifact name of the registration table.
pub const TABLE: &str = "DependencyValues";

/// One accessor in the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub accessor: String,
    pub concrete: String,
    /// Contract the concrete type was paired with, if any.
    pub contract: Option<String>,
}

/// Build the registration table for every `autoregister` declaration.
///
/// Registration errors are reported once per contract. The table holds every
/// entry that could be registered even when some contracts failed.
pub fn generate(ctx: &GenerationContext<'_>) -> (Option<GeneratedArtifact>, Vec<GenerationError>) {
    let (registrations, errors) = plan(ctx);
    if registrations.is_empty() {
        return (None, errors);
    }

    let mut artifact = GeneratedArtifact::new(Strategy::Autoregister, TABLE);
    artifact.import("Dependencies");

    let mut code = String::from("extension DependencyValues {\n");
    for (i, registration) in registrations.iter().enumerate() {
        if i > 0 {
            code.push('\n');
        }
        let ty = &registration.concrete;
        code.push_str(&format!("    var {}: {ty} {{\n", registration.accessor));
        code.push_str(&format!("        get {{ self[{ty}.self] }}\n"));
        code.push_str(&format!("        set {{ self[{ty}.self] = newValue }}\n"));
        code.push_str("    }\n");

        artifact.reference(ty.as_str());
        if let Some(contract) = &registration.contract {
            artifact.reference(contract.as_str());
        }
    }
    code.push_str("}\n");
    artifact.push_fragment(code);

    tracing::debug!(entries = registrations.len(), "registration table built");
    (Some(artifact), errors)
}

/// Pair contracts with implementations and name the accessors.
pub fn plan(ctx: &GenerationContext<'_>) -> (Vec<Registration>, Vec<GenerationError>) {
    let annotated: Vec<&Declaration> = ctx
        .corpus
        .declarations()
        .filter(|d| {
            ctx.resolution(&d.name)
                .is_some_and(|r| r.runs(Strategy::Autoregister))
        })
        .collect();

    let contracts: Vec<&Declaration> = annotated
        .iter()
        .copied()
        .filter(|d| d.as_contract().is_some())
        .collect();
    let concretes: Vec<(&Declaration, &ValueType)> = annotated
        .iter()
        .filter_map(|d| d.as_value_type().map(|v| (*d, v)))
        .collect();

    let mut errors = Vec::new();
    let mut claimed = BTreeSet::new();
    let mut registrations = Vec::new();

    for contract in contracts {
        let (methods, inits) = contract_members(ctx.corpus, contract);
        let candidates: Vec<&Declaration> = concretes
            .iter()
            .filter(|(d, v)| implements(contract, &methods, &inits, d, v))
            .map(|(d, _)| *d)
            .collect();

        let stem = ctx.config.naming.contract_stem(contract.simple_name());
        let chosen = match candidates.as_slice() {
            [] => {
                errors.push(GenerationError::UnregisteredContract {
                    contract: contract.name.clone(),
                });
                continue;
            }
            [only] => *only,
            many => {
                claimed.extend(many.iter().map(|d| d.name.clone()));
                let names: Vec<String> = many.iter().map(|d| d.name.clone()).collect();
                if ctx.config.fail_on_ambiguous_registration {
                    errors.push(GenerationError::AmbiguousRegistration {
                        contract: contract.name.clone(),
                        candidates: names,
                    });
                    continue;
                }
                let pick = many
                    .iter()
                    .copied()
                    .find(|d| d.simple_name().starts_with(stem))
                    .unwrap_or(many[0]);
                tracing::warn!(
                    contract = %contract.name,
                    candidates = ?names,
                    chosen = %pick.name,
                    "ambiguous registration resolved by preference"
                );
                pick
            }
        };

        claimed.insert(chosen.name.clone());
        registrations.push(Registration {
            accessor: lower_camel(stem),
            concrete: chosen.name.clone(),
            contract: Some(contract.name.clone()),
        });
    }

    for (declaration, _) in &concretes {
        if claimed.contains(&declaration.name) {
            continue;
        }
        registrations.push(Registration {
            accessor: lower_camel(declaration.simple_name()),
            concrete: declaration.name.clone(),
            contract: None,
        });
    }

    // Two entries under one accessor would not compile.
    let mut by_accessor: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for registration in &registrations {
        by_accessor
            .entry(registration.accessor.clone())
            .or_default()
            .push(registration.concrete.clone());
    }
    let mut clashing = BTreeSet::new();
    for (accessor, names) in by_accessor {
        if names.len() > 1 {
            errors.push(GenerationError::AmbiguousRegistration {
                contract: accessor.clone(),
                candidates: names,
            });
            clashing.insert(accessor);
        }
    }
    registrations.retain(|r| !clashing.contains(&r.accessor));

    (registrations, errors)
}

/// Whether a concrete type satisfies every member of a contract, either by
/// declaring the conformance or structurally.
fn implements(
    contract: &Declaration,
    methods: &[Method],
    inits: &[Initializer],
    concrete: &Declaration,
    value: &ValueType,
) -> bool {
    let declared = value
        .conformances
        .iter()
        .any(|c| *c == contract.name || c.as_str() == contract.simple_name());
    if declared {
        return true;
    }

    let structural = methods.iter().all(|m| satisfies_method(m, value))
        && inits.iter().all(|i| satisfies_init(i, value));
    if structural {
        tracing::debug!(
            contract = %contract.name,
            concrete = %concrete.name,
            "structural match"
        );
    }
    structural
}

/// An implementation may drop `async` or `throws` from a requirement.
fn effects_fit(required: (bool, bool), actual: (bool, bool)) -> bool {
    (!actual.0 || required.0) && (!actual.1 || required.1)
}

fn same_parameters(required: &[Parameter], actual: &[Parameter]) -> bool {
    required.len() == actual.len()
        && required
            .iter()
            .zip(actual)
            .all(|(r, a)| r.label == a.label && r.ty == a.ty && r.is_inout == a.is_inout)
}

fn satisfies_method(required: &Method, value: &ValueType) -> bool {
    let by_method = value.methods.iter().any(|m| {
        m.name == required.name
            && same_parameters(&required.params, &m.params)
            && m.ret == required.ret
            && effects_fit(
                (required.is_async, required.is_throwing),
                (m.is_async, m.is_throwing),
            )
    });
    if by_method {
        return true;
    }

    value.field(&required.name).is_some_and(|field| match &field.ty {
        TypeRef::Function(function) => {
            function.params.len() == required.params.len()
                && function
                    .params
                    .iter()
                    .zip(&required.params)
                    .all(|(ty, p)| *ty == p.ty)
                && *function.ret == required.ret
                && function.is_async == required.is_async
                && function.is_throwing == required.is_throwing
        }
        _ => false,
    })
}

fn satisfies_init(required: &Initializer, value: &ValueType) -> bool {
    let by_init = value.initializers.iter().any(|i| {
        same_parameters(&required.params, &i.params)
            && effects_fit(
                (required.is_async, required.is_throwing),
                (i.is_async, i.is_throwing),
            )
    });
    if by_init {
        return true;
    }
    if value.form != ValueForm::Struct || !value.initializers.is_empty() {
        return false;
    }

    let settable: Vec<_> = value
        .fields
        .iter()
        .filter(|f| f.is_mutable || !f.has_default())
        .collect();
    let required_only: Vec<_> = settable.iter().filter(|f| !f.has_default()).copied().collect();

    let matches = |fields: &[&Field]| {
        fields.len() == required.params.len()
            && fields.iter().zip(&required.params).all(|(f, p)| {
                p.label.as_deref() == Some(f.name.as_str()) && p.ty == f.ty
            })
    };
    matches(&settable) || matches(&required_only)
}
