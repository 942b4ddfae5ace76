//! Reducer generation for feature descriptions.
//!
//! A struct tagged `describesFeature` describes the state of a feature. The
//! generator turns it into a reducer of the same name whose `State` carries
//! the described fields. With `containsComposition`, fields holding another
//! reducer's state become child features wired into `body`.

use crate::engine::{Generated, GenerationContext};
use crate::swift::indent;
use annogen_core::{
    Annotation, Declaration, Field, GeneratedArtifact, GenerationError, Strategy, TypeRef,
};

/// A field embedding another reducer's state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Child {
    pub field: String,
    pub reducer: String,
    /// `P.State?`: wired with `.ifLet` instead of `Scope`.
    pub optional: bool,
}

/// Generate the reducer for a feature description.
pub fn generate(ctx: &GenerationContext<'_>, declaration: &Declaration) -> Generated {
    let Some(value) = declaration.as_value_type() else {
        return Err(vec![GenerationError::UnresolvableStrategy {
            declaration: declaration.name.clone(),
            strategy: Strategy::DescribesFeature.name().to_string(),
            reason: format!("expected a struct, found a {}", declaration.form_name()),
        }]);
    };

    let composes = ctx
        .resolution(&declaration.name)
        .is_some_and(|r| r.has(Annotation::ContainsComposition));

    let mut children = Vec::new();
    let mut errors = Vec::new();
    if composes {
        for field in &value.fields {
            match child_of(ctx, declaration, field) {
                Ok(Some(child)) => children.push(child),
                Ok(None) => {}
                Err(error) => errors.push(error),
            }
        }
    }
    if !errors.is_empty() {
        return Err(errors);
    }

    let mut artifact = GeneratedArtifact::new(Strategy::DescribesFeature, &declaration.name);
    artifact.import("ComposableArchitecture");
    for child in &children {
        artifact.reference(child.reducer.as_str());
    }

    let mut code = String::new();
    code.push_str(&format!("struct {}: Reducer {{\n", declaration.simple_name()));
    code.push_str(&indent(&state(&value.fields, &value.conformances), 1));
    code.push_str("\n\n");
    code.push_str(&indent(&action(&children), 1));
    code.push_str("\n\n");
    code.push_str(&indent(&body(&children), 1));
    code.push_str("\n}\n");

    tracing::debug!(
        declaration = %declaration.name,
        children = children.len(),
        "generated reducer"
    );
    artifact.push_fragment(code);
    Ok(vec![artifact])
}

/// Classify a field as a child feature.
///
/// `P` counts as a reducer when it is a feature described earlier in the
/// corpus, or when it declares nested `State` and `Action` types. Features
/// described at or after the current declaration are an ordering error.
pub fn child_of(
    ctx: &GenerationContext<'_>,
    declaration: &Declaration,
    field: &Field,
) -> Result<Option<Child>, GenerationError> {
    let (inner, optional) = match &field.ty {
        TypeRef::Optional { wrapped } => (wrapped.as_ref(), true),
        other => (other, false),
    };
    let TypeRef::Named { name, args } = inner else {
        return Ok(None);
    };
    let Some(reducer) = name.strip_suffix(".State") else {
        return Ok(None);
    };
    if !args.is_empty() {
        return Ok(None);
    }

    let child = Child {
        field: field.name.clone(),
        reducer: reducer.to_string(),
        optional,
    };

    let described = ctx
        .resolution(reducer)
        .is_some_and(|r| r.runs(Strategy::DescribesFeature));
    if let (true, Some(feature)) = (described, ctx.corpus.get(reducer)) {
        if feature.position >= declaration.position {
            return Err(GenerationError::CompositionOrder {
                declaration: declaration.name.clone(),
                field: field.name.clone(),
                child: reducer.to_string(),
            });
        }
        return Ok(Some(child));
    }

    let declares_reducer = ctx.corpus.nested(reducer, "State").is_some()
        && ctx.corpus.nested(reducer, "Action").is_some();
    Ok(declares_reducer.then_some(child))
}

fn state(fields: &[Field], conformances: &[String]) -> String {
    let mut code = String::from("struct State");
    if !conformances.is_empty() {
        code.push_str(&format!(": {}", conformances.join(", ")));
    }
    if fields.is_empty() {
        code.push_str(" {}");
        return code;
    }

    code.push_str(" {\n");
    for field in fields {
        let binding = if field.is_mutable { "var" } else { "let" };
        code.push_str(&format!("    {binding} {}: {}", field.name, field.ty));
        if let Some(default) = &field.default {
            code.push_str(&format!(" = {default}"));
        }
        code.push('\n');
    }
    code.push('}');
    code
}

fn action(children: &[Child]) -> String {
    if children.is_empty() {
        return "enum Action: Equatable {}".to_string();
    }

    let mut code = String::from("enum Action: Equatable {\n");
    for child in children {
        code.push_str(&format!("    case {}({}.Action)\n", child.field, child.reducer));
    }
    code.push('}');
    code
}

/// Required children are scoped ahead of the local reducer; optional ones
/// attach after it with `.ifLet`.
fn body(children: &[Child]) -> String {
    let mut code = String::from("var body: some ReducerOf<Self> {\n");
    for child in children.iter().filter(|c| !c.optional) {
        code.push_str(&format!(
            "    Scope(state: \\.{0}, action: /Action.{0}) {{\n",
            child.field
        ));
        code.push_str(&format!("        {}()\n", child.reducer));
        code.push_str("    }\n");
    }
    code.push_str("    Reduce { state, action in\n");
    code.push_str("        .none\n");
    code.push_str("    }\n");
    for child in children.iter().filter(|c| c.optional) {
        code.push_str(&format!(
            "    .ifLet(\\.{0}, action: /Action.{0}) {{\n",
            child.field
        ));
        code.push_str(&format!("        {}()\n", child.reducer));
        code.push_str("    }\n");
    }
    code.push('}');
    code
}
