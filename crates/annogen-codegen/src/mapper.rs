//! DTO-to-domain mapping initializers.
//!
//! For a domain type `T` with counterpart `TDTO` the generator emits
//! `extension T { init(dto: TDTO) { ... } }`. Field conversions recurse
//! structurally over [`TypeRef`]:
//!
//! | Source | Target | Expression |
//! |--------|--------|------------|
//! | `T` | `T` | `dto.x` |
//! | `S?` | `T?` | `dto.x.map { <S → T> }` |
//! | `S` | `T?` | `<S → T>` |
//! | `[S]` | `[T]` | `dto.x.map { <S → T> }` |
//! | `[K: S]` | `[K: T]` | `dto.x.mapValues { <S → T> }` |
//! | `TDTO` | `T` | `T(dto: dto.x)` when `T`/`TDTO` is itself mappable |
//!
//! Nested pairs reached this way are emitted once each, as their own
//! artifacts.

use crate::engine::{Generated, GenerationContext};
use crate::resolver::dto_counterpart;
use annogen_core::{
    Corpus, Declaration, DeclarationKind, Enumeration, GeneratedArtifact, GenerationError,
    GeneratorConfig, Strategy, TypeRef, ValueType,
};
use std::collections::BTreeSet;

/// Generate the mapping initializer for an annotated declaration and every
/// nested pair it relies on.
pub fn generate(ctx: &GenerationContext<'_>, declaration: &Declaration) -> Generated {
    let Some(counterpart) = ctx
        .resolution(&declaration.name)
        .and_then(|r| r.counterpart.as_deref())
        .and_then(|name| ctx.corpus.get(name))
    else {
        return Err(vec![GenerationError::UnresolvableStrategy {
            declaration: declaration.name.clone(),
            strategy: Strategy::AutoMappableFromDto.name().to_string(),
            reason: "no counterpart declaration resolved".to_string(),
        }]);
    };

    let mapper = Mapper::new(ctx.corpus, ctx.config);
    let mut artifacts = Vec::new();
    let mut done = BTreeSet::new();
    let mut pending = vec![(declaration, counterpart)];

    while let Some((target, source)) = pending.pop() {
        if !done.insert(target.name.clone()) {
            continue;
        }

        let plan = match mapper.plan(target, source, &mut BTreeSet::new()) {
            Ok(plan) => plan,
            Err(fields) => {
                return Err(vec![GenerationError::IncompatibleFieldSet {
                    declaration: target.name.clone(),
                    counterpart: source.name.clone(),
                    fields,
                }]);
            }
        };

        for name in plan.nested.iter().rev() {
            let nested = ctx
                .corpus
                .get(name)
                .and_then(|t| dto_counterpart(ctx.corpus, ctx.config, t).map(|s| (t, s)));
            if let Some(pair) = nested {
                pending.push(pair);
            }
        }

        tracing::debug!(
            declaration = %target.name,
            counterpart = %source.name,
            nested = plan.nested.len(),
            "planned mapping"
        );
        artifacts.push(plan.into_artifact(target, source));
    }

    Ok(artifacts)
}

/// Assignments for one target/source pair.
#[derive(Debug, Default)]
struct Plan {
    lines: Vec<String>,
    /// Targets of nested pairs the lines call into.
    nested: BTreeSet<String>,
}

impl Plan {
    fn into_artifact(self, target: &Declaration, source: &Declaration) -> GeneratedArtifact {
        let mut artifact = GeneratedArtifact::new(Strategy::AutoMappableFromDto, &target.name);
        artifact.import("Foundation");
        artifact.reference(&source.name);
        for name in &self.nested {
            artifact.reference(name);
        }

        let mut code = String::new();
        code.push_str(&format!("extension {} {{\n", target.name));
        code.push_str(&format!("    init(dto: {}) {{\n", source.name));
        for line in &self.lines {
            code.push_str(&format!("        {line}\n"));
        }
        code.push_str("    }\n");
        code.push_str("}\n");

        artifact.push_fragment(code);
        artifact
    }
}

struct Mapper<'a> {
    corpus: &'a Corpus,
    config: &'a GeneratorConfig,
}

impl<'a> Mapper<'a> {
    fn new(corpus: &'a Corpus, config: &'a GeneratorConfig) -> Self {
        Self { corpus, config }
    }

    /// Plan a pair, or list every offending field or case.
    ///
    /// `visiting` holds targets being planned further up the stack; a pair
    /// that refers back to one of them is assumed mappable.
    fn plan(
        &self,
        target: &Declaration,
        source: &Declaration,
        visiting: &mut BTreeSet<String>,
    ) -> Result<Plan, Vec<String>> {
        visiting.insert(target.name.clone());
        let plan = match (&target.kind, &source.kind) {
            (DeclarationKind::ValueType(t), DeclarationKind::ValueType(s)) => {
                self.plan_fields(t, s, visiting)
            }
            (DeclarationKind::Enumeration(t), DeclarationKind::Enumeration(s)) => plan_cases(t, s),
            _ => Err(Vec::new()),
        };
        visiting.remove(&target.name);
        plan
    }

    fn plan_fields(
        &self,
        target: &ValueType,
        source: &ValueType,
        visiting: &mut BTreeSet<String>,
    ) -> Result<Plan, Vec<String>> {
        let mut plan = Plan::default();
        let mut offending = Vec::new();

        for field in &target.fields {
            // `let` with an initial value cannot be reassigned
            if !field.is_mutable && field.has_default() {
                continue;
            }
            match source.field(&field.name) {
                Some(from) => {
                    let expr = format!("dto.{}", field.name);
                    match self.convert(&expr, &from.ty, &field.ty, &mut plan.nested, visiting) {
                        Some(converted) => plan
                            .lines
                            .push(format!("self.{} = {converted}", field.name)),
                        None => offending.push(field.name.clone()),
                    }
                }
                None if field.has_default() => {}
                None => offending.push(field.name.clone()),
            }
        }

        if self.config.strict_source_fields {
            for from in &source.fields {
                if target.field(&from.name).is_none() {
                    offending.push(from.name.clone());
                }
            }
        }

        if offending.is_empty() {
            Ok(plan)
        } else {
            Err(offending)
        }
    }

    /// Swift expression turning `expr` of type `source` into `target`.
    fn convert(
        &self,
        expr: &str,
        source: &TypeRef,
        target: &TypeRef,
        nested: &mut BTreeSet<String>,
        visiting: &mut BTreeSet<String>,
    ) -> Option<String> {
        if source == target {
            return Some(expr.to_string());
        }

        match (source, target) {
            (TypeRef::Optional { wrapped: s }, TypeRef::Optional { wrapped: t }) => {
                let inner = self.convert("$0", s, t, nested, visiting)?;
                Some(format!("{expr}.map {{ {inner} }}"))
            }
            (_, TypeRef::Optional { wrapped: t }) => self.convert(expr, source, t, nested, visiting),
            (TypeRef::Sequence { element: s }, TypeRef::Sequence { element: t }) => {
                let inner = self.convert("$0", s, t, nested, visiting)?;
                Some(format!("{expr}.map {{ {inner} }}"))
            }
            (
                TypeRef::Mapping { key: sk, value: s },
                TypeRef::Mapping { key: tk, value: t },
            ) if sk == tk => {
                let inner = self.convert("$0", s, t, nested, visiting)?;
                Some(format!("{expr}.mapValues {{ {inner} }}"))
            }
            (TypeRef::Named { name: s, args: sa }, TypeRef::Named { name: t, args: ta })
                if sa.is_empty() && ta.is_empty() =>
            {
                let target_decl = self.corpus.get(t)?;
                let counterpart = dto_counterpart(self.corpus, self.config, target_decl)?;
                if counterpart.name != *s {
                    return None;
                }
                if !visiting.contains(t) {
                    self.plan(target_decl, counterpart, visiting).ok()?;
                }
                nested.insert(t.clone());
                Some(format!("{t}(dto: {expr})"))
            }
            _ => None,
        }
    }
}

fn plan_cases(target: &Enumeration, source: &Enumeration) -> Result<Plan, Vec<String>> {
    if target.has_associated_values || source.has_associated_values {
        return Err(source.cases.clone());
    }

    let missing: Vec<String> = source
        .cases
        .iter()
        .filter(|case| !target.cases.contains(case))
        .cloned()
        .collect();
    if !missing.is_empty() {
        return Err(missing);
    }

    let mut lines = vec!["switch dto {".to_string()];
    for case in &source.cases {
        lines.push(format!("case .{case}: self = .{case}"));
    }
    lines.push("}".to_string());

    Ok(Plan {
        lines,
        nested: BTreeSet::new(),
    })
}
