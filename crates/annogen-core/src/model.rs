//! Declaration model shared by the parser and every generator.
//!
//! The model is a language-neutral view of the declarations found in a corpus.
//! It carries no behavior beyond small accessors; parsing lives in
//! `annogen-parser` and rendering lives in `annogen-codegen`.
//!
//! # Structure
//!
//! - [`Declaration`]: a named unit, one of [`Contract`], [`ValueType`] or [`Enumeration`]
//! - [`Method`] / [`Initializer`]: member signatures with async/throwing flags
//! - [`Field`]: a stored property with an optional verbatim default
//! - [`TypeRef`]: recursive type shape (primitive, named, sequence, mapping, optional, ...)
//! - [`GeneratedArtifact`]: the output of one strategy for one declaration
//!
//! # Type shapes
//!
//! Container spellings are normalized while parsing, so `Optional<[String]>`,
//! `[String]?` and `Array<String>?` all become
//! `Optional(Sequence(Primitive("String")))`. [`TypeRef`]'s `Display` renders
//! the canonical Swift spelling.

use crate::annotation::Strategy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Type names treated as primitives.
///
/// Foundation value types are included because every corpus we generate for
/// imports Foundation and they have obvious default values.
pub const PRIMITIVE_TYPES: &[&str] = &[
    "String", "Character", "Bool", "Int", "Int8", "Int16", "Int32", "Int64", "UInt", "UInt8",
    "UInt16", "UInt32", "UInt64", "Double", "Float", "CGFloat", "Decimal", "Void", "Date", "Data",
    "URL", "UUID",
];

/// A recursive type reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeRef {
    /// Built-in scalar or Foundation value type.
    Primitive { name: String },

    /// Reference to a declaration by (possibly dotted) name, with generic arguments.
    Named { name: String, args: Vec<TypeRef> },

    /// `[T]`
    Sequence { element: Box<TypeRef> },

    /// `[K: V]`
    Mapping { key: Box<TypeRef>, value: Box<TypeRef> },

    /// `T?`
    Optional { wrapped: Box<TypeRef> },

    /// `(A, B) async throws -> R`
    Function(FunctionType),

    /// `any P`
    Existential { constraint: Box<TypeRef> },
}

/// A closure type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FunctionType {
    pub params: Vec<TypeRef>,
    pub is_async: bool,
    pub is_throwing: bool,
    pub ret: Box<TypeRef>,

    /// Type attributes such as `@escaping` or `@Sendable`, without the `@`.
    #[serde(default)]
    pub attributes: Vec<String>,
}

impl TypeRef {
    /// Build a reference from a bare identifier, classifying primitives.
    pub fn from_name(name: impl Into<String>) -> Self {
        let name = name.into();
        if PRIMITIVE_TYPES.contains(&name.as_str()) {
            TypeRef::Primitive { name }
        } else {
            TypeRef::Named {
                name,
                args: Vec::new(),
            }
        }
    }

    pub fn primitive(name: impl Into<String>) -> Self {
        TypeRef::Primitive { name: name.into() }
    }

    pub fn named(name: impl Into<String>) -> Self {
        TypeRef::Named {
            name: name.into(),
            args: Vec::new(),
        }
    }

    pub fn sequence(element: TypeRef) -> Self {
        TypeRef::Sequence {
            element: Box::new(element),
        }
    }

    pub fn mapping(key: TypeRef, value: TypeRef) -> Self {
        TypeRef::Mapping {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    pub fn optional(wrapped: TypeRef) -> Self {
        TypeRef::Optional {
            wrapped: Box::new(wrapped),
        }
    }

    pub fn void() -> Self {
        TypeRef::primitive("Void")
    }

    /// True for `Void` and the empty tuple spelling.
    pub fn is_void(&self) -> bool {
        matches!(self, TypeRef::Primitive { name } if name == "Void")
    }

    /// Collect every declaration name this type mentions.
    pub fn collect_names(&self, out: &mut BTreeSet<String>) {
        match self {
            TypeRef::Primitive { .. } => {}
            TypeRef::Named { name, args } => {
                out.insert(name.clone());
                for arg in args {
                    arg.collect_names(out);
                }
            }
            TypeRef::Sequence { element } => element.collect_names(out),
            TypeRef::Mapping { key, value } => {
                key.collect_names(out);
                value.collect_names(out);
            }
            TypeRef::Optional { wrapped } => wrapped.collect_names(out),
            TypeRef::Function(func) => {
                for param in &func.params {
                    param.collect_names(out);
                }
                func.ret.collect_names(out);
            }
            TypeRef::Existential { constraint } => constraint.collect_names(out),
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Primitive { name } => write!(f, "{name}"),
            TypeRef::Named { name, args } => {
                write!(f, "{name}")?;
                if !args.is_empty() {
                    write!(f, "<")?;
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{arg}")?;
                    }
                    write!(f, ">")?;
                }
                Ok(())
            }
            TypeRef::Sequence { element } => write!(f, "[{element}]"),
            TypeRef::Mapping { key, value } => write!(f, "[{key}: {value}]"),
            TypeRef::Optional { wrapped } => match wrapped.as_ref() {
                TypeRef::Function(_) | TypeRef::Existential { .. } => write!(f, "({wrapped})?"),
                _ => write!(f, "{wrapped}?"),
            },
            TypeRef::Function(func) => {
                for attribute in &func.attributes {
                    write!(f, "@{attribute} ")?;
                }
                write!(f, "(")?;
                for (i, param) in func.params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{param}")?;
                }
                write!(f, ")")?;
                if func.is_async {
                    write!(f, " async")?;
                }
                if func.is_throwing {
                    write!(f, " throws")?;
                }
                write!(f, " -> {}", func.ret)
            }
            TypeRef::Existential { constraint } => write!(f, "any {constraint}"),
        }
    }
}

/// A method parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    /// External argument label; `None` for `_`.
    pub label: Option<String>,

    /// Internal parameter name.
    pub name: String,

    pub ty: TypeRef,

    /// Default value expression, verbatim.
    #[serde(default)]
    pub default: Option<String>,

    #[serde(default)]
    pub is_inout: bool,
}

impl Parameter {
    /// Parameter whose label equals its name (`name: Type`).
    pub fn labeled(name: impl Into<String>, ty: TypeRef) -> Self {
        let name = name.into();
        Self {
            label: Some(name.clone()),
            name,
            ty,
            default: None,
            is_inout: false,
        }
    }

    /// Parameter without an external label (`_ name: Type`).
    pub fn unlabeled(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            label: None,
            name: name.into(),
            ty,
            default: None,
            is_inout: false,
        }
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }
}

/// A method signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Method {
    pub name: String,
    pub params: Vec<Parameter>,
    pub is_async: bool,
    pub is_throwing: bool,

    /// Return type; `Void` when the source declares none.
    pub ret: TypeRef,
}

impl Method {
    /// Swift selector such as `getSomething(_:)`.
    pub fn selector(&self) -> String {
        let labels: String = self
            .params
            .iter()
            .map(|p| format!("{}:", p.label.as_deref().unwrap_or("_")))
            .collect();
        format!("{}({labels})", self.name)
    }

    pub fn returns_value(&self) -> bool {
        !self.ret.is_void()
    }
}

/// An initializer signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Initializer {
    pub params: Vec<Parameter>,
    pub is_async: bool,
    pub is_throwing: bool,
}

impl Initializer {
    pub fn selector(&self) -> String {
        let labels: String = self
            .params
            .iter()
            .map(|p| format!("{}:", p.label.as_deref().unwrap_or("_")))
            .collect();
        format!("init({labels})")
    }
}

/// A stored property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub ty: TypeRef,

    /// Default value expression, verbatim from source.
    #[serde(default)]
    pub default: Option<String>,

    /// `var` (true) or `let` (false).
    #[serde(default)]
    pub is_mutable: bool,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            default: None,
            is_mutable: false,
        }
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }
}

/// A protocol-like declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contract {
    pub methods: Vec<Method>,
    pub initializers: Vec<Initializer>,
    pub inherits: Vec<String>,
}

/// The syntactic form of a value type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueForm {
    Struct,
    Class,
    Actor,
}

impl ValueForm {
    pub fn keyword(&self) -> &'static str {
        match self {
            ValueForm::Struct => "struct",
            ValueForm::Class => "class",
            ValueForm::Actor => "actor",
        }
    }
}

/// A field-based data shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueType {
    pub form: ValueForm,
    pub fields: Vec<Field>,
    pub methods: Vec<Method>,
    pub initializers: Vec<Initializer>,

    /// Conformance tags; pass-through metadata only.
    pub conformances: Vec<String>,
}

impl ValueType {
    pub fn new(form: ValueForm) -> Self {
        Self {
            form,
            fields: Vec::new(),
            methods: Vec::new(),
            initializers: Vec::new(),
            conformances: Vec::new(),
        }
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// An enumeration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enumeration {
    pub cases: Vec<String>,
    pub has_associated_values: bool,
    pub conformances: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum DeclarationKind {
    Contract(Contract),
    ValueType(ValueType),
    Enumeration(Enumeration),
}

/// A parsed declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
    /// Qualified name; nested declarations use dotted names (`Child1.State`).
    pub name: String,

    /// Qualified name of the enclosing declaration, if nested.
    #[serde(default)]
    pub parent: Option<String>,

    /// Name of the source unit the declaration came from.
    #[serde(default)]
    pub unit: String,

    /// Index in corpus declaration order. Assigned by [`crate::Corpus`].
    #[serde(default)]
    pub position: usize,

    /// 1-based source line of the declaration keyword.
    #[serde(default)]
    pub line: usize,

    pub kind: DeclarationKind,
}

impl Declaration {
    pub fn new(name: impl Into<String>, kind: DeclarationKind) -> Self {
        Self {
            name: name.into(),
            parent: None,
            unit: String::new(),
            position: 0,
            line: 0,
            kind,
        }
    }

    /// Unqualified name (last dotted segment).
    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    pub fn as_contract(&self) -> Option<&Contract> {
        match &self.kind {
            DeclarationKind::Contract(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_value_type(&self) -> Option<&ValueType> {
        match &self.kind {
            DeclarationKind::ValueType(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_enumeration(&self) -> Option<&Enumeration> {
        match &self.kind {
            DeclarationKind::Enumeration(e) => Some(e),
            _ => None,
        }
    }

    /// Human readable form name used in diagnostics.
    pub fn form_name(&self) -> &'static str {
        match &self.kind {
            DeclarationKind::Contract(_) => "protocol",
            DeclarationKind::ValueType(v) => v.form.keyword(),
            DeclarationKind::Enumeration(_) => "enum",
        }
    }

    /// Conformance / inheritance list.
    pub fn conformances(&self) -> &[String] {
        match &self.kind {
            DeclarationKind::Contract(c) => &c.inherits,
            DeclarationKind::ValueType(v) => &v.conformances,
            DeclarationKind::Enumeration(e) => &e.conformances,
        }
    }

    /// Every declaration name the conformance list and member signatures mention.
    pub fn mentioned_names(&self) -> BTreeSet<String> {
        let mut names: BTreeSet<String> = self.conformances().iter().cloned().collect();
        let (methods, initializers, fields) = match &self.kind {
            DeclarationKind::Contract(c) => (&c.methods[..], &c.initializers[..], &[][..]),
            DeclarationKind::ValueType(v) => (&v.methods[..], &v.initializers[..], &v.fields[..]),
            DeclarationKind::Enumeration(_) => return names,
        };
        for method in methods {
            for param in &method.params {
                param.ty.collect_names(&mut names);
            }
            method.ret.collect_names(&mut names);
        }
        for init in initializers {
            for param in &init.params {
                param.ty.collect_names(&mut names);
            }
        }
        for field in fields {
            field.ty.collect_names(&mut names);
        }
        names
    }
}

/// A declaration together with the marker strings that preceded it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedDeclaration {
    pub declaration: Declaration,
    pub markers: Vec<String>,
}

/// The output of one strategy for one declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedArtifact {
    pub strategy: Strategy,

    /// Originating declaration name.
    pub declaration: String,

    /// Output text fragments, in emission order.
    pub fragments: Vec<String>,

    /// Other declarations this artifact references.
    pub references: BTreeSet<String>,

    /// Modules the fragments need imported.
    pub imports: BTreeSet<String>,

    /// Notes surfaced alongside the artifact (not errors).
    pub diagnostics: Vec<String>,
}

impl GeneratedArtifact {
    pub fn new(strategy: Strategy, declaration: impl Into<String>) -> Self {
        Self {
            strategy,
            declaration: declaration.into(),
            fragments: Vec::new(),
            references: BTreeSet::new(),
            imports: BTreeSet::new(),
            diagnostics: Vec::new(),
        }
    }

    pub fn push_fragment(&mut self, fragment: impl Into<String>) {
        self.fragments.push(fragment.into());
    }

    pub fn reference(&mut self, name: impl Into<String>) {
        let name = name.into();
        if name != self.declaration {
            self.references.insert(name);
        }
    }

    pub fn import(&mut self, module: impl Into<String>) {
        self.imports.insert(module.into());
    }

    pub fn note(&mut self, diagnostic: impl Into<String>) {
        self.diagnostics.push(diagnostic.into());
    }

    /// Deterministic ordering key: declaration name, then strategy name.
    pub fn sort_key(&self) -> (&str, &'static str) {
        (&self.declaration, self.strategy.name())
    }

    /// All fragments joined by blank lines.
    pub fn text(&self) -> String {
        self.fragments.join("\n")
    }
}
