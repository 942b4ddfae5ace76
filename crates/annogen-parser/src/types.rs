//! Type expression grammar.
//!
//! ```text
//! type      := attribute* core ('?' | '!')*
//! core      := '[' type (':' type)? ']'
//!            | '(' elements? ')' effects ('->' type)?
//!            | 'any' core
//!            | name ('.' name)* generics?
//! elements  := (label ':')? type (',' (label ':')? type)*
//! ```
//!
//! `Optional<T>`, `Array<T>` and `Dictionary<K, V>` normalize to their
//! structural forms so `[T]` and `Array<T>` compare equal. Tuples and
//! opaque `some` types are rejected.

use crate::lexer::{TokenKind, tokenize};
use crate::parser::{Failure, MAX_NESTING, Parser};
use annogen_core::{FunctionType, TypeRef};

impl Parser<'_> {
    pub(crate) fn parse_type(&mut self) -> Result<TypeRef, Failure> {
        let line = self.current_line();
        let mut attributes = Vec::new();
        while self.at_punct('@') {
            self.pos += 1;
            attributes.push(self.expect_name("attribute")?);
        }

        let mut ty = self.parse_type_core()?;
        if !attributes.is_empty() {
            match &mut ty {
                TypeRef::Function(function) => function.attributes = attributes,
                _ => {
                    return Err(Failure::new(
                        format!("@{} only applies to function types", attributes[0]),
                        line,
                    ));
                }
            }
        }

        while self.eat_punct('?') || self.eat_punct('!') {
            ty = TypeRef::optional(ty);
        }
        Ok(ty)
    }

    /// Entry point for every nested type; bounded by `MAX_NESTING`.
    fn parse_type_core(&mut self) -> Result<TypeRef, Failure> {
        if self.depth >= MAX_NESTING {
            return Err(Failure::new("type nesting too deep", self.current_line()));
        }
        self.depth += 1;
        let ty = self.parse_type_form();
        self.depth -= 1;
        ty
    }

    fn parse_type_form(&mut self) -> Result<TypeRef, Failure> {
        let line = self.current_line();
        let Some(token) = self.peek().cloned() else {
            return Err(Failure::new("expected type, found end of body", line));
        };

        match token.kind {
            TokenKind::Punct('[') => {
                self.pos += 1;
                let first = self.parse_type()?;
                let ty = if self.eat_punct(':') {
                    let value = self.parse_type()?;
                    TypeRef::mapping(first, value)
                } else {
                    TypeRef::sequence(first)
                };
                self.expect_punct(']')?;
                Ok(ty)
            }
            TokenKind::Punct('(') => self.parse_parenthesized(),
            TokenKind::Ident(word) if word == "any" => {
                self.pos += 1;
                let constraint = self.parse_type_core()?;
                Ok(TypeRef::Existential {
                    constraint: Box::new(constraint),
                })
            }
            TokenKind::Ident(word) if word == "some" => Err(Failure::new(
                "opaque `some` types are not supported",
                line,
            )),
            TokenKind::Ident(_) => self.parse_named(),
            _ => Err(Failure::new(
                format!("expected type, found {}", self.describe_next()),
                line,
            )),
        }
    }

    /// `()`, `(T)`, or a function type `(A, B) async throws -> R`.
    fn parse_parenthesized(&mut self) -> Result<TypeRef, Failure> {
        let line = self.current_line();
        self.pos += 1;

        let mut elements = Vec::new();
        if !self.eat_punct(')') {
            loop {
                self.skip_element_label();
                self.eat_ident("inout");
                elements.push(self.parse_type()?);
                if self.eat_punct(',') {
                    continue;
                }
                self.expect_punct(')')?;
                break;
            }
        }

        let (is_async, is_throwing) = self.parse_effects()?;
        if is_async || is_throwing || self.at_arrow() {
            if !self.at_arrow() {
                return Err(Failure::new("expected `->` in function type", line));
            }
            self.pos += 1;
            let ret = self.parse_type()?;
            return Ok(TypeRef::Function(FunctionType {
                params: elements,
                is_async,
                is_throwing,
                ret: Box::new(ret),
                attributes: Vec::new(),
            }));
        }

        match elements.len() {
            0 => Ok(TypeRef::void()),
            1 => Ok(elements.remove(0)),
            _ => Err(Failure::new("tuple types are not supported", line)),
        }
    }

    /// Skip `name:` or `_ name:` inside a parenthesized type list.
    fn skip_element_label(&mut self) {
        let ident_at = |offset: usize| self.peek_at(offset).and_then(|t| t.ident()).is_some();
        let colon_at = |offset: usize| self.peek_at(offset).is_some_and(|t| t.is_punct(':'));
        if ident_at(0) && colon_at(1) {
            self.pos += 2;
        } else if ident_at(0) && ident_at(1) && colon_at(2) {
            self.pos += 3;
        }
    }

    fn parse_named(&mut self) -> Result<TypeRef, Failure> {
        let mut name = self.expect_name("type")?;
        while self.at_punct('.') && self.peek_at(1).and_then(|t| t.ident()).is_some() {
            self.pos += 1;
            name.push('.');
            name.push_str(&self.expect_name("type")?);
        }

        let mut args = Vec::new();
        if self.eat_punct('<') {
            loop {
                args.push(self.parse_type()?);
                if self.eat_punct(',') {
                    continue;
                }
                self.expect_punct('>')?;
                break;
            }
        }

        let ty = match (name.as_str(), args.len()) {
            ("Optional", 1) => TypeRef::optional(args.remove(0)),
            ("Array", 1) => TypeRef::sequence(args.remove(0)),
            ("Dictionary", 2) => {
                let value = args.remove(1);
                TypeRef::mapping(args.remove(0), value)
            }
            (_, 0) => TypeRef::from_name(&name),
            _ => TypeRef::Named { name, args },
        };
        Ok(ty)
    }
}

/// Parse a standalone type expression such as `[String: Item]?`.
pub fn parse_type_str(text: &str) -> Result<TypeRef, String> {
    let tokens = tokenize(text).map_err(|e| e.to_string())?;
    let mut parser = Parser::new("<type>", text, "", tokens);
    let ty = parser.parse_type().map_err(|f| f.reason)?;
    if parser.peek().is_some() {
        return Err(format!(
            "unexpected {} after type",
            parser.describe_next()
        ));
    }
    Ok(ty)
}

#[cfg(test)]
#[path = "types/types_tests.rs"]
mod types_tests;
