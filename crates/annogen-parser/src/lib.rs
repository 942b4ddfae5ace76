//! annogen-parser - Swift declaration reader
//!
//! Reads the declaration subset annogen generates from:
//! - [`tokenize`] hand-written lexer keeping marker comments and byte spans
//! - [`parse_source`] declarations, members and markers for one source unit
//! - [`parse_units`] many units in parallel, merged in input order
//! - [`parse_type_str`] standalone type expressions
//!
//! Parsing never stops at the first problem: each malformed declaration is
//! reported as a `MalformedDeclaration` and the rest of the unit is kept.

mod lexer;
mod parser;
mod source;
mod types;

pub use lexer::{LexError, Span, Token, TokenKind, tokenize};
pub use parser::{ParseOutcome, Rejected, parse_source};
pub use source::{DeclarationSource, SourceUnit, SwiftSource, parse_units};
pub use types::parse_type_str;
