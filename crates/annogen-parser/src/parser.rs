//! Declaration parser.
//!
//! Turns a token stream into [`ParsedDeclaration`]s. Three declaration forms
//! are recognized:
//!
//! - `protocol` → [`Contract`]: members must be `func` or `init` requirements
//! - `struct` / `class` / `actor` → [`ValueType`]: stored properties become
//!   fields, method and initializer signatures are recorded, bodies skipped
//! - `enum` → [`Enumeration`]: case names only
//!
//! Nested declarations are flattened under dotted names (`Child1.State`).
//!
//! # Markers
//!
//! Line comments starting with the marker prefix (`// sourcery: autoStub`)
//! attach to the next declaration. Ordinary comments, attributes and
//! modifiers in between keep them; any other statement discards them.
//!
//! # Errors
//!
//! A member that cannot be classified fails the enclosing declaration with
//! `MalformedDeclaration`. Parsing resumes after the declaration's closing
//! brace, so the rest of the unit is unaffected.

use crate::lexer::{Token, TokenKind, tokenize};
use annogen_core::{
    Contract, Declaration, DeclarationKind, Enumeration, Field, GenerationError, Initializer,
    Method, Parameter, ParsedDeclaration, TypeRef, ValueForm, ValueType,
};

/// Modifiers skipped wherever they appear before a member or declaration.
const MODIFIERS: &[&str] = &[
    "public",
    "internal",
    "private",
    "fileprivate",
    "open",
    "package",
    "final",
    "nonisolated",
    "indirect",
    "dynamic",
    "weak",
    "unowned",
];

/// Modifiers accepted only on members of concrete types.
const IMPLEMENTATION_MODIFIERS: &[&str] = &[
    "mutating",
    "nonmutating",
    "override",
    "convenience",
    "required",
];

const DECLARATION_KEYWORDS: &[&str] = &["protocol", "struct", "class", "actor", "enum"];

/// Keywords that open a statement; on a new line they end a header.
const STATEMENT_KEYWORDS: &[&str] = &[
    "import",
    "extension",
    "typealias",
    "func",
    "init",
    "let",
    "var",
    "case",
    "static",
];

/// Bound on nested types and nested declarations.
pub(crate) const MAX_NESTING: usize = 128;

/// Result of parsing one source unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOutcome {
    pub declarations: Vec<ParsedDeclaration>,
    pub errors: Vec<GenerationError>,
    /// Named declarations behind the `MalformedDeclaration` entries in `errors`.
    pub rejected: Vec<Rejected>,
}

impl ParseOutcome {
    /// Append another outcome, keeping order.
    pub fn merge(&mut self, other: ParseOutcome) {
        self.declarations.extend(other.declarations);
        self.errors.extend(other.errors);
        self.rejected.extend(other.rejected);
    }
}

/// A declaration dropped for being malformed, with the markers it carried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejected {
    pub declaration: String,
    pub parent: Option<String>,
    pub markers: Vec<String>,
}

/// Parse a whole source unit.
pub fn parse_source(unit: &str, source: &str, marker_prefix: &str) -> ParseOutcome {
    let tokens = match tokenize(source) {
        Ok(tokens) => tokens,
        Err(err) => {
            return ParseOutcome {
                declarations: Vec::new(),
                errors: vec![GenerationError::MalformedDeclaration {
                    declaration: unit.to_string(),
                    member: None,
                    reason: err.to_string(),
                    line: err.line(),
                }],
                rejected: Vec::new(),
            };
        }
    };

    let mut parser = Parser::new(unit, source, marker_prefix, tokens);
    parser.parse_items();
    parser.finish()
}

/// Why a member or declaration could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Failure {
    pub member: Option<String>,
    pub reason: String,
    pub line: usize,
}

impl Failure {
    pub(crate) fn new(reason: impl Into<String>, line: usize) -> Self {
        Self {
            member: None,
            reason: reason.into(),
            line,
        }
    }

    /// Attribute the failure to a member unless it already names one.
    pub(crate) fn in_member(mut self, member: &str) -> Self {
        if self.member.is_none() {
            self.member = Some(member.to_string());
        }
        self
    }
}

pub(crate) struct Parser<'a> {
    unit: &'a str,
    source: &'a str,
    marker_prefix: &'a str,
    pub(crate) tokens: Vec<Token>,
    pub(crate) pos: usize,
    /// Exclusive bound of the region being parsed (a body or the whole unit).
    pub(crate) end: usize,
    /// Current nesting of types and declarations.
    pub(crate) depth: usize,
    declarations: Vec<ParsedDeclaration>,
    errors: Vec<GenerationError>,
    rejected: Vec<Rejected>,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(
        unit: &'a str,
        source: &'a str,
        marker_prefix: &'a str,
        tokens: Vec<Token>,
    ) -> Self {
        let end = tokens.len();
        Self {
            unit,
            source,
            marker_prefix,
            tokens,
            pos: 0,
            end,
            depth: 0,
            declarations: Vec::new(),
            errors: Vec::new(),
            rejected: Vec::new(),
        }
    }

    fn finish(self) -> ParseOutcome {
        tracing::debug!(
            unit = self.unit,
            declarations = self.declarations.len(),
            errors = self.errors.len(),
            "parsed source unit"
        );
        ParseOutcome {
            declarations: self.declarations,
            errors: self.errors,
            rejected: self.rejected,
        }
    }

    // ------------------------------------------------------------------
    // Token cursor
    // ------------------------------------------------------------------

    pub(crate) fn peek(&self) -> Option<&Token> {
        self.peek_at(0)
    }

    pub(crate) fn peek_at(&self, offset: usize) -> Option<&Token> {
        let index = self.pos + offset;
        if index < self.end {
            self.tokens.get(index)
        } else {
            None
        }
    }

    pub(crate) fn at_ident(&self, word: &str) -> bool {
        self.peek().is_some_and(|t| t.is_ident(word))
    }

    pub(crate) fn at_punct(&self, c: char) -> bool {
        self.peek().is_some_and(|t| t.is_punct(c))
    }

    pub(crate) fn at_arrow(&self) -> bool {
        self.peek().is_some_and(|t| t.kind == TokenKind::Arrow)
    }

    pub(crate) fn eat_ident(&mut self, word: &str) -> bool {
        let found = self.at_ident(word);
        if found {
            self.pos += 1;
        }
        found
    }

    pub(crate) fn eat_punct(&mut self, c: char) -> bool {
        let found = self.at_punct(c);
        if found {
            self.pos += 1;
        }
        found
    }

    /// Line of the next token, or of the last token in the region.
    pub(crate) fn current_line(&self) -> usize {
        self.peek()
            .or_else(|| self.tokens.get(self.pos.saturating_sub(1)))
            .map(|t| t.line)
            .unwrap_or(0)
    }

    pub(crate) fn expect_punct(&mut self, c: char) -> Result<(), Failure> {
        if self.eat_punct(c) {
            Ok(())
        } else {
            Err(Failure::new(
                format!("expected `{c}`, found {}", self.describe_next()),
                self.current_line(),
            ))
        }
    }

    pub(crate) fn expect_name(&mut self, what: &str) -> Result<String, Failure> {
        match self.peek().and_then(Token::ident) {
            Some(name) => {
                let name = name.to_string();
                self.pos += 1;
                Ok(name)
            }
            None => Err(Failure::new(
                format!("expected {what} name, found {}", self.describe_next()),
                self.current_line(),
            )),
        }
    }

    pub(crate) fn describe_next(&self) -> String {
        match self.peek().map(|t| &t.kind) {
            None => "end of body".to_string(),
            Some(TokenKind::Ident(w)) => format!("`{w}`"),
            Some(TokenKind::Punct(c)) => format!("`{c}`"),
            Some(TokenKind::Arrow) => "`->`".to_string(),
            Some(TokenKind::Comment(_)) => "comment".to_string(),
            Some(TokenKind::StringLit) => "string literal".to_string(),
            Some(TokenKind::Number) => "number".to_string(),
        }
    }

    /// Index of the bracket closing the one at `open`, within the region.
    fn matching(&self, open: usize) -> Option<usize> {
        let (open_c, close_c) = match self.tokens.get(open)?.kind {
            TokenKind::Punct('{') => ('{', '}'),
            TokenKind::Punct('(') => ('(', ')'),
            TokenKind::Punct('[') => ('[', ']'),
            TokenKind::Punct('<') => ('<', '>'),
            _ => return None,
        };
        let mut depth = 0usize;
        for (index, token) in self.tokens[..self.end].iter().enumerate().skip(open) {
            if token.is_punct(open_c) {
                depth += 1;
            } else if token.is_punct(close_c) {
                depth -= 1;
                if depth == 0 {
                    return Some(index);
                }
            }
        }
        None
    }

    /// Skip a bracketed group starting at the cursor; runs to the region end if unbalanced.
    pub(crate) fn skip_balanced(&mut self) {
        match self.matching(self.pos) {
            Some(close) => self.pos = close + 1,
            None => self.pos = self.end,
        }
    }

    fn is_opener(token: &Token) -> bool {
        matches!(token.kind, TokenKind::Punct('{' | '(' | '['))
    }

    /// Token index one past the end of the statement starting at the cursor.
    ///
    /// A statement ends at `;`, at the region end, or before the first
    /// bracket-depth-0 token on a later line that does not continue the
    /// expression (a leading `.` or `->` continues it). With `stop_at_observers`
    /// a `{ willSet/didSet ... }` block also ends it.
    fn statement_end(&self, stop_at_observers: bool) -> usize {
        let mut index = self.pos;
        let mut last_line = match self.tokens.get(index) {
            Some(t) if index < self.end => t.line,
            _ => return index,
        };

        while index < self.end {
            let token = &self.tokens[index];
            if token.is_punct(';') || token.is_punct('}') {
                break;
            }
            let continues = token.is_punct('.') || token.kind == TokenKind::Arrow;
            if index > self.pos && token.line > last_line && !continues {
                break;
            }
            if stop_at_observers && token.is_punct('{') && self.opens_observers(index) {
                break;
            }
            if Self::is_opener(token) {
                match self.matching(index) {
                    Some(close) => {
                        last_line = self.tokens[close].line;
                        index = close + 1;
                    }
                    None => return self.end,
                }
                continue;
            }
            if !matches!(token.kind, TokenKind::Comment(_)) {
                last_line = token.line;
            }
            index += 1;
        }
        index
    }

    fn opens_observers(&self, open: usize) -> bool {
        self.tokens[open + 1..self.end]
            .iter()
            .find(|t| !matches!(t.kind, TokenKind::Comment(_)))
            .is_some_and(|t| t.is_ident("willSet") || t.is_ident("didSet"))
    }

    /// Skip the statement at the cursor, always making progress.
    pub(crate) fn skip_statement(&mut self) {
        let end = self.statement_end(false);
        self.pos = end.max(self.pos + 1).min(self.end);
        self.eat_punct(';');
    }

    /// Verbatim source text of tokens `[from, to)`, ignoring trailing comments.
    fn source_text(&self, from: usize, to: usize) -> String {
        let last = self.tokens[from..to]
            .iter()
            .rposition(|t| !matches!(t.kind, TokenKind::Comment(_)))
            .map(|offset| from + offset);
        match last {
            Some(last) => self.source[self.tokens[from].span.start..self.tokens[last].span.end]
                .trim()
                .to_string(),
            None => String::new(),
        }
    }

    /// Capture an expression up to the end of the statement.
    fn capture_expression(&mut self) -> Result<String, Failure> {
        let line = self.current_line();
        let start = self.pos;
        let end = self.statement_end(true);
        self.pos = end;
        let text = self.source_text(start, end);
        if text.is_empty() {
            return Err(Failure::new("expected default value", line));
        }
        Ok(text)
    }

    /// Capture a default argument up to the next `,` or `)` at depth 0.
    fn capture_argument(&mut self) -> Result<String, Failure> {
        let line = self.current_line();
        let start = self.pos;
        while let Some(token) = self.peek() {
            if token.is_punct(',') || token.is_punct(')') {
                break;
            }
            if Self::is_opener(token) {
                self.skip_balanced();
            } else {
                self.pos += 1;
            }
        }
        let text = self.source_text(start, self.pos);
        if text.is_empty() {
            return Err(Failure::new("expected default value", line));
        }
        Ok(text)
    }

    /// Skip `@Attribute` and an argument list glued to it.
    fn skip_attribute(&mut self) {
        self.pos += 1;
        if self.peek().and_then(Token::ident).is_some() {
            self.pos += 1;
            self.skip_glued_parens();
        }
    }

    /// Skip a modifier such as `private(set)`.
    fn skip_modifier(&mut self) {
        self.pos += 1;
        self.skip_glued_parens();
    }

    fn skip_glued_parens(&mut self) {
        let glued = match (self.tokens.get(self.pos.wrapping_sub(1)), self.peek()) {
            (Some(prev), Some(next)) => next.is_punct('(') && next.span.start == prev.span.end,
            _ => false,
        };
        if glued {
            self.skip_balanced();
        }
    }

    fn markers_in(&self, comment: &str) -> Vec<String> {
        match comment.strip_prefix(self.marker_prefix) {
            Some(rest) => rest
                .split(',')
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(str::to_string)
                .collect(),
            None => Vec::new(),
        }
    }

    // ------------------------------------------------------------------
    // Declarations
    // ------------------------------------------------------------------

    /// Parse top-level items in the current region.
    fn parse_items(&mut self) {
        let mut markers = Vec::new();
        while let Some(token) = self.peek().cloned() {
            match &token.kind {
                TokenKind::Comment(text) => {
                    markers.extend(self.markers_in(text));
                    self.pos += 1;
                }
                TokenKind::Punct('@') => self.skip_attribute(),
                TokenKind::Ident(word) if MODIFIERS.contains(&word.as_str()) => {
                    self.skip_modifier()
                }
                TokenKind::Ident(word) if DECLARATION_KEYWORDS.contains(&word.as_str()) => {
                    let markers = std::mem::take(&mut markers);
                    self.parse_declaration(word, None, markers);
                }
                _ => {
                    markers.clear();
                    self.skip_statement();
                }
            }
        }
    }

    /// Parse one declaration starting at its keyword.
    fn parse_declaration(&mut self, keyword: &str, parent: Option<&str>, markers: Vec<String>) {
        let line = self.current_line();
        self.pos += 1;

        let name = match self.expect_name(keyword) {
            Ok(name) => name,
            Err(failure) => {
                let owner = parent.unwrap_or(self.unit).to_string();
                self.errors.push(malformed(&owner, failure));
                self.skip_statement();
                return;
            }
        };
        let qualified = match parent {
            Some(parent) => format!("{parent}.{name}"),
            None => name,
        };

        let header = self.parse_header();
        if header.is_err() {
            self.skip_header_rest();
        }

        let resume = self.pos;
        while self
            .peek()
            .is_some_and(|t| matches!(t.kind, TokenKind::Comment(_)))
        {
            self.pos += 1;
        }
        let braces = if self.at_punct('{') {
            self.matching(self.pos).map(|close| (self.pos, close))
        } else {
            None
        };
        let Some((open, close)) = braces else {
            let failure = match header {
                Err(failure) => failure,
                Ok(_) if self.at_punct('{') => Failure::new("unbalanced braces", line),
                Ok(_) => Failure::new(format!("expected `{{`, found {}", self.describe_next()), line),
            };
            // An unclosed body swallows the rest of the region.
            self.pos = if self.at_punct('{') { self.end } else { resume };
            self.reject(&qualified, parent, markers, failure);
            return;
        };

        let conformances = match header {
            Ok(conformances) => conformances,
            Err(failure) => {
                self.pos = close + 1;
                self.reject(&qualified, parent, markers, failure);
                return;
            }
        };

        if self.depth >= MAX_NESTING {
            self.pos = close + 1;
            let failure = Failure::new("declaration nesting too deep", line);
            self.reject(&qualified, parent, markers, failure);
            return;
        }

        let slot = self.declarations.len();
        let saved_end = self.end;
        self.pos = open + 1;
        self.end = close;
        self.depth += 1;

        let body = match keyword {
            "protocol" => self.parse_contract_body().map(|mut contract| {
                contract.inherits = conformances;
                DeclarationKind::Contract(contract)
            }),
            "enum" => self.parse_enum_body(&qualified).map(|mut enumeration| {
                enumeration.conformances = conformances;
                DeclarationKind::Enumeration(enumeration)
            }),
            _ => {
                let form = match keyword {
                    "class" => ValueForm::Class,
                    "actor" => ValueForm::Actor,
                    _ => ValueForm::Struct,
                };
                self.parse_value_body(&qualified, form).map(|mut value| {
                    value.conformances = conformances;
                    DeclarationKind::ValueType(value)
                })
            }
        };

        self.depth -= 1;
        self.end = saved_end;
        self.pos = close + 1;

        match body {
            Ok(kind) => {
                tracing::debug!(
                    unit = self.unit,
                    declaration = %qualified,
                    form = keyword,
                    markers = markers.len(),
                    "parsed declaration"
                );
                let mut declaration = Declaration::new(qualified, kind);
                declaration.parent = parent.map(str::to_string);
                declaration.unit = self.unit.to_string();
                declaration.line = line;
                self.declarations.insert(
                    slot,
                    ParsedDeclaration {
                        declaration,
                        markers,
                    },
                );
            }
            Err(failure) => {
                // Nested declarations go down with their parent.
                self.declarations.truncate(slot);
                self.reject(&qualified, parent, markers, failure);
            }
        }
    }

    fn reject(
        &mut self,
        declaration: &str,
        parent: Option<&str>,
        markers: Vec<String>,
        failure: Failure,
    ) {
        tracing::debug!(declaration, reason = %failure.reason, "malformed declaration");
        self.errors.push(malformed(declaration, failure));
        self.rejected.push(Rejected {
            declaration: declaration.to_string(),
            parent: parent.map(str::to_string),
            markers,
        });
    }

    /// Whether the token at `index` begins the next item rather than
    /// continuing a declaration header.
    fn starts_next_item(&self, index: usize) -> bool {
        let token = &self.tokens[index];
        if matches!(token.kind, TokenKind::Comment(_)) {
            return true;
        }
        let on_new_line = index > 0 && token.line > self.tokens[index - 1].line;
        on_new_line
            && (token.is_punct('@')
                || token.ident().is_some_and(|w| {
                    DECLARATION_KEYWORDS.contains(&w)
                        || MODIFIERS.contains(&w)
                        || STATEMENT_KEYWORDS.contains(&w)
                }))
    }

    /// Skip what is left of a rejected header, stopping at the body or the next item.
    fn skip_header_rest(&mut self) {
        while let Some(token) = self.peek() {
            if token.is_punct('{') || self.starts_next_item(self.pos) {
                break;
            }
            if token.is_punct('<') || Self::is_opener(token) {
                self.skip_balanced();
            } else {
                self.pos += 1;
            }
        }
    }

    /// Parse `: A, B<C>` up to the body; generic declarations are rejected.
    fn parse_header(&mut self) -> Result<Vec<String>, Failure> {
        if self.at_punct('<') {
            return Err(Failure::new(
                "generic declarations are not supported",
                self.current_line(),
            ));
        }

        let mut conformances = Vec::new();
        if self.eat_punct(':') {
            loop {
                let start = self.pos;
                while let Some(token) = self.peek() {
                    if token.is_punct(',')
                        || token.is_punct('{')
                        || token.is_ident("where")
                        || self.starts_next_item(self.pos)
                    {
                        break;
                    }
                    if token.is_punct('<') {
                        self.skip_balanced();
                    } else {
                        self.pos += 1;
                    }
                }
                let text = self.source_text(start, self.pos);
                if text.is_empty() {
                    return Err(Failure::new(
                        "expected conformance name",
                        self.current_line(),
                    ));
                }
                conformances.push(text);
                if !self.eat_punct(',') {
                    break;
                }
            }
        }

        if self.at_ident("where") {
            return Err(Failure::new(
                "generic where clauses are not supported",
                self.current_line(),
            ));
        }
        Ok(conformances)
    }

    fn parse_contract_body(&mut self) -> Result<Contract, Failure> {
        let mut contract = Contract::default();
        while let Some(token) = self.peek().cloned() {
            match &token.kind {
                TokenKind::Comment(_) | TokenKind::Punct(';') => self.pos += 1,
                TokenKind::Punct('@') => self.skip_attribute(),
                TokenKind::Ident(word) if MODIFIERS.contains(&word.as_str()) => {
                    self.skip_modifier()
                }
                TokenKind::Ident(word) if word == "func" => {
                    contract.methods.push(self.parse_method()?);
                }
                TokenKind::Ident(word) if word == "init" => {
                    contract.initializers.push(self.parse_initializer()?);
                }
                TokenKind::Ident(word) => return Err(self.unclassifiable(word, token.line)),
                _ => {
                    return Err(Failure::new(
                        format!("unexpected {} in protocol body", self.describe_next()),
                        token.line,
                    ));
                }
            }
        }
        Ok(contract)
    }

    fn unclassifiable(&self, word: &str, line: usize) -> Failure {
        let reason = match word {
            "var" | "let" => "property requirements are not supported",
            "associatedtype" => "associated types are not supported",
            "subscript" => "subscript requirements are not supported",
            "static" | "class" => "static requirements are not supported",
            "mutating" | "nonmutating" => "mutating requirements are not supported",
            "typealias" => "type aliases in protocols are not supported",
            _ => "cannot classify member",
        };
        let member = match self.peek_at(1).and_then(Token::ident) {
            Some(next) => format!("{word} {next}"),
            None => word.to_string(),
        };
        Failure::new(reason, line).in_member(&member)
    }

    /// Parse `func name(params) async throws -> Ret` at the cursor.
    fn parse_method(&mut self) -> Result<Method, Failure> {
        self.pos += 1;
        let name = self.expect_name("method")?;
        let member = format!("func {name}");

        if self.at_punct('<') {
            return Err(
                Failure::new("generic methods are not supported", self.current_line())
                    .in_member(&member),
            );
        }

        let params = self
            .parse_parameters()
            .map_err(|f| f.in_member(&member))?;
        let (is_async, is_throwing) = self.parse_effects().map_err(|f| f.in_member(&member))?;
        let ret = if self.eat_punct_arrow() {
            self.parse_type().map_err(|f| f.in_member(&member))?
        } else {
            TypeRef::void()
        };

        if self.at_ident("where") {
            return Err(
                Failure::new("generic methods are not supported", self.current_line())
                    .in_member(&member),
            );
        }

        Ok(Method {
            name,
            params,
            is_async,
            is_throwing,
            ret,
        })
    }

    fn eat_punct_arrow(&mut self) -> bool {
        let found = self.at_arrow();
        if found {
            self.pos += 1;
        }
        found
    }

    /// Parse `init(params) async throws` at the cursor.
    fn parse_initializer(&mut self) -> Result<Initializer, Failure> {
        let line = self.current_line();
        self.pos += 1;
        let member = "init";

        if self.at_punct('?') || self.at_punct('!') {
            return Err(Failure::new("failable initializers are not supported", line)
                .in_member(member));
        }
        if self.at_punct('<') {
            return Err(
                Failure::new("generic initializers are not supported", line).in_member(member)
            );
        }

        let params = self.parse_parameters().map_err(|f| f.in_member(member))?;
        let (is_async, is_throwing) = self.parse_effects().map_err(|f| f.in_member(member))?;
        Ok(Initializer {
            params,
            is_async,
            is_throwing,
        })
    }

    /// Parse `async`, `throws` and typed `throws(E)` in any order.
    pub(crate) fn parse_effects(&mut self) -> Result<(bool, bool), Failure> {
        let mut is_async = false;
        let mut is_throwing = false;
        loop {
            if self.eat_ident("async") {
                is_async = true;
            } else if self.eat_ident("throws") {
                is_throwing = true;
                self.skip_glued_parens();
            } else if self.at_ident("rethrows") {
                return Err(Failure::new(
                    "rethrowing members are not supported",
                    self.current_line(),
                ));
            } else {
                return Ok((is_async, is_throwing));
            }
        }
    }

    fn parse_parameters(&mut self) -> Result<Vec<Parameter>, Failure> {
        self.expect_punct('(')?;
        let mut params = Vec::new();
        if self.eat_punct(')') {
            return Ok(params);
        }
        loop {
            let index = params.len();
            params.push(self.parse_parameter(index)?);
            if self.eat_punct(',') {
                continue;
            }
            self.expect_punct(')')?;
            return Ok(params);
        }
    }

    fn parse_parameter(&mut self, index: usize) -> Result<Parameter, Failure> {
        let first = self.expect_name("parameter")?;
        let (label, name) = match self.peek().and_then(Token::ident) {
            Some(second) => {
                let second = second.to_string();
                self.pos += 1;
                ((first != "_").then_some(first), second)
            }
            None if first == "_" => (None, format!("arg{index}")),
            None => (Some(first.clone()), first),
        };

        self.expect_punct(':')?;
        let is_inout = self.eat_ident("inout");
        let ty = self.parse_type()?;

        if self.at_punct('.') {
            return Err(Failure::new(
                format!("variadic parameter `{name}` is not supported"),
                self.current_line(),
            ));
        }

        let default = if self.eat_punct('=') {
            Some(self.capture_argument()?)
        } else {
            None
        };

        Ok(Parameter {
            label,
            name,
            ty,
            default,
            is_inout,
        })
    }

    fn parse_value_body(&mut self, owner: &str, form: ValueForm) -> Result<ValueType, Failure> {
        let mut value = ValueType::new(form);
        let mut markers = Vec::new();
        let mut attributed = false;

        while let Some(token) = self.peek().cloned() {
            let word = match &token.kind {
                TokenKind::Comment(text) => {
                    markers.extend(self.markers_in(text));
                    self.pos += 1;
                    continue;
                }
                TokenKind::Punct(';') => {
                    self.pos += 1;
                    continue;
                }
                TokenKind::Punct('@') => {
                    self.skip_attribute();
                    attributed = true;
                    continue;
                }
                TokenKind::Punct('#') => {
                    self.skip_statement();
                    continue;
                }
                TokenKind::Ident(word) => word.clone(),
                _ => {
                    return Err(Failure::new(
                        format!("unexpected {} in {} body", self.describe_next(), form.keyword()),
                        token.line,
                    ));
                }
            };

            if MODIFIERS.contains(&word.as_str())
                || IMPLEMENTATION_MODIFIERS.contains(&word.as_str())
            {
                self.skip_modifier();
                continue;
            }

            match word.as_str() {
                "static" | "lazy" => self.skip_statement(),
                "class" if self.next_is_member_keyword() => self.skip_statement(),
                "let" | "var" if attributed => {
                    tracing::debug!(declaration = owner, "skipping attributed property");
                    self.skip_statement();
                }
                "let" | "var" => {
                    if let Some(field) = self.parse_stored_property(&word)? {
                        value.fields.push(field);
                    }
                }
                "func" => {
                    let start = self.pos;
                    match self.parse_method() {
                        Ok(method) => {
                            self.skip_body();
                            value.methods.push(method);
                        }
                        Err(failure) => self.skip_unsupported(owner, start, failure),
                    }
                }
                "init" => {
                    let start = self.pos;
                    match self.parse_initializer() {
                        Ok(init) => {
                            self.skip_body();
                            value.initializers.push(init);
                        }
                        Err(failure) => self.skip_unsupported(owner, start, failure),
                    }
                }
                "deinit" | "subscript" | "typealias" | "extension" => self.skip_statement(),
                keyword if DECLARATION_KEYWORDS.contains(&keyword) => {
                    let nested_markers = std::mem::take(&mut markers);
                    self.parse_declaration(keyword, Some(owner), nested_markers);
                }
                other => {
                    return Err(
                        Failure::new("cannot classify member", token.line).in_member(other)
                    );
                }
            }
            markers.clear();
            attributed = false;
        }
        Ok(value)
    }

    /// Concrete types may carry signatures the model cannot express; they are
    /// left out of the declaration instead of failing it.
    fn skip_unsupported(&mut self, owner: &str, start: usize, failure: Failure) {
        tracing::debug!(
            declaration = owner,
            member = failure.member.as_deref().unwrap_or_default(),
            reason = %failure.reason,
            "skipping unsupported member"
        );
        self.pos = start;
        self.skip_statement();
    }

    fn next_is_member_keyword(&self) -> bool {
        self.peek_at(1)
            .and_then(Token::ident)
            .is_some_and(|w| matches!(w, "var" | "let" | "func" | "subscript"))
    }

    /// Skip a `{ ... }` body if one follows.
    fn skip_body(&mut self) {
        if self.at_punct('{') {
            self.skip_balanced();
        }
    }

    /// Parse `let|var name: Type [= default]`; computed properties yield `None`.
    fn parse_stored_property(&mut self, keyword: &str) -> Result<Option<Field>, Failure> {
        self.pos += 1;
        let name = self.expect_name("property")?;
        let member = format!("{keyword} {name}");

        if self.at_punct(',') {
            return Err(Failure::new(
                "multiple bindings in one declaration are not supported",
                self.current_line(),
            )
            .in_member(&member));
        }
        if !self.eat_punct(':') {
            return Err(Failure::new(
                "stored properties need an explicit type annotation",
                self.current_line(),
            )
            .in_member(&member));
        }

        let ty = self.parse_type().map_err(|f| f.in_member(&member))?;
        let default = if self.eat_punct('=') {
            Some(self.capture_expression().map_err(|f| f.in_member(&member))?)
        } else {
            None
        };

        if self.at_punct('{') {
            let observers = self.opens_observers(self.pos);
            self.skip_balanced();
            if !observers {
                return Ok(None);
            }
        }

        Ok(Some(Field {
            name,
            ty,
            default,
            is_mutable: keyword == "var",
        }))
    }

    fn parse_enum_body(&mut self, owner: &str) -> Result<Enumeration, Failure> {
        let mut enumeration = Enumeration::default();
        let mut markers = Vec::new();

        while let Some(token) = self.peek().cloned() {
            let word = match &token.kind {
                TokenKind::Comment(text) => {
                    markers.extend(self.markers_in(text));
                    self.pos += 1;
                    continue;
                }
                TokenKind::Punct(';') => {
                    self.pos += 1;
                    continue;
                }
                TokenKind::Punct('@') => {
                    self.skip_attribute();
                    continue;
                }
                TokenKind::Ident(word) => word.clone(),
                _ => {
                    return Err(Failure::new(
                        format!("unexpected {} in enum body", self.describe_next()),
                        token.line,
                    ));
                }
            };

            if MODIFIERS.contains(&word.as_str()) {
                self.skip_modifier();
                continue;
            }

            match word.as_str() {
                "case" => {
                    self.pos += 1;
                    self.parse_cases(&mut enumeration)?;
                }
                "class" if self.next_is_member_keyword() => self.skip_statement(),
                keyword if DECLARATION_KEYWORDS.contains(&keyword) => {
                    let nested_markers = std::mem::take(&mut markers);
                    self.parse_declaration(keyword, Some(owner), nested_markers);
                }
                _ => self.skip_statement(),
            }
            markers.clear();
        }
        Ok(enumeration)
    }

    fn parse_cases(&mut self, enumeration: &mut Enumeration) -> Result<(), Failure> {
        loop {
            let name = self.expect_name("case")?;
            enumeration.cases.push(name);
            if self.at_punct('(') {
                enumeration.has_associated_values = true;
                self.skip_balanced();
            }
            if self.eat_punct('=') {
                self.eat_punct('-');
                self.pos += 1;
            }
            if !self.eat_punct(',') {
                return Ok(());
            }
        }
    }
}

fn malformed(declaration: &str, failure: Failure) -> GenerationError {
    GenerationError::MalformedDeclaration {
        declaration: declaration.to_string(),
        member: failure.member,
        reason: failure.reason,
        line: failure.line,
    }
}

#[cfg(test)]
#[path = "parser/parser_tests.rs"]
mod parser_tests;
