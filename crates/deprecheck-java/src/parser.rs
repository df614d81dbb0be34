//! Structural Java parser
//!
//! Recovers declarations (package, imports, types, members) and scans method
//! bodies for member accesses, tracking just enough about local bindings to
//! know the static type of simple receivers. It is deliberately tolerant:
//! anything it does not understand is skipped rather than reported.

use crate::javadoc::{self, Annotation};
use crate::lexer::{self, LexError, Token};
use crate::scope::{ScopeStack, TypeNames};
use crate::syntax::{
    CompilationUnit, Import, MemberAccess, MemberDecl, MemberDeclKind, Receiver, TypeDecl, TypeKind, TypeName,
};
use crate::unit::SourceUnit;
use deprecheck_core::{MemberKind, Position, Span, TypeRef, UnitId};
use std::collections::{HashSet, VecDeque};
use std::ops::Range;
use std::path::{Path, PathBuf};

const MODIFIERS: &[&str] = &[
    "public", "protected", "private", "static", "final", "abstract", "native", "synchronized",
    "transient", "volatile", "strictfp", "default", "sealed",
];

const TYPE_KEYWORDS: &[&str] = &["class", "interface", "enum", "record"];

/// Words that can never start a local variable's type or be its name
const RESERVED: &[&str] = &[
    "assert", "break", "case", "catch", "class", "continue", "do", "else", "enum", "false", "finally",
    "for", "goto", "if", "import", "instanceof", "interface", "new", "null", "package", "return",
    "super", "switch", "synchronized", "this", "throw", "throws", "true", "try", "while", "yield",
];

/// Java parser
pub struct JavaParser;

impl JavaParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse Java source text into a source unit
    pub fn parse(&self, id: UnitId, text: &str) -> Result<SourceUnit, ParseError> {
        let tokens = lexer::tokenize(text).map_err(|source| ParseError::Lex {
            unit: id.clone(),
            source,
        })?;

        let mut structure = StructureParser::new(&tokens);
        structure.parse();
        let (syntax, bodies) = structure.finish();

        let names = TypeNames::new(syntax.package.as_deref(), &syntax.imports, &syntax.types);
        let mut accesses = Vec::new();
        for body in &bodies {
            BodyScanner {
                tokens: &tokens,
                names: &names,
                types: &syntax.types,
                owner: body.owner,
                scopes: ScopeStack::new(),
                anonymous: Vec::new(),
                lambda_ends: Vec::new(),
                accesses: &mut accesses,
            }
            .scan(body);
        }
        accesses.sort_by_key(|a: &MemberAccess| a.span.start);

        Ok(SourceUnit::new(id, text.to_string(), syntax, accesses))
    }

    /// Parse a Java file, identified by its path
    pub fn parse_file(&self, path: &Path) -> Result<SourceUnit, ParseError> {
        let text = std::fs::read_to_string(path).map_err(|e| ParseError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        self.parse(UnitId::from_path(path), &text)
    }
}

impl Default for JavaParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse errors
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("{unit}: {source}")]
    Lex {
        unit: UnitId,
        #[source]
        source: LexError,
    },

    #[error("Failed to read {}: {message}", path.display())]
    Io { path: PathBuf, message: String },
}

impl ParseError {
    /// Where in the text the error was found, if it concerns the text
    pub fn position(&self) -> Option<Position> {
        match self {
            Self::Lex { source, .. } => Some(source.position()),
            Self::Io { .. } => None,
        }
    }

    /// The unit that failed to parse
    pub fn unit(&self) -> UnitId {
        match self {
            Self::Lex { unit, .. } => unit.clone(),
            Self::Io { path, .. } => UnitId::from_path(path),
        }
    }
}

/// Token range to scan for member accesses, with its owning type
#[derive(Debug)]
struct Body {
    owner: usize,
    params: Vec<(String, TypeName)>,
    range: Range<usize>,
}

#[derive(Debug, Default)]
struct Modifiers {
    doc: Option<String>,
    annotations: Vec<Annotation>,
}

impl Modifiers {
    fn deprecation(&self) -> Option<javadoc::Deprecation> {
        javadoc::deprecation(&self.annotations, self.doc.as_deref())
    }
}

fn matching_forward(tokens: &[Token], open_idx: usize, open: &str, close: &str) -> usize {
    let mut depth = 0usize;
    for (i, tok) in tokens.iter().enumerate().skip(open_idx) {
        if tok.is_punct(open) {
            depth += 1;
        } else if tok.is_punct(close) {
            depth -= 1;
            if depth == 0 {
                return i;
            }
        }
    }
    tokens.len()
}

fn matching_backward(tokens: &[Token], close_idx: usize, open: &str, close: &str) -> Option<usize> {
    let mut depth = 0usize;
    for i in (0..=close_idx).rev() {
        let tok = &tokens[i];
        if tok.is_punct(close) {
            depth += 1;
        } else if tok.is_punct(open) {
            depth -= 1;
            if depth == 0 {
                return Some(i);
            }
        }
    }
    None
}

/// Type as written in a declaration: dotted name, optional generics, dims
fn type_name(tokens: &[Token]) -> Option<TypeName> {
    let mut name = String::new();
    let mut array_dims = 0;
    let mut angle = 0usize;
    let mut in_annotation = false;

    for tok in tokens {
        if angle > 0 {
            if tok.is_punct("<") {
                angle += 1;
            } else if tok.is_punct(">") {
                angle -= 1;
            }
            continue;
        }
        if in_annotation {
            in_annotation = false;
            if tok.is_ident() {
                continue;
            }
        }

        if tok.is_punct("<") {
            angle = 1;
        } else if tok.is_punct("@") {
            in_annotation = true;
        } else if tok.is_ident() {
            if MODIFIERS.contains(&tok.text.as_str()) {
                continue;
            }
            if !name.is_empty() && !name.ends_with('.') {
                return None;
            }
            name.push_str(&tok.text);
        } else if tok.is_punct(".") {
            name.push('.');
        } else if tok.is_punct("[") || tok.is_punct("...") {
            array_dims += 1;
        } else if !tok.is_punct("]") {
            return None;
        }
    }

    (!name.is_empty() && !name.ends_with('.')).then_some(TypeName { name, array_dims })
}

/// Split a parameter list into `(name, type)` pairs
/// Index just past an expression starting at `from`: the first `,` or `;` at
/// its own nesting level, or the bracket that closes its enclosing group
fn expression_end(tokens: &[Token], from: usize, end: usize) -> usize {
    let mut depth = 0usize;
    for (k, tok) in tokens.iter().enumerate().take(end).skip(from) {
        if tok.is_punct("(") || tok.is_punct("[") || tok.is_punct("{") {
            depth += 1;
        } else if tok.is_punct(")") || tok.is_punct("]") || tok.is_punct("}") {
            if depth == 0 {
                return k;
            }
            depth -= 1;
        } else if depth == 0 && (tok.is_punct(",") || tok.is_punct(";")) {
            return k;
        }
    }
    end
}

fn parameters(tokens: &[Token]) -> Vec<(String, TypeName)> {
    let mut params = Vec::new();
    let mut depth = 0isize;
    let mut start = 0;

    for i in 0..=tokens.len() {
        let at_end = i == tokens.len();
        if !at_end {
            let tok = &tokens[i];
            if tok.is_punct("<") || tok.is_punct("(") {
                depth += 1;
            } else if tok.is_punct(">") || tok.is_punct(")") {
                depth -= 1;
            }
            if !(tok.is_punct(",") && depth == 0) {
                continue;
            }
        }

        let part = &tokens[start..i];
        start = i + 1;

        // Annotation arguments would otherwise look like part of the type
        let mut j = 0;
        while j < part.len() && part[j].is_punct("@") {
            j += 2;
            while j + 1 < part.len() && part[j].is_punct(".") {
                j += 2;
            }
            if j < part.len() && part[j].is_punct("(") {
                j = matching_forward(part, j, "(", ")") + 1;
            }
        }
        let part = &part[j.min(part.len())..];

        if let Some((name, ty)) = part.split_last() {
            if name.is_ident() && name.text != "this" {
                if let Some(ty) = type_name(ty) {
                    params.push((name.text.clone(), ty));
                }
            }
        }
    }

    params
}

struct StructureParser<'t> {
    tokens: &'t [Token],
    pos: usize,
    package: Option<String>,
    imports: Vec<Import>,
    types: Vec<TypeDecl>,
    raw_supertypes: Vec<Vec<String>>,
    bodies: Vec<Body>,
}

impl<'t> StructureParser<'t> {
    fn new(tokens: &'t [Token]) -> Self {
        Self {
            tokens,
            pos: 0,
            package: None,
            imports: Vec::new(),
            types: Vec::new(),
            raw_supertypes: Vec::new(),
            bodies: Vec::new(),
        }
    }

    fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos)
    }

    fn peek_at(&self, offset: usize) -> Option<&'t Token> {
        self.tokens.get(self.pos + offset)
    }

    fn at_punct(&self, punct: &str) -> bool {
        self.peek().is_some_and(|t| t.is_punct(punct))
    }

    /// Skip a balanced group starting at the current token, returning its inner range
    fn skip_group(&mut self, open: &str, close: &str) -> Range<usize> {
        let start = self.pos + 1;
        let end = matching_forward(self.tokens, self.pos, open, close);
        self.pos = (end + 1).min(self.tokens.len());
        start..end.min(self.tokens.len())
    }

    /// `ident ('.' ident)*`, optionally ending in `.*`
    fn dotted_name(&mut self) -> String {
        let mut name = String::new();
        while let Some(tok) = self
            .peek()
            .filter(|t| t.is_ident() || (!name.is_empty() && t.is_punct("*")))
        {
            name.push_str(&tok.text);
            self.pos += 1;

            let continues = self.at_punct(".") && self.peek_at(1).is_some_and(|t| t.is_ident() || t.is_punct("*"));
            if !continues {
                break;
            }
            name.push('.');
            self.pos += 1;
        }
        name
    }

    /// Skip `@Name` or `@Name(...)`
    fn skip_annotations(&mut self) {
        while self.at_punct("@") && self.peek_at(1).is_some_and(|t| t.is_ident()) {
            self.pos += 1;
            self.dotted_name();
            if self.at_punct("(") {
                self.skip_group("(", ")");
            }
        }
    }

    fn parse(&mut self) {
        while let Some(tok) = self.peek() {
            if tok.is_word("package") {
                self.pos += 1;
                self.package = Some(self.dotted_name());
            } else if tok.is_word("import") {
                self.pos += 1;
                let is_static = self.peek().is_some_and(|t| t.is_word("static"));
                if is_static {
                    self.pos += 1;
                }
                let path = self.dotted_name();
                let wildcard = path.ends_with(".*");
                self.imports.push(Import {
                    path: path.trim_end_matches(".*").to_string(),
                    wildcard,
                    is_static,
                });
            } else {
                let start = self.pos;
                let modifiers = self.modifiers();
                if self.at_type_keyword() {
                    self.type_decl(modifiers, None);
                } else if self.pos == start {
                    self.pos += 1;
                }
            }
        }
    }

    fn modifiers(&mut self) -> Modifiers {
        let mut modifiers = Modifiers::default();

        while let Some(tok) = self.peek() {
            if tok.kind == lexer::TokenKind::Doc {
                modifiers.doc = Some(tok.text.clone());
                self.pos += 1;
            } else if tok.is_punct("@")
                && self.peek_at(1).is_some_and(|t| t.is_ident() && t.text != "interface")
            {
                self.pos += 1;
                let name = self.dotted_name();
                let arguments = if self.at_punct("(") {
                    let range = self.skip_group("(", ")");
                    self.tokens[range]
                        .iter()
                        .map(|t| t.text.as_str())
                        .collect::<Vec<_>>()
                        .join(" ")
                } else {
                    String::new()
                };
                modifiers.annotations.push(Annotation { name, arguments });
            } else if tok.is_ident() && MODIFIERS.contains(&tok.text.as_str()) {
                self.pos += 1;
            } else {
                break;
            }
        }

        modifiers
    }

    fn at_type_keyword(&self) -> bool {
        match (self.peek(), self.peek_at(1)) {
            (Some(kw), Some(name)) if kw.is_ident() && TYPE_KEYWORDS.contains(&kw.text.as_str()) => {
                name.is_ident()
            }
            (Some(at), Some(kw)) => at.is_punct("@") && kw.is_word("interface"),
            _ => false,
        }
    }

    fn type_decl(&mut self, modifiers: Modifiers, outer: Option<usize>) {
        let kind = match self.peek().map(|t| t.text.as_str()) {
            Some("class") => TypeKind::Class,
            Some("interface") => TypeKind::Interface,
            Some("enum") => TypeKind::Enum,
            Some("record") => TypeKind::Record,
            _ => {
                self.pos += 1;
                TypeKind::Annotation
            }
        };
        self.pos += 1;

        let Some(name_tok) = self.peek().filter(|t| t.is_ident()) else {
            return;
        };
        self.pos += 1;

        let qualified_name = match (outer, &self.package) {
            (Some(outer), _) => format!("{}.{}", self.types[outer].qualified_name, name_tok.text),
            (None, Some(package)) if !package.is_empty() => format!("{}.{}", package, name_tok.text),
            (None, _) => name_tok.text.clone(),
        };

        let idx = self.types.len();
        self.types.push(TypeDecl {
            name: name_tok.text.clone(),
            qualified_name,
            kind,
            outer,
            supertypes: Vec::new(),
            deprecation: modifiers.deprecation(),
            members: Vec::new(),
            span: name_tok.span,
        });
        self.raw_supertypes.push(Vec::new());

        if self.at_punct("<") {
            self.skip_group("<", ">");
        }

        if kind == TypeKind::Record && self.at_punct("(") {
            let range = self.skip_group("(", ")");
            for (name, ty) in parameters(&self.tokens[range]) {
                let span = self.types[idx].span;
                for kind in [MemberDeclKind::Field, MemberDeclKind::Method] {
                    self.types[idx].members.push(MemberDecl {
                        name: name.clone(),
                        kind,
                        declared_type: (kind == MemberDeclKind::Field).then(|| ty.clone()),
                        deprecation: None,
                        span,
                    });
                }
            }
        }

        while let Some(tok) = self.peek() {
            if tok.is_punct("{") {
                self.class_body(idx, kind);
                return;
            } else if tok.is_punct(";") || tok.is_punct("}") {
                return;
            } else if tok.is_word("extends") || tok.is_word("implements") {
                self.pos += 1;
                loop {
                    self.skip_annotations();
                    if self.peek().is_some_and(|t| t.is_word("extends") || t.is_word("implements")) {
                        break;
                    }
                    let name = self.dotted_name();
                    if !name.is_empty() {
                        self.raw_supertypes[idx].push(name);
                    }
                    if self.at_punct("<") {
                        self.skip_group("<", ">");
                    }
                    if self.at_punct(",") {
                        self.pos += 1;
                    } else {
                        break;
                    }
                }
            } else {
                self.pos += 1;
            }
        }
    }

    fn class_body(&mut self, idx: usize, kind: TypeKind) {
        self.pos += 1;
        if kind == TypeKind::Enum {
            self.enum_constants(idx);
        }

        while let Some(tok) = self.peek() {
            if tok.is_punct("}") {
                self.pos += 1;
                return;
            }
            if tok.is_punct(";") {
                self.pos += 1;
                continue;
            }

            let start = self.pos;
            let modifiers = self.modifiers();
            if self.at_punct("{") {
                let range = self.skip_group("{", "}");
                self.bodies.push(Body { owner: idx, params: Vec::new(), range });
            } else if self.at_type_keyword() {
                self.type_decl(modifiers, Some(idx));
            } else if !self.at_punct("}") {
                self.member(idx, modifiers);
            }

            if self.pos == start {
                self.pos += 1;
            }
        }
    }

    fn enum_constants(&mut self, idx: usize) {
        while let Some(tok) = self.peek() {
            if tok.is_punct(";") {
                self.pos += 1;
                return;
            }
            if tok.is_punct("}") {
                return;
            }
            if tok.is_punct(",") {
                self.pos += 1;
                continue;
            }

            let modifiers = self.modifiers();
            let Some(name) = self.peek().filter(|t| t.is_ident()) else {
                self.pos += 1;
                continue;
            };
            self.pos += 1;
            self.types[idx].members.push(MemberDecl {
                name: name.text.clone(),
                kind: MemberDeclKind::EnumConstant,
                declared_type: None,
                deprecation: modifiers.deprecation(),
                span: name.span,
            });

            for (open, close) in [("(", ")"), ("{", "}")] {
                if self.at_punct(open) {
                    let range = self.skip_group(open, close);
                    self.bodies.push(Body { owner: idx, params: Vec::new(), range });
                }
            }
        }
    }

    fn member(&mut self, idx: usize, modifiers: Modifiers) {
        if self.at_punct("<") {
            self.skip_group("<", ">");
        }
        let tokens = self.tokens;
        let header_start = self.pos;

        let mut angle = 0usize;
        let mut delim = header_start;
        while let Some(tok) = tokens.get(delim) {
            if tok.is_punct("<") {
                angle += 1;
            } else if tok.is_punct(">") {
                angle = angle.saturating_sub(1);
            } else if angle == 0
                && ["(", "=", ";", ",", "{", "}"].iter().any(|p| tok.is_punct(p))
            {
                break;
            }
            delim += 1;
        }
        let Some(delim_tok) = tokens.get(delim) else {
            self.pos = tokens.len();
            return;
        };

        if delim_tok.is_punct("}") {
            self.pos = delim;
        } else if delim_tok.is_punct("(") {
            let name_tok = delim
                .checked_sub(1)
                .filter(|&i| i >= header_start)
                .map(|i| &tokens[i])
                .filter(|t| t.is_ident());
            self.pos = delim;
            let range = self.skip_group("(", ")");
            let params = parameters(&tokens[range]);

            while let Some(tok) = self.peek() {
                if tok.is_punct("{") {
                    let range = self.skip_group("{", "}");
                    self.bodies.push(Body { owner: idx, params, range });
                    break;
                }
                if tok.is_punct(";") {
                    self.pos += 1;
                    break;
                }
                if tok.is_punct("}") {
                    break;
                }
                self.pos += 1;
            }

            if let Some(name_tok) = name_tok {
                let kind = if delim - 1 == header_start {
                    MemberDeclKind::Constructor
                } else {
                    MemberDeclKind::Method
                };
                self.types[idx].members.push(MemberDecl {
                    name: name_tok.text.clone(),
                    kind,
                    declared_type: None,
                    deprecation: modifiers.deprecation(),
                    span: name_tok.span,
                });
            }
        } else if delim_tok.is_punct("{") {
            // Compact record constructor or something unrecognized with a body
            self.pos = delim;
            let range = self.skip_group("{", "}");
            self.bodies.push(Body { owner: idx, params: Vec::new(), range });
        } else {
            self.fields(idx, header_start, delim, &modifiers);
        }
    }

    fn fields(&mut self, idx: usize, header_start: usize, delim: usize, modifiers: &Modifiers) {
        let tokens = self.tokens;
        let mut name_idx = delim;
        while name_idx > header_start {
            name_idx -= 1;
            if tokens[name_idx].is_ident() {
                break;
            }
        }
        let name_tok = &tokens[name_idx];
        if !name_tok.is_ident() || name_idx == header_start {
            self.pos = delim + 1;
            return;
        }

        let declared_type = type_name(&tokens[header_start..name_idx]);
        let deprecation = modifiers.deprecation();
        let push = |types: &mut Vec<TypeDecl>, tok: &Token| {
            types[idx].members.push(MemberDecl {
                name: tok.text.clone(),
                kind: MemberDeclKind::Field,
                declared_type: declared_type.clone(),
                deprecation: deprecation.clone(),
                span: tok.span,
            });
        };
        push(&mut self.types, name_tok);

        self.pos = delim;
        while let Some(tok) = self.peek() {
            if tok.is_punct("=") {
                self.pos += 1;
                let start = self.pos;
                let mut depth = 0usize;
                while let Some(tok) = self.peek() {
                    if tok.is_punct("(") || tok.is_punct("[") || tok.is_punct("{") {
                        depth += 1;
                    } else if tok.is_punct(")") || tok.is_punct("]") || tok.is_punct("}") {
                        if depth == 0 {
                            break;
                        }
                        depth -= 1;
                    } else if depth == 0 && (tok.is_punct(",") || tok.is_punct(";")) {
                        break;
                    }
                    self.pos += 1;
                }
                self.bodies.push(Body { owner: idx, params: Vec::new(), range: start..self.pos });
            } else if tok.is_punct(",") {
                self.pos += 1;
                if let Some(next) = self.peek().filter(|t| t.is_ident()) {
                    push(&mut self.types, next);
                    self.pos += 1;
                }
                while self.at_punct("[") || self.at_punct("]") {
                    self.pos += 1;
                }
            } else if tok.is_punct(";") {
                self.pos += 1;
                return;
            } else {
                return;
            }
        }
    }

    fn finish(self) -> (CompilationUnit, Vec<Body>) {
        let mut syntax = CompilationUnit {
            package: self.package,
            imports: self.imports,
            types: self.types,
        };

        let names = TypeNames::new(syntax.package.as_deref(), &syntax.imports, &syntax.types);
        for (ty, raw) in syntax.types.iter_mut().zip(self.raw_supertypes) {
            ty.supertypes = raw.iter().map(|name| names.resolve(name)).collect();
        }

        (syntax, self.bodies)
    }
}

struct BodyScanner<'a> {
    tokens: &'a [Token],
    names: &'a TypeNames,
    types: &'a [TypeDecl],
    owner: usize,
    scopes: ScopeStack,
    /// Scope depths at which anonymous class bodies were entered
    anonymous: Vec<usize>,
    /// End tokens of the expression lambdas currently open
    lambda_ends: Vec<usize>,
    accesses: &'a mut Vec<MemberAccess>,
}

impl<'a> BodyScanner<'a> {
    fn scan(mut self, body: &Body) {
        for (name, ty) in &body.params {
            self.scopes.declare(name.clone(), Some(ty.clone()));
        }

        let range = body.range.clone();
        let mut i = range.start;
        while i < range.end {
            while self.lambda_ends.last() == Some(&i) {
                self.lambda_ends.pop();
                self.scopes.pop();
            }
            let tok = &self.tokens[i];

            if tok.is_punct("{") {
                self.scopes.push();
                if i > range.start && self.constructor_call(i - 1, range.start).is_some() {
                    self.anonymous.push(self.scopes.depth());
                }
            } else if tok.is_punct("}") {
                self.scopes.pop();
                while self.anonymous.last().is_some_and(|&depth| depth > self.scopes.depth()) {
                    self.anonymous.pop();
                }
            } else if tok.is_punct("->") && i > range.start {
                let params = self.lambda_parameters(i, range.start);
                let block = i + 1 < range.end && self.tokens[i + 1].is_punct("{");
                self.scopes.push();
                if !block {
                    self.lambda_ends.push(expression_end(self.tokens, i + 1, range.end));
                }
                for (name, ty) in params {
                    self.scopes.declare(name, ty);
                }
                if block {
                    i += 2;
                    continue;
                }
            } else if tok.is_word("instanceof") {
                if let Some((ty, name_idx)) = self.declaration(i + 1, range.end, true) {
                    self.scopes.declare(self.tokens[name_idx].text.clone(), ty);
                }
            } else if self.statement_start(i, range.start) {
                if let Some((ty, name_idx)) = self.declaration(i, range.end, false) {
                    self.scopes.declare(self.tokens[name_idx].text.clone(), ty);
                    i = name_idx + 1;
                    continue;
                }
            }

            if tok.is_punct(".") || tok.is_punct("::") {
                self.member_access(i, &range);
            }
            i += 1;
        }
    }

    /// Names bound by the lambda whose arrow is at `arrow`; untyped unless declared
    fn lambda_parameters(&self, arrow: usize, start: usize) -> Vec<(String, Option<TypeName>)> {
        let prev = &self.tokens[arrow - 1];
        if prev.is_ident() {
            // `case A, B ->` and `default ->` are switch labels
            let mut k = arrow - 1;
            while k > start {
                let before = &self.tokens[k - 1];
                let label_part = (before.is_ident() && !before.is_word("case")) || before.is_punct(".") || before.is_punct(",");
                if !label_part {
                    break;
                }
                k -= 1;
            }
            let label = prev.text == "default" || (k > start && self.tokens[k - 1].is_word("case"));
            return if label { Vec::new() } else { vec![(prev.text.clone(), None)] };
        }
        if !prev.is_punct(")") {
            return Vec::new();
        }
        let Some(open) = matching_backward(self.tokens, arrow - 1, "(", ")").filter(|&o| o >= start) else {
            return Vec::new();
        };

        let inner = &self.tokens[open + 1..arrow - 1];
        let typed = parameters(inner);
        let mut names = Vec::new();
        let mut depth = 0usize;
        for (k, tok) in inner.iter().enumerate() {
            if tok.is_punct("<") || tok.is_punct("(") {
                depth += 1;
            } else if tok.is_punct(">") || tok.is_punct(")") {
                depth = depth.saturating_sub(1);
            }
            let last_of_part = k + 1 == inner.len() || (depth == 0 && inner[k + 1].is_punct(","));
            if last_of_part && depth == 0 && tok.is_ident() {
                let ty = typed
                    .iter()
                    .find(|(name, ty)| *name == tok.text && ty.name != "var")
                    .map(|(_, ty)| ty.clone());
                names.push((tok.text.clone(), ty));
            }
        }
        names
    }

    /// Index of `new` when the token at `close` ends the arguments of `new T(..)`
    fn constructor_call(&self, close: usize, start: usize) -> Option<usize> {
        if close < start || !self.tokens[close].is_punct(")") {
            return None;
        }
        let open = matching_backward(self.tokens, close, "(", ")").filter(|&o| o > start)?;
        let mut e = open - 1;
        if self.tokens[e].is_punct(">") {
            e = matching_backward(self.tokens, e, "<", ">").filter(|&o| o > start)? - 1;
        }
        if !self.tokens[e].is_ident() {
            return None;
        }

        let mut k = e;
        while k >= start + 2 && self.tokens[k - 1].is_punct(".") && self.tokens[k - 2].is_ident() {
            k -= 2;
        }
        (k > start && self.tokens[k - 1].is_word("new")).then(|| k - 1)
    }

    fn in_anonymous_class(&self) -> bool {
        !self.anonymous.is_empty()
    }

    fn statement_start(&self, i: usize, start: usize) -> bool {
        i == start
            || [";", "{", "}", "(", ",", ":"]
                .iter()
                .any(|p| self.tokens[i - 1].is_punct(p))
    }

    /// Local declaration starting at `i`: `[final] Type name (= | ; | : | , | ))`
    ///
    /// Returns the binding's type (if usable) and the index of its name.
    fn declaration(&self, i: usize, end: usize, pattern: bool) -> Option<(Option<TypeName>, usize)> {
        let tokens = &self.tokens[..end];
        let mut j = i;

        while tokens.get(j).is_some_and(|t| t.is_word("final")) {
            j += 1;
        }
        let type_start = j;
        let first = tokens.get(j)?;
        if !first.is_ident() || RESERVED.contains(&first.text.as_str()) {
            return None;
        }
        j += 1;

        while tokens.get(j).is_some_and(|t| t.is_punct(".")) && tokens.get(j + 1).is_some_and(|t| t.is_ident()) {
            j += 2;
        }

        if tokens.get(j).is_some_and(|t| t.is_punct("<")) {
            let mut depth = 0usize;
            loop {
                let tok = tokens.get(j)?;
                if tok.is_punct("<") {
                    depth += 1;
                } else if tok.is_punct(">") {
                    depth -= 1;
                    if depth == 0 {
                        j += 1;
                        break;
                    }
                } else if !(tok.is_ident() || [".", ",", "?", "&", "[", "]", "@"].iter().any(|p| tok.is_punct(p))) {
                    return None;
                }
                j += 1;
            }
        }

        while tokens.get(j).is_some_and(|t| t.is_punct("[")) && tokens.get(j + 1).is_some_and(|t| t.is_punct("]")) {
            j += 2;
        }

        let name = tokens.get(j)?;
        if !name.is_ident() || RESERVED.contains(&name.text.as_str()) {
            return None;
        }
        let name_idx = j;
        j += 1;

        while tokens.get(j).is_some_and(|t| t.is_punct("[")) && tokens.get(j + 1).is_some_and(|t| t.is_punct("]")) {
            j += 2;
        }

        if !pattern {
            match tokens.get(j) {
                None => {}
                Some(next) if ["=", ";", ":", ",", ")"].iter().any(|p| next.is_punct(p)) => {}
                Some(_) => return None,
            }
        }

        let mut ty = type_name(&tokens[type_start..name_idx]);
        if ty.as_ref().is_some_and(|t| t.name == "var") {
            ty = self.inferred_type(j, end);
        }
        if name_idx + 1 < j {
            // `Tab tabs[]`
            ty = None;
        }

        Some((ty, name_idx))
    }

    /// Type of `= new T(...)` initializers for `var` declarations
    fn inferred_type(&self, after_name: usize, end: usize) -> Option<TypeName> {
        let tokens = &self.tokens[..end];
        if !tokens.get(after_name)?.is_punct("=") || !tokens.get(after_name + 1)?.is_word("new") {
            return None;
        }

        let start = after_name + 2;
        let mut j = start;
        while tokens.get(j).is_some_and(|t| t.is_ident() || t.is_punct(".")) {
            j += 1;
        }
        let stop = tokens.get(j)?;
        if stop.is_punct("(") || stop.is_punct("<") {
            type_name(&tokens[start..j])
        } else {
            None
        }
    }

    fn member_access(&mut self, op: usize, range: &Range<usize>) {
        if op == range.start {
            return;
        }

        let mut m = op + 1;
        if self.tokens.get(m).is_some_and(|t| t.is_punct("<")) && m < range.end {
            m = matching_forward(&self.tokens[..range.end], m, "<", ">") + 1;
        }
        if m >= range.end {
            return;
        }
        let member = &self.tokens[m];
        if !member.is_ident() || ["class", "new", "this", "super"].contains(&member.text.as_str()) {
            return;
        }

        let kind = if self.tokens[op].is_punct("::")
            || (m + 1 < range.end && self.tokens[m + 1].is_punct("("))
        {
            MemberKind::Method
        } else {
            MemberKind::Field
        };

        let Some((receiver, start)) = self.receiver(op - 1, range.start) else {
            return;
        };
        let receiver_type = self.receiver_type(&receiver);

        self.accesses.push(MemberAccess {
            receiver,
            receiver_type,
            member: member.text.clone(),
            kind,
            span: Span::new(start.start, member.span.end),
        });
    }

    /// Receiver ending at token `j`, with the span of its first token
    ///
    /// `None` when the dot is part of a type name in `new a.b.C()`.
    fn receiver(&self, j: usize, start: usize) -> Option<(Receiver, Span)> {
        let tok = &self.tokens[j];

        if tok.is_ident() {
            let mut k = j;
            let mut segments = vec![tok.text.as_str()];
            while k >= start + 2 && self.tokens[k - 1].is_punct(".") && self.tokens[k - 2].is_ident() {
                k -= 2;
                segments.push(&self.tokens[k].text);
            }
            if k > start {
                let before = &self.tokens[k - 1];
                if before.is_word("new") {
                    return None;
                }
                if before.is_punct(".") || before.is_punct("::") {
                    return Some((Receiver::Other, tok.span));
                }
            }
            segments.reverse();

            let receiver = match segments.as_slice() {
                ["this"] => Receiver::This,
                ["super"] => Receiver::Super,
                [name] => Receiver::Name(name.to_string()),
                ["this", field] => Receiver::ThisField(field.to_string()),
                chain if chain.iter().any(|s| *s == "this" || *s == "super") => Receiver::Other,
                chain => Receiver::Qualified(chain.join(".")),
            };
            return Some((receiver, self.tokens[k].span));
        }

        if let Some(new) = self.constructor_call(j, start) {
            let name = self.tokens[new + 1..]
                .iter()
                .take_while(|t| t.is_ident() || t.is_punct("."))
                .map(|t| t.text.as_str())
                .collect::<String>();
            return Some((Receiver::New(name), self.tokens[new].span));
        }

        Some((Receiver::Other, tok.span))
    }

    fn receiver_type(&self, receiver: &Receiver) -> Option<TypeRef> {
        match receiver {
            Receiver::Name(name) => {
                if let Some(binding) = self.scopes.lookup(name) {
                    return binding.and_then(|ty| self.names.reference(ty));
                }
                if let Some(field) = self.field(name) {
                    // The anonymous class may inherit a member of the same name
                    return if self.in_anonymous_class() { None } else { field };
                }
                self.names.is_type_name(name).then(|| self.names.resolve(name))
            }
            Receiver::Qualified(chain) => {
                let head = chain.split('.').next().unwrap_or(chain);
                if self.scopes.lookup(head).is_some() || self.field(head).is_some() {
                    return None;
                }
                let last = chain.rsplit('.').next().unwrap_or(chain);
                last.starts_with(|c: char| c.is_uppercase())
                    .then(|| self.names.resolve(chain))
            }
            Receiver::This | Receiver::Super | Receiver::ThisField(_) if self.in_anonymous_class() => None,
            Receiver::This => Some(TypeRef::qualified(self.types[self.owner].qualified_name.clone())),
            Receiver::Super => self.types[self.owner].supertypes.first().cloned(),
            Receiver::ThisField(name) => self.field(name).flatten(),
            Receiver::New(name) => Some(self.names.resolve(name)),
            Receiver::Other => None,
        }
    }

    /// Type of a field visible from the owner type, walking outward
    ///
    /// `Some(None)` when the field exists but its type is not usable.
    fn field(&self, name: &str) -> Option<Option<TypeRef>> {
        let mut current = Some(self.owner);
        while let Some(idx) = current {
            if let Some(found) = self.inherited_field(idx, name) {
                return Some(found);
            }
            current = self.types[idx].outer;
        }
        None
    }

    /// Field of a type or of its supertypes declared in the same unit
    fn inherited_field(&self, idx: usize, name: &str) -> Option<Option<TypeRef>> {
        let mut queue = VecDeque::from([idx]);
        let mut visited = HashSet::new();

        while let Some(idx) = queue.pop_front() {
            if !visited.insert(idx) {
                continue;
            }
            let ty = &self.types[idx];
            if let Some(member) = ty.members_named(name, MemberKind::Field).next() {
                return Some(match member.kind {
                    MemberDeclKind::EnumConstant => Some(TypeRef::qualified(ty.qualified_name.clone())),
                    _ => member.declared_type.as_ref().and_then(|t| self.names.reference(t)),
                });
            }
            for supertype in &ty.supertypes {
                let candidates = supertype.candidates();
                if let Some(found) = self.types.iter().position(|t| candidates.contains(&t.qualified_name)) {
                    queue.push_back(found);
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(text: &str) -> SourceUnit {
        JavaParser::new().parse(UnitId::new("Test.java"), text).unwrap()
    }

    fn accesses(unit: &SourceUnit) -> Vec<(String, Option<String>)> {
        unit.member_accesses()
            .map(|a| (a.member.clone(), a.receiver_type.as_ref().map(|t| t.name().to_string())))
            .collect()
    }

    #[test]
    fn package_imports_and_types() {
        let unit = parse(
            r#"
            package org.chromium.chrome;

            import org.chromium.content.Tab;
            import org.chromium.base.*;
            import static org.chromium.base.Log.d;

            public class Browser extends Base implements Runnable, java.io.Closeable {
                public Browser() {}
                public void run() {}
            }
            "#,
        );

        let syntax = unit.syntax();
        assert_eq!(syntax.package.as_deref(), Some("org.chromium.chrome"));
        assert_eq!(syntax.imports.len(), 3);
        assert!(syntax.imports[1].wildcard);
        assert_eq!(syntax.imports[1].path, "org.chromium.base");
        assert!(syntax.imports[2].is_static);

        let browser = &syntax.types[0];
        assert_eq!(browser.qualified_name, "org.chromium.chrome.Browser");
        assert_eq!(browser.supertypes.len(), 3);
        assert_eq!(browser.supertypes[2], TypeRef::qualified("java.io.Closeable"));
        assert_eq!(browser.members[0].kind, MemberDeclKind::Constructor);
        assert_eq!(browser.members[1].kind, MemberDeclKind::Method);
        assert_eq!(browser.members[1].name, "run");
    }

    #[test]
    fn deprecated_members_are_marked() {
        let unit = parse(
            r#"
            package org.chromium.content;

            public class Tab {
                /** @deprecated Use {@link #navigate(String)} instead. */
                public void navigateToUrl(String url) {}

                @Deprecated
                public void navigateToDino() {}

                @Deprecated(forRemoval = true)
                public static final int LEGACY_FLAG = 1, OTHER_FLAG = 2;

                public void navigate(String url) {}
            }
            "#,
        );

        let tab = &unit.syntax().types[0];
        let by_name = |name: &str| tab.members.iter().find(|m| m.name == name).unwrap();

        assert_eq!(
            by_name("navigateToUrl").deprecation.as_ref().unwrap().replacement.as_deref(),
            Some("navigate(String)")
        );
        assert!(by_name("navigateToDino").deprecation.is_some());
        assert!(by_name("LEGACY_FLAG").deprecation.as_ref().unwrap().for_removal);
        assert!(by_name("OTHER_FLAG").deprecation.is_some());
        assert_eq!(by_name("OTHER_FLAG").kind, MemberDeclKind::Field);
        assert!(by_name("navigate").deprecation.is_none());
    }

    #[test]
    fn annotation_on_its_own_line_keeps_the_member() {
        let unit = parse(
            "package org.chromium.content;\n\
             public class Tab {\n\
             \x20   @Deprecated\n\
             \x20   public void navigateToDino() {}\n\
             \x20   @Override\n\
             \x20   public String toString() { return \"\"; }\n\
             \x20   @java.lang.Deprecated\n\
             \x20   protected static int sCount;\n\
             }\n",
        );

        let tab = &unit.syntax().types[0];
        let members: Vec<_> = tab
            .members
            .iter()
            .map(|m| (m.name.as_str(), m.kind, m.deprecation.is_some()))
            .collect();
        assert_eq!(
            members,
            vec![
                ("navigateToDino", MemberDeclKind::Method, true),
                ("toString", MemberDeclKind::Method, false),
                ("sCount", MemberDeclKind::Field, true),
            ]
        );
    }

    #[test]
    fn supertype_lists_stop_at_keywords() {
        let unit = parse(
            r#"
            package p;
            class A extends Base implements Runnable {}
            class B<T> extends java.util.ArrayList<T> implements @Marker java.io.Serializable, Comparable<B<T>> {}
            interface I extends J, K {}
            "#,
        );

        let supertypes = |idx: usize| {
            unit.syntax().types[idx]
                .supertypes
                .iter()
                .map(|t| t.name().to_string())
                .collect::<Vec<_>>()
        };
        assert_eq!(supertypes(0), vec!["Base", "Runnable"]);
        assert_eq!(supertypes(1), vec!["java.util.ArrayList", "java.io.Serializable", "Comparable"]);
        assert_eq!(supertypes(2), vec!["J", "K"]);
    }

    #[test]
    fn local_variable_receiver() {
        let unit = parse(
            r#"
            package org.chromium.chrome;

            import org.chromium.content.Tab;

            public class Browser {
                public void run() {
                    Tab tab = new Tab();
                    tab.navigateToDino(); // This method is deprecated
                }
            }
            "#,
        );

        let access = unit.member_accesses().next().unwrap();
        assert_eq!(access.member, "navigateToDino");
        assert_eq!(access.kind, MemberKind::Method);
        assert_eq!(access.receiver, Receiver::Name("tab".to_string()));
        assert_eq!(access.receiver_type, Some(TypeRef::qualified("org.chromium.content.Tab")));
        assert_eq!(access.span.start.line, 8);
        assert_eq!(access.span.start.column, 20);
        assert_eq!(access.span.end.column, 38);
    }

    #[test]
    fn parameters_fields_and_this() {
        let unit = parse(
            r#"
            package p;
            class A {
                private Tab mTab;
                private int mCount;
                void f(final Tab other, int n, Tab... many) {
                    other.close();
                    mTab.close();
                    this.mTab.reload();
                    this.g();
                    mCount.foo();
                    many.length;
                }
                void g() {}
            }
            "#,
        );

        assert_eq!(
            accesses(&unit),
            vec![
                ("close".to_string(), Some("Tab".to_string())),
                ("close".to_string(), Some("Tab".to_string())),
                ("mTab".to_string(), Some("p.A".to_string())),
                ("reload".to_string(), Some("Tab".to_string())),
                ("g".to_string(), Some("p.A".to_string())),
                ("foo".to_string(), None),
                ("length".to_string(), None),
            ]
        );
    }

    #[test]
    fn block_scoping_and_shadowing() {
        let unit = parse(
            r#"
            class A {
                Tab tab;
                void f() {
                    {
                        Window tab = null;
                        tab.close();
                    }
                    tab.close();
                    for (Window w : windows) {
                        w.close();
                    }
                    var v = new Window();
                    v.close();
                    var u = factory();
                    u.close();
                    if (obj instanceof Window win && win.isOpen()) {}
                }
            }
            "#,
        );

        assert_eq!(
            accesses(&unit),
            vec![
                ("close".to_string(), Some("Window".to_string())),
                ("close".to_string(), Some("Tab".to_string())),
                ("close".to_string(), Some("Window".to_string())),
                ("close".to_string(), Some("Window".to_string())),
                ("close".to_string(), None),
                ("isOpen".to_string(), Some("Window".to_string())),
            ]
        );
    }

    #[test]
    fn new_static_and_qualified_receivers() {
        let unit = parse(
            r#"
            import org.chromium.content.Tab;
            class A {
                void f() {
                    new Tab().navigateToDino();
                    new java.util.ArrayList<String>().clear();
                    Tab.create();
                    org.chromium.content.Tab.create();
                    Runnable r = Tab::create;
                    factory().navigateToDino();
                    unknown.navigateToDino();
                }
            }
            "#,
        );

        let found: Vec<_> = unit
            .member_accesses()
            .filter(|a| ["navigateToDino", "clear", "create"].contains(&a.member.as_str()))
            .map(|a| (a.member.as_str(), a.receiver_type.as_ref().map(|t| t.name().to_string())))
            .collect();

        assert_eq!(
            found,
            vec![
                ("navigateToDino", Some("org.chromium.content.Tab".to_string())),
                ("clear", Some("java.util.ArrayList".to_string())),
                ("create", Some("org.chromium.content.Tab".to_string())),
                ("create", Some("org.chromium.content.Tab".to_string())),
                ("create", Some("org.chromium.content.Tab".to_string())),
                ("navigateToDino", None),
                ("navigateToDino", None),
            ]
        );

        let new_call = unit.member_accesses().next().unwrap();
        assert_eq!(new_call.receiver, Receiver::New("Tab".to_string()));
        assert_eq!(new_call.span.start.column, 20);
    }

    #[test]
    fn method_reference_is_a_method_access() {
        let unit = parse("class A { void f() { run(Tab::close); } }");
        let access = unit.member_accesses().next().unwrap();
        assert_eq!(access.kind, MemberKind::Method);
        assert_eq!(access.member, "close");
    }

    #[test]
    fn field_access_kind() {
        let unit = parse("class A { void f(Tab t) { int x = t.count; } }");
        let access = unit.member_accesses().next().unwrap();
        assert_eq!(access.kind, MemberKind::Field);
    }

    #[test]
    fn nested_enum_and_record_types() {
        let unit = parse(
            r#"
            package p;
            public class Outer {
                enum Color {
                    @Deprecated RED, GREEN(1) { void f() {} }, BLUE;
                    Color() {}
                    Color(int x) {}
                }
                record Point(int x, Tab t) {}
                interface Listener { void onEvent(); }
                @interface Marker { String value() default ""; }
            }
            "#,
        );

        let types = &unit.syntax().types;
        let names: Vec<_> = types.iter().map(|t| t.qualified_name.as_str()).collect();
        assert_eq!(names, vec!["p.Outer", "p.Outer.Color", "p.Outer.Point", "p.Outer.Listener", "p.Outer.Marker"]);
        assert_eq!(types[1].outer, Some(0));

        let color = &types[1];
        let constants: Vec<_> = color
            .members
            .iter()
            .filter(|m| m.kind == MemberDeclKind::EnumConstant)
            .map(|m| m.name.as_str())
            .collect();
        assert_eq!(constants, vec!["RED", "GREEN", "BLUE"]);
        assert!(color.members[0].deprecation.is_some());

        let point = &types[2];
        assert_eq!(point.kind, TypeKind::Record);
        assert_eq!(point.members_named("t", MemberKind::Method).count(), 1);
        assert_eq!(point.members_named("t", MemberKind::Field).count(), 1);

        assert_eq!(types[3].members[0].name, "onEvent");
        assert_eq!(types[4].kind, TypeKind::Annotation);
        assert_eq!(types[4].members[0].name, "value");
    }

    #[test]
    fn super_and_enum_constant_receivers() {
        let unit = parse(
            r#"
            package p;
            import q.Base;
            enum Mode {
                ON, OFF;
                static Mode parse() { return ON.next(); }
                Mode next() { return OFF; }
            }
            class Child extends Base {
                void f() { super.init(); }
            }
            "#,
        );

        assert_eq!(
            accesses(&unit),
            vec![
                ("next".to_string(), Some("p.Mode".to_string())),
                ("init".to_string(), Some("q.Base".to_string())),
            ]
        );
    }

    #[test]
    fn field_initializers_are_scanned() {
        let unit = parse(
            r#"
            class A {
                static final Tab DEFAULT = Tab.create(), OTHER = Tab.empty();
                private final Runnable r = () -> DEFAULT.close();
            }
            "#,
        );

        let members: Vec<_> = unit.member_accesses().map(|a| a.member.as_str()).collect();
        assert_eq!(members, vec!["create", "empty", "close"]);
        assert!(unit.member_accesses().all(|a| a.receiver_type.is_some()));
    }

    #[test]
    fn anonymous_classes_and_lambdas_do_not_confuse_scopes() {
        let unit = parse(
            r#"
            class A {
                void f(Tab tab) {
                    post(new Runnable() {
                        @Override
                        public void run() {
                            tab.reload();
                        }
                    });
                    list.forEach(t -> t.close());
                    list.forEach((Tab t) -> t.close());
                    tab.close();
                }
            }
            "#,
        );

        let members: Vec<_> = unit
            .member_accesses()
            .map(|a| (a.member.as_str(), a.receiver_type.is_some()))
            .collect();
        assert_eq!(
            members,
            vec![
                ("reload", true),
                ("forEach", false),
                ("close", false),
                ("forEach", false),
                ("close", true),
                ("close", true),
            ]
        );
    }

    #[test]
    fn lambda_parameters_shadow_fields() {
        let unit = parse(
            r#"
            package p;
            class B {
                Tab tab;
                void f(List<Other> l, Color c) {
                    l.forEach(tab -> tab.navigateToDino());
                    l.forEach((first, second) -> { second.navigateToDino(); });
                    tab.reload();
                    switch (c) {
                        case RED -> tab.close();
                        default -> tab.reload();
                    }
                }
            }
            "#,
        );

        let members: Vec<_> = unit
            .member_accesses()
            .map(|a| (a.member.as_str(), a.receiver_type.as_ref().map(|t| t.name().to_string())))
            .collect();
        assert_eq!(
            members,
            vec![
                ("forEach", Some("List".to_string())),
                ("navigateToDino", None),
                ("forEach", Some("List".to_string())),
                ("navigateToDino", None),
                ("reload", Some("Tab".to_string())),
                ("close", Some("Tab".to_string())),
                ("reload", Some("Tab".to_string())),
            ]
        );
    }

    #[test]
    fn anonymous_class_bodies_do_not_see_the_enclosing_type() {
        let unit = parse(
            r#"
            package p;
            class B {
                Tab mTab;
                void run() {}
                void f() {
                    post(new Runnable() {
                        public void run() {
                            this.run();
                            mTab.close();
                        }
                    });
                    this.run();
                    mTab.close();
                }
            }
            "#,
        );

        assert_eq!(
            accesses(&unit),
            vec![
                ("run".to_string(), None),
                ("close".to_string(), None),
                ("run".to_string(), Some("p.B".to_string())),
                ("close".to_string(), Some("Tab".to_string())),
            ]
        );
    }

    #[test]
    fn fields_of_same_file_supertypes_type_receivers() {
        let unit = parse(
            r#"
            package p;
            class Base {
                protected Tab mTab;
            }
            class Middle extends Base {}
            class Child extends Middle {
                void f() {
                    mTab.close();
                    this.mTab.reload();
                }
            }
            "#,
        );

        assert_eq!(
            accesses(&unit),
            vec![
                ("close".to_string(), Some("Tab".to_string())),
                ("mTab".to_string(), Some("p.Child".to_string())),
                ("reload".to_string(), Some("Tab".to_string())),
            ]
        );
    }

    #[test]
    fn comparisons_are_not_declarations() {
        let unit = parse(
            r#"
            class A {
                Tab a;
                void f(int b, int c) {
                    if (b < c) { a.close(); }
                    boolean x = b < c && c > b;
                    a.close();
                }
            }
            "#,
        );
        assert!(unit.member_accesses().all(|a| a.receiver_type.is_some()));
        assert_eq!(unit.member_accesses().count(), 2);
    }

    #[test]
    fn accesses_are_in_source_order() {
        let unit = parse(
            r#"
            class A {
                class Inner { void g(Tab t) { t.second(); } }
                void f(Tab t) { t.first(); t.third(); }
            }
            "#,
        );
        let starts: Vec<_> = unit.member_accesses().map(|a| a.span.start).collect();
        let mut sorted = starts.clone();
        sorted.sort();
        assert_eq!(starts, sorted);
    }

    #[test]
    fn lex_errors_are_reported_with_unit() {
        let err = JavaParser::new()
            .parse(UnitId::new("Broken.java"), "class A { /* ")
            .unwrap_err();
        assert!(matches!(err, ParseError::Lex { .. }));
        assert!(err.to_string().starts_with("Broken.java"));
        assert_eq!(err.position(), Some(Position::new(0, 10)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = JavaParser::new()
            .parse_file(Path::new("/definitely/not/here/Tab.java"))
            .unwrap_err();
        assert!(matches!(err, ParseError::Io { .. }));
    }
}
