//! Java front end
//!
//! This crate handles:
//! - Tokenizing Java sources, keeping doc comments
//! - Recovering package, import, type and member declarations
//! - Reading `@Deprecated` annotations and `@deprecated` doc tags
//! - Finding member accesses and the static type of their receivers

pub mod lexer;
pub mod javadoc;
pub mod syntax;
pub mod scope;
pub mod parser;
pub mod unit;

pub use lexer::{LexError, Token, TokenKind};
pub use javadoc::{Annotation, Deprecation};
pub use syntax::{
    CompilationUnit, Import, MemberAccess, MemberDecl, MemberDeclKind, Receiver, TypeDecl, TypeKind, TypeName,
};
pub use scope::{ScopeStack, TypeNames};
pub use parser::{JavaParser, ParseError};
pub use unit::SourceUnit;
