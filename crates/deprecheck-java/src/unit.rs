//! Parsed source units

use crate::syntax::{CompilationUnit, MemberAccess, TypeDecl};
use deprecheck_core::{fingerprint, UnitId};

/// A parsed Java file: its text, declarations and member accesses
///
/// Immutable once built; analysis only reads it.
#[derive(Debug, Clone)]
pub struct SourceUnit {
    id: UnitId,
    text: String,
    syntax: CompilationUnit,
    accesses: Vec<MemberAccess>,
}

impl SourceUnit {
    pub(crate) fn new(id: UnitId, text: String, syntax: CompilationUnit, accesses: Vec<MemberAccess>) -> Self {
        Self {
            id,
            text,
            syntax,
            accesses,
        }
    }

    pub fn id(&self) -> &UnitId {
        &self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn syntax(&self) -> &CompilationUnit {
        &self.syntax
    }

    /// Member accesses in source order
    pub fn member_accesses(&self) -> impl Iterator<Item = &MemberAccess> {
        self.accesses.iter()
    }

    /// Types declared in this unit, including nested ones
    pub fn declarations(&self) -> &[TypeDecl] {
        &self.syntax.types
    }

    /// Content hash of the source text
    pub fn fingerprint(&self) -> String {
        fingerprint(&self.text)
    }
}
