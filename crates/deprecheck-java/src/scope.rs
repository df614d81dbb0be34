//! Name resolution for type names and local bindings
//!
//! Resolves names used in a method body to the types they denote, without
//! type-checking expressions.

use crate::syntax::{Import, TypeDecl, TypeName};
use deprecheck_core::TypeRef;
use std::collections::HashMap;

/// Package searched implicitly by every compilation unit
pub const IMPLICIT_PACKAGE: &str = "java.lang";

/// Maps type names as written in a unit to type references
#[derive(Debug, Clone, Default)]
pub struct TypeNames {
    package: String,

    /// Single-type imports: simple name -> qualified name
    imported: HashMap<String, String>,

    /// Packages (or types) imported on demand
    wildcards: Vec<String>,

    /// Types declared in the unit, by simple and by dotted name
    declared: HashMap<String, String>,
}

impl TypeNames {
    pub fn new(package: Option<&str>, imports: &[Import], types: &[TypeDecl]) -> Self {
        let mut names = Self {
            package: package.unwrap_or_default().to_string(),
            ..Self::default()
        };

        for import in imports.iter().filter(|i| !i.is_static) {
            if import.wildcard {
                names.wildcards.push(import.path.clone());
            } else {
                let simple = import.path.rsplit('.').next().unwrap_or(&import.path);
                names.imported.insert(simple.to_string(), import.path.clone());
            }
        }

        for ty in types {
            names.declared.entry(ty.name.clone()).or_insert_with(|| ty.qualified_name.clone());

            let prefix = if names.package.is_empty() {
                String::new()
            } else {
                format!("{}.", names.package)
            };
            if let Some(dotted) = ty.qualified_name.strip_prefix(&prefix) {
                names.declared.insert(dotted.to_string(), ty.qualified_name.clone());
            }
        }

        names
    }

    /// Resolve a (possibly dotted) type name
    pub fn resolve(&self, name: &str) -> TypeRef {
        let (head, rest) = match name.split_once('.') {
            Some((head, rest)) => (head, Some(rest)),
            None => (name, None),
        };

        if let Some(qualified) = self.declared.get(name) {
            return TypeRef::qualified(qualified.clone());
        }

        let known = self.imported.get(head).or_else(|| self.declared.get(head));
        match (known, rest) {
            (Some(qualified), None) => TypeRef::qualified(qualified.clone()),
            (Some(qualified), Some(rest)) => TypeRef::qualified(format!("{}.{}", qualified, rest)),
            // Lowercase head: a package, so the name is already fully qualified
            (None, Some(_)) if head.starts_with(|c: char| c.is_lowercase()) => TypeRef::qualified(name),
            _ => TypeRef::simple(name, self.candidate_packages()),
        }
    }

    /// Does `name` look like a type rather than a variable?
    pub fn is_type_name(&self, name: &str) -> bool {
        self.imported.contains_key(name)
            || self.declared.contains_key(name)
            || name.starts_with(|c: char| c.is_uppercase())
    }

    /// Type reference for a declared type name, `None` for primitives and arrays
    pub fn reference(&self, ty: &TypeName) -> Option<TypeRef> {
        ty.is_reference().then(|| self.resolve(&ty.name))
    }

    fn candidate_packages(&self) -> Vec<String> {
        let mut packages = Vec::with_capacity(self.wildcards.len() + 2);
        packages.push(self.package.clone());
        packages.extend(self.wildcards.iter().cloned());
        if self.package != IMPLICIT_PACKAGE {
            packages.push(IMPLICIT_PACKAGE.to_string());
        }
        packages
    }
}

/// Block-structured local bindings
///
/// A binding without a type still shadows outer names.
#[derive(Debug, Clone)]
pub struct ScopeStack {
    frames: Vec<HashMap<String, Option<TypeName>>>,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self {
            frames: vec![HashMap::new()],
        }
    }

    pub fn push(&mut self) {
        self.frames.push(HashMap::new());
    }

    /// Leave the innermost block; the outermost frame is never popped
    pub fn pop(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    pub fn declare(&mut self, name: impl Into<String>, ty: Option<TypeName>) {
        if let Some(frame) = self.frames.last_mut() {
            frame.insert(name.into(), ty);
        }
    }

    /// Innermost binding for `name`; `Some(None)` means bound but untyped
    pub fn lookup(&self, name: &str) -> Option<Option<&TypeName>> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.get(name))
            .map(Option::as_ref)
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}
