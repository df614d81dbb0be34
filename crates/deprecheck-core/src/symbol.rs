//! Symbol metadata and type references shared by the front end and resolvers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Identifier of a source unit (a file path or document URI)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitId(String);

impl UnitId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn from_path(path: &Path) -> Self {
        Self(path.display().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UnitId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Reference to a type as seen from a use site
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TypeRef {
    /// Fully qualified name, e.g. `org.chromium.content.Tab`
    Qualified { name: String },

    /// Name as written (possibly `Outer.Inner`) that could live in any of
    /// `packages`, tried in order
    Simple { name: String, packages: Vec<String> },
}

impl TypeRef {
    pub fn qualified(name: impl Into<String>) -> Self {
        Self::Qualified { name: name.into() }
    }

    pub fn simple(name: impl Into<String>, packages: Vec<String>) -> Self {
        Self::Simple { name: name.into(), packages }
    }

    /// The name as written, without candidate packages
    pub fn name(&self) -> &str {
        match self {
            Self::Qualified { name } | Self::Simple { name, .. } => name,
        }
    }

    /// Last segment of the name (`Tab` for `org.chromium.content.Tab`)
    pub fn simple_name(&self) -> &str {
        let name = self.name();
        name.rsplit('.').next().unwrap_or(name)
    }

    /// Every fully qualified name this reference may denote
    pub fn candidates(&self) -> Vec<String> {
        match self {
            Self::Qualified { name } => vec![name.clone()],
            Self::Simple { name, packages } => packages
                .iter()
                .map(|pkg| if pkg.is_empty() { name.clone() } else { format!("{}.{}", pkg, name) })
                .collect(),
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Kind of member a use site refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberKind {
    Method,
    Field,
}

impl fmt::Display for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Method => write!(f, "method"),
            Self::Field => write!(f, "field"),
        }
    }
}

/// What a resolver knows about a declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolMetadata {
    /// Declaring type plus member, e.g. `org.chromium.content.Tab.navigateToDino`
    pub qualified_name: String,

    pub kind: MemberKind,

    /// Declaration is marked deprecated
    pub deprecated: bool,

    /// Suggested replacement, if the declaration names one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replacement: Option<String>,

    /// `@Deprecated(forRemoval = true)`
    #[serde(default)]
    pub for_removal: bool,
}

impl SymbolMetadata {
    pub fn new(qualified_name: impl Into<String>, kind: MemberKind) -> Self {
        Self {
            qualified_name: qualified_name.into(),
            kind,
            deprecated: false,
            replacement: None,
            for_removal: false,
        }
    }

    /// Mark as deprecated, optionally naming a replacement
    pub fn deprecated(mut self, replacement: Option<String>) -> Self {
        self.deprecated = true;
        self.replacement = replacement;
        self
    }

    pub fn for_removal(mut self) -> Self {
        self.for_removal = true;
        self
    }

    /// Member name without the declaring type
    pub fn member_name(&self) -> &str {
        self.qualified_name
            .rsplit('.')
            .next()
            .unwrap_or(&self.qualified_name)
    }
}
