//! Syntax model extracted from a Java compilation unit

use crate::javadoc::Deprecation;
use deprecheck_core::{MemberKind, Span, TypeRef};

/// `import` declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    /// Imported name without the trailing `.*`
    pub path: String,
    pub wildcard: bool,
    pub is_static: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Class,
    Interface,
    Enum,
    Record,
    Annotation,
}

/// Type name as written in a declaration, generics dropped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeName {
    /// Possibly dotted, e.g. `Tab` or `Outer.Inner`
    pub name: String,
    pub array_dims: usize,
}

impl TypeName {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            array_dims: 0,
        }
    }

    /// Class or interface type whose members can be looked up
    pub fn is_reference(&self) -> bool {
        const PRIMITIVES: &[&str] = &[
            "boolean", "byte", "char", "short", "int", "long", "float", "double", "void", "var",
        ];
        self.array_dims == 0 && !PRIMITIVES.contains(&self.name.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberDeclKind {
    Method,
    Constructor,
    Field,
    EnumConstant,
}

impl MemberDeclKind {
    /// How a use site refers to this member
    pub fn member_kind(self) -> MemberKind {
        match self {
            Self::Method | Self::Constructor => MemberKind::Method,
            Self::Field | Self::EnumConstant => MemberKind::Field,
        }
    }
}

/// Method, constructor, field or enum constant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberDecl {
    pub name: String,
    pub kind: MemberDeclKind,

    /// Field type; `None` for methods and enum constants
    pub declared_type: Option<TypeName>,

    pub deprecation: Option<Deprecation>,

    /// Span of the member name
    pub span: Span,
}

/// Class, interface, enum, record or annotation type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDecl {
    pub name: String,

    /// Package plus enclosing types, e.g. `org.chromium.content.Tab`
    pub qualified_name: String,

    pub kind: TypeKind,

    /// Index of the enclosing type in [`CompilationUnit::types`]
    pub outer: Option<usize>,

    /// `extends` then `implements` clauses, in order
    pub supertypes: Vec<TypeRef>,

    pub deprecation: Option<Deprecation>,

    pub members: Vec<MemberDecl>,

    /// Span of the type name
    pub span: Span,
}

impl TypeDecl {
    /// Members with the given name and use-site kind
    pub fn members_named<'a>(&'a self, name: &'a str, kind: MemberKind) -> impl Iterator<Item = &'a MemberDecl> + 'a {
        self.members
            .iter()
            .filter(move |m| m.name == name && m.kind.member_kind() == kind)
    }
}

/// Declarations of one Java file
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompilationUnit {
    pub package: Option<String>,
    pub imports: Vec<Import>,

    /// Every type declared in the file, outer types before the types they enclose
    pub types: Vec<TypeDecl>,
}

/// Receiver expression of a member access
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Receiver {
    /// Simple name: a local, parameter, field or type
    Name(String),

    /// Dotted identifier chain such as `org.chromium.content.Tab`
    Qualified(String),

    This,
    Super,

    /// `this.field`
    ThisField(String),

    /// `new T(...)`
    New(String),

    /// Anything else (call results, array elements, literals, ...)
    Other,
}

/// `receiver.member`, `receiver.member(...)` or `receiver::member`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberAccess {
    pub receiver: Receiver,

    /// Static type of the receiver, `None` when it cannot be determined
    pub receiver_type: Option<TypeRef>,

    pub member: String,
    pub kind: MemberKind,

    /// From the start of the receiver to the end of the member name
    pub span: Span,
}
