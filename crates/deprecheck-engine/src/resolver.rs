//! Symbol resolution seam between the detector and its symbol source

use deprecheck_core::{MemberKind, SymbolMetadata, TypeRef};

/// Why a member access could not be resolved
///
/// Everything except [`ResolutionFailure::Backend`] is an expected outcome
/// for incomplete code or missing classpath entries.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolutionFailure {
    #[error("Unknown type: {0}")]
    UnknownType(String),

    #[error("Ambiguous type '{name}': {}", candidates.join(", "))]
    AmbiguousType { name: String, candidates: Vec<String> },

    #[error("Unknown member '{member}' on {owner}")]
    UnknownMember { owner: String, member: String },

    #[error("Overloads of '{0}' disagree on deprecation")]
    AmbiguousOverload(String),

    #[error("Receiver type of '{0}' could not be determined")]
    UnresolvedReceiver(String),

    #[error("Resolver backend failed: {0}")]
    Backend(String),
}

impl ResolutionFailure {
    /// A fault of the resolver itself rather than of the code being analyzed
    pub fn is_fault(&self) -> bool {
        matches!(self, Self::Backend(_))
    }
}

/// Answers "what is `member` on `receiver`?"
///
/// Implementations are pure queries: no side effects, safe to call from any
/// thread.
pub trait SymbolResolver: Send + Sync {
    /// Resolve a member access to the declaration it refers to
    fn resolve(&self, receiver: &TypeRef, member: &str, kind: MemberKind) -> Result<SymbolMetadata, ResolutionFailure>;
}

impl<R: SymbolResolver + ?Sized> SymbolResolver for std::sync::Arc<R> {
    fn resolve(&self, receiver: &TypeRef, member: &str, kind: MemberKind) -> Result<SymbolMetadata, ResolutionFailure> {
        (**self).resolve(receiver, member, kind)
    }
}
