//! Mock symbol resolver for testing
//!
//! Returns canned metadata without indexing any source. It's useful for:
//! - Unit testing the detector in isolation
//! - Simulating resolver failures, including backend faults
//!
//! ## Usage
//!
//! ```rust,ignore
//! use deprecheck_engine::{MockResolver, SymbolResolver};
//! use deprecheck_core::{MemberKind, SymbolMetadata, TypeRef};
//!
//! let resolver = MockResolver::new().with_symbol(
//!     "org.chromium.content.Tab",
//!     SymbolMetadata::new("org.chromium.content.Tab.navigateToDino", MemberKind::Method).deprecated(None),
//! );
//!
//! let receiver = TypeRef::qualified("org.chromium.content.Tab");
//! let metadata = resolver.resolve(&receiver, "navigateToDino", MemberKind::Method)?;
//! ```

use crate::resolver::{ResolutionFailure, SymbolResolver};
use deprecheck_core::{MemberKind, SymbolMetadata, TypeRef};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

type Key = (String, String, MemberKind);

/// Resolver answering from a fixed table
///
/// Receivers are matched by their name as written ([`TypeRef::name`]).
/// Anything not in the table is an [`ResolutionFailure::UnknownMember`].
#[derive(Debug, Default)]
pub struct MockResolver {
    /// Metadata by (receiver, member, kind)
    symbols: HashMap<Key, SymbolMetadata>,

    /// Failures to return for specific lookups
    failures: HashMap<Key, ResolutionFailure>,

    /// Fail every lookup with a backend error
    backend_failure: Option<String>,

    calls: AtomicUsize,
}

impl MockResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `metadata` for its member on `receiver`
    pub fn with_symbol(mut self, receiver: &str, metadata: SymbolMetadata) -> Self {
        let key = (receiver.to_string(), metadata.member_name().to_string(), metadata.kind);
        self.symbols.insert(key, metadata);
        self
    }

    /// Answer `failure` for one lookup
    pub fn with_failure(mut self, receiver: &str, member: &str, kind: MemberKind, failure: ResolutionFailure) -> Self {
        self.failures
            .insert((receiver.to_string(), member.to_string(), kind), failure);
        self
    }

    /// Simulate a broken backend
    pub fn with_backend_failure(mut self, message: impl Into<String>) -> Self {
        self.backend_failure = Some(message.into());
        self
    }

    /// Number of `resolve` calls so far
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl SymbolResolver for MockResolver {
    fn resolve(&self, receiver: &TypeRef, member: &str, kind: MemberKind) -> Result<SymbolMetadata, ResolutionFailure> {
        self.calls.fetch_add(1, Ordering::Relaxed);

        if let Some(message) = &self.backend_failure {
            return Err(ResolutionFailure::Backend(message.clone()));
        }

        let key = (receiver.name().to_string(), member.to_string(), kind);
        if let Some(failure) = self.failures.get(&key) {
            return Err(failure.clone());
        }

        self.symbols
            .get(&key)
            .cloned()
            .ok_or_else(|| ResolutionFailure::UnknownMember {
                owner: receiver.name().to_string(),
                member: member.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canned_symbol_is_returned() {
        let metadata = SymbolMetadata::new("a.Tab.close", MemberKind::Method);
        let resolver = MockResolver::new().with_symbol("a.Tab", metadata.clone());

        let result = resolver.resolve(&TypeRef::qualified("a.Tab"), "close", MemberKind::Method);
        assert_eq!(result, Ok(metadata));
        assert_eq!(resolver.call_count(), 1);
    }

    #[test]
    fn unknown_lookup_is_unknown_member() {
        let resolver = MockResolver::new();
        assert!(matches!(
            resolver.resolve(&TypeRef::qualified("a.Tab"), "close", MemberKind::Field),
            Err(ResolutionFailure::UnknownMember { .. })
        ));
    }

    #[test]
    fn canned_failures() {
        let resolver = MockResolver::new().with_failure(
            "Tab",
            "open",
            MemberKind::Method,
            ResolutionFailure::AmbiguousOverload("a.Tab.open".into()),
        );
        assert_eq!(
            resolver.resolve(&TypeRef::simple("Tab", vec![]), "open", MemberKind::Method),
            Err(ResolutionFailure::AmbiguousOverload("a.Tab.open".into()))
        );

        let broken = MockResolver::new().with_backend_failure("disk on fire");
        assert!(broken
            .resolve(&TypeRef::qualified("a.Tab"), "open", MemberKind::Method)
            .unwrap_err()
            .is_fault());
    }
}
