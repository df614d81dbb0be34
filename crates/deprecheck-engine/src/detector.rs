//! Deprecated member usage detection
//!
//! Walks the member accesses of a unit, asks a [`SymbolResolver`] what each
//! one refers to, and reports every access whose declaration is deprecated.
//! Accesses the resolver cannot place are skipped; only resolver faults and
//! inconsistent answers abort the unit.

use crate::resolver::{ResolutionFailure, SymbolResolver};
use deprecheck_core::{
    Diagnostic, DiagnosticBatch, DiagnosticCode, DeprecationConfig, Position, SymbolMetadata, UnitId,
};
use deprecheck_java::{MemberAccess, SourceUnit};

/// Faults that abort analysis of a single unit
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnalysisError {
    #[error("{unit}: symbol resolver failed: {message}")]
    Backend { unit: UnitId, message: String },

    #[error("{unit}: resolver answered '{answered}' for '{member}' at {position}")]
    ContractViolation {
        unit: UnitId,
        member: String,
        answered: String,
        position: Position,
    },

    #[error("{unit}: member access without a member name at {position}")]
    MalformedNode { unit: UnitId, position: Position },
}

impl AnalysisError {
    pub fn unit(&self) -> &UnitId {
        match self {
            Self::Backend { unit, .. } | Self::ContractViolation { unit, .. } | Self::MalformedNode { unit, .. } => unit,
        }
    }
}

/// Detects usages of deprecated members
///
/// Stateless apart from its configuration; one detector can analyze any
/// number of units, concurrently.
#[derive(Debug, Clone, Default)]
pub struct DeprecationDetector {
    config: DeprecationConfig,
}

impl DeprecationDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: DeprecationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DeprecationConfig {
        &self.config
    }

    /// Analyze one unit
    ///
    /// Returns the complete batch for the unit, sorted by span start. The
    /// caller decides where to publish it.
    pub fn analyze(&self, unit: &SourceUnit, resolver: &dyn SymbolResolver) -> Result<DiagnosticBatch, AnalysisError> {
        if !self.config.enabled {
            return Ok(DiagnosticBatch::empty());
        }

        let mut diagnostics = Vec::new();
        for access in unit.member_accesses() {
            if let Some(diagnostic) = self.check(unit.id(), access, resolver)? {
                diagnostics.push(diagnostic);
            }
        }

        tracing::debug!(unit = %unit.id(), findings = diagnostics.len(), "Unit analyzed");
        Ok(DiagnosticBatch::from_unsorted(diagnostics))
    }

    fn check(
        &self,
        unit: &UnitId,
        access: &MemberAccess,
        resolver: &dyn SymbolResolver,
    ) -> Result<Option<Diagnostic>, AnalysisError> {
        if access.member.is_empty() {
            return Err(AnalysisError::MalformedNode {
                unit: unit.clone(),
                position: access.span.start,
            });
        }

        let resolved = match &access.receiver_type {
            Some(receiver) => resolver.resolve(receiver, &access.member, access.kind),
            None => Err(ResolutionFailure::UnresolvedReceiver(access.member.clone())),
        };

        let metadata = match resolved {
            Ok(metadata) => metadata,
            Err(ResolutionFailure::Backend(message)) => {
                return Err(AnalysisError::Backend {
                    unit: unit.clone(),
                    message,
                });
            }
            Err(failure) => {
                tracing::trace!(unit = %unit, position = %access.span.start, %failure, "Skipping member access");
                return Ok(None);
            }
        };

        if metadata.qualified_name.is_empty() || metadata.member_name() != access.member {
            return Err(AnalysisError::ContractViolation {
                unit: unit.clone(),
                member: access.member.clone(),
                answered: metadata.qualified_name,
                position: access.span.start,
            });
        }

        if !metadata.deprecated || self.config.is_ignored(&metadata.qualified_name) {
            return Ok(None);
        }

        let diagnostic = Diagnostic::new(
            DiagnosticCode::DeprecatedMemberUsage,
            self.config.effective_severity(),
            message(&metadata),
            access.span,
        )
        .with_symbol(metadata.qualified_name);

        Ok(Some(diagnostic))
    }
}

fn message(metadata: &SymbolMetadata) -> String {
    let mut message = format!("'{}' is deprecated", metadata.qualified_name);
    if let Some(replacement) = &metadata.replacement {
        message.push_str(&format!("; use '{}' instead", replacement));
    }
    if metadata.for_removal {
        message.push_str(" and marked for removal");
    }
    message
}
