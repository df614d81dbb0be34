//! Analyze-then-publish pipeline
//!
//! Ties a detector and a resolver to a [`DiagnosticSink`]. Each unit is
//! published exactly once per run; a unit whose analysis faults is reported
//! through `show_message` and keeps whatever it showed before.

use crate::detector::{AnalysisError, DeprecationDetector};
use crate::resolver::SymbolResolver;
use deprecheck_core::{DiagnosticBatch, DiagnosticSink, Severity, UnitId};
use deprecheck_java::SourceUnit;
use serde::Serialize;
use std::sync::Arc;

/// Result of running one unit through the pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitOutcome {
    /// Batch published for the unit
    Published { unit: UnitId, diagnostics: usize },

    /// Analysis faulted; nothing was published
    Failed(AnalysisError),
}

impl UnitOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Totals over a set of units
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PipelineSummary {
    pub units: usize,
    pub published: usize,
    pub failed: usize,
    pub diagnostics: usize,
}

impl PipelineSummary {
    fn record(&mut self, outcome: &UnitOutcome) {
        self.units += 1;
        match outcome {
            UnitOutcome::Published { diagnostics, .. } => {
                self.published += 1;
                self.diagnostics += diagnostics;
            }
            UnitOutcome::Failed(_) => self.failed += 1,
        }
    }
}

#[derive(Clone)]
pub struct AnalysisPipeline {
    detector: DeprecationDetector,
    resolver: Arc<dyn SymbolResolver>,
}

impl AnalysisPipeline {
    pub fn new(detector: DeprecationDetector, resolver: Arc<dyn SymbolResolver>) -> Self {
        Self { detector, resolver }
    }

    pub fn detector(&self) -> &DeprecationDetector {
        &self.detector
    }

    pub fn resolver(&self) -> &Arc<dyn SymbolResolver> {
        &self.resolver
    }

    /// Same detector, different symbol source
    pub fn with_resolver(&self, resolver: Arc<dyn SymbolResolver>) -> Self {
        Self {
            detector: self.detector.clone(),
            resolver,
        }
    }

    /// Analyze one unit and publish its batch
    pub fn run_unit(&self, unit: &SourceUnit, sink: &dyn DiagnosticSink) -> UnitOutcome {
        match self.detector.analyze(unit, &*self.resolver) {
            Ok(batch) => {
                let diagnostics = batch.len();
                sink.publish_diagnostics(unit.id(), batch);
                UnitOutcome::Published {
                    unit: unit.id().clone(),
                    diagnostics,
                }
            }
            Err(err) => {
                tracing::error!(unit = %unit.id(), error = %err, "Analysis failed");
                sink.show_message(Severity::Error, &format!("Deprecation analysis failed: {}", err));
                UnitOutcome::Failed(err)
            }
        }
    }

    /// Remove everything shown for a unit
    pub fn clear_unit(&self, unit: &UnitId, sink: &dyn DiagnosticSink) {
        sink.publish_diagnostics(unit, DiagnosticBatch::empty());
    }

    /// Run every unit; a failing unit does not stop the others
    pub fn run_units<'a>(
        &self,
        units: impl IntoIterator<Item = &'a SourceUnit>,
        sink: &dyn DiagnosticSink,
    ) -> (PipelineSummary, Vec<UnitOutcome>) {
        let mut summary = PipelineSummary::default();
        let mut outcomes = Vec::new();

        for unit in units {
            let outcome = self.run_unit(unit, sink);
            summary.record(&outcome);
            outcomes.push(outcome);
        }

        tracing::debug!(
            units = summary.units,
            failed = summary.failed,
            diagnostics = summary.diagnostics,
            "Pipeline run complete"
        );
        (summary, outcomes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockResolver;
    use deprecheck_core::{MemberKind, RecordingSink, SymbolMetadata, VoidSink};
    use deprecheck_java::JavaParser;

    fn unit(id: &str) -> SourceUnit {
        JavaParser::new()
            .parse(
                UnitId::new(id),
                "import a.Tab; class B { void f(Tab t) { t.old(); t.current(); } }",
            )
            .unwrap()
    }

    fn pipeline() -> AnalysisPipeline {
        let resolver = MockResolver::new()
            .with_symbol("a.Tab", SymbolMetadata::new("a.Tab.old", MemberKind::Method).deprecated(None))
            .with_symbol("a.Tab", SymbolMetadata::new("a.Tab.current", MemberKind::Method));
        AnalysisPipeline::new(DeprecationDetector::new(), Arc::new(resolver))
    }

    #[test]
    fn each_unit_is_published_once() {
        let sink = RecordingSink::new();
        let units = [unit("B.java"), unit("C.java")];

        let (summary, outcomes) = pipeline().run_units(&units, &sink);

        assert_eq!(summary.units, 2);
        assert_eq!(summary.published, 2);
        assert_eq!(summary.diagnostics, 2);
        assert!(outcomes.iter().all(|o| !o.is_failure()));

        let recorded = sink.snapshot();
        assert_eq!(recorded.publish_calls, 2);
        assert_eq!(recorded.published[&UnitId::new("B.java")].len(), 1);
        assert!(recorded.messages.is_empty());
    }

    #[test]
    fn failure_shows_message_without_publishing() {
        let sink = RecordingSink::new();
        let broken = pipeline().with_resolver(Arc::new(MockResolver::new().with_backend_failure("gone")));

        let outcome = broken.run_unit(&unit("B.java"), &sink);

        assert!(outcome.is_failure());
        let recorded = sink.snapshot();
        assert_eq!(recorded.publish_calls, 0);
        assert_eq!(recorded.messages.len(), 1);
        assert_eq!(recorded.messages[0].0, Severity::Error);
        assert!(recorded.messages[0].1.contains("gone"));
    }

    #[test]
    fn clear_publishes_empty_batch() {
        let sink = RecordingSink::new();
        let pipeline = pipeline();
        let unit = unit("B.java");

        pipeline.run_unit(&unit, &sink);
        pipeline.clear_unit(unit.id(), &sink);

        assert_eq!(sink.diagnostics_for(unit.id()), Some(DiagnosticBatch::empty()));
        assert_eq!(sink.snapshot().publish_calls, 2);
    }

    #[test]
    fn void_sink_accepts_everything() {
        let (summary, _) = pipeline().run_units(&[unit("B.java")], &VoidSink);
        assert_eq!(summary.published, 1);
    }
}
