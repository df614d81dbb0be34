//! Report schema (stable v1)
//!
//! This schema is STABLE and VERSIONED.
//! Breaking changes require a new version.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use crate::diagnostic::{Diagnostic, DiagnosticBatch, Severity};
use crate::symbol::UnitId;

/// Report schema version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportVersion {
    /// Major version (breaking changes)
    pub major: u32,

    /// Minor version (backward-compatible additions)
    pub minor: u32,
}

impl ReportVersion {
    /// Current report schema version
    pub const CURRENT: ReportVersion = ReportVersion { major: 1, minor: 0 };
}

impl std::fmt::Display for ReportVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Summary statistics for a report
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Total number of diagnostics
    pub total: usize,

    pub errors: usize,
    pub warnings: usize,
    pub information: usize,
    pub hints: usize,

    /// Units whose analysis completed
    pub units_analyzed: usize,

    /// Units whose analysis failed
    pub units_failed: usize,
}

/// Diagnostics for one analyzed unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitReport {
    pub unit: UnitId,

    /// SHA-256 of the analyzed text
    pub fingerprint: String,

    pub diagnostics: Vec<Diagnostic>,
}

/// A unit that could not be analyzed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitFailure {
    pub unit: UnitId,
    pub error: String,
}

/// Check report (report.json v1)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Schema version
    pub version: ReportVersion,

    /// Timestamp (ISO 8601)
    pub timestamp: String,

    /// Summary statistics
    pub summary: ReportSummary,

    /// Per-unit diagnostics, in the order units were added
    pub units: Vec<UnitReport>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<UnitFailure>,

    /// Metadata
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl Report {
    /// Create a new empty report
    pub fn new() -> Self {
        Self {
            version: ReportVersion::CURRENT,
            timestamp: chrono::Utc::now().to_rfc3339(),
            summary: ReportSummary::default(),
            units: Vec::new(),
            failures: Vec::new(),
            metadata: None,
        }
    }

    /// Add the batch published for a unit
    pub fn add_unit(&mut self, unit: UnitId, fingerprint: String, batch: DiagnosticBatch) {
        for diagnostic in &batch {
            match diagnostic.severity {
                Severity::Error => self.summary.errors += 1,
                Severity::Warning => self.summary.warnings += 1,
                Severity::Information => self.summary.information += 1,
                Severity::Hint => self.summary.hints += 1,
            }
        }

        self.summary.total += batch.len();
        self.summary.units_analyzed += 1;
        self.units.push(UnitReport {
            unit,
            fingerprint,
            diagnostics: batch.into_vec(),
        });
    }

    /// Record a unit whose analysis failed
    pub fn add_failure(&mut self, unit: UnitId, error: impl Into<String>) {
        self.summary.units_failed += 1;
        self.failures.push(UnitFailure {
            unit,
            error: error.into(),
        });
    }

    /// Iterate over every diagnostic with its unit
    pub fn diagnostics(&self) -> impl Iterator<Item = (&UnitId, &Diagnostic)> {
        self.units
            .iter()
            .flat_map(|u| u.diagnostics.iter().map(move |d| (&u.unit, d)))
    }

    /// Check if the report has any errors
    pub fn has_errors(&self) -> bool {
        self.summary.errors > 0
    }

    /// Check if any unit failed to analyze
    pub fn has_failures(&self) -> bool {
        self.summary.units_failed > 0
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Save to file
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let json = self.to_json()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        std::fs::write(path, json)
    }
}

impl Default for Report {
    fn default() -> Self {
        Self::new()
    }
}

/// Hex-encoded SHA-256 of a unit's text
pub fn fingerprint(text: &str) -> String {
    hex::encode(Sha256::digest(text.as_bytes()))
}
