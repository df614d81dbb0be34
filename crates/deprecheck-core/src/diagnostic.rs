//! Diagnostic codes, spans and batches
//!
//! IMPORTANT: Diagnostic codes are versioned and stable.
//! NEVER rename or remove codes - they are part of the public API.
//! Add new codes with new names only.

use serde::{Deserialize, Serialize};

/// Source tag attached to every diagnostic produced by this tool
pub const SOURCE_TAG: &str = "deprecheck";

/// Diagnostic code registry (v1)
///
/// These codes are STABLE and VERSIONED.
/// Do NOT rename or remove codes - only add new ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiagnosticCode {
    /// A member access resolves to a declaration marked deprecated
    DeprecatedMemberUsage,

    /// The source unit could not be parsed
    ParseError,

    /// Analysis of a unit was aborted by an internal fault
    AnalysisFault,
}

impl DiagnosticCode {
    /// Get the diagnostic code as a stable string identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DeprecatedMemberUsage => "DEPRECATED_MEMBER_USAGE",
            Self::ParseError => "PARSE_ERROR",
            Self::AnalysisFault => "ANALYSIS_FAULT",
        }
    }
}

impl std::fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Diagnostic severity level
///
/// Ordered from most to least severe, matching the LSP numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Blocking issue
    Error,

    /// Should be reviewed but not blocking
    Warning,

    /// Informational message
    Information,

    /// Subtle suggestion, usually rendered faintly
    Hint,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
            Self::Information => write!(f, "information"),
            Self::Hint => write!(f, "hint"),
        }
    }
}

/// Zero-based position in a source text
///
/// `column` counts UTF-16 code units, the unit editors speaking LSP expect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl std::fmt::Display for Position {
    /// One-based `line:column`, the form humans read in terminals
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.column + 1)
    }
}

/// Half-open range of source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Smallest span covering both `self` and `other`
    pub fn to(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

/// A diagnostic message attached to a span of one source unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Stable diagnostic code
    pub code: DiagnosticCode,

    /// Severity level
    pub severity: Severity,

    /// Human-readable message
    pub message: String,

    /// Location inside the unit
    pub span: Span,

    /// Tool that produced the diagnostic
    pub source: String,

    /// Qualified name of the declaration the diagnostic is about
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
}

impl Diagnostic {
    /// Create a new diagnostic tagged with [`SOURCE_TAG`]
    pub fn new(code: DiagnosticCode, severity: Severity, message: impl Into<String>, span: Span) -> Self {
        Self {
            code,
            severity,
            message: message.into(),
            span,
            source: SOURCE_TAG.to_string(),
            symbol: None,
        }
    }

    /// Set the related symbol
    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }
}

/// Ordered diagnostics for a single source unit
///
/// Diagnostics are kept sorted by span start. Sorting is stable, so findings
/// sharing a start position stay in the order they were produced. A batch is
/// published as a whole and replaces whatever was shown for the unit before.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiagnosticBatch {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticBatch {
    /// An empty batch; publishing it clears a unit
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a batch from diagnostics in any order
    pub fn from_unsorted(mut diagnostics: Vec<Diagnostic>) -> Self {
        diagnostics.sort_by_key(|d| d.span.start);
        Self { diagnostics }
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.diagnostics.iter()
    }

    pub fn as_slice(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    /// Number of diagnostics with the given severity
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics.iter().filter(|d| d.severity == severity).count()
    }
}

impl FromIterator<Diagnostic> for DiagnosticBatch {
    fn from_iter<I: IntoIterator<Item = Diagnostic>>(iter: I) -> Self {
        Self::from_unsorted(iter.into_iter().collect())
    }
}

impl IntoIterator for DiagnosticBatch {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.into_iter()
    }
}

impl<'a> IntoIterator for &'a DiagnosticBatch {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(line: u32, column: u32, message: &str) -> Diagnostic {
        let start = Position::new(line, column);
        Diagnostic::new(
            DiagnosticCode::DeprecatedMemberUsage,
            Severity::Warning,
            message,
            Span::new(start, Position::new(line, column + 3)),
        )
    }

    #[test]
    fn diagnostic_code_stability() {
        assert_eq!(DiagnosticCode::DeprecatedMemberUsage.as_str(), "DEPRECATED_MEMBER_USAGE");
        assert_eq!(DiagnosticCode::AnalysisFault.to_string(), "ANALYSIS_FAULT");
    }

    #[test]
    fn batch_sorts_by_start_position() {
        let batch = DiagnosticBatch::from_unsorted(vec![
            at(4, 2, "c"),
            at(1, 9, "b"),
            at(1, 0, "a"),
        ]);

        let messages: Vec<_> = batch.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(messages, vec!["a", "b", "c"]);
    }

    #[test]
    fn batch_sort_is_stable_for_equal_starts() {
        let batch: DiagnosticBatch = vec![at(2, 5, "first"), at(0, 0, "zero"), at(2, 5, "second")]
            .into_iter()
            .collect();

        let messages: Vec<_> = batch.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(messages, vec!["zero", "first", "second"]);
    }

    #[test]
    fn position_display_is_one_based() {
        assert_eq!(Position::new(0, 0).to_string(), "1:1");
        assert_eq!(Position::new(14, 8).to_string(), "15:9");
    }

    #[test]
    fn diagnostic_serialization() {
        let diag = at(3, 4, "'a.B.c' is deprecated").with_symbol("a.B.c");

        let json = serde_json::to_string(&diag).unwrap();
        assert!(json.contains("DEPRECATED_MEMBER_USAGE"));
        assert!(json.contains("\"warning\""));
        assert!(json.contains("\"source\":\"deprecheck\""));
    }
}
