//! deprecheck core
//!
//! Core domain model with stable, versioned types shared by the Java front
//! end, the analysis engine and the presentation layers.
//! Never rename diagnostic codes - they are part of the public API.

pub mod diagnostic;
pub mod symbol;
pub mod sink;
pub mod report;
pub mod config;

pub use diagnostic::{Diagnostic, DiagnosticBatch, DiagnosticCode, Position, Severity, Span, SOURCE_TAG};
pub use symbol::{MemberKind, SymbolMetadata, TypeRef, UnitId};
pub use sink::{DiagnosticSink, Recorded, RecordingSink, VoidSink};
pub use report::{Report, ReportVersion, fingerprint};
pub use config::{Config, ConfigError, DeprecationConfig, WorkspaceConfig, CONFIG_FILE_NAME};
