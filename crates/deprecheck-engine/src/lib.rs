//! deprecheck engine - Core business logic
//!
//! This crate implements the analysis side of deprecheck:
//! - Symbol resolution over an in-memory index of the workspace
//! - Deprecated member usage detection
//! - Publishing findings through a diagnostic sink
//! - Workspace discovery from config and build info

pub mod resolver;
pub mod index;
pub mod mock;
pub mod detector;
pub mod pipeline;
pub mod workspace;

pub use resolver::{ResolutionFailure, SymbolResolver};
pub use index::{IndexStats, SymbolIndex};
pub use mock::MockResolver;
pub use detector::{AnalysisError, DeprecationDetector};
pub use pipeline::{AnalysisPipeline, PipelineSummary, UnitOutcome};
pub use workspace::{BuildInfo, Workspace, WorkspaceError};
