//! Notification sinks
//!
//! A [`DiagnosticSink`] is the presentation side of the analysis: editors,
//! terminals and tests implement it to receive findings. Every operation is
//! fire-and-forget. Implementations must accept any input, including empty
//! batches and unknown method names, without panicking or reporting failure.

use crate::diagnostic::{DiagnosticBatch, Severity};
use crate::symbol::UnitId;
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Receiver of analysis notifications
pub trait DiagnosticSink: Send + Sync {
    /// Replace every diagnostic shown for `unit` with `batch`
    ///
    /// An empty batch clears the unit. Publication never merges with what
    /// was published earlier.
    fn publish_diagnostics(&self, unit: &UnitId, batch: DiagnosticBatch);

    /// One-shot message for the user; may interleave with diagnostics in any order
    fn show_message(&self, severity: Severity, text: &str);

    /// Ask to be notified about `method`; registering twice is harmless
    fn register_capability(&self, method: &str, options: Value);

    /// Producer-defined event outside the fixed contract; `payload` is opaque
    fn custom_notification(&self, method: &str, payload: Value);
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for Arc<S> {
    fn publish_diagnostics(&self, unit: &UnitId, batch: DiagnosticBatch) {
        (**self).publish_diagnostics(unit, batch)
    }

    fn show_message(&self, severity: Severity, text: &str) {
        (**self).show_message(severity, text)
    }

    fn register_capability(&self, method: &str, options: Value) {
        (**self).register_capability(method, options)
    }

    fn custom_notification(&self, method: &str, payload: Value) {
        (**self).custom_notification(method, payload)
    }
}

/// Sink that discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct VoidSink;

impl DiagnosticSink for VoidSink {
    fn publish_diagnostics(&self, _unit: &UnitId, _batch: DiagnosticBatch) {}

    fn show_message(&self, _severity: Severity, _text: &str) {}

    fn register_capability(&self, _method: &str, _options: Value) {}

    fn custom_notification(&self, _method: &str, _payload: Value) {}
}

/// Everything a [`RecordingSink`] has seen
#[derive(Debug, Clone, Default)]
pub struct Recorded {
    /// Latest batch per unit
    pub published: HashMap<UnitId, DiagnosticBatch>,

    /// Total number of publish calls, including replaced ones
    pub publish_calls: usize,

    pub messages: Vec<(Severity, String)>,

    /// Methods registered at least once
    pub capabilities: BTreeSet<String>,

    pub notifications: Vec<(String, Value)>,
}

/// In-memory sink that captures notifications
///
/// Publishing follows the full-replace contract: the stored batch for a unit
/// is whatever was published last.
#[derive(Debug, Default)]
pub struct RecordingSink {
    state: Mutex<Recorded>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    // A panicking test thread must not turn every later call into a panic.
    fn lock(&self) -> MutexGuard<'_, Recorded> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current diagnostics for a unit, `None` if it was never published
    pub fn diagnostics_for(&self, unit: &UnitId) -> Option<DiagnosticBatch> {
        self.lock().published.get(unit).cloned()
    }

    /// Snapshot of everything recorded so far
    pub fn snapshot(&self) -> Recorded {
        self.lock().clone()
    }

    /// Take everything recorded so far, leaving the sink empty
    pub fn take(&self) -> Recorded {
        std::mem::take(&mut *self.lock())
    }
}

impl DiagnosticSink for RecordingSink {
    fn publish_diagnostics(&self, unit: &UnitId, batch: DiagnosticBatch) {
        let mut state = self.lock();
        state.publish_calls += 1;
        state.published.insert(unit.clone(), batch);
    }

    fn show_message(&self, severity: Severity, text: &str) {
        self.lock().messages.push((severity, text.to_string()));
    }

    fn register_capability(&self, method: &str, _options: Value) {
        self.lock().capabilities.insert(method.to_string());
    }

    fn custom_notification(&self, method: &str, payload: Value) {
        self.lock().notifications.push((method.to_string(), payload));
    }
}
