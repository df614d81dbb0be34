//! Diagnostic sink backed by the LSP client
//!
//! Sink calls are synchronous and must not wait on the editor, so each call
//! is converted to an [`Outgoing`] message and queued. A single forwarding
//! task drains the queue in order, which keeps successive publications for
//! the same document from overtaking each other.

use deprecheck_core::{Diagnostic, DiagnosticBatch, DiagnosticCode, DiagnosticSink, Severity, UnitId};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashSet;
use std::path::Path;
use std::sync::{Mutex, PoisonError};
use tokio::sync::mpsc;
use tower_lsp::lsp_types::notification::Notification;
use tower_lsp::lsp_types::{
    self as lsp, DiagnosticSeverity, DiagnosticTag, MessageType, NumberOrString, Registration, Url,
};
use tower_lsp::Client;

/// Method of the envelope carrying custom notifications
pub const NOTIFICATION_METHOD: &str = "deprecheck/notification";

/// Envelope for producer-defined events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationParams {
    pub method: String,
    pub payload: Value,
}

pub enum DeprecheckNotification {}

impl Notification for DeprecheckNotification {
    type Params = NotificationParams;
    const METHOD: &'static str = NOTIFICATION_METHOD;
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Outgoing {
    Publish { uri: Url, diagnostics: Vec<lsp::Diagnostic> },
    Message { typ: MessageType, text: String },
    Register(Registration),
    Notify(NotificationParams),
}

/// [`DiagnosticSink`] that forwards to an LSP client
pub struct ClientSink {
    tx: mpsc::UnboundedSender<Outgoing>,
    registered: Mutex<HashSet<String>>,
}

impl ClientSink {
    /// Create the sink and start its forwarding task
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(client: Client) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(forward(client, rx));
        Self::from_sender(tx)
    }

    pub(crate) fn from_sender(tx: mpsc::UnboundedSender<Outgoing>) -> Self {
        Self {
            tx,
            registered: Mutex::new(HashSet::new()),
        }
    }

    fn send(&self, outgoing: Outgoing) {
        if self.tx.send(outgoing).is_err() {
            tracing::debug!("Client connection closed, dropping notification");
        }
    }
}

impl DiagnosticSink for ClientSink {
    fn publish_diagnostics(&self, unit: &UnitId, batch: DiagnosticBatch) {
        let Some(uri) = unit_url(unit) else {
            tracing::warn!(unit = %unit, "Cannot publish diagnostics for unit without a URI");
            return;
        };

        let diagnostics = batch.iter().map(to_lsp_diagnostic).collect();
        self.send(Outgoing::Publish { uri, diagnostics });
    }

    fn show_message(&self, severity: Severity, text: &str) {
        self.send(Outgoing::Message {
            typ: message_type(severity),
            text: text.to_string(),
        });
    }

    fn register_capability(&self, method: &str, options: Value) {
        let first = self
            .registered
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(method.to_string());
        if !first {
            tracing::debug!(method, "Capability already registered");
            return;
        }

        self.send(Outgoing::Register(Registration {
            id: method.to_string(),
            method: method.to_string(),
            register_options: Some(options),
        }));
    }

    fn custom_notification(&self, method: &str, payload: Value) {
        self.send(Outgoing::Notify(NotificationParams {
            method: method.to_string(),
            payload,
        }));
    }
}

async fn forward(client: Client, mut rx: mpsc::UnboundedReceiver<Outgoing>) {
    while let Some(outgoing) = rx.recv().await {
        match outgoing {
            Outgoing::Publish { uri, diagnostics } => {
                client.publish_diagnostics(uri, diagnostics, None).await;
            }
            Outgoing::Message { typ, text } => {
                client.show_message(typ, text).await;
            }
            Outgoing::Register(registration) => {
                let method = registration.method.clone();
                if let Err(e) = client.register_capability(vec![registration]).await {
                    tracing::warn!(%method, error = %e, "Client rejected capability registration");
                }
            }
            Outgoing::Notify(params) => {
                client.send_notification::<DeprecheckNotification>(params).await;
            }
        }
    }
}

/// URI of a unit: absolute paths become `file://` URIs, anything else must
/// already be a URI
pub(crate) fn unit_url(unit: &UnitId) -> Option<Url> {
    let path = Path::new(unit.as_str());
    if path.is_absolute() {
        Url::from_file_path(path).ok()
    } else {
        Url::parse(unit.as_str()).ok()
    }
}

fn message_type(severity: Severity) -> MessageType {
    match severity {
        Severity::Error => MessageType::ERROR,
        Severity::Warning => MessageType::WARNING,
        Severity::Information => MessageType::INFO,
        Severity::Hint => MessageType::LOG,
    }
}

fn diagnostic_severity(severity: Severity) -> DiagnosticSeverity {
    match severity {
        Severity::Error => DiagnosticSeverity::ERROR,
        Severity::Warning => DiagnosticSeverity::WARNING,
        Severity::Information => DiagnosticSeverity::INFORMATION,
        Severity::Hint => DiagnosticSeverity::HINT,
    }
}

/// Convert a deprecheck diagnostic to its LSP form
pub(crate) fn to_lsp_diagnostic(diagnostic: &Diagnostic) -> lsp::Diagnostic {
    let position = |p: deprecheck_core::Position| lsp::Position {
        line: p.line,
        character: p.column,
    };

    lsp::Diagnostic {
        range: lsp::Range {
            start: position(diagnostic.span.start),
            end: position(diagnostic.span.end),
        },
        severity: Some(diagnostic_severity(diagnostic.severity)),
        code: Some(NumberOrString::String(diagnostic.code.as_str().to_string())),
        source: Some(diagnostic.source.clone()),
        message: diagnostic.message.clone(),
        tags: (diagnostic.code == DiagnosticCode::DeprecatedMemberUsage).then(|| vec![DiagnosticTag::DEPRECATED]),
        data: diagnostic.symbol.as_ref().map(|symbol| json!({ "symbol": symbol })),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deprecheck_core::{Position, Span};
    use pretty_assertions::assert_eq;

    fn sink() -> (ClientSink, mpsc::UnboundedReceiver<Outgoing>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (ClientSink::from_sender(tx), rx)
    }

    fn dino() -> Diagnostic {
        Diagnostic::new(
            DiagnosticCode::DeprecatedMemberUsage,
            Severity::Warning,
            "'org.chromium.content.Tab.navigateToDino' is deprecated",
            Span::new(Position::new(9, 8), Position::new(9, 26)),
        )
        .with_symbol("org.chromium.content.Tab.navigateToDino")
    }

    #[test]
    fn diagnostic_conversion() {
        let converted = to_lsp_diagnostic(&dino());

        assert_eq!(converted.range.start, lsp::Position { line: 9, character: 8 });
        assert_eq!(converted.range.end, lsp::Position { line: 9, character: 26 });
        assert_eq!(converted.severity, Some(DiagnosticSeverity::WARNING));
        assert_eq!(
            converted.code,
            Some(NumberOrString::String("DEPRECATED_MEMBER_USAGE".to_string()))
        );
        assert_eq!(converted.source.as_deref(), Some("deprecheck"));
        assert_eq!(converted.tags, Some(vec![DiagnosticTag::DEPRECATED]));
        assert_eq!(
            converted.data,
            Some(json!({ "symbol": "org.chromium.content.Tab.navigateToDino" }))
        );
    }

    #[test]
    fn parse_errors_are_not_tagged_deprecated() {
        let diagnostic = Diagnostic::new(DiagnosticCode::ParseError, Severity::Error, "bad", Span::default());
        let converted = to_lsp_diagnostic(&diagnostic);
        assert_eq!(converted.tags, None);
        assert_eq!(converted.severity, Some(DiagnosticSeverity::ERROR));
    }

    #[test]
    fn unit_urls() {
        let uri = unit_url(&UnitId::new("file:///src/Browser.java")).unwrap();
        assert_eq!(uri.scheme(), "file");
        assert!(unit_url(&UnitId::new("not a uri")).is_none());

        #[cfg(unix)]
        assert_eq!(
            unit_url(&UnitId::new("/src/Browser.java")).unwrap().as_str(),
            "file:///src/Browser.java"
        );
    }

    #[test]
    fn publish_is_queued_in_order() {
        let (sink, mut rx) = sink();
        let unit = UnitId::new("file:///src/Browser.java");

        sink.publish_diagnostics(&unit, DiagnosticBatch::from_unsorted(vec![dino()]));
        sink.publish_diagnostics(&unit, DiagnosticBatch::empty());

        match rx.try_recv().unwrap() {
            Outgoing::Publish { diagnostics, .. } => assert_eq!(diagnostics.len(), 1),
            other => panic!("unexpected {:?}", other),
        }
        match rx.try_recv().unwrap() {
            Outgoing::Publish { diagnostics, .. } => assert!(diagnostics.is_empty()),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn unpublishable_unit_is_dropped() {
        let (sink, mut rx) = sink();
        sink.publish_diagnostics(&UnitId::new("relative/Browser.java"), DiagnosticBatch::empty());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn messages_map_severity() {
        let (sink, mut rx) = sink();
        sink.show_message(Severity::Hint, "fyi");
        assert_eq!(
            rx.try_recv().unwrap(),
            Outgoing::Message {
                typ: MessageType::LOG,
                text: "fyi".to_string()
            }
        );
    }

    #[test]
    fn duplicate_registration_is_sent_once() {
        let (sink, mut rx) = sink();
        sink.register_capability("workspace/didChangeWatchedFiles", json!({}));
        sink.register_capability("workspace/didChangeWatchedFiles", json!({}));

        assert!(matches!(rx.try_recv(), Ok(Outgoing::Register(_))));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn custom_notifications_are_wrapped() {
        let (sink, mut rx) = sink();
        sink.custom_notification("deprecheck/indexed", json!({ "types": 4 }));
        assert_eq!(
            rx.try_recv().unwrap(),
            Outgoing::Notify(NotificationParams {
                method: "deprecheck/indexed".to_string(),
                payload: json!({ "types": 4 }),
            })
        );
    }

    #[test]
    fn closed_channel_is_harmless() {
        let (sink, rx) = sink();
        drop(rx);
        sink.show_message(Severity::Error, "nobody listens");
        sink.custom_notification("x", Value::Null);
    }
}
