//! LSP backend implementation for deprecheck
//!
//! Keeps the open Java documents and a symbol index of the workspace, and
//! republishes deprecation diagnostics whenever a document changes.

use crate::client_sink::ClientSink;
use deprecheck_core::{
    fingerprint, Config, Diagnostic, DiagnosticBatch, DiagnosticCode, DiagnosticSink, Position, Severity, Span,
    UnitId,
};
use deprecheck_engine::{AnalysisPipeline, DeprecationDetector, SymbolIndex, Workspace};
use deprecheck_java::{JavaParser, ParseError};
use serde_json::json;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::{
    DidChangeTextDocumentParams, DidChangeWatchedFilesParams, DidCloseTextDocumentParams,
    DidOpenTextDocumentParams, DidSaveTextDocumentParams, InitializeParams, InitializeResult, InitializedParams,
    MessageType, SaveOptions, ServerCapabilities, ServerInfo, TextDocumentSyncCapability, TextDocumentSyncKind,
    TextDocumentSyncOptions, TextDocumentSyncSaveOptions, Url,
};
use tower_lsp::{Client, LanguageServer};

const WATCHED_FILES_METHOD: &str = "workspace/didChangeWatchedFiles";
const INDEXED_METHOD: &str = "deprecheck/indexed";

/// An open document
#[derive(Debug, Clone)]
struct Document {
    text: String,

    /// Fingerprint of the text diagnostics were last published for
    analyzed: Option<String>,
}

/// LSP backend for deprecheck
pub struct Backend {
    /// LSP client for log messages
    client: Client,
    /// Where diagnostics and notifications go
    sink: Arc<ClientSink>,
    /// Currently open documents
    documents: Arc<RwLock<HashMap<Url, Document>>>,
    /// deprecheck configuration
    config: Arc<RwLock<Config>>,
    /// Symbol index, swapped as a whole when rebuilt
    index: Arc<RwLock<Arc<SymbolIndex>>>,
    /// Project root directory
    root: Arc<RwLock<Option<PathBuf>>>,
}

impl Backend {
    pub fn new(client: Client) -> Self {
        let sink = ClientSink::new(client.clone());
        Self::with_sink(client, sink)
    }

    fn with_sink(client: Client, sink: ClientSink) -> Self {
        Self {
            sink: Arc::new(sink),
            client,
            documents: Arc::new(RwLock::new(HashMap::new())),
            config: Arc::new(RwLock::new(Config::default())),
            index: Arc::new(RwLock::new(Arc::new(SymbolIndex::new()))),
            root: Arc::new(RwLock::new(None)),
        }
    }

    /// Load `deprecheck.toml` from the workspace root
    async fn load_config(&self) -> Config {
        let Some(root) = self.root.read().await.clone() else {
            return Config::default();
        };

        match Config::discover(&root) {
            Ok(config) => config,
            Err(e) => {
                self.client
                    .log_message(MessageType::WARNING, format!("Failed to load deprecheck.toml: {}", e))
                    .await;
                Config {
                    project_root: root,
                    ..Config::default()
                }
            }
        }
    }

    /// Rebuild the symbol index from disk, then refresh open documents
    async fn reindex(&self) {
        if self.root.read().await.is_none() {
            return;
        }

        let config = self.config.read().await.clone();
        let built = tokio::task::spawn_blocking(move || build_index(&config)).await;

        match built {
            Ok(Ok((index, failures))) => {
                let stats = index.stats();
                *self.index.write().await = Arc::new(index);

                self.client
                    .log_message(
                        MessageType::INFO,
                        format!("Indexed {} types from {} files", stats.types, stats.units),
                    )
                    .await;
                self.sink.custom_notification(
                    INDEXED_METHOD,
                    json!({ "stats": stats, "parseFailures": failures }),
                );
            }
            Ok(Err(e)) => {
                self.sink
                    .show_message(Severity::Warning, &format!("Failed to index workspace: {:#}", e));
            }
            Err(e) => {
                tracing::error!(error = %e, "Indexing task failed");
            }
        }

        self.reanalyze_open().await;
    }

    /// Republish every open document against the current index
    async fn reanalyze_open(&self) {
        let open: Vec<Url> = self.documents.read().await.keys().cloned().collect();
        for uri in open {
            self.analyze(&uri, true).await;
        }
    }

    /// Analyze a document and publish its diagnostics
    ///
    /// Skipped when the text is unchanged since the last publication, unless
    /// `force` is set.
    async fn analyze(&self, uri: &Url, force: bool) {
        let Some(document) = self.documents.read().await.get(uri).cloned() else {
            return;
        };

        let current = fingerprint(&document.text);
        if !force && document.analyzed.as_deref() == Some(current.as_str()) {
            tracing::debug!(%uri, "Document unchanged, skipping analysis");
            return;
        }

        let unit_id = unit_id(uri);
        match JavaParser::new().parse(unit_id.clone(), &document.text) {
            Ok(unit) => {
                let detector = DeprecationDetector::from_config(self.config.read().await.deprecation.clone());
                let index = self.index.read().await.clone();
                let pipeline = AnalysisPipeline::new(detector, index);
                if pipeline.run_unit(&unit, self.sink.as_ref()).is_failure() {
                    return;
                }
            }
            Err(e) => {
                self.sink.publish_diagnostics(&unit_id, parse_error_batch(&e));
            }
        }

        if let Some(document) = self.documents.write().await.get_mut(uri) {
            if fingerprint(&document.text) == current {
                document.analyzed = Some(current);
            }
        }
    }

    /// Fold a saved document's declarations into the index
    async fn refresh_index(&self, uri: &Url, text: &str) {
        if uri.to_file_path().is_err() {
            return;
        }
        let Ok(unit) = JavaParser::new().parse(unit_id(uri), text) else {
            return;
        };

        let mut index = self.index.write().await;
        let mut updated = SymbolIndex::clone(&index);
        updated.add_unit(&unit);
        *index = Arc::new(updated);
    }
}

/// Documents on disk are keyed by path, matching the units of the index
fn unit_id(uri: &Url) -> UnitId {
    match uri.to_file_path() {
        Ok(path) => UnitId::from_path(&path),
        Err(()) => UnitId::new(uri.as_str()),
    }
}

fn build_index(config: &Config) -> anyhow::Result<(SymbolIndex, usize)> {
    let workspace = Workspace::discover(config)?;
    let (units, failures) = workspace.load_units(&JavaParser::new());
    Ok((SymbolIndex::from_units(&units), failures.len()))
}

fn parse_error_batch(error: &ParseError) -> DiagnosticBatch {
    let position = error.position().unwrap_or_default();
    let end = Position::new(position.line, position.column + 2);

    DiagnosticBatch::from_unsorted(vec![Diagnostic::new(
        DiagnosticCode::ParseError,
        Severity::Error,
        error.to_string(),
        Span::new(position, end),
    )])
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        #[allow(deprecated)]
        let root = params
            .root_uri
            .as_ref()
            .or_else(|| params.workspace_folders.as_ref()?.first().map(|f| &f.uri))
            .and_then(|uri| uri.to_file_path().ok());
        *self.root.write().await = root;

        *self.config.write().await = self.load_config().await;

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Options(TextDocumentSyncOptions {
                    open_close: Some(true),
                    change: Some(TextDocumentSyncKind::FULL),
                    save: Some(TextDocumentSyncSaveOptions::SaveOptions(SaveOptions {
                        include_text: Some(true),
                    })),
                    ..Default::default()
                })),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "deprecheck".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        self.sink.register_capability(
            WATCHED_FILES_METHOD,
            json!({ "watchers": [{ "globPattern": "**/*.java" }] }),
        );

        self.client
            .log_message(MessageType::INFO, "deprecheck LSP server initialized")
            .await;

        self.reindex().await;
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let uri = params.text_document.uri;
        self.documents.write().await.insert(
            uri.clone(),
            Document {
                text: params.text_document.text,
                analyzed: None,
            },
        );

        self.analyze(&uri, true).await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;

        // Full sync: the last change holds the whole text
        let Some(change) = params.content_changes.into_iter().last() else {
            return;
        };
        if let Some(document) = self.documents.write().await.get_mut(&uri) {
            document.text = change.text;
        }

        self.analyze(&uri, false).await;
    }

    async fn did_save(&self, params: DidSaveTextDocumentParams) {
        let uri = params.text_document.uri;

        if let Some(text) = params.text {
            if let Some(document) = self.documents.write().await.get_mut(&uri) {
                document.text = text;
            }
        }

        let Some(text) = self.documents.read().await.get(&uri).map(|d| d.text.clone()) else {
            return;
        };
        self.refresh_index(&uri, &text).await;

        // Other open documents may use members whose deprecation just changed
        self.reanalyze_open().await;
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        self.documents.write().await.remove(&uri);
        self.sink.publish_diagnostics(&unit_id(&uri), DiagnosticBatch::empty());
    }

    async fn did_change_watched_files(&self, params: DidChangeWatchedFilesParams) {
        tracing::debug!(changes = params.changes.len(), "Watched files changed");
        self.reindex().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client_sink::Outgoing;
    use tokio::sync::mpsc;
    use tower_lsp::lsp_types::{TextDocumentIdentifier, TextDocumentItem};
    use tower_lsp::LspService;

    const TAB: &str = "package org.chromium.content;\n\npublic class Tab {\n    public void navigateToDino() {}\n}\n";

    const BROWSER: &str = "package org.chromium.chrome;\n\
                           \n\
                           import org.chromium.content.Tab;\n\
                           \n\
                           public class Browser {\n\
                           \x20   public void run(Tab tab) {\n\
                           \x20       tab.navigateToDino();\n\
                           \x20   }\n\
                           }\n";

    fn open(uri: &Url, text: &str) -> DidOpenTextDocumentParams {
        DidOpenTextDocumentParams {
            text_document: TextDocumentItem::new(uri.clone(), "java".to_string(), 1, text.to_string()),
        }
    }

    /// Latest diagnostics published per document
    fn published(rx: &mut mpsc::UnboundedReceiver<Outgoing>) -> HashMap<Url, usize> {
        let mut latest = HashMap::new();
        while let Ok(outgoing) = rx.try_recv() {
            if let Outgoing::Publish { uri, diagnostics } = outgoing {
                latest.insert(uri, diagnostics.len());
            }
        }
        latest
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn saving_a_declaration_refreshes_other_open_documents() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let (service, _socket) = LspService::new(|client| Backend::with_sink(client, ClientSink::from_sender(tx)));
        let backend = service.inner();

        let tab = Url::parse("file:///src/org/chromium/content/Tab.java").unwrap();
        let browser = Url::parse("file:///src/org/chromium/chrome/Browser.java").unwrap();

        backend.did_open(open(&tab, TAB)).await;
        backend
            .did_save(DidSaveTextDocumentParams {
                text_document: TextDocumentIdentifier::new(tab.clone()),
                text: None,
            })
            .await;
        backend.did_open(open(&browser, BROWSER)).await;
        assert_eq!(published(&mut rx).get(&browser), Some(&0));

        let deprecated = TAB.replace("    public void", "    @Deprecated\n    public void");
        backend
            .did_save(DidSaveTextDocumentParams {
                text_document: TextDocumentIdentifier::new(tab.clone()),
                text: Some(deprecated),
            })
            .await;

        let latest = published(&mut rx);
        assert_eq!(latest.get(&browser), Some(&1));
        assert_eq!(latest.get(&tab), Some(&0));
    }

    #[test]
    fn parse_error_becomes_single_diagnostic() {
        let err = JavaParser::new()
            .parse(UnitId::new("file:///Broken.java"), "class A {\n  /* open")
            .unwrap_err();

        let batch = parse_error_batch(&err);
        assert_eq!(batch.len(), 1);

        let diagnostic = &batch.as_slice()[0];
        assert_eq!(diagnostic.code, DiagnosticCode::ParseError);
        assert_eq!(diagnostic.severity, Severity::Error);
        assert_eq!(diagnostic.span.start, Position::new(1, 2));
    }

    #[test]
    fn file_uris_become_paths() {
        let uri = Url::parse("untitled:Scratch.java").unwrap();
        assert_eq!(unit_id(&uri).as_str(), "untitled:Scratch.java");

        #[cfg(unix)]
        {
            let uri = Url::parse("file:///src/Browser.java").unwrap();
            assert_eq!(unit_id(&uri).as_str(), "/src/Browser.java");
        }
    }

    #[test]
    fn index_builds_from_fixture_config() {
        let config = Config::discover(std::path::Path::new("../../fixtures/chromium-mini")).unwrap();
        let (index, failures) = build_index(&config).unwrap();
        assert_eq!(failures, 0);
        assert!(index.contains_type("org.chromium.content.Tab"));
    }
}
