//! deprecheck Language Server
//!
//! This is the main entry point for the deprecheck LSP server.
//! It starts the server and handles stdin/stdout communication with the editor.

use deprecheck_lsp::Backend;
use tower_lsp::{LspService, Server};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() {
    // stdout carries the protocol, so logs go to stderr
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    tracing::info!("Starting deprecheck LSP server");

    let (stdin, stdout) = (tokio::io::stdin(), tokio::io::stdout());
    let (service, socket) = LspService::new(Backend::new);

    Server::new(stdin, stdout, socket).serve(service).await;

    tracing::info!("deprecheck LSP server stopped");
}
