//! deprecheck Language Server Protocol implementation
//!
//! Reports usages of deprecated Java members as editor diagnostics while
//! files are edited.
//!
//! ## Features
//!
//! - **Diagnostics**: deprecated member usages, tagged so editors strike them through
//! - **Workspace index**: built from `deprecheck.toml` and build info, refreshed on save
//!   and when Java files change on disk
//!
//! ## Usage
//!
//! The LSP server is started as a binary that communicates via stdin/stdout:
//!
//! ```bash
//! deprecheck-lsp
//! ```
//!
//! Configure your editor to use this binary as the language server for `.java` files.

mod backend;
mod client_sink;

pub use backend::Backend;
pub use client_sink::{ClientSink, NotificationParams, DeprecheckNotification, NOTIFICATION_METHOD};
