//! Reload-driven diagnostics
//!
//! Tracks document lifecycle events, triggers interpreter reloads, parses
//! the output into per-file diagnostic sets and republishes them through a
//! [`DiagnosticsSink`]. Publication is all-or-nothing, matching the
//! interpreter's all-or-nothing reload semantics: the entire collection is
//! cleared first, then every file's fresh set is published. There are no
//! incremental updates.
//!
//! Driver failures never escape [`DiagnosticsDriver::handle_event`]; they
//! are routed to the sink's error channel keyed by the document that
//! triggered the pass, so the editor integration cannot crash on a bad
//! reload.

use async_trait::async_trait;
use hadex_core::{Diagnostic, Result};
use hadex_ghci::parse::parse_load_output;
use hadex_ghci::GhciSession;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// Document lifecycle events the driver reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentEvent {
    Opened(PathBuf),
    Saved(PathBuf),
    Closed(PathBuf),
}

/// Where diagnostics go.
///
/// Implemented by the editor-integration layer (e.g. an LSP
/// publishDiagnostics bridge); a collecting implementation for tests lives
/// in `hadex-testing`.
#[async_trait]
pub trait DiagnosticsSink: Send + Sync {
    /// Replace the published set for one file.
    async fn publish(&self, file: PathBuf, diagnostics: Vec<Diagnostic>);

    /// Drop every published diagnostic, across all files.
    async fn clear_all(&self);

    /// Surface a driver failure, keyed by the document that triggered it.
    async fn report_error(&self, document: PathBuf, message: String);
}

/// Orchestrates reload-triggered diagnostics for one interpreter session.
pub struct DiagnosticsDriver {
    session: Arc<dyn GhciSession>,
    sink: Arc<dyn DiagnosticsSink>,
}

impl DiagnosticsDriver {
    pub fn new(session: Arc<dyn GhciSession>, sink: Arc<dyn DiagnosticsSink>) -> Self {
        DiagnosticsDriver { session, sink }
    }

    /// React to one document event. Never returns an error: failures are
    /// reported through the sink.
    pub async fn handle_event(&self, event: DocumentEvent) {
        match event {
            DocumentEvent::Opened(document) | DocumentEvent::Saved(document) => {
                if let Err(e) = self.check(&document).await {
                    warn!("Diagnostics pass failed for {}: {}", document.display(), e);
                    self.sink
                        .report_error(
                            document.clone(),
                            format!("Error checking {}: {}", document.display(), e),
                        )
                        .await;
                }
            }
            DocumentEvent::Closed(document) => {
                debug!("Document closed, tearing session down: {}", document.display());
                // Diagnostics for a closed document are cleared entirely.
                self.sink.publish(document, Vec::new()).await;
                if let Err(e) = self.session.shutdown().await {
                    warn!("Interpreter shutdown failed: {}", e);
                }
            }
        }
    }

    /// One reload pass: reload, parse, group by resolved absolute path and
    /// republish the whole collection atomically.
    pub async fn check(&self, document: &Path) -> Result<()> {
        self.session.wait_ready().await?;
        let lines = self.session.reload().await?;
        let parsed = parse_load_output(&lines)?;

        // Group by resolved path, preserving first-appearance order.
        let mut groups: Vec<(PathBuf, Vec<Diagnostic>)> = Vec::new();
        for entry in parsed {
            let path = resolve_path(&entry.file);
            match groups.iter_mut().find(|(p, _)| *p == path) {
                Some((_, diagnostics)) => diagnostics.push(entry.diagnostic),
                None => groups.push((path, vec![entry.diagnostic])),
            }
        }

        debug!(
            document = %document.display(),
            files = groups.len(),
            "Publishing diagnostics"
        );

        // Clear-then-publish keeps the collection consistent with the
        // interpreter's whole-project reload: files that became clean
        // simply drop out.
        self.sink.clear_all().await;
        for (path, diagnostics) in groups {
            self.sink.publish(path, diagnostics).await;
        }
        Ok(())
    }
}

/// Resolve an interpreter-reported file path to an absolute one.
///
/// Canonicalization requires the file to exist; when it does not (deleted
/// mid-reload, odd working directory), the path is kept as printed.
fn resolve_path(file: &str) -> PathBuf {
    std::fs::canonicalize(file).unwrap_or_else(|_| PathBuf::from(file))
}
