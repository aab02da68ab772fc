//! Mock implementations for testing
//!
//! - [`ScriptedGhci`] - a `GhciSession` replaying scripted replies keyed by
//!   the exact command text, recording everything sent
//! - [`CollectingSink`] - a `DiagnosticsSink` that records publications

use async_trait::async_trait;
use hadex_core::{Diagnostic, Result};
use hadex_diagnostics::DiagnosticsSink;
use hadex_ghci::{GhciCommand, GhciSession};
use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::Mutex;
use tracing::warn;

// ============================================================================
// ScriptedGhci
// ============================================================================

/// A scripted interpreter session.
///
/// Replies are registered per exact command text and consumed in FIFO order
/// per command; a command with no scripted reply gets an empty response
/// (which reads as "ran to completion" / "not confirmed" downstream) plus a
/// warning, so a missing script line degrades loudly but deterministically.
///
/// # Example
///
/// ```no_run
/// use hadex_testing::ScriptedGhci;
///
/// let ghci = ScriptedGhci::new()
///     .with_reply(":load Main", &["Ok, one module loaded."])
///     .with_reply("main", &["Stopped in Main.f, Foo.hs:5:3"]);
/// ```
pub struct ScriptedGhci {
    replies: Mutex<HashMap<String, VecDeque<Vec<String>>>>,
    reload_replies: Mutex<VecDeque<Vec<String>>>,
    sent: Mutex<Vec<String>>,
    ready_calls: AtomicUsize,
    shutdown_called: AtomicBool,
}

impl ScriptedGhci {
    pub fn new() -> Self {
        ScriptedGhci {
            replies: Mutex::new(HashMap::new()),
            reload_replies: Mutex::new(VecDeque::new()),
            sent: Mutex::new(Vec::new()),
            ready_calls: AtomicUsize::new(0),
            shutdown_called: AtomicBool::new(false),
        }
    }

    /// Script the reply for one occurrence of `command`.
    pub fn with_reply(mut self, command: &str, reply: &[&str]) -> Self {
        self.replies
            .get_mut()
            .entry(command.to_string())
            .or_default()
            .push_back(reply.iter().map(|s| s.to_string()).collect());
        self
    }

    /// Script the reply for the next `reload()` call.
    pub fn with_reload_reply(mut self, reply: Vec<String>) -> Self {
        self.reload_replies.get_mut().push_back(reply);
        self
    }

    /// Every command line sent so far, in order (reloads appear as
    /// `:reload`).
    pub async fn sent(&self) -> Vec<String> {
        self.sent.lock().await.clone()
    }

    /// How many times `wait_ready` was called.
    pub fn ready_calls(&self) -> usize {
        self.ready_calls.load(Ordering::SeqCst)
    }

    /// Whether `shutdown` was called.
    pub fn was_shutdown(&self) -> bool {
        self.shutdown_called.load(Ordering::SeqCst)
    }
}

impl Default for ScriptedGhci {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GhciSession for ScriptedGhci {
    async fn send_command(&self, command: &GhciCommand) -> Result<Vec<String>> {
        let rendered = command.render();
        self.sent.lock().await.push(rendered.clone());

        let mut replies = self.replies.lock().await;
        match replies.get_mut(&rendered).and_then(|queue| queue.pop_front()) {
            Some(reply) => Ok(reply),
            None => {
                warn!(command = %rendered, "No scripted reply, returning empty response");
                Ok(Vec::new())
            }
        }
    }

    async fn reload(&self) -> Result<Vec<String>> {
        self.sent.lock().await.push(":reload".to_string());
        Ok(self
            .reload_replies
            .lock()
            .await
            .pop_front()
            .unwrap_or_default())
    }

    async fn wait_ready(&self) -> Result<()> {
        self.ready_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn shutdown(&self) -> Result<()> {
        self.shutdown_called.store(true, Ordering::SeqCst);
        Ok(())
    }
}

// ============================================================================
// CollectingSink
// ============================================================================

/// A diagnostics sink that records everything for later assertions.
#[derive(Default)]
pub struct CollectingSink {
    published: Mutex<Vec<(PathBuf, Vec<Diagnostic>)>>,
    clear_count: AtomicUsize,
    errors: Mutex<Vec<(PathBuf, String)>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publications since construction, in order.
    pub async fn published(&self) -> Vec<(PathBuf, Vec<Diagnostic>)> {
        self.published.lock().await.clone()
    }

    /// How many times the collection was cleared.
    pub fn clear_count(&self) -> usize {
        self.clear_count.load(Ordering::SeqCst)
    }

    /// Reported errors, keyed by document path.
    pub async fn errors(&self) -> Vec<(PathBuf, String)> {
        self.errors.lock().await.clone()
    }
}

#[async_trait]
impl DiagnosticsSink for CollectingSink {
    async fn publish(&self, file: PathBuf, diagnostics: Vec<Diagnostic>) {
        self.published.lock().await.push((file, diagnostics));
    }

    async fn clear_all(&self) {
        self.clear_count.fetch_add(1, Ordering::SeqCst);
        self.published.lock().await.clear();
    }

    async fn report_error(&self, document: PathBuf, message: String) {
        self.errors.lock().await.push((document, message));
    }
}
