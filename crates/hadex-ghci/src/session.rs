//! GHCi subprocess session
//!
//! One long-lived interpreter process backs one session. The interpreter has
//! no request framing beyond "output ends, prompt returns", so a unique
//! prompt sentinel is installed at startup and every response is read until
//! the sentinel comes back. Commands are strictly serialized: the I/O lock
//! is held from the write until the final response line, so there is never
//! more than one command in flight and replies cannot be attributed to the
//! wrong command.
//!
//! GHC writes compiler messages to stderr while the prompt lives on stdout;
//! a background task collects stderr lines continuously and they are
//! appended to the response of the command that triggered them (each
//! stream's internal order is preserved).

use crate::command::GhciCommand;
use async_trait::async_trait;
use hadex_config::GhciConfig;
use hadex_core::{Error, Result};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, trace, warn};

/// One interpreter session, as seen by the debug session and the
/// diagnostics driver.
///
/// Implementations must serialize commands internally: a call to
/// `send_command` or `reload` must not start writing before the previous
/// call's response is fully received.
#[async_trait]
pub trait GhciSession: Send + Sync {
    /// Send one command and collect its full multi-line textual response.
    async fn send_command(&self, command: &GhciCommand) -> Result<Vec<String>>;

    /// Trigger a module reload and return its raw output lines.
    async fn reload(&self) -> Result<Vec<String>>;

    /// Resolve once the interpreter is ready to accept commands.
    async fn wait_ready(&self) -> Result<()>;

    /// Tear the session down. In-flight commands are not cancelled; the
    /// backing process is killed and reading simply stops.
    async fn shutdown(&self) -> Result<()>;
}

// ============================================================================
// Response framing
// ============================================================================

/// Read response lines until a line ending with the prompt sentinel.
///
/// The sentinel check uses a suffix match rather than equality: before the
/// sentinel prompt is installed, the interpreter's default prompt (printed
/// without a trailing newline) glues itself to the front of the first
/// sentinel line.
async fn read_until_prompt<R>(reader: &mut BufReader<R>, sentinel: &str) -> Result<Vec<String>>
where
    R: AsyncRead + Unpin,
{
    let mut lines = Vec::new();
    let mut line = String::new();

    loop {
        line.clear();
        let bytes_read = reader.read_line(&mut line).await?;
        if bytes_read == 0 {
            return Err(Error::Interpreter(
                "interpreter closed its output stream".to_string(),
            ));
        }

        let trimmed = line.trim_end_matches(['\r', '\n']);
        if let Some(prefix) = trimmed.strip_suffix(sentinel) {
            if !prefix.is_empty() {
                lines.push(prefix.to_string());
            }
            return Ok(lines);
        }
        lines.push(trimmed.to_string());
    }
}

/// Append queued stderr lines to a response.
///
/// Everything already queued belongs to the current command because commands
/// are serialized; the settle window catches lines still in flight when the
/// stdout prompt arrived.
async fn drain_stderr(
    stderr_rx: &mut mpsc::UnboundedReceiver<String>,
    settle: Duration,
    out: &mut Vec<String>,
) {
    loop {
        match tokio::time::timeout(settle, stderr_rx.recv()).await {
            Ok(Some(line)) => out.push(line),
            Ok(None) | Err(_) => break,
        }
    }
}

// ============================================================================
// GhciProcess
// ============================================================================

struct SessionIo {
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    stderr_rx: mpsc::UnboundedReceiver<String>,
    /// Sentinel prompt installed and first prompt consumed.
    ready: bool,
}

/// A real interpreter subprocess implementing [`GhciSession`].
pub struct GhciProcess {
    config: GhciConfig,
    child: Mutex<Option<Child>>,
    io: Mutex<SessionIo>,
}

impl std::fmt::Debug for GhciProcess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GhciProcess")
            .field("command", &self.config.command)
            .finish()
    }
}

impl GhciProcess {
    /// Spawn the interpreter with piped stdio.
    ///
    /// The process is running afterwards but not yet ready; readiness (the
    /// sentinel prompt handshake) is established lazily by the first command
    /// or explicitly via [`GhciSession::wait_ready`].
    pub async fn spawn(config: GhciConfig) -> Result<Self> {
        let args = config.full_args();
        debug!("Spawning interpreter: {} {:?}", config.command, args);

        let mut child = Command::new(&config.command)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                Error::Interpreter(format!("failed to spawn {}: {}", config.command, e))
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| Error::Interpreter("interpreter stdin unavailable".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::Interpreter("interpreter stdout unavailable".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| Error::Interpreter("interpreter stderr unavailable".to_string()))?;

        let (stderr_tx, stderr_rx) = mpsc::unbounded_channel();
        tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                if stderr_tx.send(line).is_err() {
                    break;
                }
            }
            trace!("Interpreter stderr reader finished");
        });

        Ok(GhciProcess {
            config,
            child: Mutex::new(Some(child)),
            io: Mutex::new(SessionIo {
                stdin,
                stdout: BufReader::new(stdout),
                stderr_rx,
                ready: false,
            }),
        })
    }

    /// Check whether the backing process is still alive.
    pub async fn is_running(&self) -> bool {
        let mut child = self.child.lock().await;
        match child.as_mut() {
            Some(child) => child.try_wait().unwrap_or(None).is_none(),
            None => false,
        }
    }

    /// Install the sentinel prompt and consume startup output, bounded by
    /// the configured startup timeout. Idempotent; callers hold the I/O
    /// lock.
    async fn ensure_ready(&self, io: &mut SessionIo) -> Result<()> {
        if io.ready {
            return Ok(());
        }

        let timeout = Duration::from_millis(self.config.startup_timeout_ms);
        let sentinel = &self.config.prompt_sentinel;

        let handshake = async {
            // Both the prompt and the continuation prompt end a line with
            // the sentinel; each :set produces one (new-style) prompt.
            for set_command in [
                format!(":set prompt \"{}\\n\"", sentinel),
                format!(":set prompt-cont \"{}\\n\"", sentinel),
            ] {
                io.stdin.write_all(set_command.as_bytes()).await?;
                io.stdin.write_all(b"\n").await?;
                io.stdin.flush().await?;
                let discarded = read_until_prompt(&mut io.stdout, sentinel).await?;
                trace!(lines = discarded.len(), "Discarded pre-ready output");
            }
            Ok::<(), Error>(())
        };

        match tokio::time::timeout(timeout, handshake).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(Error::Interpreter(format!(
                    "interpreter did not become ready within {}ms",
                    self.config.startup_timeout_ms
                )))
            }
        }

        io.ready = true;
        debug!("Interpreter session ready");
        Ok(())
    }

    /// Write one command line and read its full response.
    ///
    /// The I/O lock spans the whole exchange - this is the serialization
    /// point for the entire session.
    async fn run_raw(&self, text: &str) -> Result<Vec<String>> {
        let mut io = self.io.lock().await;
        self.ensure_ready(&mut io).await?;

        io.stdin.write_all(text.as_bytes()).await?;
        io.stdin.write_all(b"\n").await?;
        io.stdin.flush().await?;

        let mut lines = read_until_prompt(&mut io.stdout, &self.config.prompt_sentinel).await?;

        let settle = Duration::from_millis(self.config.stderr_settle_ms);
        drain_stderr(&mut io.stderr_rx, settle, &mut lines).await;

        trace!(command = text, lines = lines.len(), "Interpreter response");
        Ok(lines)
    }
}

#[async_trait]
impl GhciSession for GhciProcess {
    async fn send_command(&self, command: &GhciCommand) -> Result<Vec<String>> {
        self.run_raw(&command.render()).await
    }

    async fn reload(&self) -> Result<Vec<String>> {
        self.run_raw(":reload").await
    }

    async fn wait_ready(&self) -> Result<()> {
        let mut io = self.io.lock().await;
        self.ensure_ready(&mut io).await
    }

    async fn shutdown(&self) -> Result<()> {
        let mut child = self.child.lock().await;
        if let Some(mut child) = child.take() {
            debug!("Stopping interpreter session");
            match child.kill().await {
                Ok(_) => debug!("Interpreter process killed"),
                Err(e) => warn!("Failed to kill interpreter process: {}", e),
            }
            match child.wait().await {
                Ok(status) => debug!("Interpreter exited with status: {}", status),
                Err(e) => warn!("Failed to wait for interpreter process: {}", e),
            }
        }
        Ok(())
    }
}

impl Drop for GhciProcess {
    fn drop(&mut self) {
        // Best-effort kill; shutdown() is the orderly path.
        if let Some(mut child) = self.child.try_lock().ok().and_then(|mut c| c.take()) {
            let _ = child.start_kill();
        }
    }
}
