//! Debug session state machine
//!
//! One [`DebugSession`] per editor debug session. The lifecycle is
//!
//! ```text
//! Uninitialized -> Initialized -> Configuring -> Running <-> Stopped -> Terminated
//! ```
//!
//! The whole session state is a single enum value behind a lock, replaced
//! wholesale on every transition - the stop location and the binding list
//! live inside the `Stopped` variant, so they can never be observed
//! half-updated.
//!
//! Run-control commands (the launch entry command, `:continue`, `:step`)
//! are fire-and-continue: the request is acknowledged as soon as the
//! command is on its way, and a spawned handler awaits the interpreter's
//! response, performs the Running->Stopped/Terminated transition and emits
//! the corresponding event. Because the interpreter serializes commands,
//! the handler of the most recently issued command is always the one that
//! observes the outcome.

use crate::breakpoints::BreakpointManager;
use crate::error::{Error, Result};
use crate::protocol::Capabilities;
use hadex_config::{LaunchConfig, SessionConfig};
use hadex_core::{Binding, Breakpoint, StopLocation, StopReason};
use hadex_ghci::parse::{parse_eval_reply, parse_run_response, RunOutcome};
use hadex_ghci::{GhciCommand, GhciSession};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex, Notify, RwLock};
use tracing::{debug, info, warn};

// ============================================================================
// Session state and events
// ============================================================================

/// The session lifecycle state. Replaced wholesale on each transition.
#[derive(Debug, Clone, PartialEq, Eq)]
enum SessionState {
    Uninitialized,
    Initialized,
    Configuring,
    Running,
    Stopped {
        at: StopLocation,
        bindings: Vec<Binding>,
    },
    Terminated,
}

impl SessionState {
    fn name(&self) -> &'static str {
        match self {
            SessionState::Uninitialized => "uninitialized",
            SessionState::Initialized => "initialized",
            SessionState::Configuring => "configuring",
            SessionState::Running => "running",
            SessionState::Stopped { .. } => "stopped",
            SessionState::Terminated => "terminated",
        }
    }
}

/// Asynchronous events the session emits toward the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Ready for breakpoint configuration (after the module loaded).
    Initialized,
    /// Execution suspended; reason is `breakpoint` or `step`.
    Stopped { reason: StopReason },
    /// The debuggee ran to completion.
    Terminated,
}

// ============================================================================
// DebugSession
// ============================================================================

/// Protocol-facing debug session over one interpreter process.
pub struct DebugSession {
    ghci: Arc<dyn GhciSession>,
    breakpoints: Arc<BreakpointManager>,
    state: Arc<RwLock<SessionState>>,
    configuration_done: Arc<Notify>,
    events: mpsc::Sender<SessionEvent>,
    config: SessionConfig,
    /// Handle of the in-flight run-response task, for cleanup on dispose.
    run_task: Mutex<Option<tokio::task::JoinHandle<()>>>,
}

impl DebugSession {
    /// Create a session and the receiving end of its event channel.
    pub fn new(
        ghci: Arc<dyn GhciSession>,
        config: SessionConfig,
    ) -> (Self, mpsc::Receiver<SessionEvent>) {
        let (events, events_rx) = mpsc::channel(config.event_channel_capacity);
        let session = DebugSession {
            breakpoints: Arc::new(BreakpointManager::new(Arc::clone(&ghci))),
            ghci,
            state: Arc::new(RwLock::new(SessionState::Uninitialized)),
            configuration_done: Arc::new(Notify::new()),
            events,
            config,
            run_task: Mutex::new(None),
        };
        (session, events_rx)
    }

    /// Handle the initialize request: declare capabilities.
    pub async fn initialize(&self) -> Capabilities {
        *self.state.write().await = SessionState::Initialized;
        Capabilities {
            supports_configuration_done_request: true,
            supports_evaluate_for_hovers: true,
        }
    }

    /// Signal that the editor finished sending configuration (breakpoints).
    ///
    /// A permit is stored if the launch is not waiting yet, so the signal is
    /// never lost to ordering.
    pub fn configuration_done(&self) {
        self.configuration_done.notify_one();
    }

    /// Handle the launch request.
    ///
    /// Loads the module, emits `initialized`, waits (bounded) for the
    /// configuration-done signal, then fires the entry command without
    /// awaiting its outcome - the stop or termination arrives later as a
    /// [`SessionEvent`]. Returns once the entry command is on its way, so
    /// the launch response never blocks on the debuggee.
    pub async fn launch(&self, launch: LaunchConfig) -> Result<()> {
        if launch.module.is_empty() {
            return Err(Error::LaunchFailed(
                "Cannot find a module to debug".to_string(),
            ));
        }

        {
            let state = self.state.read().await;
            if *state != SessionState::Initialized {
                return Err(Error::Protocol(format!(
                    "launch request while {}",
                    state.name()
                )));
            }
        }

        info!(module = %launch.module, function = %launch.function, "Launching");
        self.ghci.wait_ready().await?;
        self.ghci
            .send_command(&GhciCommand::Load(launch.module.clone()))
            .await?;

        *self.state.write().await = SessionState::Configuring;
        let _ = self.events.send(SessionEvent::Initialized).await;

        // Bounded wait: a missing configurationDone must not hang the
        // launch forever.
        let timeout = Duration::from_millis(self.config.configuration_done_timeout_ms);
        if tokio::time::timeout(timeout, self.configuration_done.notified())
            .await
            .is_err()
        {
            warn!(
                timeout_ms = self.config.configuration_done_timeout_ms,
                "Configuration-done wait timed out, launching anyway"
            );
        }

        let entry = if launch.stop_on_entry {
            GhciCommand::StepInto(launch.function.clone())
        } else {
            GhciCommand::Evaluate(launch.function.clone())
        };
        self.start_run(entry).await
    }

    /// Replace the breakpoints for a file (whole-table semantics).
    pub async fn set_breakpoints(
        &self,
        source_name: &str,
        source_path: &str,
        lines: &[u32],
    ) -> Result<Vec<Breakpoint>> {
        self.breakpoints
            .set_breakpoints(source_name, source_path, lines)
            .await
    }

    /// Resume to the next breakpoint (`:continue`).
    pub async fn continue_run(&self) -> Result<()> {
        self.resume(GhciCommand::Continue).await
    }

    /// Single step (`:step`).
    pub async fn step(&self) -> Result<()> {
        self.resume(GhciCommand::Step).await
    }

    async fn resume(&self, command: GhciCommand) -> Result<()> {
        {
            let state = self.state.read().await;
            match *state {
                SessionState::Stopped { .. } => {}
                // Resending commands to a finished debuggee is never
                // meaningful; reject with a defined error.
                SessionState::Terminated => return Err(Error::SessionEnded),
                _ => {
                    return Err(Error::Protocol(format!(
                        "cannot resume while {}",
                        state.name()
                    )))
                }
            }
        }
        self.start_run(command).await
    }

    /// Enter `Running` and spawn the response handler for one run-control
    /// command. The handler performs the next transition and emits the
    /// event; stop and terminate events therefore always belong to the most
    /// recently issued command.
    async fn start_run(&self, command: GhciCommand) -> Result<()> {
        *self.state.write().await = SessionState::Running;
        debug!(command = %command, "Run command issued");

        let ghci = Arc::clone(&self.ghci);
        let state = Arc::clone(&self.state);
        let breakpoints = Arc::clone(&self.breakpoints);
        let events = self.events.clone();

        let handle = tokio::spawn(async move {
            let outcome = match ghci.send_command(&command).await {
                Ok(lines) => parse_run_response(&lines),
                Err(e) => {
                    // A dead interpreter and a finished program look the
                    // same from the editor's side.
                    warn!("Run command failed: {}", e);
                    RunOutcome::Terminated
                }
            };

            match outcome {
                RunOutcome::Stopped(stop) => {
                    let reason = breakpoints.classify_stop(&stop.location).await;
                    debug!(
                        function = %stop.location.function,
                        line = stop.location.line,
                        column = stop.location.column,
                        reason = reason.as_str(),
                        "Execution stopped"
                    );
                    *state.write().await = SessionState::Stopped {
                        at: stop.location,
                        bindings: stop.bindings,
                    };
                    let _ = events.send(SessionEvent::Stopped { reason }).await;
                }
                RunOutcome::Terminated => {
                    debug!("Debuggee terminated");
                    *state.write().await = SessionState::Terminated;
                    let _ = events.send(SessionEvent::Terminated).await;
                }
            }
        });

        *self.run_task.lock().await = Some(handle);
        Ok(())
    }

    /// Current stop location, if suspended.
    pub async fn stopped_at(&self) -> Option<StopLocation> {
        match &*self.state.read().await {
            SessionState::Stopped { at, .. } => Some(at.clone()),
            _ => None,
        }
    }

    /// Bindings in scope at the current stop (empty while running).
    pub async fn bindings(&self) -> Vec<Binding> {
        match &*self.state.read().await {
            SessionState::Stopped { bindings, .. } => bindings.clone(),
            _ => Vec::new(),
        }
    }

    /// Evaluate an expression.
    ///
    /// An expression exactly matching a known binding name answers from
    /// state without an interpreter round-trip. Anything else is sent
    /// verbatim; an empty or unrecognized reply yields `None`, a normal
    /// degraded outcome.
    pub async fn evaluate(&self, expression: &str) -> Result<Option<String>> {
        {
            let state = self.state.read().await;
            if *state == SessionState::Terminated {
                return Err(Error::SessionEnded);
            }
            if let SessionState::Stopped { bindings, .. } = &*state {
                if let Some(binding) = bindings.iter().find(|b| b.name == expression) {
                    return Ok(Some(binding.value.clone()));
                }
            }
        }

        let reply = self
            .ghci
            .send_command(&GhciCommand::Evaluate(expression.to_string()))
            .await?;
        Ok(parse_eval_reply(&reply))
    }

    /// Tear the session down: stop listening for the in-flight response and
    /// kill the interpreter. There is no cancellation of the in-flight
    /// command itself.
    pub async fn dispose(&self) {
        if let Some(handle) = self.run_task.lock().await.take() {
            handle.abort();
        }
        *self.state.write().await = SessionState::Terminated;
        if let Err(e) = self.ghci.shutdown().await {
            warn!("Interpreter shutdown failed: {}", e);
        }
    }
}
