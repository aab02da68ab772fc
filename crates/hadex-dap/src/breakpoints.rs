//! Breakpoint management
//!
//! The interpreter has no "replace breakpoints" operation, so every
//! setBreakpoints request tears the whole table down (`:delete *`) and
//! rebuilds it one `:break` at a time - strictly in order, one command in
//! flight, because the interpreter serializes everything behind one prompt.
//!
//! A confirmation that fails to parse degrades that one breakpoint to
//! unverified; the rest of the batch still proceeds.

use crate::error::Result;
use hadex_core::{Breakpoint, StopLocation, StopReason};
use hadex_ghci::parse::parse_break_confirmation;
use hadex_ghci::{GhciCommand, GhciSession};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Module stem used in `:break` commands: `Fib.hs` -> `Fib`.
fn module_stem(source_name: &str) -> String {
    source_name
        .split('.')
        .next()
        .unwrap_or(source_name)
        .to_string()
}

/// Owns the breakpoint table for one debug session.
pub struct BreakpointManager {
    session: Arc<dyn GhciSession>,
    table: RwLock<Vec<Breakpoint>>,
}

impl BreakpointManager {
    pub fn new(session: Arc<dyn GhciSession>) -> Self {
        BreakpointManager {
            session,
            table: RwLock::new(Vec::new()),
        }
    }

    /// Replace every breakpoint for a file.
    ///
    /// Sends `:delete *` (reply discarded), then one `:break <module>
    /// <line>` per requested line in the given order, awaiting each reply
    /// before issuing the next. The stored table is replaced wholesale with
    /// the result.
    pub async fn set_breakpoints(
        &self,
        source_name: &str,
        source_path: &str,
        lines: &[u32],
    ) -> Result<Vec<Breakpoint>> {
        self.session
            .send_command(&GhciCommand::DeleteAllBreakpoints)
            .await?;

        let module = module_stem(source_name);
        let mut table = Vec::with_capacity(lines.len());

        for &line in lines {
            let reply = self
                .session
                .send_command(&GhciCommand::Break {
                    module: module.clone(),
                    line,
                })
                .await?;

            let breakpoint = match parse_break_confirmation(&reply) {
                Some(confirmation) => {
                    debug!(
                        id = confirmation.id,
                        line = confirmation.line,
                        column = confirmation.column,
                        "Breakpoint confirmed"
                    );
                    Breakpoint {
                        id: confirmation.id,
                        verified: true,
                        line: confirmation.line,
                        column: confirmation.column,
                        source_name: source_name.to_string(),
                        source_path: source_path.to_string(),
                    }
                }
                None => {
                    warn!(line, "Breakpoint not confirmed by interpreter");
                    Breakpoint {
                        id: 0,
                        verified: false,
                        line,
                        column: 1,
                        source_name: source_name.to_string(),
                        source_path: source_path.to_string(),
                    }
                }
            };
            table.push(breakpoint);
        }

        *self.table.write().await = table.clone();
        Ok(table)
    }

    /// Classify a stop: `Breakpoint` iff (line, column) exactly matches a
    /// stored breakpoint, otherwise `Step`.
    pub async fn classify_stop(&self, location: &StopLocation) -> StopReason {
        let table = self.table.read().await;
        let hit = table
            .iter()
            .any(|bp| bp.line == location.line && bp.column == location.column);
        if hit {
            StopReason::Breakpoint
        } else {
            StopReason::Step
        }
    }

    /// Current table contents (for inspection and responses).
    pub async fn snapshot(&self) -> Vec<Breakpoint> {
        self.table.read().await.clone()
    }
}
