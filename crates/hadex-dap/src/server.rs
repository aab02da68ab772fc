//! Request dispatch loop
//!
//! Ties the framing transport and the session state machine together over
//! one reader/writer pair (stdio in production, an in-memory duplex in
//! tests).
//!
//! Every request is handled in its own task: the launch request suspends
//! waiting for configurationDone, and that very request has to be read and
//! dispatched while the launch is parked. Interpreter-side serialization is
//! unaffected - the session's command lock still admits one command at a
//! time.

use crate::error::Result;
use crate::protocol::{
    events, requests, Breakpoint, EvaluateArguments, LaunchRequestArguments, ProtocolMessage,
    Request, Scope, ScopesResponseBody, SetBreakpointsArguments, SetBreakpointsResponseBody,
    Source, StackFrame, StackTraceResponseBody, StoppedEventBody, Thread, ThreadsResponseBody,
    Variable, VariablesResponseBody, THREAD_ID,
};
use crate::session::{DebugSession, SessionEvent};
use crate::transport::{read_message, DapWriter};
use hadex_config::{LaunchConfig, SessionConfig};
use hadex_ghci::GhciSession;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Serve one debug session over the given streams until the editor
/// disconnects or the stream ends.
pub async fn serve<R, W>(
    reader: R,
    writer: W,
    ghci: Arc<dyn GhciSession>,
    config: SessionConfig,
) -> Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Send + Unpin + 'static,
{
    let writer = DapWriter::new(writer);
    let (session, events_rx) = DebugSession::new(ghci, config);
    let session = Arc::new(session);

    let pump = tokio::spawn(pump_events(events_rx, Arc::clone(&writer)));

    let mut reader = BufReader::new(reader);
    loop {
        let message = match read_message(&mut reader).await {
            Ok(Some(message)) => message,
            Ok(None) => {
                info!("Editor disconnected (EOF)");
                break;
            }
            Err(e) => {
                warn!("Unreadable frame, closing connection: {}", e);
                break;
            }
        };

        let request = match message {
            ProtocolMessage::Request(request) => request,
            other => {
                warn!("Ignoring non-request message: {:?}", other);
                continue;
            }
        };

        if request.command == requests::DISCONNECT {
            debug!("Disconnect requested");
            let _ = writer.respond_success(&request, None).await;
            break;
        }

        tokio::spawn(handle_request(
            Arc::clone(&session),
            Arc::clone(&writer),
            request,
        ));
    }

    session.dispose().await;
    pump.abort();
    Ok(())
}

/// Forward session events to the editor.
async fn pump_events(mut events_rx: mpsc::Receiver<SessionEvent>, writer: Arc<DapWriter>) {
    while let Some(event) = events_rx.recv().await {
        let result = match event {
            SessionEvent::Initialized => writer.send_event(events::INITIALIZED, None).await,
            SessionEvent::Stopped { reason } => {
                let body = StoppedEventBody {
                    reason: reason.as_str().to_string(),
                    thread_id: THREAD_ID,
                };
                match serde_json::to_value(body) {
                    Ok(body) => writer.send_event(events::STOPPED, Some(body)).await,
                    Err(e) => Err(e.into()),
                }
            }
            SessionEvent::Terminated => writer.send_event(events::TERMINATED, None).await,
        };
        if let Err(e) = result {
            warn!("Failed to emit event, stopping pump: {}", e);
            break;
        }
    }
}

async fn handle_request(session: Arc<DebugSession>, writer: Arc<DapWriter>, request: Request) {
    debug!(seq = request.seq, command = %request.command, "Handling request");
    if let Err(e) = dispatch(&session, &writer, &request).await {
        // Failing to write a response means the connection is going away;
        // there is nobody left to tell.
        warn!(command = %request.command, "Request handling failed: {}", e);
    }
}

async fn dispatch(
    session: &DebugSession,
    writer: &DapWriter,
    request: &Request,
) -> Result<()> {
    match request.command.as_str() {
        requests::INITIALIZE => {
            let capabilities = session.initialize().await;
            writer
                .respond_success(request, Some(serde_json::to_value(capabilities)?))
                .await
        }

        requests::LAUNCH => {
            let args: LaunchRequestArguments = match request.parse_arguments() {
                Ok(args) => args,
                Err(e) => {
                    return writer
                        .respond_error(request, format!("Invalid launch arguments: {}", e))
                        .await
                }
            };
            let mut launch = LaunchConfig::resolve(args.module, args.function);
            launch.stop_on_entry = args.stop_on_entry;
            launch.trace = args.trace;

            match session.launch(launch).await {
                Ok(()) => writer.respond_success(request, None).await,
                Err(e) => writer.respond_error(request, e.to_string()).await,
            }
        }

        requests::CONFIGURATION_DONE => {
            session.configuration_done();
            writer.respond_success(request, None).await
        }

        requests::SET_BREAKPOINTS => {
            let args: SetBreakpointsArguments = match request.parse_arguments() {
                Ok(args) => args,
                Err(e) => {
                    return writer
                        .respond_error(request, format!("Invalid setBreakpoints arguments: {}", e))
                        .await
                }
            };
            let path = args.source.path.clone().unwrap_or_default();
            let name = args
                .source
                .name
                .clone()
                .unwrap_or_else(|| basename(&path));
            let lines: Vec<u32> = args.breakpoints.iter().map(|bp| bp.line).collect();

            match session.set_breakpoints(&name, &path, &lines).await {
                Ok(table) => {
                    let body = SetBreakpointsResponseBody {
                        breakpoints: table.iter().map(breakpoint_to_wire).collect(),
                    };
                    writer
                        .respond_success(request, Some(serde_json::to_value(body)?))
                        .await
                }
                Err(e) => writer.respond_error(request, e.to_string()).await,
            }
        }

        requests::THREADS => {
            let body = ThreadsResponseBody {
                threads: vec![Thread {
                    id: THREAD_ID,
                    name: "default".to_string(),
                }],
            };
            writer
                .respond_success(request, Some(serde_json::to_value(body)?))
                .await
        }

        requests::STACK_TRACE => {
            let stack_frames = match session.stopped_at().await {
                Some(at) => vec![StackFrame {
                    id: 0,
                    name: at.frame_name().to_string(),
                    source: Some(Source {
                        name: Some(basename(&at.file)),
                        path: Some(at.file.clone()),
                    }),
                    line: at.line.saturating_sub(1),
                    column: at.column.saturating_sub(1),
                }],
                None => Vec::new(),
            };
            let body = StackTraceResponseBody {
                total_frames: stack_frames.len() as i64,
                stack_frames,
            };
            writer
                .respond_success(request, Some(serde_json::to_value(body)?))
                .await
        }

        requests::SCOPES => {
            let body = ScopesResponseBody {
                scopes: vec![Scope {
                    name: "Local".to_string(),
                    variables_reference: 1,
                    expensive: false,
                }],
            };
            writer
                .respond_success(request, Some(serde_json::to_value(body)?))
                .await
        }

        requests::VARIABLES => {
            let variables: Vec<Variable> = session
                .bindings()
                .await
                .into_iter()
                .map(|binding| Variable {
                    name: binding.name,
                    ty: Some(binding.ty),
                    value: binding.value,
                    variables_reference: 0,
                })
                .collect();
            let body = VariablesResponseBody { variables };
            writer
                .respond_success(request, Some(serde_json::to_value(body)?))
                .await
        }

        requests::EVALUATE => {
            let args: EvaluateArguments = match request.parse_arguments() {
                Ok(args) => args,
                Err(e) => {
                    return writer
                        .respond_error(request, format!("Invalid evaluate arguments: {}", e))
                        .await
                }
            };
            match session.evaluate(&args.expression).await {
                Ok(result) => {
                    let body = crate::protocol::EvaluateResponseBody {
                        result: result.unwrap_or_default(),
                        variables_reference: 0,
                    };
                    writer
                        .respond_success(request, Some(serde_json::to_value(body)?))
                        .await
                }
                Err(e) => writer.respond_error(request, e.to_string()).await,
            }
        }

        requests::CONTINUE => match session.continue_run().await {
            Ok(()) => writer.respond_success(request, None).await,
            Err(e) => writer.respond_error(request, e.to_string()).await,
        },

        requests::NEXT => match session.step().await {
            Ok(()) => writer.respond_success(request, None).await,
            Err(e) => writer.respond_error(request, e.to_string()).await,
        },

        unknown => {
            writer
                .respond_error(request, format!("Unsupported request: {}", unknown))
                .await
        }
    }
}

/// 0-based wire representation of a confirmed breakpoint.
fn breakpoint_to_wire(breakpoint: &hadex_core::Breakpoint) -> Breakpoint {
    Breakpoint {
        id: breakpoint.id,
        verified: breakpoint.verified,
        line: breakpoint.line.saturating_sub(1),
        column: breakpoint.column.saturating_sub(1),
        source: Source {
            name: Some(breakpoint.source_name.clone()),
            path: Some(breakpoint.source_path.clone()),
        },
    }
}

fn basename(path: &str) -> String {
    std::path::Path::new(path)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(path)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basename() {
        assert_eq!(basename("/src/app/Fib.hs"), "Fib.hs");
        assert_eq!(basename("Fib.hs"), "Fib.hs");
        assert_eq!(basename(""), "");
    }

    #[test]
    fn test_breakpoint_to_wire_is_zero_based() {
        let breakpoint = hadex_core::Breakpoint {
            id: 2,
            verified: true,
            line: 7,
            column: 1,
            source_name: "Foo.hs".to_string(),
            source_path: "/src/Foo.hs".to_string(),
        };
        let wire = breakpoint_to_wire(&breakpoint);
        assert_eq!(wire.line, 6);
        assert_eq!(wire.column, 0);
        assert_eq!(wire.source.name.as_deref(), Some("Foo.hs"));
    }
}
