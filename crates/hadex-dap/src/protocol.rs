//! Debug Adapter Protocol message types (adapter side)
//!
//! Based on <https://microsoft.github.io/debug-adapter-protocol/specification>
//!
//! Messages are JSON with Content-Length headers:
//! ```text
//! Content-Length: 119\r\n
//! \r\n
//! {"seq":1,"type":"request","command":"initialize","arguments":{"adapterID":"ghci"}}
//! ```
//!
//! Only the subset this adapter serves is typed out: initialize, launch,
//! setBreakpoints, configurationDone, threads, stackTrace, scopes,
//! variables, evaluate, continue, next, disconnect, plus the initialized/
//! stopped/terminated events. Positions in outgoing bodies are 0-based.

use serde::{Deserialize, Serialize};

/// The single thread this adapter reports (the interpreter is
/// single-threaded from the editor's point of view).
pub const THREAD_ID: i64 = 1;

// ============================================================
// BASE PROTOCOL MESSAGE
// ============================================================

/// Base protocol message - every DAP message is one of these
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProtocolMessage {
    /// Request from the editor to the adapter
    Request(Request),
    /// Response from the adapter to the editor
    Response(Response),
    /// Event notification from the adapter to the editor
    Event(Event),
}

/// Request message sent by the editor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    /// Sequence number for message ordering
    pub seq: i64,
    /// Command to execute
    pub command: String,
    /// Command-specific arguments
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arguments: Option<serde_json::Value>,
}

impl Request {
    /// Deserialize this request's arguments into a typed struct.
    ///
    /// Absent arguments deserialize from `{}`, so argument structs with
    /// full `#[serde(default)]` coverage accept an omitted object.
    pub fn parse_arguments<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        match &self.arguments {
            Some(value) => serde_json::from_value(value.clone()),
            None => serde_json::from_value(serde_json::json!({})),
        }
    }
}

/// Response message sent by the adapter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    /// Sequence number
    pub seq: i64,
    /// Sequence number of the corresponding request
    pub request_seq: i64,
    /// Command this response is for
    pub command: String,
    /// Success indicator
    pub success: bool,
    /// Error message if not successful
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Response body
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,
}

/// Event notification sent by the adapter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Sequence number
    pub seq: i64,
    /// Event name
    pub event: String,
    /// Event body
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,
}

// ============================================================
// REQUEST / EVENT NAMES
// ============================================================

/// Request command names served by this adapter
pub mod requests {
    pub const INITIALIZE: &str = "initialize";
    pub const LAUNCH: &str = "launch";
    pub const SET_BREAKPOINTS: &str = "setBreakpoints";
    pub const CONFIGURATION_DONE: &str = "configurationDone";
    pub const THREADS: &str = "threads";
    pub const STACK_TRACE: &str = "stackTrace";
    pub const SCOPES: &str = "scopes";
    pub const VARIABLES: &str = "variables";
    pub const EVALUATE: &str = "evaluate";
    pub const CONTINUE: &str = "continue";
    pub const NEXT: &str = "next";
    pub const DISCONNECT: &str = "disconnect";
}

/// Event names emitted by this adapter
pub mod events {
    pub const INITIALIZED: &str = "initialized";
    pub const STOPPED: &str = "stopped";
    pub const TERMINATED: &str = "terminated";
}

// ============================================================
// CAPABILITIES
// ============================================================

/// The capability flags this adapter declares in the initialize response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    pub supports_configuration_done_request: bool,
    pub supports_evaluate_for_hovers: bool,
}

// ============================================================
// REQUEST ARGUMENTS
// ============================================================

/// Arguments of the launch request.
///
/// These are the adapter-specific attributes from the editor's launch
/// configuration, not part of the base protocol.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchRequestArguments {
    /// Module to load; `Main` when omitted
    #[serde(default)]
    pub module: Option<String>,
    /// Function to run; `main` when omitted
    #[serde(default)]
    pub function: Option<String>,
    /// Stop at the first step boundary after launch
    #[serde(default)]
    pub stop_on_entry: bool,
    /// Enable verbose protocol logging
    #[serde(default)]
    pub trace: bool,
}

/// A source descriptor as exchanged with the editor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// One requested breakpoint position (1-based editor line)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceBreakpoint {
    pub line: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct SetBreakpointsArguments {
    #[serde(default)]
    pub source: Source,
    #[serde(default)]
    pub breakpoints: Vec<SourceBreakpoint>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariablesArguments {
    #[serde(default)]
    pub variables_reference: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct EvaluateArguments {
    #[serde(default)]
    pub expression: String,
    /// `hover`, `watch`, `repl`, ... - unused, the lookup path is the same
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

// ============================================================
// RESPONSE / EVENT BODIES
// ============================================================

/// A breakpoint as reported back to the editor (0-based positions)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breakpoint {
    pub id: u64,
    pub verified: bool,
    pub line: u32,
    pub column: u32,
    pub source: Source,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetBreakpointsResponseBody {
    pub breakpoints: Vec<Breakpoint>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thread {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadsResponseBody {
    pub threads: Vec<Thread>,
}

/// A stack frame (0-based positions)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackFrame {
    pub id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<Source>,
    pub line: u32,
    pub column: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackTraceResponseBody {
    pub stack_frames: Vec<StackFrame>,
    pub total_frames: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scope {
    pub name: String,
    pub variables_reference: i64,
    pub expensive: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopesResponseBody {
    pub scopes: Vec<Scope>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variable {
    pub name: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub ty: Option<String>,
    pub value: String,
    pub variables_reference: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariablesResponseBody {
    pub variables: Vec<Variable>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateResponseBody {
    pub result: String,
    pub variables_reference: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoppedEventBody {
    /// `breakpoint` or `step`
    pub reason: String,
    pub thread_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_deserializes_from_tagged_json() {
        let json = r#"{"seq":1,"type":"request","command":"initialize","arguments":{"adapterID":"ghci"}}"#;
        let message: ProtocolMessage = serde_json::from_str(json).unwrap();
        match message {
            ProtocolMessage::Request(request) => {
                assert_eq!(request.seq, 1);
                assert_eq!(request.command, "initialize");
                assert!(request.arguments.is_some());
            }
            _ => panic!("Expected Request message"),
        }
    }

    #[test]
    fn test_response_omits_empty_fields() {
        let response = Response {
            seq: 2,
            request_seq: 1,
            command: "initialize".to_string(),
            success: true,
            message: None,
            body: None,
        };
        let json = serde_json::to_string(&ProtocolMessage::Response(response)).unwrap();
        assert!(!json.contains("\"message\""));
        assert!(!json.contains("\"body\""));
        assert!(json.contains("\"type\":\"response\""));
    }

    #[test]
    fn test_launch_arguments_accept_missing_fields() {
        let request = Request {
            seq: 3,
            command: "launch".to_string(),
            arguments: Some(serde_json::json!({"module": "Fib"})),
        };
        let args: LaunchRequestArguments = request.parse_arguments().unwrap();
        assert_eq!(args.module.as_deref(), Some("Fib"));
        assert_eq!(args.function, None);
        assert!(!args.stop_on_entry);
    }

    #[test]
    fn test_launch_arguments_camel_case() {
        let args: LaunchRequestArguments =
            serde_json::from_str(r#"{"stopOnEntry": true}"#).unwrap();
        assert!(args.stop_on_entry);
    }

    #[test]
    fn test_arguments_absent_means_defaults() {
        let request = Request {
            seq: 4,
            command: "configurationDone".to_string(),
            arguments: None,
        };
        let args: EvaluateArguments = request.parse_arguments().unwrap();
        assert_eq!(args.expression, "");
    }

    #[test]
    fn test_capabilities_serialize_camel_case() {
        let capabilities = Capabilities {
            supports_configuration_done_request: true,
            supports_evaluate_for_hovers: true,
        };
        let json = serde_json::to_string(&capabilities).unwrap();
        assert!(json.contains("supportsConfigurationDoneRequest"));
        assert!(json.contains("supportsEvaluateForHovers"));
    }

    #[test]
    fn test_variable_type_field_rename() {
        let variable = Variable {
            name: "x".to_string(),
            ty: Some("Int".to_string()),
            value: "1".to_string(),
            variables_reference: 0,
        };
        let json = serde_json::to_string(&variable).unwrap();
        assert!(json.contains("\"type\":\"Int\""));
        assert!(!json.contains("\"ty\""));
    }

    #[test]
    fn test_stopped_event_body_shape() {
        let body = StoppedEventBody {
            reason: "breakpoint".to_string(),
            thread_id: THREAD_ID,
        };
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(json, r#"{"reason":"breakpoint","threadId":1}"#);
    }
}
