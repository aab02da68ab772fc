//! End-to-end adapter flow over an in-memory transport
//!
//! Drives `serve` the way an editor would: framed requests in, framed
//! responses and events out, with a scripted interpreter behind it.

use hadex_config::SessionConfig;
use hadex_dap::protocol::{ProtocolMessage, Request};
use hadex_dap::transport::read_message;
use hadex_testing::mocks::ScriptedGhci;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncWriteExt, BufReader, DuplexStream, ReadHalf, WriteHalf};

struct EditorEnd {
    reader: BufReader<ReadHalf<DuplexStream>>,
    writer: WriteHalf<DuplexStream>,
    next_seq: i64,
}

impl EditorEnd {
    async fn send(&mut self, command: &str, arguments: Option<serde_json::Value>) {
        let request = Request {
            seq: self.next_seq,
            command: command.to_string(),
            arguments,
        };
        self.next_seq += 1;
        let json = serde_json::to_string(&ProtocolMessage::Request(request)).unwrap();
        let framed = format!("Content-Length: {}\r\n\r\n{}", json.len(), json);
        self.writer.write_all(framed.as_bytes()).await.unwrap();
        self.writer.flush().await.unwrap();
    }

    /// Read the next framed message, bounded so a missing message fails the
    /// test instead of hanging it.
    async fn recv(&mut self) -> ProtocolMessage {
        tokio::time::timeout(Duration::from_secs(5), read_message(&mut self.reader))
            .await
            .expect("timed out waiting for a message")
            .expect("transport error")
            .expect("adapter closed the connection")
    }

    /// Read messages until the response for `command` arrives; events seen
    /// along the way are returned too.
    async fn recv_until_response(
        &mut self,
        command: &str,
    ) -> (hadex_dap::protocol::Response, Vec<hadex_dap::protocol::Event>) {
        let mut events = Vec::new();
        loop {
            match self.recv().await {
                ProtocolMessage::Response(response) if response.command == command => {
                    return (response, events)
                }
                ProtocolMessage::Event(event) => events.push(event),
                other => panic!("unexpected message: {:?}", other),
            }
        }
    }

    /// Read messages until an event with the given name arrives.
    async fn recv_event(&mut self, name: &str) -> hadex_dap::protocol::Event {
        loop {
            match self.recv().await {
                ProtocolMessage::Event(event) if event.event == name => return event,
                ProtocolMessage::Event(_) => continue,
                other => panic!("unexpected message while waiting for event: {:?}", other),
            }
        }
    }
}

fn scripted_interpreter() -> ScriptedGhci {
    ScriptedGhci::new()
        .with_reply(":break Foo 3", &["Breakpoint 0 activated at Foo.hs:7:1-10"])
        .with_reply(":break Foo 7", &["Breakpoint 1 activated at Foo.hs:10:1-5"])
        .with_reply(":load Main", &["Ok, one module loaded."])
        .with_reply(
            "main",
            &["Stopped in Main.f, Foo.hs:7:1", "x :: Int = 1"],
        )
        .with_reply(":continue", &["all done"])
}

async fn start_adapter(ghci: Arc<ScriptedGhci>) -> (EditorEnd, tokio::task::JoinHandle<()>) {
    let (editor_stream, adapter_stream) = tokio::io::duplex(64 * 1024);
    let (editor_read, editor_write) = tokio::io::split(editor_stream);
    let (adapter_read, adapter_write) = tokio::io::split(adapter_stream);

    let server = tokio::spawn(async move {
        hadex_dap::serve(adapter_read, adapter_write, ghci, SessionConfig::default())
            .await
            .expect("serve failed");
    });

    (
        EditorEnd {
            reader: BufReader::new(editor_read),
            writer: editor_write,
            next_seq: 1,
        },
        server,
    )
}

#[tokio::test]
async fn test_full_debug_session_flow() {
    hadex_logging::init_test();
    let ghci = Arc::new(scripted_interpreter());
    let (mut editor, server) = start_adapter(ghci.clone()).await;

    // initialize: capabilities come back in the response body
    editor
        .send("initialize", Some(serde_json::json!({"adapterID": "ghci"})))
        .await;
    let (response, _) = editor.recv_until_response("initialize").await;
    assert!(response.success);
    let body = response.body.unwrap();
    assert_eq!(body["supportsConfigurationDoneRequest"], true);
    assert_eq!(body["supportsEvaluateForHovers"], true);

    // setBreakpoints on lines [3, 7]: confirmations place them at 7:1 and
    // 10:1, reported 0-based as lines 6 and 9
    editor
        .send(
            "setBreakpoints",
            Some(serde_json::json!({
                "source": {"name": "Foo.hs", "path": "/src/Foo.hs"},
                "breakpoints": [{"line": 3}, {"line": 7}],
            })),
        )
        .await;
    let (response, _) = editor.recv_until_response("setBreakpoints").await;
    assert!(response.success);
    let breakpoints = &response.body.unwrap()["breakpoints"];
    assert_eq!(breakpoints[0]["id"], 0);
    assert_eq!(breakpoints[0]["verified"], true);
    assert_eq!(breakpoints[0]["line"], 6);
    assert_eq!(breakpoints[1]["id"], 1);
    assert_eq!(breakpoints[1]["verified"], true);
    assert_eq!(breakpoints[1]["line"], 9);

    // configurationDone before launch, so the launch never waits
    editor.send("configurationDone", None).await;
    let (response, _) = editor.recv_until_response("configurationDone").await;
    assert!(response.success);

    // launch: response, initialized event, then a breakpoint stop (7:1
    // matches the first confirmed breakpoint exactly)
    editor
        .send("launch", Some(serde_json::json!({"module": "Main", "function": "main"})))
        .await;
    let (response, events) = editor.recv_until_response("launch").await;
    assert!(response.success);
    let mut seen_initialized = events.iter().any(|e| e.event == "initialized");
    let mut stopped_body = events
        .iter()
        .find(|e| e.event == "stopped")
        .and_then(|e| e.body.clone());
    while !seen_initialized || stopped_body.is_none() {
        match editor.recv().await {
            ProtocolMessage::Event(event) if event.event == "initialized" => {
                seen_initialized = true;
            }
            ProtocolMessage::Event(event) if event.event == "stopped" => {
                stopped_body = event.body;
            }
            other => panic!("unexpected message after launch: {:?}", other),
        }
    }
    let stopped_body = stopped_body.unwrap();
    assert_eq!(stopped_body["reason"], "breakpoint");
    assert_eq!(stopped_body["threadId"], 1);

    // threads: the single default thread
    editor.send("threads", None).await;
    let (response, _) = editor.recv_until_response("threads").await;
    assert_eq!(response.body.unwrap()["threads"][0]["name"], "default");

    // stackTrace: one frame, unqualified name, 0-based position
    editor
        .send("stackTrace", Some(serde_json::json!({"threadId": 1})))
        .await;
    let (response, _) = editor.recv_until_response("stackTrace").await;
    let body = response.body.unwrap();
    assert_eq!(body["totalFrames"], 1);
    assert_eq!(body["stackFrames"][0]["name"], "f");
    assert_eq!(body["stackFrames"][0]["line"], 6);
    assert_eq!(body["stackFrames"][0]["column"], 0);
    assert_eq!(body["stackFrames"][0]["source"]["name"], "Foo.hs");

    // scopes and variables: one Local scope, the parsed binding
    editor
        .send("scopes", Some(serde_json::json!({"frameId": 0})))
        .await;
    let (response, _) = editor.recv_until_response("scopes").await;
    assert_eq!(response.body.unwrap()["scopes"][0]["name"], "Local");

    editor
        .send("variables", Some(serde_json::json!({"variablesReference": 1})))
        .await;
    let (response, _) = editor.recv_until_response("variables").await;
    let body = response.body.unwrap();
    assert_eq!(body["variables"][0]["name"], "x");
    assert_eq!(body["variables"][0]["type"], "Int");
    assert_eq!(body["variables"][0]["value"], "1");

    // evaluate a known binding: answered from state
    editor
        .send("evaluate", Some(serde_json::json!({"expression": "x"})))
        .await;
    let (response, _) = editor.recv_until_response("evaluate").await;
    assert_eq!(response.body.unwrap()["result"], "1");

    // continue: the program runs to completion and terminates
    editor
        .send("continue", Some(serde_json::json!({"threadId": 1})))
        .await;
    let (response, events) = editor.recv_until_response("continue").await;
    assert!(response.success);
    if !events.iter().any(|e| e.event == "terminated") {
        editor.recv_event("terminated").await;
    }

    // stepping after termination is rejected, not resent to a dead process
    editor
        .send("next", Some(serde_json::json!({"threadId": 1})))
        .await;
    let (response, _) = editor.recv_until_response("next").await;
    assert!(!response.success);
    assert_eq!(response.message.as_deref(), Some("Debug session has ended"));

    // disconnect tears the interpreter down
    editor.send("disconnect", None).await;
    let (response, _) = editor.recv_until_response("disconnect").await;
    assert!(response.success);

    server.await.unwrap();
    assert!(ghci.was_shutdown());

    // The exact command vocabulary, in order
    let sent = ghci.sent().await;
    assert_eq!(
        sent,
        vec![
            ":delete *",
            ":break Foo 3",
            ":break Foo 7",
            ":load Main",
            "main",
            ":continue",
        ]
    );
}

#[tokio::test]
async fn test_launch_without_module_fails_before_session_work() {
    let ghci = Arc::new(ScriptedGhci::new());
    let (mut editor, server) = start_adapter(ghci.clone()).await;

    editor.send("initialize", None).await;
    editor.recv_until_response("initialize").await;

    editor
        .send("launch", Some(serde_json::json!({"module": ""})))
        .await;
    let (response, _) = editor.recv_until_response("launch").await;
    assert!(!response.success);
    assert_eq!(
        response.message.as_deref(),
        Some("Cannot find a module to debug")
    );
    // Nothing was sent to the interpreter
    assert!(ghci.sent().await.is_empty());

    editor.send("disconnect", None).await;
    editor.recv_until_response("disconnect").await;
    server.await.unwrap();
}

#[tokio::test]
async fn test_unknown_request_is_rejected() {
    let ghci = Arc::new(ScriptedGhci::new());
    let (mut editor, server) = start_adapter(ghci).await;

    editor.send("restartFrame", None).await;
    let (response, _) = editor.recv_until_response("restartFrame").await;
    assert!(!response.success);
    assert!(response.message.unwrap().contains("Unsupported request"));

    editor.send("disconnect", None).await;
    editor.recv_until_response("disconnect").await;
    server.await.unwrap();
}
