//! DAP wire transport (adapter side)
//!
//! Handles the framing layer of the protocol:
//! - Content-Length headers per DAP spec, both directions
//! - Sequence number generation for outgoing responses and events
//!
//! Unlike a client transport there is no request/response correlation here:
//! the adapter only ever answers requests it just read, so the transport is
//! a shared writer plus a free-standing frame reader the dispatch loop owns.

use crate::error::{Error, Result};
use crate::protocol::{Event, ProtocolMessage, Request, Response};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::Mutex;
use tracing::{trace, warn};

/// Outgoing half of a DAP connection.
///
/// Cheap to clone via `Arc`; every spawned request handler and the event
/// pump write through the same sequence counter and writer lock.
pub struct DapWriter {
    next_seq: Mutex<i64>,
    writer: Mutex<Box<dyn AsyncWrite + Send + Unpin>>,
}

impl DapWriter {
    pub fn new<W>(writer: W) -> Arc<Self>
    where
        W: AsyncWrite + Send + Unpin + 'static,
    {
        Arc::new(DapWriter {
            next_seq: Mutex::new(1),
            writer: Mutex::new(Box::new(writer)),
        })
    }

    /// Get the next outgoing sequence number.
    pub async fn next_sequence(&self) -> i64 {
        let mut seq = self.next_seq.lock().await;
        let current = *seq;
        *seq += 1;
        current
    }

    /// Answer a request successfully, with an optional body.
    pub async fn respond_success(
        &self,
        request: &Request,
        body: Option<serde_json::Value>,
    ) -> Result<()> {
        let response = Response {
            seq: self.next_sequence().await,
            request_seq: request.seq,
            command: request.command.clone(),
            success: true,
            message: None,
            body,
        };
        self.send_message(ProtocolMessage::Response(response)).await
    }

    /// Answer a request with a failure and a user-facing message.
    pub async fn respond_error(&self, request: &Request, message: impl Into<String>) -> Result<()> {
        let message = message.into();
        warn!(command = %request.command, "Request failed: {}", message);
        let response = Response {
            seq: self.next_sequence().await,
            request_seq: request.seq,
            command: request.command.clone(),
            success: false,
            message: Some(message),
            body: None,
        };
        self.send_message(ProtocolMessage::Response(response)).await
    }

    /// Emit an event toward the editor.
    pub async fn send_event(&self, event: &str, body: Option<serde_json::Value>) -> Result<()> {
        let event = Event {
            seq: self.next_sequence().await,
            event: event.to_string(),
            body,
        };
        self.send_message(ProtocolMessage::Event(event)).await
    }

    /// Frame and write one message (Content-Length header + JSON payload).
    async fn send_message(&self, message: ProtocolMessage) -> Result<()> {
        let json = serde_json::to_string(&message)?;
        let framed = format!("Content-Length: {}\r\n\r\n{}", json.len(), json);

        let mut writer = self.writer.lock().await;
        writer.write_all(framed.as_bytes()).await?;
        writer.flush().await?;

        trace!("Sent message: {}", json);
        Ok(())
    }
}

/// Read a single framed message from the editor.
///
/// Returns `Ok(None)` on a clean EOF before any header byte. Unknown
/// headers are ignored; a frame without Content-Length is a protocol error.
pub async fn read_message<R>(reader: &mut BufReader<R>) -> Result<Option<ProtocolMessage>>
where
    R: AsyncRead + Unpin,
{
    let mut content_length: Option<usize> = None;
    let mut line = String::new();

    loop {
        line.clear();
        let bytes_read = reader.read_line(&mut line).await?;
        if bytes_read == 0 {
            // EOF between messages is an orderly disconnect; mid-headers it
            // still just means the editor went away.
            return Ok(None);
        }

        let header = line.trim();
        if header.is_empty() {
            break;
        }
        if let Some(value) = header.strip_prefix("Content-Length:") {
            let value = value.trim();
            content_length = Some(value.parse().map_err(|_| {
                Error::InvalidMessage(format!("invalid Content-Length: {}", value))
            })?);
        }
    }

    let length = content_length
        .ok_or_else(|| Error::InvalidMessage("missing Content-Length header".to_string()))?;

    let mut payload = vec![0u8; length];
    reader.read_exact(&mut payload).await?;
    let payload = String::from_utf8(payload)
        .map_err(|e| Error::InvalidMessage(format!("invalid UTF-8 payload: {}", e)))?;

    trace!("Received message: {}", payload);
    Ok(Some(serde_json::from_str(&payload)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::events;

    fn frame(json: &str) -> String {
        format!("Content-Length: {}\r\n\r\n{}", json.len(), json)
    }

    #[tokio::test]
    async fn test_read_request_frame() {
        let json = r#"{"seq":1,"type":"request","command":"initialize"}"#;
        let mut reader = BufReader::new(std::io::Cursor::new(frame(json).into_bytes()));
        let message = read_message(&mut reader).await.unwrap().unwrap();
        match message {
            ProtocolMessage::Request(request) => {
                assert_eq!(request.seq, 1);
                assert_eq!(request.command, "initialize");
            }
            _ => panic!("Expected Request message"),
        }
    }

    #[tokio::test]
    async fn test_read_eof_is_none() {
        let mut reader = BufReader::new(std::io::Cursor::new(Vec::new()));
        assert!(read_message(&mut reader).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_read_missing_content_length_is_error() {
        let mut reader = BufReader::new(std::io::Cursor::new(b"X-Custom: 1\r\n\r\n{}".to_vec()));
        let err = read_message(&mut reader).await.unwrap_err();
        assert!(matches!(err, Error::InvalidMessage(_)));
    }

    #[tokio::test]
    async fn test_read_skips_unknown_headers() {
        let json = r#"{"seq":7,"type":"request","command":"threads"}"#;
        let framed = format!(
            "Content-Length: {}\r\nUser-Agent: editor\r\n\r\n{}",
            json.len(),
            json
        );
        let mut reader = BufReader::new(std::io::Cursor::new(framed.into_bytes()));
        let message = read_message(&mut reader).await.unwrap().unwrap();
        assert!(matches!(message, ProtocolMessage::Request(_)));
    }

    #[tokio::test]
    async fn test_writer_assigns_increasing_sequence_numbers() {
        let (client, server) = tokio::io::duplex(4096);
        let writer = DapWriter::new(client);

        writer.send_event(events::INITIALIZED, None).await.unwrap();
        writer.send_event(events::TERMINATED, None).await.unwrap();

        let mut reader = BufReader::new(server);
        let first = read_message(&mut reader).await.unwrap().unwrap();
        let second = read_message(&mut reader).await.unwrap().unwrap();

        match (first, second) {
            (ProtocolMessage::Event(a), ProtocolMessage::Event(b)) => {
                assert_eq!(a.event, "initialized");
                assert_eq!(b.event, "terminated");
                assert!(b.seq > a.seq);
            }
            _ => panic!("Expected two events"),
        }
    }

    #[tokio::test]
    async fn test_respond_roundtrip() {
        let (client, server) = tokio::io::duplex(4096);
        let writer = DapWriter::new(client);

        let request = Request {
            seq: 42,
            command: "threads".to_string(),
            arguments: None,
        };
        writer
            .respond_success(&request, Some(serde_json::json!({"threads": []})))
            .await
            .unwrap();

        let mut reader = BufReader::new(server);
        let message = read_message(&mut reader).await.unwrap().unwrap();
        match message {
            ProtocolMessage::Response(response) => {
                assert_eq!(response.request_seq, 42);
                assert_eq!(response.command, "threads");
                assert!(response.success);
            }
            _ => panic!("Expected Response message"),
        }
    }

    #[tokio::test]
    async fn test_respond_error_carries_message() {
        let (client, server) = tokio::io::duplex(4096);
        let writer = DapWriter::new(client);

        let request = Request {
            seq: 9,
            command: "launch".to_string(),
            arguments: None,
        };
        writer
            .respond_error(&request, "Cannot find a module to debug")
            .await
            .unwrap();

        let mut reader = BufReader::new(server);
        let ProtocolMessage::Response(response) = read_message(&mut reader).await.unwrap().unwrap()
        else {
            panic!("Expected Response message");
        };
        assert!(!response.success);
        assert_eq!(
            response.message.as_deref(),
            Some("Cannot find a module to debug")
        );
    }
}
