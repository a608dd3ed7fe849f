//! Test-run report sink.
//!
//! During a live run, an external runner integration fires one event per
//! example (start, then pass/fail/skip) plus a final finish. Events travel
//! as `Content-Length: <n>\r\n\r\n<json>` frames over a TCP connection to
//! `127.0.0.1:$SPEX_REPORTER_PORT`, keyed by the same ids structure
//! discovery produces.
//!
//! Reporting is strictly best effort: when the port is unset the sink is a
//! no-op, and a dropped connection disables the sink mid-run instead of
//! failing the tests being reported on.

use std::io::{self, BufRead, Read, Write};
use std::net::TcpStream;

use serde_json::{Value, json};

/// Environment variable announcing the report listener's TCP port.
pub const REPORTER_PORT_ENV: &str = "SPEX_REPORTER_PORT";

// ---------------------------------------------------------------------------
// Sink trait and implementations
// ---------------------------------------------------------------------------

/// Receiver for test-run events.
pub trait ReportSink {
    fn start_test(&mut self, id: &str, uri: &str, line: Option<usize>);
    fn record_pass(&mut self, id: &str, uri: &str);
    fn record_fail(&mut self, id: &str, uri: &str, message: &str);
    fn record_skip(&mut self, id: &str, uri: &str);
    fn shutdown(&mut self);
}

/// Sink used when no listener is configured.
pub struct NullSink;

impl ReportSink for NullSink {
    fn start_test(&mut self, _id: &str, _uri: &str, _line: Option<usize>) {}
    fn record_pass(&mut self, _id: &str, _uri: &str) {}
    fn record_fail(&mut self, _id: &str, _uri: &str, _message: &str) {}
    fn record_skip(&mut self, _id: &str, _uri: &str) {}
    fn shutdown(&mut self) {}
}

/// Sink that frames events onto a TCP connection.
pub struct SocketReporter {
    stream: Option<TcpStream>,
}

impl SocketReporter {
    /// Connect to a listener on localhost.
    pub fn connect(port: u16) -> io::Result<Self> {
        let stream = TcpStream::connect(("127.0.0.1", port))?;
        Ok(Self {
            stream: Some(stream),
        })
    }

    fn send(&mut self, event: &Value) {
        if let Some(stream) = self.stream.as_mut()
            && write_frame(stream, event).is_err()
        {
            // The listener went away; keep the run alive, stop reporting.
            self.stream = None;
        }
    }
}

impl ReportSink for SocketReporter {
    fn start_test(&mut self, id: &str, uri: &str, line: Option<usize>) {
        let mut params = json!({ "id": id, "uri": uri });
        if let Some(line) = line {
            params["line"] = line.into();
        }
        self.send(&json!({ "method": "start", "params": params }));
    }

    fn record_pass(&mut self, id: &str, uri: &str) {
        self.send(&json!({ "method": "pass", "params": { "id": id, "uri": uri } }));
    }

    fn record_fail(&mut self, id: &str, uri: &str, message: &str) {
        self.send(&json!({
            "method": "fail",
            "params": { "id": id, "uri": uri, "message": message }
        }));
    }

    fn record_skip(&mut self, id: &str, uri: &str) {
        self.send(&json!({ "method": "skip", "params": { "id": id, "uri": uri } }));
    }

    fn shutdown(&mut self) {
        self.send(&json!({ "method": "finish", "params": {} }));
        self.stream = None;
    }
}

/// The sink implied by the environment: a socket reporter when
/// `SPEX_REPORTER_PORT` names a reachable listener, a no-op otherwise.
pub fn from_env() -> Box<dyn ReportSink> {
    let port = std::env::var(REPORTER_PORT_ENV)
        .ok()
        .and_then(|value| value.parse::<u16>().ok());
    match port {
        Some(port) => match SocketReporter::connect(port) {
            Ok(reporter) => Box::new(reporter),
            Err(_) => Box::new(NullSink),
        },
        None => Box::new(NullSink),
    }
}

// ---------------------------------------------------------------------------
// Wire framing
// ---------------------------------------------------------------------------

/// Write one `Content-Length`-framed JSON message.
pub fn write_frame<W: Write>(writer: &mut W, payload: &Value) -> io::Result<()> {
    let body = serde_json::to_string(payload).map_err(io::Error::other)?;
    write!(writer, "Content-Length: {}\r\n\r\n{}", body.len(), body)?;
    writer.flush()
}

/// Read one framed JSON message; `Ok(None)` at a clean end of stream.
pub fn read_frame<R: BufRead>(reader: &mut R) -> io::Result<Option<Value>> {
    let mut content_length: Option<usize> = None;
    loop {
        let mut line = String::new();
        let read = reader.read_line(&mut line)?;
        if read == 0 {
            return match content_length {
                None => Ok(None),
                Some(_) => Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "stream ended inside a frame header",
                )),
            };
        }
        let line = line.trim_end_matches(['\r', '\n']);
        if line.is_empty() {
            if content_length.is_some() {
                break;
            }
            continue;
        }
        if let Some(value) = line.strip_prefix("Content-Length:") {
            content_length = Some(value.trim().parse().map_err(io::Error::other)?);
        }
    }
    let length = content_length.ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidData, "frame without Content-Length")
    })?;
    let mut body = vec![0u8; length];
    reader.read_exact(&mut body)?;
    serde_json::from_slice(&body)
        .map(Some)
        .map_err(io::Error::other)
}

// ---------------------------------------------------------------------------
// Stdin bridging
// ---------------------------------------------------------------------------

/// Forward newline-delimited events into a sink.
///
/// Each input line is one `{ "method": ..., "params": { ... } }` object,
/// the unframed form of the wire events. Blank lines, unparseable lines
/// and unknown methods are skipped; malformed input never aborts the
/// bridge. Returns the number of events forwarded.
pub fn bridge_events<R: BufRead>(input: R, sink: &mut dyn ReportSink) -> io::Result<usize> {
    let mut forwarded = 0;
    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let Ok(event) = serde_json::from_str::<Value>(&line) else {
            continue;
        };
        let method = event.get("method").and_then(Value::as_str).unwrap_or("");
        let params = event.get("params").cloned().unwrap_or_else(|| json!({}));
        let id = params.get("id").and_then(Value::as_str).unwrap_or("");
        let uri = params.get("uri").and_then(Value::as_str).unwrap_or("");
        match method {
            "start" => {
                let line_number = params
                    .get("line")
                    .and_then(Value::as_u64)
                    .map(|n| n as usize);
                sink.start_test(id, uri, line_number);
            }
            "pass" => sink.record_pass(id, uri),
            "fail" => {
                let message = params.get("message").and_then(Value::as_str).unwrap_or("");
                sink.record_fail(id, uri, message);
            }
            "skip" => sink.record_skip(id, uri),
            "finish" => sink.shutdown(),
            _ => continue,
        }
        forwarded += 1;
    }
    Ok(forwarded)
}
