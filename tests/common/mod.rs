#![allow(dead_code)]
//! Shared helpers for integration tests.
//!
//! Runs a minimal in-process HTTP server on a loopback socket so the
//! client's wire behavior and timing contracts can be exercised without a
//! live backend. Handlers receive the parsed request and decide the reply;
//! every request is also recorded for later assertions.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use vizinha_link::{VizinhaLinkClient, VizinhaLinkTimeouts};

/// One parsed HTTP request as the stub server saw it.
#[derive(Debug, Clone)]
pub struct ReceivedRequest {
    pub method: String,
    /// Path including the query string
    pub path: String,
    /// Header names lowercased
    pub headers: Vec<(String, String)>,
    pub body: Body,
}

/// Raw request body as the stub server received it on the wire.
///
/// Kept as bytes so `len()` reports the true wire length even for binary
/// payloads (a lossy UTF-8 String inflates invalid bytes into replacement
/// characters). `contains` offers the text view the JSON-body assertions use.
#[derive(Debug, Clone, Default)]
pub struct Body(pub Vec<u8>);

impl Body {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, needle: &str) -> bool {
        String::from_utf8_lossy(&self.0).contains(needle)
    }
}

impl ReceivedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        let name = name.to_lowercase();
        self.headers
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Path without the query string
    pub fn route(&self) -> &str {
        self.path.split('?').next().unwrap_or(&self.path)
    }

    /// Decoded query parameters in request order
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let Some(query) = self.path.split_once('?').map(|(_, q)| q) else {
            return Vec::new();
        };
        query
            .split('&')
            .filter(|part| !part.is_empty())
            .map(|part| match part.split_once('=') {
                Some((k, v)) => (percent_decode(k), percent_decode(v)),
                None => (percent_decode(part), String::new()),
            })
            .collect()
    }

    pub fn query_value(&self, name: &str) -> Option<String> {
        self.query_pairs()
            .into_iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn has_query_pair(&self, name: &str, value: &str) -> bool {
        self.query_pairs()
            .iter()
            .any(|(n, v)| n == name && v == value)
    }
}

/// Reply a handler returns for one request.
#[derive(Debug, Clone)]
pub struct StubReply {
    pub status: u16,
    pub content_type: String,
    pub body: String,
    pub extra_headers: Vec<(String, String)>,
    /// Sleep this long before answering; used to simulate a hung backend
    pub delay: Option<Duration>,
}

impl StubReply {
    pub fn json(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: "application/json".to_string(),
            body: body.into(),
            extra_headers: Vec::new(),
            delay: None,
        }
    }

    pub fn no_content() -> Self {
        Self::json(204, "")
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers.push((name.into(), value.into()));
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

type Handler = dyn Fn(&ReceivedRequest) -> StubReply + Send + Sync;

/// In-process HTTP server answering with handler-provided canned replies.
pub struct StubServer {
    pub base_url: String,
    requests: Arc<Mutex<Vec<ReceivedRequest>>>,
    handle: tokio::task::JoinHandle<()>,
}

impl StubServer {
    pub async fn start<F>(handler: F) -> Self
    where
        F: Fn(&ReceivedRequest) -> StubReply + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub server");
        let addr = listener.local_addr().expect("stub server addr");
        let requests: Arc<Mutex<Vec<ReceivedRequest>>> = Arc::new(Mutex::new(Vec::new()));

        let log = Arc::clone(&requests);
        let handler: Arc<Handler> = Arc::new(handler);
        let handle = tokio::spawn(async move {
            loop {
                let Ok((socket, _)) = listener.accept().await else {
                    break;
                };
                let handler = Arc::clone(&handler);
                let log = Arc::clone(&log);
                tokio::spawn(async move {
                    serve_connection(socket, handler, log).await;
                });
            }
        });

        Self {
            base_url: format!("http://{}", addr),
            requests,
            handle,
        }
    }

    /// Every request received so far, in arrival order
    pub fn requests(&self) -> Vec<ReceivedRequest> {
        self.requests.lock().expect("request log").clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().expect("request log").len()
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn serve_connection(
    mut socket: TcpStream,
    handler: Arc<Handler>,
    log: Arc<Mutex<Vec<ReceivedRequest>>>,
) {
    let Some(request) = read_request(&mut socket).await else {
        return;
    };
    let reply = handler(&request);
    let is_head = request.method == "HEAD";
    log.lock().expect("request log").push(request);

    if let Some(delay) = reply.delay {
        tokio::time::sleep(delay).await;
    }

    let body = if is_head || reply.status == 204 {
        ""
    } else {
        reply.body.as_str()
    };
    let mut response = format!("HTTP/1.1 {} {}\r\n", reply.status, reason_phrase(reply.status));
    if reply.status != 204 {
        response.push_str(&format!(
            "content-type: {}\r\ncontent-length: {}\r\n",
            reply.content_type,
            body.len()
        ));
    }
    response.push_str("connection: close\r\n");
    for (name, value) in &reply.extra_headers {
        response.push_str(name);
        response.push_str(": ");
        response.push_str(value);
        response.push_str("\r\n");
    }
    response.push_str("\r\n");
    response.push_str(body);

    let _ = socket.write_all(response.as_bytes()).await;
    let _ = socket.shutdown().await;
}

async fn read_request(socket: &mut TcpStream) -> Option<ReceivedRequest> {
    let mut buffer: Vec<u8> = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        if let Some(pos) = find_header_end(&buffer) {
            break pos;
        }
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buffer.extend_from_slice(&chunk[..n]);
        if buffer.len() > (1 << 20) {
            return None;
        }
    };

    let header_text = String::from_utf8_lossy(&buffer[..header_end]).to_string();
    let mut lines = header_text.split("\r\n");
    let request_line = lines.next()?;
    let mut parts = request_line.split_whitespace();
    let method = parts.next()?.to_string();
    let path = parts.next()?.to_string();

    let mut headers = Vec::new();
    let mut content_length = 0usize;
    for line in lines {
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim().to_lowercase();
            let value = value.trim().to_string();
            if name == "content-length" {
                content_length = value.parse().unwrap_or(0);
            }
            headers.push((name, value));
        }
    }

    let body_start = (header_end + 4).min(buffer.len());
    let mut body_bytes = buffer[body_start..].to_vec();
    while body_bytes.len() < content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        body_bytes.extend_from_slice(&chunk[..n]);
    }

    Some(ReceivedRequest {
        method,
        path,
        headers,
        body: Body(body_bytes),
    })
}

fn find_header_end(buffer: &[u8]) -> Option<usize> {
    buffer.windows(4).position(|window| window == b"\r\n\r\n")
}

fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        206 => "Partial Content",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}

/// Decode percent-escapes and `+` in a query component.
fn percent_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' if i + 2 < bytes.len() => {
                let decoded = std::str::from_utf8(&bytes[i + 1..i + 3])
                    .ok()
                    .and_then(|hex| u8::from_str_radix(hex, 16).ok());
                match decoded {
                    Some(byte) => {
                        out.push(byte);
                        i += 3;
                    }
                    None => {
                        out.push(b'%');
                        i += 1;
                    }
                }
            }
            other => {
                out.push(other);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).to_string()
}

/// Timeouts tightened so timing-contract tests finish quickly.
pub fn test_timeouts() -> VizinhaLinkTimeouts {
    VizinhaLinkTimeouts::builder()
        .connection_timeout(Duration::from_secs(1))
        .request_timeout(Duration::from_secs(2))
        .session_timeout(Duration::from_millis(300))
        .sign_in_timeout(Duration::from_secs(2))
        .load_user_timeout(Duration::from_millis(300))
        .bootstrap_delay(Duration::ZERO)
        .build()
}

/// Client wired to a stub server with test timeouts.
pub fn client_for(server: &StubServer) -> VizinhaLinkClient {
    VizinhaLinkClient::builder()
        .base_url(server.base_url.clone())
        .api_key("test-anon-key")
        .timeouts(test_timeouts())
        .build()
        .expect("build test client")
}

/// A base URL nothing is listening on (connection refused).
pub async fn unreachable_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind throwaway listener");
    let addr = listener.local_addr().expect("throwaway addr");
    drop(listener);
    format!("http://{}", addr)
}
