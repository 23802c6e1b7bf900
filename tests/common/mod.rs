//! Common test utilities: scripted transport, recording sink and a canned
//! HTTP fixture server.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

use pulsecheck::probe::{
    classify_message, HopResponse, ProbeResult, ProbeTransport, ResultSink, TransportError,
};

/// One scripted reply for a URL
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    Respond {
        status: u16,
        headers: Vec<(String, String)>,
        body: Vec<u8>,
    },
    /// Fail with an error classified from this message
    Fail(String),
    /// Sleep past any reasonable deadline, then answer 200
    Hang(Duration),
}

impl ScriptedReply {
    pub fn status(status: u16) -> Self {
        ScriptedReply::Respond {
            status,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    pub fn body(status: u16, body: &[u8]) -> Self {
        ScriptedReply::Respond {
            status,
            headers: Vec::new(),
            body: body.to_vec(),
        }
    }

    pub fn redirect(status: u16, location: &str) -> Self {
        ScriptedReply::Respond {
            status,
            headers: vec![("location".to_string(), location.to_string())],
            body: Vec::new(),
        }
    }
}

/// In-memory transport answering from a fixed URL → reply table
pub struct ScriptedTransport {
    replies: HashMap<String, ScriptedReply>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl ScriptedTransport {
    pub fn new(routes: Vec<(&str, ScriptedReply)>) -> Self {
        Self {
            replies: routes
                .into_iter()
                .map(|(url, reply)| (url.to_string(), reply))
                .collect(),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Shared handle to the fetched-URL log, usable after the transport is
    /// boxed into a prober
    pub fn call_log(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.calls)
    }
}

#[async_trait::async_trait]
impl ProbeTransport for ScriptedTransport {
    async fn fetch(&self, url: &str) -> Result<HopResponse, TransportError> {
        self.calls.lock().unwrap().push(url.to_string());
        match self.replies.get(url) {
            Some(ScriptedReply::Respond {
                status,
                headers,
                body,
            }) => Ok(HopResponse {
                status: *status,
                headers: headers.clone(),
                body: body.clone(),
            }),
            Some(ScriptedReply::Fail(message)) => Err(classify_message(message)),
            Some(ScriptedReply::Hang(delay)) => {
                tokio::time::sleep(*delay).await;
                Ok(HopResponse {
                    status: 200,
                    headers: Vec::new(),
                    body: Vec::new(),
                })
            }
            None => Err(TransportError::Other(format!(
                "no scripted reply for {url}"
            ))),
        }
    }
}

/// Sink that retains every emitted result for later assertions
#[derive(Clone, Default)]
pub struct RecordingSink {
    results: Arc<Mutex<Vec<ProbeResult>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared handle to the recorded results
    pub fn results(&self) -> Arc<Mutex<Vec<ProbeResult>>> {
        Arc::clone(&self.results)
    }
}

impl ResultSink for RecordingSink {
    fn emit(&mut self, result: &ProbeResult) {
        self.results.lock().unwrap().push(result.clone());
    }
}

/// Numeric codes of the recorded results, in emission order
pub fn recorded_codes(results: &Arc<Mutex<Vec<ProbeResult>>>) -> Vec<i32> {
    results
        .lock()
        .unwrap()
        .iter()
        .map(|result| result.code.code())
        .collect()
}

/// One request the fixture server saw
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    /// Lowercased header names
    pub headers: Vec<(String, String)>,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Canned response served by the fixture server
#[derive(Debug, Clone)]
pub struct CannedResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    /// Sleep before writing anything
    pub delay: Option<Duration>,
    /// Sleep between the header block and the body bytes
    pub body_delay: Option<Duration>,
}

impl CannedResponse {
    pub fn ok(body: &[u8]) -> Self {
        Self {
            status: 200,
            headers: Vec::new(),
            body: body.to_vec(),
            delay: None,
            body_delay: None,
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Vec::new(),
            delay: None,
            body_delay: None,
        }
    }

    pub fn redirect(status: u16, location: &str) -> Self {
        Self {
            status,
            headers: vec![("location".to_string(), location.to_string())],
            body: Vec::new(),
            delay: None,
            body_delay: None,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn body_delayed(mut self, delay: Duration) -> Self {
        self.body_delay = Some(delay);
        self
    }
}

/// Minimal HTTP/1.1 server over a tokio listener, one canned response per
/// path, every request recorded.
pub struct TestServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    handle: JoinHandle<()>,
}

impl TestServer {
    pub async fn start(routes: Vec<(&str, CannedResponse)>) -> Self {
        let routes: Arc<HashMap<String, CannedResponse>> = Arc::new(
            routes
                .into_iter()
                .map(|(path, response)| (path.to_string(), response))
                .collect(),
        );
        let requests: Arc<Mutex<Vec<RecordedRequest>>> = Arc::new(Mutex::new(Vec::new()));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind fixture server");
        let addr = listener.local_addr().expect("fixture server has no addr");

        let accept_routes = Arc::clone(&routes);
        let accept_requests = Arc::clone(&requests);
        let handle = tokio::spawn(async move {
            loop {
                let (socket, _) = match listener.accept().await {
                    Ok(accepted) => accepted,
                    Err(_) => return,
                };
                let routes = Arc::clone(&accept_routes);
                let requests = Arc::clone(&accept_requests);
                // Serve concurrently so a delayed response never blocks the
                // next probe's connection
                tokio::spawn(async move {
                    serve_connection(socket, routes, requests).await;
                });
            }
        });

        Self {
            addr,
            requests,
            handle,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn serve_connection(
    mut socket: TcpStream,
    routes: Arc<HashMap<String, CannedResponse>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|window| window == b"\r\n\r\n") {
        match socket.read(&mut chunk).await {
            Ok(0) => return,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
            Err(_) => return,
        }
        if buf.len() > 64 * 1024 {
            return;
        }
    }

    let head = String::from_utf8_lossy(&buf).into_owned();
    let mut lines = head.lines();
    let request_line = match lines.next() {
        Some(line) => line,
        None => return,
    };
    let path = request_line
        .split_whitespace()
        .nth(1)
        .unwrap_or("/")
        .to_string();
    let mut headers = Vec::new();
    for line in lines {
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            headers.push((name.trim().to_lowercase(), value.trim().to_string()));
        }
    }
    requests.lock().unwrap().push(RecordedRequest {
        path: path.clone(),
        headers,
    });

    let fallback = CannedResponse::status(404);
    let response = routes.get(&path).unwrap_or(&fallback);
    if let Some(delay) = response.delay {
        tokio::time::sleep(delay).await;
    }

    let mut head = format!(
        "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n",
        response.status,
        reason(response.status),
        response.body.len()
    );
    for (name, value) in &response.headers {
        head.push_str(&format!("{}: {}\r\n", name, value));
    }
    head.push_str("\r\n");

    if socket.write_all(head.as_bytes()).await.is_err() {
        return;
    }
    if let Some(delay) = response.body_delay {
        tokio::time::sleep(delay).await;
    }
    let _ = socket.write_all(&response.body).await;
    let _ = socket.shutdown().await;
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        204 => "No Content",
        301 => "Moved Permanently",
        302 => "Found",
        303 => "See Other",
        307 => "Temporary Redirect",
        308 => "Permanent Redirect",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "",
    }
}
