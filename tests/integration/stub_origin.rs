// Minimal HTTP/1.1 origin used by the integration tests
//
// Accepts connections on an ephemeral local port, records each request head
// and answers with a fixed response, closing the connection afterwards.

use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub request_line: String,
    pub headers: Vec<(String, String)>,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn header_count(&self, name: &str) -> usize {
        self.headers
            .iter()
            .filter(|(n, _)| n.eq_ignore_ascii_case(name))
            .count()
    }
}

#[derive(Debug, Clone)]
pub struct StubResponse {
    pub status_line: &'static str,
    pub headers: Vec<(&'static str, &'static str)>,
    pub body: &'static [u8],
    /// Sleep before answering, to provoke client timeouts
    pub delay: Option<Duration>,
}

impl StubResponse {
    pub fn avif(body: &'static [u8]) -> Self {
        Self {
            status_line: "HTTP/1.1 200 OK",
            headers: vec![
                ("Content-Type", "image/avif"),
                ("Cache-Control", "private, max-age=60"),
                ("ETag", "\"v1\""),
            ],
            body,
            delay: None,
        }
    }
}

pub struct StubOrigin {
    pub base_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl StubOrigin {
    pub async fn start(response: StubResponse) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = requests.clone();

        tokio::spawn(async move {
            loop {
                let Ok((mut stream, _)) = listener.accept().await else {
                    return;
                };
                let recorded = recorded.clone();
                let response = response.clone();
                tokio::spawn(async move {
                    let mut buf = Vec::new();
                    let mut chunk = [0u8; 1024];
                    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                        match stream.read(&mut chunk).await {
                            Ok(0) | Err(_) => return,
                            Ok(n) => buf.extend_from_slice(&chunk[..n]),
                        }
                    }
                    recorded.lock().unwrap().push(parse_head(&buf));

                    if let Some(delay) = response.delay {
                        tokio::time::sleep(delay).await;
                    }

                    let mut out = format!("{}\r\n", response.status_line);
                    for (name, value) in &response.headers {
                        out.push_str(&format!("{}: {}\r\n", name, value));
                    }
                    out.push_str(&format!(
                        "Content-Length: {}\r\nConnection: close\r\n\r\n",
                        response.body.len()
                    ));
                    let _ = stream.write_all(out.as_bytes()).await;
                    let _ = stream.write_all(response.body).await;
                    let _ = stream.shutdown().await;
                });
            }
        });

        Self {
            base_url: format!("http://{}", addr),
            requests,
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

fn parse_head(buf: &[u8]) -> RecordedRequest {
    let text = String::from_utf8_lossy(buf);
    let mut lines = text.split("\r\n");
    let request_line = lines.next().unwrap_or_default().to_string();
    let headers = lines
        .take_while(|line| !line.is_empty())
        .filter_map(|line| {
            line.split_once(':')
                .map(|(n, v)| (n.trim().to_lowercase(), v.trim().to_string()))
        })
        .collect();
    RecordedRequest {
        request_line,
        headers,
    }
}
