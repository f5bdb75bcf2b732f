// Common test utilities and fixtures

#![allow(dead_code)]

use inbox_monitor::{DashboardClient, DashboardEvent, MonitorConfig, RetryPolicy};
use mockito::{Matcher, Mock, Server, ServerGuard};
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Mock dashboard backend for testing
pub struct MockDashboard {
    pub server: ServerGuard,
}

/// Fast retries so exhausted-retry tests finish quickly
pub fn fast_retry() -> RetryPolicy {
    RetryPolicy::new(3, Duration::from_millis(10))
}

pub fn test_config(base_url: &str) -> MonitorConfig {
    MonitorConfig {
        base_url: base_url.to_string(),
        retry: fast_retry(),
        ..Default::default()
    }
}

pub fn email_json(id: i64, from: &str) -> Value {
    json!({
        "id": id,
        "subject": format!("Számla #{}", id),
        "from": from,
        "date": "2024-03-05T14:07:00+01:00",
        "has_pdf": true,
        "pdf_emails": ["szamla@acme.hu"]
    })
}

pub fn emails_body(page: u32, pages: u32, total: u32) -> Value {
    let data: Vec<Value> = (0..2)
        .map(|i| email_json(i64::from(page) * 100 + i, "billing@acme.hu"))
        .collect();
    json!({
        "success": true,
        "data": data,
        "pagination": {"page": page, "per_page": 10, "pages": pages, "total": total}
    })
}

/// Drain everything the scheduler has emitted so far
pub fn drain(rx: &mut mpsc::UnboundedReceiver<DashboardEvent>) -> Vec<DashboardEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

pub fn error_messages(events: &[DashboardEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            DashboardEvent::Error { message, .. } => Some(message.clone()),
            _ => None,
        })
        .collect()
}

impl MockDashboard {
    /// Create a new mock backend server (async)
    pub async fn new() -> Self {
        let server = Server::new_async().await;
        Self { server }
    }

    /// Get the base URL for the mock server
    pub fn url(&self) -> String {
        self.server.url()
    }

    pub fn client(&self) -> DashboardClient {
        DashboardClient::new(&self.url(), fast_retry()).expect("client builds")
    }

    fn json(&mut self, method: &str, path: &str, status: usize, body: Value, hits: usize) -> Mock {
        self.server
            .mock(method, path)
            .expect(hits)
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create()
    }

    /// Serve `respond_with` to `hits` requests for page `requested`
    pub fn mock_emails_page(&mut self, requested: u32, respond_with: Value, hits: usize) -> Mock {
        self.server
            .mock("GET", "/api/emails")
            .match_query(Matcher::UrlEncoded("page".into(), requested.to_string()))
            .expect(hits)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(respond_with.to_string())
            .create()
    }

    pub fn mock_emails_status(&mut self, status: usize, hits: usize) -> Mock {
        self.server
            .mock("GET", "/api/emails")
            .match_query(Matcher::Any)
            .expect(hits)
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "success": false,
                    "error": "Database error occurred",
                    "message": "Unable to fetch emails. Please try again later."
                })
                .to_string(),
            )
            .create()
    }

    pub fn mock_emails_invalid_json(&mut self, hits: usize) -> Mock {
        self.server
            .mock("GET", "/api/emails")
            .match_query(Matcher::Any)
            .expect(hits)
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body("<html>not json {{{")
            .create()
    }

    pub fn mock_stats(&mut self, companies: u64, pdfs: u64, emails: u64, hits: usize) -> Mock {
        self.json(
            "GET",
            "/api/stats",
            200,
            json!({
                "success": true,
                "stats": {"companies": companies, "pdfs": pdfs, "emails": emails}
            }),
            hits,
        )
    }

    pub fn mock_check_latest(&mut self, new_mail: bool, hits: usize) -> Mock {
        let data = if new_mail {
            json!({"from": "billing@acme.hu", "subject": "Számla", "has_pdf": true})
        } else {
            Value::Null
        };
        self.json(
            "GET",
            "/check-latest",
            200,
            json!({"success": true, "data": data}),
            hits,
        )
    }

    pub fn mock_check_latest_down(&mut self, hits: usize) -> Mock {
        self.json(
            "GET",
            "/check-latest",
            503,
            json!({
                "success": false,
                "error": "Email connection error",
                "message": "Failed to connect to email server. Please try again later."
            }),
            hits,
        )
    }

    pub fn mock_delete_email(&mut self, id: i64, success: bool) -> Mock {
        let body = if success {
            json!({"success": true})
        } else {
            json!({"success": false, "message": "Az e-mail nem található"})
        };
        self.json("DELETE", &format!("/api/emails/{}", id), 200, body, 1)
    }

    pub fn mock_json(
        &mut self,
        method: &str,
        path: &str,
        status: usize,
        body: Value,
        hits: usize,
    ) -> Mock {
        self.json(method, path, status, body, hits)
    }
}

/// Backend that serves the email list and stats but never answers
/// `/check-latest`: the connection is accepted and then left hanging.
pub struct StalledDashboard {
    addr: SocketAddr,
    acceptor: JoinHandle<()>,
}

impl StalledDashboard {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind listener");
        let addr = listener.local_addr().expect("listener address");
        let acceptor = tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                tokio::spawn(serve_or_stall(socket));
            }
        });
        Self { addr, acceptor }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for StalledDashboard {
    fn drop(&mut self) {
        self.acceptor.abort();
    }
}

async fn serve_or_stall(mut socket: TcpStream) {
    let mut head = Vec::new();
    let mut chunk = [0u8; 1024];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => head.extend_from_slice(&chunk[..n]),
        }
    }

    let request = String::from_utf8_lossy(&head);
    let path = request.split_whitespace().nth(1).unwrap_or("/").to_string();
    if path.starts_with("/check-latest") {
        // Hold the socket open without ever replying.
        std::future::pending::<()>().await;
    }

    let body = if path.starts_with("/api/stats") {
        json!({"success": true, "stats": {"companies": 1, "pdfs": 1, "emails": 2}})
    } else {
        emails_body(1, 1, 2)
    }
    .to_string();
    let response = format!(
        "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
        body.len(),
        body
    );
    let _ = socket.write_all(response.as_bytes()).await;
    let _ = socket.shutdown().await;
}
