//! Local HTTP server with canned responses for bootstrap tests

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

type Routes = Arc<Mutex<HashMap<String, (u16, Vec<u8>)>>>;

/// Answers `GET path` from a mutable path → (status, body) table
#[derive(Clone)]
pub struct CannedServer {
    base: String,
    routes: Routes,
}

impl CannedServer {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let routes = Routes::default();

        let table = routes.clone();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                tokio::spawn(answer(stream, table.clone()));
            }
        });

        Self { base, routes }
    }

    /// Set the response for `path` and return its full URL
    pub fn serve(&self, path: &str, status: u16, body: impl Into<Vec<u8>>) -> String {
        self.routes.lock().insert(path.to_string(), (status, body.into()));
        format!("{}{}", self.base, path)
    }
}

async fn answer(mut stream: TcpStream, routes: Routes) {
    let mut head = Vec::new();
    let mut buf = [0u8; 1024];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut buf).await {
            Ok(0) | Err(_) => return,
            Ok(n) => head.extend_from_slice(&buf[..n]),
        }
    }

    let head = String::from_utf8_lossy(&head);
    let path = head.split_whitespace().nth(1).unwrap_or("/").to_string();
    let (status, body) = routes
        .lock()
        .get(&path)
        .cloned()
        .unwrap_or((404, b"no such path".to_vec()));

    let header = format!(
        "HTTP/1.1 {status} Canned\r\ncontent-length: {}\r\nconnection: close\r\n\r\n",
        body.len()
    );
    let _ = stream.write_all(header.as_bytes()).await;
    let _ = stream.write_all(&body).await;
    let _ = stream.shutdown().await;
}

/// URL on a local port nothing listens on
pub fn dead_url(path: &str) -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}{path}")
}
