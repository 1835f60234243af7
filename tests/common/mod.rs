//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Start a mock upstream that answers every request with the given raw HTTP
/// response. Returns the bound address.
pub async fn start_mock_upstream(response: &'static str) -> SocketAddr {
    serve(move |_path| response.to_string()).await
}

/// Start a mock upstream whose response is computed from the request path.
#[allow(dead_code)]
pub async fn start_path_aware_upstream<F>(f: F) -> SocketAddr
where
    F: Fn(&str) -> String + Send + Sync + 'static,
{
    serve(f).await
}

async fn serve<F>(f: F) -> SocketAddr
where
    F: Fn(&str) -> String + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let mut buf = vec![0u8; 16 * 1024];
                        let mut read = 0;
                        // Read through the end of the request headers; these
                        // tests send no request bodies.
                        loop {
                            match socket.read(&mut buf[read..]).await {
                                Ok(0) => break,
                                Ok(n) => {
                                    read += n;
                                    if buf[..read].windows(4).any(|w| w == b"\r\n\r\n") {
                                        break;
                                    }
                                    if read == buf.len() {
                                        break;
                                    }
                                }
                                Err(_) => return,
                            }
                        }
                        let head = String::from_utf8_lossy(&buf[..read]);
                        let path = head.split_whitespace().nth(1).unwrap_or("/").to_string();
                        let response = f(&path);
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Build a raw HTTP/1.1 response. `extra_headers` entries must each end in
/// `\r\n`.
pub fn http_response(status: &str, extra_headers: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n{}\r\n{}",
        status,
        body.len(),
        extra_headers,
        body
    )
}
