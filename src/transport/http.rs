// src/transport/http.rs
use std::time::Duration;
use async_trait::async_trait;
use log::debug;
use serde::Serialize;
use super::{RemoteExec, TransportError};

#[derive(Serialize)]
struct ExecRequest<'a> {
    cmd: &'a str,
}

/// Sends console commands through an HTTP exec endpoint running next to the
/// game server.
pub struct ExecTunnel {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl ExecTunnel {
    pub fn new(url: String, timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, url, timeout })
    }
}

#[async_trait]
impl RemoteExec for ExecTunnel {
    async fn exec(&self, command: &str) -> Result<String, TransportError> {
        debug!("Posting {:?} to exec tunnel", command);
        let response = self.client
            .post(&self.url)
            .json(&ExecRequest { cmd: command })
            .send().await
            .map_err(|e| classify(e, self.timeout))?
            .error_for_status()?;

        response.text().await.map_err(|e| classify(e, self.timeout))
    }
}

fn classify(err: reqwest::Error, timeout: Duration) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout(timeout)
    } else {
        TransportError::Http(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    // Accepts one connection, waits for the JSON body and answers with `status_line`/`body`.
    async fn serve_once(status_line: &'static str, body: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/api/exec/", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                request.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&request);
                if n == 0 || text.trim_end().ends_with('}') {
                    break;
                }
            }
            let reply = format!(
                "HTTP/1.1 {}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(reply.as_bytes()).await.unwrap();
            String::from_utf8_lossy(&request).into_owned()
        });

        (url, handle)
    }

    #[tokio::test]
    async fn posts_command_and_returns_body() {
        let (url, server) = serve_once("200 OK", "map: de_dust2\n").await;
        let tunnel = ExecTunnel::new(url, Duration::from_secs(5)).unwrap();

        let reply = tunnel.exec("cvarlist game_; status").await.unwrap();
        assert_eq!(reply, "map: de_dust2\n");

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /api/exec/ "));
        assert!(request.contains(r#"{"cmd":"cvarlist game_; status"}"#));
    }

    #[tokio::test]
    async fn error_status_is_a_transport_error() {
        let (url, _server) = serve_once("502 Bad Gateway", "").await;
        let tunnel = ExecTunnel::new(url, Duration::from_secs(5)).unwrap();

        let err = tunnel.exec("status").await.unwrap_err();
        assert!(matches!(err, TransportError::Http(_)));
    }

    #[tokio::test]
    async fn connection_refused_is_a_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/api/exec/", listener.local_addr().unwrap());
        drop(listener);

        let tunnel = ExecTunnel::new(url, Duration::from_secs(5)).unwrap();
        assert!(tunnel.exec("status").await.is_err());
    }
}
