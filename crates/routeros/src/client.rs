//! TCP client for the RouterOS API.
//!
//! [`ApiClient`] owns one authenticated connection and executes
//! commands over it. Request/response pairs are serialized internally
//! behind a mutex, so callers operating on different users may share
//! the client freely.

use std::collections::HashMap;
use std::time::Duration;

use tokio::io::BufStream;
use tokio::net::TcpStream;
use tokio::sync::Mutex;

use crate::proto::{self, Reply};

/// Errors from the RouterOS control plane.
#[derive(Debug, thiserror::Error)]
pub enum RouterOsError {
    /// Socket-level failure (connect, read, write).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The router rejected the command (`!trap` / `!fatal`).
    #[error("Router error: {0}")]
    Trap(String),

    /// The stream produced something that is not a valid reply.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// The operation did not complete within the configured timeout.
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),
}

/// Executes command sentences against a router.
///
/// The seam between the gateway and the wire: production code uses
/// [`ApiClient`], tests substitute a scripted implementation.
#[async_trait::async_trait]
pub trait RouterOsClient: Send + Sync {
    /// Run one command and collect its `!re` records.
    ///
    /// `words` are the attribute/query words following the path, each
    /// already in wire shape (`=key=value` / `?key=value`).
    async fn command(
        &self,
        path: &str,
        words: &[String],
    ) -> Result<Vec<HashMap<String, String>>, RouterOsError>;
}

/// Establishes [`RouterOsClient`] connections.
///
/// The gateway holds a connector rather than a client so it can
/// reconnect after failures; tests inject their own.
#[async_trait::async_trait]
pub trait Connect: Send + Sync {
    async fn connect(&self) -> Result<std::sync::Arc<dyn RouterOsClient>, RouterOsError>;
}

/// Connection parameters for the router API endpoint.
#[derive(Debug, Clone)]
pub struct ApiConnector {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    /// Per-operation timeout (connect, login, each command).
    pub timeout: Duration,
}

impl ApiConnector {
    pub fn new(host: String, port: u16, username: String, password: String) -> Self {
        Self {
            host,
            port,
            username,
            password,
            timeout: Duration::from_secs(10),
        }
    }
}

#[async_trait::async_trait]
impl Connect for ApiConnector {
    async fn connect(&self) -> Result<std::sync::Arc<dyn RouterOsClient>, RouterOsError> {
        let client = ApiClient::connect(self).await?;
        Ok(std::sync::Arc::new(client))
    }
}

/// A live, authenticated API connection.
pub struct ApiClient {
    stream: Mutex<BufStream<TcpStream>>,
    timeout: Duration,
}

impl ApiClient {
    /// Open a TCP connection and log in.
    ///
    /// Uses the post-6.43 plain login (`/login` with name and
    /// password in the first sentence).
    pub async fn connect(config: &ApiConnector) -> Result<Self, RouterOsError> {
        let addr = format!("{}:{}", config.host, config.port);
        let stream = tokio::time::timeout(config.timeout, TcpStream::connect(&addr))
            .await
            .map_err(|_| RouterOsError::Timeout(config.timeout))??;

        let client = Self {
            stream: Mutex::new(BufStream::new(stream)),
            timeout: config.timeout,
        };

        let login_words = [
            format!("=name={}", config.username),
            format!("=password={}", config.password),
        ];
        client.command("/login", &login_words).await?;

        tracing::info!(host = %config.host, port = config.port, "Connected to router control API");
        Ok(client)
    }

    /// Run one request/response exchange while holding the stream.
    async fn exchange(
        &self,
        path: &str,
        words: &[String],
    ) -> Result<Vec<HashMap<String, String>>, RouterOsError> {
        let mut stream = self.stream.lock().await;

        let mut sentence = Vec::with_capacity(words.len() + 1);
        sentence.push(path.to_string());
        sentence.extend_from_slice(words);
        proto::write_sentence(&mut *stream, &sentence).await?;

        let mut records = Vec::new();
        loop {
            let reply_words = proto::read_sentence(&mut *stream).await?;
            match proto::classify_reply(&reply_words) {
                Some(Reply::Data(attrs)) => records.push(attrs),
                Some(Reply::Done(_)) => return Ok(records),
                Some(Reply::Trap { message }) => return Err(RouterOsError::Trap(message)),
                None => {
                    return Err(RouterOsError::Protocol(format!(
                        "unexpected reply sentence: {reply_words:?}"
                    )))
                }
            }
        }
    }
}

#[async_trait::async_trait]
impl RouterOsClient for ApiClient {
    async fn command(
        &self,
        path: &str,
        words: &[String],
    ) -> Result<Vec<HashMap<String, String>>, RouterOsError> {
        tokio::time::timeout(self.timeout, self.exchange(path, words))
            .await
            .map_err(|_| RouterOsError::Timeout(self.timeout))?
    }
}
