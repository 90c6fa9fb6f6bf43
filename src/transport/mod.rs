// src/transport/mod.rs
pub mod http;
pub mod rcon;

use std::sync::Arc;
use std::time::Duration;
use async_trait::async_trait;
use thiserror::Error;
use crate::config::{Config, TransportConfig};

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("I/O error talking to game server: {0}")]
    Io(#[from] std::io::Error),

    #[error("Game server did not answer within {0:?}")]
    Timeout(Duration),

    #[error("Exec tunnel request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("RCON password rejected")]
    AuthRejected,

    #[error("Malformed RCON packet: {0}")]
    Protocol(String),
}

/// Runs a console command on the game server and returns its full reply.
#[async_trait]
pub trait RemoteExec: Send + Sync {
    async fn exec(&self, command: &str) -> Result<String, TransportError>;
}

pub fn from_config(config: &Config) -> Result<Arc<dyn RemoteExec>, TransportError> {
    let timeout = Duration::from_secs(config.remote_timeout_secs);
    let exec: Arc<dyn RemoteExec> = match &config.transport {
        TransportConfig::Rcon { address, password } => {
            Arc::new(rcon::RconClient::new(address.clone(), password.clone(), timeout))
        }
        TransportConfig::ExecUrl(url) => {
            Arc::new(http::ExecTunnel::new(url.clone(), timeout)?)
        }
    };
    Ok(exec)
}
