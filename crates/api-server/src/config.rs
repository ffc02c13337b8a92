//! Server configuration

use std::net::SocketAddr;

use anyhow::Context;

pub const DEFAULT_BIND: &str = "0.0.0.0:8000";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
}

impl ServerConfig {
    /// Read `TASKSYNC_BIND`
    pub fn from_env() -> anyhow::Result<Self> {
        let raw = std::env::var("TASKSYNC_BIND").unwrap_or_else(|_| DEFAULT_BIND.to_string());
        Self::parse(&raw)
    }

    fn parse(raw: &str) -> anyhow::Result<Self> {
        let bind_addr = raw
            .trim()
            .parse()
            .with_context(|| format!("TASKSYNC_BIND is not a socket address: '{}'", raw))?;
        Ok(Self { bind_addr })
    }
}
