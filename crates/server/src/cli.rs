//! Command-line and environment configuration.

use crate::logging::LogFormat;
use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;

/// Heart-rate ledger HTTP service.
#[derive(Parser, Debug)]
#[command(name = "bpmchain", about = "A hash-linked heart-rate ledger", version)]
pub struct Cli {
    /// Listen address: a bare port (`8080`, `:8080`) or `host:port`.
    #[arg(long, env = "ADDR", default_value = "8080")]
    pub addr: String,

    /// Log output format.
    #[arg(long, env = "BPMCHAIN_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    /// Default log filter when `RUST_LOG` is unset.
    #[arg(long, env = "BPMCHAIN_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Cli {
    pub fn listen_addr(&self) -> Result<SocketAddr> {
        parse_listen_addr(&self.addr)
    }
}

/// A bare port binds every interface.
pub fn parse_listen_addr(raw: &str) -> Result<SocketAddr> {
    let raw = raw.trim();
    let port = raw.strip_prefix(':').unwrap_or(raw);
    if let Ok(port) = port.parse::<u16>() {
        return Ok(SocketAddr::from(([0, 0, 0, 0], port)));
    }

    raw.parse()
        .with_context(|| format!("invalid listen address: {raw}"))
}
