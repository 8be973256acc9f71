use std::net::{AddrParseError, SocketAddr};
use std::num::ParseIntError;

use thiserror::Error;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8000;

/// Gets the host:port the API server binds to from the env vars HOST and PORT.
/// Uses `127.0.0.1:8000` for whichever is unset.
pub fn get_listen_addr() -> Result<SocketAddr, ListenAddrError> {
    let host = common_sdoc::env_or("HOST", DEFAULT_HOST);
    let port = std::env::var("PORT").ok();
    listen_addr(&host, port.as_deref())
}

/// Combines a host and an optional port into a socket address.
pub fn listen_addr(host: &str, port: Option<&str>) -> Result<SocketAddr, ListenAddrError> {
    let port = match port {
        Some(p) => p.trim().parse::<u16>()?,
        None => DEFAULT_PORT,
    };
    Ok(format!("{}:{}", host, port).parse::<SocketAddr>()?)
}

#[derive(Debug, Error)]
pub enum ListenAddrError {
    #[error("Invalid port: {0}")]
    InvalidPort(#[from] ParseIntError),

    #[error("Invalid hostname: {0}")]
    InvalidHostname(#[from] AddrParseError),
}
