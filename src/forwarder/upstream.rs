//! Upstream address parsing.
//!
//! The upstream is always stored as `host:port`. An address without a port
//! gets `:80` appended; anything else that does not split cleanly into host
//! and port is rejected.

use std::fmt;

use crate::error::UpstreamAddrError;

/// Port assumed when the configured upstream has none.
pub const DEFAULT_PORT: u16 = 80;

/// A validated `host:port` upstream target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamAddr {
    authority: String,
    host: String,
    port: u16,
}

impl UpstreamAddr {
    /// Parse `host[:port]`, appending the default port when none is given.
    ///
    /// IPv6 literals must be bracketed (`[::1]` or `[::1]:8080`).
    pub fn parse(addr: &str) -> Result<Self, UpstreamAddrError> {
        if addr.is_empty() {
            return Err(UpstreamAddrError::Empty);
        }

        let (host, port) = split_host_port(addr)?;
        if host.is_empty() || host == "[]" {
            return Err(UpstreamAddrError::MissingHost(addr.to_string()));
        }

        match port {
            Some(raw) => {
                let port = raw.parse::<u16>().map_err(|_| UpstreamAddrError::InvalidPort {
                    addr: addr.to_string(),
                    port: raw.to_string(),
                })?;
                Ok(Self {
                    authority: addr.to_string(),
                    host: host.to_string(),
                    port,
                })
            }
            None => Ok(Self {
                authority: format!("{}:{}", addr, DEFAULT_PORT),
                host: host.to_string(),
                port: DEFAULT_PORT,
            }),
        }
    }

    /// The stored `host:port` string.
    pub fn as_str(&self) -> &str {
        &self.authority
    }

    /// Host part, brackets included for IPv6 literals.
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

impl fmt::Display for UpstreamAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.authority)
    }
}

/// Split into host and optional port. `None` means "no port present",
/// which is the only recoverable failure.
fn split_host_port(addr: &str) -> Result<(&str, Option<&str>), UpstreamAddrError> {
    if addr.starts_with('[') {
        let end = addr
            .find(']')
            .ok_or_else(|| UpstreamAddrError::MissingBracket(addr.to_string()))?;
        let host = &addr[..=end];
        if host[1..end].contains(['[', ']']) {
            return Err(UpstreamAddrError::UnexpectedBracket(addr.to_string()));
        }

        let rest = &addr[end + 1..];
        if rest.is_empty() {
            return Ok((host, None));
        }
        return match rest.strip_prefix(':') {
            Some(port) => Ok((host, Some(port))),
            None => Err(UpstreamAddrError::InvalidPort {
                addr: addr.to_string(),
                port: rest.to_string(),
            }),
        };
    }

    if addr.contains(['[', ']']) {
        return Err(UpstreamAddrError::UnexpectedBracket(addr.to_string()));
    }

    match addr.matches(':').count() {
        0 => Ok((addr, None)),
        1 => {
            let (host, port) = addr.split_once(':').unwrap_or((addr, ""));
            Ok((host, Some(port)))
        }
        _ => Err(UpstreamAddrError::TooManyColons(addr.to_string())),
    }
}
