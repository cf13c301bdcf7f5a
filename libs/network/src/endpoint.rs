//! Endpoint strings
//!
//! ```text
//! tcp://HOST:PORT    HOST may be `*` (all interfaces) when binding; PORT 0 = ephemeral
//! ipc://PATH         Unix domain socket at PATH
//! ```

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::{Result, TransportError};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Tcp { host: String, port: u16 },
    Ipc { path: PathBuf },
}

impl Endpoint {
    pub fn parse(endpoint: &str) -> Result<Self> {
        if let Some(rest) = endpoint.strip_prefix("tcp://") {
            let (host, port) = rest
                .rsplit_once(':')
                .ok_or_else(|| TransportError::connection(endpoint, "missing port"))?;
            let host = host.trim_start_matches('[').trim_end_matches(']');
            if host.is_empty() {
                return Err(TransportError::connection(endpoint, "missing host"));
            }
            let port = port
                .parse::<u16>()
                .map_err(|_| TransportError::connection(endpoint, format!("invalid port '{}'", port)))?;
            Ok(Endpoint::Tcp {
                host: host.to_string(),
                port,
            })
        } else if let Some(path) = endpoint.strip_prefix("ipc://") {
            if path.is_empty() {
                return Err(TransportError::connection(endpoint, "missing socket path"));
            }
            Ok(Endpoint::Ipc {
                path: PathBuf::from(path),
            })
        } else {
            Err(TransportError::connection(
                endpoint,
                "unsupported transport (expected tcp:// or ipc://)",
            ))
        }
    }

    /// `host:port` for binding; `*` becomes the IPv4 wildcard address
    pub(crate) fn bind_address(&self) -> Option<String> {
        match self {
            Endpoint::Tcp { host, port } if host == "*" => Some(format!("0.0.0.0:{}", port)),
            Endpoint::Tcp { host, port } => Some(join_host_port(host, *port)),
            Endpoint::Ipc { .. } => None,
        }
    }

    /// `host:port` for connecting; `*` is not a connectable host
    pub(crate) fn connect_address(&self) -> Option<String> {
        match self {
            Endpoint::Tcp { host, .. } if host == "*" => None,
            Endpoint::Tcp { host, port } => Some(join_host_port(host, *port)),
            Endpoint::Ipc { .. } => None,
        }
    }
}

fn join_host_port(host: &str, port: u16) -> String {
    if host.contains(':') {
        format!("[{}]:{}", host, port)
    } else {
        format!("{}:{}", host, port)
    }
}

impl FromStr for Endpoint {
    type Err = TransportError;

    fn from_str(s: &str) -> Result<Self> {
        Endpoint::parse(s)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Tcp { host, port } => write!(f, "tcp://{}", join_host_port(host, *port)),
            Endpoint::Ipc { path } => write!(f, "ipc://{}", path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tcp_wildcard() {
        let endpoint = Endpoint::parse("tcp://*:5555").unwrap();
        assert_eq!(
            endpoint,
            Endpoint::Tcp {
                host: "*".into(),
                port: 5555
            }
        );
        assert_eq!(endpoint.bind_address().unwrap(), "0.0.0.0:5555");
        assert!(endpoint.connect_address().is_none());
    }

    #[test]
    fn test_parse_tcp_host() {
        let endpoint: Endpoint = "tcp://localhost:5556".parse().unwrap();
        assert_eq!(endpoint.connect_address().unwrap(), "localhost:5556");
        assert_eq!(endpoint.to_string(), "tcp://localhost:5556");
    }

    #[test]
    fn test_parse_ipv6() {
        let endpoint = Endpoint::parse("tcp://[::1]:7000").unwrap();
        assert_eq!(endpoint.connect_address().unwrap(), "[::1]:7000");
    }

    #[test]
    fn test_parse_ipc() {
        let endpoint = Endpoint::parse("ipc:///tmp/sensors.sock").unwrap();
        assert_eq!(
            endpoint,
            Endpoint::Ipc {
                path: PathBuf::from("/tmp/sensors.sock")
            }
        );
    }

    #[test]
    fn test_rejects_malformed() {
        for bad in [
            "",
            "udp://host:1",
            "tcp://host",
            "tcp://:5555",
            "tcp://host:99999",
            "tcp://host:abc",
            "ipc://",
        ] {
            assert!(Endpoint::parse(bad).is_err(), "accepted {:?}", bad);
        }
    }
}
