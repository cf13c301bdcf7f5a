//! Stream transports behind the pub/sub sockets
//!
//! Both transports hand out boxed `AsyncRead + AsyncWrite` streams so the
//! publisher and subscriber loops are written once:
//!
//! - [`tcp`]: `tcp://` endpoints, Nagle disabled
//! - [`unix`]: `ipc://` endpoints on Unix domain sockets

pub mod tcp;
pub mod unix;

use tokio::io::{AsyncRead, AsyncWrite};

use crate::endpoint::Endpoint;
use crate::{Result, TransportError};

/// Any bidirectional byte stream a socket can run over
pub trait Connection: AsyncRead + AsyncWrite + Send + Unpin {}

impl<T: AsyncRead + AsyncWrite + Send + Unpin> Connection for T {}

pub type BoxedStream = Box<dyn Connection>;

/// Bound server-side listener
#[derive(Debug)]
pub enum Listener {
    Tcp(tcp::TcpEndpointListener),
    Unix(unix::UnixEndpointListener),
}

impl Listener {
    /// Bind `endpoint`; fails if the address is unusable or already in use
    pub async fn bind(endpoint: &Endpoint) -> Result<Self> {
        match endpoint {
            Endpoint::Tcp { .. } => tcp::TcpEndpointListener::bind(endpoint).await.map(Listener::Tcp),
            Endpoint::Ipc { path } => unix::UnixEndpointListener::bind(path).await.map(Listener::Unix),
        }
    }

    /// Accept the next peer, returning the stream and a printable peer name
    pub async fn accept(&self) -> std::io::Result<(BoxedStream, String)> {
        match self {
            Listener::Tcp(listener) => listener.accept().await,
            Listener::Unix(listener) => listener.accept().await,
        }
    }

    /// Endpoint actually bound (resolves port 0)
    pub fn local_endpoint(&self) -> Endpoint {
        match self {
            Listener::Tcp(listener) => listener.local_endpoint(),
            Listener::Unix(listener) => listener.local_endpoint(),
        }
    }
}

/// Open a client stream to `endpoint`
pub async fn connect(endpoint: &Endpoint) -> Result<BoxedStream> {
    let stream = match endpoint {
        Endpoint::Tcp { .. } => tcp::connect(endpoint).await,
        Endpoint::Ipc { path } => unix::connect(path).await,
    };
    stream.map_err(|e| TransportError::connection_with_source(endpoint.to_string(), "connect failed", e))
}
