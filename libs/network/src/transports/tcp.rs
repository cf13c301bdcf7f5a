//! TCP transport

use std::io;
use std::net::SocketAddr;

use tokio::net::{TcpListener, TcpStream};
use tracing::debug;

use super::BoxedStream;
use crate::endpoint::Endpoint;
use crate::{Result, TransportError};

#[derive(Debug)]
pub struct TcpEndpointListener {
    listener: TcpListener,
    local_addr: SocketAddr,
}

impl TcpEndpointListener {
    pub async fn bind(endpoint: &Endpoint) -> Result<Self> {
        let address = endpoint.bind_address().ok_or_else(|| {
            TransportError::connection(endpoint.to_string(), "not a tcp endpoint")
        })?;
        let listener = TcpListener::bind(&address).await.map_err(|e| {
            TransportError::connection_with_source(endpoint.to_string(), "bind failed", e)
        })?;
        let local_addr = listener.local_addr().map_err(|e| {
            TransportError::connection_with_source(endpoint.to_string(), "no local address", e)
        })?;
        debug!(%local_addr, "TCP listener bound");
        Ok(Self {
            listener,
            local_addr,
        })
    }

    pub async fn accept(&self) -> io::Result<(BoxedStream, String)> {
        let (stream, peer) = self.listener.accept().await?;
        stream.set_nodelay(true)?;
        Ok((Box::new(stream), peer.to_string()))
    }

    pub fn local_endpoint(&self) -> Endpoint {
        Endpoint::Tcp {
            host: self.local_addr.ip().to_string(),
            port: self.local_addr.port(),
        }
    }
}

pub async fn connect(endpoint: &Endpoint) -> io::Result<BoxedStream> {
    let address = endpoint.connect_address().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "endpoint has no connectable host")
    })?;
    let stream = TcpStream::connect(&address).await?;
    stream.set_nodelay(true)?;
    Ok(Box::new(stream))
}
