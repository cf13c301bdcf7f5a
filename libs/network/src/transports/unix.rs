//! Unix domain socket transport for `ipc://` endpoints
//!
//! Binding refuses a path another live listener answers on, removes a stale
//! socket file otherwise, and removes its own file when dropped.

use std::io;
use std::path::{Path, PathBuf};

use tokio::net::{UnixListener, UnixStream};
use tracing::{debug, warn};

use super::BoxedStream;
use crate::endpoint::Endpoint;
use crate::{Result, TransportError};

#[derive(Debug)]
pub struct UnixEndpointListener {
    listener: UnixListener,
    path: PathBuf,
}

impl UnixEndpointListener {
    pub async fn bind(path: &Path) -> Result<Self> {
        let endpoint = || format!("ipc://{}", path.display());

        if path.exists() {
            if UnixStream::connect(path).await.is_ok() {
                return Err(TransportError::connection_with_source(
                    endpoint(),
                    "socket path already in use",
                    io::Error::from(io::ErrorKind::AddrInUse),
                ));
            }
            std::fs::remove_file(path).map_err(|e| {
                TransportError::connection_with_source(endpoint(), "failed to remove stale socket", e)
            })?;
        }

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                TransportError::connection_with_source(endpoint(), "failed to create socket directory", e)
            })?;
        }

        let listener = UnixListener::bind(path).map_err(|e| {
            TransportError::connection_with_source(endpoint(), "bind failed", e)
        })?;
        debug!(path = %path.display(), "Unix socket listening");
        Ok(Self {
            listener,
            path: path.to_path_buf(),
        })
    }

    pub async fn accept(&self) -> io::Result<(BoxedStream, String)> {
        let (stream, _) = self.listener.accept().await?;
        Ok((Box::new(stream), format!("ipc://{}", self.path.display())))
    }

    pub fn local_endpoint(&self) -> Endpoint {
        Endpoint::Ipc {
            path: self.path.clone(),
        }
    }
}

impl Drop for UnixEndpointListener {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != io::ErrorKind::NotFound {
                warn!(path = %self.path.display(), error = %e, "Failed to remove socket file");
            }
        }
    }
}

pub async fn connect(path: &Path) -> io::Result<BoxedStream> {
    let stream = UnixStream::connect(path).await?;
    Ok(Box::new(stream))
}
