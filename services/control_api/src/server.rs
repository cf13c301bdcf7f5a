//! Control API server lifecycle

use std::future::Future;
use std::net::SocketAddr;

use network::CancellationToken;
use tracing::info;

use crate::error::Result;
use crate::routes::{routes, ApiState};

/// Bind the API and return the bound address plus the server future
///
/// The future completes once `shutdown` is cancelled and in-flight requests
/// have finished.
pub fn bind(
    state: ApiState,
    addr: SocketAddr,
    shutdown: CancellationToken,
) -> Result<(SocketAddr, impl Future<Output = ()> + 'static)> {
    let (bound, server) = warp::serve(routes(state)).try_bind_with_graceful_shutdown(
        addr,
        async move { shutdown.cancelled().await },
    )?;
    info!(%bound, "🌐 Control API listening");
    Ok((bound, server))
}

/// Serve until `shutdown` is cancelled
pub async fn serve(state: ApiState, addr: SocketAddr, shutdown: CancellationToken) -> Result<()> {
    let (_, server) = bind(state, addr, shutdown)?;
    server.await;
    info!("Control API stopped");
    Ok(())
}
