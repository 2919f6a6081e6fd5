// Server module entry
// Accept loop, connection handling and shutdown signals

pub mod connection;
pub mod listener;
pub mod signal;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use hyper_util::server::graceful::GracefulShutdown;

pub use connection::ServerContext;
pub use listener::create_listener;
pub use signal::shutdown_signal;

/// Grace period for in-flight connections after shutdown is requested
const DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Accept connections until `shutdown` resolves, then drain open ones
pub async fn serve<F>(listener: TcpListener, ctx: Arc<ServerContext>, shutdown: F)
where
    F: Future<Output = ()>,
{
    let graceful = GracefulShutdown::new();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        connection::accept_connection(stream, peer_addr, &ctx, &graceful);
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "failed to accept connection");
                    }
                }
            }

            () = &mut shutdown => break,
        }
    }
    drop(listener);

    tracing::info!(
        active = ctx.active_connections(),
        "stopped accepting connections, draining"
    );
    tokio::select! {
        () = graceful.shutdown() => tracing::info!("all connections closed"),
        () = tokio::time::sleep(DRAIN_TIMEOUT) => {
            tracing::warn!(timeout = ?DRAIN_TIMEOUT, "drain timed out, closing remaining connections");
        }
    }
}
