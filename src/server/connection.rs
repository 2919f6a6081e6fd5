// Connection handling module
// Serves one accepted TCP connection and writes the access log for its requests

use hyper::body::{Body, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::Request;
use hyper_util::rt::TokioIo;
use hyper_util::server::graceful::GracefulShutdown;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::config::Config;
use crate::handler::{EdgeRouter, RouteLabel};
use crate::http::HttpResponse;
use crate::logger::{self, AccessLogEntry};

/// Everything a connection task needs, shared across all of them
#[derive(Debug)]
pub struct ServerContext {
    pub router: EdgeRouter,
    access_log: bool,
    access_log_format: String,
    keep_alive: bool,
    max_connections: Option<usize>,
    active: AtomicUsize,
}

impl ServerContext {
    pub fn new(config: &Config, router: EdgeRouter) -> Self {
        Self {
            router,
            access_log: config.logging.access_log,
            access_log_format: config.logging.access_log_format.clone(),
            keep_alive: config.performance.keep_alive,
            max_connections: config
                .performance
                .max_connections
                .map(|max| usize::try_from(max).unwrap_or(usize::MAX)),
            active: AtomicUsize::new(0),
        }
    }

    pub fn active_connections(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Route one request and log it
    pub async fn serve(&self, req: Request<Incoming>, peer_addr: SocketAddr) -> HttpResponse {
        if !self.access_log {
            return self.router.handle(req).await;
        }

        let start = Instant::now();
        let (parts, body) = req.into_parts();
        let mut entry = AccessLogEntry::from_request(peer_addr.ip().to_string(), &parts);
        let response = self.router.handle(Request::from_parts(parts, body)).await;

        entry.status = response.status().as_u16();
        entry.body_bytes = response.body().size_hint().exact().unwrap_or(0);
        entry.route = response
            .extensions()
            .get::<RouteLabel>()
            .map_or("-", |label| label.0);
        entry.request_time_us = u64::try_from(start.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &self.access_log_format);
        response
    }
}

/// Accept a connection, enforcing the connection cap.
///
/// Increments the counter first, then checks the limit, so concurrent
/// accepts cannot both slip under it.
pub fn accept_connection(
    stream: tokio::net::TcpStream,
    peer_addr: SocketAddr,
    ctx: &Arc<ServerContext>,
    graceful: &GracefulShutdown,
) {
    let prev_count = ctx.active.fetch_add(1, Ordering::SeqCst);
    if let Some(max_conn) = ctx.max_connections {
        if prev_count >= max_conn {
            ctx.active.fetch_sub(1, Ordering::SeqCst);
            tracing::warn!(
                peer = %peer_addr,
                active = prev_count,
                max_connections = max_conn,
                "max connections reached, connection rejected"
            );
            drop(stream);
            return;
        }
    }
    tracing::debug!(peer = %peer_addr, "connection accepted");

    let io = TokioIo::new(stream);
    let mut builder = http1::Builder::new();
    builder.keep_alive(ctx.keep_alive);

    let service_ctx = Arc::clone(ctx);
    let conn = builder.serve_connection(
        io,
        service_fn(move |req| {
            let ctx = Arc::clone(&service_ctx);
            async move { Ok::<_, Infallible>(ctx.serve(req, peer_addr).await) }
        }),
    );
    let conn = graceful.watch(conn);

    let ctx = Arc::clone(ctx);
    tokio::spawn(async move {
        if let Err(err) = conn.await {
            tracing::debug!(peer = %peer_addr, error = %err, "connection error");
        }
        ctx.active.fetch_sub(1, Ordering::SeqCst);
    });
}
