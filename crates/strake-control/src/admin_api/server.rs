//! Admin API server.

use super::router::route_request;
use crate::runtime::Runtime;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::{debug, info};

/// Shared state handed to every admin connection.
pub struct AdminContext {
    pub runtime: Arc<Runtime>,
    /// Expected value of `Authorization: Token <value>`. Unset skips the
    /// check.
    pub token: Option<String>,
}

/// Admin API server for the control plane.
pub struct AdminServer {
    addr: SocketAddr,
    context: Arc<AdminContext>,
}

impl AdminServer {
    pub fn new(addr: SocketAddr, runtime: Arc<Runtime>, token: Option<String>) -> Self {
        Self {
            addr,
            context: Arc::new(AdminContext { runtime, token }),
        }
    }

    /// Bind and serve until the shutdown signal fires. A bind failure here
    /// is the one startup error that is fatal to the process.
    pub async fn run(self, shutdown: broadcast::Receiver<()>) -> Result<(), anyhow::Error> {
        let listener = TcpListener::bind(self.addr).await?;
        info!("admin API listening on http://{}", self.addr);
        self.serve(listener, shutdown).await
    }

    /// Serve connections on an already-bound listener.
    pub async fn serve(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), anyhow::Error> {
        loop {
            tokio::select! {
                result = listener.accept() => {
                    let (stream, _) = result?;
                    let io = TokioIo::new(stream);
                    let context = Arc::clone(&self.context);
                    tokio::spawn(async move {
                        let service = service_fn(move |req| {
                            let context = Arc::clone(&context);
                            async move { route_request(req, context).await }
                        });
                        if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                            debug!("admin connection error: {}", e);
                        }
                    });
                }
                _ = shutdown.recv() => {
                    info!("admin API shutting down");
                    break;
                }
            }
        }
        Ok(())
    }
}
