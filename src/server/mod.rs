//! Embedded HTTP server exposing the source store as a JSON API.
//!
//! Routes:
//! - `GET    /api/health`
//! - `GET    /api/sources`
//! - `POST   /api/sources`          `{name, words, originLink?}`
//! - `GET    /api/sources/{name}`
//! - `PUT    /api/sources/{name}`   `{words, originLink?}` (creates or overwrites)
//! - `DELETE /api/sources/{name}`

mod routes;
pub mod wire;

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::oneshot;

use crate::words::SourceStore;

pub use routes::{router, ApiState};

/// Server handle for managing the server lifecycle.
pub struct ApiServer {
    /// Address the server is listening on.
    pub addr: SocketAddr,
    /// Shutdown signal sender.
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl ApiServer {
    /// Get the base URL for this server.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Stop the server gracefully.
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for ApiServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Start the API server on `addr` (port 0 picks a free port).
///
/// Returns an ApiServer handle that can be used to get the address and stop the server.
pub async fn start_server(
    addr: &str,
    store: Arc<dyn SourceStore>,
) -> Result<ApiServer, Box<dyn std::error::Error + Send + Sync>> {
    let app = router(ApiState { store });

    let listener = TcpListener::bind(addr).await?;
    let addr = listener.local_addr()?;

    log::info!("Vocab API server started on http://{}", addr);

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
                log::info!("Vocab API server shutting down");
            })
            .await
            .ok();
    });

    Ok(ApiServer {
        addr,
        shutdown_tx: Some(shutdown_tx),
    })
}
