use std::future::Future;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;

use super::routes::build_router;
use crate::domain::ports::Calculus;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub calculus: Arc<dyn Calculus>,
}

impl AppState {
    pub fn new<C: Calculus + 'static>(calculus: C) -> Self {
        Self {
            calculus: Arc::new(calculus),
        }
    }
}

/// Serves the API on `listener` until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let router: Router = build_router(state);
    if let Ok(addr) = listener.local_addr() {
        tracing::info!("🚀 Listening on http://{}", addr);
    }
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await?;
    tracing::info!("👋 Server stopped");
    Ok(())
}
