use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use crate::storage::ShopStore;

pub mod routes;

/// Server state. The store is the process-wide connection, opened once by
/// the caller and closed once after the server drains.
pub struct AppState {
    pub store: Mutex<ShopStore>,
}

impl AppState {
    pub fn new(store: ShopStore) -> Self {
        Self {
            store: Mutex::new(store),
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route("/stats", get(routes::get_stats))
        .route("/services", get(routes::list_services).post(routes::create_service))
        .route(
            "/services/{id}",
            get(routes::get_service)
                .put(routes::update_service)
                .delete(routes::delete_service),
        )
        .route("/services/{id}/reactivate", post(routes::reactivate_service))
        .route("/categories", get(routes::list_categories).post(routes::create_category))
        .route(
            "/categories/{id}",
            get(routes::get_category)
                .put(routes::update_category)
                .delete(routes::delete_category),
        )
        .route("/categories/{id}/reactivate", post(routes::reactivate_category))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start_server(port: u16, store: ShopStore) -> anyhow::Result<()> {
    let state = Arc::new(AppState::new(store));
    let app = router(state.clone());

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Starting server on {}", addr);
    crate::ui::header(crate::ui::Icons::ROCKET, &format!("Server running at http://{}", addr));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
            }
            tracing::info!("Shutdown requested, draining requests");
        })
        .await?;

    match Arc::try_unwrap(state) {
        Ok(state) => {
            let store = state
                .store
                .into_inner()
                .map_err(|_| anyhow::anyhow!("store mutex poisoned"))?;
            store.close()?;
        }
        Err(_) => tracing::warn!("Store still referenced after shutdown; leaving it to drop"),
    }

    Ok(())
}
