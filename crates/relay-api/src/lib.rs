pub mod handlers;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use handlers::{ApiError, ApiState};

/// Registration batches can cover every validator a node runs.
const MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

pub fn router(state: ApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let builder_routes = Router::new()
        .route("/status", get(handlers::handle_builder_status))
        .route(
            "/validators",
            post(handlers::handle_register_validators).layer(DefaultBodyLimit::max(MAX_BODY_BYTES)),
        )
        .route(
            "/header/{slot}/{parent_hash}/{pubkey}",
            get(handlers::handle_get_header),
        )
        .route("/blinded_blocks", post(handlers::handle_get_payload));

    let relay_routes = Router::new()
        .route("/status", get(handlers::handle_relay_status))
        .route("/stats/epochs/{epoch}", get(handlers::handle_epoch_stats))
        .route("/stats/slots/{slot}", get(handlers::handle_slot_stats));

    Router::new()
        .nest("/eth/v1/builder", builder_routes)
        .nest("/relay/v1", relay_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

pub async fn serve(
    state: ApiState,
    listen_addr: &str,
    port: u16,
    shutdown: broadcast::Receiver<()>,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind((listen_addr, port)).await?;
    tracing::info!(addr = %listener.local_addr()?, "API listening");
    serve_with_listener(state, listener, shutdown).await
}

/// Serve on an already-bound listener until `shutdown` fires.
pub async fn serve_with_listener(
    state: ApiState,
    listener: TcpListener,
    mut shutdown: broadcast::Receiver<()>,
) -> anyhow::Result<()> {
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move {
            let _ = shutdown.recv().await;
            tracing::info!("API shutting down");
        })
        .await?;
    Ok(())
}
