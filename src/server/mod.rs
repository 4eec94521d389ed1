pub mod handlers;
pub mod types;

use crate::config::Config;
use crate::model::{BackendContext, BackendRegistry, LabelTable};
use crate::service::InferenceService;
use crate::Result;
use axum::{extract::DefaultBodyLimit, routing::post, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

pub async fn run(config: Config) -> Result<()> {
    // The label table is process-wide: loaded once, shared by reference.
    let labels = Arc::new(LabelTable::load(&config.models.labels_path)?);
    info!("Loaded label table with {} classes", labels.len());

    let ctx = BackendContext {
        models: config.models.clone(),
        labels,
    };
    let registry = BackendRegistry::with_default_backends(ctx);
    info!("Registered model services: {:?}", registry.model_names());

    let service = Arc::new(InferenceService::new(registry));
    let app = router(service, config.server.max_body_mb);

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

pub fn router(service: Arc<InferenceService>, max_body_mb: usize) -> Router {
    let state = handlers::AppState { service };

    Router::new()
        .route("/greet", post(handlers::greet))
        .route("/train", post(handlers::train))
        .route("/serve-model", post(handlers::serve_model))
        .route("/evaluate", post(handlers::evaluate))
        .layer(DefaultBodyLimit::max(max_body_mb * 1024 * 1024))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
