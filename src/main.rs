use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use panel_tree::config::config;
use panel_tree::database::{DatabaseManager, FlatRecordStore, InMemoryStore, PgTreeStore};
use panel_tree::handlers::{router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("panel_tree=info,tower_http=info")),
        )
        .init();

    let config = config();
    tracing::info!("Starting panel-tree in {:?} mode", config.environment);

    let store: Arc<dyn FlatRecordStore> = if DatabaseManager::is_configured() {
        let pool = DatabaseManager::connect(&config.database).await?;
        Arc::new(PgTreeStore::new(pool))
    } else {
        tracing::warn!("DATABASE_URL not set - serving an empty in-memory store");
        Arc::new(InMemoryStore::new())
    };

    let mut app = router(AppState::new(store, config))
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes));
    if config.security.enable_cors {
        app = app.layer(cors_layer(&config.security.cors_origins));
    }
    if config.api.enable_request_logging {
        app = app.layer(TraceLayer::new_for_http());
    }

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("panel-tree listening on http://{}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }
    let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    CorsLayer::new().allow_origin(allowed).allow_methods(Any).allow_headers(Any)
}
