mod config;
mod dto;
mod handlers;
mod models;
mod repository;
mod router;
mod service;

use std::{fmt::Display, process, sync::Arc};

use tracing_subscriber::EnvFilter;

use repository::PgNoteStore;
use service::NoteService;

#[tokio::main]
async fn main() {
    // Env file is optional
    dotenvy::dotenv().ok();

    // Log setup
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("notes_api=info,tower_http=info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cfg = config::load_config().unwrap_or_else(|e| fatal("Failed to load configuration", e));

    // Store connection and schema initialization, both must succeed before serving
    let store = PgNoteStore::new(
        &cfg.database_url,
        cfg.database_ssl,
        cfg.database_pool_size,
    )
    .unwrap_or_else(|e| fatal("Failed to configure database pool", e));

    store
        .migrate()
        .await
        .unwrap_or_else(|e| fatal("Failed to initialize database schema", e));

    let service = Arc::new(NoteService::new(Arc::new(store)));
    let app = router::build_router(service, cfg.client_dist.as_deref());

    let listener = tokio::net::TcpListener::bind((cfg.host.as_str(), cfg.port))
        .await
        .unwrap_or_else(|e| fatal("Failed to bind listener", e));

    match listener.local_addr() {
        Ok(addr) => tracing::info!("API ready, listening on {}", addr),
        Err(e) => tracing::warn!("API ready, local address unavailable: {e}"),
    }

    if let Err(e) = axum::serve(listener, app).await {
        fatal("HTTP server error", e);
    }
}

fn fatal(context: &str, err: impl Display) -> ! {
    tracing::error!("{context}: {err}");
    process::exit(1)
}
