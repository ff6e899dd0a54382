use axum::{Router, routing::get};
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use std::{path::Path, sync::Arc};

use crate::{handlers::rest, service::NoteService};

fn notes_routes() -> Router<Arc<NoteService>> {
    Router::new()
        .route("/notes", get(rest::list_notes).post(rest::create_note))
        .route(
            "/notes/{id}",
            get(rest::get_note)
                .put(rest::update_note)
                .delete(rest::delete_note),
        )
        .route("/healthz", get(rest::healthz))
}

/// The notes API is served both at the root and under `/api`. Unmatched `/api`
/// paths get a JSON 404; everything else falls through to the frontend bundle
/// when `client_dist` is set.
pub fn build_router(service: Arc<NoteService>, client_dist: Option<&Path>) -> Router {
    let router = Router::new()
        .merge(notes_routes())
        .nest("/api", notes_routes().fallback(rest::not_found))
        .with_state(service)
        .merge(
            SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", rest::ApiDoc::openapi()),
        );

    let router = match client_dist {
        Some(dist) => {
            tracing::info!("Serving frontend from {}", dist.display());
            let spa = ServeDir::new(dist).fallback(ServeFile::new(dist.join("index.html")));
            router.fallback_service(spa)
        }
        None => router.fallback(rest::not_found),
    };

    router
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
