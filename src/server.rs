use axum::{extract::Request, http::StatusCode, response::IntoResponse, routing::get, Router};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::omdb::OmdbApi;

#[derive(Clone)]
pub struct AppState {
    pub omdb: Arc<dyn OmdbApi>,
}

impl AppState {
    pub fn new(omdb: Arc<dyn OmdbApi>) -> Self {
        Self { omdb }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/SearchOmdb/:movie_name/:page",
            get(crate::api::search_omdb),
        )
        .fallback(fallback_handler)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn fallback_handler(req: Request<axum::body::Body>) -> impl IntoResponse {
    // CORS preflight for unknown paths
    if req.method() == axum::http::Method::OPTIONS {
        return StatusCode::OK.into_response();
    }
    StatusCode::NOT_FOUND.into_response()
}
