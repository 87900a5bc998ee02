use axum::{
    extract::{Path, State},
    Json,
};

use super::error::ApiError;
use crate::omdb::{SearchRequest, SearchResult};
use crate::server::AppState;

// GET /api/SearchOmdb/Lion/1
pub async fn search_omdb(
    State(state): State<AppState>,
    Path((movie_name, page)): Path<(String, String)>,
) -> Result<Json<SearchResult>, ApiError> {
    let req = SearchRequest {
        search: Some(movie_name),
        page: Some(page),
        ..Default::default()
    };

    let result = state.omdb.search_by_title(&req).await?;
    Ok(Json(result))
}
