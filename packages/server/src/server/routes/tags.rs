//! Read-only tag catalogue.

use axum::{
    extract::{Extension, Path},
    routing::get,
    Json, Router,
};

use crate::domains::tags::models::Tag;
use crate::server::app::AxumAppState;
use crate::server::error::ApiError;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_tags))
        .route("/:slug", get(tag_detail))
}

async fn list_tags(
    Extension(state): Extension<AxumAppState>,
) -> Result<Json<Vec<Tag>>, ApiError> {
    let tags = Tag::find_all(&state.db_pool).await?;
    Ok(Json(tags))
}

async fn tag_detail(
    Extension(state): Extension<AxumAppState>,
    Path(slug): Path<String>,
) -> Result<Json<Tag>, ApiError> {
    Tag::find_by_slug(&slug, &state.db_pool)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("tag not found".to_string()))
}
