//! Course tag endpoint handlers.

use axum::{extract::State, Json};
use validator::Validate;

use domain::models::tag::{ListTagsResponse, ReplaceTagsRequest};

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{CourseContext, StaffContext};
use crate::services::TagService;

/// List tags. Students do not see staff-only tags.
///
/// GET /api/v1/courses/:course/tags
pub async fn list_tags(
    State(state): State<AppState>,
    context: CourseContext,
) -> Result<Json<ListTagsResponse>, ApiError> {
    Ok(Json(TagService::new(state.pool.clone()).list(&context).await?))
}

/// Replace the whole tag list. Array position becomes the tag order.
///
/// PUT /api/v1/courses/:course/tags
pub async fn replace_tags(
    State(state): State<AppState>,
    context: StaffContext,
    Json(request): Json<ReplaceTagsRequest>,
) -> Result<Json<ListTagsResponse>, ApiError> {
    request.validate()?;

    let tags = TagService::new(state.pool.clone())
        .replace_all(context, &request)
        .await?;
    Ok(Json(tags))
}
