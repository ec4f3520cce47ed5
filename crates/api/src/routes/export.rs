//! Course export endpoint handler.

use axum::{extract::State, Json};

use domain::models::export::CourseExport;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::StaffContext;
use crate::services::ExportService;

/// Anonymized questions and answers of a course.
///
/// GET /api/v1/courses/:course/export
pub async fn export_course(
    State(state): State<AppState>,
    context: StaffContext,
) -> Result<Json<CourseExport>, ApiError> {
    Ok(Json(ExportService::new(state.pool.clone()).export(context).await?))
}
