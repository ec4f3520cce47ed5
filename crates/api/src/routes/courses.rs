//! Course endpoint handlers.

use axum::{extract::State, http::StatusCode, Json};
use validator::Validate;

use domain::models::course::{
    CourseResponse, CreateCourseRequest, UpdateCourseRequest, UpdatePollsSettingRequest,
};

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{CourseContext, StaffContext};
use crate::middleware::user_auth::UserAuth;
use crate::services::CourseService;

/// Create a course with the caller as course staff.
///
/// POST /api/v1/courses
pub async fn create_course(
    State(state): State<AppState>,
    user: UserAuth,
    Json(request): Json<CreateCourseRequest>,
) -> Result<(StatusCode, Json<CourseResponse>), ApiError> {
    request.validate()?;

    let course = CourseService::new(state.pool.clone())
        .create(user.user_id, &request)
        .await?;
    Ok((StatusCode::CREATED, Json(course)))
}

/// GET /api/v1/courses/:course
pub async fn get_course(
    State(state): State<AppState>,
    context: CourseContext,
) -> Json<CourseResponse> {
    Json(CourseService::new(state.pool.clone()).show(context))
}

/// Update name, year, term, institution or code.
///
/// PATCH /api/v1/courses/:course
pub async fn update_course(
    State(state): State<AppState>,
    context: StaffContext,
    Json(request): Json<UpdateCourseRequest>,
) -> Result<Json<CourseResponse>, ApiError> {
    request.validate()?;

    let course = CourseService::new(state.pool.clone())
        .update_information(context, &request)
        .await?;
    Ok(Json(course))
}

/// POST /api/v1/courses/:course/archive
pub async fn archive_course(
    State(state): State<AppState>,
    context: StaffContext,
) -> Result<Json<CourseResponse>, ApiError> {
    let course = CourseService::new(state.pool.clone())
        .set_archived(context, true)
        .await?;
    Ok(Json(course))
}

/// POST /api/v1/courses/:course/unarchive
pub async fn unarchive_course(
    State(state): State<AppState>,
    context: StaffContext,
) -> Result<Json<CourseResponse>, ApiError> {
    let course = CourseService::new(state.pool.clone())
        .set_archived(context, false)
        .await?;
    Ok(Json(course))
}

/// Allow or forbid students to create polls.
///
/// PUT /api/v1/courses/:course/settings/polls
pub async fn update_polls_setting(
    State(state): State<AppState>,
    context: StaffContext,
    Json(request): Json<UpdatePollsSettingRequest>,
) -> Result<Json<CourseResponse>, ApiError> {
    let course = CourseService::new(state.pool.clone())
        .set_students_may_create_polls(context, request.students_may_create_polls)
        .await?;
    Ok(Json(course))
}
