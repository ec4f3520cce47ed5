//! Course participant endpoint handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use domain::models::participant::{
    ListParticipantsResponse, ParticipantResponse, UpdateParticipantRequest,
};

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::CourseContext;
use crate::routes::reference_param;
use crate::services::MembershipService;

/// List the participants of a course, course staff first.
///
/// GET /api/v1/courses/:course/participants
pub async fn list_participants(
    State(state): State<AppState>,
    context: CourseContext,
) -> Result<Json<ListParticipantsResponse>, ApiError> {
    let participants = MembershipService::new(state.pool.clone())
        .list(&context)
        .await?;
    Ok(Json(participants))
}

/// Change a participant's role (course staff) or one's own accent color.
///
/// PATCH /api/v1/courses/:course/participants/:participant
pub async fn update_participant(
    State(state): State<AppState>,
    context: CourseContext,
    Path((_, participant)): Path<(String, String)>,
    Json(request): Json<UpdateParticipantRequest>,
) -> Result<Json<ParticipantResponse>, ApiError> {
    let reference = reference_param(&participant, "Participant")?;

    let participant = MembershipService::new(state.pool.clone())
        .update(&context, reference, &request)
        .await?;
    Ok(Json(participant))
}

/// Remove a participant, or leave the course when the participant is the caller.
///
/// DELETE /api/v1/courses/:course/participants/:participant
pub async fn remove_participant(
    State(state): State<AppState>,
    context: CourseContext,
    Path((_, participant)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    let reference = reference_param(&participant, "Participant")?;

    MembershipService::new(state.pool.clone())
        .remove(&context, reference)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
