//! Course invitation endpoint handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use domain::models::invitation::{
    CreateInvitationRequest, CreateInvitationResponse, InvitationResponse,
    ListInvitationsResponse, PublicInvitationResponse, RedeemInvitationResponse,
    RedemptionOutcome, UpdateInvitationRequest,
};

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::StaffContext;
use crate::middleware::user_auth::UserAuth;
use crate::routes::reference_param;
use crate::services::InvitationService;

fn service(state: &AppState) -> InvitationService {
    InvitationService::new(
        state.pool.clone(),
        state.config.clone(),
        state.email_worker.clone(),
    )
}

/// GET /api/v1/courses/:course/invitations
pub async fn list_invitations(
    State(state): State<AppState>,
    context: StaffContext,
) -> Result<Json<ListInvitationsResponse>, ApiError> {
    Ok(Json(service(&state).list(context).await?))
}

/// Create a link invitation or invite a list of email addresses.
///
/// POST /api/v1/courses/:course/invitations
pub async fn create_invitation(
    State(state): State<AppState>,
    context: StaffContext,
    Json(request): Json<CreateInvitationRequest>,
) -> Result<(StatusCode, Json<CreateInvitationResponse>), ApiError> {
    request.validate()?;

    let response = service(&state).create(context, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/v1/courses/:course/invitations/:invitation/resend
pub async fn resend_invitation(
    State(state): State<AppState>,
    context: StaffContext,
    Path((_, invitation)): Path<(String, String)>,
) -> Result<Json<InvitationResponse>, ApiError> {
    let reference = reference_param(&invitation, "Invitation")?;
    Ok(Json(service(&state).resend(context, reference).await?))
}

/// Change the role or the expiration of an invitation.
///
/// PATCH /api/v1/courses/:course/invitations/:invitation
pub async fn update_invitation(
    State(state): State<AppState>,
    context: StaffContext,
    Path((_, invitation)): Path<(String, String)>,
    Json(request): Json<UpdateInvitationRequest>,
) -> Result<Json<InvitationResponse>, ApiError> {
    let reference = reference_param(&invitation, "Invitation")?;
    Ok(Json(service(&state).update(context, reference, request).await?))
}

/// Public view of an invitation. No session required.
///
/// GET /api/v1/courses/:course/invitations/:invitation
pub async fn show_invitation(
    State(state): State<AppState>,
    Path((course, invitation)): Path<(String, String)>,
) -> Result<Json<PublicInvitationResponse>, ApiError> {
    let course = reference_param(&course, "Invitation")?;
    let invitation = reference_param(&invitation, "Invitation")?;
    Ok(Json(service(&state).show(course, invitation).await?))
}

/// Join the course as the signed-in user.
///
/// POST /api/v1/courses/:course/invitations/:invitation/redeem
pub async fn redeem_invitation(
    State(state): State<AppState>,
    user: UserAuth,
    Path((course, invitation)): Path<(String, String)>,
) -> Result<(StatusCode, Json<RedeemInvitationResponse>), ApiError> {
    let course = reference_param(&course, "Invitation")?;
    let invitation = reference_param(&invitation, "Invitation")?;

    let response = service(&state).redeem(&user, course, invitation).await?;
    let status = match response.outcome {
        RedemptionOutcome::Enrolled => StatusCode::CREATED,
        RedemptionOutcome::AlreadyEnrolled => StatusCode::OK,
    };
    Ok((status, Json(response)))
}
