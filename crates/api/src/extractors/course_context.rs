//! Course context extractors.
//!
//! Resolve the `:course` path segment, the signed-in user, and that user's
//! participant row into one value that handlers pass to services.

use std::collections::HashMap;

use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
};

use domain::models::{Course, CourseParticipant, CourseRole};
use domain::services::require_course_staff;
use persistence::repositories::{CourseParticipantRepository, CourseRepository};
use shared::crypto::parse_reference;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::user_auth::UserAuth;

/// Name of the path parameter holding the course reference.
pub const COURSE_PARAM: &str = "course";

/// Reads and checks the course reference from the path parameters.
pub fn course_reference(params: &HashMap<String, String>) -> Result<&str, ApiError> {
    params
        .get(COURSE_PARAM)
        .and_then(|value| parse_reference(value).ok())
        .ok_or_else(course_not_found)
}

fn course_not_found() -> ApiError {
    ApiError::NotFound("Course not found".to_string())
}

/// A signed-in participant acting on one of their courses.
#[derive(Debug, Clone)]
pub struct CourseContext {
    pub user: UserAuth,
    pub course: Course,
    pub participant: CourseParticipant,
}

impl CourseContext {
    pub fn role(&self) -> CourseRole {
        self.participant.course_role
    }

    pub fn is_course_staff(&self) -> bool {
        self.participant.is_course_staff()
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CourseContext {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = UserAuth::from_request_parts(parts, state).await?;

        let Path(params) = Path::<HashMap<String, String>>::from_request_parts(parts, state)
            .await
            .map_err(|_| course_not_found())?;
        let reference = course_reference(&params)?;

        let course: Course = CourseRepository::new(state.pool.clone())
            .find_by_reference(reference)
            .await?
            .ok_or_else(course_not_found)?
            .into();

        // Non-participants cannot tell a foreign course from a missing one
        let participant: CourseParticipant = CourseParticipantRepository::new(state.pool.clone())
            .find_by_course_and_user(course.id, user.user_id)
            .await?
            .ok_or_else(course_not_found)?
            .into();

        Ok(Self {
            user,
            course,
            participant,
        })
    }
}

/// A course context whose participant is course staff.
#[derive(Debug, Clone)]
pub struct StaffContext(pub CourseContext);

#[async_trait]
impl FromRequestParts<AppState> for StaffContext {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let context = CourseContext::from_request_parts(parts, state).await?;
        require_course_staff(&context.participant)?;
        Ok(Self(context))
    }
}
