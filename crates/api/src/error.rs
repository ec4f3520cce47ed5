use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::models::course::course_path;
use domain::{DomainError, InvitationUnavailable};
use serde::Serialize;
use shared::session::SessionError;
use thiserror::Error;
use validator::{ValidationErrors, ValidationErrorsKind};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Validation error: {message}")]
    InvalidFields {
        message: String,
        details: Vec<ValidationDetail>,
    },

    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// Mutation attempted on an archived course; `redirect` is its read-only page.
    #[error("Course archived")]
    CourseArchived { redirect: String },

    #[error("Gone: {0}")]
    InvitationUnavailable(InvitationUnavailable),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Vec<ValidationDetail>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    redirect: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationDetail {
    pub field: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut details = None;
        let mut redirect = None;

        let (status, error_code, message) = match self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg),
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, "validation_error", msg),
            ApiError::InvalidFields {
                message,
                details: fields,
            } => {
                details = Some(fields);
                (StatusCode::BAD_REQUEST, "validation_error", message)
            }
            ApiError::InvariantViolation(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "invariant_violation", msg)
            }
            ApiError::CourseArchived { redirect: path } => {
                redirect = Some(path);
                (
                    StatusCode::CONFLICT,
                    "course_archived",
                    "This course is archived and can no longer be modified".to_string(),
                )
            }
            ApiError::InvitationUnavailable(reason) => {
                let code = match reason {
                    InvitationUnavailable::Used => "invitation_used",
                    InvitationUnavailable::Expired => "invitation_expired",
                };
                (StatusCode::GONE, code, reason.to_string())
            }
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".into(),
                )
            }
            ApiError::ServiceUnavailable(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, "service_unavailable", msg)
            }
        };

        let body = ErrorBody {
            error: error_code.into(),
            message,
            details,
            redirect,
        };

        (status, Json(body)).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => ApiError::Validation(msg),
            DomainError::InvariantViolation(msg) => ApiError::InvariantViolation(msg),
            DomainError::CourseArchived { course_reference } => ApiError::CourseArchived {
                redirect: course_path(&course_reference),
            },
            DomainError::NotFound(what) => ApiError::NotFound(format!("{} not found", what)),
            DomainError::ExpiredOrUsed(reason) => ApiError::InvitationUnavailable(reason),
            DomainError::Forbidden(msg) => ApiError::Forbidden(msg),
        }
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::TokenExpired => ApiError::Unauthorized("Token has expired".into()),
            SessionError::EncodingError(msg) => ApiError::Internal(msg),
            _ => ApiError::Unauthorized("Invalid token".into()),
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".into()),
            sqlx::Error::Database(db_err) => {
                if let Some(code) = db_err.code() {
                    match code.as_ref() {
                        "23505" => ApiError::Conflict("Resource already exists".into()),
                        "23503" => ApiError::NotFound("Referenced resource not found".into()),
                        _ => ApiError::Internal(format!("Database error: {}", db_err)),
                    }
                } else {
                    ApiError::Internal(format!("Database error: {}", db_err))
                }
            }
            _ => ApiError::Internal(format!("Database error: {}", err)),
        }
    }
}

fn collect_details(prefix: &str, errors: &ValidationErrors, out: &mut Vec<ValidationDetail>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", prefix, field)
        };
        match kind {
            ValidationErrorsKind::Field(list) => {
                out.extend(list.iter().map(|e| ValidationDetail {
                    field: path.clone(),
                    message: e
                        .message
                        .clone()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string()),
                }));
            }
            ValidationErrorsKind::Struct(inner) => collect_details(&path, inner, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect_details(&format!("{}[{}]", path, index), inner, out);
                }
            }
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let mut details = Vec::new();
        collect_details("", &errors, &mut details);
        details.sort_by(|a, b| a.field.cmp(&b.field));

        let message = if details.len() == 1 {
            details[0].message.clone()
        } else {
            format!("{} validation errors", details.len())
        };

        ApiError::InvalidFields { message, details }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use validator::Validate;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_status_codes() {
        let cases = [
            (ApiError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
            (ApiError::Forbidden("x".into()), StatusCode::FORBIDDEN),
            (ApiError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (ApiError::Conflict("x".into()), StatusCode::CONFLICT),
            (ApiError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (
                ApiError::InvariantViolation("x".into()),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                ApiError::InvitationUnavailable(InvitationUnavailable::Used),
                StatusCode::GONE,
            ),
            (ApiError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (
                ApiError::ServiceUnavailable("x".into()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
        ];
        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }

    #[tokio::test]
    async fn test_course_archived_carries_redirect() {
        let error: ApiError = DomainError::CourseArchived {
            course_reference: "1234567890".to_string(),
        }
        .into();
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let body = body_json(response).await;
        assert_eq!(body["error"], "course_archived");
        assert_eq!(body["redirect"], "/courses/1234567890");
    }

    #[tokio::test]
    async fn test_invitation_unavailable_codes() {
        let used: ApiError = DomainError::ExpiredOrUsed(InvitationUnavailable::Used).into();
        assert_eq!(body_json(used.into_response()).await["error"], "invitation_used");

        let expired: ApiError = DomainError::ExpiredOrUsed(InvitationUnavailable::Expired).into();
        assert_eq!(
            body_json(expired.into_response()).await["error"],
            "invitation_expired"
        );
    }

    #[test]
    fn test_from_domain_error() {
        assert!(matches!(
            ApiError::from(DomainError::last_course_staff()),
            ApiError::InvariantViolation(_)
        ));
        assert!(matches!(
            ApiError::from(DomainError::NotFound("Tag")),
            ApiError::NotFound(msg) if msg == "Tag not found"
        ));
        assert!(matches!(
            ApiError::from(DomainError::Forbidden("no".into())),
            ApiError::Forbidden(_)
        ));
    }

    #[test]
    fn test_from_session_error() {
        assert!(matches!(
            ApiError::from(SessionError::TokenExpired),
            ApiError::Unauthorized(msg) if msg == "Token has expired"
        ));
        assert!(matches!(
            ApiError::from(SessionError::InvalidToken),
            ApiError::Unauthorized(_)
        ));
    }

    #[test]
    fn test_from_sqlx_row_not_found() {
        let error: ApiError = sqlx::Error::RowNotFound.into();
        match error {
            ApiError::NotFound(msg) => assert_eq!(msg, "Resource not found"),
            _ => panic!("Expected NotFound error"),
        }
    }

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 1, message = "Name is required"))]
        name: String,
    }

    #[tokio::test]
    async fn test_validation_errors_include_details() {
        let errors = Sample {
            name: String::new(),
        }
        .validate()
        .unwrap_err();

        let response = ApiError::from(errors).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["message"], "Name is required");
        assert_eq!(body["details"][0]["field"], "name");
    }

    #[test]
    fn test_api_error_display() {
        assert_eq!(
            format!("{}", ApiError::Unauthorized("test".to_string())),
            "Unauthorized: test"
        );
        assert_eq!(
            format!("{}", ApiError::InvariantViolation("test".to_string())),
            "Invariant violation: test"
        );
    }
}
