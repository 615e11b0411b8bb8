use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sched_core::{RepositoryError, ScheduleError, ValidationError};
use serde::Serialize;
use serde_json::json;
use tracing::error;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub details: Option<serde_json::Value>,
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                error: message.into(),
                kind: None,
                details: None,
            },
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    fn kind(mut self, kind: &str) -> Self {
        self.body.kind = Some(kind.to_string());
        self
    }

    fn details(mut self, details: serde_json::Value) -> Self {
        self.body.details = Some(details);
        self
    }
}

fn validation_status(err: &ValidationError) -> StatusCode {
    match err {
        ValidationError::UnknownTerm(_)
        | ValidationError::UnknownCareer(_)
        | ValidationError::UnknownAssignment(_)
        | ValidationError::UnknownRoom(_)
        | ValidationError::UnknownBlock(_)
        | ValidationError::UnknownGroup(_)
        | ValidationError::UnknownTeacher(_)
        | ValidationError::UnknownSlot(_) => StatusCode::NOT_FOUND,
        ValidationError::InactiveAssignment(_)
        | ValidationError::TermMismatch { .. }
        | ValidationError::NoAssignments(_) => StatusCode::BAD_REQUEST,
    }
}

impl From<ScheduleError> for ApiError {
    fn from(err: ScheduleError) -> Self {
        let message = err.to_string();
        match err {
            ScheduleError::Validation(v) => Self::new(validation_status(&v), message),
            ScheduleError::Conflict(conflict) => {
                let api = Self::new(StatusCode::CONFLICT, message).kind(conflict.kind());
                match conflict.competing_slot() {
                    Some(slot) => api.details(json!({ "competingSlot": slot })),
                    None => api,
                }
            }
            ScheduleError::Integrity(integrity) => {
                let details = serde_json::to_value(&integrity).unwrap_or_default();
                Self::new(StatusCode::CONFLICT, message)
                    .kind("integrity")
                    .details(details)
            }
            ScheduleError::Lifecycle(_) => Self::new(StatusCode::UNPROCESSABLE_ENTITY, message),
            ScheduleError::Repository(RepositoryError::TermBusy(_)) => {
                Self::new(StatusCode::CONFLICT, message).kind("termBusy")
            }
            ScheduleError::Repository(_) | ScheduleError::Catalog(_) => {
                error!(error = %message, "storage failure");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
            }
            ScheduleError::BudgetExceeded { processed, total } => {
                Self::new(StatusCode::GATEWAY_TIMEOUT, message)
                    .details(json!({ "processed": processed, "total": total }))
            }
        }
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        error!(error = %err, "schedule task did not finish");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "schedule task did not finish")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
