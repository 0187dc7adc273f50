use crate::calendar::CalendarError;
use crate::password::PasswordError;
use crate::storage::StoreError;
use crate::tracked::TrackError;
use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    Json,
};
use serde_json::json;
use tracing::error;
use validator::ValidationErrors;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Unauthorized")]
    Unauthenticated,
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    FutureDate(String),
    #[error("storage failure: {0}")]
    Storage(String),
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn habit_not_found() -> Self {
        Self::NotFound("Habit not found or unauthorized".into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthenticated | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::Validation(_) | Self::FutureDate(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<TrackError> for AppError {
    fn from(err: TrackError) -> Self {
        match err {
            TrackError::InvalidDate(_) => Self::Validation("Invalid date format. Use YYYY-MM-DD".into()),
            TrackError::FutureDate(_) => Self::FutureDate("Cannot track a date in the future".into()),
        }
    }
}

impl From<CalendarError> for AppError {
    fn from(err: CalendarError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::HabitNotFound => Self::habit_not_found(),
            StoreError::DuplicateEmail => {
                Self::Validation("An account with this email already exists".into())
            }
            other => Self::Storage(other.to_string()),
        }
    }
}

impl From<PasswordError> for AppError {
    fn from(err: PasswordError) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));

        let messages: Vec<String> = fields
            .iter()
            .flat_map(|(field, issues)| {
                issues.iter().map(move |issue| match issue.message.as_deref() {
                    Some(message) => message.to_owned(),
                    None => format!("{field} is invalid"),
                })
            })
            .collect();
        Self::Validation(messages.join("; "))
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let message = match &self {
            Self::Storage(details) => {
                error!(details = %details, "request failed");
                "Internal server error".to_owned()
            }
            other => other.to_string(),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
