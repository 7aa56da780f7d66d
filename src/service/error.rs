use crate::error::HttpError;
use axum::http::StatusCode;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Job {0} not found")]
    JobNotFound(Uuid),

    #[error("Translator not found")]
    TranslatorNotFound,

    #[error("User {0} not found")]
    UserNotFound(Uuid),

    // Field-level failure on booking creation; the field name travels to the
    // frontend so it can highlight the input.
    #[error("{message} (field: {field_name})")]
    Validation { field_name: String, message: String },

    // Double-accept race or translator already booked at that time; nothing
    // was written.
    #[error("{0}")]
    BookingConflict(String),

    #[error("{0}")]
    CancellationWindowClosed(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Notification error: {0}")]
    Notification(String),
}

impl ServiceError {
    pub fn validation(field_name: &str, message: &str) -> Self {
        ServiceError::Validation {
            field_name: field_name.to_string(),
            message: message.to_string(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::JobNotFound(_)
            | ServiceError::TranslatorNotFound
            | ServiceError::UserNotFound(_) => StatusCode::NOT_FOUND,

            ServiceError::Validation { .. } => StatusCode::BAD_REQUEST,

            ServiceError::BookingConflict(_) => StatusCode::CONFLICT,

            ServiceError::CancellationWindowClosed(_) => StatusCode::BAD_REQUEST,

            ServiceError::Database(_) | ServiceError::Notification(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<ServiceError> for HttpError {
    fn from(error: ServiceError) -> Self {
        match error {
            ServiceError::JobNotFound(_)
            | ServiceError::TranslatorNotFound
            | ServiceError::UserNotFound(_) => HttpError::not_found(error.to_string()),

            ServiceError::Validation { .. } | ServiceError::CancellationWindowClosed(_) => {
                HttpError::bad_request(error.to_string())
            }

            ServiceError::BookingConflict(_) => HttpError::conflict(error.to_string()),

            _ => HttpError::server_error(error.to_string()),
        }
    }
}
