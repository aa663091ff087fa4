use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuizError {
    #[error("Word list '{0}' not found")]
    ListNotFound(String),
    #[error("No words available")]
    EmptyList,
    #[error("Invalid list name '{0}'")]
    InvalidListName(String),
    #[error("No file uploaded")]
    NoFileAttached,
    #[error("Cannot grade an empty quiz")]
    EmptyQuiz,
    #[error("I/O error")]
    Io(#[from] std::io::Error),
    #[error("CSV error")]
    Csv(#[from] csv::Error),
    #[error("Upload error: {0}")]
    Upload(String),
}

impl IntoResponse for QuizError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            QuizError::ListNotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            QuizError::EmptyList
            | QuizError::InvalidListName(_)
            | QuizError::NoFileAttached
            | QuizError::EmptyQuiz => (StatusCode::BAD_REQUEST, self.to_string()),
            QuizError::Io(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to read word list: {}", e),
            ),
            QuizError::Csv(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to parse word list: {}", e),
            ),
            QuizError::Upload(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Upload error: {}", e),
            ),
        };

        if status.is_server_error() {
            log::error!("{}", message);
        }

        let body = json!({
            "error": message,
            "status": status.as_u16()
        });

        (status, axum::Json(body)).into_response()
    }
}

impl From<MultipartError> for QuizError {
    fn from(err: MultipartError) -> Self {
        QuizError::Upload(err.to_string())
    }
}
