use std::sync::Arc;

use axum::Json;
use axum::extract::{Multipart, State};
use serde::Serialize;

use crate::error::QuizError;
use crate::store::WordStore;

#[derive(Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub filename: String,
}

/// Stores a CSV sent as the `csvFile` multipart field under its original
/// filename. Replacing an existing file is allowed, though an already-cached
/// list keeps serving the old rows until restart.
pub async fn upload_csv(
    State(store): State<Arc<WordStore>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, QuizError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("csvFile") {
            continue;
        }

        let filename = field
            .file_name()
            .map(str::to_string)
            .ok_or(QuizError::NoFileAttached)?;
        let bytes = field.bytes().await?;
        store.save_upload(&filename, &bytes)?;
        log::info!("Stored uploaded list {} ({} bytes)", filename, bytes.len());

        return Ok(Json(UploadResponse {
            message: "File uploaded successfully".to_string(),
            filename,
        }));
    }

    Err(QuizError::NoFileAttached)
}
