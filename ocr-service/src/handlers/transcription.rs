use crate::dtos::TranscriptionResponse;
use crate::startup::AppState;
use axum::{extract::State, Json};
use service_core::error::AppError;

/// Transcribe the configured image.
///
/// Served on both `GET /` and `POST /`. The request body and query string are
/// never read, so every caller gets the transcription of the same file.
pub async fn extract_text(
    State(state): State<AppState>,
) -> Result<Json<TranscriptionResponse>, AppError> {
    let text = state.transcriber.transcribe().await?;

    Ok(Json(TranscriptionResponse::from(text)))
}
