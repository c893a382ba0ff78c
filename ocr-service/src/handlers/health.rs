use crate::services::get_metrics;
use crate::startup::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use service_core::error::AppError;

pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "ocr-service",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Ready when the OCR engine can be invoked and the configured image exists.
pub async fn readiness_check(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    let transcriber = &state.transcriber;

    if let Err(e) = transcriber.recognizer().health_check().await {
        tracing::warn!(
            engine = %transcriber.recognizer().name(),
            error = %e,
            "OCR engine not ready"
        );
        return Err(AppError::ServiceUnavailable);
    }

    match tokio::fs::metadata(transcriber.image_path()).await {
        Ok(meta) if meta.is_file() => Ok(StatusCode::OK),
        Ok(_) | Err(_) => {
            tracing::warn!(
                image_path = ?transcriber.image_path(),
                "Configured image is missing"
            );
            Err(AppError::ServiceUnavailable)
        }
    }
}

pub async fn metrics_endpoint() -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        get_metrics(),
    )
}
