//! Audio classification endpoint.
//!
//! One handler registered on both accepted paths; the upload arrives as a
//! multipart form with the audio in the `file` field.

use axum::{
    extract::{Multipart, State},
    routing::post,
    Json, Router,
};

use crate::{
    error::{ApiError, ApiResult},
    services::TriageResult,
    AppState,
};

/// POST /predict and POST /api/classify-audio
///
/// Classifies one uploaded audio clip. When the model never loaded the
/// request fails immediately with the startup diagnostics, before the
/// upload body is read at all.
pub async fn classify_audio(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<Json<TriageResult>> {
    if let Some(diag) = state.classifier.diagnostics() {
        return Err(ApiError::ModelUnavailable(diag.clone()));
    }

    let audio = read_upload(multipart).await?;
    tracing::debug!(upload_bytes = audio.len(), "received audio upload");

    // Preprocessing and inference are synchronous CPU work; keep them off
    // the async dispatch loop.
    let classifier = state.classifier.clone();
    let result = tokio::task::spawn_blocking(move || classifier.classify(&audio))
        .await
        .map_err(|e| ApiError::Internal(format!("classification task failed: {e}")))??;

    Ok(Json(result))
}

/// Pull the audio bytes out of the multipart form.
///
/// Prefers the field named `file`; falls back to the first field carrying a
/// filename so lenient clients still work.
async fn read_upload(mut multipart: Multipart) -> Result<Vec<u8>, ApiError> {
    let mut fallback: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("invalid multipart body: {e}")))?
    {
        let name = field.name().map(str::to_string);
        let has_filename = field.file_name().is_some();

        if name.as_deref() == Some("file") {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(format!("failed to read upload: {e}")))?;
            return Ok(bytes.to_vec());
        }

        if has_filename && fallback.is_none() {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(format!("failed to read upload: {e}")))?;
            fallback = Some(bytes.to_vec());
        }
    }

    fallback.ok_or_else(|| ApiError::BadRequest("no audio file in request".to_string()))
}

/// Build classification routes. Both paths share one handler.
pub fn classify_routes() -> Router<AppState> {
    Router::new()
        .route("/predict", post(classify_audio))
        .route("/api/classify-audio", post(classify_audio))
}
