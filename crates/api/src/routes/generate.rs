use axum::{
    body::Bytes,
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use serde::Deserialize;
use types::{CareerId, GenerationReport, TermId};
use utoipa::ToSchema;

use crate::error::{ApiError, ErrorBody};
use crate::state::{actor, AppState};

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    /// Restricts the run to one career's assignments.
    pub career_id: Option<CareerId>,
}

#[utoipa::path(
    post,
    path = "/v1/terms/{term}/generate",
    params(("term" = String, Path, description = "Term id")),
    request_body(content = GenerateRequest, description = "Omit the body to schedule every career"),
    responses(
        (status = 200, description = "Run summary; failed assignments are listed, not raised", body = GenerationReport),
        (status = 400, description = "Malformed body or nothing to schedule", body = ErrorBody),
        (status = 404, description = "Unknown term or career", body = ErrorBody),
        (status = 409, description = "Another operation holds the term", body = ErrorBody),
        (status = 504, description = "Time budget exhausted; nothing saved", body = ErrorBody)
    )
)]
pub async fn generate(
    State(state): State<AppState>,
    Path(term): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<GenerationReport>, ApiError> {
    let request: GenerateRequest = if body.iter().all(u8::is_ascii_whitespace) {
        GenerateRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| ApiError::bad_request(e.to_string()))?
    };
    let term = TermId::new(term);
    let actor = actor(&headers);

    let report = state
        .run(move |service| service.generate(&term, request.career_id.as_ref(), actor.as_ref()))
        .await?;
    Ok(Json(report))
}
