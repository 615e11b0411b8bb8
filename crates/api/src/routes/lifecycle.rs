use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use serde::Deserialize;
use types::{ApprovalReport, PublishReport, ScheduledSlot, SlotId, TermId};
use utoipa::ToSchema;

use crate::error::{ApiError, ErrorBody};
use crate::state::{actor, AppState};

#[utoipa::path(
    post,
    path = "/v1/terms/{term}/approve",
    params(("term" = String, Path, description = "Term id")),
    responses(
        (status = 200, description = "Drafts moved to approved", body = ApprovalReport),
        (status = 404, description = "Unknown term", body = ErrorBody)
    )
)]
pub async fn approve(
    State(state): State<AppState>,
    Path(term): Path<String>,
    headers: HeaderMap,
) -> Result<Json<ApprovalReport>, ApiError> {
    let term = TermId::new(term);
    let actor = actor(&headers);
    let report = state
        .run(move |service| service.approve_all(&term, actor.as_ref()))
        .await?;
    Ok(Json(report))
}

#[utoipa::path(
    post,
    path = "/v1/terms/{term}/publish",
    params(("term" = String, Path, description = "Term id")),
    responses(
        (status = 200, description = "Approved slots published", body = PublishReport),
        (status = 409, description = "Integrity check failed; details list every problem", body = ErrorBody),
        (status = 422, description = "Term not active or nothing approved", body = ErrorBody)
    )
)]
pub async fn publish(
    State(state): State<AppState>,
    Path(term): Path<String>,
    headers: HeaderMap,
) -> Result<Json<PublishReport>, ApiError> {
    let term = TermId::new(term);
    let actor = actor(&headers);
    let report = state
        .run(move |service| service.publish_all(&term, actor.as_ref()))
        .await?;
    Ok(Json(report))
}

#[utoipa::path(
    post,
    path = "/v1/slots/{id}/cancel",
    params(("id" = String, Path, description = "Slot id")),
    responses(
        (status = 200, description = "Slot cancelled", body = ScheduledSlot),
        (status = 404, description = "Unknown slot", body = ErrorBody),
        (status = 422, description = "Slot is published or already cancelled", body = ErrorBody)
    )
)]
pub async fn cancel(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<ScheduledSlot>, ApiError> {
    let id = SlotId::new(id);
    let actor = actor(&headers);
    let slot = state
        .run(move |service| service.cancel_slot(&id, actor.as_ref()))
        .await?;
    Ok(Json(slot))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UnpublishRequest {
    pub reason: String,
}

#[utoipa::path(
    post,
    path = "/v1/slots/{id}/unpublish",
    params(("id" = String, Path, description = "Slot id")),
    request_body = UnpublishRequest,
    responses(
        (status = 200, description = "Published slot withdrawn", body = ScheduledSlot),
        (status = 400, description = "Missing reason", body = ErrorBody),
        (status = 404, description = "Unknown slot", body = ErrorBody),
        (status = 422, description = "Slot is not published", body = ErrorBody)
    )
)]
pub async fn unpublish(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(request): Json<UnpublishRequest>,
) -> Result<Json<ScheduledSlot>, ApiError> {
    let reason = request.reason.trim().to_string();
    if reason.is_empty() {
        return Err(ApiError::bad_request("unpublishing needs a reason"));
    }
    let id = SlotId::new(id);
    let actor = actor(&headers);
    let slot = state
        .run(move |service| service.unpublish_slot(&id, &reason, actor.as_ref()))
        .await?;
    Ok(Json(slot))
}

#[utoipa::path(
    post,
    path = "/v1/slots/{id}/reactivate",
    params(("id" = String, Path, description = "Slot id")),
    responses(
        (status = 200, description = "Slot back in the schedule as a draft", body = ScheduledSlot),
        (status = 404, description = "Unknown slot", body = ErrorBody),
        (status = 409, description = "Its place has been taken since", body = ErrorBody),
        (status = 422, description = "Slot is already active", body = ErrorBody)
    )
)]
pub async fn reactivate(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<ScheduledSlot>, ApiError> {
    let id = SlotId::new(id);
    let actor = actor(&headers);
    let slot = state
        .run(move |service| service.reactivate_slot(&id, actor.as_ref()))
        .await?;
    Ok(Json(slot))
}
