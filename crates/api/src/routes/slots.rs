use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use types::{ScheduledSlot, SlotCandidate, SlotId, SlotPatch, TermId};

use crate::error::{ApiError, ErrorBody};
use crate::state::{actor, AppState};

#[utoipa::path(
    post,
    path = "/v1/slots",
    request_body = SlotCandidate,
    responses(
        (status = 201, description = "Draft slot created", body = ScheduledSlot),
        (status = 404, description = "Unknown assignment, room or block", body = ErrorBody),
        (status = 409, description = "Candidate conflicts with the schedule", body = ErrorBody)
    )
)]
pub async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(candidate): Json<SlotCandidate>,
) -> Result<(StatusCode, Json<ScheduledSlot>), ApiError> {
    let actor = actor(&headers);
    let slot = state
        .run(move |service| service.create_slot(&candidate, actor.as_ref()))
        .await?;
    Ok((StatusCode::CREATED, Json(slot)))
}

#[utoipa::path(
    get,
    path = "/v1/slots/{id}",
    params(("id" = String, Path, description = "Slot id")),
    responses(
        (status = 200, body = ScheduledSlot),
        (status = 404, description = "Unknown slot", body = ErrorBody)
    )
)]
pub async fn get_slot(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ScheduledSlot>, ApiError> {
    let id = SlotId::new(id);
    let slot = state.run(move |service| service.get_slot(&id)).await?;
    Ok(Json(slot))
}

#[utoipa::path(
    put,
    path = "/v1/slots/{id}",
    params(("id" = String, Path, description = "Slot id")),
    request_body = SlotPatch,
    responses(
        (status = 200, description = "Slot moved; its state is kept", body = ScheduledSlot),
        (status = 404, description = "Unknown slot, room or block", body = ErrorBody),
        (status = 409, description = "New placement conflicts", body = ErrorBody),
        (status = 422, description = "Slot cannot be edited in its state", body = ErrorBody)
    )
)]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(patch): Json<SlotPatch>,
) -> Result<Json<ScheduledSlot>, ApiError> {
    let id = SlotId::new(id);
    let actor = actor(&headers);
    let slot = state
        .run(move |service| service.update_slot(&id, &patch, actor.as_ref()))
        .await?;
    Ok(Json(slot))
}

#[utoipa::path(
    get,
    path = "/v1/terms/{term}/slots",
    params(("term" = String, Path, description = "Term id")),
    responses(
        (status = 200, description = "Every stored slot of the term", body = [ScheduledSlot]),
        (status = 404, description = "Unknown term", body = ErrorBody)
    )
)]
pub async fn list_term_slots(
    State(state): State<AppState>,
    Path(term): Path<String>,
) -> Result<Json<Vec<ScheduledSlot>>, ApiError> {
    let term = TermId::new(term);
    let slots = state.run(move |service| service.list_slots(&term)).await?;
    Ok(Json(slots))
}
