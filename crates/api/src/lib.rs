//! HTTP surface of the timetable engine.

pub mod config;
pub mod error;
pub mod state;
pub mod telemetry;
pub mod routes {
    pub mod generate;
    pub mod health;
    pub mod lifecycle;
    pub mod slots;
    pub mod views;
}

use std::time::Duration;

use axum::{
    routing::{get, post},
    Router,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use config::{AppConfig, ConfigError};
pub use state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::health::health,
        routes::generate::generate,
        routes::lifecycle::approve,
        routes::lifecycle::publish,
        routes::lifecycle::cancel,
        routes::lifecycle::unpublish,
        routes::lifecycle::reactivate,
        routes::slots::create,
        routes::slots::get_slot,
        routes::slots::update,
        routes::slots::list_term_slots,
        routes::views::weekly,
        routes::views::workload,
    ),
    components(schemas(
        types::TermId, types::CareerId, types::TeacherId, types::GroupId, types::AssignmentId,
        types::RoomId, types::BlockId, types::SlotId, types::Weekday, types::ClassKind,
        types::SlotState, types::RoomType, types::ScheduledSlot, types::SlotCandidate,
        types::SlotPatch, types::GenerationReport, types::GenerationSummary,
        types::GenerationDetails, types::AllocationResult, types::AllocationFailure,
        types::PlacedSlot, types::Completion, types::ApprovalReport, types::PublishReport,
        types::IncompleteSlot, types::UnscheduledAssignment, types::WeeklyGrid, types::GridDay,
        types::GridCell, types::GridEntry, types::TeacherWorkload,
        error::ErrorBody,
        routes::generate::GenerateRequest,
        routes::lifecycle::UnpublishRequest,
    )),
    tags(
        (name = "timetable", description = "Timetable generation and publishing API")
    )
)]
pub struct ApiDoc;

/// Every route plus the docs, wrapped in the shared middleware stack.
pub fn router(state: AppState, timeout: Duration) -> Router {
    Router::new()
        .route("/v1/health", get(routes::health::health))
        .route("/v1/terms/:term/generate", post(routes::generate::generate))
        .route("/v1/terms/:term/approve", post(routes::lifecycle::approve))
        .route("/v1/terms/:term/publish", post(routes::lifecycle::publish))
        .route("/v1/terms/:term/slots", get(routes::slots::list_term_slots))
        .route("/v1/slots", post(routes::slots::create))
        .route(
            "/v1/slots/:id",
            get(routes::slots::get_slot).put(routes::slots::update),
        )
        .route("/v1/slots/:id/cancel", post(routes::lifecycle::cancel))
        .route("/v1/slots/:id/unpublish", post(routes::lifecycle::unpublish))
        .route("/v1/slots/:id/reactivate", post(routes::lifecycle::reactivate))
        .route("/v1/schedule/weekly", get(routes::views::weekly))
        .route("/v1/teachers/:id/workload", get(routes::views::workload))
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
        .layer(telemetry::stack(timeout))
        .with_state(state)
}
