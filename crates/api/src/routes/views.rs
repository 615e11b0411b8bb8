use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use types::{CareerId, GridFilter, GroupId, TeacherId, TeacherWorkload, WeeklyGrid};
use utoipa::IntoParams;

use crate::error::{ApiError, ErrorBody};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct WeeklyQuery {
    /// One of `career`, `teacher` or `group`.
    pub filter: Option<String>,
    pub id: Option<String>,
}

impl WeeklyQuery {
    pub fn into_filter(self) -> Result<Option<GridFilter>, ApiError> {
        let (filter, id) = match (self.filter, self.id) {
            (None, None) => return Ok(None),
            (Some(filter), Some(id)) => (filter, id),
            _ => return Err(ApiError::bad_request("filter and id must be given together")),
        };
        match filter.as_str() {
            "career" => Ok(Some(GridFilter::Career(CareerId::new(id)))),
            "teacher" => Ok(Some(GridFilter::Teacher(TeacherId::new(id)))),
            "group" => Ok(Some(GridFilter::Group(GroupId::new(id)))),
            other => Err(ApiError::bad_request(format!(
                "unknown filter {other}; expected career, teacher or group"
            ))),
        }
    }
}

#[utoipa::path(
    get,
    path = "/v1/schedule/weekly",
    params(WeeklyQuery),
    responses(
        (status = 200, description = "Published grid of the active term", body = WeeklyGrid),
        (status = 400, description = "Malformed filter", body = ErrorBody),
        (status = 404, description = "Filter names an unknown career, teacher or group", body = ErrorBody),
        (status = 422, description = "No active term", body = ErrorBody)
    )
)]
pub async fn weekly(
    State(state): State<AppState>,
    Query(query): Query<WeeklyQuery>,
) -> Result<Json<WeeklyGrid>, ApiError> {
    let filter = query.into_filter()?;
    let grid = state.run(move |service| service.weekly_grid(filter)).await?;
    Ok(Json(grid))
}

#[utoipa::path(
    get,
    path = "/v1/teachers/{id}/workload",
    params(("id" = String, Path, description = "Teacher id")),
    responses(
        (status = 200, description = "Published load in the active term", body = TeacherWorkload),
        (status = 404, description = "Teacher has no assignments this term", body = ErrorBody),
        (status = 422, description = "No active term", body = ErrorBody)
    )
)]
pub async fn workload(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TeacherWorkload>, ApiError> {
    let teacher = TeacherId::new(id);
    let load = state
        .run(move |service| service.teacher_workload(&teacher))
        .await?;
    Ok(Json(load))
}
