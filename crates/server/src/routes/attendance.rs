use crate::{
    dtos::attendance::{
        AttendanceQueryParams, AttendanceResponse, CreateAttendanceRequest,
        UpdateAttendanceRequest,
    },
    error::ApiResult,
    extract::{Authenticated, Caller},
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use database::services::attendance::{
    AttendanceChanges, AttendanceFilter, AttendanceService, NewAttendance,
};
use uuid::Uuid;

/// List the attendance records visible to the caller
#[utoipa::path(
    get,
    path = "/attendance",
    params(AttendanceQueryParams),
    responses(
        (status = 200, description = "Visible attendance records", body = [AttendanceResponse])
    ),
    security((), ("token" = [])),
    tag = "Attendance"
)]
pub async fn list_attendance(
    State(state): State<AppState>,
    caller: Caller,
    Query(params): Query<AttendanceQueryParams>,
) -> ApiResult<Json<Vec<AttendanceResponse>>> {
    let records = AttendanceService::list(
        &state.db,
        &caller.identity,
        AttendanceFilter {
            status: params.status,
            date: params.date,
            class_section_id: params.class_section_id,
            search: params.search,
        },
    )
    .await?;

    Ok(Json(records.into_iter().map(Into::into).collect()))
}

/// Get a visible attendance record
#[utoipa::path(
    get,
    path = "/attendance/{id}",
    params(("id" = Uuid, Path, description = "Attendance record ID")),
    responses(
        (status = 200, description = "Attendance record found", body = AttendanceResponse),
        (status = 404, description = "Attendance record not found or not visible")
    ),
    security((), ("token" = [])),
    tag = "Attendance"
)]
pub async fn get_attendance(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<AttendanceResponse>> {
    Ok(Json(
        AttendanceService::get(&state.db, &caller.identity, id)
            .await?
            .into(),
    ))
}

/// Record attendance; the enrollment's percentage is recomputed
#[utoipa::path(
    post,
    path = "/attendance",
    request_body = CreateAttendanceRequest,
    responses(
        (status = 201, description = "Attendance recorded", body = AttendanceResponse),
        (status = 400, description = "Invalid or duplicate record"),
        (status = 403, description = "Caller does not teach this class section")
    ),
    security(("token" = [])),
    tag = "Attendance"
)]
pub async fn create_attendance(
    State(state): State<AppState>,
    caller: Authenticated,
    Json(body): Json<CreateAttendanceRequest>,
) -> ApiResult<(StatusCode, Json<AttendanceResponse>)> {
    let record = AttendanceService::create(
        &state.db,
        &caller.identity,
        NewAttendance {
            enrollment_id: body.enrollment_id,
            date: body.date,
            status: body.status,
            note: body.note,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(record.into())))
}

/// Update an attendance record; the enrollment's percentage is recomputed
#[utoipa::path(
    patch,
    path = "/attendance/{id}",
    params(("id" = Uuid, Path, description = "Attendance record ID")),
    request_body = UpdateAttendanceRequest,
    responses(
        (status = 200, description = "Attendance updated", body = AttendanceResponse),
        (status = 400, description = "Duplicate date"),
        (status = 403, description = "Caller does not teach this class section"),
        (status = 404, description = "Attendance record not found or not visible")
    ),
    security(("token" = [])),
    tag = "Attendance"
)]
pub async fn update_attendance(
    State(state): State<AppState>,
    caller: Authenticated,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateAttendanceRequest>,
) -> ApiResult<Json<AttendanceResponse>> {
    let record = AttendanceService::update(
        &state.db,
        &caller.identity,
        id,
        AttendanceChanges {
            date: body.date,
            status: body.status,
            note: body.note,
        },
    )
    .await?;

    Ok(Json(record.into()))
}

/// Delete an attendance record; the enrollment's percentage is recomputed
#[utoipa::path(
    delete,
    path = "/attendance/{id}",
    params(("id" = Uuid, Path, description = "Attendance record ID")),
    responses(
        (status = 204, description = "Attendance record deleted"),
        (status = 403, description = "Caller does not teach this class section"),
        (status = 404, description = "Attendance record not found or not visible")
    ),
    security(("token" = [])),
    tag = "Attendance"
)]
pub async fn delete_attendance(
    State(state): State<AppState>,
    caller: Authenticated,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    AttendanceService::delete(&state.db, &caller.identity, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
