use crate::{
    dtos::enrollment::{
        CreateEnrollmentRequest, EnrollmentQueryParams, EnrollmentResponse,
        UpdateEnrollmentRequest,
    },
    error::ApiResult,
    extract::Authenticated,
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use database::services::enrollments::{
    EnrollmentChanges, EnrollmentFilter, EnrollmentService, NewEnrollment,
};
use uuid::Uuid;

/// List enrollments
#[utoipa::path(
    get,
    path = "/enrollments",
    params(EnrollmentQueryParams),
    responses(
        (status = 200, description = "Enrollments", body = [EnrollmentResponse])
    ),
    tag = "Enrollments"
)]
pub async fn list_enrollments(
    State(state): State<AppState>,
    Query(params): Query<EnrollmentQueryParams>,
) -> ApiResult<Json<Vec<EnrollmentResponse>>> {
    let enrollments = EnrollmentService::list(
        &state.db,
        EnrollmentFilter {
            student_id: params.student_id,
            class_section_id: params.class_section_id,
        },
    )
    .await?;

    Ok(Json(enrollments.into_iter().map(Into::into).collect()))
}

/// Get an enrollment by ID
#[utoipa::path(
    get,
    path = "/enrollments/{id}",
    params(("id" = Uuid, Path, description = "Enrollment ID")),
    responses(
        (status = 200, description = "Enrollment found", body = EnrollmentResponse),
        (status = 404, description = "Enrollment not found")
    ),
    tag = "Enrollments"
)]
pub async fn get_enrollment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<EnrollmentResponse>> {
    Ok(Json(EnrollmentService::get(&state.db, id).await?.into()))
}

/// Enroll a student in a class section
#[utoipa::path(
    post,
    path = "/enrollments",
    request_body = CreateEnrollmentRequest,
    responses(
        (status = 201, description = "Enrollment created", body = EnrollmentResponse),
        (status = 400, description = "Invalid or duplicate enrollment"),
        (status = 403, description = "Not an administrator or coordinator")
    ),
    security(("token" = [])),
    tag = "Enrollments"
)]
pub async fn create_enrollment(
    State(state): State<AppState>,
    caller: Authenticated,
    Json(body): Json<CreateEnrollmentRequest>,
) -> ApiResult<(StatusCode, Json<EnrollmentResponse>)> {
    let enrollment = EnrollmentService::create(
        &state.db,
        &caller.identity,
        NewEnrollment {
            student_id: body.student_id,
            class_section_id: body.class_section_id,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(enrollment.into())))
}

/// Move an enrollment to another student or class section
#[utoipa::path(
    patch,
    path = "/enrollments/{id}",
    params(("id" = Uuid, Path, description = "Enrollment ID")),
    request_body = UpdateEnrollmentRequest,
    responses(
        (status = 200, description = "Enrollment updated", body = EnrollmentResponse),
        (status = 400, description = "Invalid or duplicate enrollment"),
        (status = 403, description = "Not an administrator or coordinator"),
        (status = 404, description = "Enrollment not found")
    ),
    security(("token" = [])),
    tag = "Enrollments"
)]
pub async fn update_enrollment(
    State(state): State<AppState>,
    caller: Authenticated,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateEnrollmentRequest>,
) -> ApiResult<Json<EnrollmentResponse>> {
    let enrollment = EnrollmentService::update(
        &state.db,
        &caller.identity,
        id,
        EnrollmentChanges {
            student_id: body.student_id,
            class_section_id: body.class_section_id,
        },
    )
    .await?;

    Ok(Json(enrollment.into()))
}

/// Delete an enrollment with its attendance records
#[utoipa::path(
    delete,
    path = "/enrollments/{id}",
    params(("id" = Uuid, Path, description = "Enrollment ID")),
    responses(
        (status = 204, description = "Enrollment deleted"),
        (status = 403, description = "Not an administrator"),
        (status = 404, description = "Enrollment not found")
    ),
    security(("token" = [])),
    tag = "Enrollments"
)]
pub async fn delete_enrollment(
    State(state): State<AppState>,
    caller: Authenticated,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    EnrollmentService::delete(&state.db, &caller.identity, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
