use crate::{
    dtos::student::{
        CreateStudentRequest, StudentQueryParams, StudentResponse, UpdateStudentRequest,
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
use database::services::students::{NewStudent, StudentChanges, StudentFilter, StudentService};
use uuid::Uuid;

/// List students
#[utoipa::path(
    get,
    path = "/students",
    params(StudentQueryParams),
    responses(
        (status = 200, description = "Students", body = [StudentResponse])
    ),
    tag = "Students"
)]
pub async fn list_students(
    State(state): State<AppState>,
    Query(params): Query<StudentQueryParams>,
) -> ApiResult<Json<Vec<StudentResponse>>> {
    let students = StudentService::list(
        &state.db,
        StudentFilter {
            course: params.course,
            gender: params.gender,
            search: params.search,
        },
    )
    .await?;

    Ok(Json(students.into_iter().map(Into::into).collect()))
}

/// Get a student by ID
#[utoipa::path(
    get,
    path = "/students/{id}",
    params(("id" = Uuid, Path, description = "Student ID")),
    responses(
        (status = 200, description = "Student found", body = StudentResponse),
        (status = 404, description = "Student not found")
    ),
    tag = "Students"
)]
pub async fn get_student(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<StudentResponse>> {
    Ok(Json(StudentService::get(&state.db, id).await?.into()))
}

/// Create a student; an account is provisioned for it
#[utoipa::path(
    post,
    path = "/students",
    request_body = CreateStudentRequest,
    responses(
        (status = 201, description = "Student created", body = StudentResponse),
        (status = 400, description = "Invalid student"),
        (status = 403, description = "Not an administrator or coordinator")
    ),
    security(("token" = [])),
    tag = "Students"
)]
pub async fn create_student(
    State(state): State<AppState>,
    caller: Authenticated,
    Json(body): Json<CreateStudentRequest>,
) -> ApiResult<(StatusCode, Json<StudentResponse>)> {
    let student = StudentService::create(
        &state.db,
        &state.policy,
        &caller.identity,
        NewStudent {
            name: body.name,
            enrollment_code: body.enrollment_code,
            email: body.email,
            course: body.course,
            birth_date: body.birth_date,
            gender: body.gender,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(student.into())))
}

/// Update a student
#[utoipa::path(
    patch,
    path = "/students/{id}",
    params(("id" = Uuid, Path, description = "Student ID")),
    request_body = UpdateStudentRequest,
    responses(
        (status = 200, description = "Student updated", body = StudentResponse),
        (status = 403, description = "Not an administrator or coordinator"),
        (status = 404, description = "Student not found")
    ),
    security(("token" = [])),
    tag = "Students"
)]
pub async fn update_student(
    State(state): State<AppState>,
    caller: Authenticated,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateStudentRequest>,
) -> ApiResult<Json<StudentResponse>> {
    let student = StudentService::update(
        &state.db,
        &caller.identity,
        id,
        StudentChanges {
            name: body.name,
            enrollment_code: body.enrollment_code,
            email: body.email.map(Some),
            course: body.course,
            birth_date: body.birth_date,
            gender: body.gender,
        },
    )
    .await?;

    Ok(Json(student.into()))
}

/// Delete a student with its enrollments and attendance
#[utoipa::path(
    delete,
    path = "/students/{id}",
    params(("id" = Uuid, Path, description = "Student ID")),
    responses(
        (status = 204, description = "Student deleted"),
        (status = 403, description = "Not an administrator"),
        (status = 404, description = "Student not found")
    ),
    security(("token" = [])),
    tag = "Students"
)]
pub async fn delete_student(
    State(state): State<AppState>,
    caller: Authenticated,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    StudentService::delete(&state.db, &caller.identity, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
