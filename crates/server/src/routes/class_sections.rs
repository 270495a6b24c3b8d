use crate::{
    dtos::{
        class_section::{
            AssignProfessorRequest, CreateSectionRequest, DashboardResponse,
            EnrollStudentRequest, RepresentativeRequest, SectionQueryParams, SectionResponse,
            UpdateSectionRequest,
        },
        enrollment::EnrollmentResponse,
        student::StudentSummary,
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
use database::services::class_sections::{
    ClassSectionService, NewSection, SectionChanges, SectionFilter,
};
use uuid::Uuid;

/// List the class sections visible to the caller
#[utoipa::path(
    get,
    path = "/class-sections",
    params(SectionQueryParams),
    responses(
        (status = 200, description = "Visible class sections", body = [SectionResponse])
    ),
    security((), ("token" = [])),
    tag = "Class sections"
)]
pub async fn list_sections(
    State(state): State<AppState>,
    caller: Caller,
    Query(params): Query<SectionQueryParams>,
) -> ApiResult<Json<Vec<SectionResponse>>> {
    let sections = ClassSectionService::list(
        &state.db,
        &caller.identity,
        SectionFilter {
            status: params.status,
            professor_id: params.professor_id,
            search: params.search,
        },
    )
    .await?;

    Ok(Json(sections.into_iter().map(Into::into).collect()))
}

/// Get a visible class section
#[utoipa::path(
    get,
    path = "/class-sections/{id}",
    params(("id" = Uuid, Path, description = "Class section ID")),
    responses(
        (status = 200, description = "Class section found", body = SectionResponse),
        (status = 404, description = "Class section not found or not visible")
    ),
    security((), ("token" = [])),
    tag = "Class sections"
)]
pub async fn get_section(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<SectionResponse>> {
    Ok(Json(
        ClassSectionService::get(&state.db, &caller.identity, id)
            .await?
            .into(),
    ))
}

/// Create a class section
#[utoipa::path(
    post,
    path = "/class-sections",
    request_body = CreateSectionRequest,
    responses(
        (status = 201, description = "Class section created", body = SectionResponse),
        (status = 400, description = "Invalid class section"),
        (status = 403, description = "Not an administrator or coordinator")
    ),
    security(("token" = [])),
    tag = "Class sections"
)]
pub async fn create_section(
    State(state): State<AppState>,
    caller: Authenticated,
    Json(body): Json<CreateSectionRequest>,
) -> ApiResult<(StatusCode, Json<SectionResponse>)> {
    let section = ClassSectionService::create(
        &state.db,
        &caller.identity,
        NewSection {
            name: body.name,
            description: body.description,
            professor_id: body.professor_id,
            start_date: body.start_date,
            end_date: body.end_date,
            status: body.status,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(section.into())))
}

/// Update a class section
#[utoipa::path(
    patch,
    path = "/class-sections/{id}",
    params(("id" = Uuid, Path, description = "Class section ID")),
    request_body = UpdateSectionRequest,
    responses(
        (status = 200, description = "Class section updated", body = SectionResponse),
        (status = 400, description = "Invalid class section"),
        (status = 403, description = "Not an administrator or coordinator"),
        (status = 404, description = "Class section not found")
    ),
    security(("token" = [])),
    tag = "Class sections"
)]
pub async fn update_section(
    State(state): State<AppState>,
    caller: Authenticated,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateSectionRequest>,
) -> ApiResult<Json<SectionResponse>> {
    let section = ClassSectionService::update(
        &state.db,
        &caller.identity,
        id,
        SectionChanges {
            name: body.name,
            description: body.description,
            professor_id: body.professor_id,
            start_date: body.start_date,
            end_date: body.end_date,
            status: body.status,
        },
    )
    .await?;

    Ok(Json(section.into()))
}

/// Delete a class section with its enrollments and attendance
#[utoipa::path(
    delete,
    path = "/class-sections/{id}",
    params(("id" = Uuid, Path, description = "Class section ID")),
    responses(
        (status = 204, description = "Class section deleted"),
        (status = 403, description = "Not an administrator"),
        (status = 404, description = "Class section not found")
    ),
    security(("token" = [])),
    tag = "Class sections"
)]
pub async fn delete_section(
    State(state): State<AppState>,
    caller: Authenticated,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    ClassSectionService::delete(&state.db, &caller.identity, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Assign another professor to a class section
#[utoipa::path(
    post,
    path = "/class-sections/{id}/assign-professor",
    params(("id" = Uuid, Path, description = "Class section ID")),
    request_body = AssignProfessorRequest,
    responses(
        (status = 200, description = "Professor assigned", body = SectionResponse),
        (status = 403, description = "Not an administrator"),
        (status = 404, description = "Class section or professor not found")
    ),
    security(("token" = [])),
    tag = "Class sections"
)]
pub async fn assign_professor(
    State(state): State<AppState>,
    caller: Authenticated,
    Path(id): Path<Uuid>,
    Json(body): Json<AssignProfessorRequest>,
) -> ApiResult<Json<SectionResponse>> {
    let section =
        ClassSectionService::assign_professor(&state.db, &caller.identity, id, body.professor_id)
            .await?;

    Ok(Json(section.into()))
}

/// Enroll a student in a class section
#[utoipa::path(
    post,
    path = "/class-sections/{id}/enroll-student",
    params(("id" = Uuid, Path, description = "Class section ID")),
    request_body = EnrollStudentRequest,
    responses(
        (status = 201, description = "Student enrolled", body = EnrollmentResponse),
        (status = 400, description = "Student already enrolled"),
        (status = 403, description = "Not an administrator"),
        (status = 404, description = "Class section or student not found")
    ),
    security(("token" = [])),
    tag = "Class sections"
)]
pub async fn enroll_student(
    State(state): State<AppState>,
    caller: Authenticated,
    Path(id): Path<Uuid>,
    Json(body): Json<EnrollStudentRequest>,
) -> ApiResult<(StatusCode, Json<EnrollmentResponse>)> {
    let enrollment =
        ClassSectionService::enroll_student(&state.db, &caller.identity, id, body.student_id)
            .await?;

    Ok((StatusCode::CREATED, Json(enrollment.into())))
}

/// Set or clear the student representative
#[utoipa::path(
    post,
    path = "/class-sections/{id}/representative",
    params(("id" = Uuid, Path, description = "Class section ID")),
    request_body = RepresentativeRequest,
    responses(
        (status = 200, description = "Representative updated", body = SectionResponse),
        (status = 400, description = "Student not enrolled in the section"),
        (status = 403, description = "Not an administrator"),
        (status = 404, description = "Class section or student not found")
    ),
    security(("token" = [])),
    tag = "Class sections"
)]
pub async fn set_representative(
    State(state): State<AppState>,
    caller: Authenticated,
    Path(id): Path<Uuid>,
    Json(body): Json<RepresentativeRequest>,
) -> ApiResult<Json<SectionResponse>> {
    let section =
        ClassSectionService::set_representative(&state.db, &caller.identity, id, body.student_id)
            .await?;

    Ok(Json(section.into()))
}

/// The student representative of a visible class section
#[utoipa::path(
    get,
    path = "/class-sections/{id}/representative",
    params(("id" = Uuid, Path, description = "Class section ID")),
    responses(
        (status = 200, description = "Representative, or null when none is set", body = StudentSummary),
        (status = 404, description = "Class section not found or not visible")
    ),
    security((), ("token" = [])),
    tag = "Class sections"
)]
pub async fn get_representative(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Option<StudentSummary>>> {
    let representative = ClassSectionService::representative(&state.db, &caller.identity, id).await?;
    Ok(Json(representative.map(Into::into)))
}

/// Enrollments of a visible class section
#[utoipa::path(
    get,
    path = "/class-sections/{id}/students",
    params(("id" = Uuid, Path, description = "Class section ID")),
    responses(
        (status = 200, description = "Enrollments", body = [EnrollmentResponse]),
        (status = 404, description = "Class section not found or not visible")
    ),
    security((), ("token" = [])),
    tag = "Class sections"
)]
pub async fn list_section_students(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<EnrollmentResponse>>> {
    let roster = ClassSectionService::roster(&state.db, &caller.identity, id).await?;
    Ok(Json(roster.into_iter().map(Into::into).collect()))
}

/// Summary of a visible class section and its attendance
#[utoipa::path(
    get,
    path = "/class-sections/{id}/dashboard",
    params(("id" = Uuid, Path, description = "Class section ID")),
    responses(
        (status = 200, description = "Dashboard", body = DashboardResponse),
        (status = 404, description = "Class section not found or not visible")
    ),
    security((), ("token" = [])),
    tag = "Class sections"
)]
pub async fn dashboard(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<DashboardResponse>> {
    let dashboard = ClassSectionService::dashboard(&state.db, &caller.identity, id).await?;
    Ok(Json(dashboard.into()))
}

/// Class sections taught by the calling professor
#[utoipa::path(
    get,
    path = "/class-sections/mine",
    responses(
        (status = 200, description = "The caller's class sections", body = [SectionResponse]),
        (status = 403, description = "Caller has no role")
    ),
    security(("token" = [])),
    tag = "Class sections"
)]
pub async fn my_sections(
    State(state): State<AppState>,
    caller: Caller,
) -> ApiResult<Json<Vec<SectionResponse>>> {
    let sections = ClassSectionService::my_sections(&state.db, &caller.identity).await?;
    Ok(Json(sections.into_iter().map(Into::into).collect()))
}
