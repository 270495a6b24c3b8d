use crate::{
    dtos::professor::{
        CreateProfessorRequest, ProfessorQueryParams, ProfessorResponse, UpdateProfessorRequest,
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
use database::services::professors::{
    NewProfessor, ProfessorChanges, ProfessorFilter, ProfessorService,
};
use uuid::Uuid;

/// List professors
#[utoipa::path(
    get,
    path = "/professors",
    params(ProfessorQueryParams),
    responses(
        (status = 200, description = "Professors", body = [ProfessorResponse])
    ),
    tag = "Professors"
)]
pub async fn list_professors(
    State(state): State<AppState>,
    Query(params): Query<ProfessorQueryParams>,
) -> ApiResult<Json<Vec<ProfessorResponse>>> {
    let professors = ProfessorService::list(
        &state.db,
        ProfessorFilter {
            active: params.active,
            department: params.department,
            search: params.search,
        },
    )
    .await?;

    Ok(Json(professors.into_iter().map(Into::into).collect()))
}

/// Get a professor by ID
#[utoipa::path(
    get,
    path = "/professors/{id}",
    params(("id" = Uuid, Path, description = "Professor ID")),
    responses(
        (status = 200, description = "Professor found", body = ProfessorResponse),
        (status = 404, description = "Professor not found")
    ),
    tag = "Professors"
)]
pub async fn get_professor(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ProfessorResponse>> {
    Ok(Json(ProfessorService::get(&state.db, id).await?.into()))
}

/// Create a professor; an account is provisioned for it
#[utoipa::path(
    post,
    path = "/professors",
    request_body = CreateProfessorRequest,
    responses(
        (status = 201, description = "Professor created", body = ProfessorResponse),
        (status = 400, description = "Invalid professor"),
        (status = 403, description = "Not an administrator or coordinator")
    ),
    security(("token" = [])),
    tag = "Professors"
)]
pub async fn create_professor(
    State(state): State<AppState>,
    caller: Authenticated,
    Json(body): Json<CreateProfessorRequest>,
) -> ApiResult<(StatusCode, Json<ProfessorResponse>)> {
    let professor = ProfessorService::create(
        &state.db,
        &state.policy,
        &caller.identity,
        NewProfessor {
            name: body.name,
            email: body.email,
            department: body.department,
            active: body.active,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(professor.into())))
}

/// Update a professor
#[utoipa::path(
    patch,
    path = "/professors/{id}",
    params(("id" = Uuid, Path, description = "Professor ID")),
    request_body = UpdateProfessorRequest,
    responses(
        (status = 200, description = "Professor updated", body = ProfessorResponse),
        (status = 403, description = "Not an administrator or coordinator"),
        (status = 404, description = "Professor not found")
    ),
    security(("token" = [])),
    tag = "Professors"
)]
pub async fn update_professor(
    State(state): State<AppState>,
    caller: Authenticated,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateProfessorRequest>,
) -> ApiResult<Json<ProfessorResponse>> {
    let professor = ProfessorService::update(
        &state.db,
        &caller.identity,
        id,
        ProfessorChanges {
            name: body.name,
            email: body.email,
            department: body.department,
            active: body.active,
        },
    )
    .await?;

    Ok(Json(professor.into()))
}

/// Delete a professor that teaches no class section
#[utoipa::path(
    delete,
    path = "/professors/{id}",
    params(("id" = Uuid, Path, description = "Professor ID")),
    responses(
        (status = 204, description = "Professor deleted"),
        (status = 403, description = "Not an administrator"),
        (status = 404, description = "Professor not found"),
        (status = 409, description = "Professor still teaches class sections")
    ),
    security(("token" = [])),
    tag = "Professors"
)]
pub async fn delete_professor(
    State(state): State<AppState>,
    caller: Authenticated,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    ProfessorService::delete(&state.db, &caller.identity, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
