use crate::{
    dtos::{class_section::PublicSectionResponse, professor::PublicProfessorResponse},
    error::ApiResult,
    state::AppState,
};
use axum::{Json, extract::State};
use database::services::{class_sections::ClassSectionService, professors::ProfessorService};

/// Active class sections, without authentication
#[utoipa::path(
    get,
    path = "/public/class-sections",
    responses(
        (status = 200, description = "Active class sections", body = [PublicSectionResponse])
    ),
    tag = "Public"
)]
pub async fn active_sections(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<PublicSectionResponse>>> {
    let sections = ClassSectionService::public_active(&state.db).await?;
    Ok(Json(sections.into_iter().map(Into::into).collect()))
}

/// Active professors, without authentication
#[utoipa::path(
    get,
    path = "/public/professors",
    responses(
        (status = 200, description = "Active professors", body = [PublicProfessorResponse])
    ),
    tag = "Public"
)]
pub async fn active_professors(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<PublicProfessorResponse>>> {
    let professors = ProfessorService::public_active(&state.db).await?;
    Ok(Json(professors.into_iter().map(Into::into).collect()))
}
