use chrono::NaiveDateTime;
use database::{entities::professors, services::professors::ProfessorView};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Debug, Serialize, ToSchema)]
pub struct ProfessorResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub department: String,
    pub active: bool,
    pub account_id: Option<Uuid>,
    pub section_count: u64,
    pub created_at: NaiveDateTime,
}

impl From<ProfessorView> for ProfessorResponse {
    fn from(view: ProfessorView) -> Self {
        let professor = view.professor;
        Self {
            id: professor.id,
            name: professor.name,
            email: professor.email,
            department: professor.department,
            active: professor.active,
            account_id: professor.account_id,
            section_count: view.section_count,
            created_at: professor.created_at,
        }
    }
}

/// Fields exposed without authentication
#[derive(Debug, Serialize, ToSchema)]
pub struct PublicProfessorResponse {
    pub id: Uuid,
    pub name: String,
    pub department: String,
    pub active: bool,
}

impl From<professors::Model> for PublicProfessorResponse {
    fn from(professor: professors::Model) -> Self {
        Self {
            id: professor.id,
            name: professor.name,
            department: professor.department,
            active: professor.active,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProfessorRequest {
    pub name: String,
    pub email: String,
    pub department: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProfessorRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub department: Option<String>,
    pub active: Option<bool>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ProfessorQueryParams {
    pub active: Option<bool>,
    pub department: Option<String>,
    /// Matches name or e-mail
    pub search: Option<String>,
}
