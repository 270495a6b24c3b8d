use crate::dtos::{professor::PublicProfessorResponse, student::StudentSummary};
use chrono::{NaiveDate, NaiveDateTime};
use database::services::class_sections::{DashboardStudent, SectionDashboard, SectionView};
use models::class_section::ClassStatus;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Debug, Serialize, ToSchema)]
pub struct SectionResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub professor_id: Uuid,
    pub professor_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub duration_days: i64,
    #[schema(value_type = String, example = "Active")]
    pub status: ClassStatus,
    pub representative_id: Option<Uuid>,
    pub representative_name: Option<String>,
    pub student_count: u64,
    pub created_at: NaiveDateTime,
}

impl From<SectionView> for SectionResponse {
    fn from(view: SectionView) -> Self {
        let section = view.section;
        Self {
            duration_days: section.duration_days(),
            id: section.id,
            name: section.name,
            description: section.description,
            professor_id: section.professor_id,
            professor_name: view.professor.name,
            start_date: section.start_date,
            end_date: section.end_date,
            status: section.status,
            representative_id: section.representative_id,
            representative_name: view.representative.map(|s| s.name),
            student_count: view.student_count,
            created_at: section.created_at,
        }
    }
}

/// Fields exposed without authentication
#[derive(Debug, Serialize, ToSchema)]
pub struct PublicSectionResponse {
    pub id: Uuid,
    pub name: String,
    pub professor_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[schema(value_type = String, example = "Active")]
    pub status: ClassStatus,
}

impl From<SectionView> for PublicSectionResponse {
    fn from(view: SectionView) -> Self {
        Self {
            id: view.section.id,
            name: view.section.name,
            professor_name: view.professor.name,
            start_date: view.section.start_date,
            end_date: view.section.end_date,
            status: view.section.status,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateSectionRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub professor_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    #[schema(value_type = Option<String>, example = "Active")]
    pub status: ClassStatus,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateSectionRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub professor_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[schema(value_type = Option<String>)]
    pub status: Option<ClassStatus>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct SectionQueryParams {
    #[param(value_type = Option<String>)]
    pub status: Option<ClassStatus>,
    pub professor_id: Option<Uuid>,
    /// Matches name or description
    pub search: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AssignProfessorRequest {
    pub professor_id: Uuid,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct EnrollStudentRequest {
    pub student_id: Uuid,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RepresentativeRequest {
    /// `null` clears the representative
    pub student_id: Option<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardStudentResponse {
    pub id: Uuid,
    pub name: String,
    pub enrollment_code: String,
    pub attendance_percentage: f64,
}

impl From<DashboardStudent> for DashboardStudentResponse {
    fn from(entry: DashboardStudent) -> Self {
        Self {
            id: entry.student.id,
            name: entry.student.name,
            enrollment_code: entry.student.enrollment_code,
            attendance_percentage: entry.attendance_percentage,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardResponse {
    pub section: SectionResponse,
    pub professor: PublicProfessorResponse,
    pub students: Vec<DashboardStudentResponse>,
    pub total_attendance_records: u64,
    pub mean_attendance_percentage: f64,
    pub representative: Option<StudentSummary>,
}

impl From<SectionDashboard> for DashboardResponse {
    fn from(dashboard: SectionDashboard) -> Self {
        let professor: PublicProfessorResponse = dashboard.view.professor.clone().into();
        let representative: Option<StudentSummary> =
            dashboard.view.representative.clone().map(Into::into);

        Self {
            section: dashboard.view.into(),
            professor,
            students: dashboard.students.into_iter().map(Into::into).collect(),
            total_attendance_records: dashboard.total_attendance_records,
            mean_attendance_percentage: dashboard.mean_attendance,
            representative,
        }
    }
}
