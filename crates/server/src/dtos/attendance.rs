use chrono::{NaiveDate, NaiveDateTime};
use database::services::attendance::AttendanceView;
use models::attendance::AttendanceStatus;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Debug, Serialize, ToSchema)]
pub struct AttendanceResponse {
    pub id: Uuid,
    pub enrollment_id: Uuid,
    pub student_name: String,
    pub student_code: String,
    pub section_name: String,
    pub date: NaiveDate,
    #[schema(value_type = String, example = "Present")]
    pub status: AttendanceStatus,
    pub note: String,
    pub recorded_at: NaiveDateTime,
}

impl From<AttendanceView> for AttendanceResponse {
    fn from(view: AttendanceView) -> Self {
        Self {
            id: view.record.id,
            enrollment_id: view.record.enrollment_id,
            student_name: view.student.name,
            student_code: view.student.enrollment_code,
            section_name: view.section.name,
            date: view.record.date,
            status: view.record.status,
            note: view.record.note,
            recorded_at: view.record.recorded_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateAttendanceRequest {
    pub enrollment_id: Uuid,
    pub date: NaiveDate,
    #[serde(default)]
    #[schema(value_type = Option<String>, example = "Present")]
    pub status: AttendanceStatus,
    #[serde(default)]
    pub note: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateAttendanceRequest {
    pub date: Option<NaiveDate>,
    #[schema(value_type = Option<String>)]
    pub status: Option<AttendanceStatus>,
    pub note: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct AttendanceQueryParams {
    #[param(value_type = Option<String>)]
    pub status: Option<AttendanceStatus>,
    pub date: Option<NaiveDate>,
    pub class_section_id: Option<Uuid>,
    /// Matches student name, enrollment code or note
    pub search: Option<String>,
}
