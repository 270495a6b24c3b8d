use chrono::NaiveDateTime;
use database::services::enrollments::EnrollmentView;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Debug, Serialize, ToSchema)]
pub struct EnrollmentResponse {
    pub id: Uuid,
    pub student_id: Uuid,
    pub student_name: String,
    pub student_code: String,
    pub class_section_id: Uuid,
    pub section_name: String,
    /// Derived from attendance records
    pub attendance_percentage: f64,
    pub enrolled_at: NaiveDateTime,
}

impl From<EnrollmentView> for EnrollmentResponse {
    fn from(view: EnrollmentView) -> Self {
        Self {
            id: view.enrollment.id,
            student_id: view.student.id,
            student_name: view.student.name,
            student_code: view.student.enrollment_code,
            class_section_id: view.section.id,
            section_name: view.section.name,
            attendance_percentage: view.enrollment.attendance_percentage,
            enrolled_at: view.enrollment.enrolled_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateEnrollmentRequest {
    pub student_id: Uuid,
    pub class_section_id: Uuid,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateEnrollmentRequest {
    pub student_id: Option<Uuid>,
    pub class_section_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct EnrollmentQueryParams {
    pub student_id: Option<Uuid>,
    pub class_section_id: Option<Uuid>,
}
