use chrono::{NaiveDate, NaiveDateTime, Utc};
use database::entities::students;
use models::profile::Gender;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Debug, Serialize, ToSchema)]
pub struct StudentResponse {
    pub id: Uuid,
    pub name: String,
    pub enrollment_code: String,
    pub email: Option<String>,
    pub course: String,
    pub birth_date: NaiveDate,
    /// Whole years at today's date
    pub age: i32,
    #[schema(value_type = String, example = "N")]
    pub gender: Gender,
    pub account_id: Option<Uuid>,
    pub created_at: NaiveDateTime,
}

impl From<students::Model> for StudentResponse {
    fn from(student: students::Model) -> Self {
        Self {
            age: student.age_on(Utc::now().date_naive()),
            id: student.id,
            name: student.name,
            enrollment_code: student.enrollment_code,
            email: student.email,
            course: student.course,
            birth_date: student.birth_date,
            gender: student.gender,
            account_id: student.account_id,
            created_at: student.created_at,
        }
    }
}

/// Short form used inside section responses
#[derive(Debug, Serialize, ToSchema)]
pub struct StudentSummary {
    pub id: Uuid,
    pub name: String,
    pub enrollment_code: String,
    pub email: Option<String>,
}

impl From<students::Model> for StudentSummary {
    fn from(student: students::Model) -> Self {
        Self {
            id: student.id,
            name: student.name,
            enrollment_code: student.enrollment_code,
            email: student.email,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateStudentRequest {
    pub name: String,
    pub enrollment_code: String,
    pub email: Option<String>,
    pub course: String,
    pub birth_date: NaiveDate,
    #[serde(default)]
    #[schema(value_type = Option<String>, example = "F")]
    pub gender: Gender,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStudentRequest {
    pub name: Option<String>,
    pub enrollment_code: Option<String>,
    /// An empty string removes the e-mail
    pub email: Option<String>,
    pub course: Option<String>,
    pub birth_date: Option<NaiveDate>,
    #[schema(value_type = Option<String>)]
    pub gender: Option<Gender>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct StudentQueryParams {
    pub course: Option<String>,
    #[param(value_type = Option<String>)]
    pub gender: Option<Gender>,
    /// Matches name, enrollment code or e-mail
    pub search: Option<String>,
}
