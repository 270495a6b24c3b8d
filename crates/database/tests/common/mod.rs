#![allow(dead_code)]

use chrono::NaiveDate;
use database::entities::{accounts, class_sections, enrollments, professors, students};
use database::services::{
    AccountPolicy,
    accounts::{AccountService, NewAccount},
    class_sections::{ClassSectionService, NewSection},
    enrollments::{EnrollmentService, NewEnrollment},
    professors::{NewProfessor, ProfessorService},
    students::{NewStudent, StudentService},
};
use migration::{Migrator, MigratorTrait};
use models::{class_section::ClassStatus, identity::Identity, profile::Gender};
use sea_orm::{Database, DatabaseConnection};

/// Creates an in-memory database with the schema applied
pub async fn create_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    db
}

/// Cheap hashing so tests stay fast
pub fn policy() -> AccountPolicy {
    AccountPolicy {
        default_password: Some("changeme".to_string()),
        fallback_to_student: true,
        password_cost: 4,
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub async fn professor(db: &DatabaseConnection, name: &str, email: &str) -> professors::Model {
    ProfessorService::create(
        db,
        &policy(),
        &Identity::Admin,
        NewProfessor {
            name: name.to_string(),
            email: email.to_string(),
            department: "Mathematics".to_string(),
            active: true,
        },
    )
    .await
    .unwrap()
    .professor
}

pub async fn student(db: &DatabaseConnection, name: &str, code: &str) -> students::Model {
    StudentService::create(
        db,
        &policy(),
        &Identity::Admin,
        NewStudent {
            name: name.to_string(),
            enrollment_code: code.to_string(),
            email: Some(format!("{}@school.test", code.to_lowercase())),
            course: "Engineering".to_string(),
            birth_date: date(2003, 5, 17),
            gender: Gender::Female,
        },
    )
    .await
    .unwrap()
}

pub async fn section(
    db: &DatabaseConnection,
    name: &str,
    professor_id: uuid::Uuid,
) -> class_sections::Model {
    ClassSectionService::create(
        db,
        &Identity::Admin,
        NewSection {
            name: name.to_string(),
            description: String::new(),
            professor_id,
            start_date: date(2025, 2, 1),
            end_date: date(2025, 6, 30),
            status: ClassStatus::Active,
        },
    )
    .await
    .unwrap()
    .section
}

pub async fn enroll(
    db: &DatabaseConnection,
    student_id: uuid::Uuid,
    class_section_id: uuid::Uuid,
) -> enrollments::Model {
    EnrollmentService::create(
        db,
        &Identity::Admin,
        NewEnrollment {
            student_id,
            class_section_id,
        },
    )
    .await
    .unwrap()
    .enrollment
}

pub async fn account(db: &DatabaseConnection, username: &str, email: &str) -> accounts::Model {
    AccountService::create(
        db,
        &policy(),
        NewAccount {
            username: username.to_string(),
            email: email.to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            password: Some("secret123".to_string()),
            is_staff: false,
        },
    )
    .await
    .unwrap()
}
