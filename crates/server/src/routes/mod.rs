use crate::state::AppState;
use utoipa_axum::{router::OpenApiRouter, routes};

pub mod attendance;
pub mod auth;
pub mod class_sections;
pub mod enrollments;
pub mod health;
pub mod professors;
pub mod public;
pub mod students;

/// Every endpoint under `/api`
pub fn api_router() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(auth::register))
        .routes(routes!(auth::login))
        .routes(routes!(auth::logout))
        .routes(routes!(auth::me, auth::update_me))
        .routes(routes!(auth::change_password))
        .routes(routes!(
            professors::list_professors,
            professors::create_professor
        ))
        .routes(routes!(
            professors::get_professor,
            professors::update_professor,
            professors::delete_professor
        ))
        .routes(routes!(students::list_students, students::create_student))
        .routes(routes!(
            students::get_student,
            students::update_student,
            students::delete_student
        ))
        .routes(routes!(
            class_sections::list_sections,
            class_sections::create_section
        ))
        .routes(routes!(class_sections::my_sections))
        .routes(routes!(
            class_sections::get_section,
            class_sections::update_section,
            class_sections::delete_section
        ))
        .routes(routes!(class_sections::assign_professor))
        .routes(routes!(class_sections::enroll_student))
        .routes(routes!(
            class_sections::get_representative,
            class_sections::set_representative
        ))
        .routes(routes!(class_sections::list_section_students))
        .routes(routes!(class_sections::dashboard))
        .routes(routes!(
            enrollments::list_enrollments,
            enrollments::create_enrollment
        ))
        .routes(routes!(
            enrollments::get_enrollment,
            enrollments::update_enrollment,
            enrollments::delete_enrollment
        ))
        .routes(routes!(
            attendance::list_attendance,
            attendance::create_attendance
        ))
        .routes(routes!(
            attendance::get_attendance,
            attendance::update_attendance,
            attendance::delete_attendance
        ))
        .routes(routes!(public::active_sections))
        .routes(routes!(public::active_professors))
}
