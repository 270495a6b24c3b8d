pub mod account_groups;
pub mod accounts;
pub mod attendance_records;
pub mod auth_tokens;
pub mod class_sections;
pub mod enrollments;
pub mod groups;
pub mod professors;
pub mod students;
