pub mod account;
pub mod attendance;
pub mod class_section;
pub mod enrollment;
pub mod professor;
pub mod student;
