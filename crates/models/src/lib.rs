pub mod attendance;
pub mod class_section;
pub mod identity;
pub mod profile;
pub mod username;
