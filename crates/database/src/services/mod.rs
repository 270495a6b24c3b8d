pub mod access;
pub mod accounts;
pub mod attendance;
pub mod class_sections;
pub mod enrollments;
pub mod error;
pub mod groups;
pub mod identity;
pub mod policy;
pub mod professors;
pub mod provisioning;
pub mod scope;
pub mod students;

pub use error::{ServiceError, ServiceResult};
pub use policy::AccountPolicy;
