use crate::services::error::{ServiceError, ServiceResult};
use models::identity::Identity;

/// Create and update of professors, students, sections and enrollments
pub fn require_manage(identity: &Identity) -> ServiceResult<()> {
    if identity.can_manage() {
        Ok(())
    } else {
        Err(ServiceError::denied(
            "only administrators and coordinators can perform this action",
        ))
    }
}

/// Deletes and section actions
pub fn require_admin(identity: &Identity) -> ServiceResult<()> {
    if identity.is_admin() {
        Ok(())
    } else {
        Err(ServiceError::denied("only administrators can perform this action"))
    }
}
