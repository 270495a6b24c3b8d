use serde::Serialize;
use uuid::Uuid;

/// Who is making a request, resolved once per request from the account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "profile_id", rename_all = "snake_case")]
pub enum Identity {
    /// Staff account; unrestricted
    Admin,
    /// Member of the coordinator group; may create and update but not delete
    Coordinator,
    Professor(Uuid),
    Student(Uuid),
    /// No credentials, or an account without any role
    Anonymous,
}

impl Identity {
    /// May create or update professors, students, sections and enrollments
    pub fn can_manage(&self) -> bool {
        match self {
            Self::Admin | Self::Coordinator => true,
            Self::Professor(_) | Self::Student(_) | Self::Anonymous => false,
        }
    }

    /// May delete records and run section actions
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    pub fn professor_id(&self) -> Option<Uuid> {
        match self {
            Self::Professor(id) => Some(*id),
            _ => None,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_capabilities() {
        let professor = Identity::Professor(Uuid::new_v4());

        assert!(Identity::Admin.is_admin());
        assert!(Identity::Coordinator.can_manage());
        assert!(!Identity::Coordinator.is_admin());
        assert!(!professor.can_manage());
        assert!(!Identity::Anonymous.can_manage());
    }

    #[test]
    fn test_professor_id() {
        let id = Uuid::new_v4();
        assert_eq!(Identity::Professor(id).professor_id(), Some(id));
        assert_eq!(Identity::Student(id).professor_id(), None);
        assert_eq!(Identity::Admin.professor_id(), None);
    }
}
