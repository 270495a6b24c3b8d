use crate::entities::{attendance_records, class_sections, enrollments};
use models::identity::Identity;
use sea_orm::{
    ColumnTrait, EntityTrait, QueryFilter, Select,
    sea_query::{Query, SelectStatement},
};
use uuid::Uuid;

/// Role-scoped base queries. Every list and detail read over class sections
/// and attendance records starts from one of these.
pub struct ScopeService;

impl ScopeService {
    /// Class sections visible to `identity`. Only professors are narrowed,
    /// to the sections they teach.
    pub fn class_sections(identity: &Identity) -> Select<class_sections::Entity> {
        let query = class_sections::Entity::find();

        match identity {
            Identity::Professor(professor_id) => {
                query.filter(class_sections::Column::ProfessorId.eq(*professor_id))
            }
            Identity::Admin | Identity::Coordinator | Identity::Student(_) | Identity::Anonymous => {
                query
            }
        }
    }

    /// Attendance records visible to `identity`. Admins see everything,
    /// coordinators and anonymous callers see nothing.
    pub fn attendance(identity: &Identity) -> Select<attendance_records::Entity> {
        let query = attendance_records::Entity::find();

        match identity {
            Identity::Admin => query,
            Identity::Professor(professor_id) => query.filter(
                attendance_records::Column::EnrollmentId
                    .in_subquery(Self::enrollments_of_professor(*professor_id)),
            ),
            Identity::Student(student_id) => query.filter(
                attendance_records::Column::EnrollmentId
                    .in_subquery(Self::enrollments_of_student(*student_id)),
            ),
            // Primary keys are never null
            Identity::Coordinator | Identity::Anonymous => {
                query.filter(attendance_records::Column::Id.is_null())
            }
        }
    }

    pub(crate) fn enrollments_of_student(student_id: Uuid) -> SelectStatement {
        Query::select()
            .column(enrollments::Column::Id)
            .from(enrollments::Entity)
            .and_where(enrollments::Column::StudentId.eq(student_id))
            .to_owned()
    }

    pub(crate) fn enrollments_of_section(class_section_id: Uuid) -> SelectStatement {
        Query::select()
            .column(enrollments::Column::Id)
            .from(enrollments::Entity)
            .and_where(enrollments::Column::ClassSectionId.eq(class_section_id))
            .to_owned()
    }

    fn enrollments_of_professor(professor_id: Uuid) -> SelectStatement {
        Query::select()
            .column(enrollments::Column::Id)
            .from(enrollments::Entity)
            .and_where(
                enrollments::Column::ClassSectionId.in_subquery(
                    Query::select()
                        .column(class_sections::Column::Id)
                        .from(class_sections::Entity)
                        .and_where(class_sections::Column::ProfessorId.eq(professor_id))
                        .to_owned(),
                ),
            )
            .to_owned()
    }
}
