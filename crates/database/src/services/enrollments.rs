use crate::entities::{attendance_records, class_sections, enrollments, students};
use crate::services::{
    access::{require_admin, require_manage},
    error::{ServiceError, ServiceResult},
};
use chrono::Utc;
use log::info;
use models::identity::Identity;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, ConnectionTrait,
    DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Debug, Clone, Copy)]
pub struct NewEnrollment {
    pub student_id: Uuid,
    pub class_section_id: Uuid,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EnrollmentChanges {
    pub student_id: Option<Uuid>,
    pub class_section_id: Option<Uuid>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EnrollmentFilter {
    pub student_id: Option<Uuid>,
    pub class_section_id: Option<Uuid>,
}

#[derive(Debug, Clone)]
pub struct EnrollmentView {
    pub enrollment: enrollments::Model,
    pub student: students::Model,
    pub section: class_sections::Model,
}

pub struct EnrollmentService;

impl EnrollmentService {
    pub async fn list<C: ConnectionTrait>(
        conn: &C,
        filter: EnrollmentFilter,
    ) -> ServiceResult<Vec<EnrollmentView>> {
        let mut condition = Condition::all();

        if let Some(student_id) = filter.student_id {
            condition = condition.add(enrollments::Column::StudentId.eq(student_id));
        }
        if let Some(class_section_id) = filter.class_section_id {
            condition = condition.add(enrollments::Column::ClassSectionId.eq(class_section_id));
        }

        let enrollments = enrollments::Entity::find()
            .filter(condition)
            .order_by_desc(enrollments::Column::EnrolledAt)
            .all(conn)
            .await?;

        Self::views_of(conn, enrollments).await
    }

    pub async fn get<C: ConnectionTrait>(conn: &C, id: Uuid) -> ServiceResult<EnrollmentView> {
        let enrollment = Self::find(conn, id).await?;
        Self::view_of(conn, enrollment).await
    }

    pub async fn create(
        db: &DatabaseConnection,
        identity: &Identity,
        new_enrollment: NewEnrollment,
    ) -> ServiceResult<EnrollmentView> {
        require_manage(identity)?;

        let txn = db.begin().await?;
        let enrollment = Self::insert(&txn, new_enrollment).await?;
        let view = Self::view_of(&txn, enrollment).await?;
        txn.commit().await?;

        Ok(view)
    }

    /// Inserts an enrollment after checking both ends exist and the pair is new
    pub(crate) async fn insert<C: ConnectionTrait>(
        conn: &C,
        new_enrollment: NewEnrollment,
    ) -> ServiceResult<enrollments::Model> {
        Self::ensure_student(conn, new_enrollment.student_id).await?;
        Self::ensure_section(conn, new_enrollment.class_section_id).await?;
        Self::ensure_unique(
            conn,
            new_enrollment.student_id,
            new_enrollment.class_section_id,
            None,
        )
        .await?;

        let enrollment = enrollments::ActiveModel {
            id: Set(Uuid::new_v4()),
            student_id: Set(new_enrollment.student_id),
            class_section_id: Set(new_enrollment.class_section_id),
            attendance_percentage: Set(0.0),
            enrolled_at: Set(Utc::now().naive_utc()),
        }
        .insert(conn)
        .await?;

        info!(
            "Enrolled student {} in class section {}",
            enrollment.student_id, enrollment.class_section_id
        );
        Ok(enrollment)
    }

    /// Moves an enrollment to another student or section.
    ///
    /// The old section loses its representative when the representative is
    /// the one moving out.
    pub async fn update(
        db: &DatabaseConnection,
        identity: &Identity,
        id: Uuid,
        changes: EnrollmentChanges,
    ) -> ServiceResult<EnrollmentView> {
        require_manage(identity)?;

        let txn = db.begin().await?;
        let enrollment = Self::find(&txn, id).await?;

        let student_id = changes.student_id.unwrap_or(enrollment.student_id);
        let class_section_id = changes.class_section_id.unwrap_or(enrollment.class_section_id);

        if student_id != enrollment.student_id || class_section_id != enrollment.class_section_id
        {
            Self::ensure_student(&txn, student_id).await?;
            Self::ensure_section(&txn, class_section_id).await?;
            Self::ensure_unique(&txn, student_id, class_section_id, Some(enrollment.id)).await?;
            Self::release_representative(&txn, &enrollment).await?;
        }

        let mut active: enrollments::ActiveModel = enrollment.into();
        active.student_id = Set(student_id);
        active.class_section_id = Set(class_section_id);
        let enrollment = active.update(&txn).await?;

        let view = Self::view_of(&txn, enrollment).await?;
        txn.commit().await?;

        Ok(view)
    }

    /// Deletes the enrollment with its attendance records
    pub async fn delete(db: &DatabaseConnection, identity: &Identity, id: Uuid) -> ServiceResult<()> {
        require_admin(identity)?;

        let txn = db.begin().await?;
        let enrollment = Self::find(&txn, id).await?;

        Self::release_representative(&txn, &enrollment).await?;
        attendance_records::Entity::delete_many()
            .filter(attendance_records::Column::EnrollmentId.eq(enrollment.id))
            .exec(&txn)
            .await?;
        enrollments::Entity::delete_by_id(enrollment.id)
            .exec(&txn)
            .await?;

        txn.commit().await?;

        info!(
            "Removed student {} from class section {}",
            enrollment.student_id, enrollment.class_section_id
        );
        Ok(())
    }

    pub async fn is_enrolled<C: ConnectionTrait>(
        conn: &C,
        student_id: Uuid,
        class_section_id: Uuid,
    ) -> ServiceResult<bool> {
        Ok(enrollments::Entity::find()
            .filter(enrollments::Column::StudentId.eq(student_id))
            .filter(enrollments::Column::ClassSectionId.eq(class_section_id))
            .one(conn)
            .await?
            .is_some())
    }

    async fn find<C: ConnectionTrait>(conn: &C, id: Uuid) -> ServiceResult<enrollments::Model> {
        enrollments::Entity::find_by_id(id)
            .one(conn)
            .await?
            .ok_or(ServiceError::NotFound("enrollment"))
    }

    async fn ensure_student<C: ConnectionTrait>(conn: &C, student_id: Uuid) -> ServiceResult<()> {
        students::Entity::find_by_id(student_id)
            .one(conn)
            .await?
            .map(|_| ())
            .ok_or_else(|| ServiceError::validation("student", "Student does not exist."))
    }

    async fn ensure_section<C: ConnectionTrait>(
        conn: &C,
        class_section_id: Uuid,
    ) -> ServiceResult<()> {
        class_sections::Entity::find_by_id(class_section_id)
            .one(conn)
            .await?
            .map(|_| ())
            .ok_or_else(|| {
                ServiceError::validation("class_section", "Class section does not exist.")
            })
    }

    async fn ensure_unique<C: ConnectionTrait>(
        conn: &C,
        student_id: Uuid,
        class_section_id: Uuid,
        except: Option<Uuid>,
    ) -> ServiceResult<()> {
        let mut query = enrollments::Entity::find()
            .filter(enrollments::Column::StudentId.eq(student_id))
            .filter(enrollments::Column::ClassSectionId.eq(class_section_id));

        if let Some(except) = except {
            query = query.filter(enrollments::Column::Id.ne(except));
        }

        if query.one(conn).await?.is_some() {
            return Err(ServiceError::validation(
                "student",
                "This student is already enrolled in this class section.",
            ));
        }

        Ok(())
    }

    /// Clears the section's representative if it is the enrolled student
    async fn release_representative<C: ConnectionTrait>(
        conn: &C,
        enrollment: &enrollments::Model,
    ) -> ServiceResult<()> {
        let cleared = class_sections::Entity::update_many()
            .col_expr(
                class_sections::Column::RepresentativeId,
                sea_orm::sea_query::Expr::value(Option::<Uuid>::None),
            )
            .filter(class_sections::Column::Id.eq(enrollment.class_section_id))
            .filter(class_sections::Column::RepresentativeId.eq(enrollment.student_id))
            .exec(conn)
            .await?;

        if cleared.rows_affected > 0 {
            info!(
                "Cleared representative of class section {}",
                enrollment.class_section_id
            );
        }

        Ok(())
    }

    async fn view_of<C: ConnectionTrait>(
        conn: &C,
        enrollment: enrollments::Model,
    ) -> ServiceResult<EnrollmentView> {
        Self::views_of(conn, vec![enrollment])
            .await?
            .pop()
            .ok_or(ServiceError::NotFound("enrollment"))
    }

    pub(crate) async fn views_of<C: ConnectionTrait>(
        conn: &C,
        enrollments: Vec<enrollments::Model>,
    ) -> ServiceResult<Vec<EnrollmentView>> {
        if enrollments.is_empty() {
            return Ok(vec![]);
        }

        let student_ids: Vec<Uuid> = enrollments.iter().map(|e| e.student_id).collect();
        let section_ids: Vec<Uuid> = enrollments.iter().map(|e| e.class_section_id).collect();

        let students: HashMap<Uuid, students::Model> = students::Entity::find()
            .filter(students::Column::Id.is_in(student_ids))
            .all(conn)
            .await?
            .into_iter()
            .map(|s| (s.id, s))
            .collect();

        let sections: HashMap<Uuid, class_sections::Model> = class_sections::Entity::find()
            .filter(class_sections::Column::Id.is_in(section_ids))
            .all(conn)
            .await?
            .into_iter()
            .map(|s| (s.id, s))
            .collect();

        Ok(enrollments
            .into_iter()
            .filter_map(|enrollment| {
                let student = students.get(&enrollment.student_id)?.clone();
                let section = sections.get(&enrollment.class_section_id)?.clone();
                Some(EnrollmentView {
                    enrollment,
                    student,
                    section,
                })
            })
            .collect())
    }
}
