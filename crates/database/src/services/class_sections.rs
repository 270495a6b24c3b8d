use crate::entities::{attendance_records, class_sections, enrollments, professors, students};
use crate::services::{
    access::{require_admin, require_manage},
    enrollments::{EnrollmentService, EnrollmentView, NewEnrollment},
    error::{ServiceError, ServiceResult},
    scope::ScopeService,
};
use chrono::{NaiveDate, Utc};
use log::info;
use models::{
    attendance::mean_percentage,
    class_section::{ClassStatus, DateRange},
    identity::Identity,
};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, ConnectionTrait,
    DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    TransactionTrait, sea_query::Expr,
};
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct NewSection {
    pub name: String,
    pub description: String,
    pub professor_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: ClassStatus,
}

#[derive(Debug, Clone, Default)]
pub struct SectionChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub professor_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<ClassStatus>,
}

#[derive(Debug, Clone, Default)]
pub struct SectionFilter {
    pub status: Option<ClassStatus>,
    pub professor_id: Option<Uuid>,
    /// Matches name or description
    pub search: Option<String>,
}

/// A class section with its professor, representative and head count
#[derive(Debug, Clone)]
pub struct SectionView {
    pub section: class_sections::Model,
    pub professor: professors::Model,
    pub representative: Option<students::Model>,
    pub student_count: u64,
}

#[derive(Debug, Clone)]
pub struct DashboardStudent {
    pub student: students::Model,
    pub attendance_percentage: f64,
}

#[derive(Debug, Clone)]
pub struct SectionDashboard {
    pub view: SectionView,
    pub students: Vec<DashboardStudent>,
    pub total_attendance_records: u64,
    /// Mean of the enrolled students' percentages; 0 with no enrollments
    pub mean_attendance: f64,
}

pub struct ClassSectionService;

impl ClassSectionService {
    /// Sections visible to `identity`, ordered by start date
    pub async fn list<C: ConnectionTrait>(
        conn: &C,
        identity: &Identity,
        filter: SectionFilter,
    ) -> ServiceResult<Vec<SectionView>> {
        let mut condition = Condition::all();

        if let Some(status) = filter.status {
            condition = condition.add(class_sections::Column::Status.eq(status));
        }
        if let Some(professor_id) = filter.professor_id {
            condition = condition.add(class_sections::Column::ProfessorId.eq(professor_id));
        }
        if let Some(search) = filter.search.filter(|s| !s.trim().is_empty()) {
            let pattern = format!("%{}%", search.trim());
            condition = condition.add(
                Condition::any()
                    .add(class_sections::Column::Name.like(&pattern))
                    .add(class_sections::Column::Description.like(&pattern)),
            );
        }

        let sections = ScopeService::class_sections(identity)
            .filter(condition)
            .order_by_desc(class_sections::Column::StartDate)
            .order_by_asc(class_sections::Column::Name)
            .all(conn)
            .await?;

        Self::views_of(conn, sections).await
    }

    pub async fn get<C: ConnectionTrait>(
        conn: &C,
        identity: &Identity,
        id: Uuid,
    ) -> ServiceResult<SectionView> {
        let section = Self::find_scoped(conn, identity, id).await?;
        Self::view_of(conn, section).await
    }

    pub async fn create(
        db: &DatabaseConnection,
        identity: &Identity,
        new_section: NewSection,
    ) -> ServiceResult<SectionView> {
        require_manage(identity)?;
        Self::validate_dates(new_section.start_date, new_section.end_date)?;

        let txn = db.begin().await?;
        Self::ensure_professor(&txn, new_section.professor_id).await?;

        let section = class_sections::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(new_section.name),
            description: Set(new_section.description),
            professor_id: Set(new_section.professor_id),
            start_date: Set(new_section.start_date),
            end_date: Set(new_section.end_date),
            status: Set(new_section.status),
            representative_id: Set(None),
            created_at: Set(Utc::now().naive_utc()),
        }
        .insert(&txn)
        .await?;

        let view = Self::view_of(&txn, section).await?;
        txn.commit().await?;

        info!("Created class section {}", view.section.name);
        Ok(view)
    }

    /// Applies the changes; the resulting date range must still be valid
    pub async fn update(
        db: &DatabaseConnection,
        identity: &Identity,
        id: Uuid,
        changes: SectionChanges,
    ) -> ServiceResult<SectionView> {
        require_manage(identity)?;

        let txn = db.begin().await?;
        let section = Self::find(&txn, id).await?;

        Self::validate_dates(
            changes.start_date.unwrap_or(section.start_date),
            changes.end_date.unwrap_or(section.end_date),
        )?;

        if let Some(professor_id) = changes.professor_id {
            Self::ensure_professor(&txn, professor_id).await?;
        }

        let mut active: class_sections::ActiveModel = section.into();
        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(description) = changes.description {
            active.description = Set(description);
        }
        if let Some(professor_id) = changes.professor_id {
            active.professor_id = Set(professor_id);
        }
        if let Some(start_date) = changes.start_date {
            active.start_date = Set(start_date);
        }
        if let Some(end_date) = changes.end_date {
            active.end_date = Set(end_date);
        }
        if let Some(status) = changes.status {
            active.status = Set(status);
        }
        let section = active.update(&txn).await?;

        let view = Self::view_of(&txn, section).await?;
        txn.commit().await?;

        Ok(view)
    }

    /// Deletes the section together with its enrollments and their records
    pub async fn delete(db: &DatabaseConnection, identity: &Identity, id: Uuid) -> ServiceResult<()> {
        require_admin(identity)?;

        let txn = db.begin().await?;
        let section = Self::find(&txn, id).await?;

        attendance_records::Entity::delete_many()
            .filter(
                attendance_records::Column::EnrollmentId
                    .in_subquery(ScopeService::enrollments_of_section(section.id)),
            )
            .exec(&txn)
            .await?;
        enrollments::Entity::delete_many()
            .filter(enrollments::Column::ClassSectionId.eq(section.id))
            .exec(&txn)
            .await?;
        class_sections::Entity::delete_by_id(section.id)
            .exec(&txn)
            .await?;

        txn.commit().await?;

        info!("Deleted class section {}", section.name);
        Ok(())
    }

    pub async fn assign_professor(
        db: &DatabaseConnection,
        identity: &Identity,
        id: Uuid,
        professor_id: Uuid,
    ) -> ServiceResult<SectionView> {
        require_admin(identity)?;

        let txn = db.begin().await?;
        let section = Self::find(&txn, id).await?;
        let professor = professors::Entity::find_by_id(professor_id)
            .one(&txn)
            .await?
            .ok_or(ServiceError::NotFound("professor"))?;

        let mut active: class_sections::ActiveModel = section.into();
        active.professor_id = Set(professor.id);
        let section = active.update(&txn).await?;

        let view = Self::view_of(&txn, section).await?;
        txn.commit().await?;

        info!(
            "Assigned professor {} to class section {}",
            professor.name, view.section.name
        );
        Ok(view)
    }

    pub async fn enroll_student(
        db: &DatabaseConnection,
        identity: &Identity,
        id: Uuid,
        student_id: Uuid,
    ) -> ServiceResult<EnrollmentView> {
        require_admin(identity)?;

        let txn = db.begin().await?;
        let section = Self::find(&txn, id).await?;
        students::Entity::find_by_id(student_id)
            .one(&txn)
            .await?
            .ok_or(ServiceError::NotFound("student"))?;

        let enrollment = EnrollmentService::insert(
            &txn,
            NewEnrollment {
                student_id,
                class_section_id: section.id,
            },
        )
        .await?;

        let view = EnrollmentService::views_of(&txn, vec![enrollment])
            .await?
            .pop()
            .ok_or(ServiceError::NotFound("enrollment"))?;
        txn.commit().await?;

        Ok(view)
    }

    /// Sets the representative, or clears it when `student_id` is `None`.
    ///
    /// The student must be enrolled in the section and may represent only
    /// one section.
    pub async fn set_representative(
        db: &DatabaseConnection,
        identity: &Identity,
        id: Uuid,
        student_id: Option<Uuid>,
    ) -> ServiceResult<SectionView> {
        require_admin(identity)?;

        let txn = db.begin().await?;
        let section = Self::find(&txn, id).await?;

        if let Some(student_id) = student_id {
            students::Entity::find_by_id(student_id)
                .one(&txn)
                .await?
                .ok_or(ServiceError::NotFound("student"))?;

            if !EnrollmentService::is_enrolled(&txn, student_id, section.id).await? {
                return Err(ServiceError::validation(
                    "student_id",
                    "The student must be enrolled in this class section.",
                ));
            }

            let elsewhere = class_sections::Entity::find()
                .filter(class_sections::Column::RepresentativeId.eq(student_id))
                .filter(class_sections::Column::Id.ne(section.id))
                .one(&txn)
                .await?;
            if elsewhere.is_some() {
                return Err(ServiceError::validation(
                    "student_id",
                    "The student already represents another class section.",
                ));
            }
        }

        let mut active: class_sections::ActiveModel = section.into();
        active.representative_id = Set(student_id);
        let section = active.update(&txn).await?;

        let view = Self::view_of(&txn, section).await?;
        txn.commit().await?;

        match &view.representative {
            Some(student) => info!(
                "{} now represents class section {}",
                student.name, view.section.name
            ),
            None => info!("Cleared representative of class section {}", view.section.name),
        }
        Ok(view)
    }

    /// Enrollments of a visible section
    pub async fn roster<C: ConnectionTrait>(
        conn: &C,
        identity: &Identity,
        id: Uuid,
    ) -> ServiceResult<Vec<EnrollmentView>> {
        let section = Self::find_scoped(conn, identity, id).await?;

        let enrollments = enrollments::Entity::find()
            .filter(enrollments::Column::ClassSectionId.eq(section.id))
            .order_by_asc(enrollments::Column::EnrolledAt)
            .all(conn)
            .await?;

        EnrollmentService::views_of(conn, enrollments).await
    }

    pub async fn representative<C: ConnectionTrait>(
        conn: &C,
        identity: &Identity,
        id: Uuid,
    ) -> ServiceResult<Option<students::Model>> {
        let section = Self::find_scoped(conn, identity, id).await?;

        let Some(representative_id) = section.representative_id else {
            return Ok(None);
        };

        Ok(students::Entity::find_by_id(representative_id)
            .one(conn)
            .await?)
    }

    pub async fn dashboard<C: ConnectionTrait>(
        conn: &C,
        identity: &Identity,
        id: Uuid,
    ) -> ServiceResult<SectionDashboard> {
        let section = Self::find_scoped(conn, identity, id).await?;
        let view = Self::view_of(conn, section).await?;

        let roster = enrollments::Entity::find()
            .filter(enrollments::Column::ClassSectionId.eq(view.section.id))
            .find_also_related(students::Entity)
            .order_by_asc(students::Column::Name)
            .all(conn)
            .await?;

        let students: Vec<DashboardStudent> = roster
            .into_iter()
            .filter_map(|(enrollment, student)| {
                student.map(|student| DashboardStudent {
                    student,
                    attendance_percentage: enrollment.attendance_percentage,
                })
            })
            .collect();

        let percentages: Vec<f64> = students.iter().map(|s| s.attendance_percentage).collect();

        let total_attendance_records = attendance_records::Entity::find()
            .filter(
                attendance_records::Column::EnrollmentId
                    .in_subquery(ScopeService::enrollments_of_section(view.section.id)),
            )
            .count(conn)
            .await?;

        Ok(SectionDashboard {
            view,
            students,
            total_attendance_records,
            mean_attendance: mean_percentage(&percentages),
        })
    }

    /// Active sections for the unauthenticated listing
    pub async fn public_active<C: ConnectionTrait>(conn: &C) -> ServiceResult<Vec<SectionView>> {
        let sections = class_sections::Entity::find()
            .filter(class_sections::Column::Status.eq(ClassStatus::Active))
            .order_by_asc(class_sections::Column::StartDate)
            .all(conn)
            .await?;

        Self::views_of(conn, sections).await
    }

    /// Sections taught by the calling professor.
    ///
    /// Other roles get an empty list; callers without a role are refused.
    pub async fn my_sections<C: ConnectionTrait>(
        conn: &C,
        identity: &Identity,
    ) -> ServiceResult<Vec<SectionView>> {
        match identity {
            Identity::Professor(professor_id) => {
                let sections = class_sections::Entity::find()
                    .filter(class_sections::Column::ProfessorId.eq(*professor_id))
                    .order_by_desc(class_sections::Column::StartDate)
                    .all(conn)
                    .await?;

                Self::views_of(conn, sections).await
            }
            Identity::Admin | Identity::Coordinator | Identity::Student(_) => Ok(vec![]),
            Identity::Anonymous => Err(ServiceError::denied(
                "only professors have class sections of their own",
            )),
        }
    }

    fn validate_dates(start: NaiveDate, end: NaiveDate) -> ServiceResult<()> {
        DateRange::validate(start, end)
            .map(|_| ())
            .map_err(|e| ServiceError::validation("end_date", e.to_string()))
    }

    async fn ensure_professor<C: ConnectionTrait>(
        conn: &C,
        professor_id: Uuid,
    ) -> ServiceResult<()> {
        professors::Entity::find_by_id(professor_id)
            .one(conn)
            .await?
            .map(|_| ())
            .ok_or_else(|| ServiceError::validation("professor", "Professor does not exist."))
    }

    async fn find<C: ConnectionTrait>(conn: &C, id: Uuid) -> ServiceResult<class_sections::Model> {
        class_sections::Entity::find_by_id(id)
            .one(conn)
            .await?
            .ok_or(ServiceError::NotFound("class section"))
    }

    async fn find_scoped<C: ConnectionTrait>(
        conn: &C,
        identity: &Identity,
        id: Uuid,
    ) -> ServiceResult<class_sections::Model> {
        ScopeService::class_sections(identity)
            .filter(class_sections::Column::Id.eq(id))
            .one(conn)
            .await?
            .ok_or(ServiceError::NotFound("class section"))
    }

    async fn view_of<C: ConnectionTrait>(
        conn: &C,
        section: class_sections::Model,
    ) -> ServiceResult<SectionView> {
        Self::views_of(conn, vec![section])
            .await?
            .pop()
            .ok_or(ServiceError::NotFound("professor"))
    }

    /// Attaches professor, representative and head count using batched lookups
    pub(crate) async fn views_of<C: ConnectionTrait>(
        conn: &C,
        sections: Vec<class_sections::Model>,
    ) -> ServiceResult<Vec<SectionView>> {
        if sections.is_empty() {
            return Ok(vec![]);
        }

        let section_ids: Vec<Uuid> = sections.iter().map(|s| s.id).collect();
        let professor_ids: Vec<Uuid> = sections.iter().map(|s| s.professor_id).collect();
        let representative_ids: Vec<Uuid> =
            sections.iter().filter_map(|s| s.representative_id).collect();

        let professors: HashMap<Uuid, professors::Model> = professors::Entity::find()
            .filter(professors::Column::Id.is_in(professor_ids))
            .all(conn)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        let representatives: HashMap<Uuid, students::Model> = if representative_ids.is_empty() {
            HashMap::new()
        } else {
            students::Entity::find()
                .filter(students::Column::Id.is_in(representative_ids))
                .all(conn)
                .await?
                .into_iter()
                .map(|s| (s.id, s))
                .collect()
        };

        let counts: HashMap<Uuid, i64> = enrollments::Entity::find()
            .select_only()
            .column(enrollments::Column::ClassSectionId)
            .column_as(Expr::col(enrollments::Column::Id).count(), "student_count")
            .filter(enrollments::Column::ClassSectionId.is_in(section_ids))
            .group_by(enrollments::Column::ClassSectionId)
            .into_tuple::<(Uuid, i64)>()
            .all(conn)
            .await?
            .into_iter()
            .collect();

        Ok(sections
            .into_iter()
            .filter_map(|section| {
                let professor = professors.get(&section.professor_id)?.clone();
                let representative = section
                    .representative_id
                    .and_then(|id| representatives.get(&id).cloned());
                let student_count = counts.get(&section.id).copied().unwrap_or(0) as u64;

                Some(SectionView {
                    section,
                    professor,
                    representative,
                    student_count,
                })
            })
            .collect())
    }
}
