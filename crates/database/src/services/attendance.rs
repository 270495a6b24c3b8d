use crate::entities::{attendance_records, class_sections, enrollments, students};
use crate::services::{
    error::{ServiceError, ServiceResult},
    scope::ScopeService,
};
use chrono::{NaiveDate, Utc};
use log::{debug, info};
use models::{
    attendance::{AttendanceStatus, percentage_of},
    identity::Identity,
};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, ConnectionTrait,
    DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
    sea_query::Query,
};
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct NewAttendance {
    pub enrollment_id: Uuid,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub note: String,
}

#[derive(Debug, Clone, Default)]
pub struct AttendanceChanges {
    pub date: Option<NaiveDate>,
    pub status: Option<AttendanceStatus>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct AttendanceFilter {
    pub status: Option<AttendanceStatus>,
    pub date: Option<NaiveDate>,
    pub class_section_id: Option<Uuid>,
    /// Matches student name, enrollment code or note
    pub search: Option<String>,
}

/// An attendance record with the data needed to present it
#[derive(Debug, Clone)]
pub struct AttendanceView {
    pub record: attendance_records::Model,
    pub student: students::Model,
    pub section: class_sections::Model,
}

pub struct AttendanceService;

impl AttendanceService {
    /// Recomputes and stores the cumulative attendance percentage of an enrollment
    pub async fn recompute<C: ConnectionTrait>(conn: &C, enrollment_id: Uuid) -> ServiceResult<f64> {
        let enrollment = enrollments::Entity::find_by_id(enrollment_id)
            .one(conn)
            .await?
            .ok_or(ServiceError::NotFound("enrollment"))?;

        let statuses = attendance_records::Entity::find()
            .select_only()
            .column(attendance_records::Column::Status)
            .filter(attendance_records::Column::EnrollmentId.eq(enrollment_id))
            .into_tuple::<AttendanceStatus>()
            .all(conn)
            .await?;

        let total = statuses.len();
        let percentage = percentage_of(statuses);

        let mut active: enrollments::ActiveModel = enrollment.into();
        active.attendance_percentage = Set(percentage);
        active.update(conn).await?;

        debug!("Enrollment {enrollment_id}: {percentage}% over {total} records");
        Ok(percentage)
    }

    /// Rejects writes from callers who do not own the enrollment's section
    pub async fn authorize_write<C: ConnectionTrait>(
        conn: &C,
        identity: &Identity,
        enrollment: &enrollments::Model,
    ) -> ServiceResult<()> {
        match identity {
            Identity::Admin => Ok(()),
            Identity::Professor(professor_id) => {
                let section = class_sections::Entity::find_by_id(enrollment.class_section_id)
                    .one(conn)
                    .await?
                    .ok_or(ServiceError::NotFound("class section"))?;

                if section.professor_id == *professor_id {
                    Ok(())
                } else {
                    Err(ServiceError::denied(
                        "you cannot record attendance for this class section",
                    ))
                }
            }
            Identity::Coordinator | Identity::Student(_) | Identity::Anonymous => Err(
                ServiceError::denied("only the section's professor can record attendance"),
            ),
        }
    }

    /// Records attendance and updates the enrollment's percentage in one transaction
    pub async fn create(
        db: &DatabaseConnection,
        identity: &Identity,
        new_record: NewAttendance,
    ) -> ServiceResult<AttendanceView> {
        let txn = db.begin().await?;

        let enrollment = enrollments::Entity::find_by_id(new_record.enrollment_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::validation("enrollment", "Enrollment does not exist."))?;

        Self::authorize_write(&txn, identity, &enrollment).await?;
        Self::ensure_unique_date(&txn, enrollment.id, new_record.date, None).await?;

        let record = attendance_records::ActiveModel {
            id: Set(Uuid::new_v4()),
            enrollment_id: Set(enrollment.id),
            date: Set(new_record.date),
            status: Set(new_record.status),
            note: Set(new_record.note),
            recorded_at: Set(Utc::now().naive_utc()),
        }
        .insert(&txn)
        .await?;

        let percentage = Self::recompute(&txn, enrollment.id).await?;
        let view = Self::view_of(&txn, record).await?;

        txn.commit().await?;

        info!(
            "Recorded {:?} for enrollment {} on {}; attendance now {percentage}%",
            view.record.status, view.record.enrollment_id, view.record.date
        );
        Ok(view)
    }

    pub async fn update(
        db: &DatabaseConnection,
        identity: &Identity,
        id: Uuid,
        changes: AttendanceChanges,
    ) -> ServiceResult<AttendanceView> {
        let txn = db.begin().await?;

        let record = Self::find_scoped(&txn, identity, id).await?;
        let enrollment = enrollments::Entity::find_by_id(record.enrollment_id)
            .one(&txn)
            .await?
            .ok_or(ServiceError::NotFound("enrollment"))?;

        Self::authorize_write(&txn, identity, &enrollment).await?;

        if let Some(date) = changes.date
            && date != record.date
        {
            Self::ensure_unique_date(&txn, enrollment.id, date, Some(record.id)).await?;
        }

        let mut active: attendance_records::ActiveModel = record.into();
        if let Some(date) = changes.date {
            active.date = Set(date);
        }
        if let Some(status) = changes.status {
            active.status = Set(status);
        }
        if let Some(note) = changes.note {
            active.note = Set(note);
        }
        let record = active.update(&txn).await?;

        Self::recompute(&txn, enrollment.id).await?;
        let view = Self::view_of(&txn, record).await?;

        txn.commit().await?;
        Ok(view)
    }

    /// Deletes a record; the enrollment's percentage is recomputed without it
    pub async fn delete(db: &DatabaseConnection, identity: &Identity, id: Uuid) -> ServiceResult<()> {
        let txn = db.begin().await?;

        let record = Self::find_scoped(&txn, identity, id).await?;
        let enrollment = enrollments::Entity::find_by_id(record.enrollment_id)
            .one(&txn)
            .await?
            .ok_or(ServiceError::NotFound("enrollment"))?;

        Self::authorize_write(&txn, identity, &enrollment).await?;

        attendance_records::Entity::delete_by_id(record.id)
            .exec(&txn)
            .await?;
        Self::recompute(&txn, enrollment.id).await?;

        txn.commit().await?;
        Ok(())
    }

    pub async fn get<C: ConnectionTrait>(
        conn: &C,
        identity: &Identity,
        id: Uuid,
    ) -> ServiceResult<AttendanceView> {
        let record = Self::find_scoped(conn, identity, id).await?;
        Self::view_of(conn, record).await
    }

    /// Lists the records visible to `identity`, newest first
    pub async fn list<C: ConnectionTrait>(
        conn: &C,
        identity: &Identity,
        filter: AttendanceFilter,
    ) -> ServiceResult<Vec<AttendanceView>> {
        let mut condition = Condition::all();

        if let Some(status) = filter.status {
            condition = condition.add(attendance_records::Column::Status.eq(status));
        }

        if let Some(date) = filter.date {
            condition = condition.add(attendance_records::Column::Date.eq(date));
        }

        if let Some(class_section_id) = filter.class_section_id {
            condition = condition.add(
                attendance_records::Column::EnrollmentId
                    .in_subquery(ScopeService::enrollments_of_section(class_section_id)),
            );
        }

        if let Some(search) = filter.search.filter(|s| !s.trim().is_empty()) {
            let pattern = format!("%{}%", search.trim());
            let matching_students = Query::select()
                .column(students::Column::Id)
                .from(students::Entity)
                .cond_where(
                    Condition::any()
                        .add(students::Column::Name.like(&pattern))
                        .add(students::Column::EnrollmentCode.like(&pattern)),
                )
                .to_owned();
            let matching_enrollments = Query::select()
                .column(enrollments::Column::Id)
                .from(enrollments::Entity)
                .and_where(enrollments::Column::StudentId.in_subquery(matching_students))
                .to_owned();

            condition = condition.add(
                Condition::any()
                    .add(attendance_records::Column::EnrollmentId.in_subquery(matching_enrollments))
                    .add(attendance_records::Column::Note.like(&pattern)),
            );
        }

        let records = ScopeService::attendance(identity)
            .filter(condition)
            .order_by_desc(attendance_records::Column::Date)
            .order_by_desc(attendance_records::Column::RecordedAt)
            .all(conn)
            .await?;

        Self::views_of(conn, records).await
    }

    async fn find_scoped<C: ConnectionTrait>(
        conn: &C,
        identity: &Identity,
        id: Uuid,
    ) -> ServiceResult<attendance_records::Model> {
        ScopeService::attendance(identity)
            .filter(attendance_records::Column::Id.eq(id))
            .one(conn)
            .await?
            .ok_or(ServiceError::NotFound("attendance record"))
    }

    async fn ensure_unique_date<C: ConnectionTrait>(
        conn: &C,
        enrollment_id: Uuid,
        date: NaiveDate,
        except: Option<Uuid>,
    ) -> ServiceResult<()> {
        let mut query = attendance_records::Entity::find()
            .filter(attendance_records::Column::EnrollmentId.eq(enrollment_id))
            .filter(attendance_records::Column::Date.eq(date));

        if let Some(except) = except {
            query = query.filter(attendance_records::Column::Id.ne(except));
        }

        if query.one(conn).await?.is_some() {
            return Err(ServiceError::validation(
                "date",
                "Attendance for this enrollment on this date was already recorded.",
            ));
        }

        Ok(())
    }

    async fn view_of<C: ConnectionTrait>(
        conn: &C,
        record: attendance_records::Model,
    ) -> ServiceResult<AttendanceView> {
        Self::views_of(conn, vec![record])
            .await?
            .pop()
            .ok_or(ServiceError::NotFound("enrollment"))
    }

    /// Attaches student and section to each record using batched lookups
    async fn views_of<C: ConnectionTrait>(
        conn: &C,
        records: Vec<attendance_records::Model>,
    ) -> ServiceResult<Vec<AttendanceView>> {
        if records.is_empty() {
            return Ok(vec![]);
        }

        let enrollment_ids: Vec<Uuid> = records.iter().map(|r| r.enrollment_id).collect();

        // Batch fetch enrollments with their students
        let enrollments: HashMap<Uuid, (enrollments::Model, students::Model)> =
            enrollments::Entity::find()
                .filter(enrollments::Column::Id.is_in(enrollment_ids))
                .find_also_related(students::Entity)
                .all(conn)
                .await?
                .into_iter()
                .filter_map(|(e, student)| student.map(|s| (e.id, (e, s))))
                .collect();

        let section_ids: Vec<Uuid> = enrollments
            .values()
            .map(|(e, _)| e.class_section_id)
            .collect();

        // Batch fetch sections
        let sections: HashMap<Uuid, class_sections::Model> = class_sections::Entity::find()
            .filter(class_sections::Column::Id.is_in(section_ids))
            .all(conn)
            .await?
            .into_iter()
            .map(|s| (s.id, s))
            .collect();

        Ok(records
            .into_iter()
            .filter_map(|record| {
                let (enrollment, student) = enrollments.get(&record.enrollment_id)?;
                let section = sections.get(&enrollment.class_section_id)?;
                Some(AttendanceView {
                    record,
                    student: student.clone(),
                    section: section.clone(),
                })
            })
            .collect())
    }
}
