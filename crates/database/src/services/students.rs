use crate::entities::{attendance_records, class_sections, enrollments, students};
use crate::services::{
    access::{require_admin, require_manage},
    error::{ServiceError, ServiceResult},
    groups::GroupService,
    policy::AccountPolicy,
    provisioning::ProvisioningService,
    scope::ScopeService,
};
use chrono::{NaiveDate, Utc};
use log::info;
use models::{
    identity::Identity,
    profile::{Gender, ProfileRole},
};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, ConnectionTrait,
    DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, TransactionTrait, sea_query::Expr,
};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct NewStudent {
    pub name: String,
    pub enrollment_code: String,
    pub email: Option<String>,
    pub course: String,
    pub birth_date: NaiveDate,
    pub gender: Gender,
}

#[derive(Debug, Clone, Default)]
pub struct StudentChanges {
    pub name: Option<String>,
    pub enrollment_code: Option<String>,
    /// `Some(None)` removes the e-mail
    pub email: Option<Option<String>>,
    pub course: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub gender: Option<Gender>,
}

#[derive(Debug, Clone, Default)]
pub struct StudentFilter {
    pub course: Option<String>,
    pub gender: Option<Gender>,
    /// Matches name, enrollment code or e-mail
    pub search: Option<String>,
}

pub struct StudentService;

impl StudentService {
    pub async fn list<C: ConnectionTrait>(
        conn: &C,
        filter: StudentFilter,
    ) -> ServiceResult<Vec<students::Model>> {
        let mut condition = Condition::all();

        if let Some(course) = filter.course {
            condition = condition.add(students::Column::Course.eq(course));
        }
        if let Some(gender) = filter.gender {
            condition = condition.add(students::Column::Gender.eq(gender));
        }
        if let Some(search) = filter.search.filter(|s| !s.trim().is_empty()) {
            let pattern = format!("%{}%", search.trim());
            condition = condition.add(
                Condition::any()
                    .add(students::Column::Name.like(&pattern))
                    .add(students::Column::EnrollmentCode.like(&pattern))
                    .add(students::Column::Email.like(&pattern)),
            );
        }

        Ok(students::Entity::find()
            .filter(condition)
            .order_by_asc(students::Column::Name)
            .all(conn)
            .await?)
    }

    pub async fn get<C: ConnectionTrait>(conn: &C, id: Uuid) -> ServiceResult<students::Model> {
        students::Entity::find_by_id(id)
            .one(conn)
            .await?
            .ok_or(ServiceError::NotFound("student"))
    }

    /// Creates a student and provisions an account for it
    pub async fn create(
        db: &DatabaseConnection,
        policy: &AccountPolicy,
        identity: &Identity,
        new_student: NewStudent,
    ) -> ServiceResult<students::Model> {
        require_manage(identity)?;

        let enrollment_code = new_student.enrollment_code.trim().to_string();
        if enrollment_code.is_empty() {
            return Err(ServiceError::validation(
                "enrollment_code",
                "This field is required.",
            ));
        }
        let email = normalize_email(new_student.email);

        let txn = db.begin().await?;
        Self::ensure_unique(&txn, &enrollment_code, email.as_deref(), None).await?;

        let student = students::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(new_student.name),
            enrollment_code: Set(enrollment_code),
            email: Set(email),
            course: Set(new_student.course),
            birth_date: Set(new_student.birth_date),
            gender: Set(new_student.gender),
            account_id: Set(None),
            created_at: Set(Utc::now().naive_utc()),
        }
        .insert(&txn)
        .await?;

        let student = match ProvisioningService::provision_for_student(&txn, policy, &student).await
        {
            Some(_) => Self::get(&txn, student.id).await?,
            None => student,
        };

        txn.commit().await?;

        info!("Created student {}", student.name);
        Ok(student)
    }

    /// Applies the changes and resynchronizes the linked account
    pub async fn update(
        db: &DatabaseConnection,
        identity: &Identity,
        id: Uuid,
        changes: StudentChanges,
    ) -> ServiceResult<students::Model> {
        require_manage(identity)?;

        let txn = db.begin().await?;
        let student = Self::get(&txn, id).await?;

        let enrollment_code = changes.enrollment_code.map(|c| c.trim().to_string());
        let email = changes.email.map(normalize_email);

        if enrollment_code.as_deref().is_some_and(str::is_empty) {
            return Err(ServiceError::validation(
                "enrollment_code",
                "This field is required.",
            ));
        }

        Self::ensure_unique(
            &txn,
            enrollment_code.as_deref().unwrap_or(&student.enrollment_code),
            email
                .as_ref()
                .map(|e| e.as_deref())
                .unwrap_or(student.email.as_deref()),
            Some(student.id),
        )
        .await?;

        let mut active: students::ActiveModel = student.into();
        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(enrollment_code) = enrollment_code {
            active.enrollment_code = Set(enrollment_code);
        }
        if let Some(email) = email {
            active.email = Set(email);
        }
        if let Some(course) = changes.course {
            active.course = Set(course);
        }
        if let Some(birth_date) = changes.birth_date {
            active.birth_date = Set(birth_date);
        }
        if let Some(gender) = changes.gender {
            active.gender = Set(gender);
        }
        let student = active.update(&txn).await?;

        if let Some(account_id) = student.account_id {
            GroupService::sync(&txn, account_id, ProfileRole::Student).await?;
        }

        txn.commit().await?;
        Ok(student)
    }

    /// Deletes the student with its enrollments and attendance records.
    ///
    /// Sections it represented survive without a representative.
    pub async fn delete(db: &DatabaseConnection, identity: &Identity, id: Uuid) -> ServiceResult<()> {
        require_admin(identity)?;

        let txn = db.begin().await?;
        let student = Self::get(&txn, id).await?;

        class_sections::Entity::update_many()
            .col_expr(
                class_sections::Column::RepresentativeId,
                Expr::value(Option::<Uuid>::None),
            )
            .filter(class_sections::Column::RepresentativeId.eq(student.id))
            .exec(&txn)
            .await?;
        attendance_records::Entity::delete_many()
            .filter(
                attendance_records::Column::EnrollmentId
                    .in_subquery(ScopeService::enrollments_of_student(student.id)),
            )
            .exec(&txn)
            .await?;
        enrollments::Entity::delete_many()
            .filter(enrollments::Column::StudentId.eq(student.id))
            .exec(&txn)
            .await?;
        students::Entity::delete_by_id(student.id)
            .exec(&txn)
            .await?;

        txn.commit().await?;

        info!("Deleted student {}", student.name);
        Ok(())
    }

    async fn ensure_unique<C: ConnectionTrait>(
        conn: &C,
        enrollment_code: &str,
        email: Option<&str>,
        except: Option<Uuid>,
    ) -> ServiceResult<()> {
        let mut code_query =
            students::Entity::find().filter(students::Column::EnrollmentCode.eq(enrollment_code));
        if let Some(except) = except {
            code_query = code_query.filter(students::Column::Id.ne(except));
        }
        if code_query.one(conn).await?.is_some() {
            return Err(ServiceError::validation(
                "enrollment_code",
                "A student with this enrollment code already exists.",
            ));
        }

        let Some(email) = email else {
            return Ok(());
        };

        let mut email_query = students::Entity::find().filter(students::Column::Email.eq(email));
        if let Some(except) = except {
            email_query = email_query.filter(students::Column::Id.ne(except));
        }
        if email_query.one(conn).await?.is_some() {
            return Err(ServiceError::validation(
                "email",
                "A student with this e-mail already exists.",
            ));
        }

        Ok(())
    }
}

/// Blank e-mails are stored as missing so they never collide
fn normalize_email(email: Option<String>) -> Option<String> {
    email
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty())
}
