use crate::entities::{class_sections, professors};
use crate::services::{
    access::{require_admin, require_manage},
    error::{ServiceError, ServiceResult},
    groups::GroupService,
    policy::AccountPolicy,
    provisioning::ProvisioningService,
};
use chrono::Utc;
use log::info;
use models::{identity::Identity, profile::ProfileRole};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, ConnectionTrait,
    DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    TransactionTrait, sea_query::Expr,
};
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct NewProfessor {
    pub name: String,
    pub email: String,
    pub department: String,
    pub active: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ProfessorChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub department: Option<String>,
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct ProfessorFilter {
    pub active: Option<bool>,
    pub department: Option<String>,
    /// Matches name or e-mail
    pub search: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ProfessorView {
    pub professor: professors::Model,
    pub section_count: u64,
}

pub struct ProfessorService;

impl ProfessorService {
    pub async fn list<C: ConnectionTrait>(
        conn: &C,
        filter: ProfessorFilter,
    ) -> ServiceResult<Vec<ProfessorView>> {
        let mut condition = Condition::all();

        if let Some(active) = filter.active {
            condition = condition.add(professors::Column::Active.eq(active));
        }
        if let Some(department) = filter.department {
            condition = condition.add(professors::Column::Department.eq(department));
        }
        if let Some(search) = filter.search.filter(|s| !s.trim().is_empty()) {
            let pattern = format!("%{}%", search.trim());
            condition = condition.add(
                Condition::any()
                    .add(professors::Column::Name.like(&pattern))
                    .add(professors::Column::Email.like(&pattern)),
            );
        }

        let professors = professors::Entity::find()
            .filter(condition)
            .order_by_asc(professors::Column::Name)
            .all(conn)
            .await?;

        Self::views_of(conn, professors).await
    }

    pub async fn get<C: ConnectionTrait>(conn: &C, id: Uuid) -> ServiceResult<ProfessorView> {
        let professor = Self::find(conn, id).await?;
        let section_count = class_sections::Entity::find()
            .filter(class_sections::Column::ProfessorId.eq(professor.id))
            .count(conn)
            .await?;

        Ok(ProfessorView {
            professor,
            section_count,
        })
    }

    /// Active professors for the unauthenticated listing
    pub async fn public_active<C: ConnectionTrait>(conn: &C) -> ServiceResult<Vec<professors::Model>> {
        Ok(professors::Entity::find()
            .filter(professors::Column::Active.eq(true))
            .order_by_asc(professors::Column::Name)
            .all(conn)
            .await?)
    }

    /// Creates a professor and provisions an account for it
    pub async fn create(
        db: &DatabaseConnection,
        policy: &AccountPolicy,
        identity: &Identity,
        new_professor: NewProfessor,
    ) -> ServiceResult<ProfessorView> {
        require_manage(identity)?;

        let email = new_professor.email.trim().to_string();
        if email.is_empty() {
            return Err(ServiceError::validation("email", "This field is required."));
        }

        let txn = db.begin().await?;
        Self::ensure_unique_email(&txn, &email, None).await?;

        let professor = professors::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(new_professor.name),
            email: Set(email),
            department: Set(new_professor.department),
            active: Set(new_professor.active),
            account_id: Set(None),
            created_at: Set(Utc::now().naive_utc()),
        }
        .insert(&txn)
        .await?;

        let professor = match ProvisioningService::provision_for_professor(&txn, policy, &professor)
            .await
        {
            Some(_) => Self::find(&txn, professor.id).await?,
            None => professor,
        };

        txn.commit().await?;

        info!("Created professor {}", professor.name);
        Ok(ProfessorView {
            professor,
            section_count: 0,
        })
    }

    /// Applies the changes and resynchronizes the linked account
    pub async fn update(
        db: &DatabaseConnection,
        identity: &Identity,
        id: Uuid,
        changes: ProfessorChanges,
    ) -> ServiceResult<ProfessorView> {
        require_manage(identity)?;

        let txn = db.begin().await?;
        let professor = Self::find(&txn, id).await?;

        let email = changes.email.map(|e| e.trim().to_string());
        if let Some(email) = &email {
            if email.is_empty() {
                return Err(ServiceError::validation("email", "This field is required."));
            }
            Self::ensure_unique_email(&txn, email, Some(professor.id)).await?;
        }

        let mut active: professors::ActiveModel = professor.into();
        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(email) = email {
            active.email = Set(email);
        }
        if let Some(department) = changes.department {
            active.department = Set(department);
        }
        if let Some(is_active) = changes.active {
            active.active = Set(is_active);
        }
        let professor = active.update(&txn).await?;

        if let Some(account_id) = professor.account_id {
            GroupService::sync(&txn, account_id, ProfileRole::Professor).await?;
        }

        let view = Self::get(&txn, professor.id).await?;
        txn.commit().await?;

        Ok(view)
    }

    /// Deletes a professor that no class section references
    pub async fn delete(db: &DatabaseConnection, identity: &Identity, id: Uuid) -> ServiceResult<()> {
        require_admin(identity)?;

        let txn = db.begin().await?;
        let professor = Self::find(&txn, id).await?;

        let sections = class_sections::Entity::find()
            .filter(class_sections::Column::ProfessorId.eq(professor.id))
            .count(&txn)
            .await?;
        if sections > 0 {
            return Err(ServiceError::Protected(format!(
                "professor {} still teaches {sections} class section(s)",
                professor.name
            )));
        }

        professors::Entity::delete_by_id(professor.id)
            .exec(&txn)
            .await?;

        txn.commit().await?;

        info!("Deleted professor {}", professor.name);
        Ok(())
    }

    async fn find<C: ConnectionTrait>(conn: &C, id: Uuid) -> ServiceResult<professors::Model> {
        professors::Entity::find_by_id(id)
            .one(conn)
            .await?
            .ok_or(ServiceError::NotFound("professor"))
    }

    async fn ensure_unique_email<C: ConnectionTrait>(
        conn: &C,
        email: &str,
        except: Option<Uuid>,
    ) -> ServiceResult<()> {
        let mut query = professors::Entity::find().filter(professors::Column::Email.eq(email));
        if let Some(except) = except {
            query = query.filter(professors::Column::Id.ne(except));
        }

        if query.one(conn).await?.is_some() {
            return Err(ServiceError::validation(
                "email",
                "A professor with this e-mail already exists.",
            ));
        }

        Ok(())
    }

    async fn views_of<C: ConnectionTrait>(
        conn: &C,
        professors: Vec<professors::Model>,
    ) -> ServiceResult<Vec<ProfessorView>> {
        if professors.is_empty() {
            return Ok(vec![]);
        }

        let ids: Vec<Uuid> = professors.iter().map(|p| p.id).collect();

        let counts: HashMap<Uuid, i64> = class_sections::Entity::find()
            .select_only()
            .column(class_sections::Column::ProfessorId)
            .column_as(Expr::col(class_sections::Column::Id).count(), "section_count")
            .filter(class_sections::Column::ProfessorId.is_in(ids))
            .group_by(class_sections::Column::ProfessorId)
            .into_tuple::<(Uuid, i64)>()
            .all(conn)
            .await?
            .into_iter()
            .collect();

        Ok(professors
            .into_iter()
            .map(|professor| {
                let section_count = counts.get(&professor.id).copied().unwrap_or(0) as u64;
                ProfessorView {
                    professor,
                    section_count,
                }
            })
            .collect())
    }
}
