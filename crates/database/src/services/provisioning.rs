use crate::entities::{accounts, professors, students};
use crate::services::{
    accounts::{AccountService, NewAccount},
    error::{ServiceError, ServiceResult},
    groups::GroupService,
    policy::AccountPolicy,
};
use chrono::Utc;
use log::{error, info, warn};
use models::{
    profile::{
        Gender, ProfileRole, UNASSIGNED, placeholder_birth_date, placeholder_enrollment_code,
        split_name,
    },
    username::base_username,
};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
    TransactionTrait,
};
use uuid::Uuid;

/// What provisioning did for an account
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionOutcome {
    /// The account already had a profile; nothing changed
    AlreadyLinked(ProfileRole),
    /// An existing profile with the account's e-mail was linked
    Linked(ProfileRole),
    /// A placeholder profile was created and linked
    Created(ProfileRole),
    /// Every attempt failed; the account has no profile
    Failed,
}

impl ProvisionOutcome {
    pub fn role(&self) -> Option<ProfileRole> {
        match self {
            Self::AlreadyLinked(role) | Self::Linked(role) | Self::Created(role) => Some(*role),
            Self::Failed => None,
        }
    }
}

pub struct ProvisioningService;

impl ProvisioningService {
    /// Makes sure a freshly created account ends up with exactly one profile.
    ///
    /// Each attempt runs in its own savepoint. When a professor profile cannot
    /// be provisioned and the policy allows it, a student profile is
    /// provisioned instead. Failures are logged, never returned.
    pub async fn provision_for_account<C>(
        conn: &C,
        policy: &AccountPolicy,
        account: &accounts::Model,
        requested: ProfileRole,
    ) -> ProvisionOutcome
    where
        C: ConnectionTrait + TransactionTrait,
    {
        match Self::linked_role(conn, account.id).await {
            Ok(Some(role)) => {
                info!(
                    "Account {} already has a {} profile",
                    account.username,
                    role.as_str()
                );
                return ProvisionOutcome::AlreadyLinked(role);
            }
            Ok(None) => {}
            Err(e) => {
                error!("Failed to inspect profiles of account {}: {e}", account.username);
                return ProvisionOutcome::Failed;
            }
        }

        info!(
            "Provisioning {} profile for account {}",
            requested.as_str(),
            account.username
        );

        let err = match Self::attempt(conn, account, requested).await {
            Ok(outcome) => return outcome,
            Err(e) => e,
        };

        error!(
            "Failed to provision {} profile for account {}: {err}",
            requested.as_str(),
            account.username
        );

        if requested != ProfileRole::Professor || !policy.fallback_to_student {
            return ProvisionOutcome::Failed;
        }

        warn!(
            "Falling back to a student profile for account {}",
            account.username
        );

        match Self::attempt(conn, account, ProfileRole::Student).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(
                    "Failed to provision student profile for account {}: {e}",
                    account.username
                );
                ProvisionOutcome::Failed
            }
        }
    }

    async fn attempt<C>(
        conn: &C,
        account: &accounts::Model,
        role: ProfileRole,
    ) -> ServiceResult<ProvisionOutcome>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        let txn = conn.begin().await?;

        let outcome = match role {
            ProfileRole::Professor => Self::link_or_create_professor(&txn, account).await?,
            ProfileRole::Student => Self::link_or_create_student(&txn, account).await?,
        };
        GroupService::sync(&txn, account.id, role).await?;

        txn.commit().await?;

        info!("Account {} is now a {}", account.username, role.as_str());
        Ok(outcome)
    }

    /// Role of the profile linked to the account, if any
    pub async fn linked_role<C: ConnectionTrait>(
        conn: &C,
        account_id: Uuid,
    ) -> ServiceResult<Option<ProfileRole>> {
        let professor = professors::Entity::find()
            .filter(professors::Column::AccountId.eq(account_id))
            .one(conn)
            .await?;
        if professor.is_some() {
            return Ok(Some(ProfileRole::Professor));
        }

        let student = students::Entity::find()
            .filter(students::Column::AccountId.eq(account_id))
            .one(conn)
            .await?;

        Ok(student.map(|_| ProfileRole::Student))
    }

    async fn link_or_create_professor<C: ConnectionTrait>(
        conn: &C,
        account: &accounts::Model,
    ) -> ServiceResult<ProvisionOutcome> {
        let existing = professors::Entity::find()
            .filter(professors::Column::Email.eq(account.email.as_str()))
            .one(conn)
            .await?;

        if let Some(professor) = existing {
            if professor.account_id.is_some_and(|id| id != account.id) {
                return Err(ServiceError::validation(
                    "email",
                    "a professor with this e-mail is linked to another account",
                ));
            }

            let name = professor.name.clone();
            let mut active: professors::ActiveModel = professor.into();
            active.account_id = Set(Some(account.id));
            active.update(conn).await?;

            info!("Linked existing professor {name} to account {}", account.username);
            return Ok(ProvisionOutcome::Linked(ProfileRole::Professor));
        }

        let professor = professors::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(account.display_name()),
            email: Set(account.email.clone()),
            department: Set(UNASSIGNED.to_string()),
            active: Set(true),
            account_id: Set(Some(account.id)),
            created_at: Set(Utc::now().naive_utc()),
        }
        .insert(conn)
        .await?;

        info!("Created professor {} for account {}", professor.name, account.username);
        Ok(ProvisionOutcome::Created(ProfileRole::Professor))
    }

    async fn link_or_create_student<C: ConnectionTrait>(
        conn: &C,
        account: &accounts::Model,
    ) -> ServiceResult<ProvisionOutcome> {
        let existing = if account.email.is_empty() {
            None
        } else {
            students::Entity::find()
                .filter(students::Column::Email.eq(account.email.as_str()))
                .one(conn)
                .await?
        };

        if let Some(student) = existing {
            if student.account_id.is_some_and(|id| id != account.id) {
                return Err(ServiceError::validation(
                    "email",
                    "a student with this e-mail is linked to another account",
                ));
            }

            let name = student.name.clone();
            let mut active: students::ActiveModel = student.into();
            active.account_id = Set(Some(account.id));
            active.update(conn).await?;

            info!("Linked existing student {name} to account {}", account.username);
            return Ok(ProvisionOutcome::Linked(ProfileRole::Student));
        }

        let email = (!account.email.is_empty()).then(|| account.email.clone());
        let student = students::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(account.display_name()),
            enrollment_code: Set(placeholder_enrollment_code(account.id)),
            email: Set(email),
            course: Set(UNASSIGNED.to_string()),
            birth_date: Set(placeholder_birth_date()),
            gender: Set(Gender::NotInformed),
            account_id: Set(Some(account.id)),
            created_at: Set(Utc::now().naive_utc()),
        }
        .insert(conn)
        .await?;

        info!("Created student {} for account {}", student.name, account.username);
        Ok(ProvisionOutcome::Created(ProfileRole::Student))
    }

    /// Synthesizes an account for a professor created without one.
    ///
    /// Returns `None` when the professor already had an account or when
    /// provisioning failed; failures are logged.
    pub async fn provision_for_professor<C>(
        conn: &C,
        policy: &AccountPolicy,
        professor: &professors::Model,
    ) -> Option<accounts::Model>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        if professor.account_id.is_some() {
            return None;
        }

        info!("Creating account for professor {}", professor.name);

        match Self::account_for_professor(conn, policy, professor).await {
            Ok(account) => {
                info!(
                    "Created account {} for professor {}",
                    account.username, professor.name
                );
                Some(account)
            }
            Err(e) => {
                error!("Failed to create account for professor {}: {e}", professor.name);
                None
            }
        }
    }

    async fn account_for_professor<C>(
        conn: &C,
        policy: &AccountPolicy,
        professor: &professors::Model,
    ) -> ServiceResult<accounts::Model>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        let txn = conn.begin().await?;

        let base = base_username(Some(&professor.email), &professor.email);
        let account = Self::create_profile_account(
            &txn,
            policy,
            &base,
            &professor.email,
            &professor.name,
        )
        .await?;

        let mut active: professors::ActiveModel = professor.clone().into();
        active.account_id = Set(Some(account.id));
        active.update(&txn).await?;

        let account = GroupService::sync(&txn, account.id, ProfileRole::Professor).await?;

        txn.commit().await?;
        Ok(account)
    }

    /// Synthesizes an account for a student created without one.
    ///
    /// The username comes from the e-mail, or the enrollment code when the
    /// student has no e-mail.
    pub async fn provision_for_student<C>(
        conn: &C,
        policy: &AccountPolicy,
        student: &students::Model,
    ) -> Option<accounts::Model>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        if student.account_id.is_some() {
            return None;
        }

        info!("Creating account for student {}", student.name);

        match Self::account_for_student(conn, policy, student).await {
            Ok(account) => {
                info!(
                    "Created account {} for student {}",
                    account.username, student.name
                );
                Some(account)
            }
            Err(e) => {
                error!("Failed to create account for student {}: {e}", student.name);
                None
            }
        }
    }

    async fn account_for_student<C>(
        conn: &C,
        policy: &AccountPolicy,
        student: &students::Model,
    ) -> ServiceResult<accounts::Model>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        let txn = conn.begin().await?;

        let base = base_username(student.email.as_deref(), &student.enrollment_code);
        let account = Self::create_profile_account(
            &txn,
            policy,
            &base,
            student.email.as_deref().unwrap_or_default(),
            &student.name,
        )
        .await?;

        let mut active: students::ActiveModel = student.clone().into();
        active.account_id = Set(Some(account.id));
        active.update(&txn).await?;

        let account = GroupService::sync(&txn, account.id, ProfileRole::Student).await?;

        txn.commit().await?;
        Ok(account)
    }

    async fn create_profile_account<C: ConnectionTrait>(
        conn: &C,
        policy: &AccountPolicy,
        base: &str,
        email: &str,
        name: &str,
    ) -> ServiceResult<accounts::Model> {
        let username = AccountService::unique_username(conn, base).await?;
        let (first_name, last_name) = split_name(name);

        AccountService::create(
            conn,
            policy,
            NewAccount {
                username,
                email: email.to_string(),
                first_name,
                last_name,
                password: None,
                is_staff: false,
            },
        )
        .await
    }
}
