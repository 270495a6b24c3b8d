use crate::entities::{accounts, auth_tokens};
use crate::services::{
    error::{NON_FIELD, ServiceError, ServiceResult},
    groups::GroupService,
    policy::AccountPolicy,
    provisioning::ProvisioningService,
};
use chrono::Utc;
use log::{info, warn};
use models::{profile::ProfileRole, username::disambiguate};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, QueryFilter, QuerySelect, TransactionTrait, sea_query::LikeExpr,
};
use std::collections::HashSet;
use uuid::Uuid;

/// Minimum length accepted for a new password
pub const MIN_PASSWORD_LEN: usize = 6;

/// Data needed to create an account directly
#[derive(Debug, Clone, Default)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// `None` assigns the policy's default password
    pub password: Option<String>,
    pub is_staff: bool,
}

/// Self-service registration form
#[derive(Debug, Clone, Default)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
    pub first_name: String,
    pub last_name: String,
    pub role: ProfileRole,
}

#[derive(Debug, Clone, Default)]
pub struct AccountChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PasswordChange {
    pub old_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

pub struct AccountService;

impl AccountService {
    /// Registers an account, provisions its profile and issues a token.
    ///
    /// Runs in one transaction; provisioning failures are logged and do not
    /// prevent the account from being created.
    pub async fn register(
        db: &DatabaseConnection,
        policy: &AccountPolicy,
        registration: Registration,
    ) -> ServiceResult<(accounts::Model, String)> {
        let username = registration.username.trim().to_string();
        let email = registration.email.trim().to_string();

        if username.is_empty() {
            return Err(ServiceError::validation("username", "This field is required."));
        }
        if email.is_empty() {
            return Err(ServiceError::validation("email", "This field is required."));
        }
        if registration.password != registration.password_confirmation {
            return Err(ServiceError::validation(
                "password",
                "Passwords do not match.",
            ));
        }
        if Self::find_by_username(db, &username).await?.is_some() {
            return Err(ServiceError::validation(
                "username",
                "A user with that username already exists.",
            ));
        }

        let txn = db.begin().await?;

        let account = Self::create(
            &txn,
            policy,
            NewAccount {
                username,
                email,
                first_name: registration.first_name,
                last_name: registration.last_name,
                password: Some(registration.password),
                is_staff: false,
            },
        )
        .await?;

        ProvisioningService::provision_for_account(&txn, policy, &account, registration.role)
            .await;

        let token = Self::issue_token(&txn, account.id).await?;

        // Provisioning may have rewritten the e-mail
        let account = accounts::Entity::find_by_id(account.id)
            .one(&txn)
            .await?
            .ok_or(ServiceError::NotFound("account"))?;

        txn.commit().await?;

        info!("Registered account {}", account.username);
        Ok((account, token))
    }

    /// Inserts an account row; no profile is provisioned
    pub async fn create<C: ConnectionTrait>(
        conn: &C,
        policy: &AccountPolicy,
        new_account: NewAccount,
    ) -> ServiceResult<accounts::Model> {
        let password = match new_account.password {
            Some(password) => password,
            None => Self::provisioned_password(policy, &new_account.username),
        };

        let account = accounts::ActiveModel {
            id: Set(Uuid::new_v4()),
            username: Set(new_account.username),
            email: Set(new_account.email),
            first_name: Set(new_account.first_name),
            last_name: Set(new_account.last_name),
            password_hash: Set(bcrypt::hash(password, policy.password_cost)?),
            is_staff: Set(new_account.is_staff),
            is_active: Set(true),
            created_at: Set(Utc::now().naive_utc()),
        }
        .insert(conn)
        .await?;

        Ok(account)
    }

    fn provisioned_password(policy: &AccountPolicy, username: &str) -> String {
        match &policy.default_password {
            Some(password) => {
                warn!("Account {username} was given the configured default password");
                password.clone()
            }
            None => {
                warn!(
                    "Account {username} was given a random password; it must be reset before use"
                );
                format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
            }
        }
    }

    /// `base`, or `base` followed by the lowest counter that is not taken
    pub async fn unique_username<C: ConnectionTrait>(
        conn: &C,
        base: &str,
    ) -> ServiceResult<String> {
        let taken: HashSet<String> = accounts::Entity::find()
            .select_only()
            .column(accounts::Column::Username)
            .filter(
                accounts::Column::Username
                    .like(LikeExpr::new(prefix_pattern(base)).escape('\\')),
            )
            .into_tuple::<String>()
            .all(conn)
            .await?
            .into_iter()
            .collect();

        Ok(disambiguate(base, |candidate| taken.contains(candidate)))
    }

    pub async fn find_by_username<C: ConnectionTrait>(
        conn: &C,
        username: &str,
    ) -> ServiceResult<Option<accounts::Model>> {
        Ok(accounts::Entity::find()
            .filter(accounts::Column::Username.eq(username))
            .one(conn)
            .await?)
    }

    /// Verifies credentials and returns the account with its token
    pub async fn login(
        db: &DatabaseConnection,
        username: &str,
        password: &str,
    ) -> ServiceResult<(accounts::Model, String)> {
        if username.is_empty() || password.is_empty() {
            return Err(ServiceError::validation(
                NON_FIELD,
                "Username and password are required.",
            ));
        }

        let account = Self::find_by_username(db, username)
            .await?
            .filter(|account| bcrypt::verify(password, &account.password_hash).unwrap_or(false))
            .ok_or_else(|| ServiceError::validation(NON_FIELD, "Invalid credentials."))?;

        if !account.is_active {
            return Err(ServiceError::validation(NON_FIELD, "Account disabled."));
        }

        let token = Self::issue_token(db, account.id).await?;
        info!("Account {} logged in", account.username);

        Ok((account, token))
    }

    /// Returns the account's existing token, or creates one
    pub async fn issue_token<C: ConnectionTrait>(
        conn: &C,
        account_id: Uuid,
    ) -> ServiceResult<String> {
        if let Some(existing) = auth_tokens::Entity::find()
            .filter(auth_tokens::Column::AccountId.eq(account_id))
            .one(conn)
            .await?
        {
            return Ok(existing.key);
        }

        let token = auth_tokens::ActiveModel {
            key: Set(Uuid::new_v4().simple().to_string()),
            account_id: Set(account_id),
            created_at: Set(Utc::now().naive_utc()),
        }
        .insert(conn)
        .await?;

        Ok(token.key)
    }

    /// Revokes every token the account holds
    pub async fn logout<C: ConnectionTrait>(conn: &C, account_id: Uuid) -> ServiceResult<()> {
        auth_tokens::Entity::delete_many()
            .filter(auth_tokens::Column::AccountId.eq(account_id))
            .exec(conn)
            .await?;

        Ok(())
    }

    /// Resolves a bearer token to an active account
    pub async fn authenticate<C: ConnectionTrait>(
        conn: &C,
        token: &str,
    ) -> ServiceResult<Option<accounts::Model>> {
        let found = auth_tokens::Entity::find_by_id(token.to_string())
            .find_also_related(accounts::Entity)
            .one(conn)
            .await?;

        Ok(found
            .and_then(|(_, account)| account)
            .filter(|account| account.is_active))
    }

    pub async fn update_profile(
        db: &DatabaseConnection,
        account: accounts::Model,
        changes: AccountChanges,
    ) -> ServiceResult<accounts::Model> {
        let mut active: accounts::ActiveModel = account.into();

        if let Some(first_name) = changes.first_name {
            active.first_name = Set(first_name);
        }
        if let Some(last_name) = changes.last_name {
            active.last_name = Set(last_name);
        }
        if let Some(email) = changes.email {
            active.email = Set(email.trim().to_string());
        }

        Ok(active.update(db).await?)
    }

    /// Changes the password, revokes all tokens and returns a fresh one
    pub async fn change_password(
        db: &DatabaseConnection,
        policy: &AccountPolicy,
        account: accounts::Model,
        change: PasswordChange,
    ) -> ServiceResult<String> {
        if change.new_password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ServiceError::validation(
                "new_password",
                format!("Ensure this field has at least {MIN_PASSWORD_LEN} characters."),
            ));
        }
        if change.new_password != change.confirm_password {
            return Err(ServiceError::validation(
                "confirm_password",
                "The new passwords do not match.",
            ));
        }
        if !bcrypt::verify(&change.old_password, &account.password_hash)? {
            return Err(ServiceError::validation(
                "old_password",
                "Current password is incorrect.",
            ));
        }

        let txn = db.begin().await?;

        let account_id = account.id;
        let mut active: accounts::ActiveModel = account.into();
        active.password_hash = Set(bcrypt::hash(&change.new_password, policy.password_cost)?);
        active.update(&txn).await?;

        Self::logout(&txn, account_id).await?;
        let token = Self::issue_token(&txn, account_id).await?;

        txn.commit().await?;
        Ok(token)
    }

    /// Label shown to clients: "Administrator" for staff, else the first group
    pub async fn group_label<C: ConnectionTrait>(
        conn: &C,
        account: &accounts::Model,
    ) -> ServiceResult<String> {
        if account.is_staff {
            return Ok("Administrator".to_string());
        }

        Ok(GroupService::group_names(conn, account.id)
            .await?
            .into_iter()
            .next()
            .unwrap_or_else(|| "No group".to_string()))
    }
}

/// `LIKE` pattern matching every string that starts with `prefix`
fn prefix_pattern(prefix: &str) -> String {
    let mut pattern = String::with_capacity(prefix.len() + 1);
    for c in prefix.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_prefix_pattern_escapes_wildcards() {
        assert_eq!(prefix_pattern("grace"), "grace%");
        assert_eq!(prefix_pattern(r"o\neil"), r"o\\neil%");
        assert_eq!(prefix_pattern("a_b%c"), r"a\_b\%c%");
    }
}
