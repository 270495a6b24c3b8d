use crate::entities::{account_groups, accounts, groups, professors, students};
use crate::services::error::{ServiceError, ServiceResult};
use log::{debug, info};
use models::profile::{ProfileRole, RoleGroup};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder,
};
use uuid::Uuid;

pub struct GroupService;

impl GroupService {
    /// Ensures `account_id` is in the group for `role` and not in the opposing one.
    ///
    /// Also copies the linked profile's e-mail onto the account when the two
    /// have diverged. Running it again with the same role changes nothing.
    pub async fn sync<C: ConnectionTrait>(
        conn: &C,
        account_id: Uuid,
        role: ProfileRole,
    ) -> ServiceResult<accounts::Model> {
        let account = accounts::Entity::find_by_id(account_id)
            .one(conn)
            .await?
            .ok_or(ServiceError::NotFound("account"))?;

        Self::add_member(conn, account_id, role.group()).await?;
        Self::remove_member(conn, account_id, role.opposing_group()).await?;

        let profile_email = match role {
            ProfileRole::Professor => professors::Entity::find()
                .filter(professors::Column::AccountId.eq(account_id))
                .one(conn)
                .await?
                .map(|professor| professor.email),
            ProfileRole::Student => students::Entity::find()
                .filter(students::Column::AccountId.eq(account_id))
                .one(conn)
                .await?
                .and_then(|student| student.email),
        };

        let account = match profile_email {
            Some(email) if email != account.email => {
                debug!(
                    "Copying profile e-mail onto account {}: {} -> {}",
                    account.username, account.email, email
                );
                let mut active: accounts::ActiveModel = account.into();
                active.email = Set(email);
                active.update(conn).await?
            }
            _ => account,
        };

        info!(
            "Account {} synchronized as {}",
            account.username,
            role.group().name()
        );

        Ok(account)
    }

    /// Finds the group, creating it on first use
    pub async fn ensure_group<C: ConnectionTrait>(
        conn: &C,
        group: RoleGroup,
    ) -> ServiceResult<groups::Model> {
        if let Some(existing) = Self::find_group(conn, group).await? {
            return Ok(existing);
        }

        let created = groups::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(group.name().to_string()),
        }
        .insert(conn)
        .await?;

        info!("Created group {}", created.name);
        Ok(created)
    }

    pub async fn find_group<C: ConnectionTrait>(
        conn: &C,
        group: RoleGroup,
    ) -> ServiceResult<Option<groups::Model>> {
        Ok(groups::Entity::find()
            .filter(groups::Column::Name.eq(group.name()))
            .one(conn)
            .await?)
    }

    /// Adds the account to the group; a no-op when already a member
    pub async fn add_member<C: ConnectionTrait>(
        conn: &C,
        account_id: Uuid,
        group: RoleGroup,
    ) -> ServiceResult<()> {
        let group = Self::ensure_group(conn, group).await?;

        let existing = account_groups::Entity::find()
            .filter(account_groups::Column::AccountId.eq(account_id))
            .filter(account_groups::Column::GroupId.eq(group.id))
            .one(conn)
            .await?;

        if existing.is_none() {
            account_groups::ActiveModel {
                id: Set(Uuid::new_v4()),
                account_id: Set(account_id),
                group_id: Set(group.id),
            }
            .insert(conn)
            .await?;
        }

        Ok(())
    }

    /// Removes the account from the group if it is a member
    pub async fn remove_member<C: ConnectionTrait>(
        conn: &C,
        account_id: Uuid,
        group: RoleGroup,
    ) -> ServiceResult<()> {
        let Some(group) = Self::find_group(conn, group).await? else {
            return Ok(());
        };

        account_groups::Entity::delete_many()
            .filter(account_groups::Column::AccountId.eq(account_id))
            .filter(account_groups::Column::GroupId.eq(group.id))
            .exec(conn)
            .await?;

        Ok(())
    }

    /// Names of every group the account belongs to, alphabetically
    pub async fn group_names<C: ConnectionTrait>(
        conn: &C,
        account_id: Uuid,
    ) -> ServiceResult<Vec<String>> {
        let memberships = account_groups::Entity::find()
            .filter(account_groups::Column::AccountId.eq(account_id))
            .find_also_related(groups::Entity)
            .order_by_asc(groups::Column::Name)
            .all(conn)
            .await?;

        Ok(memberships
            .into_iter()
            .filter_map(|(_, group)| group.map(|g| g.name))
            .collect())
    }

    pub async fn is_member<C: ConnectionTrait>(
        conn: &C,
        account_id: Uuid,
        group: RoleGroup,
    ) -> ServiceResult<bool> {
        Ok(Self::group_names(conn, account_id)
            .await?
            .iter()
            .any(|name| name == group.name()))
    }
}
