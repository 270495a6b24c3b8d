use crate::entities::{accounts, professors, students};
use crate::services::{error::ServiceResult, groups::GroupService};
use models::{identity::Identity, profile::RoleGroup};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};

pub struct IdentityService;

impl IdentityService {
    /// Resolves the caller's identity from its account.
    ///
    /// Staff wins over profiles, profiles win over coordinator membership.
    pub async fn resolve<C: ConnectionTrait>(
        conn: &C,
        account: Option<&accounts::Model>,
    ) -> ServiceResult<Identity> {
        let Some(account) = account else {
            return Ok(Identity::Anonymous);
        };

        if account.is_staff {
            return Ok(Identity::Admin);
        }

        if let Some(professor) = professors::Entity::find()
            .filter(professors::Column::AccountId.eq(account.id))
            .one(conn)
            .await?
        {
            return Ok(Identity::Professor(professor.id));
        }

        if let Some(student) = students::Entity::find()
            .filter(students::Column::AccountId.eq(account.id))
            .one(conn)
            .await?
        {
            return Ok(Identity::Student(student.id));
        }

        if GroupService::is_member(conn, account.id, RoleGroup::Coordinator).await? {
            return Ok(Identity::Coordinator);
        }

        Ok(Identity::Anonymous)
    }
}
