use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Staff accounts are administrators
    pub is_staff: bool,
    pub is_active: bool,
    pub created_at: DateTime,
}

impl Model {
    /// "First Last", or the username when no name was given
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::professors::Entity")]
    Professor,
    #[sea_orm(has_one = "super::students::Entity")]
    Student,
    #[sea_orm(has_many = "super::account_groups::Entity")]
    AccountGroups,
    #[sea_orm(has_many = "super::auth_tokens::Entity")]
    AuthTokens,
}

impl Related<super::professors::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Professor.def()
    }
}

impl Related<super::students::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl Related<super::account_groups::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AccountGroups.def()
    }
}

impl Related<super::auth_tokens::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AuthTokens.def()
    }
}

// Many-to-many relationship with groups
impl Related<super::groups::Entity> for Entity {
    fn to() -> RelationDef {
        super::account_groups::Relation::Group.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::account_groups::Relation::Account.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
