use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "groups")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::account_groups::Entity")]
    AccountGroups,
}

impl Related<super::account_groups::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AccountGroups.def()
    }
}

// Many-to-many relationship with accounts
impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        super::account_groups::Relation::Account.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::account_groups::Relation::Group.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
