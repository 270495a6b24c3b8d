use models::class_section::{ClassStatus, DateRange};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "class_sections")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub professor_id: Uuid,
    pub start_date: Date,
    pub end_date: Date,
    pub status: ClassStatus,
    /// Student representative; must be enrolled in this section
    #[sea_orm(unique)]
    pub representative_id: Option<Uuid>,
    pub created_at: DateTime,
}

impl Model {
    pub fn duration_days(&self) -> i64 {
        DateRange {
            start: self.start_date,
            end: self.end_date,
        }
        .duration_days()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::professors::Entity",
        from = "Column::ProfessorId",
        to = "super::professors::Column::Id",
        on_delete = "Restrict"
    )]
    Professor,
    #[sea_orm(
        belongs_to = "super::students::Entity",
        from = "Column::RepresentativeId",
        to = "super::students::Column::Id",
        on_delete = "SetNull"
    )]
    Representative,
    #[sea_orm(has_many = "super::enrollments::Entity")]
    Enrollments,
}

impl Related<super::professors::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Professor.def()
    }
}

impl Related<super::enrollments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Enrollments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
