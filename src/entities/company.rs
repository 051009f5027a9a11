use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Deserialize, Serialize, ToSchema)]
#[schema(as = Company)]
#[sea_orm(table_name = "companies")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub tagline: Option<String>,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    pub cover_url: Option<String>,
    pub website: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::OwnerId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Owner,
    #[sea_orm(has_many = "super::company_industry::Entity")]
    Industries,
    #[sea_orm(has_many = "super::funding_round::Entity")]
    FundingRounds,
    #[sea_orm(has_many = "super::cap_table_entry::Entity")]
    CapTableEntries,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl Related<super::company_industry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Industries.def()
    }
}

impl Related<super::funding_round::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FundingRounds.def()
    }
}

impl Related<super::cap_table_entry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CapTableEntries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
