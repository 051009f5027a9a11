use sea_orm::entity::prelude::*;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, ToSchema)]
#[schema(as = InvestorPreference)]
#[sea_orm(table_name = "investor_preferences")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = true)]
    pub id: i64,
    pub investor_id: Uuid,
    /// sector | region | stage | model | sales_type | range
    pub kind: String,
    pub value: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::investor_profile::Entity",
        from = "Column::InvestorId",
        to = "super::investor_profile::Column::Id",
        on_delete = "Cascade"
    )]
    Investor,
}

impl Related<super::investor_profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Investor.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
