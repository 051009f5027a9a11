use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, ToSchema)]
#[schema(as = InvestorMetrics)]
#[sea_orm(table_name = "investor_metrics")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub investor_id: Uuid,
    pub check_size_min: Option<i64>,
    pub check_size_max: Option<i64>,
    pub portfolio_count: Option<i32>,
    pub updated_at: DateTime<Utc>,
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
