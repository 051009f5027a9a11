use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Deserialize, Serialize, ToSchema)]
#[schema(as = InvestorProfile)]
#[sea_orm(table_name = "investor_profiles")]
pub struct Model {
    /// Equals the auth user id for self-registered investors
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub full_name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub phone: Option<String>,
    pub linkedin_url: Option<String>,
    pub bio: Option<String>,
    pub firm_name: Option<String>,
    pub title: Option<String>,
    pub business_type: Option<String>,
    pub location: Option<String>,
    /// admin_upload | founder_added | self_registered | ai_discovery
    pub source: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::investor_preference::Entity")]
    Preferences,
    #[sea_orm(has_one = "super::investor_metrics::Entity")]
    Metrics,
}

impl Related<super::investor_preference::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Preferences.def()
    }
}

impl Related<super::investor_metrics::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Metrics.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
