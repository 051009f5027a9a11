use axum::{extract::State, Json};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::{AuthUser, Role};
use crate::entities::{investor_metrics, investor_preference, investor_profile};
use crate::error::AppError;
use crate::AppState;

pub const SOURCE_SELF_REGISTERED: &str = "self_registered";

#[derive(Debug, Serialize, ToSchema)]
pub struct InvestorProfileResponse {
    #[serde(flatten)]
    pub profile: investor_profile::Model,
    pub preferences: Vec<investor_preference::Model>,
    pub metrics: Option<investor_metrics::Model>,
}

/// Fetch the authenticated investor's profile with mandate and metrics
#[utoipa::path(
    get,
    path = "/api/investor/profile",
    responses(
        (status = 200, description = "Investor profile", body = InvestorProfileResponse),
        (status = 404, description = "No profile saved yet")
    )
)]
pub async fn get_investor_profile(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<InvestorProfileResponse>, AppError> {
    auth.require_role(Role::Investor)?;

    let profile = investor_profile::Entity::find_by_id(auth.id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("no investor profile yet".to_string()))?;

    let preferences = investor_preference::Entity::find()
        .filter(investor_preference::Column::InvestorId.eq(auth.id))
        .all(&state.db)
        .await?;

    let metrics = investor_metrics::Entity::find_by_id(auth.id)
        .one(&state.db)
        .await?;

    Ok(Json(InvestorProfileResponse {
        profile,
        preferences,
        metrics,
    }))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct InvestorProfileRequest {
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub linkedin_url: Option<String>,
    pub bio: Option<String>,
    pub firm_name: Option<String>,
    pub title: Option<String>,
    pub business_type: Option<String>,
    pub location: Option<String>,
}

/// Create or update the investor profile keyed by the auth user id
#[utoipa::path(
    put,
    path = "/api/investor/profile",
    request_body = InvestorProfileRequest,
    responses(
        (status = 200, description = "Saved profile", body = investor_profile::Model),
        (status = 422, description = "Missing name or email")
    )
)]
#[tracing::instrument(skip(state, auth, body), fields(investor = %auth.id))]
pub async fn upsert_investor_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<InvestorProfileRequest>,
) -> Result<Json<investor_profile::Model>, AppError> {
    auth.require_role(Role::Investor)?;

    if body.full_name.trim().is_empty() || body.email.trim().is_empty() {
        return Err(AppError::Validation(
            "full name and email are required".to_string(),
        ));
    }

    let now = Utc::now();
    let saved = match investor_profile::Entity::find_by_id(auth.id)
        .one(&state.db)
        .await?
    {
        Some(existing) => {
            let mut am: investor_profile::ActiveModel = existing.into();
            am.full_name = Set(body.full_name.trim().to_string());
            am.email = Set(body.email.trim().to_lowercase());
            am.phone = Set(body.phone);
            am.linkedin_url = Set(body.linkedin_url);
            am.bio = Set(body.bio);
            am.firm_name = Set(body.firm_name);
            am.title = Set(body.title);
            am.business_type = Set(body.business_type);
            am.location = Set(body.location);
            am.updated_at = Set(now);
            am.update(&state.db).await?
        }
        None => investor_profile::ActiveModel {
            id: Set(auth.id),
            full_name: Set(body.full_name.trim().to_string()),
            email: Set(body.email.trim().to_lowercase()),
            phone: Set(body.phone),
            linkedin_url: Set(body.linkedin_url),
            bio: Set(body.bio),
            firm_name: Set(body.firm_name),
            title: Set(body.title),
            business_type: Set(body.business_type),
            location: Set(body.location),
            source: Set(SOURCE_SELF_REGISTERED.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&state.db)
        .await?,
    };

    Ok(Json(saved))
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct MandateRequest {
    #[serde(default)]
    pub sectors: Vec<String>,
    #[serde(default)]
    pub regions: Vec<String>,
    #[serde(default)]
    pub stages: Vec<String>,
    #[serde(default)]
    pub models: Vec<String>,
    #[serde(default)]
    pub sales_types: Vec<String>,
    #[serde(default)]
    pub ranges: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MandateResponse {
    pub preferences: Vec<investor_preference::Model>,
}

/// Replace the investor's mandate (preference child rows) with the submitted lists
#[utoipa::path(
    put,
    path = "/api/investor/mandate",
    request_body = MandateRequest,
    responses(
        (status = 200, description = "Mandate stored", body = MandateResponse),
        (status = 404, description = "Profile must exist before saving a mandate")
    )
)]
#[tracing::instrument(skip(state, auth, body), fields(investor = %auth.id))]
pub async fn upsert_mandate(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<MandateRequest>,
) -> Result<Json<MandateResponse>, AppError> {
    auth.require_role(Role::Investor)?;

    investor_profile::Entity::find_by_id(auth.id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("no investor profile yet".to_string()))?;

    let kinds: [(&str, &Vec<String>); 6] = [
        ("sector", &body.sectors),
        ("region", &body.regions),
        ("stage", &body.stages),
        ("model", &body.models),
        ("sales_type", &body.sales_types),
        ("range", &body.ranges),
    ];

    // Full child-table replacement inside one transaction.
    let txn = state.db.begin().await?;

    investor_preference::Entity::delete_many()
        .filter(investor_preference::Column::InvestorId.eq(auth.id))
        .exec(&txn)
        .await?;

    let mut rows = Vec::new();
    for (kind, values) in kinds {
        for value in values {
            let value = value.trim().to_lowercase();
            if value.is_empty() {
                continue;
            }
            rows.push(investor_preference::ActiveModel {
                investor_id: Set(auth.id),
                kind: Set(kind.to_string()),
                value: Set(value),
                ..Default::default()
            });
        }
    }
    if !rows.is_empty() {
        investor_preference::Entity::insert_many(rows).exec(&txn).await?;
    }

    txn.commit().await?;

    let preferences = investor_preference::Entity::find()
        .filter(investor_preference::Column::InvestorId.eq(auth.id))
        .all(&state.db)
        .await?;

    Ok(Json(MandateResponse { preferences }))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct MetricsRequest {
    pub check_size_min: Option<i64>,
    pub check_size_max: Option<i64>,
    pub portfolio_count: Option<i32>,
}

/// Upsert the investor's check-size and portfolio metrics
#[utoipa::path(
    put,
    path = "/api/investor/metrics",
    request_body = MetricsRequest,
    responses(
        (status = 200, description = "Metrics stored", body = investor_metrics::Model),
        (status = 404, description = "Profile must exist before saving metrics")
    )
)]
pub async fn upsert_metrics(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<MetricsRequest>,
) -> Result<Json<investor_metrics::Model>, AppError> {
    auth.require_role(Role::Investor)?;

    investor_profile::Entity::find_by_id(auth.id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("no investor profile yet".to_string()))?;

    let now = Utc::now();
    let saved = match investor_metrics::Entity::find_by_id(auth.id)
        .one(&state.db)
        .await?
    {
        Some(existing) => {
            let mut am: investor_metrics::ActiveModel = existing.into();
            am.check_size_min = Set(body.check_size_min);
            am.check_size_max = Set(body.check_size_max);
            am.portfolio_count = Set(body.portfolio_count);
            am.updated_at = Set(now);
            am.update(&state.db).await?
        }
        None => investor_metrics::ActiveModel {
            investor_id: Set(auth.id),
            check_size_min: Set(body.check_size_min),
            check_size_max: Set(body.check_size_max),
            portfolio_count: Set(body.portfolio_count),
            updated_at: Set(now),
        }
        .insert(&state.db)
        .await?,
    };

    Ok(Json(saved))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileDeleteResponse {
    pub deleted: u64,
}

/// Delete the investor profile; dependents cascade, repeat deletes succeed
#[utoipa::path(
    delete,
    path = "/api/investor/profile",
    responses(
        (status = 200, description = "Delete outcome (idempotent)", body = ProfileDeleteResponse)
    )
)]
#[tracing::instrument(skip(state, auth), fields(investor = %auth.id))]
pub async fn delete_investor_profile(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ProfileDeleteResponse>, AppError> {
    auth.require_role(Role::Investor)?;

    // Preference and metric rows go via ON DELETE CASCADE. Deleting an
    // id that is already gone reports zero rows, not an error.
    let result = investor_profile::Entity::delete_by_id(auth.id)
        .exec(&state.db)
        .await?;

    Ok(Json(ProfileDeleteResponse {
        deleted: result.rows_affected,
    }))
}
